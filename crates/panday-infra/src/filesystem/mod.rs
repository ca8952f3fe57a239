//! Filesystem roadmap source.
//!
//! Layout under the roadmaps directory:
//! ```text
//! {roadmaps_dir}/{roadmap_id}/metadata.json
//! {roadmaps_dir}/{roadmap_id}/graph.json
//! {roadmaps_dir}/{roadmap_id}/content/{node_id}.md
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use panday_core::roadmap::markdown::parse_node_file;
use panday_core::roadmap::{RoadmapSource, validate_roadmap_id};
use panday_types::error::RoadmapError;
use panday_types::roadmap::{NodeContent, RoadmapGraph, RoadmapMetadata};
use serde::de::DeserializeOwned;

/// Reads roadmaps from a directory tree via `tokio::fs`.
#[derive(Debug, Clone)]
pub struct LocalRoadmapSource {
    root: PathBuf,
}

impl LocalRoadmapSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{root}/{roadmap_id}/`
    pub fn roadmap_dir(&self, roadmap_id: &str) -> PathBuf {
        self.root.join(roadmap_id)
    }

    pub fn content_dir(&self, roadmap_id: &str) -> PathBuf {
        self.roadmap_dir(roadmap_id).join("content")
    }

    pub fn node_path(&self, roadmap_id: &str, node_id: &str) -> PathBuf {
        self.content_dir(roadmap_id).join(format!("{node_id}.md"))
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| e.to_string())?;
    serde_json::from_str(&raw).map_err(|e| e.to_string())
}

async fn read_node(path: &Path) -> Result<NodeContent, String> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| e.to_string())?;
    parse_node_file(&raw)
}

impl RoadmapSource for LocalRoadmapSource {
    async fn load_metadata(&self, roadmap_id: &str) -> Result<RoadmapMetadata, RoadmapError> {
        validate_roadmap_id(roadmap_id)?;
        read_json(&self.roadmap_dir(roadmap_id).join("metadata.json"))
            .await
            .map_err(|cause| RoadmapError::Metadata {
                roadmap_id: roadmap_id.to_string(),
                cause,
            })
    }

    async fn load_graph(&self, roadmap_id: &str) -> Result<RoadmapGraph, RoadmapError> {
        validate_roadmap_id(roadmap_id)?;
        read_json(&self.roadmap_dir(roadmap_id).join("graph.json"))
            .await
            .map_err(|cause| RoadmapError::Graph {
                roadmap_id: roadmap_id.to_string(),
                cause,
            })
    }

    async fn load_node_content(
        &self,
        roadmap_id: &str,
        node_id: &str,
    ) -> Result<NodeContent, RoadmapError> {
        validate_roadmap_id(roadmap_id)?;
        let node_error = |cause: String| RoadmapError::NodeContent {
            roadmap_id: roadmap_id.to_string(),
            node_id: node_id.to_string(),
            cause,
        };
        if node_id.contains(['/', '\\']) || node_id.starts_with('.') {
            return Err(node_error("invalid node id".to_string()));
        }
        read_node(&self.node_path(roadmap_id, node_id))
            .await
            .map_err(node_error)
    }

    async fn load_all_node_content(
        &self,
        roadmap_id: &str,
    ) -> Result<BTreeMap<String, NodeContent>, RoadmapError> {
        validate_roadmap_id(roadmap_id)?;
        let dir_error = |cause: String| RoadmapError::ContentDirectory {
            roadmap_id: roadmap_id.to_string(),
            cause,
        };

        let mut entries = tokio::fs::read_dir(self.content_dir(roadmap_id))
            .await
            .map_err(|e| dir_error(e.to_string()))?;
        let mut content = BTreeMap::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| dir_error(e.to_string()))?
        {
            let file_name = entry.file_name();
            let Some(node_id) = file_name.to_str().and_then(|n| n.strip_suffix(".md")) else {
                continue;
            };
            // Any bad node file fails the whole directory, naming the node.
            let node = self
                .load_node_content(roadmap_id, node_id)
                .await
                .map_err(|e| dir_error(e.to_string()))?;
            content.insert(node_id.to_string(), node);
        }
        tracing::debug!(roadmap_id, nodes = content.len(), "loaded node content");
        Ok(content)
    }

    async fn available_roadmaps(&self) -> Result<Vec<String>, RoadmapError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| RoadmapError::Listing(e.to_string()))?;
        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RoadmapError::Listing(e.to_string()))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map_err(|e| RoadmapError::Listing(e.to_string()))?
                .is_dir();
            if is_dir && let Some(name) = entry.file_name().to_str() {
                ids.push(name.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const METADATA: &str = r#"{
        "id": "electrician-bc",
        "title": "Electrician in British Columbia",
        "province": "BC",
        "version": "1.0.0",
        "lastUpdated": "2025-01-15"
    }"#;

    const GRAPH: &str = r#"{
        "nodes": [
            {"id": "level-1", "position": {"x": 0, "y": 0}},
            {"id": "level-1-req-1", "position": {"x": 10, "y": 20}, "parentId": "level-1"}
        ],
        "edges": [
            {"id": "e1", "source": "level-1", "target": "level-1-req-1"}
        ]
    }"#;

    const HUB: &str = "---\nid: level-1\ntype: hub\ntitle: Level 1\nnodeType: hub\n---\n# Level 1\n\n## Benefits\n- Paid training\n";

    const CHECKLIST: &str = "---\nid: level-1-req-1\ntype: checklist\ntitle: Log hours\nnodeType: checklist\n---\nLog 1500 hours.\n";

    async fn write_roadmap(root: &Path) {
        let dir = root.join("electrician-bc");
        tokio::fs::create_dir_all(dir.join("content")).await.unwrap();
        tokio::fs::write(dir.join("metadata.json"), METADATA).await.unwrap();
        tokio::fs::write(dir.join("graph.json"), GRAPH).await.unwrap();
        tokio::fs::write(dir.join("content/level-1.md"), HUB).await.unwrap();
        tokio::fs::write(dir.join("content/level-1-req-1.md"), CHECKLIST)
            .await
            .unwrap();
        tokio::fs::write(dir.join("content/notes.txt"), "ignored")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn builds_roadmap_from_directory() {
        let dir = tempdir().unwrap();
        write_roadmap(dir.path()).await;
        let source = LocalRoadmapSource::new(dir.path());

        let roadmap = source.build_roadmap("electrician-bc").await.unwrap();
        assert_eq!(roadmap.metadata.title, "Electrician in British Columbia");
        assert_eq!(roadmap.graph.nodes.len(), 2);
        assert_eq!(roadmap.content.len(), 2);
        assert_eq!(
            roadmap.content["level-1"].benefits.as_deref(),
            Some(&["Paid training".to_string()][..])
        );
        assert_eq!(
            roadmap.content["level-1-req-1"].frontmatter.title,
            "Log hours"
        );
    }

    #[tokio::test]
    async fn lists_directories_only() {
        let dir = tempdir().unwrap();
        write_roadmap(dir.path()).await;
        tokio::fs::create_dir_all(dir.path().join("alpha")).await.unwrap();
        tokio::fs::write(dir.path().join("README.md"), "x").await.unwrap();

        let source = LocalRoadmapSource::new(dir.path());
        assert_eq!(
            source.available_roadmaps().await.unwrap(),
            vec!["alpha".to_string(), "electrician-bc".to_string()]
        );
    }

    #[tokio::test]
    async fn missing_files_name_the_roadmap() {
        let dir = tempdir().unwrap();
        let source = LocalRoadmapSource::new(dir.path());

        let err = source.load_metadata("plumber-bc").await.unwrap_err();
        assert!(matches!(err, RoadmapError::Metadata { .. }));
        assert!(err.to_string().starts_with(
            "Failed to load metadata for roadmap \"plumber-bc\""
        ));

        let err = source.load_node_content("plumber-bc", "level-1").await.unwrap_err();
        assert!(matches!(err, RoadmapError::NodeContent { .. }));

        let missing = LocalRoadmapSource::new(dir.path().join("nope"));
        assert!(matches!(
            missing.available_roadmaps().await,
            Err(RoadmapError::Listing(_))
        ));
    }

    #[tokio::test]
    async fn bad_node_file_fails_directory_load() {
        let dir = tempdir().unwrap();
        write_roadmap(dir.path()).await;
        tokio::fs::write(
            dir.path().join("electrician-bc/content/broken.md"),
            "no frontmatter here",
        )
        .await
        .unwrap();

        let source = LocalRoadmapSource::new(dir.path());
        let err = source
            .load_all_node_content("electrician-bc")
            .await
            .unwrap_err();
        assert!(matches!(err, RoadmapError::ContentDirectory { .. }));
        assert!(err.to_string().contains("broken"));
    }

    #[tokio::test]
    async fn rejects_path_traversal() {
        let dir = tempdir().unwrap();
        let source = LocalRoadmapSource::new(dir.path());
        assert!(matches!(
            source.load_graph("../etc").await,
            Err(RoadmapError::InvalidId(_))
        ));
        assert!(source
            .load_node_content("electrician-bc", "../../secret")
            .await
            .is_err());
    }
}
