//! Roadmap source port.

use std::collections::BTreeMap;

use panday_types::error::RoadmapError;
use panday_types::roadmap::{NodeContent, Roadmap, RoadmapGraph, RoadmapMetadata};

/// Reject IDs that could escape the roadmap directory.
pub fn validate_roadmap_id(id: &str) -> Result<(), RoadmapError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RoadmapError::InvalidId(id.to_string()))
    }
}

/// Where roadmap data comes from.
///
/// Every error carries the roadmap (and node) ID and the underlying cause.
pub trait RoadmapSource: Send + Sync {
    fn load_metadata(
        &self,
        roadmap_id: &str,
    ) -> impl std::future::Future<Output = Result<RoadmapMetadata, RoadmapError>> + Send;

    fn load_graph(
        &self,
        roadmap_id: &str,
    ) -> impl std::future::Future<Output = Result<RoadmapGraph, RoadmapError>> + Send;

    fn load_node_content(
        &self,
        roadmap_id: &str,
        node_id: &str,
    ) -> impl std::future::Future<Output = Result<NodeContent, RoadmapError>> + Send;

    /// Content for every node that has a content file, keyed by node ID.
    fn load_all_node_content(
        &self,
        roadmap_id: &str,
    ) -> impl std::future::Future<Output = Result<BTreeMap<String, NodeContent>, RoadmapError>> + Send;

    /// IDs of every roadmap the source knows about.
    fn available_roadmaps(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, RoadmapError>> + Send;

    /// Load metadata, graph and content concurrently.
    fn build_roadmap(
        &self,
        roadmap_id: &str,
    ) -> impl std::future::Future<Output = Result<Roadmap, RoadmapError>> + Send {
        async move {
            validate_roadmap_id(roadmap_id)?;
            let (metadata, graph, content) = tokio::try_join!(
                self.load_metadata(roadmap_id),
                self.load_graph(roadmap_id),
                self.load_all_node_content(roadmap_id),
            )?;
            Ok(Roadmap {
                metadata,
                graph,
                content,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_slug_ids() {
        assert!(validate_roadmap_id("electrician-bc").is_ok());
        assert!(validate_roadmap_id("plumber_on2").is_ok());
    }

    #[test]
    fn rejects_path_like_ids() {
        for id in ["", "..", "../etc", "a/b", "a b", "ele.json"] {
            assert!(
                matches!(validate_roadmap_id(id), Err(RoadmapError::InvalidId(_))),
                "{id:?} should be rejected"
            );
        }
    }
}
