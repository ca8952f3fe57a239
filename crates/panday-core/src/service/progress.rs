//! Node progress service.

use std::collections::BTreeMap;

use panday_types::error::{FieldErrors, ProgressError};
use panday_types::progress::{NodeProgress, NodeStatus};
use serde::Deserialize;
use tracing::info;

use crate::repository::progress::NodeProgressRepository;

/// Body of a progress update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProgressInput {
    pub roadmap_id: String,
    pub node_id: String,
    pub status: NodeStatus,
}

pub struct NodeProgressService<R: NodeProgressRepository> {
    repo: R,
}

impl<R: NodeProgressRepository> NodeProgressService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// `node_id -> status` for one roadmap.
    pub async fn progress_map(
        &self,
        user_id: &str,
        roadmap_id: Option<&str>,
    ) -> Result<BTreeMap<String, NodeStatus>, ProgressError> {
        let roadmap_id = roadmap_id
            .filter(|r| !r.is_empty())
            .ok_or(ProgressError::MissingRoadmapId)?;
        let rows = self.repo.list_for_roadmap(user_id, roadmap_id).await?;
        info!(user_id, roadmap_id, count = rows.len(), "node progress fetched");
        Ok(rows.into_iter().map(|p| (p.node_id, p.status)).collect())
    }

    pub async fn update(
        &self,
        user_id: &str,
        input: NodeProgressInput,
    ) -> Result<NodeProgress, ProgressError> {
        let mut errors = FieldErrors::new();
        if input.roadmap_id.is_empty() {
            errors.add("roadmapId", "String must contain at least 1 character(s)");
        }
        if input.node_id.is_empty() {
            errors.add("nodeId", "String must contain at least 1 character(s)");
        }
        errors.into_result().map_err(ProgressError::Invalid)?;

        let progress = self
            .repo
            .upsert(user_id, &input.roadmap_id, &input.node_id, input.status)
            .await?;
        info!(
            user_id,
            roadmap_id = %input.roadmap_id,
            node_id = %input.node_id,
            status = %input.status,
            "node progress updated"
        );
        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use panday_types::error::RepositoryError;

    use super::*;

    #[derive(Default)]
    struct MemoryProgress {
        rows: Mutex<Vec<NodeProgress>>,
    }

    impl NodeProgressRepository for MemoryProgress {
        async fn list_for_roadmap(
            &self,
            user_id: &str,
            roadmap_id: &str,
        ) -> Result<Vec<NodeProgress>, RepositoryError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.user_id == user_id && r.roadmap_id == roadmap_id)
                .cloned()
                .collect())
        }

        async fn upsert(
            &self,
            user_id: &str,
            roadmap_id: &str,
            node_id: &str,
            status: NodeStatus,
        ) -> Result<NodeProgress, RepositoryError> {
            let mut rows = self.rows.lock().unwrap();
            let now = Utc::now();
            if let Some(row) = rows
                .iter_mut()
                .find(|r| r.user_id == user_id && r.roadmap_id == roadmap_id && r.node_id == node_id)
            {
                row.status = status;
                row.updated_at = now;
                return Ok(row.clone());
            }
            let row = NodeProgress {
                user_id: user_id.to_string(),
                roadmap_id: roadmap_id.to_string(),
                node_id: node_id.to_string(),
                status,
                created_at: now,
                updated_at: now,
            };
            rows.push(row.clone());
            Ok(row)
        }
    }

    fn input(node: &str, status: NodeStatus) -> NodeProgressInput {
        NodeProgressInput {
            roadmap_id: "electrician-bc".to_string(),
            node_id: node.to_string(),
            status,
        }
    }

    #[tokio::test]
    async fn requires_roadmap_id() {
        let svc = NodeProgressService::new(MemoryProgress::default());
        assert!(matches!(
            svc.progress_map("u", None).await,
            Err(ProgressError::MissingRoadmapId)
        ));
        assert!(matches!(
            svc.progress_map("u", Some("")).await,
            Err(ProgressError::MissingRoadmapId)
        ));
    }

    #[tokio::test]
    async fn upsert_overwrites_status() {
        let svc = NodeProgressService::new(MemoryProgress::default());
        svc.update("u", input("level-1-req-1", NodeStatus::InProgress))
            .await
            .unwrap();
        svc.update("u", input("level-1-req-1", NodeStatus::Completed))
            .await
            .unwrap();
        svc.update("other", input("level-1-req-2", NodeStatus::Completed))
            .await
            .unwrap();

        let map = svc.progress_map("u", Some("electrician-bc")).await.unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["level-1-req-1"], NodeStatus::Completed);
    }

    #[tokio::test]
    async fn rejects_empty_ids() {
        let svc = NodeProgressService::new(MemoryProgress::default());
        let err = svc.update("u", input("", NodeStatus::Base)).await.unwrap_err();
        match err {
            ProgressError::Invalid(details) => {
                assert!(details.field_errors.contains_key("nodeId"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn input_parses_camel_case() {
        let parsed: NodeProgressInput = serde_json::from_str(
            r#"{"roadmapId":"electrician-bc","nodeId":"level-1","status":"in-progress"}"#,
        )
        .unwrap();
        assert_eq!(parsed.status, NodeStatus::InProgress);
        assert!(
            serde_json::from_str::<NodeProgressInput>(
                r#"{"roadmapId":"a","nodeId":"b","status":"done"}"#
            )
            .is_err()
        );
    }
}
