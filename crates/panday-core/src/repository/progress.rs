//! NodeProgressRepository trait definition.

use panday_types::error::RepositoryError;
use panday_types::progress::{NodeProgress, NodeStatus};

pub trait NodeProgressRepository: Send + Sync {
    /// Every stored status for one user's roadmap.
    fn list_for_roadmap(
        &self,
        user_id: &str,
        roadmap_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<NodeProgress>, RepositoryError>> + Send;

    /// Insert or update the status of one node; returns the stored row.
    fn upsert(
        &self,
        user_id: &str,
        roadmap_id: &str,
        node_id: &str,
        status: NodeStatus,
    ) -> impl std::future::Future<Output = Result<NodeProgress, RepositoryError>> + Send;
}
