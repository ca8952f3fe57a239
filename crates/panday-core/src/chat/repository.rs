//! ThreadRepository trait definition.

use chrono::{DateTime, Utc};
use panday_types::chat::{ChatThread, ThreadMessage};
use panday_types::error::RepositoryError;
use uuid::Uuid;

/// Persistence for chat threads and their messages.
///
/// Every read is scoped to the owning user and skips soft-deleted threads.
/// Implementations live in panday-infra (`SqliteThreadRepository`).
pub trait ThreadRepository: Send + Sync {
    fn create_thread(
        &self,
        thread: &ChatThread,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// A live thread with its message count.
    fn get_thread(
        &self,
        user_id: &str,
        thread_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatThread>, RepositoryError>> + Send;

    /// Up to `fetch` threads ordered by `last_message_at` DESC, starting after
    /// `cursor` in that order. An unknown cursor yields an empty list.
    fn list_threads(
        &self,
        user_id: &str,
        roadmap_id: Option<&str>,
        cursor: Option<&Uuid>,
        fetch: u32,
    ) -> impl std::future::Future<Output = Result<Vec<ChatThread>, RepositoryError>> + Send;

    /// Persist title, roadmap, selected node and `updated_at`.
    fn update_thread(
        &self,
        thread: &ChatThread,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Mark a live thread deleted. Returns false when nothing matched.
    fn soft_delete_thread(
        &self,
        user_id: &str,
        thread_id: &Uuid,
        deleted_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Messages ordered by `created_at` ASC.
    fn list_messages(
        &self,
        thread_id: &Uuid,
        limit: Option<u32>,
    ) -> impl std::future::Future<Output = Result<Vec<ThreadMessage>, RepositoryError>> + Send;

    /// Insert messages and move the thread's activity marker in one
    /// transaction.
    fn append_messages(
        &self,
        thread_id: &Uuid,
        messages: &[ThreadMessage],
        preview: &str,
        last_message_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
