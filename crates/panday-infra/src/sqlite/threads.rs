//! SQLite chat thread repository implementation.
//!
//! Implements `ThreadRepository` from `panday-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, RFC 3339 timestamps.

use chrono::{DateTime, Utc};
use panday_core::chat::repository::ThreadRepository;
use panday_types::chat::{ChatThread, ThreadMessage, ThreadRole};
use panday_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

const THREAD_COLUMNS: &str = r#"t.id, t.user_id, t.title, t.roadmap_id, t.selected_node_id,
       t.message_preview, t.last_message_at, t.created_at, t.updated_at, t.deleted_at,
       (SELECT COUNT(*) FROM chat_thread_messages m WHERE m.thread_id = t.id) AS messages_count"#;

/// SQLite-backed implementation of `ThreadRepository`.
pub struct SqliteThreadRepository {
    pool: DatabasePool,
}

impl SqliteThreadRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ThreadRow {
    id: String,
    user_id: String,
    title: String,
    roadmap_id: Option<String>,
    selected_node_id: Option<String>,
    message_preview: Option<String>,
    last_message_at: String,
    created_at: String,
    updated_at: String,
    deleted_at: Option<String>,
    messages_count: i64,
}

impl ThreadRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            roadmap_id: row.try_get("roadmap_id")?,
            selected_node_id: row.try_get("selected_node_id")?,
            message_preview: row.try_get("message_preview")?,
            last_message_at: row.try_get("last_message_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
            messages_count: row.try_get("messages_count")?,
        })
    }

    fn into_thread(self) -> Result<ChatThread, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid thread id: {e}")))?;
        Ok(ChatThread {
            id,
            user_id: self.user_id,
            title: self.title,
            roadmap_id: self.roadmap_id,
            selected_node_id: self.selected_node_id,
            message_preview: self.message_preview,
            last_message_at: parse_datetime(&self.last_message_at)?,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
            deleted_at: self.deleted_at.as_deref().map(parse_datetime).transpose()?,
            messages_count: self.messages_count as u32,
        })
    }
}

struct MessageRow {
    id: String,
    thread_id: String,
    role: String,
    content: String,
    sources: Option<String>,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            thread_id: row.try_get("thread_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            sources: row.try_get("sources")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ThreadMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let thread_id = Uuid::parse_str(&self.thread_id)
            .map_err(|e| RepositoryError::Query(format!("invalid thread_id: {e}")))?;
        let role: ThreadRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let sources = self
            .sources
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid sources json: {e}")))?;

        Ok(ThreadMessage {
            id,
            thread_id,
            role,
            content: self.content,
            sources,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn map_threads(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<ChatThread>, RepositoryError> {
    rows.iter()
        .map(|row| ThreadRow::from_row(row).map_err(query_error)?.into_thread())
        .collect()
}

// ---------------------------------------------------------------------------
// ThreadRepository implementation
// ---------------------------------------------------------------------------

impl ThreadRepository for SqliteThreadRepository {
    async fn create_thread(&self, thread: &ChatThread) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_threads (id, user_id, title, roadmap_id, selected_node_id, message_preview, last_message_at, created_at, updated_at, deleted_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(thread.id.to_string())
        .bind(&thread.user_id)
        .bind(&thread.title)
        .bind(&thread.roadmap_id)
        .bind(&thread.selected_node_id)
        .bind(&thread.message_preview)
        .bind(format_datetime(&thread.last_message_at))
        .bind(format_datetime(&thread.created_at))
        .bind(format_datetime(&thread.updated_at))
        .bind(thread.deleted_at.as_ref().map(format_datetime))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn get_thread(
        &self,
        user_id: &str,
        thread_id: &Uuid,
    ) -> Result<Option<ChatThread>, RepositoryError> {
        let sql = format!(
            "SELECT {THREAD_COLUMNS} FROM chat_threads t WHERE t.id = ? AND t.user_id = ? AND t.deleted_at IS NULL"
        );
        let row = sqlx::query(&sql)
            .bind(thread_id.to_string())
            .bind(user_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => Ok(Some(
                ThreadRow::from_row(&row).map_err(query_error)?.into_thread()?,
            )),
            None => Ok(None),
        }
    }

    async fn list_threads(
        &self,
        user_id: &str,
        roadmap_id: Option<&str>,
        cursor: Option<&Uuid>,
        fetch: u32,
    ) -> Result<Vec<ChatThread>, RepositoryError> {
        let after = match cursor {
            Some(cursor) => {
                let row = sqlx::query(
                    "SELECT last_message_at FROM chat_threads WHERE id = ? AND user_id = ? AND deleted_at IS NULL",
                )
                .bind(cursor.to_string())
                .bind(user_id)
                .fetch_optional(&self.pool.reader)
                .await
                .map_err(query_error)?;
                match row {
                    Some(row) => {
                        let at: String = row.try_get("last_message_at").map_err(query_error)?;
                        Some((at, cursor.to_string()))
                    }
                    None => return Ok(Vec::new()),
                }
            }
            None => None,
        };

        let mut sql = format!(
            "SELECT {THREAD_COLUMNS} FROM chat_threads t WHERE t.user_id = ? AND t.deleted_at IS NULL"
        );
        if roadmap_id.is_some() {
            sql.push_str(" AND t.roadmap_id = ?");
        }
        if after.is_some() {
            sql.push_str(
                " AND (t.last_message_at < ? OR (t.last_message_at = ? AND t.id < ?))",
            );
        }
        sql.push_str(" ORDER BY t.last_message_at DESC, t.id DESC LIMIT ?");

        let mut query = sqlx::query(&sql).bind(user_id);
        if let Some(roadmap_id) = roadmap_id {
            query = query.bind(roadmap_id);
        }
        if let Some((at, id)) = &after {
            query = query.bind(at).bind(at).bind(id);
        }
        let rows = query
            .bind(fetch as i64)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        map_threads(&rows)
    }

    async fn update_thread(&self, thread: &ChatThread) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE chat_threads
               SET title = ?, roadmap_id = ?, selected_node_id = ?, updated_at = ?
               WHERE id = ? AND user_id = ? AND deleted_at IS NULL"#,
        )
        .bind(&thread.title)
        .bind(&thread.roadmap_id)
        .bind(&thread.selected_node_id)
        .bind(format_datetime(&thread.updated_at))
        .bind(thread.id.to_string())
        .bind(&thread.user_id)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn soft_delete_thread(
        &self,
        user_id: &str,
        thread_id: &Uuid,
        deleted_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let stamp = format_datetime(&deleted_at);
        let result = sqlx::query(
            r#"UPDATE chat_threads SET deleted_at = ?, updated_at = ?
               WHERE id = ? AND user_id = ? AND deleted_at IS NULL"#,
        )
        .bind(&stamp)
        .bind(&stamp)
        .bind(thread_id.to_string())
        .bind(user_id)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_messages(
        &self,
        thread_id: &Uuid,
        limit: Option<u32>,
    ) -> Result<Vec<ThreadMessage>, RepositoryError> {
        let mut sql = String::from(
            "SELECT * FROM chat_thread_messages WHERE thread_id = ? ORDER BY created_at ASC, id ASC",
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let rows = sqlx::query(&sql)
            .bind(thread_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| MessageRow::from_row(row).map_err(query_error)?.into_message())
            .collect()
    }

    async fn append_messages(
        &self,
        thread_id: &Uuid,
        messages: &[ThreadMessage],
        preview: &str,
        last_message_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        for message in messages {
            let sources = message
                .sources
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(|e| RepositoryError::Query(format!("invalid sources json: {e}")))?;
            sqlx::query(
                r#"INSERT INTO chat_thread_messages (id, thread_id, role, content, sources, created_at)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(message.id.to_string())
            .bind(thread_id.to_string())
            .bind(message.role.to_string())
            .bind(&message.content)
            .bind(sources)
            .bind(format_datetime(&message.created_at))
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        }

        let stamp = format_datetime(&last_message_at);
        let result = sqlx::query(
            r#"UPDATE chat_threads SET last_message_at = ?, message_preview = ?, updated_at = ?
               WHERE id = ? AND deleted_at IS NULL"#,
        )
        .bind(&stamp)
        .bind(preview)
        .bind(&stamp)
        .bind(thread_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await.map_err(query_error)?;
        Ok(())
    }
}
