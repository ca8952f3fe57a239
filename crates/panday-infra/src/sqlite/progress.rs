//! SQLite node progress repository.

use chrono::Utc;
use panday_core::repository::progress::NodeProgressRepository;
use panday_types::error::RepositoryError;
use panday_types::progress::{NodeProgress, NodeStatus};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

pub struct SqliteNodeProgressRepository {
    pool: DatabasePool,
}

impl SqliteNodeProgressRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct ProgressRow {
    user_id: String,
    roadmap_id: String,
    node_id: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl ProgressRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            roadmap_id: row.try_get("roadmap_id")?,
            node_id: row.try_get("node_id")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_progress(self) -> Result<NodeProgress, RepositoryError> {
        let status: NodeStatus = self
            .status
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        Ok(NodeProgress {
            user_id: self.user_id,
            roadmap_id: self.roadmap_id,
            node_id: self.node_id,
            status,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

impl NodeProgressRepository for SqliteNodeProgressRepository {
    async fn list_for_roadmap(
        &self,
        user_id: &str,
        roadmap_id: &str,
    ) -> Result<Vec<NodeProgress>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM node_progress WHERE user_id = ? AND roadmap_id = ? ORDER BY node_id",
        )
        .bind(user_id)
        .bind(roadmap_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|row| ProgressRow::from_row(row).map_err(query_error)?.into_progress())
            .collect()
    }

    async fn upsert(
        &self,
        user_id: &str,
        roadmap_id: &str,
        node_id: &str,
        status: NodeStatus,
    ) -> Result<NodeProgress, RepositoryError> {
        let now = format_datetime(&Utc::now());
        sqlx::query(
            r#"INSERT INTO node_progress (user_id, roadmap_id, node_id, status, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT(user_id, roadmap_id, node_id)
               DO UPDATE SET status = excluded.status, updated_at = excluded.updated_at"#,
        )
        .bind(user_id)
        .bind(roadmap_id)
        .bind(node_id)
        .bind(status.to_string())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        // Read back through the writer so the row is visible immediately.
        let row = sqlx::query(
            "SELECT * FROM node_progress WHERE user_id = ? AND roadmap_id = ? AND node_id = ?",
        )
        .bind(user_id)
        .bind(roadmap_id)
        .bind(node_id)
        .fetch_one(&self.pool.writer)
        .await
        .map_err(query_error)?;

        ProgressRow::from_row(&row)
            .map_err(query_error)?
            .into_progress()
    }
}
