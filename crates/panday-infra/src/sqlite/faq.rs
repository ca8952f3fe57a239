//! SQLite FAQ repository (read-only).

use std::collections::HashMap;

use panday_core::repository::faq::FaqRepository;
use panday_types::error::RepositoryError;
use panday_types::faq::{FaqCategory, FaqEntry};
use sqlx::Row;

use super::pool::DatabasePool;
use super::query_error;

const ENTRY_ORDER: &str = "ORDER BY frequency DESC, display_order ASC, question ASC";

pub struct SqliteFaqRepository {
    pool: DatabasePool,
}

impl SqliteFaqRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn entry_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<FaqEntry, RepositoryError> {
    let variations: String = row.try_get("variations").map_err(query_error)?;
    let variations: Vec<String> = serde_json::from_str(&variations)
        .map_err(|e| RepositoryError::Query(format!("invalid faq variations: {e}")))?;
    Ok(FaqEntry {
        id: row.try_get("id").map_err(query_error)?,
        category_id: row.try_get("category_id").map_err(query_error)?,
        question: row.try_get("question").map_err(query_error)?,
        answer: row.try_get("answer").map_err(query_error)?,
        variations,
        frequency: row.try_get("frequency").map_err(query_error)?,
        display_order: row.try_get("display_order").map_err(query_error)?,
        is_global: row.try_get::<i64, _>("is_global").map_err(query_error)? != 0,
    })
}

impl FaqRepository for SqliteFaqRepository {
    async fn global_entries(&self, limit: u32) -> Result<Vec<FaqEntry>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT * FROM faq_entries WHERE is_global = 1 {ENTRY_ORDER} LIMIT ?"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;
        rows.iter().map(entry_from_row).collect()
    }

    async fn entries_in_category(&self, category_id: &str) -> Result<Vec<FaqEntry>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT * FROM faq_entries WHERE category_id = ? {ENTRY_ORDER}"
        ))
        .bind(category_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;
        rows.iter().map(entry_from_row).collect()
    }

    async fn categories_with_entries(&self) -> Result<Vec<FaqCategory>, RepositoryError> {
        let categories = sqlx::query("SELECT * FROM faq_categories ORDER BY display_order ASC, name ASC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;
        let entries = sqlx::query(&format!(
            "SELECT * FROM faq_entries WHERE category_id IS NOT NULL {ENTRY_ORDER}"
        ))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut by_category: HashMap<String, Vec<FaqEntry>> = HashMap::new();
        for row in &entries {
            let entry = entry_from_row(row)?;
            if let Some(category_id) = entry.category_id.clone() {
                by_category.entry(category_id).or_default().push(entry);
            }
        }

        categories
            .iter()
            .map(|row| {
                let id: String = row.try_get("id").map_err(query_error)?;
                Ok(FaqCategory {
                    faq_entries: by_category.remove(&id).unwrap_or_default(),
                    name: row.try_get("name").map_err(query_error)?,
                    description: row.try_get("description").map_err(query_error)?,
                    display_order: row.try_get("display_order").map_err(query_error)?,
                    id,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_pool;

    const NOW: &str = "2025-06-01T00:00:00.000000Z";

    async fn seed(pool: &DatabasePool) {
        for (id, name, order) in [("wages", "Wages", 1), ("hours", "Work hours", 0)] {
            sqlx::query(
                "INSERT INTO faq_categories (id, name, display_order, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(name)
            .bind(order)
            .bind(NOW)
            .bind(NOW)
            .execute(&pool.writer)
            .await
            .unwrap();
        }
        for (id, category, question, frequency, global) in [
            ("e1", Some("wages"), "What does a level 1 apprentice earn?", 3, true),
            ("e2", Some("wages"), "Are raises automatic?", 7, false),
            ("e3", Some("hours"), "How many hours per level?", 5, true),
            ("e4", None, "Where do I register?", 9, true),
        ] {
            sqlx::query(
                r#"INSERT INTO faq_entries
                   (id, category_id, question, answer, variations, frequency, is_global, created_at, updated_at)
                   VALUES (?, ?, ?, 'See SkilledTradesBC.', '["alt phrasing"]', ?, ?, ?, ?)"#,
            )
            .bind(id)
            .bind(category)
            .bind(question)
            .bind(frequency)
            .bind(global as i64)
            .bind(NOW)
            .bind(NOW)
            .execute(&pool.writer)
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn test_global_entries_by_frequency() {
        let pool = test_pool().await;
        seed(&pool).await;
        let repo = SqliteFaqRepository::new(pool);

        let entries = repo.global_entries(2).await.unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e4", "e3"]);
        assert_eq!(entries[0].variations, vec!["alt phrasing"]);
        assert!(entries[0].is_global);
    }

    #[tokio::test]
    async fn test_entries_in_category() {
        let pool = test_pool().await;
        seed(&pool).await;
        let repo = SqliteFaqRepository::new(pool);

        let entries = repo.entries_in_category("wages").await.unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e2", "e1"]);
        assert!(repo.entries_in_category("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_categories_carry_their_entries() {
        let pool = test_pool().await;
        seed(&pool).await;
        let repo = SqliteFaqRepository::new(pool);

        let categories = repo.categories_with_entries().await.unwrap();
        let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Work hours", "Wages"]);
        assert_eq!(categories[0].faq_entries.len(), 1);
        assert_eq!(categories[1].faq_entries[0].id, "e2");
    }
}
