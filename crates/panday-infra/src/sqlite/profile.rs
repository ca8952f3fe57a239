//! SQLite user profile repository.

use chrono::{DateTime, Utc};
use panday_core::repository::profile::ProfileRepository;
use panday_types::error::RepositoryError;
use panday_types::profile::{ProfileInput, UserProfile};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

pub struct SqliteProfileRepository {
    pool: DatabasePool,
}

impl SqliteProfileRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn fetch(
        &self,
        pool: &sqlx::SqlitePool,
        user_id: &str,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM user_profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => Ok(Some(
                ProfileRow::from_row(&row).map_err(query_error)?.into_profile()?,
            )),
            None => Ok(None),
        }
    }
}

struct ProfileRow {
    id: i64,
    user_id: String,
    trade: String,
    current_level: String,
    specialization: String,
    residency_status: String,
    onboarding_completed_at: Option<String>,
    tutorial_completed_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ProfileRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            trade: row.try_get("trade")?,
            current_level: row.try_get("current_level")?,
            specialization: row.try_get("specialization")?,
            residency_status: row.try_get("residency_status")?,
            onboarding_completed_at: row.try_get("onboarding_completed_at")?,
            tutorial_completed_at: row.try_get("tutorial_completed_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_profile(self) -> Result<UserProfile, RepositoryError> {
        Ok(UserProfile {
            id: self.id,
            user_id: self.user_id,
            trade: self.trade.parse().map_err(|e: String| RepositoryError::Query(e))?,
            current_level: self
                .current_level
                .parse()
                .map_err(|e: String| RepositoryError::Query(e))?,
            specialization: self
                .specialization
                .parse()
                .map_err(|e: String| RepositoryError::Query(e))?,
            residency_status: self
                .residency_status
                .parse()
                .map_err(|e: String| RepositoryError::Query(e))?,
            onboarding_completed_at: self
                .onboarding_completed_at
                .as_deref()
                .map(parse_datetime)
                .transpose()?,
            tutorial_completed_at: self
                .tutorial_completed_at
                .as_deref()
                .map(parse_datetime)
                .transpose()?,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

impl ProfileRepository for SqliteProfileRepository {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, RepositoryError> {
        self.fetch(&self.pool.reader, user_id).await
    }

    async fn upsert(
        &self,
        user_id: &str,
        input: &ProfileInput,
        onboarding_completed_at: DateTime<Utc>,
    ) -> Result<UserProfile, RepositoryError> {
        let now = format_datetime(&Utc::now());
        sqlx::query(
            r#"INSERT INTO user_profiles (user_id, trade, current_level, specialization, residency_status, onboarding_completed_at, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(user_id) DO UPDATE SET
                   trade = excluded.trade,
                   current_level = excluded.current_level,
                   specialization = excluded.specialization,
                   residency_status = excluded.residency_status,
                   onboarding_completed_at = excluded.onboarding_completed_at,
                   updated_at = excluded.updated_at"#,
        )
        .bind(user_id)
        .bind(input.trade.to_string())
        .bind(input.current_level.to_string())
        .bind(input.specialization.to_string())
        .bind(input.residency_status.to_string())
        .bind(format_datetime(&onboarding_completed_at))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        self.fetch(&self.pool.writer, user_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE user_profiles
               SET trade = ?, current_level = ?, specialization = ?, residency_status = ?,
                   onboarding_completed_at = ?, tutorial_completed_at = ?, updated_at = ?
               WHERE user_id = ?"#,
        )
        .bind(profile.trade.to_string())
        .bind(profile.current_level.to_string())
        .bind(profile.specialization.to_string())
        .bind(profile.residency_status.to_string())
        .bind(profile.onboarding_completed_at.as_ref().map(format_datetime))
        .bind(profile.tutorial_completed_at.as_ref().map(format_datetime))
        .bind(format_datetime(&profile.updated_at))
        .bind(&profile.user_id)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
