//! ProfileRepository trait definition.

use chrono::{DateTime, Utc};
use panday_types::error::RepositoryError;
use panday_types::profile::{ProfileInput, UserProfile};

/// One profile per identity-provider user.
pub trait ProfileRepository: Send + Sync {
    fn get(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserProfile>, RepositoryError>> + Send;

    /// Create or overwrite the onboarding answers and stamp
    /// `onboarding_completed_at`.
    fn upsert(
        &self,
        user_id: &str,
        input: &ProfileInput,
        onboarding_completed_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<UserProfile, RepositoryError>> + Send;

    /// Persist every mutable field of an existing profile.
    fn update(
        &self,
        profile: &UserProfile,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
