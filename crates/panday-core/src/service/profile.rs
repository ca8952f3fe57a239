//! Profile service: onboarding answers and tutorial completion.

use chrono::Utc;
use panday_types::error::ProfileError;
use panday_types::profile::{ProfileInput, ProfileUpdate, UserProfile};
use tracing::info;

use crate::repository::profile::ProfileRepository;

pub struct ProfileService<R: ProfileRepository> {
    repo: R,
}

impl<R: ProfileRepository> ProfileService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn get(&self, user_id: &str) -> Result<UserProfile, ProfileError> {
        self.repo.get(user_id).await?.ok_or(ProfileError::NotFound)
    }

    /// Store complete onboarding answers, creating the profile if needed.
    pub async fn save_onboarding(
        &self,
        user_id: &str,
        input: ProfileInput,
    ) -> Result<UserProfile, ProfileError> {
        let profile = self.repo.upsert(user_id, &input, Utc::now()).await?;
        info!(user_id, profile_id = profile.id, "profile created/updated");
        Ok(profile)
    }

    /// Apply a partial update to an existing profile.
    pub async fn update(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<UserProfile, ProfileError> {
        let mut profile = self.get(user_id).await?;
        if let Some(trade) = update.trade {
            profile.trade = trade;
        }
        if let Some(level) = update.current_level {
            profile.current_level = level;
        }
        if let Some(spec) = update.specialization {
            profile.specialization = spec;
        }
        if let Some(status) = update.residency_status {
            profile.residency_status = status;
        }
        profile.updated_at = Utc::now();
        self.repo.update(&profile).await?;
        info!(user_id, profile_id = profile.id, "profile updated");
        Ok(profile)
    }

    /// Record that the roadmap tutorial was completed.
    pub async fn complete_tutorial(&self, user_id: &str) -> Result<UserProfile, ProfileError> {
        let mut profile = self.get(user_id).await?;
        let now = Utc::now();
        profile.tutorial_completed_at = Some(now);
        profile.updated_at = now;
        self.repo.update(&profile).await?;
        info!(user_id, "tutorial marked complete");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::DateTime;
    use panday_types::error::RepositoryError;
    use panday_types::profile::{ApprenticeshipLevel, ResidencyStatus, Specialization, Trade};

    use super::*;

    #[derive(Default)]
    struct MemoryProfiles {
        rows: Mutex<Vec<UserProfile>>,
    }

    impl ProfileRepository for MemoryProfiles {
        async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, RepositoryError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.user_id == user_id)
                .cloned())
        }

        async fn upsert(
            &self,
            user_id: &str,
            input: &ProfileInput,
            onboarding_completed_at: DateTime<Utc>,
        ) -> Result<UserProfile, RepositoryError> {
            let mut rows = self.rows.lock().unwrap();
            let next_id = rows.len() as i64 + 1;
            let now = Utc::now();
            let idx = match rows.iter().position(|p| p.user_id == user_id) {
                Some(idx) => idx,
                None => {
                    rows.push(UserProfile {
                        id: next_id,
                        user_id: user_id.to_string(),
                        trade: input.trade,
                        current_level: input.current_level,
                        specialization: input.specialization,
                        residency_status: input.residency_status,
                        onboarding_completed_at: None,
                        tutorial_completed_at: None,
                        created_at: now,
                        updated_at: now,
                    });
                    rows.len() - 1
                }
            };
            let row = &mut rows[idx];
            row.trade = input.trade;
            row.current_level = input.current_level;
            row.specialization = input.specialization;
            row.residency_status = input.residency_status;
            row.onboarding_completed_at = Some(onboarding_completed_at);
            row.updated_at = now;
            Ok(row.clone())
        }

        async fn update(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|p| p.user_id == profile.user_id)
                .ok_or(RepositoryError::NotFound)?;
            *row = profile.clone();
            Ok(())
        }
    }

    fn answers() -> ProfileInput {
        ProfileInput {
            trade: Trade::Electrician,
            current_level: ApprenticeshipLevel::Level2,
            specialization: Specialization::Construction,
            residency_status: ResidencyStatus::Citizen,
        }
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let svc = ProfileService::new(MemoryProfiles::default());
        assert!(matches!(svc.get("u").await, Err(ProfileError::NotFound)));
        assert!(matches!(
            svc.update("u", ProfileUpdate::default()).await,
            Err(ProfileError::NotFound)
        ));
        assert!(matches!(
            svc.complete_tutorial("u").await,
            Err(ProfileError::NotFound)
        ));
    }

    #[tokio::test]
    async fn onboarding_upserts_and_stamps() {
        let svc = ProfileService::new(MemoryProfiles::default());
        let first = svc.save_onboarding("u", answers()).await.unwrap();
        assert!(first.onboarding_completed_at.is_some());

        let mut changed = answers();
        changed.current_level = ApprenticeshipLevel::Level3;
        let second = svc.save_onboarding("u", changed).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.current_level, ApprenticeshipLevel::Level3);
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let svc = ProfileService::new(MemoryProfiles::default());
        svc.save_onboarding("u", answers()).await.unwrap();
        let updated = svc
            .update(
                "u",
                ProfileUpdate {
                    specialization: Some(Specialization::Industrial),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.specialization, Specialization::Industrial);
        assert_eq!(updated.current_level, ApprenticeshipLevel::Level2);
        assert_eq!(svc.get("u").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn tutorial_completion_is_recorded() {
        let svc = ProfileService::new(MemoryProfiles::default());
        svc.save_onboarding("u", answers()).await.unwrap();
        let profile = svc.complete_tutorial("u").await.unwrap();
        assert!(profile.tutorial_completed_at.is_some());
    }
}
