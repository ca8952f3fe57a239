//! User profile collected during onboarding.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trade the user is pursuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trade {
    Electrician,
    Exploring,
    Other,
}

/// Apprenticeship progression, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApprenticeshipLevel {
    NotStarted,
    Foundation,
    #[serde(rename = "level-1")]
    Level1,
    #[serde(rename = "level-2")]
    Level2,
    #[serde(rename = "level-3")]
    Level3,
    #[serde(rename = "level-4")]
    Level4,
    RedSeal,
}

impl ApprenticeshipLevel {
    /// All levels in progression order.
    pub const ORDER: [ApprenticeshipLevel; 7] = [
        ApprenticeshipLevel::NotStarted,
        ApprenticeshipLevel::Foundation,
        ApprenticeshipLevel::Level1,
        ApprenticeshipLevel::Level2,
        ApprenticeshipLevel::Level3,
        ApprenticeshipLevel::Level4,
        ApprenticeshipLevel::RedSeal,
    ];
}

/// Electrician specialization (Red Seal 309A vs 442A).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Specialization {
    Construction,
    Industrial,
    Undecided,
}

/// Residency status, which gates apprenticeship eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResidencyStatus {
    Citizen,
    PermanentResident,
    Other,
}

macro_rules! kebab_display {
    ($ty:ty, $($variant:path => $s:literal),+ $(,)?) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $($variant => f.write_str($s),)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok($variant),)+
                    other => Err(format!(concat!("invalid ", stringify!($ty), ": '{}'"), other)),
                }
            }
        }
    };
}

kebab_display!(Trade,
    Trade::Electrician => "electrician",
    Trade::Exploring => "exploring",
    Trade::Other => "other",
);

kebab_display!(ApprenticeshipLevel,
    ApprenticeshipLevel::NotStarted => "not-started",
    ApprenticeshipLevel::Foundation => "foundation",
    ApprenticeshipLevel::Level1 => "level-1",
    ApprenticeshipLevel::Level2 => "level-2",
    ApprenticeshipLevel::Level3 => "level-3",
    ApprenticeshipLevel::Level4 => "level-4",
    ApprenticeshipLevel::RedSeal => "red-seal",
);

kebab_display!(Specialization,
    Specialization::Construction => "construction",
    Specialization::Industrial => "industrial",
    Specialization::Undecided => "undecided",
);

kebab_display!(ResidencyStatus,
    ResidencyStatus::Citizen => "citizen",
    ResidencyStatus::PermanentResident => "permanent-resident",
    ResidencyStatus::Other => "other",
);

/// A stored user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    /// Identity-provider user ID (session `sub`).
    pub user_id: String,
    pub trade: Trade,
    pub current_level: ApprenticeshipLevel,
    pub specialization: Specialization,
    pub residency_status: ResidencyStatus,
    pub onboarding_completed_at: Option<DateTime<Utc>>,
    pub tutorial_completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full onboarding answers (POST /api/profile).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileInput {
    pub trade: Trade,
    pub current_level: ApprenticeshipLevel,
    pub specialization: Specialization,
    pub residency_status: ResidencyStatus,
}

/// Partial profile update (PATCH /api/profile).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileUpdate {
    pub trade: Option<Trade>,
    pub current_level: Option<ApprenticeshipLevel>,
    pub specialization: Option<Specialization>,
    pub residency_status: Option<ResidencyStatus>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.trade.is_none()
            && self.current_level.is_none()
            && self.specialization.is_none()
            && self.residency_status.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_serialize_with_numeric_suffix() {
        assert_eq!(
            serde_json::to_string(&ApprenticeshipLevel::Level3).unwrap(),
            "\"level-3\""
        );
        assert_eq!(
            serde_json::to_string(&ApprenticeshipLevel::NotStarted).unwrap(),
            "\"not-started\""
        );
        let parsed: ApprenticeshipLevel = serde_json::from_str("\"red-seal\"").unwrap();
        assert_eq!(parsed, ApprenticeshipLevel::RedSeal);
    }

    #[test]
    fn display_matches_serde() {
        for level in ApprenticeshipLevel::ORDER {
            let json = serde_json::to_string(&level).unwrap();
            assert_eq!(json.trim_matches('"'), level.to_string());
            assert_eq!(level.to_string().parse::<ApprenticeshipLevel>().unwrap(), level);
        }
        assert_eq!(ResidencyStatus::PermanentResident.to_string(), "permanent-resident");
    }

    #[test]
    fn profile_input_rejects_unknown_values() {
        let ok = r#"{"trade":"electrician","currentLevel":"level-2","specialization":"industrial","residencyStatus":"citizen"}"#;
        assert!(serde_json::from_str::<ProfileInput>(ok).is_ok());

        let bad = r#"{"trade":"plumber","currentLevel":"level-2","specialization":"industrial","residencyStatus":"citizen"}"#;
        assert!(serde_json::from_str::<ProfileInput>(bad).is_err());
    }

    #[test]
    fn empty_update_detected() {
        assert!(ProfileUpdate::default().is_empty());
        let update = ProfileUpdate {
            trade: Some(Trade::Exploring),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
