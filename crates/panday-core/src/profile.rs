//! Profile-driven roadmap personalization and display metadata.

use panday_types::profile::{
    ApprenticeshipLevel, ResidencyStatus, Specialization, Trade, UserProfile,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeInfo {
    pub label: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    pub label: &'static str,
    pub short_label: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecializationInfo {
    pub label: &'static str,
    pub description: &'static str,
    pub red_seal_code: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidencyInfo {
    pub label: &'static str,
    pub description: &'static str,
    pub eligible: bool,
}

pub fn trade_info(trade: Trade) -> TradeInfo {
    let (label, description) = match trade {
        Trade::Electrician => ("Electrician", "Construction or industrial electrical work"),
        Trade::Exploring => ("Exploring Options", "Still deciding which trade to pursue"),
        Trade::Other => ("Other Trade", "Another skilled trade (coming soon)"),
    };
    TradeInfo { label, description }
}

pub fn level_info(level: ApprenticeshipLevel) -> LevelInfo {
    let (label, short_label, description) = match level {
        ApprenticeshipLevel::NotStarted => {
            ("Not Started", "Start", "Haven't begun apprenticeship yet")
        }
        ApprenticeshipLevel::Foundation => (
            "Foundation Program",
            "Foundation",
            "Completing foundation training",
        ),
        ApprenticeshipLevel::Level1 => ("Level 1", "L1", "First year of apprenticeship"),
        ApprenticeshipLevel::Level2 => ("Level 2", "L2", "Second year of apprenticeship"),
        ApprenticeshipLevel::Level3 => ("Level 3", "L3", "Third year of apprenticeship"),
        ApprenticeshipLevel::Level4 => ("Level 4", "L4", "Final year of apprenticeship"),
        ApprenticeshipLevel::RedSeal => (
            "Red Seal Certified",
            "Red Seal",
            "Completed Red Seal certification",
        ),
    };
    LevelInfo {
        label,
        short_label,
        description,
    }
}

pub fn specialization_info(spec: Specialization) -> SpecializationInfo {
    match spec {
        Specialization::Construction => SpecializationInfo {
            label: "Construction Electrician",
            description: "Install and maintain electrical systems in residential, commercial, and institutional buildings (309A - 3 year program)",
            red_seal_code: "309A",
        },
        Specialization::Industrial => SpecializationInfo {
            label: "Industrial Electrician",
            description: "Work with high-voltage equipment and electrical controls in industrial facilities like factories and plants (442A - 4 year program)",
            red_seal_code: "442A",
        },
        Specialization::Undecided => SpecializationInfo {
            label: "Undecided",
            description: "Still exploring which specialization to pursue",
            red_seal_code: "N/A",
        },
    }
}

pub fn residency_info(status: ResidencyStatus) -> ResidencyInfo {
    match status {
        ResidencyStatus::Citizen => ResidencyInfo {
            label: "Canadian Citizen",
            description: "I am a Canadian citizen",
            eligible: true,
        },
        ResidencyStatus::PermanentResident => ResidencyInfo {
            label: "Permanent Resident",
            description: "I have permanent resident (PR) status",
            eligible: true,
        },
        ResidencyStatus::Other => ResidencyInfo {
            label: "Other",
            description: "Work permit, student visa, or other status",
            eligible: false,
        },
    }
}

/// Levels before `current`, in order. Empty for `not-started`.
pub fn completed_levels(current: ApprenticeshipLevel) -> Vec<ApprenticeshipLevel> {
    ApprenticeshipLevel::ORDER
        .iter()
        .copied()
        .take_while(|level| *level != current)
        .collect()
}

/// Node IDs on the other specialization's Level 4 branch.
pub fn irrelevant_nodes(spec: Specialization) -> Vec<String> {
    let branch = match spec {
        Specialization::Construction => "level-4-industrial",
        Specialization::Industrial => "level-4-construction",
        Specialization::Undecided => return Vec::new(),
    };
    std::iter::once(branch.to_string())
        .chain((1..=3).map(|i| format!("{branch}-req-{i}")))
        .collect()
}

/// Roadmap node for the user's current level.
///
/// Level 4 picks the industrial branch only for industrial electricians;
/// everyone else lands on construction.
pub fn current_level_node_id(
    level: ApprenticeshipLevel,
    spec: Option<Specialization>,
) -> Option<&'static str> {
    match level {
        ApprenticeshipLevel::NotStarted => None,
        ApprenticeshipLevel::Foundation => Some("foundation-program"),
        ApprenticeshipLevel::Level1 => Some("level-1"),
        ApprenticeshipLevel::Level2 => Some("level-2"),
        ApprenticeshipLevel::Level3 => Some("level-3"),
        ApprenticeshipLevel::Level4 => match spec {
            Some(Specialization::Industrial) => Some("level-4-industrial"),
            _ => Some("level-4-construction"),
        },
        ApprenticeshipLevel::RedSeal => Some("red-seal-certification"),
    }
}

pub fn is_eligible_for_apprenticeship(status: ResidencyStatus) -> bool {
    residency_info(status).eligible
}

/// Roadmap personalization derived from a stored profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInsights {
    pub completed_levels: Vec<ApprenticeshipLevel>,
    pub current_level_node_id: Option<&'static str>,
    pub irrelevant_nodes: Vec<String>,
    pub eligible_for_apprenticeship: bool,
    pub trade: TradeInfo,
    pub level: LevelInfo,
    pub specialization: SpecializationInfo,
    pub residency: ResidencyInfo,
}

impl ProfileInsights {
    pub fn for_profile(profile: &UserProfile) -> Self {
        Self {
            completed_levels: completed_levels(profile.current_level),
            current_level_node_id: current_level_node_id(
                profile.current_level,
                Some(profile.specialization),
            ),
            irrelevant_nodes: irrelevant_nodes(profile.specialization),
            eligible_for_apprenticeship: is_eligible_for_apprenticeship(profile.residency_status),
            trade: trade_info(profile.trade),
            level: level_info(profile.current_level),
            specialization: specialization_info(profile.specialization),
            residency: residency_info(profile.residency_status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn completed_levels_precede_current() {
        assert!(completed_levels(ApprenticeshipLevel::NotStarted).is_empty());
        assert_eq!(
            completed_levels(ApprenticeshipLevel::Foundation),
            vec![ApprenticeshipLevel::NotStarted]
        );
        assert_eq!(
            completed_levels(ApprenticeshipLevel::Level3),
            vec![
                ApprenticeshipLevel::NotStarted,
                ApprenticeshipLevel::Foundation,
                ApprenticeshipLevel::Level1,
                ApprenticeshipLevel::Level2,
            ]
        );
        assert_eq!(completed_levels(ApprenticeshipLevel::RedSeal).len(), 6);
    }

    #[test]
    fn irrelevant_nodes_hide_other_branch() {
        assert_eq!(
            irrelevant_nodes(Specialization::Construction),
            vec![
                "level-4-industrial",
                "level-4-industrial-req-1",
                "level-4-industrial-req-2",
                "level-4-industrial-req-3",
            ]
        );
        assert_eq!(irrelevant_nodes(Specialization::Industrial)[0], "level-4-construction");
        assert!(irrelevant_nodes(Specialization::Undecided).is_empty());
    }

    #[test]
    fn level_four_follows_specialization() {
        let l4 = ApprenticeshipLevel::Level4;
        assert_eq!(
            current_level_node_id(l4, Some(Specialization::Industrial)),
            Some("level-4-industrial")
        );
        assert_eq!(
            current_level_node_id(l4, Some(Specialization::Undecided)),
            Some("level-4-construction")
        );
        assert_eq!(current_level_node_id(l4, None), Some("level-4-construction"));
        assert_eq!(current_level_node_id(ApprenticeshipLevel::NotStarted, None), None);
        assert_eq!(
            current_level_node_id(ApprenticeshipLevel::RedSeal, None),
            Some("red-seal-certification")
        );
    }

    #[test]
    fn residency_gates_eligibility() {
        assert!(is_eligible_for_apprenticeship(ResidencyStatus::Citizen));
        assert!(is_eligible_for_apprenticeship(ResidencyStatus::PermanentResident));
        assert!(!is_eligible_for_apprenticeship(ResidencyStatus::Other));
    }

    #[test]
    fn insights_combine_helpers() {
        let now = Utc::now();
        let profile = UserProfile {
            id: 1,
            user_id: "user_1".to_string(),
            trade: Trade::Electrician,
            current_level: ApprenticeshipLevel::Level4,
            specialization: Specialization::Industrial,
            residency_status: ResidencyStatus::Other,
            onboarding_completed_at: Some(now),
            tutorial_completed_at: None,
            created_at: now,
            updated_at: now,
        };
        let insights = ProfileInsights::for_profile(&profile);
        assert_eq!(insights.current_level_node_id, Some("level-4-industrial"));
        assert_eq!(insights.specialization.red_seal_code, "442A");
        assert!(!insights.eligible_for_apprenticeship);
        assert_eq!(insights.completed_levels.len(), 5);

        let json = serde_json::to_value(&insights).unwrap();
        assert_eq!(json["currentLevelNodeId"], "level-4-industrial");
        assert_eq!(json["completedLevels"][2], "level-1");
    }
}
