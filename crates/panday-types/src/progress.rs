use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Completion state of a single roadmap node for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NodeStatus {
    #[default]
    Base,
    InProgress,
    Completed,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Base => write!(f, "base"),
            NodeStatus::InProgress => write!(f, "in-progress"),
            NodeStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for NodeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(NodeStatus::Base),
            "in-progress" => Ok(NodeStatus::InProgress),
            "completed" => Ok(NodeStatus::Completed),
            other => Err(format!("invalid node status: '{other}'")),
        }
    }
}

/// Completion summary for a hub or connector node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressData {
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
}

impl ProgressData {
    /// Build a summary; percentage is rounded and 0 when there is nothing to count.
    pub fn new(completed: usize, total: usize) -> Self {
        let percentage = if total > 0 {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };
        Self {
            completed,
            total,
            percentage,
        }
    }
}

/// A persisted node status row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProgress {
    pub user_id: String,
    pub roadmap_id: String,
    pub node_id: String,
    pub status: NodeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&NodeStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!("completed".parse::<NodeStatus>().unwrap(), NodeStatus::Completed);
        assert!("done".parse::<NodeStatus>().is_err());
    }

    #[test]
    fn percentage_rounds_and_handles_empty() {
        assert_eq!(ProgressData::new(1, 3).percentage, 33);
        assert_eq!(ProgressData::new(2, 3).percentage, 67);
        assert_eq!(ProgressData::new(0, 0).percentage, 0);
        assert_eq!(ProgressData::new(4, 4).percentage, 100);
    }
}
