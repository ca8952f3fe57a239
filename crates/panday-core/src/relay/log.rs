//! Browser log lines re-emitted through tracing.

use std::fmt;
use std::str::FromStr;

use panday_types::relay::ClientLogEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" | "log" => Ok(LogLevel::Info),
            "debug" | "trace" => Ok(LogLevel::Debug),
            other => Err(format!("unknown log level: '{other}'")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
        }
    }
}

/// Unknown levels are logged at info.
pub fn level_for(entry: &ClientLogEntry) -> LogLevel {
    entry.level.parse().unwrap_or(LogLevel::Info)
}

/// `[<level>] [<component>] <message>`, using the level as sent.
pub fn format_client_log(entry: &ClientLogEntry) -> String {
    format!("[{}] [{}] {}", entry.level, entry.component, entry.message)
}

/// Log a browser entry at its matching level. Returns the level used.
pub fn relay_client_log(entry: &ClientLogEntry) -> LogLevel {
    let level = level_for(entry);
    let line = format_client_log(entry);
    let data = entry
        .data
        .as_ref()
        .map(|d| d.to_string())
        .unwrap_or_default();

    match level {
        LogLevel::Error => {
            tracing::error!(target: "panday::client", component = %entry.component, data = %data, "{line}")
        }
        LogLevel::Warn => {
            tracing::warn!(target: "panday::client", component = %entry.component, data = %data, "{line}")
        }
        LogLevel::Info => {
            tracing::info!(target: "panday::client", component = %entry.component, data = %data, "{line}")
        }
        LogLevel::Debug => {
            tracing::debug!(target: "panday::client", component = %entry.component, data = %data, "{line}")
        }
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(level: &str) -> ClientLogEntry {
        ClientLogEntry {
            level: level.to_string(),
            component: "RoadmapCanvas".to_string(),
            message: "node clicked".to_string(),
            data: Some(json!({"nodeId": "level-1"})),
        }
    }

    #[test]
    fn levels_map_to_tracing_levels() {
        assert_eq!(relay_client_log(&entry("error")), LogLevel::Error);
        assert_eq!(relay_client_log(&entry("WARN")), LogLevel::Warn);
        assert_eq!(relay_client_log(&entry("info")), LogLevel::Info);
        assert_eq!(relay_client_log(&entry("debug")), LogLevel::Debug);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(relay_client_log(&entry("verbose")), LogLevel::Info);
    }

    #[test]
    fn formats_level_component_message() {
        assert_eq!(
            format_client_log(&entry("warn")),
            "[warn] [RoadmapCanvas] node clicked"
        );
    }
}
