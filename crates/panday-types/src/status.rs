use serde::{Deserialize, Serialize};

/// Health of a single dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Ok,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub name: String,
    pub state: ServiceState,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentStatus {
    /// "production" or "development".
    pub deployment_target: String,
    pub database: String,
    /// "Upstash" or "Local Redis".
    pub kv_provider: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub environment: EnvironmentStatus,
    pub services: Vec<ServiceStatus>,
}

impl SystemStatus {
    /// Worst state across all services.
    pub fn overall(&self) -> ServiceState {
        if self.services.iter().any(|s| s.state == ServiceState::Error) {
            ServiceState::Error
        } else if self.services.iter().any(|s| s.state == ServiceState::Warn) {
            ServiceState::Warn
        } else {
            ServiceState::Ok
        }
    }
}
