//! Configuration enums shared between the config loader and the services
//! that branch on them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Chat model provider selected by `AI_PROVIDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    OpenAi,
    #[default]
    Google,
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiProvider::OpenAi => write!(f, "openai"),
            AiProvider::Google => write!(f, "google"),
        }
    }
}

impl FromStr for AiProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(AiProvider::OpenAi),
            "google" => Ok(AiProvider::Google),
            other => Err(format!("Unsupported AI provider: {other}")),
        }
    }
}

/// Which key-value backend the process talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KvProvider {
    /// Managed REST key-value store (production).
    Upstash,
    /// Native Redis protocol on `REDIS_URL` (development).
    LocalRedis,
}

impl KvProvider {
    pub fn for_production(production: bool) -> Self {
        if production {
            KvProvider::Upstash
        } else {
            KvProvider::LocalRedis
        }
    }
}

impl fmt::Display for KvProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KvProvider::Upstash => write!(f, "Upstash"),
            KvProvider::LocalRedis => write!(f, "Local Redis"),
        }
    }
}
