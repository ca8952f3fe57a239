//! Environment configuration for the Panday server.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. Empty strings count as unset. Loading never fails on a missing
//! secret; [`AppConfig::validate`] enforces what `serve` needs.

use std::path::PathBuf;

use panday_types::config::{AiProvider, KvProvider};
use panday_types::error::ConfigError;
use secrecy::SecretString;

use crate::kv::native::DEFAULT_REDIS_URL;
use crate::sqlite::pool::DEFAULT_DATABASE_URL;

pub const DEFAULT_ROADMAPS_DIR: &str = "data/roadmaps";
pub const DEFAULT_EMBEDDINGS_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

/// Model used when `AI_MODEL` is unset.
pub fn default_model(provider: AiProvider) -> &'static str {
    match provider {
        AiProvider::OpenAi => "gpt-4o-mini",
        AiProvider::Google => "gemini-2.0-flash",
    }
}

/// Credentials for the managed REST key-value store.
pub struct UpstashConfig {
    pub url: String,
    pub token: SecretString,
}

/// Identity provider keys.
#[derive(Default)]
pub struct ClerkConfig {
    pub secret_key: Option<SecretString>,
    pub publishable_key: Option<String>,
    /// PEM public key used to verify session JWTs.
    pub jwt_key: Option<String>,
    pub authorized_parties: Vec<String>,
}

impl ClerkConfig {
    /// Both keys the status report looks for are present.
    pub fn keys_loaded(&self) -> bool {
        self.secret_key.is_some() && self.publishable_key.is_some()
    }
}

pub struct AppConfig {
    pub production: bool,
    pub cron_secret: Option<SecretString>,
    pub database_url: String,
    pub redis_url: String,
    pub upstash: Option<UpstashConfig>,
    /// First REST store variable that was unset, if any.
    upstash_missing: Option<&'static str>,
    pub roadmaps_dir: PathBuf,
    pub embeddings_api_url: String,
    pub ai_provider: AiProvider,
    pub ai_model: String,
    pub openai_api_key: Option<SecretString>,
    pub google_api_key: Option<SecretString>,
    pub clerk: ClerkConfig,
    pub host: String,
    pub port: u16,
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            name,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

impl AppConfig {
    /// Load from the process environment after reading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "failed to read .env"),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let secret = |name: &str| get(name).map(SecretString::from);

        let production = match get("PRODUCTION") {
            Some(raw) => parse_bool("PRODUCTION", &raw)?,
            None => false,
        };

        let ai_provider = match get("AI_PROVIDER") {
            Some(raw) => raw.parse::<AiProvider>().map_err(|reason| ConfigError::Invalid {
                name: "AI_PROVIDER",
                reason,
            })?,
            None => AiProvider::default(),
        };

        let port = match get("PANDAY_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PANDAY_PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let (upstash, upstash_missing) =
            match (get("UPSTASH_REDIS_REST_URL"), secret("UPSTASH_REDIS_REST_TOKEN")) {
                (Some(url), Some(token)) => (Some(UpstashConfig { url, token }), None),
                (None, _) => (None, Some("UPSTASH_REDIS_REST_URL")),
                (Some(_), None) => (None, Some("UPSTASH_REDIS_REST_TOKEN")),
            };

        Ok(Self {
            production,
            cron_secret: secret("CRON_SECRET"),
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            redis_url: get("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            upstash,
            upstash_missing,
            roadmaps_dir: get("PANDAY_ROADMAPS_DIR")
                .unwrap_or_else(|| DEFAULT_ROADMAPS_DIR.to_string())
                .into(),
            embeddings_api_url: get("EMBEDDINGS_API_URL")
                .unwrap_or_else(|| DEFAULT_EMBEDDINGS_API_URL.to_string()),
            ai_provider,
            ai_model: get("AI_MODEL").unwrap_or_else(|| default_model(ai_provider).to_string()),
            openai_api_key: secret("OPENAI_API_KEY"),
            google_api_key: secret("GOOGLE_API_KEY"),
            clerk: ClerkConfig {
                secret_key: secret("CLERK_SECRET_KEY"),
                publishable_key: get("CLERK_PUBLISHABLE_KEY")
                    .or_else(|| get("NEXT_PUBLIC_CLERK_PUBLISHABLE_KEY")),
                jwt_key: get("CLERK_JWT_KEY"),
                authorized_parties: get("CLERK_AUTHORIZED_PARTIES")
                    .map(|raw| {
                        raw.split(',')
                            .map(str::trim)
                            .filter(|p| !p.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            host: get("PANDAY_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    /// Requirements for running the server.
    ///
    /// Production needs the REST store credentials; the selected model
    /// provider needs its API key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.production
            && let Some(missing) = self.upstash_missing
        {
            return Err(ConfigError::Missing(missing));
        }
        if self.model_api_key().is_none() {
            return Err(ConfigError::Missing(match self.ai_provider {
                AiProvider::OpenAi => "OPENAI_API_KEY",
                AiProvider::Google => "GOOGLE_API_KEY",
            }));
        }
        Ok(())
    }

    pub fn kv_provider(&self) -> KvProvider {
        KvProvider::for_production(self.production)
    }

    /// Key for the selected model provider.
    pub fn model_api_key(&self) -> Option<&SecretString> {
        match self.ai_provider {
            AiProvider::OpenAi => self.openai_api_key.as_ref(),
            AiProvider::Google => self.google_api_key.as_ref(),
        }
    }

    pub fn deployment_target(&self) -> &'static str {
        if self.production {
            "production"
        } else {
            "development"
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
