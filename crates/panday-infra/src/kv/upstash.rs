//! REST client for the managed key-value store used in production.
//!
//! Every command is a JSON array posted to the REST URL with a bearer token.
//! Responses are `{"result": ...}` or `{"error": "..."}`. String results are
//! requested base64-encoded so binary-safe values survive JSON transport.

use std::time::Duration;

use base64::Engine;
use panday_core::ratelimit::store::RateLimitStore;
use panday_core::storage::kv_store::KeyValueStore;
use panday_types::error::KvError;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;

use super::script::SLIDING_WINDOW_SCRIPT;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct RestResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl RestResponse {
    fn into_result(self) -> Result<Value, KvError> {
        match (self.error, self.result) {
            (Some(error), _) => Err(KvError::Command(error)),
            (None, result) => Ok(result.unwrap_or(Value::Null)),
        }
    }
}

/// Decode a base64-encoded string result. `null` means the key is absent.
pub fn decode_string(value: &Value) -> Result<Option<String>, KvError> {
    match value {
        Value::Null => Ok(None),
        Value::String(encoded) => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map_err(|e| KvError::Protocol(format!("invalid base64 result: {e}")))?;
            String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| KvError::Protocol(format!("non-utf8 result: {e}")))
        }
        other => Err(KvError::Protocol(format!("expected string result, got {other}"))),
    }
}

pub fn decode_integer(value: &Value) -> Result<i64, KvError> {
    value
        .as_i64()
        .ok_or_else(|| KvError::Protocol(format!("expected integer result, got {value}")))
}

pub struct UpstashKvStore {
    client: reqwest::Client,
    url: String,
    token: SecretString,
}

impl UpstashKvStore {
    pub fn new(url: &str, token: SecretString) -> Result<Self, KvError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| KvError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<reqwest::Response, KvError> {
        let response = self
            .client
            .post(format!("{}{path}", self.url))
            .bearer_auth(self.token.expose_secret())
            .header("Upstash-Encoding", "base64")
            .json(body)
            .send()
            .await
            .map_err(|e| KvError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "key-value REST error response");
            return Err(KvError::Unavailable(format!("HTTP {status}: {body}")));
        }
        Ok(response)
    }

    /// Run one command and return its raw `result`.
    pub async fn command(&self, args: &[&str]) -> Result<Value, KvError> {
        let response = self.post("", &serde_json::json!(args)).await?;
        let parsed: RestResponse = response
            .json()
            .await
            .map_err(|e| KvError::Protocol(e.to_string()))?;
        parsed.into_result()
    }

    /// Run commands in one MULTI/EXEC transaction.
    pub async fn transaction(&self, commands: &[Vec<String>]) -> Result<Vec<Value>, KvError> {
        let response = self
            .post("/multi-exec", &serde_json::json!(commands))
            .await?;
        let text = response
            .text()
            .await
            .map_err(|e| KvError::Protocol(e.to_string()))?;
        // A rejected transaction comes back as a single error object.
        if let Ok(single) = serde_json::from_str::<RestResponse>(&text) {
            if let Some(error) = single.error {
                return Err(KvError::Command(error));
            }
        }
        let parsed: Vec<RestResponse> =
            serde_json::from_str(&text).map_err(|e| KvError::Protocol(e.to_string()))?;
        parsed.into_iter().map(RestResponse::into_result).collect()
    }
}

// No Debug derive: keeps the token out of logs.

impl KeyValueStore for UpstashKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        decode_string(&self.command(&["GET", key]).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), KvError> {
        match ttl {
            Some(ttl) => {
                let px = ttl.as_millis().to_string();
                self.command(&["SET", key, value, "PX", &px]).await?;
            }
            None => {
                self.command(&["SET", key, value]).await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        Ok(decode_integer(&self.command(&["DEL", key]).await?)? > 0)
    }

    async fn ping(&self) -> Result<String, KvError> {
        let reply = self.command(&["PING"]).await?;
        // Some deployments return simple strings unencoded.
        match decode_string(&reply) {
            Ok(decoded) => Ok(decoded.unwrap_or_default()),
            Err(_) => Ok(reply.as_str().unwrap_or_default().to_string()),
        }
    }
}

impl RateLimitStore for UpstashKvStore {
    async fn sliding_window(
        &self,
        current_key: &str,
        previous_key: &str,
        limit: u32,
        now_ms: u64,
        window_ms: u64,
    ) -> Result<i64, KvError> {
        let limit = limit.to_string();
        let now = now_ms.to_string();
        let window = window_ms.to_string();
        let result = self
            .command(&[
                "EVAL",
                SLIDING_WINDOW_SCRIPT,
                "2",
                current_key,
                previous_key,
                &limit,
                &now,
                &window,
                "1",
            ])
            .await?;
        decode_integer(&result)
    }

    async fn record_analytics(&self, key: &str, field: &str, ttl: Duration) -> Result<(), KvError> {
        let commands = vec![
            vec![
                "HINCRBY".to_string(),
                key.to_string(),
                field.to_string(),
                "1".to_string(),
            ],
            vec!["EXPIRE".to_string(), key.to_string(), ttl.as_secs().to_string()],
        ];
        self.transaction(&commands).await?;
        Ok(())
    }
}
