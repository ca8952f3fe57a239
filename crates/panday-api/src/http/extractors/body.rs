//! JSON request bodies decoded into `{ error, details }` failures.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use panday_types::error::FieldErrors;

use crate::http::error::AppError;

/// A request body parsed as JSON; a missing or malformed body reads as `{}`.
#[derive(Debug, Clone)]
pub struct LenientJson(pub Value);

impl<S: Send + Sync> FromRequest<S> for LenientJson {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;
        let value = serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "unreadable JSON body treated as empty");
            Value::Object(Default::default())
        });
        Ok(LenientJson(value))
    }
}

impl LenientJson {
    /// Decode into `T`, answering 400 `message` with the serde error as a
    /// form error.
    pub fn decode<T: DeserializeOwned>(self, message: &'static str) -> Result<T, AppError> {
        serde_json::from_value(self.0).map_err(|e| {
            let mut details = FieldErrors::new();
            details.form(e.to_string());
            AppError::invalid(message, details)
        })
    }
}

/// Tell an absent field (`None`) apart from an explicit `null` (`Some(None)`).
/// Use with `#[serde(default, deserialize_with = "nullable")]`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase", deny_unknown_fields)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        roadmap_id: Option<Option<String>>,
    }

    #[test]
    fn nullable_distinguishes_null_from_absent() {
        let absent: Patch = LenientJson(json!({})).decode("Invalid payload").unwrap();
        assert_eq!(absent.roadmap_id, None);

        let null: Patch = LenientJson(json!({"roadmapId": null}))
            .decode("Invalid payload")
            .unwrap();
        assert_eq!(null.roadmap_id, Some(None));

        let set: Patch = LenientJson(json!({"roadmapId": "electrician-bc"}))
            .decode("Invalid payload")
            .unwrap();
        assert_eq!(set.roadmap_id, Some(Some("electrician-bc".to_string())));
    }

    #[test]
    fn decode_failure_is_a_bad_request() {
        let err = LenientJson(json!({"unknown": 1}))
            .decode::<Patch>("Invalid payload")
            .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("Invalid payload"));
    }
}
