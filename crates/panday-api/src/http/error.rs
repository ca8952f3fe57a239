//! Application error type mapping to HTTP status codes.
//!
//! Every error body is `{ "error": <message> }`, with a `details` object for
//! validation failures.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use panday_types::error::{
    ChatError, FieldErrors, KvError, ProfileError, ProgressError, RateLimitError, RepositoryError,
    RoadmapError, ThreadError,
};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Thread(ThreadError),
    Profile(ProfileError),
    Progress(ProgressError),
    Roadmap(RoadmapError),
    Chat(ChatError),
    RateLimit(RateLimitError),
    Kv(KvError),
    Repository(RepositoryError),
    /// No valid session on a route that needs one.
    Unauthorized,
    NotFound(&'static str),
    BadRequest {
        message: String,
        details: Option<Value>,
    },
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            details: None,
        }
    }

    /// A 400 carrying field-level details.
    pub fn invalid(message: impl Into<String>, details: FieldErrors) -> Self {
        AppError::BadRequest {
            message: message.into(),
            details: serde_json::to_value(details).ok(),
        }
    }

    /// Status, client-facing message and optional details.
    fn parts(&self) -> (StatusCode, String, Option<Value>) {
        match self {
            AppError::Thread(ThreadError::NotFound) => {
                (StatusCode::NOT_FOUND, "Thread not found".to_string(), None)
            }
            AppError::Thread(ThreadError::Invalid { message, details }) => (
                StatusCode::BAD_REQUEST,
                message.to_string(),
                serde_json::to_value(details).ok(),
            ),
            AppError::Thread(e @ ThreadError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None)
            }
            AppError::Profile(ProfileError::NotFound) => {
                (StatusCode::NOT_FOUND, "Profile not found".to_string(), None)
            }
            AppError::Profile(e @ ProfileError::Invalid(details)) => (
                StatusCode::BAD_REQUEST,
                e.to_string(),
                serde_json::to_value(details).ok(),
            ),
            AppError::Profile(e @ ProfileError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None)
            }
            AppError::Progress(e @ ProgressError::MissingRoadmapId) => {
                (StatusCode::BAD_REQUEST, e.to_string(), None)
            }
            AppError::Progress(e @ ProgressError::Invalid(details)) => (
                StatusCode::BAD_REQUEST,
                e.to_string(),
                serde_json::to_value(details).ok(),
            ),
            AppError::Progress(e @ ProgressError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None)
            }
            AppError::Roadmap(e @ RoadmapError::InvalidId(_)) => {
                (StatusCode::BAD_REQUEST, e.to_string(), None)
            }
            AppError::Roadmap(e @ RoadmapError::Listing(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None)
            }
            AppError::Roadmap(e) => (StatusCode::NOT_FOUND, e.to_string(), None),
            AppError::Chat(e @ ChatError::InvalidMessage) => {
                (StatusCode::BAD_REQUEST, e.to_string(), None)
            }
            AppError::Chat(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None),
            AppError::RateLimit(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None),
            AppError::Kv(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None),
            AppError::Repository(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string(), None),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message.to_string(), None),
            AppError::BadRequest { message, details } => {
                (StatusCode::BAD_REQUEST, message.clone(), details.clone())
            }
            AppError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message.clone(), None)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (status, message, _) = self.parts();
        write!(f, "{} {message}", status.as_u16())
    }
}

/// Keep client errors as they are; log a server error and answer with
/// `message` instead of its internals.
pub fn or_internal<E: Into<AppError>>(message: &'static str) -> impl FnOnce(E) -> AppError {
    move |e| {
        let err = e.into();
        if err.status().is_server_error() {
            tracing::error!(error = %err, "{message}");
            AppError::Internal(message.to_string())
        } else {
            err
        }
    }
}

macro_rules! from_domain {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for AppError {
                fn from(e: $source) -> Self {
                    AppError::$variant(e)
                }
            }
        )*
    };
}

from_domain!(
    ThreadError => Thread,
    ProfileError => Profile,
    ProgressError => Progress,
    RoadmapError => Roadmap,
    ChatError => Chat,
    RateLimitError => RateLimit,
    KvError => Kv,
    RepositoryError => Repository,
);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = self.parts();
        let body = match details {
            Some(details) => json!({ "error": message, "details": details }),
            None => json!({ "error": message }),
        };
        (status, Json(body)).into_response()
    }
}
