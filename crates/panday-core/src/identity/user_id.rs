//! Anonymous user identifier persisted in the `panday_user_id` cookie.
//!
//! The identifier is a random v4 UUID. Once a request carries the cookie it
//! is never overwritten; issuance only happens when the cookie is absent.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use panday_types::error::IdentityError;

const USER_ID_COOKIE_NAME: &str = "panday_user_id";

/// One year, in seconds.
pub const COOKIE_MAX_AGE_SECS: i64 = 365 * 24 * 60 * 60;

/// Where an identifier is being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuanceContext {
    /// Client-side code with access to the browser's crypto source.
    Browser,
    /// Server-side request handling.
    Server,
}

/// Name of the identifier cookie.
pub fn cookie_name() -> &'static str {
    USER_ID_COOKIE_NAME
}

/// Generate an identifier synchronously.
///
/// Only permitted in a browser-like context; server code must use
/// [`generate_user_id_async`].
pub fn generate_user_id(context: IssuanceContext) -> Result<String, IdentityError> {
    match context {
        IssuanceContext::Browser => Ok(Uuid::new_v4().to_string()),
        IssuanceContext::Server => Err(IdentityError::NotInBrowserContext),
    }
}

/// Generate an identifier in any context.
pub async fn generate_user_id_async() -> String {
    Uuid::new_v4().to_string()
}

/// `Set-Cookie` value issued by the server: HttpOnly, SameSite=Lax.
pub fn server_cookie_header(user_id: &str) -> String {
    format!(
        "{USER_ID_COOKIE_NAME}={user_id}; Max-Age={COOKIE_MAX_AGE_SECS}; Path=/; HttpOnly; SameSite=Lax"
    )
}

/// Cookie string written by browser code: absolute expiry, readable by scripts.
pub fn client_cookie_header(user_id: &str, now: DateTime<Utc>) -> String {
    let expires = now + Duration::seconds(COOKIE_MAX_AGE_SECS);
    format!(
        "{USER_ID_COOKIE_NAME}={user_id}; expires={}; path=/",
        expires.format("%a, %d %b %Y %H:%M:%S GMT")
    )
}

/// Extract the identifier from a `Cookie` request header, if present and non-empty.
pub fn read_user_id(cookie_header: Option<&str>) -> Option<String> {
    cookie_header?
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            (name == USER_ID_COOKIE_NAME && !value.is_empty()).then(|| value.to_string())
        })
}

/// Outcome of [`ensure_user_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIdResolution {
    /// The request already carried an identifier; nothing to issue.
    Existing(String),
    /// A fresh identifier was generated and must be sent back.
    Issued { user_id: String, set_cookie: String },
}

impl UserIdResolution {
    pub fn user_id(&self) -> &str {
        match self {
            UserIdResolution::Existing(id) => id,
            UserIdResolution::Issued { user_id, .. } => user_id,
        }
    }
}

/// Idempotent server-side issuance for a request's `Cookie` header.
pub async fn ensure_user_id(cookie_header: Option<&str>) -> UserIdResolution {
    match read_user_id(cookie_header) {
        Some(existing) => UserIdResolution::Existing(existing),
        None => {
            let user_id = generate_user_id_async().await;
            let set_cookie = server_cookie_header(&user_id);
            UserIdResolution::Issued {
                user_id,
                set_cookie,
            }
        }
    }
}
