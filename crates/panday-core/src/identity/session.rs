//! Session verification port.
//!
//! Sessions are issued by the external identity provider. The server only
//! verifies the token it receives; implementations live in panday-infra.

use panday_types::error::IdentityError;

/// Cookie the identity provider stores its session token in.
pub const SESSION_COOKIE: &str = "__session";

/// A verified session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Identity-provider user ID (`sub` claim).
    pub user_id: String,
    /// Provider session ID (`sid` claim), when present.
    pub session_id: Option<String>,
}

/// Verifies session tokens presented by the browser.
pub trait SessionVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Session, IdentityError>;
}

/// Pick the session token from a request.
///
/// A `Bearer` authorization header wins over the session cookie.
pub fn extract_session_token(
    authorization: Option<&str>,
    cookie_header: Option<&str>,
) -> Option<String> {
    if let Some(token) = authorization
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }

    cookie_header?.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}
