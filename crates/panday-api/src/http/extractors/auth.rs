//! Session and client identity extractors.
//!
//! Sessions come from `Authorization: Bearer <jwt>` or the `__session`
//! cookie and are verified by the configured [`SessionVerifier`].
//!
//! [`SessionVerifier`]: panday_core::identity::session::SessionVerifier

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, AsHeaderName, COOKIE};
use axum::http::request::Parts;

use panday_core::identity::session::{Session, extract_session_token};
use panday_types::error::IdentityError;

use crate::http::error::AppError;
use crate::http::middleware::AnonymousId;
use crate::state::AppState;

/// Identifier used when nothing else identifies the caller.
pub const ANONYMOUS: &str = "anonymous";

fn header<K: AsHeaderName>(headers: &HeaderMap, name: K) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Verify the session carried by `headers`, if any.
pub fn session_from_headers(headers: &HeaderMap, state: &AppState) -> Result<Session, IdentityError> {
    let token = extract_session_token(header(headers, AUTHORIZATION), header(headers, COOKIE))
        .ok_or(IdentityError::MissingSession)?;
    state.sessions.verify(&token)
}

/// A request with a verified session. Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Session);

impl AuthUser {
    pub fn user_id(&self) -> &str {
        &self.0.user_id
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match session_from_headers(&parts.headers, state) {
            Ok(session) => Ok(AuthUser(session)),
            Err(e) => {
                tracing::debug!(path = %parts.uri.path(), error = %e, "request rejected without session");
                Err(AppError::Unauthorized)
            }
        }
    }
}

/// Who a request counts against for rate limiting.
///
/// The session user wins, then an anonymous cookie the client sent back,
/// then the first `X-Forwarded-For` hop, then the peer address. An id minted
/// for this very request does not count: a client that drops cookies would
/// otherwise get a fresh budget every time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity(pub String);

impl FromRequestParts<AppState> for ClientIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Ok(session) = session_from_headers(&parts.headers, state) {
            return Ok(ClientIdentity(session.user_id));
        }
        if let Some(anon) = parts
            .extensions
            .get::<AnonymousId>()
            .filter(|anon| !anon.issued)
        {
            return Ok(ClientIdentity(anon.user_id.clone()));
        }
        if let Some(ip) = header(&parts.headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        {
            return Ok(ClientIdentity(ip.to_string()));
        }
        if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            return Ok(ClientIdentity(addr.ip().to_string()));
        }
        Ok(ClientIdentity(ANONYMOUS.to_string()))
    }
}
