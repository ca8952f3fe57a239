//! Request middleware: anonymous user id issuance and page protection.

use std::sync::LazyLock;

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use panday_core::identity::routes::{RouteMatcher, is_middleware_path, sign_in_redirect};
use panday_core::identity::user_id::{UserIdResolution, ensure_user_id};

use crate::http::extractors::auth::session_from_headers;
use crate::state::AppState;

static PROTECTED: LazyLock<RouteMatcher> = LazyLock::new(RouteMatcher::protected);

/// The `panday_user_id` of the current request.
///
/// `issued` is set when the id was minted for this request because none
/// arrived with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymousId {
    pub user_id: String,
    pub issued: bool,
}

/// Make sure every browser carries a `panday_user_id` cookie.
///
/// Requests that already have one pass through untouched; otherwise a fresh
/// id is generated, exposed as [`AnonymousId`] and set on the response.
pub async fn issue_user_id(mut request: Request, next: Next) -> Response {
    if !is_middleware_path(request.uri().path()) {
        return next.run(request).await;
    }

    let cookie = request
        .headers()
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let resolution = ensure_user_id(cookie.as_deref()).await;
    request.extensions_mut().insert(AnonymousId {
        user_id: resolution.user_id().to_string(),
        issued: matches!(resolution, UserIdResolution::Issued { .. }),
    });

    let mut response = next.run(request).await;
    if let UserIdResolution::Issued {
        user_id,
        set_cookie,
    } = resolution
    {
        match HeaderValue::from_str(&set_cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
                tracing::debug!(user_id = %user_id, "issued user id cookie");
            }
            Err(e) => tracing::warn!(error = %e, "user id cookie is not a valid header"),
        }
    }
    response
}

/// Send unauthenticated visitors of protected pages to sign-in.
pub async fn protect_pages(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if is_middleware_path(path)
        && PROTECTED.is_match(path)
        && session_from_headers(request.headers(), &state).is_err()
    {
        let original = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or(path);
        tracing::debug!(path, "redirecting to sign-in");
        return Redirect::temporary(&sign_in_redirect(original)).into_response();
    }
    next.run(request).await
}
