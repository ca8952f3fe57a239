//! Shared-secret guard for scheduled (cron) endpoints.
//!
//! The caller must present `Authorization: Bearer <CRON_SECRET>`. The check is
//! a single synchronous comparison: no retries, no side effects beyond a
//! `warn` log on denial.

use tracing::warn;

/// Why a cron request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CronDenial {
    /// No secret is configured on the server; every request is refused.
    SecretNotConfigured,
    /// Header missing or not exactly `Bearer <secret>`.
    Unauthorized,
}

impl CronDenial {
    /// HTTP status code for the denial.
    pub fn status_code(&self) -> u16 {
        match self {
            CronDenial::SecretNotConfigured => 500,
            CronDenial::Unauthorized => 401,
        }
    }

    /// Error message returned to the caller.
    pub fn message(&self) -> &'static str {
        match self {
            CronDenial::SecretNotConfigured => "Cron secret not configured",
            CronDenial::Unauthorized => "Unauthorized",
        }
    }
}

/// Verify a cron request's `Authorization` header value.
///
/// Returns `None` when the request may proceed.
pub fn verify_cron_request(
    configured_secret: Option<&str>,
    authorization: Option<&str>,
) -> Option<CronDenial> {
    let secret = match configured_secret {
        Some(s) if !s.is_empty() => s,
        _ => {
            warn!("CRON_SECRET is not configured; refusing cron request");
            return Some(CronDenial::SecretNotConfigured);
        }
    };

    let expected = format!("Bearer {secret}");
    if authorization != Some(expected.as_str()) {
        warn!(
            header_present = authorization.is_some(),
            "unauthorized cron request"
        );
        return Some(CronDenial::Unauthorized);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_secret_refuses_regardless_of_header() {
        assert_eq!(
            verify_cron_request(None, Some("Bearer anything")),
            Some(CronDenial::SecretNotConfigured)
        );
        assert_eq!(
            verify_cron_request(None, None),
            Some(CronDenial::SecretNotConfigured)
        );
        assert_eq!(
            verify_cron_request(Some(""), Some("Bearer ")),
            Some(CronDenial::SecretNotConfigured)
        );
        assert_eq!(CronDenial::SecretNotConfigured.status_code(), 500);
    }

    #[test]
    fn matching_bearer_is_allowed() {
        assert_eq!(verify_cron_request(Some("s3cret"), Some("Bearer s3cret")), None);
    }

    #[test]
    fn wrong_or_missing_header_is_unauthorized() {
        for header in [
            None,
            Some("Bearer wrong"),
            Some("s3cret"),
            Some("bearer s3cret"),
            Some("Bearer s3cret "),
        ] {
            let denial = verify_cron_request(Some("s3cret"), header);
            assert_eq!(denial, Some(CronDenial::Unauthorized), "header: {header:?}");
        }
        assert_eq!(CronDenial::Unauthorized.status_code(), 401);
        assert_eq!(CronDenial::Unauthorized.message(), "Unauthorized");
    }
}
