//! Query parameters for list endpoints.
//!
//! Numeric parameters arrive as strings so a malformed value becomes a
//! field error instead of an extractor rejection.

use serde::Deserialize;

use panday_types::error::FieldErrors;

use crate::http::error::AppError;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ThreadListQuery {
    pub limit: Option<String>,
    pub cursor: Option<String>,
    pub roadmap_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct MessageListQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProgressQuery {
    pub roadmap_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FaqQuery {
    pub category_id: Option<String>,
    /// Only the literal `true` selects the global list.
    pub global: Option<String>,
}

/// Parse an optional integer `limit`; range checks are left to the service.
pub fn parse_limit(raw: Option<&str>, message: &'static str) -> Result<Option<u32>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<i64>() {
        Ok(n) if n < 1 => {
            let mut details = FieldErrors::new();
            details.add("limit", "Number must be greater than or equal to 1");
            Err(AppError::invalid(message, details))
        }
        Ok(n) => Ok(Some(u32::try_from(n).unwrap_or(u32::MAX))),
        Err(_) => {
            let mut details = FieldErrors::new();
            details.add("limit", "Expected integer, received string");
            Err(AppError::invalid(message, details))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_parsing() {
        assert_eq!(parse_limit(None, "Invalid query").unwrap(), None);
        assert_eq!(parse_limit(Some(""), "Invalid query").unwrap(), None);
        assert_eq!(parse_limit(Some("25"), "Invalid query").unwrap(), Some(25));
        assert!(parse_limit(Some("abc"), "Invalid query").is_err());
        assert!(parse_limit(Some("0"), "Invalid query").is_err());
        assert!(parse_limit(Some("-3"), "Invalid limit").is_err());
    }
}
