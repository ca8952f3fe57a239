//! Route protection patterns.
//!
//! Patterns use the identity provider's matcher syntax: a trailing `(.*)`
//! matches any suffix, anything else must match the path exactly.

/// Page routes that require a signed-in user.
pub const PROTECTED_ROUTE_PATTERNS: &[&str] = &["/roadmap(.*)", "/profile(.*)"];

/// Where unauthenticated users are sent.
pub const SIGN_IN_PATH: &str = "/auth/signin";

const STATIC_EXTENSIONS: &[&str] = &[
    "html", "htm", "css", "js", "jpg", "jpeg", "webp", "png", "gif", "svg", "ttf", "woff",
    "woff2", "ico", "csv", "doc", "docx", "xls", "xlsx", "zip", "webmanifest",
];

/// Compiled set of route patterns.
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    exact: Vec<String>,
    prefixes: Vec<String>,
}

impl RouteMatcher {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut exact = Vec::new();
        let mut prefixes = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            match pattern.strip_suffix("(.*)") {
                Some(prefix) => prefixes.push(prefix.to_string()),
                None => exact.push(pattern.to_string()),
            }
        }
        Self { exact, prefixes }
    }

    /// Matcher for [`PROTECTED_ROUTE_PATTERNS`].
    pub fn protected() -> Self {
        Self::new(PROTECTED_ROUTE_PATTERNS)
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.exact.iter().any(|p| p == path) || self.prefixes.iter().any(|p| path.starts_with(p))
    }
}

/// Whether the session middleware should run for `path` at all.
///
/// Framework internals and static assets are skipped; API routes always run.
pub fn is_middleware_path(path: &str) -> bool {
    if path.starts_with("/api") || path.starts_with("/trpc") {
        return true;
    }
    if path.starts_with("/_next") {
        return false;
    }
    let last = path.rsplit('/').next().unwrap_or_default();
    match last.rsplit_once('.') {
        Some((_, ext)) => !STATIC_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => true,
    }
}

/// Sign-in redirect target preserving the original location.
pub fn sign_in_redirect(original_path: &str) -> String {
    let mut encoded = String::with_capacity(original_path.len());
    for b in original_path.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                encoded.push(b as char)
            }
            _ => encoded.push_str(&format!("%{b:02X}")),
        }
    }
    format!("{SIGN_IN_PATH}?redirect_url={encoded}")
}
