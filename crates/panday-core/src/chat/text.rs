//! Thread title and preview derivation.

use panday_types::chat::DEFAULT_THREAD_TITLE;

pub const TITLE_MAX_CHARS: usize = 80;
pub const PREVIEW_MAX_CHARS: usize = 180;

/// Collapse every whitespace run to a single space and trim.
pub fn sanitize_text(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_with_ellipsis(clean: String, max_chars: usize) -> String {
    if clean.chars().count() <= max_chars {
        return clean;
    }
    let head: String = clean.chars().take(max_chars - 1).collect();
    format!("{}…", head.trim_end())
}

/// Title from a first message, at most [`TITLE_MAX_CHARS`] characters.
pub fn derive_thread_title(content: &str) -> String {
    let clean = sanitize_text(content);
    if clean.is_empty() {
        return DEFAULT_THREAD_TITLE.to_string();
    }
    truncate_with_ellipsis(clean, TITLE_MAX_CHARS)
}

/// Sidebar preview of a message, at most [`PREVIEW_MAX_CHARS`] characters.
pub fn build_message_preview(content: &str) -> String {
    truncate_with_ellipsis(sanitize_text(content), PREVIEW_MAX_CHARS)
}
