//! Frequently asked questions shown on the landing page.
//!
//! Entries are written by an external process; the backend only reads them.

use serde::{Deserialize, Serialize};

/// Global entries returned by `GET /api/faq?global=true`.
pub const GLOBAL_FAQ_LIMIT: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqEntry {
    pub id: String,
    pub category_id: Option<String>,
    pub question: String,
    pub answer: String,
    /// Other phrasings of the same question.
    #[serde(default)]
    pub variations: Vec<String>,
    /// How often the question was asked.
    pub frequency: i64,
    pub display_order: i64,
    pub is_global: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqCategory {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i64,
    pub faq_entries: Vec<FaqEntry>,
}

/// What `GET /api/faq` returns: a flat entry list or categories with entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FaqListing {
    Entries(Vec<FaqEntry>),
    Categories(Vec<FaqCategory>),
}
