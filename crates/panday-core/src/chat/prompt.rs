//! Retrieval-augmented prompt assembly.

use panday_types::chat::{SourceDocument, config::RELEVANCE_THRESHOLD};

/// Output token cap for chat answers.
pub const MAX_OUTPUT_TOKENS: u32 = 1024;

/// System prompt embedding the retrieved context.
pub fn build_system_prompt(context: &str) -> String {
    format!(
        "You are a helpful career guidance assistant for skilled trades in British Columbia, Canada.

You have access to the following relevant information from the career roadmap database:

{context}

Use this information to answer the user's question accurately. If the information doesn't contain a direct answer, say so honestly and provide general guidance based on what you know about skilled trades in BC.

Always cite which specific sections or documents your answer comes from when possible."
    )
}

/// Sources scoring at least [`RELEVANCE_THRESHOLD`], best first.
pub fn relevant_sources(sources: &[SourceDocument]) -> Vec<SourceDocument> {
    let mut kept: Vec<SourceDocument> = sources
        .iter()
        .filter(|s| s.score >= RELEVANCE_THRESHOLD)
        .cloned()
        .collect();
    kept.sort_by(|a, b| b.score.total_cmp(&a.score));
    kept
}
