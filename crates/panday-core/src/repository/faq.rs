//! FaqRepository trait definition.

use panday_types::error::RepositoryError;
use panday_types::faq::{FaqCategory, FaqEntry};

/// Read access to FAQ entries.
///
/// Entry lists are ordered by frequency (desc), then display order, then
/// question.
pub trait FaqRepository: Send + Sync {
    fn global_entries(
        &self,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<FaqEntry>, RepositoryError>> + Send;

    fn entries_in_category(
        &self,
        category_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<FaqEntry>, RepositoryError>> + Send;

    /// Every category by display order then name, each with its entries.
    fn categories_with_entries(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<FaqCategory>, RepositoryError>> + Send;
}
