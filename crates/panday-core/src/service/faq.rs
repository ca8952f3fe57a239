//! FAQ listing service.

use panday_types::error::RepositoryError;
use panday_types::faq::{FaqListing, GLOBAL_FAQ_LIMIT};
use tracing::debug;

use crate::repository::faq::FaqRepository;

pub struct FaqService<R: FaqRepository> {
    repo: R,
}

impl<R: FaqRepository> FaqService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// `global` wins over `category_id`; with neither, every category is
    /// listed with its entries.
    pub async fn list(
        &self,
        category_id: Option<&str>,
        global: bool,
    ) -> Result<FaqListing, RepositoryError> {
        if global {
            let entries = self.repo.global_entries(GLOBAL_FAQ_LIMIT).await?;
            debug!(count = entries.len(), "global faq entries fetched");
            return Ok(FaqListing::Entries(entries));
        }
        if let Some(category_id) = category_id.filter(|c| !c.is_empty()) {
            let entries = self.repo.entries_in_category(category_id).await?;
            debug!(category_id, count = entries.len(), "faq category fetched");
            return Ok(FaqListing::Entries(entries));
        }
        let categories = self.repo.categories_with_entries().await?;
        debug!(count = categories.len(), "faq categories fetched");
        Ok(FaqListing::Categories(categories))
    }
}

#[cfg(test)]
mod tests {
    use panday_types::faq::{FaqCategory, FaqEntry};

    use super::*;

    fn entry(id: &str, category: Option<&str>, global: bool) -> FaqEntry {
        FaqEntry {
            id: id.to_string(),
            category_id: category.map(str::to_string),
            question: format!("question {id}"),
            answer: "answer".to_string(),
            variations: Vec::new(),
            frequency: 1,
            display_order: 0,
            is_global: global,
        }
    }

    struct FixedFaqs {
        entries: Vec<FaqEntry>,
    }

    impl FaqRepository for FixedFaqs {
        async fn global_entries(&self, limit: u32) -> Result<Vec<FaqEntry>, RepositoryError> {
            Ok(self
                .entries
                .iter()
                .filter(|e| e.is_global)
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn entries_in_category(
            &self,
            category_id: &str,
        ) -> Result<Vec<FaqEntry>, RepositoryError> {
            Ok(self
                .entries
                .iter()
                .filter(|e| e.category_id.as_deref() == Some(category_id))
                .cloned()
                .collect())
        }

        async fn categories_with_entries(&self) -> Result<Vec<FaqCategory>, RepositoryError> {
            Ok(vec![FaqCategory {
                id: "wages".to_string(),
                name: "Wages".to_string(),
                description: None,
                display_order: 0,
                faq_entries: self.entries_in_category("wages").await?,
            }])
        }
    }

    fn service() -> FaqService<FixedFaqs> {
        let mut entries: Vec<_> = (0..25)
            .map(|i| entry(&format!("g{i}"), None, true))
            .collect();
        entries.push(entry("w1", Some("wages"), false));
        FaqService::new(FixedFaqs { entries })
    }

    #[tokio::test]
    async fn global_listing_is_capped() {
        let FaqListing::Entries(entries) = service().list(Some("wages"), true).await.unwrap()
        else {
            panic!("expected entries");
        };
        assert_eq!(entries.len(), GLOBAL_FAQ_LIMIT as usize);
        assert!(entries.iter().all(|e| e.is_global));
    }

    #[tokio::test]
    async fn category_listing_filters_entries() {
        let listing = service().list(Some("wages"), false).await.unwrap();
        assert_eq!(listing, FaqListing::Entries(vec![entry("w1", Some("wages"), false)]));
    }

    #[tokio::test]
    async fn default_listing_groups_by_category() {
        let FaqListing::Categories(categories) = service().list(Some(""), false).await.unwrap()
        else {
            panic!("expected categories");
        };
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].faq_entries.len(), 1);
    }
}
