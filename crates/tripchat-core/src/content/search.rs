//! ContentSearch trait definition.
//!
//! The Content Search Service port: given a normalized [`ContentQuery`],
//! return a bounded list of opaque content items.

use tripchat_types::chat::ContentItem;
use tripchat_types::error::SearchError;
use tripchat_types::intent::ContentQuery;

/// Trait for Content Search Service backends.
///
/// Implementations live in tripchat-infra (e.g., `HttpContentSearch`).
pub trait ContentSearch: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    /// Look up at most `limit` items matching `query`.
    fn search(
        &self,
        query: &ContentQuery,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ContentItem>, SearchError>> + Send;
}

/// Backend used when no search service is configured. Never matches anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopContentSearch;

impl ContentSearch for NoopContentSearch {
    fn name(&self) -> &str {
        "noop"
    }

    async fn search(
        &self,
        _query: &ContentQuery,
        _limit: usize,
    ) -> Result<Vec<ContentItem>, SearchError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_search_returns_nothing() {
        let query = ContentQuery {
            location: Some("ella".to_string()),
            tags: vec!["hiking".to_string()],
        };
        let items = NoopContentSearch.search(&query, 10).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(NoopContentSearch.name(), "noop");
    }
}
