//! BoxContentSearch -- object-safe dynamic dispatch wrapper for ContentSearch.
//!
//! Same blanket-impl shape as `BoxLlmProvider`.

use std::future::Future;
use std::pin::Pin;

use tripchat_types::chat::ContentItem;
use tripchat_types::error::SearchError;
use tripchat_types::intent::ContentQuery;

use super::search::ContentSearch;

/// Object-safe version of [`ContentSearch`] with boxed futures.
pub trait ContentSearchDyn: Send + Sync {
    fn name(&self) -> &str;

    fn search_boxed<'a>(
        &'a self,
        query: &'a ContentQuery,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ContentItem>, SearchError>> + Send + 'a>>;
}

impl<T: ContentSearch> ContentSearchDyn for T {
    fn name(&self) -> &str {
        ContentSearch::name(self)
    }

    fn search_boxed<'a>(
        &'a self,
        query: &'a ContentQuery,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ContentItem>, SearchError>> + Send + 'a>> {
        Box::pin(self.search(query, limit))
    }
}

/// Type-erased content search backend.
pub struct BoxContentSearch {
    inner: Box<dyn ContentSearchDyn + Send + Sync>,
}

impl BoxContentSearch {
    pub fn new<T: ContentSearch + 'static>(search: T) -> Self {
        Self {
            inner: Box::new(search),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn search(
        &self,
        query: &ContentQuery,
        limit: usize,
    ) -> Result<Vec<ContentItem>, SearchError> {
        self.inner.search_boxed(query, limit).await
    }
}
