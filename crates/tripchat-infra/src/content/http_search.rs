//! HTTP client for the posts service.
//!
//! `GET {base_url}/posts/search?location=..&tags=a,b&limit=N`. The service
//! answers with either a bare JSON array or `{"posts": [...]}`; items are
//! passed through untouched.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use tripchat_core::content::search::ContentSearch;
use tripchat_types::chat::ContentItem;
use tripchat_types::error::SearchError;
use tripchat_types::intent::ContentQuery;

pub struct HttpContentSearch {
    client: reqwest::Client,
    search_url: String,
    timeout: Duration,
}

impl HttpContentSearch {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Request(e.to_string()))?;

        Ok(Self {
            client,
            search_url: format!("{}/posts/search", base_url.trim_end_matches('/')),
            timeout,
        })
    }

    fn map_reqwest_error(&self, err: reqwest::Error) -> SearchError {
        if err.is_timeout() {
            SearchError::Timeout(self.timeout)
        } else {
            SearchError::Request(err.to_string())
        }
    }
}

fn query_params(query: &ContentQuery, limit: usize) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(3);
    if let Some(location) = &query.location {
        params.push(("location", location.clone()));
    }
    if !query.tags.is_empty() {
        params.push(("tags", query.tags.join(",")));
    }
    params.push(("limit", limit.to_string()));
    params
}

fn extract_items(body: Value) -> Result<Vec<Value>, SearchError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("posts") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(SearchError::Decode(
                "expected a JSON array or an object with a `posts` array".to_string(),
            )),
        },
        _ => Err(SearchError::Decode(
            "expected a JSON array or an object with a `posts` array".to_string(),
        )),
    }
}

impl ContentSearch for HttpContentSearch {
    fn name(&self) -> &str {
        "http"
    }

    async fn search(
        &self,
        query: &ContentQuery,
        limit: usize,
    ) -> Result<Vec<ContentItem>, SearchError> {
        let response = self
            .client
            .get(&self.search_url)
            .query(&query_params(query, limit))
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;
        let body: Value =
            serde_json::from_slice(&bytes).map_err(|e| SearchError::Decode(e.to_string()))?;

        let mut items = extract_items(body)?;
        items.truncate(limit);
        debug!(count = items.len(), "posts service returned items");

        Ok(items.into_iter().map(ContentItem).collect())
    }
}
