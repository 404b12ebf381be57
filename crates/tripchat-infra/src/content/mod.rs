//! Content Search Service implementations.

pub mod http_search;

use tripchat_core::content::box_search::BoxContentSearch;
use tripchat_core::content::search::NoopContentSearch;
use tripchat_types::config::SearchConfig;
use tripchat_types::error::SearchError;

use self::http_search::HttpContentSearch;

/// Build the configured search backend; no `base_url` means nothing is ever found.
pub fn create_search(config: &SearchConfig) -> Result<BoxContentSearch, SearchError> {
    match config.base_url.as_deref() {
        Some(base_url) => Ok(BoxContentSearch::new(HttpContentSearch::new(
            base_url,
            config.timeout(),
        )?)),
        None => Ok(BoxContentSearch::new(NoopContentSearch)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_search_without_base_url_is_noop() {
        let search = create_search(&SearchConfig::default()).unwrap();
        assert_eq!(search.name(), "noop");
    }

    #[test]
    fn test_create_search_with_base_url_is_http() {
        let config = SearchConfig {
            base_url: Some("http://posts.internal:8080".to_string()),
            ..SearchConfig::default()
        };
        assert_eq!(create_search(&config).unwrap().name(), "http");
    }
}
