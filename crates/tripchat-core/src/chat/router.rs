//! Decides whether a validated reply warrants a Content Search Service call.
//!
//! The router only builds the query. Fetching is the orchestrator's job.

use tracing::info;

use tripchat_types::intent::{ContentQuery, ValidatedResponse};

pub struct IntentRouter;

impl IntentRouter {
    /// Returns `None` unless the user explicitly asked for shared posts and
    /// there is something to search on.
    pub fn route(validated: &ValidatedResponse) -> Option<ContentQuery> {
        if !validated.show_posts {
            return None;
        }

        let location = normalize(&validated.location);
        let tags = normalize_tags(&validated.tags);

        if location.is_none() && tags.is_empty() {
            info!("posts requested but reply carried no location or tags; skipping content search");
            return None;
        }

        Some(ContentQuery { location, tags })
    }
}

fn normalize(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_lowercase())
}

/// Lower-case, trim, drop empties, de-duplicate keeping first occurrence.
fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.iter().filter_map(|t| normalize(t)) {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
