//! Validation of raw Completion Service output.
//!
//! This is the only place untrusted model text becomes a typed value. Every
//! input, however malformed, maps to a [`ValidatedResponse`] with a
//! non-empty `reply`; there is no error path.
//!
//! Parsing goes through `serde_json::Value` rather than a derived struct so
//! each field can be defaulted on its own: a wrong-typed `tags` must not
//! discard a perfectly good `reply`.

use serde_json::{Map, Value};
use tracing::warn;

use tripchat_types::intent::ValidatedResponse;

/// Reply used when the model returned nothing but whitespace.
pub const EMPTY_OUTPUT_REPLY: &str =
    "Sorry, I couldn't come up with an answer just now. Could you rephrase your question?";

const PREVIEW_CHARS: usize = 200;

/// Stateless validator for Completion Service output.
pub struct ResponseValidator;

impl ResponseValidator {
    /// Map raw model output to a guaranteed-shape response.
    ///
    /// Falls back to wrapping the trimmed raw text as `reply` when the text
    /// is not a JSON object or lacks a non-empty string `reply`.
    pub fn validate(raw: &str) -> ValidatedResponse {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            warn!("completion returned empty output; using canned reply");
            return ValidatedResponse::fallback(EMPTY_OUTPUT_REPLY);
        }

        let object = match serde_json::from_str::<Value>(strip_code_fence(trimmed)) {
            Ok(Value::Object(object)) => object,
            Ok(other) => {
                warn!(
                    json_type = json_type(&other),
                    content_preview = %preview(trimmed),
                    "completion output is JSON but not an object; falling back to raw text"
                );
                return ValidatedResponse::fallback(trimmed);
            }
            Err(e) => {
                warn!(
                    error = %e,
                    content_preview = %preview(trimmed),
                    "completion output is not valid JSON; falling back to raw text"
                );
                return ValidatedResponse::fallback(trimmed);
            }
        };

        let Some(reply) = object
            .get("reply")
            .and_then(Value::as_str)
            .filter(|r| !r.trim().is_empty())
        else {
            warn!(
                content_preview = %preview(trimmed),
                "completion output has no usable reply field; falling back to raw text"
            );
            return ValidatedResponse::fallback(trimmed);
        };

        let keywords = object.get("keywords").and_then(Value::as_object);

        ValidatedResponse {
            reply: reply.to_string(),
            location: keywords.map(location_of).unwrap_or_default(),
            tags: keywords.map(tags_of).unwrap_or_default(),
            show_posts: keywords
                .and_then(|k| k.get("showPosts"))
                .and_then(Value::as_bool)
                .unwrap_or(false),
            used_fallback: false,
        }
    }
}

fn location_of(keywords: &Map<String, Value>) -> String {
    keywords
        .get("location")
        .and_then(Value::as_str)
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_default()
}

/// `tags` only counts when it is an array made entirely of strings.
fn tags_of(keywords: &Map<String, Value>) -> Vec<String> {
    let Some(items) = keywords.get("tags").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default()
}

/// Remove a surrounding Markdown code fence (```` ```json ... ``` ````), if any.
fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```").and_then(|t| t.strip_suffix("```")) else {
        return text;
    };
    // The opening fence line may carry a language tag.
    match inner.find('\n') {
        Some(idx) => inner[idx + 1..].trim(),
        None => inner.trim(),
    }
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
