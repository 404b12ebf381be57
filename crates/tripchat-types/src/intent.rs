//! Structured assistant output and the content queries derived from it.

use serde::{Deserialize, Serialize};

/// The typed, guaranteed-shape form of one Completion Service reply.
///
/// `used_fallback` separates the trusted structured case from the raw-text
/// fallback case; both project to the same fields so downstream code does
/// not branch on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedResponse {
    /// Non-empty text shown to the user.
    pub reply: String,
    pub location: String,
    pub tags: Vec<String>,
    pub show_posts: bool,
    pub used_fallback: bool,
}

impl ValidatedResponse {
    /// Wrap raw text as a reply with every intent signal defaulted.
    pub fn fallback(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            location: String::new(),
            tags: Vec::new(),
            show_posts: false,
            used_fallback: true,
        }
    }

    /// Serialize into the same object shape the model is asked to produce.
    ///
    /// This is what gets stored as the assistant turn, so later prompts only
    /// ever see well-formed history.
    pub fn to_turn_content(&self) -> String {
        serde_json::json!({
            "reply": self.reply,
            "keywords": {
                "location": self.location,
                "tags": self.tags,
                "showPosts": self.show_posts,
            },
        })
        .to_string()
    }
}

/// Parameters for a Content Search Service lookup.
///
/// At least one of `location` / `tags` is non-empty; values are lower-cased
/// and trimmed, tags are de-duplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}
