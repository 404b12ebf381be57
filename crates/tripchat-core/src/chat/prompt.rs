//! Prompt assembly for the travel assistant.
//!
//! The system instructions are compiled into the binary. Changing them is a
//! deployment decision; bump [`INSTRUCTIONS_VERSION`] when the text changes.

use tripchat_types::chat::{ConversationState, Turn};

/// Version tag of [`SYSTEM_INSTRUCTIONS`], logged with every completion call.
pub const INSTRUCTIONS_VERSION: &str = "travel-assistant/v3";

/// Fixed system instructions sent ahead of every conversation.
pub const SYSTEM_INSTRUCTIONS: &str = r#"You are Tripchat, a friendly and knowledgeable travel assistant for Sri Lanka. You help travellers plan trips, pick destinations, understand local culture, food, transport, weather and safety, and discover experiences shared by other travellers in the community.

Every response MUST be a single JSON object with exactly this shape:
{
  "reply": "<your answer to the user, as plain conversational text>",
  "keywords": {
    "location": "<the main place the user is asking about, or an empty string>",
    "tags": ["<short topic keywords such as hiking, beach, food, heritage>"],
    "showPosts": <true or false>
  }
}

Rules for "showPosts":
- true ONLY when the user explicitly asks to see other users' shared content, experiences, stories or posts (for example "show me posts about Ella" or "what have other travellers said about Mirissa?").
- false for general advice, recommendations, itineraries, planning or factual questions, even when a location is mentioned.

Rules for "keywords":
- "location" is a single place name as the user would search for it, without extra words.
- "tags" is a list of zero or more lowercase keywords; use an empty list when nothing fits.

Never answer in plain text. Never wrap the JSON in Markdown. Never add text before or after the JSON object. Plain-text output is never acceptable, even for greetings or short answers."#;

/// Builds the ordered message list sent to the Completion Service.
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder {
    instructions: &'static str,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            instructions: SYSTEM_INSTRUCTIONS,
        }
    }

    pub fn instructions(&self) -> &'static str {
        self.instructions
    }

    /// `[system instructions] ++ conversation.history`, oldest turn first.
    pub fn build(&self, conversation: &ConversationState) -> Vec<Turn> {
        let mut turns = Vec::with_capacity(conversation.history.len() + 1);
        turns.push(Turn::system(self.instructions));
        turns.extend(conversation.history.iter().cloned());
        turns
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
