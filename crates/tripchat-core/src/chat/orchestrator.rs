//! ChatOrchestrator: the per-message pipeline.
//!
//! record user turn -> build prompt -> complete -> validate -> record
//! assistant turn -> route -> optional content lookup -> reply.
//!
//! Only the completion call can fail a request. Everything after it degrades
//! instead of erroring.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{Instrument, debug, info, info_span, warn};

use tripchat_types::chat::{ChatReply, ContentItem, ContentOutcome, ConversationState, Turn};
use tripchat_types::config::TripchatConfig;
use tripchat_types::error::ChatError;
use tripchat_types::intent::ContentQuery;
use tripchat_types::llm::{CompletionRequest, Message};

use crate::chat::prompt::{INSTRUCTIONS_VERSION, PromptBuilder};
use crate::chat::router::IntentRouter;
use crate::chat::validator::ResponseValidator;
use crate::content::box_search::BoxContentSearch;
use crate::llm::box_provider::BoxLlmProvider;
use crate::session::store::SessionStore;

/// Tunables for one orchestrator instance.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Model override; empty uses the provider's configured model.
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f64>,
    pub completion_timeout: Duration,
    pub search_timeout: Duration,
    pub search_limit: usize,
}

impl OrchestratorSettings {
    pub fn from_config(config: &TripchatConfig) -> Self {
        Self {
            model: String::new(),
            max_tokens: config.completion.max_tokens,
            temperature: Some(config.completion.temperature),
            completion_timeout: config.completion.timeout(),
            search_timeout: config.search.timeout(),
            search_limit: config.search.limit,
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from_config(&TripchatConfig::default())
    }
}

/// Composes the session store, prompt builder, validator, router and the two
/// external services into the chat entry point.
pub struct ChatOrchestrator {
    store: Arc<SessionStore>,
    prompt: PromptBuilder,
    provider: BoxLlmProvider,
    search: BoxContentSearch,
    settings: OrchestratorSettings,
}

impl ChatOrchestrator {
    pub fn new(
        store: Arc<SessionStore>,
        provider: BoxLlmProvider,
        search: BoxContentSearch,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            store,
            prompt: PromptBuilder::new(),
            provider,
            search,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn search_name(&self) -> &str {
        self.search.name()
    }

    /// Handle one user message for `session_id`.
    ///
    /// On error the user turn stays recorded and no assistant turn is added,
    /// so a retry continues the same conversation.
    #[tracing::instrument(
        skip(self, session_id, user_text),
        fields(session_id = %session_id, user_chars = user_text.chars().count())
    )]
    pub async fn handle(&self, session_id: &str, user_text: &str) -> Result<ChatReply, ChatError> {
        let conversation = self.record_user_turn(session_id, user_text);

        let raw = self.complete(&conversation).await?;
        let validated = ResponseValidator::validate(&raw);

        let assistant = Turn::assistant(validated.to_turn_content());
        if self.store.append_turn(session_id, assistant).is_none() {
            debug!("session cleared while completing; assistant turn not recorded");
        }

        let (items, outcome) = match IntentRouter::route(&validated) {
            Some(query) => self.lookup(&query).await,
            None => (Vec::new(), ContentOutcome::NotRequested),
        };

        info!(
            used_fallback = validated.used_fallback,
            show_posts = validated.show_posts,
            content = ?outcome,
            matched = items.len(),
            "chat turn handled"
        );

        Ok(ChatReply::new(validated.reply, items, outcome))
    }

    /// Drop all state for `session_id`. Returns whether anything was removed.
    pub fn clear(&self, session_id: &str) -> bool {
        let removed = self.store.clear(session_id);
        info!(session_id, removed, "session cleared");
        removed
    }

    /// Append the user turn and return the post-append snapshot.
    ///
    /// A concurrent clear or sweep can remove the session between creation
    /// and append; recreate once, then fall back to a detached conversation
    /// so the request still gets an answer.
    fn record_user_turn(&self, session_id: &str, user_text: &str) -> ConversationState {
        let turn = Turn::user(user_text);
        for _ in 0..2 {
            self.store.get_or_create(session_id);
            if let Some(state) = self.store.append_turn(session_id, turn.clone()) {
                return state;
            }
        }

        warn!(session_id, "session vanished twice while recording user turn; answering without history");
        let now = Utc::now();
        let mut detached = ConversationState::new(now);
        detached.push_turn(turn, self.store.max_history(), now);
        detached
    }

    async fn complete(&self, conversation: &ConversationState) -> Result<String, ChatError> {
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: self
                .prompt
                .build(conversation)
                .into_iter()
                .map(Message::from)
                .collect(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let model = if request.model.is_empty() {
            self.provider.default_model()
        } else {
            request.model.as_str()
        };
        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            tripchat.instructions_version = INSTRUCTIONS_VERSION,
            tripchat.prompt_turns = request.messages.len(),
        );

        let timeout = self.settings.completion_timeout;
        match tokio::time::timeout(timeout, self.provider.complete(&request).instrument(span)).await {
            Ok(Ok(response)) => {
                debug!(
                    response_id = %response.id,
                    model = %response.model,
                    stop_reason = %response.stop_reason,
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "completion received"
                );
                Ok(response.content)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "completion failed; user turn kept for retry");
                Err(ChatError::CompletionUnavailable(e))
            }
            Err(_) => {
                warn!(?timeout, "completion timed out; user turn kept for retry");
                Err(ChatError::CompletionTimeout(timeout))
            }
        }
    }

    async fn lookup(&self, query: &ContentQuery) -> (Vec<ContentItem>, ContentOutcome) {
        let limit = self.settings.search_limit;
        let span = info_span!(
            "content.search",
            backend = self.search.name(),
            location = ?query.location,
            tags = ?query.tags,
            limit,
        );

        let timeout = self.settings.search_timeout;
        match tokio::time::timeout(timeout, self.search.search(query, limit).instrument(span)).await {
            Ok(Ok(items)) if items.is_empty() => (items, ContentOutcome::NoMatches),
            Ok(Ok(mut items)) => {
                items.truncate(limit);
                (items, ContentOutcome::Found)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "content search failed; replying without posts");
                (Vec::new(), ContentOutcome::Unavailable)
            }
            Err(_) => {
                warn!(?timeout, "content search timed out; replying without posts");
                (Vec::new(), ContentOutcome::Unavailable)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use tripchat_types::chat::NO_MATCHES_MESSAGE;
    use tripchat_types::error::SearchError;
    use tripchat_types::llm::{
        CompletionResponse, LlmError, MessageRole, StopReason, Usage,
    };

    use super::*;
    use crate::chat::prompt::SYSTEM_INSTRUCTIONS;
    use crate::content::search::ContentSearch;
    use crate::llm::provider::LlmProvider;

    // --- Mock provider ---

    struct ScriptedInner {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
        calls: AtomicUsize,
        delay: Duration,
    }

    #[derive(Clone)]
    struct ScriptedProvider {
        inner: Arc<ScriptedInner>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self::with_delay(replies, Duration::ZERO)
        }

        fn with_delay(replies: Vec<Result<String, LlmError>>, delay: Duration) -> Self {
            Self {
                inner: Arc::new(ScriptedInner {
                    replies: Mutex::new(replies.into()),
                    requests: Mutex::new(Vec::new()),
                    calls: AtomicUsize::new(0),
                    delay,
                }),
            }
        }

        fn calls(&self) -> usize {
            self.inner.calls.load(Ordering::SeqCst)
        }

        fn last_request(&self) -> CompletionRequest {
            self.inner.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn default_model(&self) -> &str {
            "scripted-model"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
            self.inner.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.requests.lock().unwrap().push(request.clone());
            if !self.inner.delay.is_zero() {
                tokio::time::sleep(self.inner.delay).await;
            }
            let next = self.inner.replies.lock().unwrap().pop_front();
            let content = next.unwrap_or_else(|| Ok(r#"{"reply":"ok"}"#.to_string()))?;
            Ok(CompletionResponse {
                id: "resp-1".to_string(),
                content,
                model: "scripted-model".to_string(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }
    }

    // --- Mock search ---

    #[derive(Clone)]
    enum SearchBehavior {
        Items(Vec<ContentItem>),
        Fail,
        Hang,
    }

    #[derive(Clone)]
    struct RecordingSearch {
        behavior: SearchBehavior,
        queries: Arc<Mutex<Vec<(ContentQuery, usize)>>>,
    }

    impl RecordingSearch {
        fn new(behavior: SearchBehavior) -> Self {
            Self {
                behavior,
                queries: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn queries(&self) -> Vec<(ContentQuery, usize)> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl ContentSearch for RecordingSearch {
        fn name(&self) -> &str {
            "recording"
        }

        async fn search(
            &self,
            query: &ContentQuery,
            limit: usize,
        ) -> Result<Vec<ContentItem>, SearchError> {
            self.queries.lock().unwrap().push((query.clone(), limit));
            match &self.behavior {
                SearchBehavior::Items(items) => Ok(items.clone()),
                SearchBehavior::Fail => Err(SearchError::Status { status: 500 }),
                SearchBehavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(Vec::new())
                }
            }
        }
    }

    // --- Helpers ---

    fn settings() -> OrchestratorSettings {
        OrchestratorSettings {
            model: String::new(),
            max_tokens: 256,
            temperature: Some(0.2),
            completion_timeout: Duration::from_secs(2),
            search_timeout: Duration::from_secs(2),
            search_limit: 3,
        }
    }

    fn orchestrator(
        provider: &ScriptedProvider,
        search: &RecordingSearch,
        settings: OrchestratorSettings,
    ) -> ChatOrchestrator {
        ChatOrchestrator::new(
            Arc::new(SessionStore::default()),
            BoxLlmProvider::new(provider.clone()),
            BoxContentSearch::new(search.clone()),
            settings,
        )
    }

    fn post(id: u32) -> ContentItem {
        ContentItem(json!({ "id": id, "title": format!("post {id}") }))
    }

    fn history(orch: &ChatOrchestrator, session_id: &str) -> Vec<Turn> {
        orch.store().snapshot(session_id).unwrap().history
    }

    // --- Tests ---

    #[tokio::test]
    async fn advice_reply_skips_content_search() {
        let provider = ScriptedProvider::new(vec![Ok(
            r#"{"reply":"Visit Galle Fort","keywords":{"location":"Galle","tags":["heritage"],"showPosts":false}}"#
                .to_string(),
        )]);
        let search = RecordingSearch::new(SearchBehavior::Items(vec![post(1)]));
        let orch = orchestrator(&provider, &search, settings());

        let reply = orch.handle("s1", "What should I see in Galle?").await.unwrap();

        assert_eq!(reply.reply, "Visit Galle Fort");
        assert!(reply.matched_content.is_empty());
        assert_eq!(reply.content, ContentOutcome::NotRequested);
        assert!(reply.content_message.is_none());
        assert!(search.queries().is_empty());

        let turns = history(&orch, "s1");
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role(), MessageRole::User);
        assert_eq!(turns[0].content(), "What should I see in Galle?");
        assert_eq!(turns[1].role(), MessageRole::Assistant);
    }

    #[tokio::test]
    async fn explicit_post_request_searches_once() {
        let provider = ScriptedProvider::new(vec![Ok(
            r#"{"reply":"Here you go","keywords":{"location":"Kandy","tags":[],"showPosts":true}}"#
                .to_string(),
        )]);
        let search = RecordingSearch::new(SearchBehavior::Items(vec![post(1), post(2)]));
        let orch = orchestrator(&provider, &search, settings());

        let reply = orch.handle("s1", "Show me posts about Kandy").await.unwrap();

        assert_eq!(reply.reply, "Here you go");
        assert_eq!(reply.content, ContentOutcome::Found);
        assert_eq!(reply.matched_content, vec![post(1), post(2)]);

        let queries = search.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].0.location.as_deref(), Some("kandy"));
        assert!(queries[0].0.tags.is_empty());
        assert_eq!(queries[0].1, 3);
    }

    #[tokio::test]
    async fn plain_text_reply_is_stored_normalized() {
        let raw = "Sure, here's some advice about Ella.";
        let provider = ScriptedProvider::new(vec![Ok(raw.to_string())]);
        let search = RecordingSearch::new(SearchBehavior::Items(vec![post(1)]));
        let orch = orchestrator(&provider, &search, settings());

        let reply = orch.handle("s1", "Tell me about Ella").await.unwrap();
        assert_eq!(reply.reply, raw);
        assert_eq!(reply.content, ContentOutcome::NotRequested);

        let turns = history(&orch, "s1");
        let stored: serde_json::Value = serde_json::from_str(turns[1].content()).unwrap();
        assert_eq!(stored["reply"], raw);
        assert_eq!(stored["keywords"]["showPosts"], false);
        assert_eq!(stored["keywords"]["location"], "");
    }

    #[tokio::test]
    async fn post_request_without_keywords_skips_search() {
        let provider = ScriptedProvider::new(vec![Ok(
            r#"{"reply":"Which place?","keywords":{"location":"","tags":[],"showPosts":true}}"#.to_string(),
        )]);
        let search = RecordingSearch::new(SearchBehavior::Items(vec![post(1)]));
        let orch = orchestrator(&provider, &search, settings());

        let reply = orch.handle("s1", "Show me some posts").await.unwrap();

        assert_eq!(reply.reply, "Which place?");
        assert_eq!(reply.content, ContentOutcome::NotRequested);
        assert!(search.queries().is_empty());
    }

    #[tokio::test]
    async fn completion_failure_keeps_only_user_turn() {
        let provider = ScriptedProvider::new(vec![Err(LlmError::Provider {
            message: "connection refused".to_string(),
        })]);
        let search = RecordingSearch::new(SearchBehavior::Items(Vec::new()));
        let orch = orchestrator(&provider, &search, settings());

        let err = orch.handle("s1", "Hello?").await.unwrap_err();

        assert!(matches!(err, ChatError::CompletionUnavailable(_)));
        assert!(err.is_retryable());
        let turns = history(&orch, "s1");
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role(), MessageRole::User);
        assert!(search.queries().is_empty());
    }

    #[tokio::test]
    async fn completion_timeout_keeps_only_user_turn() {
        let provider = ScriptedProvider::with_delay(vec![], Duration::from_millis(500));
        let search = RecordingSearch::new(SearchBehavior::Items(Vec::new()));
        let orch = orchestrator(
            &provider,
            &search,
            OrchestratorSettings {
                completion_timeout: Duration::from_millis(20),
                ..settings()
            },
        );

        let err = orch.handle("s1", "Hello?").await.unwrap_err();

        assert!(matches!(err, ChatError::CompletionTimeout(d) if d == Duration::from_millis(20)));
        assert_eq!(history(&orch, "s1").len(), 1);
    }

    #[tokio::test]
    async fn retry_after_failure_continues_context() {
        let provider = ScriptedProvider::new(vec![
            Err(LlmError::Overloaded("busy".to_string())),
            Ok(r#"{"reply":"Sorry about that! Try Sigiriya."}"#.to_string()),
        ]);
        let search = RecordingSearch::new(SearchBehavior::Items(Vec::new()));
        let orch = orchestrator(&provider, &search, settings());

        assert!(orch.handle("s1", "Where to go?").await.is_err());
        let reply = orch.handle("s1", "Where to go?").await.unwrap();
        assert_eq!(reply.reply, "Sorry about that! Try Sigiriya.");

        // system + both user turns
        let request = provider.last_request();
        assert_eq!(request.messages.len(), 3);
        assert_eq!(history(&orch, "s1").len(), 3);
    }

    #[tokio::test]
    async fn search_failure_degrades_to_no_matches() {
        let provider = ScriptedProvider::new(vec![Ok(
            r#"{"reply":"Here are some","keywords":{"location":"Ella","tags":["hiking"],"showPosts":true}}"#
                .to_string(),
        )]);
        let search = RecordingSearch::new(SearchBehavior::Fail);
        let orch = orchestrator(&provider, &search, settings());

        let reply = orch.handle("s1", "Show me hiking posts in Ella").await.unwrap();

        assert_eq!(reply.reply, "Here are some");
        assert!(reply.matched_content.is_empty());
        assert_eq!(reply.content, ContentOutcome::Unavailable);
        assert_eq!(reply.content_message.as_deref(), Some(NO_MATCHES_MESSAGE));
        assert_eq!(history(&orch, "s1").len(), 2);
    }

    #[tokio::test]
    async fn search_timeout_degrades_to_no_matches() {
        let provider = ScriptedProvider::new(vec![Ok(
            r#"{"reply":"Looking","keywords":{"location":"Ella","tags":[],"showPosts":true}}"#.to_string(),
        )]);
        let search = RecordingSearch::new(SearchBehavior::Hang);
        let orch = orchestrator(
            &provider,
            &search,
            OrchestratorSettings {
                search_timeout: Duration::from_millis(20),
                ..settings()
            },
        );

        let reply = orch.handle("s1", "Show me posts about Ella").await.unwrap();

        assert_eq!(reply.content, ContentOutcome::Unavailable);
        assert!(reply.matched_content.is_empty());
    }

    #[tokio::test]
    async fn empty_search_result_reports_no_matches() {
        let provider = ScriptedProvider::new(vec![Ok(
            r#"{"reply":"Let me check","keywords":{"location":"Jaffna","tags":[],"showPosts":true}}"#.to_string(),
        )]);
        let search = RecordingSearch::new(SearchBehavior::Items(Vec::new()));
        let orch = orchestrator(&provider, &search, settings());

        let reply = orch.handle("s1", "Any posts on Jaffna?").await.unwrap();

        assert_eq!(reply.content, ContentOutcome::NoMatches);
        assert_eq!(reply.content_message.as_deref(), Some(NO_MATCHES_MESSAGE));
    }

    #[tokio::test]
    async fn oversized_search_result_is_truncated() {
        let provider = ScriptedProvider::new(vec![Ok(
            r#"{"reply":"Lots","keywords":{"location":"Mirissa","tags":[],"showPosts":true}}"#.to_string(),
        )]);
        let search = RecordingSearch::new(SearchBehavior::Items((1..=5).map(post).collect()));
        let orch = orchestrator(&provider, &search, settings());

        let reply = orch.handle("s1", "Show posts about Mirissa").await.unwrap();

        assert_eq!(reply.matched_content, vec![post(1), post(2), post(3)]);
    }

    #[tokio::test]
    async fn prompt_starts_with_instructions_and_carries_history() {
        let provider = ScriptedProvider::new(vec![
            Ok(r#"{"reply":"Try Ella"}"#.to_string()),
            Ok(r#"{"reply":"It is a hill town"}"#.to_string()),
        ]);
        let search = RecordingSearch::new(SearchBehavior::Items(Vec::new()));
        let orch = orchestrator(&provider, &search, settings());

        orch.handle("s1", "Where should I go?").await.unwrap();
        orch.handle("s1", "What is it like?").await.unwrap();

        let request = provider.last_request();
        assert_eq!(request.max_tokens, 256);
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert_eq!(request.messages[0].content, SYSTEM_INSTRUCTIONS);
        assert_eq!(request.messages[1].content, "Where should I go?");
        assert_eq!(request.messages[2].role, MessageRole::Assistant);
        let earlier: serde_json::Value = serde_json::from_str(&request.messages[2].content).unwrap();
        assert_eq!(earlier["reply"], "Try Ella");
        assert_eq!(request.messages[3].content, "What is it like?");
    }

    #[tokio::test]
    async fn history_stays_bounded_over_long_conversation() {
        let provider = ScriptedProvider::new(Vec::new());
        let search = RecordingSearch::new(SearchBehavior::Items(Vec::new()));
        let orch = orchestrator(&provider, &search, settings());

        for i in 0..8 {
            orch.handle("s1", &format!("message {i}")).await.unwrap();
        }

        let turns = history(&orch, "s1");
        assert_eq!(turns.len(), orch.store().max_history());
        assert_eq!(turns[0].content(), "message 3");
        assert_eq!(provider.calls(), 8);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let provider = ScriptedProvider::new(Vec::new());
        let search = RecordingSearch::new(SearchBehavior::Items(Vec::new()));
        let orch = orchestrator(&provider, &search, settings());

        orch.handle("alice", "hi from alice").await.unwrap();
        orch.handle("bob", "hi from bob").await.unwrap();

        let request = provider.last_request();
        assert!(request.messages.iter().all(|m| m.content != "hi from alice"));
        assert_eq!(history(&orch, "alice").len(), 2);
        assert_eq!(history(&orch, "bob").len(), 2);
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let provider = ScriptedProvider::new(Vec::new());
        let search = RecordingSearch::new(SearchBehavior::Items(Vec::new()));
        let orch = orchestrator(&provider, &search, settings());

        orch.handle("s1", "hello").await.unwrap();
        assert!(orch.clear("s1"));
        assert!(!orch.clear("s1"));
        assert!(!orch.clear("never-existed"));
        assert!(orch.store().snapshot("s1").is_none());

        orch.handle("s1", "hello again").await.unwrap();
        assert_eq!(history(&orch, "s1").len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_on_one_session_lose_no_turns() {
        let provider = ScriptedProvider::with_delay(Vec::new(), Duration::from_millis(5));
        let search = RecordingSearch::new(SearchBehavior::Items(Vec::new()));
        let orch = Arc::new(ChatOrchestrator::new(
            Arc::new(SessionStore::new(100)),
            BoxLlmProvider::new(provider.clone()),
            BoxContentSearch::new(search),
            settings(),
        ));

        let mut handles = Vec::new();
        for i in 0..10 {
            let orch = Arc::clone(&orch);
            handles.push(tokio::spawn(async move {
                orch.handle("shared", &format!("message {i}")).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let turns = history(&orch, "shared");
        assert_eq!(turns.len(), 20);
        for i in 0..10 {
            let text = format!("message {i}");
            assert_eq!(turns.iter().filter(|t| t.content() == text).count(), 1);
        }
        assert_eq!(provider.calls(), 10);
    }
}
