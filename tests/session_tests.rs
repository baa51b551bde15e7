// Tests for session state: conversation history, the manual query path,
// and statistics. Capture is not started here, so no transport is needed.

use anyhow::Result;
use std::sync::Arc;
use voice_search::search::{CompletionService, DocumentFragment, RagPipeline, SearchService};
use voice_search::session::{ConversationHistory, QuerySession, Role, SessionConfig};
use voice_search::stt::SpeechRecognizer;

struct StaticSearch;

#[async_trait::async_trait]
impl SearchService for StaticSearch {
    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<DocumentFragment>> {
        Ok(vec![DocumentFragment {
            content: "Context passage.".to_string(),
            score: Some(0.9),
        }])
    }

    async fn probe(&self) -> Result<String> {
        Ok("static".to_string())
    }
}

struct EmptySearch;

#[async_trait::async_trait]
impl SearchService for EmptySearch {
    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<DocumentFragment>> {
        Ok(Vec::new())
    }

    async fn probe(&self) -> Result<String> {
        Ok("empty".to_string())
    }
}

struct StaticCompletion;

#[async_trait::async_trait]
impl CompletionService for StaticCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Ok("A concise answer.".to_string())
    }
}

struct NoopRecognizer;

#[async_trait::async_trait]
impl SpeechRecognizer for NoopRecognizer {
    async fn transcribe(
        &self,
        _samples: &[i16],
        _sample_rate: u32,
        _channels: u16,
        _language: Option<&str>,
    ) -> Result<String> {
        Ok(String::new())
    }

    fn name(&self) -> &str {
        "noop"
    }
}

fn test_session(search: Arc<dyn SearchService>) -> QuerySession {
    let rag = Arc::new(RagPipeline::new(search, Arc::new(StaticCompletion), 2));
    QuerySession::new(SessionConfig::default(), Arc::new(NoopRecognizer), rag)
}

#[tokio::test]
async fn manual_query_appends_question_and_answer() {
    let session = test_session(Arc::new(StaticSearch));

    let answer = session.submit_query("what is this about?").await;
    assert!(answer.is_answered());
    assert_eq!(answer.text, "A concise answer.");

    let history = session.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].text, "what is this about?");
    assert_eq!(history[1].role, Role::Assistant);
    assert_eq!(history[1].text, "A concise answer.");
}

#[tokio::test]
async fn history_is_append_only_across_queries() {
    let session = test_session(Arc::new(StaticSearch));

    session.submit_query("first").await;
    session.submit_query("second").await;

    let history = session.history().await;
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].text, "first");
    assert_eq!(history[2].text, "second");

    // Entries are chronologically ordered
    for pair in history.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}

#[tokio::test]
async fn clear_empties_history_exactly_once_asked() {
    let session = test_session(Arc::new(StaticSearch));

    session.submit_query("a question").await;
    assert_eq!(session.history().await.len(), 2);

    session.clear_history().await;
    assert!(session.history().await.is_empty());

    // Later queries start a fresh conversation
    session.submit_query("another").await;
    assert_eq!(session.history().await.len(), 2);
}

#[tokio::test]
async fn zero_search_results_still_produce_a_conversation_entry() {
    let session = test_session(Arc::new(EmptySearch));

    let answer = session.submit_query("nothing matches this").await;
    assert!(!answer.is_answered());

    let history = session.history().await;
    assert_eq!(history.len(), 2);
    assert!(history[1].text.contains("No relevant documents"));
}

#[tokio::test]
async fn stats_track_queries_and_history() {
    let session = test_session(Arc::new(StaticSearch));

    let before = session.stats().await;
    assert!(!before.is_running);
    assert_eq!(before.queries_answered, 0);
    assert_eq!(before.history_entries, 0);

    session.submit_query("q").await;

    let after = session.stats().await;
    assert_eq!(after.queries_answered, 1);
    assert_eq!(after.history_entries, 2);
    assert_eq!(after.segments_count, 0, "No audio has flowed");
}

#[tokio::test]
async fn stopping_an_idle_session_is_harmless() {
    let session = test_session(Arc::new(StaticSearch));

    let stats = session.stop().await.unwrap();
    assert!(!stats.is_running);
}

#[test]
fn conversation_history_basics() {
    let mut history = ConversationHistory::new();
    assert!(history.is_empty());

    history.push(Role::User, "hello");
    history.push(Role::Assistant, "hi");
    assert_eq!(history.len(), 2);
    assert_eq!(history.entries()[0].role, Role::User);

    history.clear();
    assert!(history.is_empty());
}

#[test]
fn default_session_config_matches_service_defaults() {
    let config = SessionConfig::default();

    assert!(config.session_id.starts_with("session-"));
    assert_eq!(config.chunk_duration.as_secs(), 3);
    assert_eq!(config.sample_rate, 16000);
    assert_eq!(config.channels, 1);
    assert!(config.auto_search);
    assert!(config.language.is_none());
}
