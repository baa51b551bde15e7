//! Document retrieval and answer generation
//!
//! Two hosted black boxes sit behind trait seams: a search service that
//! returns ranked document fragments for a free-text query, and a
//! completion model that answers from retrieved context. [`RagPipeline`]
//! wires them together with per-stage degradation.

mod cortex;
mod rag;

pub use cortex::{CortexCompletionClient, CortexSearchClient};
pub use rag::{Answer, AnswerOutcome, RagPipeline};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One retrieved piece of document content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFragment {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Hosted document search trait
#[async_trait::async_trait]
pub trait SearchService: Send + Sync {
    /// Run a free-text query, returning at most `limit` fragments in
    /// relevance order. An empty result is not an error.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<DocumentFragment>>;

    /// Cheap reachability probe; returns a human-readable connection
    /// description on success.
    async fn probe(&self) -> Result<String>;
}

/// Hosted text-generation trait
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
