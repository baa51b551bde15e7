use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::{CompletionService, DocumentFragment, SearchService};

/// How an answer was (or wasn't) produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// Retrieved context and generated an answer from it
    Answered,
    /// The search service returned no fragments
    NoResults,
    /// The search call itself failed
    SearchFailed,
    /// Fragments were retrieved but answer generation failed; `text`
    /// degrades to the raw retrieved content
    GenerationFailed,
}

/// The result of asking one question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub outcome: AnswerOutcome,
    /// Fragments the answer was (or would have been) grounded on
    pub fragments: Vec<DocumentFragment>,
}

impl Answer {
    pub fn is_answered(&self) -> bool {
        self.outcome == AnswerOutcome::Answered
    }
}

/// Search → prompt → complete, degrading stage by stage.
///
/// Every failure mode is folded into an [`Answer`] so a transcript is
/// never lost: the caller always gets something to show next to the query.
pub struct RagPipeline {
    search: Arc<dyn SearchService>,
    completion: Arc<dyn CompletionService>,
    chunk_limit: usize,
}

impl RagPipeline {
    pub fn new(
        search: Arc<dyn SearchService>,
        completion: Arc<dyn CompletionService>,
        chunk_limit: usize,
    ) -> Self {
        Self {
            search,
            completion,
            chunk_limit: chunk_limit.max(1),
        }
    }

    pub async fn ask(&self, question: &str) -> Answer {
        let fragments = match self.search.search(question, self.chunk_limit).await {
            Ok(fragments) => fragments,
            Err(e) => {
                warn!("Search failed for {:?}: {:#}", question, e);
                return Answer {
                    text: format!("Search error: {e:#}"),
                    outcome: AnswerOutcome::SearchFailed,
                    fragments: Vec::new(),
                };
            }
        };

        if fragments.is_empty() {
            info!("No search results for {:?}", question);
            return Answer {
                text: "No relevant documents found for your query.".to_string(),
                outcome: AnswerOutcome::NoResults,
                fragments,
            };
        }

        let prompt = answer_prompt(question, &fragments);

        match self.completion.complete(&prompt).await {
            Ok(text) => Answer {
                text,
                outcome: AnswerOutcome::Answered,
                fragments,
            },
            Err(e) => {
                warn!("Answer generation failed for {:?}: {:#}", question, e);
                let context = fragments
                    .iter()
                    .map(|f| f.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                Answer {
                    text: format!("Could not generate an answer; closest matching content:\n\n{context}"),
                    outcome: AnswerOutcome::GenerationFailed,
                    fragments,
                }
            }
        }
    }

    /// Reachability of the search backend, for the connection status surface.
    pub async fn probe(&self) -> Result<String, anyhow::Error> {
        self.search.probe().await
    }
}

/// The answer prompt: restrict the model to the retrieved context.
fn answer_prompt(question: &str, fragments: &[DocumentFragment]) -> String {
    let context = fragments
        .iter()
        .map(|f| f.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a helpful assistant. Answer based ONLY on the provided context.\n\n\
         Question: {question}\n\n\
         Context:\n{context}\n\n\
         Answer clearly and concisely:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_question_and_context() {
        let fragments = vec![
            DocumentFragment {
                content: "First fragment.".to_string(),
                score: None,
            },
            DocumentFragment {
                content: "Second fragment.".to_string(),
                score: Some(0.8),
            },
        ];

        let prompt = answer_prompt("what is the refund policy?", &fragments);

        assert!(prompt.contains("what is the refund policy?"));
        assert!(prompt.contains("First fragment."));
        assert!(prompt.contains("Second fragment."));
        assert!(prompt.contains("ONLY on the provided context"));
    }
}
