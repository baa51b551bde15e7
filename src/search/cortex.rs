use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{CompletionService, DocumentFragment, SearchService};
use crate::config::SearchConfig;

/// Content columns probed on each search result, in preference order.
const CONTENT_COLUMNS: [&str; 4] = ["PAGE_CONTENT", "CONTENT", "TEXT", "BODY"];

/// HTTP client for a Cortex-style document search service.
pub struct CortexSearchClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    database: String,
    schema: String,
    service: String,
}

impl CortexSearchClient {
    pub fn new(client: reqwest::Client, config: &SearchConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            database: config.database.clone(),
            schema: config.schema.clone(),
            service: config.service.clone(),
        }
    }

    fn query_url(&self) -> String {
        format!(
            "{}/api/v2/databases/{}/schemas/{}/cortex-search-services/{}:query",
            self.base_url, self.database, self.schema, self.service
        )
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Pull the fragment content out of one result row, trying the well-known
/// content columns before falling back to the raw row.
fn extract_content(row: &Value) -> String {
    for column in CONTENT_COLUMNS {
        if let Some(text) = row.get(column).and_then(|v| v.as_str()) {
            return text.to_string();
        }
    }
    row.to_string()
}

#[async_trait::async_trait]
impl SearchService for CortexSearchClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<DocumentFragment>> {
        let body = json!({
            "query": query,
            "columns": [],
            "limit": limit.max(1),
        });

        debug!("Searching {} (limit {})", self.service, limit);

        let response = self
            .authed(self.client.post(self.query_url()).json(&body))
            .send()
            .await
            .context("Search request failed")?
            .error_for_status()
            .context("Search service returned an error")?;

        let payload: Value = response
            .json()
            .await
            .context("Failed to parse search response")?;

        let results = payload
            .get("results")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        info!("Search for {:?} returned {} fragments", query, results.len());

        Ok(results
            .iter()
            .map(|row| DocumentFragment {
                content: extract_content(row),
                score: row.get("@SCORE").and_then(|v| v.as_f64()),
            })
            .collect())
    }

    async fn probe(&self) -> Result<String> {
        // Reachability only: any HTTP response proves the service is there
        let response = self
            .authed(self.client.get(&self.base_url))
            .send()
            .await
            .context("Search service is unreachable")?;

        Ok(format!(
            "Connected - {} ({}) service {}.{}.{}",
            self.base_url,
            response.status(),
            self.database,
            self.schema,
            self.service
        ))
    }
}

/// HTTP client for the hosted completion model.
pub struct CortexCompletionClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    model: String,
}

impl CortexCompletionClient {
    pub fn new(client: reqwest::Client, config: &SearchConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            model: config.model.clone(),
        }
    }
}

/// The completion endpoint answers in a chat-completions shape; accept both
/// `message.content` and the flattened `messages` field.
fn extract_completion(payload: &Value) -> Option<String> {
    let choice = payload.get("choices")?.as_array()?.first()?;

    if let Some(content) = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
    {
        return Some(content.trim().to_string());
    }

    choice
        .get("messages")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
}

#[async_trait::async_trait]
impl CompletionService for CortexCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/v2/cortex/inference:complete", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
        });

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("Completion request failed")?
            .error_for_status()
            .context("Completion endpoint returned an error")?;

        let payload: Value = response
            .json()
            .await
            .context("Failed to parse completion response")?;

        extract_completion(&payload)
            .filter(|text| !text.is_empty())
            .context("Completion response contained no answer text")
    }
}
