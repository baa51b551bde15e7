use crate::config::Config;
use crate::session::QuerySession;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Active query sessions (session_id → session)
    pub sessions: Arc<RwLock<HashMap<String, Arc<QuerySession>>>>,

    /// Service configuration (session defaults)
    pub config: Arc<Config>,

    /// Shared HTTP client for the hosted model/search endpoints
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config: Arc::new(config),
            http_client: reqwest::Client::new(),
        }
    }
}
