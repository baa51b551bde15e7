use super::state::AppState;
use crate::net;
use crate::search::{Answer, CortexCompletionClient, CortexSearchClient, RagPipeline};
use crate::session::{ConversationEntry, QuerySession, SessionConfig, SessionStats};
use crate::stt::WhisperClient;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// Optional session ID (if not provided, generate UUID)
    pub session_id: Option<String>,

    /// Seconds of audio per transcription flush (default from config)
    pub chunk_duration_secs: Option<u64>,

    /// Whisper model size override: tiny, base, small, medium, large
    pub model_size: Option<String>,

    /// Language hint override (omit for auto-detection)
    pub language: Option<String>,

    /// Document fragments retrieved per query
    pub chunk_limit: Option<usize>,

    /// Answer transcripts automatically as they arrive
    pub auto_search: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopSessionResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
    pub stats: SessionStats,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub session_id: String,
    pub query: String,
    pub answer: Answer,
}

#[derive(Debug, Serialize)]
pub struct ClearHistoryResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions/start
/// Start a new voice query session
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> impl IntoResponse {
    let session_id = req
        .session_id
        .unwrap_or_else(|| format!("session-{}", uuid::Uuid::new_v4()));

    info!("Starting voice query session: {}", session_id);

    // Check if already running
    {
        let sessions = state.sessions.read().await;
        if sessions.contains_key(&session_id) {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Session {} already exists", session_id),
                }),
            )
                .into_response();
        }
    }

    // Session config: service defaults plus per-request overrides
    let mut config = SessionConfig::from_config(&state.config, session_id.clone());
    if let Some(secs) = req.chunk_duration_secs {
        config.chunk_duration = Duration::from_secs(secs.clamp(1, 10));
    }
    if let Some(language) = req.language {
        if !crate::stt::SUPPORTED_LANGUAGES.contains(&language.as_str()) {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Unsupported language hint: {language}"),
                }),
            )
                .into_response();
        }
        config.language = Some(language);
    }
    if let Some(auto_search) = req.auto_search {
        config.auto_search = auto_search;
    }

    // Recognizer, with the optional model-size override
    let mut whisper_config = state.config.whisper.clone();
    if let Some(model_size) = req.model_size {
        whisper_config.model_size = model_size;
    }
    let recognizer = match WhisperClient::new(state.http_client.clone(), &whisper_config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("{e:#}"),
                }),
            )
                .into_response();
        }
    };

    // Retrieval pipeline
    let search = Arc::new(CortexSearchClient::new(
        state.http_client.clone(),
        &state.config.search,
    ));
    let completion = Arc::new(CortexCompletionClient::new(
        state.http_client.clone(),
        &state.config.search,
    ));
    let chunk_limit = req.chunk_limit.unwrap_or(state.config.search.chunk_limit);
    let rag = Arc::new(RagPipeline::new(search, completion, chunk_limit));

    // Non-fatal connection probe; retrieval degrades per query if it is down
    match rag.probe().await {
        Ok(status) => info!("Search service reachable: {}", status),
        Err(e) => info!("Search service not connected, answers will degrade: {:#}", e),
    }

    let session = Arc::new(QuerySession::new(config, recognizer, rag));

    // Start capture; a transport failure means the session never begins
    if let Err(e) = session.start().await {
        error!("Failed to start session: {:#}", e);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: format!("{e:#}"),
            }),
        )
            .into_response();
    }

    // Store session
    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(session_id.clone(), session);
    }

    info!("Session started successfully: {}", session_id);

    (
        StatusCode::OK,
        Json(StartSessionResponse {
            session_id: session_id.clone(),
            status: "listening".to_string(),
            message: format!("Session {} is listening for audio", session_id),
        }),
    )
        .into_response()
}

/// POST /sessions/:session_id/stop
/// Stop a running session
pub async fn stop_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    info!("Stopping session: {}", session_id);

    let session = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&session_id)
    };

    match session {
        Some(session) => match session.stop().await {
            Ok(stats) => (
                StatusCode::OK,
                Json(StopSessionResponse {
                    session_id: session_id.clone(),
                    status: "stopped".to_string(),
                    message: "Session stopped".to_string(),
                    stats,
                }),
            )
                .into_response(),
            Err(e) => {
                error!("Failed to stop session: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: format!("Failed to stop session: {e:#}"),
                    }),
                )
                    .into_response()
            }
        },
        None => session_not_found(&session_id),
    }
}

/// GET /sessions/:session_id/status
/// Get statistics for a session
pub async fn get_session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => (StatusCode::OK, Json(session.stats().await)).into_response(),
        None => session_not_found(&session_id),
    }
}

/// GET /sessions/:session_id/history
/// Get the conversation history accumulated so far
pub async fn get_session_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => {
            let history: Vec<ConversationEntry> = session.history().await;
            (StatusCode::OK, Json(history)).into_response()
        }
        None => session_not_found(&session_id),
    }
}

/// POST /sessions/:session_id/clear
/// Clear the conversation history (explicit user action)
pub async fn clear_session_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => {
            session.clear_history().await;
            (
                StatusCode::OK,
                Json(ClearHistoryResponse {
                    session_id: session_id.clone(),
                    status: "cleared".to_string(),
                    message: "Conversation history cleared".to_string(),
                }),
            )
                .into_response()
        }
        None => session_not_found(&session_id),
    }
}

/// POST /sessions/:session_id/query
/// Manual text-entry fallback: answer a typed question
pub async fn submit_query(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<QueryRequest>,
) -> impl IntoResponse {
    let query = req.query.trim().to_string();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Query must not be empty".to_string(),
            }),
        )
            .into_response();
    }

    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&session_id).cloned()
    };

    match session {
        Some(session) => {
            let answer = session.submit_query(&query).await;
            (
                StatusCode::OK,
                Json(QueryResponse {
                    session_id,
                    query,
                    answer,
                }),
            )
                .into_response()
        }
        None => session_not_found(&session_id),
    }
}

/// GET /rtc-config
/// ICE server configuration for capture clients
pub async fn get_rtc_config(State(state): State<AppState>) -> impl IntoResponse {
    let rtc = net::rtc_configuration(&state.http_client).await;
    (StatusCode::OK, Json(rtc)).into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn session_not_found(session_id: &str) -> axum::response::Response {
    error!("Session {} not found", session_id);
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Session {} not found", session_id),
        }),
    )
        .into_response()
}
