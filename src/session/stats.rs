use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics about a voice query session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Whether capture is currently active
    pub is_running: bool,

    /// When the session was created
    pub started_at: DateTime<Utc>,

    /// Total session age in seconds
    pub duration_secs: f64,

    /// Transcript segments received so far (including silence and errors)
    pub segments_count: usize,

    /// Queries answered through the retrieval pipeline
    pub queries_answered: usize,

    /// Conversation entries currently held
    pub history_entries: usize,
}
