use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a conversation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation entry (a transcribed query or a retrieved answer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Ordered conversation history for one session.
///
/// Append-only while the session lives; emptied only by the explicit
/// clear operation.
#[derive(Debug, Default)]
pub struct ConversationHistory {
    entries: Vec<ConversationEntry>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, text: impl Into<String>) {
        self.entries.push(ConversationEntry {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn snapshot(&self) -> Vec<ConversationEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Explicit clear action; the only way entries are removed
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
