pub mod audio;
pub mod config;
pub mod http;
pub mod net;
pub mod search;
pub mod session;
pub mod stt;
pub mod transport;

pub use audio::{
    AudioFile, AudioFrame, AudioStats, ChunkedTranscriber, ChunkerConfig, TranscriptSegment,
};
pub use config::Config;
pub use http::{create_router, AppState};
pub use net::{IceServer, RtcConfiguration};
pub use search::{
    Answer, AnswerOutcome, CompletionService, CortexCompletionClient, CortexSearchClient,
    DocumentFragment, RagPipeline, SearchService,
};
pub use session::{ConversationEntry, ConversationHistory, QuerySession, Role, SessionConfig, SessionStats};
pub use stt::{ModelSize, SpeechRecognizer, WhisperClient};
pub use transport::{AudioFrameMessage, TransportClient};
