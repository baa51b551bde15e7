pub mod chunker;
pub mod convert;
pub mod file;
pub mod frame;

pub use chunker::{ChunkedTranscriber, ChunkerConfig, TranscriptSegment};
pub use file::{encode_wav, AudioFile};
pub use frame::{analyze, AudioFrame, AudioStats};
