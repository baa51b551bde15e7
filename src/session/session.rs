use super::config::SessionConfig;
use super::history::{ConversationEntry, ConversationHistory, Role};
use super::stats::SessionStats;
use crate::audio::{ChunkedTranscriber, ChunkerConfig};
use crate::search::{Answer, RagPipeline};
use crate::stt::SpeechRecognizer;
use crate::transport::TransportClient;
use anyhow::{Context, Result};
use chrono::Utc;
use futures::stream::StreamExt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Receive buffer between transport ingestion and the transcription loop
const FRAME_CHANNEL_CAPACITY: usize = 1024;

/// A voice query session: frame ingestion, chunked transcription, and the
/// answer loop that turns transcripts into conversation entries.
pub struct QuerySession {
    config: SessionConfig,

    /// Speech recognition backend used by the transcription loop
    recognizer: Arc<dyn SpeechRecognizer>,

    /// Retrieval pipeline answering each transcript
    rag: Arc<RagPipeline>,

    /// When the session was created
    started_at: chrono::DateTime<chrono::Utc>,

    /// Whether capture is currently active
    is_running: Arc<AtomicBool>,

    /// Wakes the ingestion task out of its subscription on stop
    shutdown: Arc<Notify>,

    /// Conversation history (append-only; cleared only explicitly)
    history: Arc<Mutex<ConversationHistory>>,

    /// Transcript segments received (including silence and errors)
    segments_received: Arc<AtomicUsize>,

    /// Queries pushed through the retrieval pipeline
    queries_answered: Arc<AtomicUsize>,

    /// Handles for the ingestion, transcription, and answer tasks
    task_handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl QuerySession {
    /// Create a session. No I/O happens until [`start`](Self::start).
    pub fn new(
        config: SessionConfig,
        recognizer: Arc<dyn SpeechRecognizer>,
        rag: Arc<RagPipeline>,
    ) -> Self {
        info!("Creating query session: {}", config.session_id);

        Self {
            config,
            recognizer,
            rag,
            started_at: Utc::now(),
            is_running: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Notify::new()),
            history: Arc::new(Mutex::new(ConversationHistory::new())),
            segments_received: Arc::new(AtomicUsize::new(0)),
            queries_answered: Arc::new(AtomicUsize::new(0)),
            task_handles: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    /// Start capture: connect the transport and spawn the pipeline tasks.
    ///
    /// A transport connection failure surfaces here and nothing is
    /// spawned; the session stays usable for manual queries.
    pub async fn start(&self) -> Result<()> {
        if self.is_running.load(Ordering::SeqCst) {
            warn!("Session {} already running", self.config.session_id);
            return Ok(());
        }

        info!("Starting query session: {}", self.config.session_id);

        let transport =
            TransportClient::connect(&self.config.nats_url, self.config.session_id.clone())
                .await
                .context("Capture transport is not connected")?;

        let mut subscriber = transport
            .subscribe_frames()
            .await
            .context("Failed to subscribe to capture frames")?;

        self.is_running.store(true, Ordering::SeqCst);

        let (frame_tx, frame_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let (segment_tx, mut segment_rx) = mpsc::channel(64);

        // Ingestion: transport messages -> frames. Ends on stop, stream
        // close, or the final-frame marker; dropping frame_tx then winds
        // down the rest of the pipeline.
        let shutdown = Arc::clone(&self.shutdown);
        let session_id = self.config.session_id.clone();
        let ingest_task = tokio::spawn(async move {
            // Keep the connection alive for as long as the subscription runs
            let _transport = transport;

            info!("Frame ingestion started for {}", session_id);

            loop {
                tokio::select! {
                    _ = shutdown.notified() => break,
                    maybe_msg = subscriber.next() => {
                        let Some(msg) = maybe_msg else { break };

                        match TransportClient::decode_frame(&msg.payload) {
                            Ok((frame, final_frame)) => {
                                if !frame.samples.is_empty()
                                    && frame_tx.send(frame).await.is_err()
                                {
                                    break;
                                }
                                if final_frame {
                                    info!("Final frame received for {}", session_id);
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!("Failed to parse audio frame message: {}", e);
                            }
                        }
                    }
                }
            }

            info!("Frame ingestion stopped for {}", session_id);
        });

        // Transcription loop
        let chunker_config = ChunkerConfig {
            chunk_duration: self.config.chunk_duration,
            sample_rate: self.config.sample_rate,
            channels: self.config.channels,
            min_chunk_ms: self.config.min_chunk_ms,
            silence_rms: self.config.silence_rms,
            language: self.config.language.clone(),
        };
        let chunker = ChunkedTranscriber::new(chunker_config, Arc::clone(&self.recognizer));
        let chunk_task = tokio::spawn(async move {
            if let Err(e) = chunker.run(frame_rx, segment_tx).await {
                error!("Transcription loop failed: {:#}", e);
            }
        });

        // Answer loop: transcript -> history -> retrieval -> history
        let history = Arc::clone(&self.history);
        let rag = Arc::clone(&self.rag);
        let segments_received = Arc::clone(&self.segments_received);
        let queries_answered = Arc::clone(&self.queries_answered);
        let auto_search = self.config.auto_search;
        let answer_task = tokio::spawn(async move {
            info!("Answer task started");

            while let Some(segment) = segment_rx.recv().await {
                segments_received.fetch_add(1, Ordering::SeqCst);

                if let Some(err) = &segment.error {
                    warn!("Chunk {} was not transcribed: {}", segment.chunk_index, err);
                    continue;
                }
                if segment.is_silence() {
                    continue;
                }

                let question = segment.text.trim().to_string();
                if question.is_empty() {
                    continue;
                }

                {
                    let mut history = history.lock().await;
                    history.push(Role::User, question.clone());
                }

                if !auto_search {
                    continue;
                }

                let answer = rag.ask(&question).await;
                queries_answered.fetch_add(1, Ordering::SeqCst);

                {
                    let mut history = history.lock().await;
                    history.push(Role::Assistant, answer.text);
                }
            }

            info!("Answer task stopped");
        });

        {
            let mut handles = self.task_handles.lock().await;
            handles.push(ingest_task);
            handles.push(chunk_task);
            handles.push(answer_task);
        }

        info!("Query session started: {}", self.config.session_id);

        Ok(())
    }

    /// Stop capture and wait for the pipeline to drain.
    pub async fn stop(&self) -> Result<SessionStats> {
        if !self.is_running.load(Ordering::SeqCst) {
            warn!("Session {} not running", self.config.session_id);
            return Ok(self.stats().await);
        }

        info!("Stopping query session: {}", self.config.session_id);

        self.is_running.store(false, Ordering::SeqCst);
        self.shutdown.notify_waiters();

        let handles: Vec<JoinHandle<()>> = {
            let mut guard = self.task_handles.lock().await;
            guard.drain(..).collect()
        };

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Session task panicked: {}", e);
            }
        }

        info!("Query session stopped: {}", self.config.session_id);

        Ok(self.stats().await)
    }

    /// Manual text-entry fallback: run a question through the retrieval
    /// pipeline without the audio leg. Works whether or not capture runs.
    pub async fn submit_query(&self, question: &str) -> Answer {
        let question = question.trim();

        {
            let mut history = self.history.lock().await;
            history.push(Role::User, question);
        }

        let answer = self.rag.ask(question).await;
        self.queries_answered.fetch_add(1, Ordering::SeqCst);

        {
            let mut history = self.history.lock().await;
            history.push(Role::Assistant, answer.text.clone());
        }

        answer
    }

    /// Snapshot of the conversation history
    pub async fn history(&self) -> Vec<ConversationEntry> {
        let history = self.history.lock().await;
        history.snapshot()
    }

    /// Explicit clear action
    pub async fn clear_history(&self) {
        let mut history = self.history.lock().await;
        info!(
            "Clearing {} history entries for {}",
            history.len(),
            self.config.session_id
        );
        history.clear();
    }

    /// Current session statistics
    pub async fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.started_at);

        let history_entries = {
            let history = self.history.lock().await;
            history.len()
        };

        SessionStats {
            is_running: self.is_running.load(Ordering::SeqCst),
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            segments_count: self.segments_received.load(Ordering::SeqCst),
            queries_answered: self.queries_answered.load(Ordering::SeqCst),
            history_entries,
        }
    }
}
