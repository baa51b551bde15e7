use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;
use tracing_subscriber::EnvFilter;
use voice_search::transport::TransportClient;
use voice_search::{create_router, AppState, AudioFile, Config};

#[derive(Parser)]
#[command(name = "voice-search")]
#[command(about = "Voice-driven document search service")]
struct Cli {
    /// Configuration file (without extension)
    #[arg(short, long, default_value = "config/voice-search")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP control server (default)
    Serve,

    /// Replay a WAV file over the capture transport, as a live capture
    /// client would
    Send {
        /// WAV file to stream
        #[arg(short, long)]
        file: PathBuf,

        /// Session to stream into
        #[arg(short, long)]
        session_id: String,

        /// Frame size in milliseconds
        #[arg(long, default_value = "100")]
        frame_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = Config::load(&cli.config)?;

    let filter = if cfg.service.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cfg).await,
        Command::Send {
            file,
            session_id,
            frame_ms,
        } => send(cfg, file, session_id, frame_ms).await,
    }
}

async fn serve(cfg: Config) -> Result<()> {
    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Capture transport: {}", cfg.transport.nats_url);
    info!(
        "Whisper endpoint: {} (model {})",
        cfg.whisper.endpoint, cfg.whisper.model_size
    );
    info!(
        "Search service: {}.{}.{}",
        cfg.search.database, cfg.search.schema, cfg.search.service
    );

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let state = AppState::new(cfg);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

async fn send(cfg: Config, file: PathBuf, session_id: String, frame_ms: u64) -> Result<()> {
    let audio = AudioFile::open(&file)?;
    info!(
        "Streaming {} ({:.1}s) into session {}",
        file.display(),
        audio.duration_seconds,
        session_id
    );

    let transport = TransportClient::connect(&cfg.transport.nats_url, session_id).await?;

    let frames = audio.into_frames(frame_ms);
    let frame_count = frames.len();

    for (i, frame) in frames.into_iter().enumerate() {
        let final_frame = i + 1 == frame_count;
        transport
            .publish_frame(&frame, i as u32, final_frame)
            .await?;

        // Pace at real time, like a live capture source
        sleep(Duration::from_millis(frame_ms)).await;
    }

    transport.flush().await?;
    info!("Streamed {} frames", frame_count);

    Ok(())
}
