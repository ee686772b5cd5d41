use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use itshop_voice::recognition::{event_channel, AcquiredRecognizer};
use itshop_voice::{
    create_router, AppState, Config, HttpQueryClient, RecognizerFactory, RecognizerSource,
    Snapshot, StartOutcome, ToggleOutcome, UtteranceFeeder, VoiceSession, VoiceSessionController,
    VoiceSessionHandle,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "itshop-voice", version, about = "Voice front-end for the IT shop assistant")]
struct Cli {
    /// Config file (extension optional)
    #[arg(long, default_value = "config/itshop-voice")]
    config: String,

    /// Behave as a host without speech recognition
    #[arg(long, global = true)]
    no_recognizer: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask one question and print the answer
    Ask { text: String },
    /// Speak one turn per input line
    Repl,
    /// Serve the state over HTTP; input lines are what the recognizer hears
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let (session, handle, feeder) = build_session(&cfg, cli.no_recognizer)?;
    let session_task = session.spawn();

    let outcome = match cli.command {
        Command::Ask { text } => {
            let snapshot = run_turn(&handle, feeder.as_ref(), &text).await?;
            println!("{}", snapshot);
            Ok(())
        }
        Command::Repl => repl(&handle, feeder.as_ref()).await,
        Command::Serve => serve(&cfg, handle.clone(), feeder).await,
    };

    handle.shutdown().await;
    if let Err(e) = session_task.await {
        warn!("Voice session task ended abnormally: {}", e);
    }

    outcome
}

fn build_session(
    cfg: &Config,
    no_recognizer: bool,
) -> Result<(VoiceSession, VoiceSessionHandle, Option<UtteranceFeeder>)> {
    let (events_tx, events_rx) = event_channel();

    let source = if no_recognizer {
        RecognizerSource::Unavailable
    } else {
        RecognizerSource::Text
    };

    let (recognizer, feeder) =
        match RecognizerFactory::acquire(source, cfg.recognition_config(), events_tx) {
            Some(AcquiredRecognizer { recognizer, feeder }) => (Some(recognizer), feeder),
            None => (None, None),
        };

    let controller = VoiceSessionController::new(recognizer, cfg.messages.clone());
    let query = HttpQueryClient::new(cfg.query.endpoint.clone(), cfg.query_timeout())
        .context("Failed to build query client")?;
    info!("Query endpoint: {} (timeout {:?})", query.endpoint(), cfg.query_timeout());

    let (session, handle) =
        VoiceSession::new(controller, Arc::new(query), cfg.query_timeout(), events_rx);

    Ok((session, handle, feeder))
}

/// Toggle on, speak `text`, and wait for the turn to settle
async fn run_turn(
    handle: &VoiceSessionHandle,
    feeder: Option<&UtteranceFeeder>,
    text: &str,
) -> Result<Snapshot> {
    match handle.toggle().await? {
        ToggleOutcome::Start(StartOutcome::Started) => {}
        other => {
            warn!("Voice input not started: {}", other.as_str());
            return Ok(handle.snapshot());
        }
    }

    let turn = handle.snapshot().turn;
    if let Some(feeder) = feeder {
        feeder.say(text)?;
    }

    Ok(handle.wait_for(|snapshot| snapshot.turn_settled(turn)).await?)
}

async fn repl(handle: &VoiceSessionHandle, feeder: Option<&UtteranceFeeder>) -> Result<()> {
    println!("{}", handle.snapshot());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == ":q" || line == ":quit" {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let snapshot = run_turn(handle, feeder, line).await?;
        println!("{}\n", snapshot);
    }

    Ok(())
}

async fn serve(cfg: &Config, handle: VoiceSessionHandle, feeder: Option<UtteranceFeeder>) -> Result<()> {
    // Input lines stand in for the microphone
    if let Some(feeder) = feeder {
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if feeder.say(line).is_err() {
                    break;
                }
            }
        });
    }

    let mut updates = handle.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            println!("{}\n", snapshot);
        }
    });

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(AppState::new(handle)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}
