//! Code Duel Client
//!
//! Terminal front end: reads commands from stdin, drives one session
//! against the match server and prints what happens.
//!
//! Commands: `join [graph|tree|array|random]`, `cancel`,
//! `submit <file>`, `new`, `quit`.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use code_duel::{
    core::timer::format_clock,
    game::events::SessionEvent,
    network::{ConnectionManager, WebSocketConnector},
    AlgorithmType, ClientConfig, Command, MatchSession, SessionDriver, VERSION,
};

#[cfg(feature = "debug-tracing")]
const DEFAULT_FILTER: &str = "debug";
#[cfg(not(feature = "debug-tracing"))]
const DEFAULT_FILTER: &str = "info";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .init();

    info!("Code Duel Client v{}", VERSION);

    let config = ClientConfig::from_env().context("invalid configuration")?;
    info!("Server: {}", config.server_url);
    info!("Player: {} ({})", config.player_name, config.player_id);
    info!("Match duration: {}", format_clock(config.match_seconds));

    let connection = ConnectionManager::new(WebSocketConnector::new(config.server_url.clone()), config.connection());
    let session = MatchSession::new(config.identity(), connection, config.session());

    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let driver = tokio::spawn(SessionDriver::new(session, cmd_rx, event_tx).run());
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            print_event(&event);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let command = match parse_command(&line).await {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                warn!("{:#}", e);
                continue;
            }
        };

        let quit = matches!(command, Command::Shutdown);
        if cmd_tx.send(command).await.is_err() {
            break;
        }
        if quit {
            break;
        }
    }

    drop(cmd_tx);
    let session = driver.await.context("driver task failed")?;
    printer.await.context("printer task failed")?;

    info!("Session closed in state {}", session.state());
    Ok(())
}

async fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb {
        "join" => {
            let algorithm: AlgorithmType = words
                .next()
                .unwrap_or("random")
                .parse()
                .map_err(anyhow::Error::msg)?;
            Command::JoinQueue(algorithm)
        }
        "cancel" => Command::CancelQueue,
        "submit" => {
            let path = words.next().context("usage: submit <file>")?;
            let code = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path))?;
            Command::SubmitCode(code)
        }
        "new" => Command::NewSession,
        "quit" | "exit" => Command::Shutdown,
        other => anyhow::bail!("unknown command: {}", other),
    };

    Ok(Some(command))
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::StateChanged { from, to } => println!("[state] {} -> {}", from, to),
        SessionEvent::MatchStarted { match_id, opponent, total_tests, time_remaining } => println!(
            "[match] {} vs {} - {} tests, {}",
            match_id,
            opponent.name,
            total_tests,
            format_clock(*time_remaining)
        ),
        SessionEvent::Progress(update) => println!(
            "[progress] {:?}: {} ({}%)",
            update.side, update.current, update.displayed
        ),
        SessionEvent::TimerTicked { remaining } => {
            if remaining % 60 == 0 || *remaining <= 10 {
                println!("[timer] {}", format_clock(*remaining));
            }
        }
        SessionEvent::ExecutionFinished(results) => {
            println!("[results] {}/{} passed", results.passed, results.total);
            for error in &results.errors {
                println!("  {}", error);
            }
        }
        SessionEvent::MatchEnded(result) => println!(
            "[end] {} {} vs {} ({:?}, {} left)",
            result.outcome.headline(),
            result.my_progress,
            result.opponent_progress,
            result.reason,
            format_clock(result.time_remaining)
        ),
        SessionEvent::Error(signal) => println!("[error] {:?}: {}", signal.kind, signal.message),
    }
}
