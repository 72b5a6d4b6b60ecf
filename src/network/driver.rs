//! Session Driver
//!
//! The event loop around one [`MatchSession`]. Timer ticks, inbound
//! channel events and user commands are unordered relative to each
//! other, but each is fully processed before the next one is taken.
//!
//! ```text
//!   ticker (1s) ──┐
//!   commands ─────┼──▶ select! ──▶ MatchSession ──▶ SessionEvent out
//!   channel ──────┘
//! ```

use std::future::pending;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::game::events::SessionEvent;
use crate::game::state::{AlgorithmType, MatchState};
use crate::network::connection::{ChannelEvent, ConnectionManager};
use crate::network::judge::JudgeError;
use crate::network::protocol::CodeResults;
use crate::network::session::MatchSession;
use crate::network::transport::Connector;

/// Countdown resolution.
pub const TICK: Duration = Duration::from_secs(1);

/// User commands and asynchronously delivered results.
#[derive(Debug)]
pub enum Command {
    /// Join the queue, reconnecting first if needed.
    JoinQueue(AlgorithmType),
    /// Leave the queue and close the channel.
    CancelQueue,
    /// Submit code for the running match.
    SubmitCode(String),
    /// Start over after a match.
    NewSession,
    /// Result of a local execution.
    LocalResult(Result<CodeResults, JudgeError>),
    /// Stop the loop and tear the channel down.
    Shutdown,
}

/// Drives a session until shutdown.
pub struct SessionDriver<C: Connector> {
    session: MatchSession<ConnectionManager<C>>,
    commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<SessionEvent>,
    inbound: Option<broadcast::Receiver<ChannelEvent>>,
}

impl<C: Connector> SessionDriver<C> {
    /// Create a driver.
    pub fn new(
        session: MatchSession<ConnectionManager<C>>,
        commands: mpsc::Receiver<Command>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            session,
            commands,
            events,
            inbound: None,
        }
    }

    /// Run until [`Command::Shutdown`] or every command sender is gone.
    ///
    /// Opens the channel on start and tears it down on exit. Returns the
    /// session for inspection.
    pub async fn run(mut self) -> MatchSession<ConnectionManager<C>> {
        info!("Session driver started for {}", self.session.identity().name);
        self.connect();

        let mut ticker = interval_at(Instant::now() + TICK, TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let before = self.session.state();

            tokio::select! {
                _ = ticker.tick() => {
                    let events = self.session.tick();
                    self.publish(events);
                }

                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => {
                        info!("Shutdown requested");
                        break;
                    }
                    Some(command) => self.handle_command(command).await,
                },

                event = next_inbound(&mut self.inbound) => match event {
                    Ok(event) => {
                        let events = self.session.handle_channel_event(event);
                        self.publish(events);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Session lagged, {} channel events dropped", skipped);
                    }
                    Err(RecvError::Closed) => {
                        debug!("Channel subscription closed");
                        self.inbound = None;
                    }
                },
            }

            // First decrement one full second after match start
            if before != MatchState::InGame && self.session.state() == MatchState::InGame {
                ticker.reset();
            }
        }

        self.session.outbound_mut().teardown().await;
        self.inbound = None;
        info!("Session driver stopped");
        self.session
    }

    async fn handle_command(&mut self, command: Command) {
        let result = match command {
            Command::JoinQueue(algorithm) => {
                self.connect();
                self.session.join_queue(algorithm)
            }
            Command::CancelQueue => {
                let result = self.session.cancel_queue();
                if result.is_ok() {
                    // Queued leave_queue is flushed before the close
                    self.session.outbound_mut().teardown().await;
                    self.inbound = None;
                }
                result
            }
            Command::SubmitCode(code) => self.session.submit_code(code),
            Command::NewSession => self.session.new_session(),
            Command::LocalResult(result) => Ok(self.session.handle_local_result(result)),
            Command::Shutdown => Ok(Vec::new()),
        };

        match result {
            Ok(events) => self.publish(events),
            Err(e) => {
                warn!("Command rejected: {}", e);
                self.publish(vec![SessionEvent::Error(e.to_signal())]);
            }
        }
    }

    /// Open the channel if needed and make sure we are subscribed.
    fn connect(&mut self) {
        let connection = self.session.outbound_mut();
        if connection.is_active() {
            if self.inbound.is_none() {
                self.inbound = Some(connection.subscribe());
            }
            return;
        }

        // Subscribe first so `Connected` is not missed
        self.inbound = Some(connection.subscribe());
        connection.initialize();
    }

    fn publish(&self, events: Vec<SessionEvent>) {
        for event in events {
            if self.events.send(event).is_err() {
                debug!("No event listener, dropping session event");
                return;
            }
        }
    }
}

async fn next_inbound(inbound: &mut Option<broadcast::Receiver<ChannelEvent>>) -> Result<ChannelEvent, RecvError> {
    match inbound {
        Some(rx) => rx.recv().await,
        None => pending().await,
    }
}
