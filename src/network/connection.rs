//! Connection Manager
//!
//! Owns the single duplex channel to the match server. The channel runs
//! on its own task; the manager talks to it over an intent queue and
//! publishes inbound traffic on a broadcast channel.
//!
//! `initialize` is idempotent while a channel is live. Drops are retried
//! a fixed number of times with a fixed delay, then the channel stays
//! closed until the next `initialize`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::network::protocol::{ClientMessage, ServerMessage};
use crate::network::transport::{ConnectionError, Connector, Transport};

/// Reconnection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Attempts after a failure before giving up.
    pub max_attempts: u32,
    /// Fixed delay before each attempt.
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_millis(1000),
        }
    }
}

/// Connection manager configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Reconnection policy.
    pub reconnect: ReconnectPolicy,
    /// Capacity of the inbound broadcast channel.
    pub event_capacity: usize,
    /// How long teardown waits for the channel task.
    pub shutdown_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            reconnect: ReconnectPolicy::default(),
            event_capacity: 256,
            shutdown_timeout: Duration::from_secs(1),
        }
    }
}

/// Observable channel status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Never initialized.
    Idle,
    /// First connection attempt in flight.
    Connecting,
    /// Channel open.
    Connected,
    /// Waiting to retry.
    Reconnecting {
        /// Attempt about to be made (1-based).
        attempt: u32,
    },
    /// Torn down or retries exhausted.
    Closed,
}

/// Something that happened on the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// Channel opened.
    Connected,
    /// Inbound server event.
    Message(ServerMessage),
    /// Channel dropped.
    Disconnected {
        /// Why.
        reason: String,
    },
    /// Retrying after a failure.
    Reconnecting {
        /// Attempt about to be made (1-based).
        attempt: u32,
    },
    /// Retries exhausted; channel left closed.
    Failed {
        /// Attempts made after the last failure.
        attempts: u32,
    },
}

/// Anything the session can push intents through.
pub trait Outbound {
    /// Queue an intent for delivery. At-most-once.
    fn send(&self, message: ClientMessage) -> Result<(), ConnectionError>;
}

/// A running channel task and its handles.
struct Link {
    cmd_tx: mpsc::UnboundedSender<ClientMessage>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

/// The connection manager.
pub struct ConnectionManager<C: Connector> {
    connector: Arc<C>,
    config: ConnectionConfig,
    events_tx: broadcast::Sender<ChannelEvent>,
    status_tx: watch::Sender<ConnectionStatus>,
    link: Option<Link>,
}

impl<C: Connector> ConnectionManager<C> {
    /// Create a manager. No channel is opened until [`initialize`](Self::initialize).
    pub fn new(connector: C, config: ConnectionConfig) -> Self {
        let (events_tx, _) = broadcast::channel(config.event_capacity.max(1));
        let (status_tx, _) = watch::channel(ConnectionStatus::Idle);
        Self {
            connector: Arc::new(connector),
            config,
            events_tx,
            status_tx,
            link: None,
        }
    }

    /// Open the channel unless one is already live.
    ///
    /// Must be called from within a tokio runtime.
    pub fn initialize(&mut self) {
        if self.is_active() {
            debug!("Channel already active, initialize is a no-op");
            return;
        }

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run_channel(
            self.connector.clone(),
            self.config.reconnect,
            cmd_rx,
            self.events_tx.clone(),
            self.status_tx.clone(),
            shutdown_rx,
        ));

        self.link = Some(Link {
            cmd_tx,
            shutdown_tx: Some(shutdown_tx),
            task,
        });
    }

    /// A channel task is running (connected or retrying).
    pub fn is_active(&self) -> bool {
        self.link.as_ref().is_some_and(|link| !link.task.is_finished())
    }

    /// Current status.
    pub fn status(&self) -> ConnectionStatus {
        *self.status_tx.borrow()
    }

    /// Watch status changes.
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }

    /// Receive inbound channel events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events_tx.subscribe()
    }

    /// Close the channel and release every subscription.
    ///
    /// Intents already queued are written before the channel closes.
    pub async fn teardown(&mut self) {
        let Some(mut link) = self.link.take() else {
            return;
        };

        if let Some(shutdown_tx) = link.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }

        match tokio::time::timeout(self.config.shutdown_timeout, &mut link.task).await {
            Ok(_) => debug!("Channel task stopped"),
            Err(_) => {
                warn!("Channel task did not stop within {:?}, aborting", self.config.shutdown_timeout);
                link.task.abort();
            }
        }

        // Fresh sender: receivers of the old one see `Closed`
        let (events_tx, _) = broadcast::channel(self.config.event_capacity.max(1));
        self.events_tx = events_tx;
        self.status_tx.send_replace(ConnectionStatus::Closed);
        info!("Connection torn down");
    }
}

impl<C: Connector> Outbound for ConnectionManager<C> {
    fn send(&self, message: ClientMessage) -> Result<(), ConnectionError> {
        let link = self.link.as_ref().ok_or(ConnectionError::NotConnected)?;
        if link.task.is_finished() {
            return Err(ConnectionError::ChannelClosed);
        }
        link.cmd_tx.send(message).map_err(|_| ConnectionError::ChannelClosed)
    }
}

impl<C: Connector> Drop for ConnectionManager<C> {
    fn drop(&mut self) {
        if let Some(link) = self.link.take() {
            link.task.abort();
        }
    }
}

// =============================================================================
// CHANNEL TASK
// =============================================================================

/// How a connected pump ended.
enum PumpExit {
    /// Shutdown requested or manager dropped.
    Stop,
    /// Channel dropped; eligible for reconnection.
    Lost(String),
}

async fn run_channel<C: Connector>(
    connector: Arc<C>,
    policy: ReconnectPolicy,
    mut cmd_rx: mpsc::UnboundedReceiver<ClientMessage>,
    events: broadcast::Sender<ChannelEvent>,
    status: watch::Sender<ConnectionStatus>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut attempt: u32 = 0;
    status.send_replace(ConnectionStatus::Connecting);

    loop {
        let connected = tokio::select! {
            result = connector.connect() => result,
            _ = &mut shutdown_rx => {
                status.send_replace(ConnectionStatus::Closed);
                return;
            }
        };

        match connected {
            Ok(mut transport) => {
                attempt = 0;
                info!("Connected to match server");
                status.send_replace(ConnectionStatus::Connected);
                let _ = events.send(ChannelEvent::Connected);

                match pump(&mut transport, &mut cmd_rx, &events, &mut shutdown_rx).await {
                    PumpExit::Stop => {
                        transport.close().await;
                        status.send_replace(ConnectionStatus::Closed);
                        return;
                    }
                    PumpExit::Lost(reason) => {
                        warn!("Connection lost: {}", reason);
                        let _ = events.send(ChannelEvent::Disconnected { reason });
                    }
                }
            }
            Err(e) => {
                warn!("Connection attempt failed: {}", e);
            }
        }

        if attempt >= policy.max_attempts {
            error!("Giving up after {} reconnection attempts", attempt);
            status.send_replace(ConnectionStatus::Closed);
            let _ = events.send(ChannelEvent::Failed { attempts: attempt });
            return;
        }

        attempt += 1;
        status.send_replace(ConnectionStatus::Reconnecting { attempt });
        let _ = events.send(ChannelEvent::Reconnecting { attempt });
        debug!("Reconnecting in {:?} (attempt {}/{})", policy.delay, attempt, policy.max_attempts);

        tokio::select! {
            _ = tokio::time::sleep(policy.delay) => {}
            _ = &mut shutdown_rx => {
                status.send_replace(ConnectionStatus::Closed);
                return;
            }
        }
    }
}

async fn pump<T: Transport>(
    transport: &mut T,
    cmd_rx: &mut mpsc::UnboundedReceiver<ClientMessage>,
    events: &broadcast::Sender<ChannelEvent>,
    shutdown_rx: &mut oneshot::Receiver<()>,
) -> PumpExit {
    loop {
        tokio::select! {
            biased;

            _ = &mut *shutdown_rx => {
                // Flush intents queued before teardown
                while let Ok(message) = cmd_rx.try_recv() {
                    if write(transport, &message).await.is_err() {
                        break;
                    }
                }
                return PumpExit::Stop;
            }

            command = cmd_rx.recv() => match command {
                Some(message) => {
                    if let Err(e) = write(transport, &message).await {
                        return PumpExit::Lost(e.to_string());
                    }
                }
                None => return PumpExit::Stop,
            },

            frame = transport.recv() => match frame {
                Some(Ok(text)) => match ServerMessage::from_json(&text) {
                    Ok(message) => {
                        debug!("Received {}", message.event_name());
                        let _ = events.send(ChannelEvent::Message(message));
                    }
                    Err(e) => warn!("Dropping malformed frame: {} - {}", e, text),
                },
                Some(Err(e)) => return PumpExit::Lost(e.to_string()),
                None => return PumpExit::Lost("closed by server".to_string()),
            },
        }
    }
}

async fn write<T: Transport>(transport: &mut T, message: &ClientMessage) -> Result<(), ConnectionError> {
    let frame = message
        .to_json()
        .map_err(|e| ConnectionError::SendFailed(e.to_string()))?;
    debug!("Sending {}", message.event_name());
    transport.send(frame).await
}
