//! Supervised accept loop.
//!
//! The listener moves through `Starting -> Listening`; if the listen socket
//! fails it logs, waits `reconnect_delay` in `Backoff` and starts over. Only
//! the shutdown signal ends the loop, after which every live connection
//! handler is awaited before the state becomes `Stopped`.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use uuid::Uuid;

use courtside_events::{Broadcaster, Shutdown};

use crate::config::ListenerConfig;
use crate::connection::Connection;
use crate::error::{ListenerError, Result};
use crate::publisher::{ListenerStats, ListenerStatsSnapshot, SnapshotPublisher};

/// Lifecycle of a [`DeviceListener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Stopped,
    Starting,
    Listening { local_addr: SocketAddr },
    Backoff { retry_in: Duration },
}

/// TCP listener for the scoreboard controller feed.
pub struct DeviceListener {
    config: ListenerConfig,
    publisher: Arc<SnapshotPublisher>,
    stats: Arc<ListenerStats>,
    state: watch::Sender<ListenerState>,
}

impl DeviceListener {
    pub fn new(config: ListenerConfig, broadcaster: Arc<dyn Broadcaster>) -> Self {
        let stats = Arc::new(ListenerStats::default());
        let publisher = Arc::new(SnapshotPublisher::new(broadcaster, Arc::clone(&stats)));
        let (state, _) = watch::channel(ListenerState::Stopped);

        Self {
            config,
            publisher,
            stats,
            state,
        }
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    pub fn state(&self) -> ListenerState {
        *self.state.borrow()
    }

    /// Receiver that observes every state transition.
    pub fn watch_state(&self) -> watch::Receiver<ListenerState> {
        self.state.subscribe()
    }

    pub fn stats(&self) -> ListenerStatsSnapshot {
        self.stats.snapshot()
    }

    /// Run until `shutdown` is triggered.
    pub async fn run(&self, mut shutdown: Shutdown) {
        tracing::info!(
            bind = %self.config.bind_address,
            port = self.config.port,
            "Device listener starting"
        );

        let mut connections = JoinSet::new();

        while !shutdown.is_triggered() {
            self.state.send_replace(ListenerState::Starting);

            match self.serve(&mut connections, &mut shutdown).await {
                Ok(()) => break,
                Err(e) => {
                    let retry_in = self.config.reconnect_delay;
                    tracing::error!(
                        error = %e,
                        retry_in_ms = retry_in.as_millis() as u64,
                        "Device listener faulted, retrying"
                    );
                    self.stats.record_restart();
                    self.state.send_replace(ListenerState::Backoff { retry_in });

                    if !shutdown.sleep(retry_in).await {
                        break;
                    }
                }
            }
        }

        if !connections.is_empty() {
            tracing::info!(
                active = connections.len(),
                "Waiting for controller connections to finish"
            );
        }
        while let Some(joined) = connections.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "Connection handler panicked");
            }
        }

        self.state.send_replace(ListenerState::Stopped);
        tracing::info!("Device listener stopped");
    }

    /// Bind and accept until shutdown (`Ok`) or a listen socket failure (`Err`).
    async fn serve(&self, connections: &mut JoinSet<()>, shutdown: &mut Shutdown) -> Result<()> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ListenerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        tracing::info!(addr = %local_addr, "Device listener ready");
        self.state
            .send_replace(ListenerState::Listening { local_addr });

        loop {
            tokio::select! {
                _ = shutdown.triggered() => return Ok(()),
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        tracing::warn!(error = %e, "Connection handler panicked");
                    }
                }
                accepted = listener.accept() => match accepted {
                    Ok((socket, peer)) => {
                        self.spawn_connection(connections, socket, peer, shutdown.clone());
                    }
                    Err(e) if is_connection_error(&e) => {
                        tracing::warn!(error = %e, "Accept failed for a single connection");
                    }
                    Err(e) => return Err(ListenerError::Accept(e)),
                },
            }
        }
    }

    fn spawn_connection(
        &self,
        connections: &mut JoinSet<()>,
        socket: TcpStream,
        peer: SocketAddr,
        shutdown: Shutdown,
    ) {
        self.stats.record_connection();

        let connection = Connection::new(
            Uuid::new_v4(),
            socket,
            peer,
            self.config.clone(),
            Arc::clone(&self.publisher),
        );
        connections.spawn(connection.run(shutdown));
    }
}

/// Errors that concern only the connection being accepted, not the socket.
fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}
