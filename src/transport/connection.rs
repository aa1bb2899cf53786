//! Line-framed TCP connection and event loop.
//!
//! This module handles the TCP connection to the remote debugger.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Incoming lines from the remote debugger (delivered to the listener)
//! - Outgoing lines queued by [`Connection::send_message`]
//! - Connection loss (read/write failure, remote close, local disconnect)
//!
//! The listener hears about loss exactly once per connection.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, error, info, trace, warn};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for reaching the remote debugger.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

// ============================================================================
// ConnectionListener
// ============================================================================

/// Receiver of connection lifecycle events and inbound lines.
///
/// Callbacks run on the connection's event loop task (or on the caller of
/// [`Connection::disconnect`]), so they must not block for long.
pub trait ConnectionListener: Send + Sync {
    /// The socket is connected; called before `connect` returns.
    fn on_connection_established(&self);

    /// The connection is gone.
    fn on_connection_lost(&self);

    /// One line arrived, without its terminator.
    fn on_message_received(&self, message: &str);
}

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Write one line and flush.
    Send(String),
    /// Close the socket.
    Shutdown,
}

// ============================================================================
// ConnectionState
// ============================================================================

/// State shared between the handle and the event loop.
struct ConnectionState {
    /// Remote host.
    host: String,
    /// Remote port.
    port: u16,
    /// Cleared on the first loss signal.
    connected: AtomicBool,
    /// Lifecycle and message receiver.
    listener: Arc<dyn ConnectionListener>,
}

impl ConnectionState {
    /// Signals loss to the listener, once.
    fn mark_lost(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            info!(host = %self.host, port = self.port, "Debugger connection lost");
            self.listener.on_connection_lost();
        }
    }
}

// ============================================================================
// Connection
// ============================================================================

/// TCP connection to the remote debugger.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync` and cheap to clone. [`send_message`] only
/// enqueues the line, so it can be called from engine threads that are not
/// running inside the tokio runtime.
///
/// [`send_message`]: Connection::send_message
#[derive(Clone)]
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Shared state.
    state: Arc<ConnectionState>,
}

impl Connection {
    /// Connects to the remote debugger and starts the event loop.
    ///
    /// The listener's `on_connection_established` runs before this returns.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if the socket is not connected within `connect_timeout`
    /// - [`Error::Connection`] if the connection is refused or the host cannot be resolved
    pub async fn connect(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        listener: Arc<dyn ConnectionListener>,
    ) -> Result<Self> {
        let stream = timeout(connect_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| Error::connection_timeout(connect_timeout.as_millis() as u64))?
            .map_err(|e| Error::connection(format!("{host}:{port}: {e}")))?;

        if let Err(e) = stream.set_nodelay(true) {
            debug!(error = %e, "Failed to set TCP_NODELAY");
        }

        let (reader, writer) = stream.into_split();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let state = Arc::new(ConnectionState {
            host: host.to_string(),
            port,
            connected: AtomicBool::new(true),
            listener,
        });

        info!(host, port, "Debugger connection established");
        state.listener.on_connection_established();

        tokio::spawn(Self::run_event_loop(
            reader,
            writer,
            command_rx,
            Arc::clone(&state),
        ));

        Ok(Self { command_tx, state })
    }

    /// Returns the remote host.
    #[inline]
    #[must_use]
    pub fn host(&self) -> &str {
        &self.state.host
    }

    /// Returns the remote port.
    #[inline]
    #[must_use]
    pub fn port(&self) -> u16 {
        self.state.port
    }

    /// Returns `true` until the connection is lost or disconnected.
    ///
    /// A cheap poll: an in-flight read failure may not be visible yet.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }

    /// Queues one line for the remote debugger.
    ///
    /// The event loop appends the newline and flushes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the connection is gone.
    pub fn send_message(&self, message: &str) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::ConnectionClosed);
        }

        self.command_tx
            .send(ConnectionCommand::Send(message.to_string()))
            .map_err(|_| Error::ConnectionClosed)?;

        trace!(len = message.len(), "Message queued");
        Ok(())
    }

    /// Closes the connection and signals loss to the listener.
    ///
    /// Idempotent; close errors are swallowed.
    pub fn disconnect(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
        self.state.mark_lost();
    }

    /// Event loop that handles socket I/O.
    async fn run_event_loop(
        reader: OwnedReadHalf,
        mut writer: OwnedWriteHalf,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        state: Arc<ConnectionState>,
    ) {
        let mut lines = BufReader::new(reader).lines();

        loop {
            tokio::select! {
                // Incoming lines from the remote debugger
                line = lines.next_line() => {
                    match line {
                        Ok(Some(line)) => {
                            if line.trim().is_empty() {
                                continue;
                            }
                            trace!(len = line.len(), "Message received");
                            state.listener.on_message_received(&line);
                        }

                        Ok(None) => {
                            debug!("Connection closed by remote");
                            break;
                        }

                        Err(e) => {
                            error!(error = %e, "Socket read failed");
                            break;
                        }
                    }
                }

                // Outgoing lines and shutdown
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send(message)) => {
                            if let Err(e) = Self::write_line(&mut writer, &message).await {
                                warn!(error = %e, "Socket write failed");
                                break;
                            }
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = writer.shutdown().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        state.mark_lost();

        debug!("Event loop terminated");
    }

    /// Writes one newline-terminated line and flushes.
    async fn write_line(writer: &mut OwnedWriteHalf, message: &str) -> std::io::Result<()> {
        writer.write_all(message.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await
    }
}

// ============================================================================
// Tests
// ============================================================================
