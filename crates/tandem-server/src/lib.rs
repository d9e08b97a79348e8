//! Tandem collaborative editing server.
//!
//! Every connected terminal edits the same document through its own modal
//! editor and sees the other participants' cursors as coloured markers.
//!
//! # Architecture
//!
//! The [`ServerDriver`] is sans-IO: it owns the [`World`] (sessions, the
//! broadcast hub and the shared text), consumes [`ServerEvent`]s and returns
//! [`ServerAction`]s. [`Server`] executes those actions over TCP with the
//! Tokio runtime.
//!
//! # Components
//!
//! - [`SessionBroadcastHub`]: ordered session registry and event fan-out
//! - [`Session`]: one client's editor, renderer and pending output
//! - [`World`]: all sessions plus the shared text
//! - [`ServerDriver`]: event in, actions out
//! - [`Server`]: production runtime over [`TcpTransport`]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod driver;
mod error;
pub mod hub;
mod session;
mod session_error;
mod transport;
mod world;

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use bytes::Bytes;
pub use driver::{DriverConfig, LogLevel, ServerAction, ServerDriver, ServerEvent};
pub use error::ServerError;
pub use hub::{HubEvent, PumpReport, SessionBroadcastHub, SessionId};
pub use session::{Session, SessionState};
pub use session_error::SessionError;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::{Mutex, Notify, RwLock, mpsc},
    task::JoinSet,
};
pub use transport::{ClientInput, SIZE_REQUEST, TcpTransport, split_input};
pub use world::World;

/// Read buffer per connection. A paste larger than this arrives as several
/// chunks.
const READ_BUFFER_SIZE: usize = 16 * 1024;

/// Outbound side of one connection.
struct Outbound {
    /// Bytes for the writer task
    tx: mpsc::UnboundedSender<Bytes>,
    /// Wakes the read loop when the server closes the session
    close: Arc<Notify>,
}

/// Shared state for all connections.
struct SharedState {
    /// Map of session ID to its outbound channel
    outbound: RwLock<HashMap<SessionId, Outbound>>,
    /// Next session ID to hand out
    next_session: AtomicU64,
}

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerRuntimeConfig {
    /// Address to bind to (e.g., "0.0.0.0:8022")
    pub bind_address: String,
    /// Driver configuration (limits, initial text)
    pub driver: DriverConfig,
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0:8022".to_string(), driver: DriverConfig::default() }
    }
}

/// Production Tandem server.
///
/// Wraps `ServerDriver` with the TCP transport.
pub struct Server {
    /// The action-based server driver
    driver: ServerDriver,
    /// Listening socket
    transport: TcpTransport,
}

impl Server {
    /// Create and bind a new server.
    pub async fn bind(config: ServerRuntimeConfig) -> Result<Self, ServerError> {
        let driver = ServerDriver::new(config.driver);
        let transport = TcpTransport::bind(&config.bind_address).await?;
        Ok(Self { driver, transport })
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.transport.local_addr()
    }

    /// Run until Ctrl-C, then disconnect every session and wait for their
    /// connections to wind down.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Server starting on {}", self.transport.local_addr()?);

        let driver = Arc::new(Mutex::new(self.driver));
        let shared =
            Arc::new(SharedState { outbound: RwLock::new(HashMap::new()), next_session: AtomicU64::new(1) });
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                accepted = self.transport.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let session_id = shared.next_session.fetch_add(1, Ordering::Relaxed);
                        let driver = Arc::clone(&driver);
                        let shared = Arc::clone(&shared);

                        connections.spawn(async move {
                            if let Err(e) = handle_connection(stream, peer, session_id, driver, shared).await {
                                tracing::error!("Connection error for session {}: {}", session_id, e);
                            }
                        });
                    },
                    Err(e) => {
                        tracing::error!("Accept error: {}", e);
                    },
                },
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!("Connection task failed: {}", e);
                    }
                },
                signal = tokio::signal::ctrl_c() => {
                    if let Err(e) = signal {
                        tracing::error!("Failed to listen for shutdown signal: {}", e);
                    }
                    break;
                },
            }
        }

        tracing::info!("Shutting down");
        {
            let mut driver = driver.lock().await;
            match driver.process_event(ServerEvent::Shutdown) {
                Ok(actions) => execute_actions(actions, &shared).await,
                Err(e) => tracing::warn!("Shutdown processing error: {}", e),
            }
        }
        while let Some(joined) = connections.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Connection task failed: {}", e);
            }
        }

        Ok(())
    }
}

/// Handle a single TCP connection from open to close.
async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    session_id: SessionId,
    driver: Arc<Mutex<ServerDriver>>,
    shared: Arc<SharedState>,
) -> Result<(), ServerError> {
    tracing::debug!("New connection from {}: session {}", peer, session_id);

    let (mut reader, writer) = stream.into_split();
    let (tx, rx) = mpsc::unbounded_channel();
    let close = Arc::new(Notify::new());

    // Ask for the size before anything else is queued.
    if tx.send(Bytes::from_static(SIZE_REQUEST)).is_err() {
        return Err(ServerError::Internal("writer channel closed before start".to_string()));
    }
    let writer_task = tokio::spawn(write_loop(session_id, writer, rx));

    {
        let mut outbound = shared.outbound.write().await;
        outbound.insert(session_id, Outbound { tx, close: Arc::clone(&close) });
        tracing::info!("{} connections", outbound.len());
    }

    {
        let mut driver = driver.lock().await;
        let actions = driver.process_event(ServerEvent::SessionOpened {
            session_id,
            identity: format!("guest-{session_id}"),
            viewport: None,
        });
        match actions {
            Ok(actions) => execute_actions(actions, &shared).await,
            Err(e) => tracing::warn!("Session open error: {}", e),
        }
    }

    let reason = read_loop(session_id, &mut reader, &close, &driver, &shared).await;

    {
        let mut outbound = shared.outbound.write().await;
        outbound.remove(&session_id);
    }

    {
        let mut driver = driver.lock().await;
        match driver.process_event(ServerEvent::SessionClosed { session_id, reason }) {
            Ok(actions) => execute_actions(actions, &shared).await,
            Err(e) => tracing::debug!("Session close error: {}", e),
        }
    }

    writer_task
        .await
        .map_err(|e| ServerError::Internal(format!("writer task for session {session_id} failed: {e}")))
}

/// Feed input to the driver until the peer hangs up or the server closes
/// the session. Returns the close reason.
async fn read_loop(
    session_id: SessionId,
    reader: &mut OwnedReadHalf,
    close: &Notify,
    driver: &Mutex<ServerDriver>,
    shared: &SharedState,
) -> String {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let n = tokio::select! {
            read = reader.read(&mut buf) => match read {
                Ok(0) => return "connection closed".to_string(),
                Ok(n) => n,
                Err(e) => {
                    tracing::debug!("Read error for session {}: {}", session_id, e);
                    return format!("read error: {e}");
                },
            },
            () = close.notified() => return "closed by server".to_string(),
        };

        let input = split_input(&buf[..n]);
        let mut events: Vec<ServerEvent> = input
            .resizes
            .into_iter()
            .map(|viewport| ServerEvent::Resized { session_id, viewport })
            .collect();
        if !input.keys.is_empty() {
            events.push(ServerEvent::DataReceived { session_id, data: input.keys });
        }

        let mut driver = driver.lock().await;
        for event in events {
            match driver.process_event(event) {
                Ok(actions) => execute_actions(actions, shared).await,
                Err(e) => {
                    tracing::warn!("Input processing error for session {}: {}", session_id, e);
                },
            }
        }
    }
}

/// Drain a session's channel into its socket.
async fn write_loop(session_id: SessionId, mut writer: OwnedWriteHalf, mut rx: mpsc::UnboundedReceiver<Bytes>) {
    while let Some(bytes) = rx.recv().await {
        if let Err(e) = writer.write_all(&bytes).await {
            tracing::debug!("Write error for session {}: {}", session_id, e);
            return;
        }
    }
    if let Err(e) = writer.shutdown().await {
        tracing::debug!("Shutdown error for session {}: {}", session_id, e);
    }
}

/// Execute server actions.
async fn execute_actions(actions: Vec<ServerAction>, shared: &SharedState) {
    let outbound = shared.outbound.read().await;

    for action in actions {
        match action {
            ServerAction::SendToSession { session_id, bytes } => match outbound.get(&session_id) {
                Some(conn) => {
                    if conn.tx.send(bytes).is_err() {
                        tracing::debug!("SendToSession: writer for {} is gone", session_id);
                    }
                },
                None => tracing::debug!("SendToSession: session {} not found", session_id),
            },

            ServerAction::CloseSession { session_id, reason } => {
                tracing::info!("Closing session {}: {}", session_id, reason);
                if let Some(conn) = outbound.get(&session_id) {
                    conn.close.notify_one();
                }
            },

            ServerAction::Log { level, message } => match level {
                LogLevel::Debug => tracing::debug!("{}", message),
                LogLevel::Info => tracing::info!("{}", message),
                LogLevel::Warn => tracing::warn!("{}", message),
                LogLevel::Error => tracing::error!("{}", message),
            },
        }
    }
}
