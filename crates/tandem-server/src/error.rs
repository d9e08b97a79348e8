//! Runtime errors for the TCP server.
//!
//! Per-session failures inside the driver are [`SessionError`]s and never
//! reach this type; they are logged by the connection task instead.
//!
//! [`SessionError`]: crate::SessionError

use thiserror::Error;

/// Errors that stop the server or one of its connection tasks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServerError {
    /// Bad bind address or unreadable document. Prevents startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Bind, accept or address lookup failed on the listening socket.
    #[error("transport error: {0}")]
    Transport(String),

    /// A connection's writer task died or its channel closed early.
    #[error("internal error: {0}")]
    Internal(String),
}
