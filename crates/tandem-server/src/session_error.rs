//! Session-level errors.
//!
//! Returned by [`crate::ServerDriver::process_event`] and by hub deliveries.
//! None of them are fatal to the server: the runtime logs them and carries
//! on with the other sessions.

use thiserror::Error;

use crate::hub::SessionId;

/// Errors raised while handling one session's events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No such session.
    ///
    /// Usually a late event for a connection that already closed.
    #[error("session not found: {0}")]
    NotFound(SessionId),

    /// Session id reused while the old session is still live.
    ///
    /// The runtime hands out unique ids, so this is a bug.
    #[error("session already exists: {0}")]
    AlreadyExists(SessionId),

    /// Connection refused because the server is full.
    #[error("session capacity reached ({max} sessions)")]
    CapacityReached {
        /// Configured limit.
        max: usize,
    },

    /// The session is shutting down and accepts no more events.
    #[error("session {0} is closing")]
    Closing(SessionId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_error_display() {
        assert_eq!(SessionError::NotFound(42).to_string(), "session not found: 42");
        assert_eq!(SessionError::AlreadyExists(7).to_string(), "session already exists: 7");
        assert_eq!(
            SessionError::CapacityReached { max: 2 }.to_string(),
            "session capacity reached (2 sessions)"
        );
        assert_eq!(SessionError::Closing(3).to_string(), "session 3 is closing");
    }
}
