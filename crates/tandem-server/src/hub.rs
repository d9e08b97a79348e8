//! Session broadcast hub.
//!
//! Keeps the ordered list of live sessions and fans typed events out to
//! them. Broadcasting only enqueues; [`SessionBroadcastHub::pump`] delivers.
//! Events broadcast from inside a delivery are delivered before the rest of
//! the queue, so a handler that broadcasts behaves as if the nested dispatch
//! happened synchronously.
//!
//! A failed delivery is counted and logged. It never stops the pump and
//! never reaches the broadcaster.

use std::{collections::VecDeque, sync::Arc};

use tandem_core::MarkerId;

use crate::session_error::SessionError;

/// Session identifier assigned by the runtime.
pub type SessionId = u64;

/// Notification delivered to sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubEvent {
    /// Drop every foreign marker.
    ClearForeignCursors,
    /// Re-announce your own marker to everyone else.
    RefreshForeignCursors,
    /// Start rendering the marker of the given session.
    AddForeignCursor(MarkerId),
    /// Redraw.
    Rerender,
    /// The shared text changed to this.
    TextUpdate(Arc<str>),
    /// Close the connection.
    Disconnect,
}

impl HubEvent {
    /// Event name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ClearForeignCursors => "clear-foreign-cursors",
            Self::RefreshForeignCursors => "refresh-foreign-cursors",
            Self::AddForeignCursor(_) => "add-foreign-cursor",
            Self::Rerender => "rerender",
            Self::TextUpdate(_) => "text-update",
            Self::Disconnect => "disconnect",
        }
    }
}

/// One queued delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Receiving session.
    pub recipient: SessionId,
    /// Event to deliver.
    pub event: HubEvent,
}

/// Outcome of one [`SessionBroadcastHub::pump`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Successful deliveries.
    pub delivered: usize,
    /// Failed deliveries.
    pub failed: usize,
}

impl PumpReport {
    /// Sum of two reports.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self { delivered: self.delivered + other.delivered, failed: self.failed + other.failed }
    }
}

/// Registry of live sessions plus the pending delivery queue.
#[derive(Debug, Default)]
pub struct SessionBroadcastHub {
    /// Registration order.
    sessions: Vec<SessionId>,
    /// Deliveries not yet attempted.
    queue: VecDeque<Envelope>,
    /// Deliveries broadcast since the last dequeue. Spliced in front of
    /// `queue` before the next one is taken.
    staged: Vec<Envelope>,
}

impl SessionBroadcastHub {
    /// Empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a session.
    pub fn register(&mut self, session_id: SessionId) -> Result<(), SessionError> {
        if self.sessions.contains(&session_id) {
            return Err(SessionError::AlreadyExists(session_id));
        }
        self.sessions.push(session_id);
        Ok(())
    }

    /// Remove a session by identity. Deliveries already queued for it stay
    /// queued and will fail.
    pub fn unregister(&mut self, session_id: SessionId) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|&id| id != session_id);
        self.sessions.len() != before
    }

    /// `true` if the session is registered.
    pub fn contains(&self, session_id: SessionId) -> bool {
        self.sessions.contains(&session_id)
    }

    /// Registered sessions in registration order.
    pub fn sessions(&self) -> &[SessionId] {
        &self.sessions
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// `true` if no session is registered.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Deliveries waiting for the next pump.
    pub fn pending(&self) -> usize {
        self.queue.len() + self.staged.len()
    }

    /// Queue `event` for every registered session except `origin`.
    pub fn broadcast(&mut self, origin: Option<SessionId>, event: HubEvent) {
        for &recipient in &self.sessions {
            if Some(recipient) != origin {
                self.staged.push(Envelope { recipient, event: event.clone() });
            }
        }
    }

    fn next_envelope(&mut self) -> Option<Envelope> {
        for envelope in self.staged.drain(..).rev() {
            self.queue.push_front(envelope);
        }
        self.queue.pop_front()
    }

    /// Deliver everything queued, including events broadcast by the
    /// deliveries themselves.
    ///
    /// `deliver` gets the hub back so it can broadcast.
    pub fn pump<F>(&mut self, mut deliver: F) -> PumpReport
    where
        F: FnMut(&mut Self, &Envelope) -> Result<(), SessionError>,
    {
        let mut report = PumpReport::default();
        while let Some(envelope) = self.next_envelope() {
            match deliver(self, &envelope) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(
                        recipient = envelope.recipient,
                        event = envelope.event.name(),
                        "delivery failed: {err}"
                    );
                },
            }
        }
        report
    }
}
