//! Shared editing world.
//!
//! Owns every session, the broadcast hub and the canonical document text.
//! One instance per server, passed by handle rather than reached through a
//! global, so tests build isolated worlds freely.
//!
//! Each operation mutates the acting session, queues broadcasts and pumps
//! the hub to completion before returning. Output lands in the sessions'
//! sinks and is collected with [`World::drain_output`].

use std::{collections::BTreeMap, sync::Arc};

use bytes::Bytes;
use rand::rngs::StdRng;
use tandem_core::{Editor, RemoteCursorMarker, Rgb, Viewport};
use tandem_keys::decode;
use tracing::{debug, trace};

use crate::{
    hub::{Envelope, HubEvent, PumpReport, SessionBroadcastHub, SessionId},
    session::Session,
    session_error::SessionError,
};

/// All live sessions and the text they share.
#[derive(Debug)]
pub struct World {
    sessions: BTreeMap<SessionId, Session>,
    hub: SessionBroadcastHub,
    text: String,
    rng: StdRng,
    max_sessions: usize,
}

impl World {
    /// Empty world holding `text`.
    pub fn new(text: impl Into<String>, max_sessions: usize, rng: StdRng) -> Self {
        Self {
            sessions: BTreeMap::new(),
            hub: SessionBroadcastHub::new(),
            text: text.into(),
            rng,
            max_sessions,
        }
    }

    /// Canonical document text (the most recent edit from any session).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Session by id.
    pub fn session(&self, session_id: SessionId) -> Option<&Session> {
        self.sessions.get(&session_id)
    }

    /// Number of sessions, closing ones included.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// The broadcast hub.
    pub fn hub(&self) -> &SessionBroadcastHub {
        &self.hub
    }

    /// Add a session editing the current text and announce it.
    pub fn connect(
        &mut self,
        session_id: SessionId,
        identity: &str,
        viewport: Viewport,
    ) -> Result<PumpReport, SessionError> {
        if self.sessions.contains_key(&session_id) {
            return Err(SessionError::AlreadyExists(session_id));
        }
        if self.sessions.len() >= self.max_sessions {
            return Err(SessionError::CapacityReached { max: self.max_sessions });
        }

        self.hub.register(session_id)?;

        let marker = RemoteCursorMarker::new(session_id, identity, Rgb::random(&mut self.rng));
        let editor = Editor::new(&self.text, marker, viewport);
        self.sessions.insert(session_id, Session::new(session_id, identity, editor));
        debug!(session_id, identity, sessions = self.sessions.len(), "session connected");

        self.hub.broadcast(None, HubEvent::RefreshForeignCursors);
        self.hub.broadcast(None, HubEvent::Rerender);
        Ok(self.pump())
    }

    /// Feed one raw input chunk to a session's editor.
    pub fn key_input(&mut self, session_id: SessionId, data: &[u8]) -> Result<PumpReport, SessionError> {
        let session = self.active_session(session_id)?;
        let stroke = decode(data);
        trace!(session_id, key = %stroke, "key");

        let outcome = session.editor_mut().on_key(&stroke);
        let edited = outcome.text_changed.then(|| session.editor().document().to_string());

        // Peers apply the edit first so the originator draws their moved markers.
        let mut report = PumpReport::default();
        if let Some(text) = edited {
            self.hub.broadcast(Some(session_id), HubEvent::TextUpdate(Arc::from(text.as_str())));
            self.text = text;
            report = self.pump();
        }

        self.render(session_id);
        self.hub.broadcast(Some(session_id), HubEvent::Rerender);
        Ok(report.merge(self.pump()))
    }

    /// Apply a new terminal size and redraw.
    pub fn resize(&mut self, session_id: SessionId, viewport: Viewport) -> Result<(), SessionError> {
        let session = self.active_session(session_id)?;
        session.editor_mut().set_viewport(viewport);
        debug!(session_id, width = viewport.width, height = viewport.height, "resized");
        self.render(session_id);
        Ok(())
    }

    /// Remove a session whose transport closed. The others drop its marker
    /// and redraw.
    pub fn close(&mut self, session_id: SessionId) -> Result<PumpReport, SessionError> {
        if self.sessions.remove(&session_id).is_none() {
            return Err(SessionError::NotFound(session_id));
        }
        self.hub.unregister(session_id);
        debug!(session_id, sessions = self.sessions.len(), "session closed");

        self.hub.broadcast(None, HubEvent::ClearForeignCursors);
        self.hub.broadcast(None, HubEvent::RefreshForeignCursors);
        self.hub.broadcast(None, HubEvent::Rerender);
        Ok(self.pump())
    }

    /// Ask one session to disconnect.
    pub fn disconnect(&mut self, session_id: SessionId) -> Result<(), SessionError> {
        self.active_session(session_id)?.begin_close();
        Ok(())
    }

    /// Ask every session to disconnect.
    pub fn disconnect_all(&mut self) -> PumpReport {
        self.hub.broadcast(None, HubEvent::Disconnect);
        self.pump()
    }

    /// Terminal output produced since the last call, per session.
    pub fn drain_output(&mut self) -> Vec<(SessionId, Bytes)> {
        self.sessions
            .iter_mut()
            .filter_map(|(&id, session)| session.take_output().map(|bytes| (id, bytes)))
            .collect()
    }

    /// Sessions that started closing since the last call.
    pub fn drain_close_requests(&mut self) -> Vec<SessionId> {
        self.sessions
            .iter_mut()
            .filter_map(|(&id, session)| session.take_close_request().then_some(id))
            .collect()
    }

    fn active_session(&mut self, session_id: SessionId) -> Result<&mut Session, SessionError> {
        let session = self.sessions.get_mut(&session_id).ok_or(SessionError::NotFound(session_id))?;
        if session.is_closing() {
            return Err(SessionError::Closing(session_id));
        }
        Ok(session)
    }

    /// Snapshots of every live session's own marker.
    fn markers(&self) -> Vec<RemoteCursorMarker> {
        self.sessions
            .values()
            .filter(|session| !session.is_closing())
            .map(|session| session.editor().own_cursor().clone())
            .collect()
    }

    fn render(&mut self, session_id: SessionId) {
        let markers = self.markers();
        if let Some(session) = self.sessions.get_mut(&session_id) {
            session.render(&markers);
        }
    }

    fn pump(&mut self) -> PumpReport {
        let mut hub = std::mem::take(&mut self.hub);
        let report = hub.pump(|hub, envelope| self.deliver(hub, envelope));
        self.hub = hub;
        report
    }

    fn deliver(&mut self, hub: &mut SessionBroadcastHub, envelope: &Envelope) -> Result<(), SessionError> {
        let id = envelope.recipient;
        let markers = if envelope.event == HubEvent::Rerender { self.markers() } else { Vec::new() };
        let session = self.active_session(id)?;

        match &envelope.event {
            HubEvent::ClearForeignCursors => session.editor_mut().clear_remote_cursors(),
            HubEvent::RefreshForeignCursors => hub.broadcast(Some(id), HubEvent::AddForeignCursor(id)),
            HubEvent::AddForeignCursor(owner) => session.editor_mut().add_remote_cursor(*owner),
            HubEvent::Rerender => session.render(&markers),
            HubEvent::TextUpdate(text) => {
                let editor = session.editor_mut();
                editor.set_text(text);
                editor.sync_own_cursor();
            },
            HubEvent::Disconnect => {
                session.begin_close();
            },
        }
        Ok(())
    }
}
