//! One connected client.

use bytes::Bytes;
use tandem_core::{
    AnsiSink, Editor, RemoteCursorMarker, Renderer, TerminalSink,
    sink::{session_enter_ops, session_leave_ops},
};

use crate::hub::SessionId;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting input and broadcasts.
    Active,
    /// Asked to disconnect. `reported` is set once the runtime has been told
    /// to close the transport.
    Closing {
        /// Close action already emitted.
        reported: bool,
    },
}

/// A client's editor, renderer and pending terminal output.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    identity: String,
    editor: Editor,
    renderer: Renderer,
    sink: AnsiSink,
    state: SessionState,
}

impl Session {
    /// New active session. The terminal setup sequence is queued as the first
    /// output.
    pub fn new(id: SessionId, identity: impl Into<String>, editor: Editor) -> Self {
        let mut sink = AnsiSink::new();
        for op in session_enter_ops() {
            sink.apply(op);
        }
        Self {
            id,
            identity: identity.into(),
            editor,
            renderer: Renderer::new(),
            sink,
            state: SessionState::Active,
        }
    }

    /// Session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Display name.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Editing state.
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Mutable editing state.
    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    /// Lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// `true` once a disconnect was requested.
    pub fn is_closing(&self) -> bool {
        matches!(self.state, SessionState::Closing { .. })
    }

    /// Commit the editor to the terminal.
    pub fn render(&mut self, markers: &[RemoteCursorMarker]) {
        self.renderer.commit(&mut self.editor, markers, &mut self.sink);
    }

    /// Start closing: queue the terminal restore sequence. Returns `false`
    /// if already closing.
    pub fn begin_close(&mut self) -> bool {
        if self.is_closing() {
            return false;
        }
        for op in session_leave_ops() {
            self.sink.apply(op);
        }
        self.state = SessionState::Closing { reported: false };
        true
    }

    /// `true` exactly once after [`Session::begin_close`].
    pub fn take_close_request(&mut self) -> bool {
        match self.state {
            SessionState::Closing { reported: false } => {
                self.state = SessionState::Closing { reported: true };
                true
            },
            _ => false,
        }
    }

    /// Terminal bytes produced since the last call. `None` if there are none.
    pub fn take_output(&mut self) -> Option<Bytes> {
        (self.sink.pending() > 0).then(|| self.sink.take())
    }
}

#[cfg(test)]
mod tests {
    use tandem_core::{Rgb, Viewport};

    use super::*;

    fn session() -> Session {
        let marker = RemoteCursorMarker::new(1, "guest-1", Rgb::default());
        Session::new(1, "guest-1", Editor::new("hi", marker, Viewport::new(20, 5)))
    }

    #[test]
    fn first_output_enters_alternate_screen() {
        let mut s = session();
        let out = s.take_output().unwrap();
        assert!(out.starts_with(b"\x1b[?1049h\x1b[?2004h"));
        assert!(s.take_output().is_none());
    }

    #[test]
    fn render_produces_one_atomic_burst() {
        let mut s = session();
        s.take_output();
        s.render(&[]);
        let out = s.take_output().unwrap();
        assert!(out.starts_with(b"\x1b[?2026h"));
        assert!(out.ends_with(b"\x1b[?2026l"));
        assert!(out.windows(2).any(|w| w == b"hi"));
    }

    #[test]
    fn close_is_requested_once() {
        let mut s = session();
        assert!(s.begin_close());
        assert!(!s.begin_close());
        assert!(s.take_close_request());
        assert!(!s.take_close_request());
        assert!(s.is_closing());

        let out = s.take_output().unwrap();
        assert!(out.ends_with(b"\x1b[?2004l\x1b[?1049l"));
    }
}
