//! Editing core for Tandem.
//!
//! Pure state: no I/O, no clocks, no globals. A session's keystrokes go into
//! an [`Editor`], and a [`Renderer`] turns the editor into terminal
//! operations on a [`TerminalSink`]. Everything here is deterministic and
//! tested without a terminal.
//!
//! # Components
//!
//! - [`Document`]: rope-backed text with char offsets and `\n` lines
//! - [`cursor`]: word/line extents and remembered-column vertical motion
//! - [`Editor`]: modal editing state machine ([`Mode`])
//! - [`RemoteCursorMarker`]: named, coloured cursor shown to other sessions
//! - [`Renderer`]: differential renderer over [`TermOp`]
//! - [`AnsiSink`]: encodes [`TermOp`] to ANSI bytes

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod buffer;
pub mod cursor;
mod editor;
mod marker;
mod mode;
pub mod render;
pub mod sink;

pub use buffer::Document;
pub use editor::{Editor, KeyOutcome, Viewport};
pub use marker::{MarkerId, RemoteCursorMarker, Rgb};
pub use mode::Mode;
pub use render::{Renderer, ScreenPos, actual_xy};
pub use sink::{AnsiSink, ClearKind, Color, CursorShape, TermOp, TerminalSink};
