//! Terminal output vocabulary.
//!
//! The renderer speaks [`TermOp`] to a [`TerminalSink`]. [`AnsiSink`] encodes
//! operations to VT/ANSI bytes for the wire; `Vec<TermOp>` records them
//! verbatim, which is what the renderer tests inspect.

use bytes::{Bytes, BytesMut};

use crate::Rgb;

/// Extent of a line or screen clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearKind {
    /// The whole line or screen.
    All,
    /// From the cursor to the end.
    ToEnd,
    /// From the start up to the cursor.
    ToStart,
}

/// Terminal cursor shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    /// Full cell.
    Block,
    /// Underscore.
    Underline,
    /// Thin vertical bar.
    Bar,
}

/// Colour argument for foreground and background changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Palette blue.
    Blue,
    /// Palette bright blue.
    BrightBlue,
    /// 24-bit colour.
    Rgb(Rgb),
}

/// One terminal control operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermOp {
    /// UTF-8 text at the cursor. `\n` becomes CRLF on the wire.
    Write(String),
    /// Move to zero-based column `x`, row `y`.
    MoveTo {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },
    /// Move to the top-left cell.
    Home,
    /// Clear (part of) the current line.
    ClearLine(ClearKind),
    /// Clear (part of) the screen.
    ClearScreen(ClearKind),
    /// Set the foreground colour.
    SetForeground(Color),
    /// Set the background colour.
    SetBackground(Color),
    /// Reset all attributes.
    Reset,
    /// Show the cursor.
    ShowCursor,
    /// Hide the cursor.
    HideCursor,
    /// Change the cursor shape.
    SetCursorShape(CursorShape),
    /// Open an atomic output region.
    BeginAtomic,
    /// Close an atomic output region.
    EndAtomic,
    /// Switch to (`true`) or away from the alternate screen.
    AlternateScreen(bool),
    /// Enable or disable bracketed paste reporting.
    BracketedPaste(bool),
}

/// Consumer of terminal operations.
pub trait TerminalSink {
    /// Apply one operation.
    fn apply(&mut self, op: TermOp);

    /// Shorthand for [`TermOp::Write`].
    fn write(&mut self, text: impl Into<String>)
    where
        Self: Sized,
    {
        self.apply(TermOp::Write(text.into()));
    }

    /// Shorthand for [`TermOp::MoveTo`].
    fn move_to(&mut self, x: usize, y: usize)
    where
        Self: Sized,
    {
        self.apply(TermOp::MoveTo { x, y });
    }
}

impl TerminalSink for Vec<TermOp> {
    fn apply(&mut self, op: TermOp) {
        self.push(op);
    }
}

/// Encodes operations to ANSI escape sequences.
///
/// Bytes accumulate until [`AnsiSink::take`]. Atomic regions nest; only the
/// outermost pair emits the synchronized-update markers.
#[derive(Debug, Default)]
pub struct AnsiSink {
    buf: BytesMut,
    atomic_depth: usize,
}

impl AnsiSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` while inside an atomic region.
    pub fn in_atomic(&self) -> bool {
        self.atomic_depth > 0
    }

    /// Bytes buffered so far.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Drain everything buffered.
    pub fn take(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    fn push_str(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }

    fn push_text(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\r' => {},
                '\n' => self.push_str("\r\n"),
                c => {
                    let mut utf8 = [0u8; 4];
                    self.push_str(c.encode_utf8(&mut utf8));
                },
            }
        }
    }

    fn push_color(&mut self, color: Color, background: bool) {
        let seq = match (color, background) {
            (Color::Blue, false) => "\x1b[34m".to_owned(),
            (Color::Blue, true) => "\x1b[44m".to_owned(),
            (Color::BrightBlue, false) => "\x1b[94m".to_owned(),
            (Color::BrightBlue, true) => "\x1b[104m".to_owned(),
            (Color::Rgb(Rgb { r, g, b }), false) => format!("\x1b[38;2;{r};{g};{b}m"),
            (Color::Rgb(Rgb { r, g, b }), true) => format!("\x1b[48;2;{r};{g};{b}m"),
        };
        self.push_str(&seq);
    }
}

impl TerminalSink for AnsiSink {
    fn apply(&mut self, op: TermOp) {
        match op {
            TermOp::Write(text) => self.push_text(&text),
            TermOp::MoveTo { x, y } => self.push_str(&format!("\x1b[{};{}H", y + 1, x + 1)),
            TermOp::Home => self.push_str("\x1b[H"),
            TermOp::ClearLine(kind) => self.push_str(match kind {
                ClearKind::All => "\x1b[2K",
                ClearKind::ToEnd => "\x1b[0K",
                ClearKind::ToStart => "\x1b[1K",
            }),
            TermOp::ClearScreen(kind) => self.push_str(match kind {
                ClearKind::All => "\x1b[2J",
                ClearKind::ToEnd => "\x1b[0J",
                ClearKind::ToStart => "\x1b[1J",
            }),
            TermOp::SetForeground(color) => self.push_color(color, false),
            TermOp::SetBackground(color) => self.push_color(color, true),
            TermOp::Reset => self.push_str("\x1b[0m"),
            TermOp::ShowCursor => self.push_str("\x1b[?25h"),
            TermOp::HideCursor => self.push_str("\x1b[?25l"),
            TermOp::SetCursorShape(shape) => self.push_str(match shape {
                CursorShape::Block => "\x1b[2 q",
                CursorShape::Underline => "\x1b[4 q",
                CursorShape::Bar => "\x1b[6 q",
            }),
            TermOp::BeginAtomic => {
                self.atomic_depth += 1;
                if self.atomic_depth == 1 {
                    self.push_str("\x1b[?2026h");
                }
            },
            TermOp::EndAtomic => {
                if self.atomic_depth == 1 {
                    self.push_str("\x1b[?2026l");
                }
                self.atomic_depth = self.atomic_depth.saturating_sub(1);
            },
            TermOp::AlternateScreen(on) => {
                self.push_str(if on { "\x1b[?1049h" } else { "\x1b[?1049l" });
            },
            TermOp::BracketedPaste(on) => {
                self.push_str(if on { "\x1b[?2004h" } else { "\x1b[?2004l" });
            },
        }
    }
}

/// Operations that put a fresh connection into editor mode.
pub fn session_enter_ops() -> [TermOp; 4] {
    [
        TermOp::AlternateScreen(true),
        TermOp::BracketedPaste(true),
        TermOp::ClearScreen(ClearKind::All),
        TermOp::Home,
    ]
}

/// Operations that hand the terminal back in its original state.
pub fn session_leave_ops() -> [TermOp; 5] {
    [
        TermOp::Reset,
        TermOp::SetCursorShape(CursorShape::Block),
        TermOp::ShowCursor,
        TermOp::BracketedPaste(false),
        TermOp::AlternateScreen(false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(ops: impl IntoIterator<Item = TermOp>) -> Vec<u8> {
        let mut sink = AnsiSink::new();
        for op in ops {
            sink.apply(op);
        }
        sink.take().to_vec()
    }

    #[test]
    fn newlines_become_crlf() {
        assert_eq!(encode([TermOp::Write("a\nb\r\nc".into())]), b"a\r\nb\r\nc");
    }

    #[test]
    fn move_is_one_based() {
        assert_eq!(encode([TermOp::MoveTo { x: 0, y: 0 }]), b"\x1b[1;1H");
        assert_eq!(encode([TermOp::MoveTo { x: 9, y: 4 }]), b"\x1b[5;10H");
    }

    #[test]
    fn rgb_colours() {
        let c = Color::Rgb(Rgb::new(1, 2, 3));
        assert_eq!(encode([TermOp::SetForeground(c)]), b"\x1b[38;2;1;2;3m");
        assert_eq!(encode([TermOp::SetBackground(c)]), b"\x1b[48;2;1;2;3m");
    }

    #[test]
    fn nested_atomic_regions_emit_one_bracket() {
        let bytes = encode([
            TermOp::BeginAtomic,
            TermOp::BeginAtomic,
            TermOp::Write("x".into()),
            TermOp::EndAtomic,
            TermOp::EndAtomic,
        ]);
        assert_eq!(bytes, b"\x1b[?2026hx\x1b[?2026l");
    }

    #[test]
    fn unbalanced_end_is_harmless() {
        let mut sink = AnsiSink::new();
        sink.apply(TermOp::EndAtomic);
        assert!(!sink.in_atomic());
        assert_eq!(sink.pending(), 0);
    }

    #[test]
    fn take_drains() {
        let mut sink = AnsiSink::new();
        sink.write("hi");
        assert_eq!(sink.take().as_ref(), b"hi");
        assert!(sink.take().is_empty());
    }

    #[test]
    fn recording_sink_keeps_ops() {
        let mut ops: Vec<TermOp> = Vec::new();
        ops.move_to(1, 2);
        ops.apply(TermOp::Reset);
        assert_eq!(ops, vec![TermOp::MoveTo { x: 1, y: 2 }, TermOp::Reset]);
    }
}
