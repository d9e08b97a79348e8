//! Editing modes.

use std::fmt;

/// Modal-editing state gating how keystrokes are interpreted.
///
/// The pending modes are one-shot: the next key is consumed and the editor
/// returns to [`Mode::Normal`] unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Motions and commands.
    #[default]
    Normal,
    /// Typed characters are inserted.
    Insert,
    /// One-shot: the next character overwrites the one under the cursor.
    Replace,
    /// One-shot after `d`: `w` deletes a word, `d` a line.
    DeletePending,
    /// One-shot after `z`: `t`, `z`, `b` reposition the viewport.
    ScrollPending,
    /// One-shot after `g`: `g` jumps to the first line.
    NavPending,
    /// Reserved, not reachable yet.
    Visual,
    /// Reserved, not reachable yet.
    VisualLine,
}

impl Mode {
    /// Status-bar label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Replace => "REPLACE",
            Self::DeletePending => "DELETE",
            Self::ScrollPending => "SCROLL",
            Self::NavPending => "NAV",
            Self::Visual => "VISUAL",
            Self::VisualLine => "VISUAL-LINE",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
