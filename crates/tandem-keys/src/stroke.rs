//! Keystroke value types.

use std::{borrow::Cow, fmt};

use bytes::Bytes;

/// Identity of a decoded key.
///
/// Ctrl and alt are carried on [`KeyStroke`], not here: `ctrl+c` is
/// `Key::Char('c')` with [`KeyStroke::is_ctrl`] set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key (printable, or a literal fallback).
    Char(char),
    /// Enter/Return (carriage return).
    Return,
    /// Horizontal tab.
    Tab,
    /// Escape.
    Escape,
    /// Backspace (DEL, 0x7f).
    Backspace,
    /// Forward delete.
    Delete,
    /// Insert.
    Insert,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Shift+Tab.
    BackTab,
    /// Function key `F1..=F12`.
    F(u8),
    /// A bracketed paste burst. The text is on [`KeyStroke::pasted_text`].
    Paste,
    /// A control code with no name, rendered as `char(<code>)`.
    Unknown(u8),
}

impl Key {
    /// Canonical key name (`"a"`, `"left"`, `"escape"`, `"paste"`, ...).
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            Self::Char(c) => Cow::Owned(c.to_string()),
            Self::Return => Cow::Borrowed("return"),
            Self::Tab => Cow::Borrowed("tab"),
            Self::Escape => Cow::Borrowed("escape"),
            Self::Backspace => Cow::Borrowed("backspace"),
            Self::Delete => Cow::Borrowed("delete"),
            Self::Insert => Cow::Borrowed("insert"),
            Self::Up => Cow::Borrowed("up"),
            Self::Down => Cow::Borrowed("down"),
            Self::Left => Cow::Borrowed("left"),
            Self::Right => Cow::Borrowed("right"),
            Self::Home => Cow::Borrowed("home"),
            Self::End => Cow::Borrowed("end"),
            Self::PageUp => Cow::Borrowed("pageup"),
            Self::PageDown => Cow::Borrowed("pagedown"),
            Self::BackTab => Cow::Borrowed("shift+tab"),
            Self::F(n) => Cow::Owned(format!("f{n}")),
            Self::Paste => Cow::Borrowed("paste"),
            Self::Unknown(code) => Cow::Owned(format!("char({code})")),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// One decoded keystroke.
///
/// Produced once per input chunk and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStroke {
    key: Key,
    ctrl: bool,
    alt: bool,
    raw: Bytes,
    pasted_text: Option<String>,
}

impl KeyStroke {
    /// Unmodified stroke with no raw bytes attached.
    pub fn new(key: Key) -> Self {
        Self { key, ctrl: false, alt: false, raw: Bytes::new(), pasted_text: None }
    }

    /// Paste stroke carrying `text`.
    pub fn paste(text: impl Into<String>) -> Self {
        Self { pasted_text: Some(text.into()), ..Self::new(Key::Paste) }
    }

    /// Same stroke with the ctrl modifier set.
    #[must_use]
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    /// Same stroke with the alt modifier set.
    #[must_use]
    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Same stroke with `raw` attached as the source bytes.
    #[must_use]
    pub fn with_raw(mut self, raw: Bytes) -> Self {
        self.raw = raw;
        self
    }

    /// Decoded key.
    pub fn key(&self) -> Key {
        self.key
    }

    /// Ctrl was held.
    pub fn is_ctrl(&self) -> bool {
        self.ctrl
    }

    /// Alt was held (ESC-prefixed input).
    pub fn is_alt(&self) -> bool {
        self.alt
    }

    /// Bytes this stroke was decoded from.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Pasted text. `Some` only when the key is [`Key::Paste`].
    pub fn pasted_text(&self) -> Option<&str> {
        self.pasted_text.as_deref()
    }

    /// The character this stroke types, if it is a plain printable key.
    ///
    /// `None` for named keys, modified keys and control characters.
    pub fn printable(&self) -> Option<char> {
        match self.key {
            Key::Char(c) if !self.ctrl && !self.alt && !c.is_control() => Some(c),
            _ => None,
        }
    }

    /// `true` if this is an unmodified stroke of `key`.
    pub fn is_plain(&self, key: Key) -> bool {
        self.key == key && !self.ctrl && !self.alt
    }
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("ctrl+")?;
        }
        if self.alt {
            f.write_str("alt+")?;
        }
        f.write_str(&self.key.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_modifiers() {
        assert_eq!(KeyStroke::new(Key::Char('c')).with_ctrl().to_string(), "ctrl+c");
        assert_eq!(KeyStroke::new(Key::Char('w')).with_alt().to_string(), "alt+w");
        assert_eq!(KeyStroke::new(Key::Left).with_ctrl().with_alt().to_string(), "ctrl+alt+left");
        assert_eq!(KeyStroke::new(Key::Unknown(28)).to_string(), "char(28)");
    }

    #[test]
    fn printable_rejects_modifiers_and_controls() {
        assert_eq!(KeyStroke::new(Key::Char('a')).printable(), Some('a'));
        assert_eq!(KeyStroke::new(Key::Char('a')).with_ctrl().printable(), None);
        assert_eq!(KeyStroke::new(Key::Char('a')).with_alt().printable(), None);
        assert_eq!(KeyStroke::new(Key::Char('\u{1b}')).printable(), None);
        assert_eq!(KeyStroke::new(Key::Return).printable(), None);
    }

    #[test]
    fn paste_carries_text() {
        let stroke = KeyStroke::paste("hello");
        assert_eq!(stroke.key(), Key::Paste);
        assert_eq!(stroke.pasted_text(), Some("hello"));
        assert_eq!(KeyStroke::new(Key::Paste).pasted_text(), None);
    }
}
