//! Fixed lookup tables for control codes, symbols and escape sequences.

use crate::Key;

/// Meaning of a single control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Control {
    /// `ctrl+<letter>`.
    Ctrl(char),
    /// A named key with no modifier.
    Named(Key),
}

/// Control byte (`< 32` or `127`) lookup.
///
/// `0` and `28..=31` have no entry.
pub(crate) fn control(code: u8) -> Option<Control> {
    match code {
        9 => Some(Control::Named(Key::Tab)),
        13 => Some(Control::Named(Key::Return)),
        27 => Some(Control::Named(Key::Escape)),
        127 => Some(Control::Named(Key::Backspace)),
        1..=26 => Some(Control::Ctrl(char::from(b'a' + code - 1))),
        _ => None,
    }
}

/// Shifted/punctuation symbol for an ASCII code.
pub(crate) fn symbol(code: u8) -> Option<char> {
    match code {
        b'!' | b'@' | b'#' | b'$' | b'%' | b'^' | b'&' | b'*' | b'(' | b')' | b'_' | b'+'
        | b'{' | b'}' | b'|' | b':' | b'"' | b'<' | b'>' | b'?' | b'`' | b'~' | b'-' | b'='
        | b'[' | b']' | b'\\' | b';' | b'\'' | b',' | b'.' | b'/' => Some(char::from(code)),
        _ => None,
    }
}

/// Function and navigation keys, keyed by the bytes following `ESC`.
pub(crate) fn function_key(seq: &[u8]) -> Option<Key> {
    let key = match seq {
        b"OP" => Key::F(1),
        b"OQ" => Key::F(2),
        b"OR" => Key::F(3),
        b"OS" => Key::F(4),
        b"[15~" => Key::F(5),
        b"[17~" => Key::F(6),
        b"[18~" => Key::F(7),
        b"[19~" => Key::F(8),
        b"[20~" => Key::F(9),
        b"[21~" => Key::F(10),
        b"[23~" => Key::F(11),
        b"[24~" => Key::F(12),

        b"[3~" => Key::Delete,
        b"[2~" => Key::Insert,
        b"[5~" => Key::PageUp,
        b"[6~" => Key::PageDown,
        b"[1~" | b"[7~" | b"OH" => Key::Home,
        b"[4~" | b"[8~" | b"OF" => Key::End,
        b"[Z" => Key::BackTab,

        // Application cursor mode
        b"OA" => Key::Up,
        b"OB" => Key::Down,
        b"OC" => Key::Right,
        b"OD" => Key::Left,
        _ => return None,
    };
    Some(key)
}

/// Direction for the final byte of a CSI cursor sequence.
pub(crate) fn csi_direction(byte: u8) -> Option<Key> {
    match byte {
        b'A' => Some(Key::Up),
        b'B' => Some(Key::Down),
        b'C' => Some(Key::Right),
        b'D' => Some(Key::Left),
        b'H' => Some(Key::Home),
        b'F' => Some(Key::End),
        _ => None,
    }
}

/// `ESC [ 1 ; 5 <A|B|C|D>` (ctrl+arrow), keyed by the bytes following `ESC`.
pub(crate) fn ctrl_arrow(seq: &[u8]) -> Option<Key> {
    match seq {
        b"[1;5A" => Some(Key::Up),
        b"[1;5B" => Some(Key::Down),
        b"[1;5C" => Some(Key::Right),
        b"[1;5D" => Some(Key::Left),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_letters_cover_a_to_z() {
        assert_eq!(control(1), Some(Control::Ctrl('a')));
        assert_eq!(control(8), Some(Control::Ctrl('h')));
        assert_eq!(control(10), Some(Control::Ctrl('j')));
        assert_eq!(control(26), Some(Control::Ctrl('z')));
    }

    #[test]
    fn control_named_entries_take_precedence() {
        assert_eq!(control(9), Some(Control::Named(Key::Tab)));
        assert_eq!(control(13), Some(Control::Named(Key::Return)));
        assert_eq!(control(27), Some(Control::Named(Key::Escape)));
        assert_eq!(control(127), Some(Control::Named(Key::Backspace)));
    }

    #[test]
    fn control_gaps_have_no_entry() {
        for code in [0, 28, 29, 30, 31] {
            assert_eq!(control(code), None, "code {code}");
        }
    }

    #[test]
    fn symbols_exclude_letters_and_digits() {
        assert_eq!(symbol(b'$'), Some('$'));
        assert_eq!(symbol(b'\\'), Some('\\'));
        assert_eq!(symbol(b'a'), None);
        assert_eq!(symbol(b'7'), None);
        assert_eq!(symbol(b' '), None);
    }
}
