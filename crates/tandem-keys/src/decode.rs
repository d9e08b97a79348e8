//! Byte chunk to keystroke decoding.

use bytes::Bytes;

use crate::{
    Key, KeyStroke,
    tables::{self, Control},
};

/// Escape byte (`0x1b`).
pub const ESC: u8 = 0x1b;

/// Bracketed paste opener, without the leading `ESC`.
const PASTE_START: &[u8] = b"[200~";

/// Bracketed paste terminator, including the leading `ESC`.
const PASTE_END: &[u8] = b"\x1b[201~";

/// Decode one input chunk into one keystroke.
///
/// Never fails. Unrecognised sequences degrade to a literal character:
/// the whole chunk if it is exactly one UTF-8 character, otherwise its first
/// byte. An empty chunk decodes to `char(0)`.
pub fn decode(bytes: &[u8]) -> KeyStroke {
    let raw = Bytes::copy_from_slice(bytes);

    let stroke = match bytes {
        [] => KeyStroke::new(Key::Unknown(0)),
        [code] if *code < 32 || *code == 127 => decode_control(*code),
        [code] => KeyStroke::new(Key::Char(char::from(*code))),
        [ESC, code] => {
            let c = tables::symbol(*code).unwrap_or_else(|| char::from(*code));
            KeyStroke::new(Key::Char(c)).with_alt()
        },
        [ESC, rest @ ..] => decode_escape(rest).unwrap_or_else(|| decode_literal(bytes)),
        _ => decode_literal(bytes),
    };

    stroke.with_raw(raw)
}

fn decode_control(code: u8) -> KeyStroke {
    match tables::control(code) {
        Some(Control::Ctrl(c)) => KeyStroke::new(Key::Char(c)).with_ctrl(),
        Some(Control::Named(key)) => KeyStroke::new(key),
        None => match tables::symbol(code) {
            Some(c) => KeyStroke::new(Key::Char(c)),
            None => KeyStroke::new(Key::Unknown(code)),
        },
    }
}

/// Decode the bytes following a leading `ESC` (at least two of them).
fn decode_escape(rest: &[u8]) -> Option<KeyStroke> {
    if let Some(body) = rest.strip_prefix(PASTE_START) {
        let body = body.strip_suffix(PASTE_END).unwrap_or(body);
        return Some(KeyStroke::paste(String::from_utf8_lossy(body)));
    }

    let first = rest.first().copied();
    let last = rest.last().copied();
    let is_ss3 = first == Some(b'O');
    let is_csi_tilde = first == Some(b'[') && matches!(last, Some(b'~' | b'Z'));
    if is_ss3 || is_csi_tilde {
        if let Some(key) = tables::function_key(rest) {
            return Some(KeyStroke::new(key));
        }
    }

    if first == Some(b'[') {
        if let Some(key) = rest.get(1).copied().and_then(tables::csi_direction) {
            return Some(KeyStroke::new(key));
        }
        if let Some(key) = tables::ctrl_arrow(rest) {
            return Some(KeyStroke::new(key).with_ctrl());
        }
    }

    None
}

/// Literal fallback: one UTF-8 character, else the first byte.
fn decode_literal(bytes: &[u8]) -> KeyStroke {
    if let Ok(text) = std::str::from_utf8(bytes) {
        let mut chars = text.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return KeyStroke::new(Key::Char(c));
        }
    }

    let first = bytes.first().copied().unwrap_or_default();
    KeyStroke::new(Key::Char(char::from(first)))
}
