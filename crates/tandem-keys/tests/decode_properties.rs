//! Property-based tests for keystroke decoding.
//!
//! Terminal input is untrusted and noisy. These tests verify the decoder is
//! total (never panics) and that its output is always anchored to the input
//! bytes.

use insta::assert_snapshot;
use proptest::prelude::*;
use tandem_keys::{Key, decode};

proptest! {
    #[test]
    fn prop_decode_is_total(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let stroke = decode(&bytes);
        prop_assert_eq!(stroke.raw().as_ref(), bytes.as_slice());
    }

    #[test]
    fn prop_single_printable_ascii_is_literal(code in 32u8..127) {
        let stroke = decode(&[code]);
        prop_assert_eq!(stroke.key(), Key::Char(char::from(code)));
        prop_assert!(!stroke.is_ctrl());
        prop_assert!(!stroke.is_alt());
    }

    #[test]
    fn prop_single_char_round_trips(c in any::<char>()) {
        let mut buf = [0u8; 4];
        let encoded = c.encode_utf8(&mut buf);
        let stroke = decode(encoded.as_bytes());

        // Control characters go through the control table instead.
        if !c.is_control() {
            prop_assert_eq!(stroke.key(), Key::Char(c));
        }
    }

    #[test]
    fn prop_paste_body_survives(body in "[a-zA-Z0-9 \\r\\n]{0,128}") {
        let mut bytes = b"\x1b[200~".to_vec();
        bytes.extend_from_slice(body.as_bytes());
        bytes.extend_from_slice(b"\x1b[201~");

        let stroke = decode(&bytes);
        prop_assert_eq!(stroke.key(), Key::Paste);
        prop_assert_eq!(stroke.pasted_text(), Some(body.as_str()));
    }

    #[test]
    fn prop_ctrl_letters(letter in b'a'..=b'z') {
        let code = letter - b'a' + 1;
        let stroke = decode(&[code]);
        match code {
            9 => prop_assert_eq!(stroke.key(), Key::Tab),
            13 => prop_assert_eq!(stroke.key(), Key::Return),
            _ => {
                prop_assert_eq!(stroke.key(), Key::Char(char::from(letter)));
                prop_assert!(stroke.is_ctrl());
            },
        }
    }
}

#[test]
fn decoded_names_for_common_sequences() {
    let inputs: [&[u8]; 14] = [
        &[3],
        b"\x1b[A",
        b"\x1b[B",
        b"\x1b[C",
        b"\x1b[D",
        b"\x1b[1;5C",
        b"\x1b[H",
        b"\x1b[4~",
        b"\x1b[6~",
        b"\x1bOQ",
        b"\x1b[21~",
        &[127],
        &[0x1b, b'x'],
        &[31],
    ];

    let names: Vec<String> = inputs.iter().map(|bytes| decode(bytes).to_string()).collect();

    assert_snapshot!(
        names.join(" "),
        @"ctrl+c up down right left ctrl+right home end pagedown f2 f10 backspace alt+x char(31)"
    );
}
