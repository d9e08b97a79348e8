//! Property-based tests for the modal editor.
//!
//! Keystroke sequences are arbitrary; the editor must keep its cursor and
//! scroll window valid after every one of them.

use proptest::prelude::*;
use tandem_core::{Editor, Mode, RemoteCursorMarker, Rgb, Viewport, cursor};
use tandem_keys::{Key, KeyStroke};

fn editor(text: &str, viewport: Viewport) -> Editor {
    Editor::new(text, RemoteCursorMarker::new(1, "prop", Rgb::new(200, 10, 10)), viewport)
}

/// Generate keystrokes weighted towards commands the editor understands.
fn key_strategy() -> impl Strategy<Value = KeyStroke> {
    let letters = vec![
        'i', 'r', 'd', 'g', 'z', 'h', 'j', 'k', 'l', 'x', 'w', 'b', '$', '^', 'p', 'G', 't', 'a', ' ',
        ',', '_', 'é',
    ];
    let named = vec![
        Key::Escape,
        Key::Backspace,
        Key::Delete,
        Key::Return,
        Key::Tab,
        Key::Up,
        Key::Down,
        Key::Left,
        Key::Right,
        Key::Home,
        Key::End,
        Key::PageUp,
        Key::F(5),
    ];

    prop_oneof![
        6 => prop::sample::select(letters).prop_map(|c| KeyStroke::new(Key::Char(c))),
        3 => prop::sample::select(named).prop_map(KeyStroke::new),
        1 => prop::sample::select(vec![Key::Left, Key::Right]).prop_map(|k| KeyStroke::new(k).with_ctrl()),
        1 => Just(KeyStroke::new(Key::Char('w')).with_alt()),
        1 => Just(KeyStroke::new(Key::Char('h')).with_ctrl()),
        1 => "[a-z \r\n]{0,12}".prop_map(KeyStroke::paste),
    ]
}

fn viewport_strategy() -> impl Strategy<Value = Viewport> {
    (1usize..40, 1usize..12).prop_map(|(w, h)| Viewport::new(w, h))
}

fn text_strategy() -> impl Strategy<Value = String> {
    "[a-z_ ,.\n]{0,80}"
}

#[derive(PartialEq)]
enum Class {
    Word,
    Space,
    Punct,
}

fn class(c: char) -> Class {
    if c.is_alphanumeric() || c == '_' {
        Class::Word
    } else if c.is_whitespace() {
        Class::Space
    } else {
        Class::Punct
    }
}

proptest! {
    #[test]
    fn prop_cursor_and_scroll_stay_valid(
        text in text_strategy(),
        viewport in viewport_strategy(),
        keys in prop::collection::vec(key_strategy(), 0..80),
    ) {
        let mut ed = editor(&text, viewport);
        for key in &keys {
            ed.on_key(key);

            let doc = ed.document();
            prop_assert!(ed.cursor() <= doc.len_chars());
            prop_assert!(ed.scroll_offset() < doc.line_count());

            let line = doc.line_of(ed.cursor());
            prop_assert!(line >= ed.scroll_offset());
            if !ed.wrap() {
                prop_assert!(line < ed.scroll_offset() + viewport.text_rows());
            }
        }
    }

    #[test]
    fn prop_pending_modes_are_one_shot(
        text in text_strategy(),
        arm in prop::sample::select(vec!['r', 'd', 'z', 'g']),
        key in key_strategy(),
    ) {
        let mut ed = editor(&text, Viewport::default());
        ed.on_key(&KeyStroke::new(Key::Char(arm)));
        prop_assert_ne!(ed.mode(), Mode::Normal);

        ed.on_key(&key);
        prop_assert_eq!(ed.mode(), Mode::Normal);
    }

    #[test]
    fn prop_word_motion_round_trips_from_run_start(text in "[a-z_ ,.\n]{1,60}") {
        let doc = tandem_core::Document::new(&text);
        let chars: Vec<char> = text.chars().collect();

        for offset in 0..chars.len() {
            let at_run_start = offset == 0 || class(chars[offset - 1]) != class(chars[offset]);
            if !at_run_start {
                continue;
            }
            let forward = cursor::forward_word_len(&doc, offset);
            prop_assert!(forward > 0);
            prop_assert_eq!(cursor::backward_word_len(&doc, offset + forward), forward);
        }
    }

    #[test]
    fn prop_delete_line_then_paste_restores_trimmed_line(
        lines in prop::collection::vec("[a-z ]{0,10}", 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let text = lines.join("\n");
        let target = pick.index(lines.len());
        let mut ed = editor(&text, Viewport::default());
        ed.set_cursor(ed.document().line_start(target));

        ed.on_key(&KeyStroke::new(Key::Char('d')));
        ed.on_key(&KeyStroke::new(Key::Char('d')));
        let trimmed = lines[target].trim().to_owned();
        prop_assert_eq!(ed.register(), format!("{trimmed}\n"));

        let current = ed.document().line_of(ed.cursor());
        ed.on_key(&KeyStroke::new(Key::Char('p')));
        prop_assert_eq!(ed.document().line(current + 1), Some(trimmed));
        prop_assert_eq!(ed.cursor(), ed.document().line_start(current + 1));
    }

    #[test]
    fn prop_remote_insert_before_cursor_shifts_it(
        text in "[a-m]{1,40}",
        inserted in "[N-Z]{1,8}",
        cursor_seed in any::<prop::sample::Index>(),
        at_seed in any::<prop::sample::Index>(),
    ) {
        let len = text.chars().count();
        let cursor = 1 + cursor_seed.index(len);
        let at = at_seed.index(cursor);

        let mut ed = editor(&text, Viewport::default());
        ed.set_cursor(cursor);

        let mut updated: String = text.chars().take(at).collect();
        updated.push_str(&inserted);
        updated.extend(text.chars().skip(at));

        prop_assert!(ed.set_text(&updated));
        prop_assert_eq!(ed.cursor(), cursor + inserted.chars().count());
        prop_assert_eq!(ed.document().to_string(), updated);
    }

    #[test]
    fn prop_remote_edit_after_cursor_leaves_it(
        text in "[a-m]{1,40}",
        inserted in "[N-Z]{1,8}",
        cursor_seed in any::<prop::sample::Index>(),
    ) {
        let len = text.chars().count();
        let cursor = cursor_seed.index(len);

        let mut ed = editor(&text, Viewport::default());
        ed.set_cursor(cursor);

        let mut updated = text.clone();
        updated.push_str(&inserted);
        ed.set_text(&updated);
        prop_assert_eq!(ed.cursor(), cursor);
    }
}

#[test]
fn text_update_follows_two_char_insert() {
    let mut ed = editor("hello world", Viewport::default());
    ed.set_cursor(6);
    ed.set_text("hello, world");
    assert_eq!(ed.cursor(), 7);

    let mut ed = editor("hello world", Viewport::default());
    ed.set_cursor(6);
    ed.set_text("hello,, world");
    assert_eq!(ed.cursor(), 8);
}
