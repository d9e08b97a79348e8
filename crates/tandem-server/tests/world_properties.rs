//! Property-based tests for the shared world
//!
//! Random keystroke streams from several sessions must leave every editor
//! holding the canonical text, with cursors and marker lists in range.

use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use tandem_core::Viewport;
use tandem_server::{PumpReport, SessionId, World};

const SESSIONS: SessionId = 3;

fn world(text: &str) -> World {
    let mut world = World::new(text, 8, StdRng::seed_from_u64(3));
    for id in 1..=SESSIONS {
        world.connect(id, &format!("guest-{id}"), Viewport::new(30, 8)).unwrap();
    }
    world
}

fn keystroke() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::sample::select(vec!["i", "r", "x", "d", "w", "b", "j", "k", "h", "l", "p", "$", "^", "G", "g", "z"])
            .prop_map(|k| k.as_bytes().to_vec()),
        prop::sample::select(vec!["a", " ", "\r", "\x7f", "\x1b", "\x1b[A", "\x1b[B", "\x1b[C", "\x1b[D"])
            .prop_map(|k| k.as_bytes().to_vec()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: every session converges on the canonical text
    #[test]
    fn prop_sessions_share_one_text(
        steps in prop::collection::vec((1..=SESSIONS, keystroke()), 0..60)
    ) {
        let mut w = world("alpha beta\ngamma\n\ndelta");

        for (id, key) in &steps {
            w.key_input(*id, key).unwrap();
        }

        for id in 1..=SESSIONS {
            let editor = w.session(id).unwrap().editor();
            prop_assert_eq!(editor.document().to_string(), w.text());
            prop_assert!(editor.cursor() <= editor.document().len_chars());
            prop_assert_eq!(editor.remote_cursors().len(), (SESSIONS - 1) as usize);
        }
    }

    /// Property: a broadcast reaches every live session except the sender
    #[test]
    fn prop_edit_fans_out_to_all_others(sender in 1..=SESSIONS) {
        let mut w = world("text");
        w.key_input(sender, b"i").unwrap();

        let report = w.key_input(sender, b"a").unwrap();
        let others = (SESSIONS - 1) as usize;

        // One text update and one rerender per other session.
        prop_assert_eq!(report, PumpReport { delivered: 2 * others, failed: 0 });
    }
}

#[test]
fn failing_recipient_is_isolated() {
    let mut w = world("abc");
    w.disconnect(2).unwrap();

    w.key_input(1, b"i").unwrap();
    let report = w.key_input(1, b"z").unwrap();

    assert_eq!(report, PumpReport { delivered: 2, failed: 2 });
    assert_eq!(w.session(3).unwrap().editor().document().to_string(), "zabc");
    assert_eq!(w.session(2).unwrap().editor().document().to_string(), "abc");
}

#[test]
fn output_is_drained_once() {
    let mut w = world("abc");
    let first = w.drain_output();
    assert_eq!(first.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(w.drain_output().is_empty());
}
