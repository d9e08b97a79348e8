//! Buffer offset to screen cell mapping.

use crate::{Editor, cursor};

/// Zero-based screen cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenPos {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
}

/// Screen cell of `offset`, or `None` if it falls outside the text rows.
///
/// For the session's own cursor (`is_own`) in non-wrap mode the horizontal
/// scroll is adjusted first so the cursor column is on screen.
pub fn actual_xy(editor: &mut Editor, offset: usize, is_own: bool) -> Option<ScreenPos> {
    if is_own && !editor.wrap() {
        let column = cursor::line_and_column(editor.document(), offset).column;
        let width = editor.viewport().columns();
        let h = editor.horizontal_scroll();
        if column < h {
            editor.set_horizontal_scroll(column);
        } else if column >= h + width {
            editor.set_horizontal_scroll(column + 1 - width);
        }
    }
    screen_pos(editor, offset)
}

/// Screen cell of `offset` under the editor's current scroll state.
pub(crate) fn screen_pos(editor: &Editor, offset: usize) -> Option<ScreenPos> {
    let doc = editor.document();
    let pos = cursor::line_and_column(doc, offset);
    let viewport = editor.viewport();
    let width = viewport.columns();
    let scroll = editor.scroll_offset();

    if pos.line < scroll {
        return None;
    }

    let (x, y) = if editor.wrap() {
        let above: usize = (scroll..pos.line).map(|line| doc.line_len(line) / width + 1).sum();
        (pos.column % width, above + pos.column / width)
    } else {
        let h = editor.horizontal_scroll();
        if pos.column < h {
            return None;
        }
        (pos.column - h, pos.line - scroll)
    };

    (x < width && y < viewport.height.saturating_sub(1)).then_some(ScreenPos { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RemoteCursorMarker, Rgb, Viewport};

    fn editor(text: &str, width: usize, height: usize) -> Editor {
        Editor::new(text, RemoteCursorMarker::new(1, "me", Rgb::default()), Viewport::new(width, height))
    }

    #[test]
    fn plain_mapping() {
        let mut ed = editor("ab\ncde", 10, 5);
        assert_eq!(actual_xy(&mut ed, 4, false), Some(ScreenPos { x: 1, y: 1 }));
    }

    #[test]
    fn status_row_is_not_visible() {
        let mut ed = editor("a\nb\nc", 10, 3);
        assert_eq!(actual_xy(&mut ed, 2, false), Some(ScreenPos { x: 0, y: 1 }));
        assert_eq!(actual_xy(&mut ed, 4, false), None);
    }

    #[test]
    fn own_cursor_pulls_horizontal_scroll() {
        let line = "x".repeat(40);
        let mut ed = editor(&line, 20, 5);
        assert_eq!(actual_xy(&mut ed, 30, true), Some(ScreenPos { x: 19, y: 0 }));
        assert_eq!(ed.horizontal_scroll(), 11);

        assert_eq!(actual_xy(&mut ed, 5, false), None);
        assert_eq!(actual_xy(&mut ed, 5, true), Some(ScreenPos { x: 0, y: 0 }));
        assert_eq!(ed.horizontal_scroll(), 5);
    }

    #[test]
    fn wrapped_rows_accumulate() {
        let text = format!("{}\nab", "y".repeat(25));
        let mut ed = editor(&text, 10, 8);
        ed.toggle_wrap();
        assert_eq!(actual_xy(&mut ed, 23, true), Some(ScreenPos { x: 3, y: 2 }));
        assert_eq!(actual_xy(&mut ed, 27, true), Some(ScreenPos { x: 1, y: 3 }));
        assert_eq!(ed.horizontal_scroll(), 0);
    }

    #[test]
    fn lines_above_scroll_are_hidden() {
        let text: String = (0..10).map(|i| format!("{i}\n")).collect();
        let mut ed = editor(&text, 10, 4);
        ed.set_cursor(18);
        assert!(ed.scroll_offset() > 0);
        assert_eq!(actual_xy(&mut ed, 0, false), None);
    }
}
