//! Modal editor state machine.
//!
//! One [`Editor`] per session. It owns a copy of the document text, the
//! cursor, the clipboard register and the viewport. Keystrokes arrive through
//! [`Editor::on_key`]; text edited by other sessions arrives through
//! [`Editor::set_text`].
//!
//! # Invariants
//!
//! After every public mutation:
//! - `cursor <= document.len_chars()`
//! - `scroll_offset <= line_count - 1`
//! - the cursor's line is inside the visible text rows

use tandem_keys::{Key, KeyStroke};
use tracing::debug;

use crate::{
    Document, MarkerId, Mode, RemoteCursorMarker,
    cursor::{self, END_OF_LINE},
};

/// Terminal size in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Viewport {
    /// Columns.
    pub width: usize,
    /// Rows, including the status bar.
    pub height: usize,
}

impl Viewport {
    /// Create a viewport.
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Rows available for text (everything but the status bar).
    pub fn text_rows(self) -> usize {
        self.height.saturating_sub(1).max(1)
    }

    /// Width clamped to at least one column.
    pub fn columns(self) -> usize {
        self.width.max(1)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

/// What a keystroke did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    /// The document text changed.
    pub text_changed: bool,
}

/// Per-session modal editing state.
#[derive(Debug, Clone)]
pub struct Editor {
    doc: Document,
    cursor: usize,
    mode: Mode,
    register: String,
    remembered_column: Option<usize>,
    viewport: Viewport,
    scroll_offset: usize,
    horizontal_scroll: usize,
    wrap: bool,
    own_cursor: RemoteCursorMarker,
    remote_cursors: Vec<MarkerId>,
    text_changed: bool,
}

impl Editor {
    /// Create an editor over `text` with the cursor at the start.
    pub fn new(text: &str, own_cursor: RemoteCursorMarker, viewport: Viewport) -> Self {
        Self {
            doc: Document::new(text),
            cursor: 0,
            mode: Mode::Normal,
            register: String::new(),
            remembered_column: None,
            viewport,
            scroll_offset: 0,
            horizontal_scroll: 0,
            wrap: false,
            own_cursor,
            remote_cursors: Vec::new(),
            text_changed: false,
        }
    }

    /// Document text.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Cursor offset in chars.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Clipboard register.
    pub fn register(&self) -> &str {
        &self.register
    }

    /// Column remembered across vertical motions.
    pub fn remembered_column(&self) -> Option<usize> {
        self.remembered_column
    }

    /// Terminal size.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// First visible line.
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// First visible column in non-wrap mode.
    pub fn horizontal_scroll(&self) -> usize {
        self.horizontal_scroll
    }

    /// Line wrapping enabled.
    pub fn wrap(&self) -> bool {
        self.wrap
    }

    /// This session's own marker.
    pub fn own_cursor(&self) -> &RemoteCursorMarker {
        &self.own_cursor
    }

    /// Owners of the foreign markers this editor renders, in arrival order.
    pub fn remote_cursors(&self) -> &[MarkerId] {
        &self.remote_cursors
    }

    /// Move the cursor to `offset` (clamped).
    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset;
        self.remembered_column = None;
        self.check_cursor_valid();
    }

    /// Replace the viewport and re-validate scrolling.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.check_cursor_valid();
    }

    /// Flip line wrapping. Horizontal scroll resets.
    pub fn toggle_wrap(&mut self) {
        self.wrap = !self.wrap;
        self.horizontal_scroll = 0;
        debug!(wrap = self.wrap, "toggled line wrap");
        self.check_cursor_valid();
    }

    /// Start rendering the marker owned by `owner`. Own marker and
    /// duplicates are ignored.
    pub fn add_remote_cursor(&mut self, owner: MarkerId) {
        if owner != self.own_cursor.owner && !self.remote_cursors.contains(&owner) {
            self.remote_cursors.push(owner);
        }
    }

    /// Forget all foreign markers.
    pub fn clear_remote_cursors(&mut self) {
        self.remote_cursors.clear();
    }

    /// Copy the cursor offset into the own marker.
    pub fn sync_own_cursor(&mut self) {
        self.own_cursor.position = self.cursor;
    }

    pub(crate) fn set_horizontal_scroll(&mut self, column: usize) {
        self.horizontal_scroll = column;
    }

    /// Replace the text with a version edited elsewhere.
    ///
    /// The cursor follows the edit with a prefix/suffix heuristic: the
    /// common prefix and suffix of old and new text bound the edited region,
    /// and a cursor strictly after the prefix shifts by the region's change
    /// in length. A cursor inside the region stays where it is. This is a
    /// best-effort follow for one remote edit at a time, not a merge.
    ///
    /// Returns `false` if the text was already identical.
    pub fn set_text(&mut self, text: &str) -> bool {
        let old: Vec<char> = self.doc.to_string().chars().collect();
        let new: Vec<char> = text.chars().collect();
        if old == new {
            return false;
        }

        let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
        let max_suffix = old.len().min(new.len()) - prefix;
        let suffix = old
            .iter()
            .rev()
            .zip(new.iter().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();

        let old_region = old.len() - prefix - suffix;
        let new_region = new.len() - prefix - suffix;

        if prefix < self.cursor {
            self.cursor = (self.cursor + new_region).saturating_sub(old_region);
        }

        self.doc.replace_all(text);
        self.check_cursor_valid();
        true
    }

    /// Feed one keystroke through the state machine.
    pub fn on_key(&mut self, key: &KeyStroke) -> KeyOutcome {
        self.text_changed = false;
        let before = self.mode;

        match self.mode {
            Mode::Normal => self.normal_key(key),
            Mode::Insert => self.insert_key(key),
            Mode::Replace => self.replace_key(key),
            Mode::DeletePending => self.delete_key(key),
            Mode::ScrollPending => self.scroll_key(key),
            Mode::NavPending => self.nav_key(key),
            Mode::Visual | Mode::VisualLine => {
                if key.is_plain(Key::Escape) {
                    self.mode = Mode::Normal;
                }
            },
        }

        if self.mode != before {
            debug!(owner = self.own_cursor.owner, from = %before, to = %self.mode, "mode change");
        }

        self.check_cursor_valid();
        KeyOutcome { text_changed: self.text_changed }
    }

    fn normal_key(&mut self, key: &KeyStroke) {
        if key.is_alt() && !key.is_ctrl() && key.key() == Key::Char('w') {
            self.toggle_wrap();
            return;
        }

        match key.printable() {
            Some('i') => self.mode = Mode::Insert,
            Some('r') => self.mode = Mode::Replace,
            Some('d') => self.mode = Mode::DeletePending,
            Some('g') => self.mode = Mode::NavPending,
            Some('z') => self.mode = Mode::ScrollPending,
            Some('h') => self.move_horizontal(-1),
            Some('l') => self.move_horizontal(1),
            Some('j') => self.move_vertical(1),
            Some('k') => self.move_vertical(-1),
            Some('x') => self.delete_under_cursor(),
            Some('w') => self.word_forward(),
            Some('b') => self.word_backward(),
            Some('$') => {
                self.cursor += cursor::forward_line_len(&self.doc, self.cursor);
                self.remembered_column = Some(END_OF_LINE);
            },
            Some('^') => self.line_start(),
            Some('p') => self.paste(),
            Some('G') => self.jump_to_line(self.doc.line_count() - 1),
            _ if key.is_plain(Key::Backspace) => self.move_horizontal(-1),
            _ => self.common_move(key),
        }
    }

    fn insert_key(&mut self, key: &KeyStroke) {
        if let Some(c) = key.printable() {
            let mut utf8 = [0u8; 4];
            self.insert_at_cursor(c.encode_utf8(&mut utf8));
            return;
        }

        match key.key() {
            Key::Paste => {
                let text = key.pasted_text().unwrap_or_default().replace("\r\n", "\n").replace('\r', "\n");
                self.insert_at_cursor(&text);
            },
            Key::Escape => self.mode = Mode::Normal,
            Key::Backspace => self.delete_before_cursor(),
            Key::Char('h') if key.is_ctrl() && !key.is_alt() => self.delete_before_cursor(),
            Key::Delete => self.remove(self.cursor..self.cursor + 1),
            Key::Return => self.insert_at_cursor("\n"),
            Key::Tab => {},
            _ => self.common_move(key),
        }
    }

    fn replace_key(&mut self, key: &KeyStroke) {
        if let Some(c) = key.printable() {
            let mut utf8 = [0u8; 4];
            let text = c.encode_utf8(&mut utf8);
            self.remove(self.cursor..self.cursor + 1);
            self.insert(self.cursor, text);
        }
        self.mode = Mode::Normal;
    }

    fn delete_key(&mut self, key: &KeyStroke) {
        match key.printable() {
            Some('w') => {
                let len = cursor::forward_word_len(&self.doc, self.cursor);
                if len > 0 {
                    let span = self.cursor..self.cursor + len;
                    self.register = self.doc.slice(span.clone());
                    self.remove(span);
                }
            },
            Some('d') => self.delete_line(),
            _ => {},
        }
        self.remembered_column = None;
        self.mode = Mode::Normal;
    }

    fn scroll_key(&mut self, key: &KeyStroke) {
        let line = self.doc.line_of(self.cursor);
        let rows = self.viewport.text_rows();
        match key.printable() {
            Some('t') => self.scroll_offset = line,
            Some('z') => self.scroll_offset = line.saturating_sub(rows / 2),
            Some('b') => self.scroll_offset = (line + 1).saturating_sub(rows),
            _ => {},
        }
        self.mode = Mode::Normal;
    }

    fn nav_key(&mut self, key: &KeyStroke) {
        if key.printable() == Some('g') {
            self.jump_to_line(0);
        }
        self.mode = Mode::Normal;
    }

    fn common_move(&mut self, key: &KeyStroke) {
        if key.is_alt() {
            return;
        }
        match (key.key(), key.is_ctrl()) {
            (Key::Left, true) => self.word_backward(),
            (Key::Right, true) => self.word_forward(),
            (Key::Left, false) => self.move_horizontal(-1),
            (Key::Right, false) => self.move_horizontal(1),
            (Key::Up, false) => self.move_vertical(-1),
            (Key::Down, false) => self.move_vertical(1),
            (Key::Home, false) => self.line_start(),
            (Key::End, false) => {
                self.cursor += cursor::forward_line_len(&self.doc, self.cursor);
                self.remembered_column = None;
            },
            _ => {},
        }
    }

    fn move_horizontal(&mut self, delta: isize) {
        self.cursor = self.cursor.saturating_add_signed(delta).min(self.doc.len_chars());
        self.remembered_column = None;
    }

    fn move_vertical(&mut self, delta: isize) {
        if let Some(mv) = cursor::vertical_move(&self.doc, self.cursor, delta, self.remembered_column) {
            self.cursor = mv.cursor;
            self.remembered_column = mv.remembered;
        }
    }

    fn word_forward(&mut self) {
        self.cursor += cursor::forward_word_len(&self.doc, self.cursor);
        self.remembered_column = None;
    }

    fn word_backward(&mut self) {
        self.cursor -= cursor::backward_word_len(&self.doc, self.cursor);
        self.remembered_column = None;
    }

    fn line_start(&mut self) {
        self.cursor -= cursor::backward_line_len(&self.doc, self.cursor);
        self.remembered_column = None;
    }

    fn jump_to_line(&mut self, line: usize) {
        self.cursor = self.doc.line_start(line);
        self.remembered_column = None;
    }

    fn delete_under_cursor(&mut self) {
        let len = self.doc.len_chars();
        let Some(under) = self.doc.char_at(self.cursor) else {
            return;
        };
        let last_on_line =
            under == '\n' || self.cursor + 1 >= len || self.doc.char_at(self.cursor + 1) == Some('\n');

        self.remove(self.cursor..self.cursor + 1);
        if last_on_line {
            self.cursor = self.cursor.saturating_sub(1);
        }
        self.remembered_column = None;
    }

    fn delete_before_cursor(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.remove(self.cursor - 1..self.cursor);
        self.cursor -= 1;
    }

    fn delete_line(&mut self) {
        let line = self.doc.line_of(self.cursor);
        let text = self.doc.line(line).unwrap_or_default();
        self.register = format!("{}\n", text.trim());
        self.remove(cursor::line_span(&self.doc, line));
    }

    fn paste(&mut self) {
        if self.register.is_empty() {
            return;
        }

        if self.register.contains('\n') {
            let line = self.doc.line_of(self.cursor);
            let end = self.doc.line_start(line) + self.doc.line_len(line);
            let text = format!("\n{}", self.register.trim_end());
            self.insert(end, &text);
            self.cursor = end + 1;
        } else {
            let at = (self.cursor + 1).min(self.doc.len_chars());
            let text = self.register.clone();
            self.insert(at, &text);
            self.cursor += text.chars().count();
        }
        self.remembered_column = None;
    }

    fn insert_at_cursor(&mut self, text: &str) {
        self.insert(self.cursor, text);
        self.cursor += text.chars().count();
        self.remembered_column = None;
    }

    fn insert(&mut self, at: usize, text: &str) {
        if !text.is_empty() {
            self.doc.insert(at, text);
            self.text_changed = true;
        }
    }

    fn remove(&mut self, range: std::ops::Range<usize>) {
        let before = self.doc.len_chars();
        self.doc.remove(range);
        if self.doc.len_chars() != before {
            self.text_changed = true;
        }
    }

    /// Clamp the cursor and bring its line into the visible rows.
    pub fn check_cursor_valid(&mut self) {
        self.cursor = self.cursor.min(self.doc.len_chars());

        let last_line = self.doc.line_count() - 1;
        self.scroll_offset = self.scroll_offset.min(last_line);

        let pos = cursor::line_and_column(&self.doc, self.cursor);
        let rows = self.viewport.text_rows();

        if pos.line < self.scroll_offset {
            self.scroll_offset = pos.line;
        }

        if self.wrap {
            let width = self.viewport.columns();
            let mut used: usize = (self.scroll_offset..pos.line)
                .map(|line| self.doc.line_len(line) / width + 1)
                .sum::<usize>()
                + pos.column / width
                + 1;
            while used > rows && self.scroll_offset < pos.line {
                used -= self.doc.line_len(self.scroll_offset) / width + 1;
                self.scroll_offset += 1;
            }
        } else if pos.line >= self.scroll_offset + rows {
            self.scroll_offset = pos.line + 1 - rows;
        }
    }
}
