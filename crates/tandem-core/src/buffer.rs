//! Shared text buffer.
//!
//! All offsets are char (Unicode scalar) indices. Lines are delimited by
//! `\n` only, so a buffer with `n` newlines always has `n + 1` lines and the
//! empty buffer has one empty line.

use std::{fmt, ops::Range};

use ropey::Rope;

/// The document text, backed by a rope.
#[derive(Debug, Clone, Default)]
pub struct Document {
    rope: Rope,
}

impl Document {
    /// Create a document holding `text`.
    pub fn new(text: &str) -> Self {
        Self { rope: Rope::from_str(text) }
    }

    /// Length in chars.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// `true` if the document has no text.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Number of lines (newline count plus one).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Character at `idx`. `None` past the end.
    pub fn char_at(&self, idx: usize) -> Option<char> {
        (idx < self.len_chars()).then(|| self.rope.char(idx))
    }

    /// Line containing `idx` (clamped to the buffer).
    pub fn line_of(&self, idx: usize) -> usize {
        self.rope.char_to_line(idx.min(self.len_chars()))
    }

    /// First char index of `line`. Past the last line this is the end of the
    /// buffer.
    pub fn line_start(&self, line: usize) -> usize {
        if line >= self.line_count() {
            return self.len_chars();
        }
        self.rope.line_to_char(line)
    }

    /// Length of `line` in chars, excluding its newline. `0` past the end.
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.line_count() {
            return 0;
        }
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' { len - 1 } else { len }
    }

    /// Text of `line` without its newline. `None` past the end.
    pub fn line(&self, line: usize) -> Option<String> {
        if line >= self.line_count() {
            return None;
        }
        let start = self.rope.line_to_char(line);
        Some(self.rope.slice(start..start + self.line_len(line)).to_string())
    }

    /// All lines, without newlines.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.line_count()).filter_map(|line| self.line(line))
    }

    /// Text in `range` (clamped).
    pub fn slice(&self, range: Range<usize>) -> String {
        let end = range.end.min(self.len_chars());
        let start = range.start.min(end);
        self.rope.slice(start..end).to_string()
    }

    /// Chars from `idx` forwards.
    pub fn chars_from(&self, idx: usize) -> impl Iterator<Item = char> + '_ {
        self.rope.chars_at(idx.min(self.len_chars()))
    }

    /// Chars before `idx`, nearest first.
    pub fn chars_before(&self, idx: usize) -> impl Iterator<Item = char> + '_ {
        let mut chars = self.rope.chars_at(idx.min(self.len_chars()));
        std::iter::from_fn(move || chars.prev())
    }

    /// Insert `text` at `idx` (clamped to the end).
    pub fn insert(&mut self, idx: usize, text: &str) {
        let idx = idx.min(self.len_chars());
        self.rope.insert(idx, text);
    }

    /// Remove the chars in `range` (clamped). Empty ranges are ignored.
    pub fn remove(&mut self, range: Range<usize>) {
        let end = range.end.min(self.len_chars());
        let start = range.start.min(end);
        if start < end {
            self.rope.remove(start..end);
        }
    }

    /// Replace the whole text.
    pub fn replace_all(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
