//! Cursor arithmetic over a [`Document`].
//!
//! Pure functions of `(document, offset)`: line/column resolution, word and
//! line extents, and vertical motion with a remembered ("sticky") column.

use crate::Document;

/// Remembered column meaning "end of whatever line we land on".
pub const END_OF_LINE: usize = usize::MAX;

/// Zero-based line and column of an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Line index.
    pub line: usize,
    /// Chars from the start of the line.
    pub column: usize,
}

/// Result of a vertical motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalMove {
    /// New cursor offset.
    pub cursor: usize,
    /// Column to remember for the next vertical motion.
    pub remembered: Option<usize>,
}

/// Character classes for word motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Space,
    Punct,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_alphanumeric() || c == '_' {
            Self::Word
        } else if c.is_whitespace() {
            Self::Space
        } else {
            Self::Punct
        }
    }
}

/// Line and column of `offset` (clamped to the document).
pub fn line_and_column(doc: &Document, offset: usize) -> Position {
    let offset = offset.min(doc.len_chars());
    let line = doc.line_of(offset);
    Position { line, column: offset - doc.line_start(line) }
}

/// Length of the word, punctuation or whitespace run starting at `offset`.
pub fn forward_word_len(doc: &Document, offset: usize) -> usize {
    run_len(doc.chars_from(offset))
}

/// Length of the word, punctuation or whitespace run ending at `offset`.
pub fn backward_word_len(doc: &Document, offset: usize) -> usize {
    run_len(doc.chars_before(offset))
}

fn run_len(mut chars: impl Iterator<Item = char>) -> usize {
    let Some(first) = chars.next() else {
        return 0;
    };
    let class = CharClass::of(first);
    1 + chars.take_while(|&c| CharClass::of(c) == class).count()
}

/// Distance from `offset` to the end of its line.
pub fn forward_line_len(doc: &Document, offset: usize) -> usize {
    let pos = line_and_column(doc, offset);
    doc.line_len(pos.line).saturating_sub(pos.column)
}

/// Distance from `offset` back to the start of its line.
pub fn backward_line_len(doc: &Document, offset: usize) -> usize {
    line_and_column(doc, offset).column
}

/// Char range of `line` including its trailing newline, or the preceding
/// newline for the last line of a multi-line document.
///
/// Removing this range deletes the line as if it were spliced out of the
/// list of lines.
pub fn line_span(doc: &Document, line: usize) -> std::ops::Range<usize> {
    let start = doc.line_start(line);
    let end = start + doc.line_len(line);
    if line + 1 < doc.line_count() {
        start..end + 1
    } else if line > 0 {
        start - 1..end
    } else {
        start..end
    }
}

/// Move the cursor `delta` lines up (negative) or down (positive).
///
/// Returns `None` when the target line is outside the document. The target
/// column is the remembered column if one is set, else the current one. A
/// target line too short for it clamps to its end and remembers the wanted
/// column; a long enough line restores it and clears the memory.
pub fn vertical_move(
    doc: &Document,
    offset: usize,
    delta: isize,
    remembered: Option<usize>,
) -> Option<VerticalMove> {
    if delta == 0 {
        return None;
    }

    let pos = line_and_column(doc, offset);
    let target = pos.line.checked_add_signed(delta)?;
    if target >= doc.line_count() {
        return None;
    }

    let wanted = remembered.unwrap_or(pos.column);
    let target_len = doc.line_len(target);
    let (column, remembered) =
        if target_len < wanted { (target_len, Some(wanted)) } else { (wanted, None) };

    Some(VerticalMove { cursor: doc.line_start(target) + column, remembered })
}
