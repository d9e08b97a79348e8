//! Differential terminal renderer.
//!
//! [`Renderer::commit`] draws an [`Editor`] onto a [`TerminalSink`], writing
//! only rows whose content changed since the previous commit. The baseline
//! is the list of lines drawn last time, indexed by their position below the
//! scroll offset, plus the overlay cells (remote cursors and their name
//! labels) painted on top. A row whose overlays differ from last time is
//! redrawn, and overlays are only repainted on rows that were redrawn.
//!
//! A resize, a wrap toggle or a horizontal scroll change drops the baseline
//! and the next commit clears the screen.

mod layout;

use std::collections::BTreeSet;

pub use layout::{ScreenPos, actual_xy};

use crate::{
    Editor, Mode, RemoteCursorMarker, Rgb, Viewport, cursor,
    sink::{ClearKind, Color, CursorShape, TermOp, TerminalSink},
};

/// Column where the status bar prints the cursor position, counted from the
/// right edge.
const STATUS_POSITION_OFFSET: usize = 15;

/// A remote cursor cell or a name label, painted over the text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OverlayCell {
    x: usize,
    y: usize,
    text: String,
    color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct StatusLine {
    label: String,
    position: String,
    color: Rgb,
}

/// What the previous commit left on screen.
#[derive(Debug, Clone, Default)]
struct RenderState {
    lines: Vec<String>,
    viewport: Viewport,
    wrap: bool,
    horizontal_scroll: usize,
    content_rows: usize,
    overlays: Vec<OverlayCell>,
    status: StatusLine,
}

/// Per-session renderer.
#[derive(Debug, Default)]
pub struct Renderer {
    last: Option<RenderState>,
}

impl Renderer {
    /// Renderer with no baseline. The first commit redraws everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the baseline so the next commit redraws everything.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Draw `editor` onto `sink`.
    ///
    /// `markers` holds snapshots of every session's own marker; only those
    /// whose owner is in [`Editor::remote_cursors`] are drawn.
    pub fn commit(
        &mut self,
        editor: &mut Editor,
        markers: &[RemoteCursorMarker],
        sink: &mut impl TerminalSink,
    ) {
        editor.sync_own_cursor();
        let own = actual_xy(editor, editor.cursor(), true);
        let editor: &Editor = editor;

        let viewport = editor.viewport();
        let baseline = self.last.take().filter(|state| {
            state.viewport == viewport
                && state.wrap == editor.wrap()
                && state.horizontal_scroll == editor.horizontal_scroll()
        });

        sink.apply(TermOp::BeginAtomic);
        sink.apply(TermOp::HideCursor);
        sink.apply(TermOp::Home);

        let fresh = baseline.is_none();
        if fresh {
            sink.apply(TermOp::ClearScreen(ClearKind::All));
        }
        let prev = baseline.unwrap_or_default();

        let overlays = remote_overlays(editor, markers, own);
        let moved = changed_overlay_rows(&prev.overlays, &overlays);

        let (lines, content_rows, forced, mut redrawn) = draw_lines(editor, &prev, fresh, &moved, sink);
        redrawn.extend(draw_filler(editor, &prev, content_rows, forced, &moved, sink));
        paint_overlays(&overlays, &redrawn, sink);
        let status = draw_status(editor, &prev.status, fresh, sink);

        if let Some(pos) = own {
            sink.apply(TermOp::MoveTo { x: pos.x, y: pos.y });
        }
        sink.apply(TermOp::ShowCursor);
        sink.apply(TermOp::SetCursorShape(cursor_shape(editor.mode())));

        self.last = Some(RenderState {
            lines,
            viewport,
            wrap: editor.wrap(),
            horizontal_scroll: editor.horizontal_scroll(),
            content_rows,
            overlays,
            status,
        });
        sink.apply(TermOp::EndAtomic);
    }
}

fn cursor_shape(mode: Mode) -> CursorShape {
    match mode {
        Mode::Insert => CursorShape::Bar,
        Mode::Normal => CursorShape::Block,
        _ => CursorShape::Underline,
    }
}

/// Draws changed lines and lines on `dirty` rows. Returns the lines now on
/// screen, the number of rows they occupy, whether the forced-rewrite flag
/// ended up set and the rows that were redrawn.
fn draw_lines(
    editor: &Editor,
    prev: &RenderState,
    fresh: bool,
    dirty: &BTreeSet<usize>,
    sink: &mut impl TerminalSink,
) -> (Vec<String>, usize, bool, BTreeSet<usize>) {
    let doc = editor.document();
    let rows = editor.viewport().text_rows();
    let width = editor.viewport().columns();

    let mut forced = fresh;
    let mut lines = Vec::new();
    let mut redrawn = BTreeSet::new();
    let mut y = 0;
    let mut line = editor.scroll_offset();

    while y < rows && line < doc.line_count() {
        let text = doc.line(line).unwrap_or_default();
        if prev.lines.get(lines.len()) != Some(&text) {
            forced = true;
        }

        let height = if editor.wrap() { text.chars().count() / width + 1 } else { 1 };
        let span = y..(y + height).min(rows);
        let touched = span.clone().any(|row| dirty.contains(&row));

        if forced || touched {
            redrawn.extend(span.clone());
            if editor.wrap() {
                draw_wrapped(&text, span, width, sink);
            } else {
                draw_window(&text, y, editor.horizontal_scroll(), width, sink);
            }
        }

        lines.push(text);
        y += height;
        line += 1;
    }

    (lines, y.min(rows), forced, redrawn)
}

fn draw_wrapped(
    text: &str,
    rows: std::ops::Range<usize>,
    width: usize,
    sink: &mut impl TerminalSink,
) {
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = chars.chunks(width);
    for row in rows {
        sink.apply(TermOp::MoveTo { x: 0, y: row });
        sink.apply(TermOp::ClearLine(ClearKind::All));
        if let Some(chunk) = chunks.next() {
            sink.apply(TermOp::Write(chunk.iter().collect()));
        }
    }
}

fn draw_window(text: &str, row: usize, h: usize, width: usize, sink: &mut impl TerminalSink) {
    sink.apply(TermOp::MoveTo { x: 0, y: row });
    sink.apply(TermOp::ClearLine(ClearKind::All));

    let visible: String = text.chars().skip(h).take(width).collect();
    if visible.is_empty() {
        return;
    }
    sink.apply(TermOp::Write(visible));

    if h > 0 {
        sink.apply(TermOp::MoveTo { x: 0, y: row });
        sink.apply(TermOp::SetForeground(Color::Blue));
        sink.apply(TermOp::Write("#".to_owned()));
        sink.apply(TermOp::Reset);
    }
}

fn draw_filler(
    editor: &Editor,
    prev: &RenderState,
    content_rows: usize,
    forced: bool,
    dirty: &BTreeSet<usize>,
    sink: &mut impl TerminalSink,
) -> BTreeSet<usize> {
    let mut redrawn = BTreeSet::new();
    for row in content_rows..editor.viewport().text_rows() {
        if forced || row < prev.content_rows || dirty.contains(&row) {
            sink.apply(TermOp::MoveTo { x: 0, y: row });
            sink.apply(TermOp::ClearLine(ClearKind::All));
            sink.apply(TermOp::SetForeground(Color::BrightBlue));
            sink.apply(TermOp::Write("~".to_owned()));
            sink.apply(TermOp::Reset);
            redrawn.insert(row);
        }
    }
    redrawn
}

/// Overlay cells for foreign markers and their labels, in paint order.
fn remote_overlays(editor: &Editor, markers: &[RemoteCursorMarker], own: Option<ScreenPos>) -> Vec<OverlayCell> {
    let mut cells = Vec::new();
    let width = editor.viewport().columns();

    for owner in editor.remote_cursors() {
        let Some(marker) = markers.iter().find(|m| m.owner == *owner) else {
            continue;
        };
        let Some(pos) = layout::screen_pos(editor, marker.position) else {
            continue;
        };

        let under = editor
            .document()
            .char_at(marker.position)
            .filter(|c| !c.is_whitespace())
            .unwrap_or(' ');
        cells.push(OverlayCell { x: pos.x, y: pos.y, text: under.to_string(), color: marker.color });

        let near_owner = own.is_some_and(|o| o.y.abs_diff(pos.y) <= 1);
        if pos.y != 0 && !near_owner {
            let room = width.saturating_sub(pos.x + 2);
            let name: String = marker.name.chars().take(room).collect();
            cells.push(OverlayCell { x: pos.x, y: pos.y - 1, text: format!(" {name} "), color: marker.color });
        }
    }

    cells
}

/// Rows whose overlay cells differ between two commits.
fn changed_overlay_rows(prev: &[OverlayCell], next: &[OverlayCell]) -> BTreeSet<usize> {
    let rows: BTreeSet<usize> = prev.iter().chain(next).map(|cell| cell.y).collect();
    rows.into_iter()
        .filter(|&row| {
            let before = prev.iter().filter(|cell| cell.y == row);
            let after = next.iter().filter(|cell| cell.y == row);
            !before.eq(after)
        })
        .collect()
}

/// Paints the overlay cells that sit on a redrawn row.
fn paint_overlays(cells: &[OverlayCell], redrawn: &BTreeSet<usize>, sink: &mut impl TerminalSink) {
    let mut active = None;
    for cell in cells.iter().filter(|cell| redrawn.contains(&cell.y)) {
        sink.apply(TermOp::MoveTo { x: cell.x, y: cell.y });
        if active != Some(cell.color) {
            sink.apply(TermOp::SetBackground(Color::Rgb(cell.color)));
            active = Some(cell.color);
        }
        sink.apply(TermOp::Write(cell.text.clone()));
    }
    if active.is_some() {
        sink.apply(TermOp::Reset);
    }
}

fn draw_status(
    editor: &Editor,
    prev: &StatusLine,
    fresh: bool,
    sink: &mut impl TerminalSink,
) -> StatusLine {
    let pos = cursor::line_and_column(editor.document(), editor.cursor());
    let status = StatusLine {
        label: format!("[{}]", editor.mode()),
        position: format!("{}:{}", pos.column + 1, pos.line + 1),
        color: editor.own_cursor().color,
    };

    let viewport = editor.viewport();
    if viewport.height < 2 || (!fresh && status == *prev) {
        return status;
    }

    let row = viewport.height - 1;
    sink.apply(TermOp::MoveTo { x: 0, y: row });
    sink.apply(TermOp::SetBackground(Color::Rgb(status.color)));
    sink.apply(TermOp::ClearLine(ClearKind::All));
    sink.apply(TermOp::Write(status.label.clone()));
    sink.apply(TermOp::MoveTo { x: viewport.width.saturating_sub(STATUS_POSITION_OFFSET), y: row });
    sink.apply(TermOp::Write(status.position.clone()));
    sink.apply(TermOp::Reset);

    status
}
