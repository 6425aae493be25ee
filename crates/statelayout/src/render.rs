#![forbid(unsafe_code)]

//! Cell-grid rendering and hit testing.
//!
//! The toolkit underneath is a plain grid of cells. Overlays draw full-bleed
//! over the area they are given: the background is filled, then the overlay's
//! parts are stacked vertically and centered. [`arrange`] is the single
//! source of truth for where each part lands, so drawing and hit testing
//! always agree.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::color::Rgb;
use crate::container::{Container, ViewId};
use crate::layout::StateLayout;
use crate::overlay::{IndicatorStyle, OverlayView, ProgressIndicator};

pub const DOTS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const MAX_BAR_WIDTH: u16 = 32;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A rectangle in cell coordinates (origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Intersection with `other`; empty when they do not overlap.
    pub fn intersection(&self, other: &Self) -> Self {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return Self::default();
        }
        Self::new(x, y, right - x, bottom - y)
    }
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
    /// Covered by the right half of a wide character to its left.
    pub continuation: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Rgb::BLACK,
            bg: Rgb::WHITE,
            continuation: false,
        }
    }
}

/// A fixed-size grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub const fn area(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Clear `area` to spaces on `bg`.
    pub fn fill(&mut self, area: Rect, bg: Rgb) {
        let area = area.intersection(&self.area());
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                if let Some(cell) = self.get_mut(x, y) {
                    *cell = Cell {
                        bg,
                        ..Cell::default()
                    };
                }
            }
        }
    }

    /// Write `text` from `(x, y)`, stopping before `max_x`. Characters that
    /// would straddle `max_x` are dropped. Returns the x after the last
    /// written cell.
    pub fn draw_text(&mut self, x: u16, y: u16, text: &str, fg: Rgb, max_x: u16) -> u16 {
        let max_x = max_x.min(self.width);
        let mut cursor = x;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0) as u16;
            if w == 0 {
                continue;
            }
            if cursor.saturating_add(w) > max_x {
                break;
            }
            if let Some(cell) = self.get_mut(cursor, y) {
                cell.ch = ch;
                cell.fg = fg;
                cell.continuation = false;
            }
            for dx in 1..w {
                if let Some(cell) = self.get_mut(cursor + dx, y) {
                    cell.ch = ' ';
                    cell.continuation = true;
                }
            }
            cursor += w;
        }
        cursor
    }

    /// Text content, one string per row, trailing spaces trimmed.
    pub fn to_lines(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                let row: String = (0..self.width)
                    .filter_map(|x| self.get(x, y))
                    .filter(|cell| !cell.continuation)
                    .map(|cell| cell.ch)
                    .collect();
                row.trim_end().to_owned()
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

/// A renderable component.
pub trait Widget {
    /// Render into the buffer at the given area.
    fn render(&self, area: Rect, buf: &mut Buffer);
}

// ---------------------------------------------------------------------------
// Arrangement
// ---------------------------------------------------------------------------

/// One drawn part of an overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placed {
    pub id: ViewId,
    pub rect: Rect,
    pub text: String,
    pub fg: Rgb,
    /// Fill behind the text, for parts with their own background.
    pub bg: Option<Rgb>,
}

/// Where each part of `view` lands inside `area`.
///
/// Parts are stacked top to bottom with one blank row between them, the
/// whole stack centered. Titles and messages wrap at word boundaries to the
/// area width, so a part can take several rows. Without room for the gaps
/// they are dropped; rows that still do not fit are dropped from the bottom.
///
/// The area is clipped to the addressable grid first.
pub fn arrange(view: &OverlayView, area: Rect) -> Vec<Placed> {
    let area = area.intersection(&Rect::from_size(u16::MAX, u16::MAX));
    if area.is_empty() {
        return Vec::new();
    }
    let blocks = parts(view, area.width);
    let height = usize::from(area.height);
    let lines: usize = blocks.iter().map(Vec::len).sum();
    let gaps = lines + blocks.len().saturating_sub(1) <= height;

    // `None` is a blank separator row.
    let mut rows: Vec<Option<Part>> = Vec::with_capacity(lines + blocks.len());
    for (i, block) in blocks.into_iter().enumerate() {
        if gaps && i > 0 {
            rows.push(None);
        }
        rows.extend(block.into_iter().map(Some));
    }
    rows.truncate(height);

    // rows.len() <= area.height, and area.bottom() cannot overflow.
    let used = rows.len() as u16;
    let top = area.y + (area.height - used) / 2;

    rows.into_iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let (id, text, fg, bg) = row?;
            let width = u16::try_from(text.width())
                .unwrap_or(u16::MAX)
                .min(area.width);
            let x = area.x + (area.width - width) / 2;
            Some(Placed {
                id,
                rect: Rect::new(x, top + i as u16, width, 1),
                text,
                fg,
                bg,
            })
        })
        .collect()
}

type Part = (ViewId, String, Rgb, Option<Rgb>);

/// One block of rows per part, top to bottom.
fn parts(view: &OverlayView, width: u16) -> Vec<Vec<Part>> {
    let wrapped = |id: ViewId, text: &str, fg: Rgb| -> Vec<Part> {
        wrap(text, width)
            .into_iter()
            .map(|line| (id, line, fg, None))
            .collect()
    };

    let mut parts = Vec::with_capacity(5);
    if let Some(indicator) = view
        .indicator
        .as_ref()
        .filter(|i| i.style == IndicatorStyle::Spinner)
    {
        let frame = DOTS[indicator.frame() % DOTS.len()];
        parts.push(vec![(indicator.id, frame.to_owned(), indicator.color, None)]);
    }
    if let Some(image) = &view.icon {
        parts.push(vec![(
            image.id,
            image.icon.glyph().to_owned(),
            view.message.color,
            None,
        )]);
    }
    if let Some(title) = &view.title {
        parts.push(wrapped(title.id, &title.text, title.color));
    }
    parts.push(wrapped(view.message.id, &view.message.text, view.message.color));
    if let Some(indicator) = view
        .indicator
        .as_ref()
        .filter(|i| i.style == IndicatorStyle::Bar)
    {
        parts.push(vec![(
            indicator.id,
            progress_bar(indicator, width.min(MAX_BAR_WIDTH)),
            indicator.color,
            None,
        )]);
    }
    if let Some(button) = &view.button {
        parts.push(vec![(
            button.id,
            format!("[ {} ]", button.label),
            button.text_color,
            Some(button.background),
        )]);
    }
    parts
}

/// Greedy word wrap to `width` columns. Words wider than a line are split
/// between characters. Always returns at least one (possibly empty) line.
fn wrap(text: &str, width: u16) -> Vec<String> {
    let width = usize::from(width.max(1));
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut used = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();
        if !line.is_empty() && used + 1 + word_width <= width {
            line.push(' ');
            line.push_str(word);
            used += 1 + word_width;
            continue;
        }
        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            used = 0;
        }
        if word_width <= width {
            line.push_str(word);
            used = word_width;
            continue;
        }
        for ch in word.chars() {
            let w = ch.width().unwrap_or(0);
            if !line.is_empty() && used + w > width {
                lines.push(std::mem::take(&mut line));
                used = 0;
            }
            line.push(ch);
            used += w;
        }
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// `[#####-----] 50%` fitted to `width` cells.
fn progress_bar(indicator: &ProgressIndicator, width: u16) -> String {
    let percent = indicator.progress();
    let label = format!(" {percent:>3}%");
    let track = usize::from(width).saturating_sub(label.len() + 2);
    if track == 0 {
        return label.trim_start().to_owned();
    }
    let filled = track * usize::from(percent) / usize::from(ProgressIndicator::MAX);
    format!(
        "[{}{}]{label}",
        "#".repeat(filled),
        "-".repeat(track - filled)
    )
}

impl Widget for OverlayView {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(&buf.area());
        if area.is_empty() {
            return;
        }
        buf.fill(area, self.background);
        for placed in arrange(self, area) {
            if let Some(bg) = placed.bg {
                buf.fill(placed.rect, bg);
            }
            buf.draw_text(
                placed.rect.x,
                placed.rect.y,
                &placed.text,
                placed.fg,
                placed.rect.right(),
            );
        }
    }
}

impl<C: Container> Widget for StateLayout<C> {
    /// Draws the visible overlay over `area`. Draws nothing while the
    /// content is showing.
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let _span = tracing::debug_span!(
            "widget_render",
            widget = "StateLayout",
            state = %self.current_state(),
            x = area.x,
            y = area.y,
            w = area.width,
            h = area.height
        )
        .entered();

        if let Some(view) = self.visible_overlay() {
            view.render(area, buf);
        }
    }
}

impl<C: Container> StateLayout<C> {
    /// The view under `(x, y)` when rendered into `area`.
    ///
    /// Returns the part under the point, the overlay itself for its
    /// background, or `None` when the point is outside `area` or no overlay
    /// is visible.
    pub fn hit_test(&self, area: Rect, x: u16, y: u16) -> Option<ViewId> {
        if !area.contains(x, y) {
            return None;
        }
        let view = self.visible_overlay()?;
        let hit = arrange(view, area)
            .into_iter()
            .find(|placed| placed.rect.contains(x, y))
            .map(|placed| placed.id);
        Some(hit.unwrap_or(view.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StateLayoutConfig;
    use crate::request::{EmptyRequest, ErrorRequest, LoadingRequest, ProgressRequest};
    use crate::state::OverlayKind;

    fn lines(layout: &StateLayout, width: u16, height: u16) -> Vec<String> {
        let mut buf = Buffer::new(width, height);
        layout.render(buf.area(), &mut buf);
        buf.to_lines()
    }

    fn non_blank(lines: &[String]) -> Vec<&str> {
        lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect()
    }

    #[test]
    fn rect_intersection() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersection(&b), Rect::new(5, 5, 5, 5));
        assert!(a.intersection(&Rect::new(20, 20, 1, 1)).is_empty());
    }

    #[test]
    fn draw_text_clips_at_max_x() {
        let mut buf = Buffer::new(5, 1);
        let end = buf.draw_text(0, 0, "abcdefg", Rgb::BLACK, 3);
        assert_eq!(end, 3);
        assert_eq!(buf.to_lines(), vec!["abc"]);
    }

    #[test]
    fn draw_text_handles_wide_chars() {
        let mut buf = Buffer::new(6, 1);
        buf.draw_text(0, 0, "日本語", Rgb::BLACK, 5);
        // The third glyph would straddle the limit.
        assert_eq!(buf.to_lines(), vec!["日本"]);
        assert!(buf.get(1, 0).unwrap().continuation);
    }

    #[test]
    fn content_renders_nothing() {
        let layout = StateLayout::default();
        assert!(lines(&layout, 20, 5).iter().all(String::is_empty));
    }

    #[test]
    fn empty_overlay_stacks_icon_title_message() {
        let mut layout = StateLayout::default();
        layout.show_empty(EmptyRequest::new());
        let out = lines(&layout, 30, 9);
        assert_eq!(non_blank(&out), vec!["✉", "No item found", "Enjoy free day"]);
    }

    #[test]
    fn rows_are_centered() {
        let mut layout = StateLayout::default();
        layout.show_loading(LoadingRequest::new().message("abcd"));
        let out = lines(&layout, 10, 3);
        // spinner, gap, message
        assert_eq!(out[0], "    ⠋");
        assert_eq!(out[2], "   abcd");
    }

    #[test]
    fn error_overlay_draws_button_with_background() {
        let mut layout = StateLayout::default();
        layout.show_error(ErrorRequest::new().message("Offline"));
        let area = Rect::from_size(30, 9);
        let mut buf = Buffer::new(30, 9);
        layout.render(area, &mut buf);
        let out = buf.to_lines();
        assert_eq!(non_blank(&out), vec!["⚠", "Error", "Offline", "[ Retry ]"]);

        let button = layout.retry_button_id().unwrap();
        let placed = arrange(layout.overlay(OverlayKind::Error).unwrap(), area);
        let rect = placed.iter().find(|p| p.id == button).unwrap().rect;
        assert_eq!(buf.get(rect.x, rect.y).unwrap().bg, Rgb::WHITE);
        assert_eq!(buf.get(rect.x, rect.y).unwrap().fg, Rgb::PRIMARY);
        assert_eq!(buf.get(0, 0).unwrap().bg, Rgb::BACKGROUND);
    }

    #[test]
    fn gaps_dropped_when_tight() {
        let mut layout = StateLayout::default();
        layout.show_error(ErrorRequest::new().message("Offline"));
        let out = lines(&layout, 20, 4);
        assert_eq!(non_blank(&out), vec!["⚠", "Error", "Offline", "[ Retry ]"]);
    }

    #[test]
    fn overflow_drops_bottom_rows() {
        let mut layout = StateLayout::default();
        layout.show_error(ErrorRequest::new().message("Offline"));
        let out = lines(&layout, 20, 2);
        assert_eq!(non_blank(&out), vec!["⚠", "Error"]);
    }

    #[test]
    fn progress_bar_reflects_value() {
        let mut layout = StateLayout::default();
        layout.show_progress(ProgressRequest::new().message("Uploading").percent(50));
        let out = lines(&layout, 40, 3);
        assert_eq!(out[0].trim(), "Uploading");
        assert_eq!(out[2].trim(), "[############-------------]  50%");
    }

    #[test]
    fn progress_bar_degrades_to_label() {
        let indicator = {
            let mut layout = StateLayout::default();
            layout.show_progress(ProgressRequest::new().percent(7));
            layout.overlay(OverlayKind::Progress).unwrap().indicator.clone().unwrap()
        };
        assert_eq!(progress_bar(&indicator, 4), "7%");
    }

    #[test]
    fn hit_test_finds_retry_button() {
        let mut layout = StateLayout::default();
        layout.show_error(ErrorRequest::new());
        let area = Rect::from_size(40, 12);
        let button = layout.retry_button_id().unwrap();
        let rect = arrange(layout.overlay(OverlayKind::Error).unwrap(), area)
            .into_iter()
            .find(|p| p.id == button)
            .unwrap()
            .rect;

        assert_eq!(layout.hit_test(area, rect.x + 1, rect.y), Some(button));
        let overlay_id = layout.overlay(OverlayKind::Error).unwrap().id;
        assert_eq!(layout.hit_test(area, 0, 0), Some(overlay_id));
        assert_eq!(layout.hit_test(area, 40, 0), None);
    }

    #[test]
    fn hit_test_without_overlay_is_none() {
        let layout = StateLayout::new(StateLayoutConfig::default());
        assert_eq!(layout.hit_test(Rect::from_size(10, 10), 1, 1), None);
    }

    #[test]
    fn default_error_message_wraps_in_full() {
        let mut layout = StateLayout::default();
        layout.show_error(ErrorRequest::new());
        let out = lines(&layout, 48, 14);
        let rows = non_blank(&out);
        assert_eq!(
            rows,
            vec![
                "⚠",
                "Error",
                "This error happens because of network connection",
                "failure. You may retry later.",
                "[ Retry ]",
            ]
        );
        assert_eq!(rows[2..4].join(" "), crate::config::DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn wrapped_rows_are_hit_as_their_part() {
        let mut layout = StateLayout::default();
        layout.show_error(ErrorRequest::new());
        let area = Rect::from_size(48, 14);
        let view = layout.overlay(OverlayKind::Error).unwrap();
        let message_rows: Vec<_> = arrange(view, area)
            .into_iter()
            .filter(|p| p.id == view.message.id)
            .collect();
        assert_eq!(message_rows.len(), 2);
        let last = message_rows[1].rect;
        assert_eq!(layout.hit_test(area, last.x, last.y), Some(view.message.id));
    }

    #[test]
    fn wrap_splits_on_words() {
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("  spaced   out  ", 20), vec!["spaced out"]);
        assert_eq!(wrap("", 5), vec![""]);
    }

    #[test]
    fn wrap_breaks_long_words() {
        assert_eq!(wrap("abcdefgh ij", 3), vec!["abc", "def", "gh", "ij"]);
        assert_eq!(wrap("日本語", 4), vec!["日本", "語"]);
    }

    #[test]
    fn area_past_grid_edge_is_clipped() {
        let mut layout = StateLayout::default();
        layout.show_error(ErrorRequest::new());
        let area = Rect::new(0, 65000, 10, 2000);
        let overlay_id = layout.overlay(OverlayKind::Error).unwrap().id;
        assert!(layout.hit_test(area, 1, 65001).is_some());
        assert_eq!(layout.hit_test(area, 0, 65000), Some(overlay_id));

        let placed = arrange(layout.overlay(OverlayKind::Error).unwrap(), area);
        assert!(!placed.is_empty());
        assert!(placed.iter().all(|p| p.rect.y >= 65000));
    }

    #[test]
    fn zero_area_is_safe() {
        let mut layout = StateLayout::default();
        layout.show_loading(LoadingRequest::new());
        let mut buf = Buffer::new(1, 1);
        layout.render(Rect::new(0, 0, 0, 0), &mut buf);
        assert_eq!(buf.to_lines(), vec![""]);
    }
}
