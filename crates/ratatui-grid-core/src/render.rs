use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::header::Align;

/// Vertical extent of a scrolled pane, in rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollExtent {
    pub offset: u64,
    pub viewport: u64,
    pub content: u64,
}

impl ScrollExtent {
    /// The pane needs a scrollbar (and the header band a matching gutter).
    pub fn overflows(&self) -> bool {
        self.content > self.viewport
    }

    pub fn max_offset(&self) -> u64 {
        self.content.saturating_sub(self.viewport)
    }
}

pub fn render_scrollbar(area: Rect, buf: &mut Buffer, extent: &ScrollExtent, style: Style) {
    buf.set_style(area, style);
    if area.height == 0 {
        return;
    }
    if !extent.overflows() || extent.content == 0 {
        for dy in 0..area.height {
            buf.set_stringn(area.x, area.y + dy, " ", 1, style);
        }
        return;
    }

    let track_h = area.height as f64;
    let thumb_h = ((extent.viewport as f64 / extent.content as f64) * track_h)
        .round()
        .clamp(1.0, track_h) as u16;

    let free = (track_h - thumb_h as f64).max(0.0);
    let ratio = extent.offset.min(extent.max_offset()) as f64 / extent.max_offset().max(1) as f64;
    let thumb_top = (ratio * free).round().clamp(0.0, free) as u16;

    for dy in 0..area.height {
        let ch = if dy >= thumb_top && dy < thumb_top + thumb_h {
            "█"
        } else {
            "│"
        };
        buf.set_stringn(area.x, area.y + dy, ch, 1, style);
    }
}

/// Draws `input` starting at display column `start_col`, at most `max_cols` wide. Wide chars cut
/// by either edge are skipped rather than split.
pub fn render_str_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    input: &str,
    style: Style,
) {
    if max_cols == 0 {
        return;
    }

    let start_col = start_col as usize;
    let max_cols = max_cols as usize;
    let mut col = 0usize;
    let mut out_cols = 0usize;
    let mut dx = 0u16;

    let mut tmp = [0u8; 4];

    for ch in input.chars() {
        // Cells are single-line.
        let ch = if ch == '\t' || ch == '\n' || ch == '\r' {
            ' '
        } else {
            ch
        };
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w == 0 {
            continue;
        }
        if col + w <= start_col {
            col += w;
            continue;
        }
        if col < start_col && col + w > start_col {
            col += w;
            continue;
        }
        if out_cols + w > max_cols {
            return;
        }

        let s = ch.encode_utf8(&mut tmp);
        if let Some(cell) = buf.cell_mut((x + dx, y)) {
            cell.set_style(style);
            cell.set_symbol(s);
        }
        dx += 1;
        out_cols += 1;
        col += w;

        if w == 2 {
            if out_cols >= max_cols {
                return;
            }
            if let Some(cell) = buf.cell_mut((x + dx, y)) {
                cell.set_style(style);
                cell.set_symbol("");
            }
            dx += 1;
            out_cols += 1;
        }
    }
}

/// Leading padding that places text of `text_w` columns inside `width` columns.
pub fn align_offset(align: Align, text_w: usize, width: u16) -> u16 {
    let free = (width as usize).saturating_sub(text_w) as u16;
    match align {
        Align::Left => 0,
        Align::Center => free / 2,
        Align::Right => free,
    }
}

/// Renders one line of `text` inside `area` with the given alignment. `clip_left` is the number
/// of columns of the full `width`-wide cell hidden to the left of `area` (horizontal scroll).
pub fn render_aligned(
    area: Rect,
    buf: &mut Buffer,
    text: &str,
    align: Align,
    width: u16,
    clip_left: u32,
    style: Style,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    // One column of padding on each side when there is room for it.
    let (pad, inner) = if width >= 3 { (1u16, width - 2) } else { (0, width) };
    let text_w = text.width();
    let lead = pad as u32 + align_offset(align, text_w, inner) as u32;
    let (dx, start_col) = if clip_left <= lead {
        ((lead - clip_left) as u16, 0)
    } else {
        (0, clip_left - lead)
    };
    if dx >= area.width {
        return;
    }
    let visible = (inner as u32 + pad as u32)
        .saturating_sub(clip_left.max(pad as u32))
        .min((area.width - dx) as u32) as u16;
    let y = area.y + area.height.saturating_sub(1) / 2;
    render_str_clipped(area.x + dx, y, start_col, visible, buf, text, style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;

    fn line(buf: &Buffer) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn clipped_str_skips_split_wide_chars() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 1));
        render_str_clipped(0, 0, 1, 4, &mut buf, "你好a", Style::default());
        assert_eq!(line(&buf), "好a ");
    }

    #[test]
    fn aligned_text_pads_and_aligns() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 8, 1));
        render_aligned(buf.area, &mut buf, "42", Align::Right, 8, 0, Style::default());
        assert_eq!(line(&buf), "     42 ");

        let mut buf = Buffer::empty(Rect::new(0, 0, 8, 1));
        render_aligned(buf.area, &mut buf, "ab", Align::Center, 8, 0, Style::default());
        assert_eq!(line(&buf), "   ab   ");

        let mut buf = Buffer::empty(Rect::new(0, 0, 8, 1));
        render_aligned(buf.area, &mut buf, "abcdefghij", Align::Left, 8, 0, Style::default());
        assert_eq!(line(&buf), " abcdef ");
    }

    #[test]
    fn aligned_text_respects_horizontal_clip() {
        // A 8-wide cell scrolled 3 columns to the left: " abcdef " -> "cdef "
        let mut buf = Buffer::empty(Rect::new(0, 0, 5, 1));
        render_aligned(buf.area, &mut buf, "abcdef", Align::Left, 8, 3, Style::default());
        assert_eq!(line(&buf), "cdef ");
    }

    #[test]
    fn scrollbar_thumb_tracks_offset() {
        let mut extent = ScrollExtent {
            offset: 0,
            viewport: 5,
            content: 50,
        };
        let mut buf = Buffer::empty(Rect::new(0, 0, 1, 5));
        render_scrollbar(buf.area, &mut buf, &extent, Style::default());
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), "█");
        assert_eq!(buf.cell((0, 4)).unwrap().symbol(), "│");

        extent.offset = extent.max_offset();
        render_scrollbar(buf.area, &mut buf, &extent, Style::default());
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), "│");
        assert_eq!(buf.cell((0, 4)).unwrap().symbol(), "█");
    }

    #[test]
    fn no_thumb_without_overflow() {
        let extent = ScrollExtent {
            offset: 0,
            viewport: 5,
            content: 5,
        };
        assert!(!extent.overflows());
        let mut buf = Buffer::empty(Rect::new(0, 0, 1, 3));
        render_scrollbar(buf.area, &mut buf, &extent, Style::default());
        assert_eq!(buf.cell((0, 1)).unwrap().symbol(), " ");
    }
}
