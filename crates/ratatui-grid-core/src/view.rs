//! Renders the three synchronized panes from a read-only [`PaneContext`].
//!
//! The view never mutates grid state. Everything it needs is borrowed from the controller for the
//! duration of one frame, and the only thing it hands back is where things were drawn
//! ([`RenderedRegions`]) so the controller can hit-test the next mouse event.

use crate::edit::DATE_FORMAT;
use crate::edit::EditSession;
use crate::edit::EditType;
use crate::error::GridError;
use crate::filter::FilterState;
use crate::header::Align;
use crate::header::CellContext;
use crate::header::EditContext;
use crate::header::Header;
use crate::header::HeaderId;
use crate::header::HeaderRegistry;
use crate::layout::PaneLayout;
use crate::layout::Zone;
use crate::render;
use crate::render::ScrollExtent;
use crate::row::Row;
use crate::row::RowKey;
use crate::selection::SelectionEngine;
use crate::selection::TriState;
use crate::sort::SortDirection;
use crate::sort::SortState;
use crate::style::GridStyle;
use crate::virtual_rows::VirtualWindow;
use crate::widgets::CheckboxProps;
use crate::widgets::GridWidgets;
use crate::widgets::SelectProps;
use crate::widgets::TextInputProps;
use chrono::NaiveDate;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

static NULL: Value = Value::Null;

const MAX_POPUP_ROWS: usize = 8;

/// Keyboard cursor: a position in the view order and a header position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridCursor {
    pub row: usize,
    pub col: usize,
}

/// The slice of controller state one frame needs.
pub struct PaneContext<'a> {
    pub headers: &'a HeaderRegistry,
    pub rows: &'a [Row],
    pub view_order: &'a [usize],
    pub visible_keys: &'a [RowKey],
    pub window: &'a VirtualWindow,
    pub layout: &'a PaneLayout,
    pub style: &'a GridStyle,
    pub sort: &'a SortState,
    pub filter: &'a FilterState,
    pub selection: &'a SelectionEngine,
    pub edit: Option<&'a EditSession>,
    pub cursor: Option<GridCursor>,
    pub hover_row: Option<usize>,
    pub scroll_top: u64,
    pub total_height: u64,
    pub header_left: u32,
    pub body_left: u32,
    pub error: Option<&'a GridError>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PopupRegion {
    pub area: Rect,
    /// Option index drawn on the popup's first line.
    pub first_option: usize,
}

/// Where the last frame put the header, the body and an open option list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderedRegions {
    pub header: Rect,
    pub body: Rect,
    pub popup: Option<PopupRegion>,
}

/// Splits `area` into the fixed header band and the scrolling body band.
pub fn grid_bands(area: Rect, header_height: u16) -> (Rect, Rect) {
    let header_h = header_height.min(area.height);
    let header = Rect::new(area.x, area.y, area.width, header_h);
    let body = Rect::new(
        area.x,
        area.y + header_h,
        area.width,
        area.height.saturating_sub(header_h),
    );
    (header, body)
}

pub fn render_grid(
    area: Rect,
    buf: &mut Buffer,
    ctx: &PaneContext<'_>,
    widgets: &dyn GridWidgets,
) -> RenderedRegions {
    if area.width == 0 || area.height == 0 {
        return RenderedRegions::default();
    }
    buf.set_style(area, ctx.style.base);

    if let Some(err) = ctx.error {
        render_error(area, buf, err, ctx.style);
        return RenderedRegions::default();
    }

    let (header, body) = grid_bands(area, ctx.style.header_height);
    render_header(header, buf, ctx, widgets);

    let popup = if ctx.view_order.is_empty() || ctx.window.is_empty() {
        render_empty(body, buf, ctx);
        None
    } else {
        render_body(body, buf, ctx, widgets)
    };

    let gutter = ctx.layout.pane_rects(body).gutter;
    if gutter.width > 0 {
        render::render_scrollbar(
            gutter,
            buf,
            &ScrollExtent {
                offset: ctx.scroll_top,
                viewport: body.height as u64,
                content: ctx.total_height,
            },
            ctx.style.scrollbar,
        );
    }

    RenderedRegions {
        header,
        body,
        popup,
    }
}

fn render_error(area: Rect, buf: &mut Buffer, err: &GridError, style: &GridStyle) {
    let text = format!("grid error: {err}");
    let mut y = area.y;
    // Wrap on width so long key lists stay readable.
    let width = area.width as usize;
    let mut line = String::new();
    for word in text.split(' ') {
        if !line.is_empty() && line.width() + 1 + word.width() > width {
            if y >= area.bottom() {
                return;
            }
            render::render_str_clipped(area.x, y, 0, area.width, buf, &line, style.error);
            y += 1;
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() && y < area.bottom() {
        render::render_str_clipped(area.x, y, 0, area.width, buf, &line, style.error);
    }
}

fn render_empty(body: Rect, buf: &mut Buffer, ctx: &PaneContext<'_>) {
    if body.width == 0 || body.height == 0 {
        return;
    }
    let text = if ctx.filter.is_active() && !ctx.rows.is_empty() {
        "No matching rows"
    } else {
        "No rows"
    };
    let line = Rect::new(body.x, body.y + (body.height - 1) / 2, body.width, 1);
    render::render_aligned(
        line,
        buf,
        text,
        Align::Center,
        body.width,
        0,
        ctx.style.empty,
    );
}

/// The three zones of a band with their screen rect and horizontal scroll.
fn zones<'l>(layout: &'l PaneLayout, band: Rect, center_left: u32) -> [(&'l Zone, Rect, u32); 3] {
    let rects = layout.pane_rects(band);
    [
        (&layout.left, rects.left, 0),
        (&layout.center, rects.center, center_left),
        (&layout.right, rects.right, 0),
    ]
}

fn render_header(band: Rect, buf: &mut Buffer, ctx: &PaneContext<'_>, widgets: &dyn GridWidgets) {
    if band.width == 0 || band.height == 0 {
        return;
    }
    let style = ctx.style;
    buf.set_style(band, style.header);
    let rightmost = ctx.layout.rightmost_column();

    for (zone, rect, scroll) in zones(ctx.layout, band, ctx.header_left) {
        for col in &zone.columns {
            let Some(header) = ctx.headers.at(col.header) else {
                continue;
            };
            let (cell, clip_left) = clipped_rect_x(rect, scroll as u64, col.start as u64, col.width as u32);
            if cell.width == 0 {
                continue;
            }

            if header.id == HeaderId::Check {
                if clip_left == 0 {
                    let state = ctx.selection.tri_state(ctx.visible_keys);
                    widgets.render_checkbox(
                        middle_line(cell),
                        buf,
                        CheckboxProps {
                            checked: state == TriState::All,
                            partial: state == TriState::Partial,
                            label: "",
                            style: style.header,
                        },
                    );
                }
            } else {
                let indicator = header_indicator(header, ctx);
                let label_w = col.width.saturating_sub(indicator.width() as u16);
                render::render_aligned(
                    cell,
                    buf,
                    &header.label,
                    header.header_align,
                    label_w,
                    clip_left,
                    style.header,
                );
                if !indicator.is_empty() {
                    let ind_style = if ctx.sort.direction(&header.id).is_some() {
                        style.sort_indicator
                    } else {
                        style.filter_indicator
                    };
                    let at = col.width.saturating_sub(indicator.width() as u16 + 1) as u32;
                    draw_at_cell_col(cell, clip_left, at, buf, &indicator, style.header.patch(ind_style));
                }
            }

            if wants_separator(style, rightmost, col.header, header) {
                draw_separator(cell, clip_left, col.width, buf, style.header.patch(style.border));
            }
        }
    }
}

fn header_indicator(header: &Header, ctx: &PaneContext<'_>) -> String {
    let mut s = String::new();
    match ctx.sort.direction(&header.id) {
        Some(SortDirection::Asc) => s.push('▲'),
        Some(SortDirection::Desc) => s.push('▼'),
        None => {}
    }
    if header.is_filterable() && !ctx.filter.get(&header.id).is_empty() {
        s.push('*');
    }
    s
}

struct PendingPopup<'a> {
    anchor: Rect,
    width: u16,
    session: &'a EditSession,
}

fn render_body(
    band: Rect,
    buf: &mut Buffer,
    ctx: &PaneContext<'_>,
    widgets: &dyn GridWidgets,
) -> Option<PopupRegion> {
    if band.width == 0 || band.height == 0 {
        return None;
    }
    let style = ctx.style;
    let rightmost = ctx.layout.rightmost_column();
    let mut pending: Option<PendingPopup<'_>> = None;

    for item in &ctx.window.items {
        let (row_rect, _clip_top) = clipped_rect_y(band, ctx.scroll_top, item.top, item.height);
        if row_rect.height == 0 {
            continue;
        }
        let Some(row) = ctx.view_order.get(item.index).and_then(|&i| ctx.rows.get(i)) else {
            continue;
        };
        let is_selected = ctx
            .visible_keys
            .get(item.index)
            .is_some_and(|k| ctx.selection.is_checked(k));

        let mut row_style = style.base.patch(style.zebra(item.index));
        if ctx.hover_row == Some(item.index) {
            row_style = row_style.patch(style.hover);
        }
        if is_selected {
            row_style = row_style.patch(style.selected);
        }
        buf.set_style(row_rect, row_style);

        for (zone, rect, scroll) in zones(ctx.layout, row_rect, ctx.body_left) {
            for col in &zone.columns {
                let Some(header) = ctx.headers.at(col.header) else {
                    continue;
                };
                let (cell, clip_left) =
                    clipped_rect_x(rect, scroll as u64, col.start as u64, col.width as u32);
                if cell.width == 0 {
                    continue;
                }
                let is_cursor = ctx.cursor == Some(GridCursor {
                    row: item.index,
                    col: col.header,
                });
                let cell_style = if is_cursor {
                    row_style.patch(style.cursor)
                } else {
                    row_style
                };
                buf.set_style(cell, cell_style);

                let cell_args = BodyCell {
                    area: cell,
                    clip_left,
                    width: col.width,
                    ordinal: item.index,
                    row,
                    is_selected,
                    is_cursor,
                    style: cell_style,
                };
                if let Some(p) = render_body_cell(buf, ctx, widgets, header, &cell_args) {
                    pending = Some(p);
                }

                if wants_separator(style, rightmost, col.header, header) {
                    draw_separator(cell, clip_left, col.width, buf, cell_style.patch(style.border));
                }
            }
        }
    }

    pending.and_then(|p| render_popup(band, buf, ctx, widgets, p))
}

struct BodyCell<'a> {
    area: Rect,
    clip_left: u32,
    width: u16,
    ordinal: usize,
    row: &'a Row,
    is_selected: bool,
    is_cursor: bool,
    style: Style,
}

fn render_body_cell<'a>(
    buf: &mut Buffer,
    ctx: &PaneContext<'a>,
    widgets: &dyn GridWidgets,
    header: &Header,
    cell: &BodyCell<'_>,
) -> Option<PendingPopup<'a>> {
    match &header.id {
        HeaderId::Index => {
            let text = (cell.ordinal + 1).to_string();
            render::render_aligned(cell.area, buf, &text, header.data_align, cell.width, cell.clip_left, cell.style);
        }
        HeaderId::Check => {
            if cell.clip_left == 0 {
                widgets.render_checkbox(
                    middle_line(cell.area),
                    buf,
                    CheckboxProps {
                        checked: cell.is_selected,
                        partial: false,
                        label: "",
                        style: cell.style,
                    },
                );
            }
        }
        HeaderId::Button => {
            render::render_aligned(
                cell.area,
                buf,
                &header.label,
                header.data_align,
                cell.width,
                cell.clip_left,
                cell.style,
            );
        }
        HeaderId::Column(key) => {
            let editing = ctx
                .edit
                .filter(|s| s.cell.index == cell.row.index && s.cell.key == *key);
            if let Some(session) = editing {
                return render_edit_cell(buf, ctx, widgets, header, cell, session);
            }
            if let Some(custom) = &header.cell {
                let cc = CellContext {
                    cell_value: cell.row.get(key).unwrap_or(&NULL),
                    row: cell.row,
                    table_style: ctx.style,
                    is_selected: cell.is_selected,
                    is_cursor: cell.is_cursor,
                };
                custom(cell.area, &cc, buf);
            } else {
                let text = header.display_text(cell.row);
                render::render_aligned(cell.area, buf, &text, header.data_align, cell.width, cell.clip_left, cell.style);
            }
        }
    }
    None
}

fn render_edit_cell<'a>(
    buf: &mut Buffer,
    ctx: &PaneContext<'a>,
    widgets: &dyn GridWidgets,
    header: &Header,
    cell: &BodyCell<'_>,
    session: &'a EditSession,
) -> Option<PendingPopup<'a>> {
    let style = cell.style.patch(ctx.style.editing);
    if let Some(custom) = &header.edit_cell {
        let ec = EditContext {
            session,
            row: cell.row,
            table_style: ctx.style,
        };
        custom(cell.area, &ec, buf);
        return None;
    }
    let line = middle_line(cell.area);
    match session.edit_type {
        EditType::Input | EditType::Date => {
            widgets.render_text_input(
                line,
                buf,
                TextInputProps {
                    value: &session.temp_value,
                    cursor: session.cursor(),
                    focused: session.is_focused(),
                    style,
                },
            );
        }
        EditType::Select => {
            widgets.render_select(
                line,
                Rect::default(),
                buf,
                SelectProps {
                    value: &session.temp_value,
                    options: session.options(),
                    highlighted: session.highlighted(),
                    open: false,
                    style,
                    highlight_style: ctx.style.popup_highlight,
                },
            );
        }
        EditType::None => {}
    }
    let popup = session.popup();
    if session.edit_type == EditType::None || (!popup.is_shown() && popup.progress() <= 0.0) {
        return None;
    }
    Some(PendingPopup {
        anchor: line,
        width: cell.width,
        session,
    })
}

fn render_popup(
    body: Rect,
    buf: &mut Buffer,
    ctx: &PaneContext<'_>,
    widgets: &dyn GridWidgets,
    p: PendingPopup<'_>,
) -> Option<PopupRegion> {
    let session = p.session;
    let (lines, content_w) = match session.edit_type {
        EditType::Select => {
            let longest = session.options().iter().map(|o| o.width()).max().unwrap_or(0);
            (session.options().len().min(MAX_POPUP_ROWS), longest + 2)
        }
        EditType::Date => (1, date_hint(&session.temp_value).width() + 2),
        _ => return None,
    };
    if lines == 0 {
        return None;
    }
    // Grows and shrinks with the popup transition.
    let shown = ((lines as f64) * session.popup().progress()).ceil().max(1.0) as u16;

    let below = body.bottom().saturating_sub(p.anchor.bottom());
    let above = p.anchor.y.saturating_sub(body.y);
    let height = shown.min(below.max(above));
    if height == 0 {
        return None;
    }
    let y = if below >= shown || below >= above {
        p.anchor.bottom()
    } else {
        p.anchor.y - height
    };
    let width = (content_w as u16).max(p.width).min(body.width);
    let x = p.anchor.x.min(body.right().saturating_sub(width));
    let area = Rect::new(x, y, width, height);

    buf.set_style(area, ctx.style.popup);
    match session.edit_type {
        EditType::Select => {
            widgets.render_select(
                p.anchor,
                area,
                buf,
                SelectProps {
                    value: &session.temp_value,
                    options: session.options(),
                    highlighted: session.highlighted(),
                    open: true,
                    style: ctx.style.popup,
                    highlight_style: ctx.style.popup_highlight,
                },
            );
        }
        _ => {
            let hint = date_hint(&session.temp_value);
            render::render_str_clipped(area.x + 1, area.y, 0, area.width.saturating_sub(1), buf, &hint, ctx.style.popup);
        }
    }

    if !session.is_popup_open() {
        return None;
    }
    let first_option = session
        .highlighted()
        .saturating_sub((height as usize).saturating_sub(1));
    Some(PopupRegion { area, first_option })
}

fn date_hint(value: &str) -> String {
    match NaiveDate::parse_from_str(value.trim(), DATE_FORMAT) {
        Ok(d) => format!("{}  ↑/↓", d.format("%a %d %b %Y")),
        Err(_) => "yyyy-mm-dd".to_string(),
    }
}

fn middle_line(area: Rect) -> Rect {
    Rect::new(area.x, area.y + area.height.saturating_sub(1) / 2, area.width, area.height.min(1))
}

/// Draws `text` at column `at` of a cell whose first `clip_left` columns are scrolled away.
fn draw_at_cell_col(cell: Rect, clip_left: u32, at: u32, buf: &mut Buffer, text: &str, style: Style) {
    if at < clip_left {
        return;
    }
    let dx = at - clip_left;
    if dx >= cell.width as u32 {
        return;
    }
    let y = cell.y + cell.height.saturating_sub(1) / 2;
    render::render_str_clipped(cell.x + dx as u16, y, 0, cell.width - dx as u16, buf, text, style);
}

/// The checkbox brackets already delimit the check column.
fn wants_separator(style: &GridStyle, rightmost: Option<usize>, pos: usize, header: &Header) -> bool {
    style.show_column_borders && rightmost != Some(pos) && header.id != HeaderId::Check
}

fn draw_separator(cell: Rect, clip_left: u32, width: u16, buf: &mut Buffer, style: Style) {
    let Some(at) = (width as u32).checked_sub(1) else {
        return;
    };
    if at < clip_left || at - clip_left >= cell.width as u32 {
        return;
    }
    let x = cell.x + (at - clip_left) as u16;
    for dy in 0..cell.height {
        buf.set_stringn(x, cell.y + dy, "│", 1, style);
    }
}

fn clipped_rect_x(area: Rect, scroll_x: u64, start: u64, size: u32) -> (Rect, u32) {
    let rel = start as i64 - scroll_x as i64;
    let clip_left = (-rel).max(0) as u32;
    let x = rel.clamp(0, area.width as i64) as u16;
    let max_w = area.width.saturating_sub(x);
    let visible_w = size.saturating_sub(clip_left).min(max_w as u32) as u16;
    (
        Rect::new(area.x + x, area.y, visible_w, area.height),
        clip_left,
    )
}

fn clipped_rect_y(area: Rect, scroll_y: u64, start: u64, size: u32) -> (Rect, u32) {
    let rel = start as i64 - scroll_y as i64;
    let clip_top = (-rel).max(0) as u32;
    let y = rel.clamp(0, area.height as i64) as u16;
    let max_h = area.height.saturating_sub(y);
    let visible_h = size.saturating_sub(clip_top).min(max_h as u32) as u16;
    (
        Rect::new(area.x, area.y + y, area.width, visible_h),
        clip_top,
    )
}
