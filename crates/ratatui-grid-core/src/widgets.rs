//! Rendering capabilities for the presentational atoms the grid draws through.
//!
//! The grid never styles a checkbox, text input or select itself; it hands the props to a
//! renderer. [`DefaultWidgets`] draws plain ratatui primitives and is what the controller uses
//! unless the host substitutes its own.

use crate::render::render_str_clipped;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::style::Style;
use unicode_width::UnicodeWidthStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckboxProps<'a> {
    pub checked: bool,
    /// Indeterminate: some but not all of the governed rows are checked.
    pub partial: bool,
    pub label: &'a str,
    pub style: Style,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextInputProps<'a> {
    pub value: &'a str,
    /// Caret position in chars.
    pub cursor: usize,
    pub focused: bool,
    pub style: Style,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectProps<'a> {
    pub value: &'a str,
    pub options: &'a [String],
    pub highlighted: usize,
    pub open: bool,
    pub style: Style,
    pub highlight_style: Style,
}

pub trait CheckboxRenderer {
    fn render_checkbox(&self, area: Rect, buf: &mut Buffer, props: CheckboxProps<'_>);
}

pub trait TextInputRenderer {
    fn render_text_input(&self, area: Rect, buf: &mut Buffer, props: TextInputProps<'_>);
}

pub trait SelectRenderer {
    /// Draws the closed control into `area`. When `props.open`, also draws the option list
    /// into `popup`, which may extend past `area`.
    fn render_select(&self, area: Rect, popup: Rect, buf: &mut Buffer, props: SelectProps<'_>);
}

/// The full set of atoms the grid needs.
pub trait GridWidgets: CheckboxRenderer + TextInputRenderer + SelectRenderer {}

impl<T: CheckboxRenderer + TextInputRenderer + SelectRenderer> GridWidgets for T {}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultWidgets;

impl CheckboxRenderer for DefaultWidgets {
    fn render_checkbox(&self, area: Rect, buf: &mut Buffer, props: CheckboxProps<'_>) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let mark = if props.checked {
            "[x]"
        } else if props.partial {
            "[-]"
        } else {
            "[ ]"
        };
        let text = if props.label.is_empty() {
            mark.to_string()
        } else {
            format!("{mark} {}", props.label)
        };
        let w = text.width().min(area.width as usize) as u16;
        let x = area.x + (area.width - w) / 2;
        render_str_clipped(x, area.y, 0, w, buf, &text, props.style);
    }
}

impl TextInputRenderer for DefaultWidgets {
    fn render_text_input(&self, area: Rect, buf: &mut Buffer, props: TextInputProps<'_>) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let style = props.style.add_modifier(Modifier::UNDERLINED);
        buf.set_style(Rect::new(area.x, area.y, area.width, 1), style);

        // Keep the caret inside the box by scrolling the text horizontally.
        let before: String = props.value.chars().take(props.cursor).collect();
        let caret_col = before.width() as u32;
        let start_col = caret_col.saturating_sub(area.width.saturating_sub(1) as u32);
        render_str_clipped(area.x, area.y, start_col, area.width, buf, props.value, style);

        if props.focused {
            let x = area.x + (caret_col - start_col) as u16;
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_style(style.add_modifier(Modifier::REVERSED));
            }
        }
    }
}

impl SelectRenderer for DefaultWidgets {
    fn render_select(&self, area: Rect, popup: Rect, buf: &mut Buffer, props: SelectProps<'_>) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        buf.set_style(Rect::new(area.x, area.y, area.width, 1), props.style);
        let text_w = area.width.saturating_sub(2);
        render_str_clipped(area.x, area.y, 0, text_w, buf, props.value, props.style);
        if area.width >= 1 {
            buf.set_stringn(area.x + area.width - 1, area.y, "▾", 1, props.style);
        }

        if !props.open || popup.width == 0 || popup.height == 0 {
            return;
        }
        // Scroll the list so the highlighted option stays visible.
        let rows = popup.height as usize;
        let first = props.highlighted.saturating_sub(rows.saturating_sub(1));
        for (dy, (i, option)) in props
            .options
            .iter()
            .enumerate()
            .skip(first)
            .take(rows)
            .enumerate()
        {
            let style = if i == props.highlighted {
                props.highlight_style
            } else {
                props.style
            };
            let y = popup.y + dy as u16;
            buf.set_style(Rect::new(popup.x, y, popup.width, 1), style);
            render_str_clipped(popup.x, y, 0, popup.width, buf, option, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn checkbox_marks() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 3, 3));
        for (y, (checked, partial)) in [(true, false), (false, true), (false, false)].into_iter().enumerate() {
            DefaultWidgets.render_checkbox(
                Rect::new(0, y as u16, 3, 1),
                &mut buf,
                CheckboxProps {
                    checked,
                    partial,
                    label: "",
                    style: Style::default(),
                },
            );
        }
        assert_eq!(line(&buf, 0), "[x]");
        assert_eq!(line(&buf, 1), "[-]");
        assert_eq!(line(&buf, 2), "[ ]");
    }

    #[test]
    fn text_input_scrolls_to_caret() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 1));
        DefaultWidgets.render_text_input(
            Rect::new(0, 0, 4, 1),
            &mut buf,
            TextInputProps {
                value: "abcdefg",
                cursor: 7,
                focused: true,
                style: Style::default(),
            },
        );
        assert_eq!(line(&buf, 0), "efg ");
        assert!(buf.cell((3, 0)).unwrap().modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn open_select_lists_options() {
        let options = vec!["Lima".to_string(), "Oslo".to_string()];
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 3));
        DefaultWidgets.render_select(
            Rect::new(0, 0, 6, 1),
            Rect::new(0, 1, 6, 2),
            &mut buf,
            SelectProps {
                value: "Lima",
                options: &options,
                highlighted: 1,
                open: true,
                style: Style::default(),
                highlight_style: Style::default().add_modifier(Modifier::REVERSED),
            },
        );
        assert_eq!(line(&buf, 0), "Lima ▾");
        assert_eq!(line(&buf, 1), "Lima  ");
        assert_eq!(line(&buf, 2), "Oslo  ");
        assert!(buf.cell((0, 2)).unwrap().modifier.contains(Modifier::REVERSED));
    }
}
