//! Resolved grid styling and the flat, all-optional overlay it is configured from.
//!
//! Hosts usually keep a [`GridStyleConfig`] in their own config file and merge it over the
//! defaults:
//!
//! ```
//! use ratatui_grid_core::style::{GridStyle, GridStyleConfig};
//!
//! let cfg: GridStyleConfig = serde_json::from_str(r#"{ "zebra_odd_bg": "dark_gray" }"#).unwrap();
//! let style = GridStyle::merged(&cfg);
//! assert_eq!(style.zebra_odd.bg, Some(ratatui::style::Color::DarkGray));
//! ```

use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use serde::Deserialize;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridStyle {
    pub header_height: u16,
    pub row_height: u16,
    pub base: Style,
    pub header: Style,
    /// Column separators.
    pub border: Style,
    pub show_column_borders: bool,
    pub zebra_even: Style,
    pub zebra_odd: Style,
    pub hover: Style,
    pub selected: Style,
    pub cursor: Style,
    pub editing: Style,
    pub sort_indicator: Style,
    pub filter_indicator: Style,
    pub scrollbar: Style,
    pub popup: Style,
    pub popup_highlight: Style,
    pub empty: Style,
    pub error: Style,
}

impl Default for GridStyle {
    fn default() -> Self {
        use ratatui::style::Stylize;

        Self {
            header_height: 1,
            row_height: 1,
            base: Style::default(),
            header: Style::default().add_modifier(Modifier::BOLD),
            border: Style::default().dark_gray(),
            show_column_borders: true,
            zebra_even: Style::default(),
            zebra_odd: Style::default(),
            hover: Style::default().add_modifier(Modifier::DIM),
            selected: Style::default().cyan(),
            cursor: Style::default().add_modifier(Modifier::REVERSED),
            editing: Style::default().add_modifier(Modifier::UNDERLINED),
            sort_indicator: Style::default().cyan(),
            filter_indicator: Style::default().yellow(),
            scrollbar: Style::default().dark_gray(),
            popup: Style::default().bg(Color::Black),
            popup_highlight: Style::default().add_modifier(Modifier::REVERSED),
            empty: Style::default().dark_gray().add_modifier(Modifier::ITALIC),
            error: Style::default().red(),
        }
    }
}

/// Flat style overlay. Every field is optional; unset fields keep the default.
///
/// Colors use ratatui's serde names (`"red"`, `"dark_gray"`, `"#00ff7f"`, `"42"`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridStyleConfig {
    pub header_height: Option<u16>,
    pub row_height: Option<u16>,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub header_fg: Option<Color>,
    pub header_bg: Option<Color>,
    pub header_bold: Option<bool>,
    pub border_fg: Option<Color>,
    pub show_column_borders: Option<bool>,
    pub zebra_even_bg: Option<Color>,
    pub zebra_odd_bg: Option<Color>,
    pub hover_bg: Option<Color>,
    pub selected_fg: Option<Color>,
    pub selected_bg: Option<Color>,
    pub cursor_fg: Option<Color>,
    pub cursor_bg: Option<Color>,
    pub scrollbar_fg: Option<Color>,
}

impl GridStyle {
    pub fn merged(config: &GridStyleConfig) -> Self {
        let mut style = Self::default();
        style.apply(config);
        style
    }

    pub fn apply(&mut self, c: &GridStyleConfig) {
        if let Some(h) = c.header_height {
            self.header_height = h;
        }
        if let Some(h) = c.row_height {
            self.row_height = h.max(1);
        }
        self.base = with_colors(self.base, c.fg, c.bg);
        self.header = with_colors(self.header, c.header_fg, c.header_bg);
        match c.header_bold {
            Some(true) => self.header = self.header.add_modifier(Modifier::BOLD),
            Some(false) => self.header = self.header.remove_modifier(Modifier::BOLD),
            None => {}
        }
        self.border = with_colors(self.border, c.border_fg, None);
        if let Some(show) = c.show_column_borders {
            self.show_column_borders = show;
        }
        self.zebra_even = with_colors(self.zebra_even, None, c.zebra_even_bg);
        self.zebra_odd = with_colors(self.zebra_odd, None, c.zebra_odd_bg);
        if let Some(bg) = c.hover_bg {
            // A concrete color replaces the default dim effect.
            self.hover = Style::default().bg(bg);
        }
        self.selected = with_colors(self.selected, c.selected_fg, c.selected_bg);
        if c.cursor_fg.is_some() || c.cursor_bg.is_some() {
            self.cursor = with_colors(Style::default(), c.cursor_fg, c.cursor_bg);
        }
        self.scrollbar = with_colors(self.scrollbar, c.scrollbar_fg, None);
    }

    /// Row background for the `ordinal`-th visible row.
    pub fn zebra(&self, ordinal: usize) -> Style {
        if ordinal % 2 == 0 {
            self.zebra_even
        } else {
            self.zebra_odd
        }
    }
}

fn with_colors(mut style: Style, fg: Option<Color>, bg: Option<Color>) -> Style {
    if let Some(fg) = fg {
        style = style.fg(fg);
    }
    if let Some(bg) = bg {
        style = style.bg(bg);
    }
    style
}
