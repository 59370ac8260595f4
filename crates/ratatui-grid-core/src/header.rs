use crate::edit::EditCommand;
use crate::edit::EditSession;
use crate::edit::EditType;
use crate::error::GridError;
use crate::error::Result;
use crate::input::KeyEvent;
use crate::row::Row;
use crate::sort::SortDirection;
use crate::style::GridStyle;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Identity of a column.
///
/// `Index`, `Check` and `Button` are reserved: they do not read row data and render the row
/// ordinal, the selection checkbox and the action slot respectively.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeaderId {
    Index,
    Check,
    Button,
    Column(String),
}

impl HeaderId {
    pub fn parse(s: &str) -> Self {
        match s {
            "index" => HeaderId::Index,
            "check" => HeaderId::Check,
            "button" => HeaderId::Button,
            other => HeaderId::Column(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HeaderId::Index => "index",
            HeaderId::Check => "check",
            HeaderId::Button => "button",
            HeaderId::Column(key) => key,
        }
    }

    pub fn is_reserved(&self) -> bool {
        !matches!(self, HeaderId::Column(_))
    }

    /// The row field this header reads, if any.
    pub fn data_key(&self) -> Option<&str> {
        match self {
            HeaderId::Column(key) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for HeaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for HeaderId {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Which pane a column lives in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Pin {
    Left,
    #[default]
    View,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Sort capability of a column. `direction` is the initial direction only; the live state lives
/// in [`crate::sort::SortState`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sorter {
    pub sortable: bool,
    pub direction: Option<SortDirection>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterType {
    #[default]
    Text,
    Select,
}

/// Filter capability of a column. `filter_value` seeds [`crate::filter::FilterState`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterConfig {
    pub filter_type: FilterType,
    pub filter_value: String,
}

/// Context handed to custom cell renderers and formatters.
pub struct CellContext<'a> {
    pub cell_value: &'a Value,
    pub row: &'a Row,
    pub table_style: &'a GridStyle,
    pub is_selected: bool,
    pub is_cursor: bool,
}

/// Context handed to custom edit renderers while a session is open on their cell.
pub struct EditContext<'a> {
    pub session: &'a EditSession,
    pub row: &'a Row,
    pub table_style: &'a GridStyle,
}

/// What a custom cell's key handler asks the grid to write.
#[derive(Clone, Debug, PartialEq)]
pub enum CellCommand {
    SetCellValue(Value),
    UpdateRow(Row),
}

pub type CellRenderer = Arc<dyn Fn(Rect, &CellContext<'_>, &mut Buffer) + Send + Sync>;
pub type EditRenderer = Arc<dyn Fn(Rect, &EditContext<'_>, &mut Buffer) + Send + Sync>;
pub type Formatter = Arc<dyn Fn(&Value, &Row) -> String + Send + Sync>;
/// Key handler of a custom cell, called while the cursor sits on it outside edit mode.
/// Returning `None` lets the grid bindings handle the key.
pub type CellKeyHandler =
    Arc<dyn Fn(&KeyEvent, &CellContext<'_>) -> Option<CellCommand> + Send + Sync>;
/// Key handler paired with a custom edit renderer. Returning `None` falls back to the built-in
/// editing keys.
pub type EditKeyHandler =
    Arc<dyn Fn(&KeyEvent, &EditContext<'_>) -> Option<EditCommand> + Send + Sync>;

/// Column descriptor.
#[derive(Clone)]
pub struct Header {
    pub id: HeaderId,
    pub label: String,
    pub width: u16,
    pub pin: Pin,
    pub header_align: Align,
    pub data_align: Align,
    pub sorter: Sorter,
    pub filter: Option<FilterConfig>,
    pub edit_type: EditType,
    /// Choices of a `Select` editor or filter. Empty means derive them from the rows.
    pub options: Vec<String>,
    pub cell: Option<CellRenderer>,
    pub cell_keys: Option<CellKeyHandler>,
    pub edit_cell: Option<EditRenderer>,
    pub edit_keys: Option<EditKeyHandler>,
    pub formatter: Option<Formatter>,
}

impl Header {
    fn with_id(id: HeaderId, label: impl Into<String>, width: u16) -> Self {
        Self {
            id,
            label: label.into(),
            width,
            pin: Pin::View,
            header_align: Align::Left,
            data_align: Align::Left,
            sorter: Sorter::default(),
            filter: None,
            edit_type: EditType::None,
            options: Vec::new(),
            cell: None,
            cell_keys: None,
            edit_cell: None,
            edit_keys: None,
            formatter: None,
        }
    }

    /// A data column reading `key` from each row.
    pub fn column(key: impl Into<String>, label: impl Into<String>, width: u16) -> Self {
        Self::with_id(HeaderId::Column(key.into()), label, width)
    }

    /// The synthetic 1-based row ordinal.
    pub fn index(width: u16) -> Self {
        let mut h = Self::with_id(HeaderId::Index, "#", width);
        h.data_align = Align::Right;
        h
    }

    /// The selection checkbox column. Requires selection to be enabled on the controller.
    pub fn check() -> Self {
        let mut h = Self::with_id(HeaderId::Check, "", 3);
        h.header_align = Align::Center;
        h.data_align = Align::Center;
        h
    }

    /// The per-row action slot (delete).
    pub fn button(label: impl Into<String>, width: u16) -> Self {
        let mut h = Self::with_id(HeaderId::Button, label, width);
        h.data_align = Align::Center;
        h
    }

    pub fn pin(mut self, pin: Pin) -> Self {
        self.pin = pin;
        self
    }

    pub fn header_align(mut self, align: Align) -> Self {
        self.header_align = align;
        self
    }

    pub fn data_align(mut self, align: Align) -> Self {
        self.data_align = align;
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sorter.sortable = sortable;
        self
    }

    pub fn sorted(mut self, direction: SortDirection) -> Self {
        self.sorter.sortable = true;
        self.sorter.direction = Some(direction);
        self
    }

    pub fn filter(mut self, filter_type: FilterType) -> Self {
        self.filter = Some(FilterConfig {
            filter_type,
            filter_value: String::new(),
        });
        self
    }

    pub fn filter_value(mut self, value: impl Into<String>) -> Self {
        let filter = self.filter.get_or_insert_with(FilterConfig::default);
        filter.filter_value = value.into();
        self
    }

    pub fn editable(mut self, edit_type: EditType) -> Self {
        self.edit_type = edit_type;
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn cell(mut self, f: impl Fn(Rect, &CellContext<'_>, &mut Buffer) + Send + Sync + 'static) -> Self {
        self.cell = Some(Arc::new(f));
        self
    }

    pub fn cell_keys(
        mut self,
        f: impl Fn(&KeyEvent, &CellContext<'_>) -> Option<CellCommand> + Send + Sync + 'static,
    ) -> Self {
        self.cell_keys = Some(Arc::new(f));
        self
    }

    pub fn edit_cell(
        mut self,
        f: impl Fn(Rect, &EditContext<'_>, &mut Buffer) + Send + Sync + 'static,
    ) -> Self {
        self.edit_cell = Some(Arc::new(f));
        self
    }

    pub fn edit_keys(
        mut self,
        f: impl Fn(&KeyEvent, &EditContext<'_>) -> Option<EditCommand> + Send + Sync + 'static,
    ) -> Self {
        self.edit_keys = Some(Arc::new(f));
        self
    }

    pub fn formatter(mut self, f: impl Fn(&Value, &Row) -> String + Send + Sync + 'static) -> Self {
        self.formatter = Some(Arc::new(f));
        self
    }

    pub fn is_sortable(&self) -> bool {
        self.sorter.sortable && !matches!(self.id, HeaderId::Check | HeaderId::Button)
    }

    pub fn is_filterable(&self) -> bool {
        self.filter.is_some() && self.id.data_key().is_some()
    }

    /// Text shown in a body cell when no custom renderer is set.
    pub fn display_text(&self, row: &Row) -> String {
        let Some(key) = self.id.data_key() else {
            return String::new();
        };
        match (&self.formatter, row.get(key)) {
            (Some(fmt), Some(value)) => fmt(value, row),
            (Some(fmt), None) => fmt(&Value::Null, row),
            (None, _) => row.display(key),
        }
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("width", &self.width)
            .field("pin", &self.pin)
            .field("sorter", &self.sorter)
            .field("filter", &self.filter)
            .field("edit_type", &self.edit_type)
            .field("options", &self.options)
            .field("cell", &self.cell.is_some())
            .field("cell_keys", &self.cell_keys.is_some())
            .field("edit_cell", &self.edit_cell.is_some())
            .field("edit_keys", &self.edit_keys.is_some())
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

/// Ordered, id-unique list of headers.
#[derive(Clone, Debug, Default)]
pub struct HeaderRegistry {
    headers: Vec<Header>,
}

impl HeaderRegistry {
    pub fn new(headers: Vec<Header>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for h in &headers {
            if !seen.insert(&h.id) {
                return Err(GridError::DuplicateHeader(h.id.to_string()));
            }
        }
        Ok(Self { headers })
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.headers.iter()
    }

    pub fn as_slice(&self) -> &[Header] {
        &self.headers
    }

    pub fn get(&self, id: &HeaderId) -> Option<&Header> {
        self.headers.iter().find(|h| &h.id == id)
    }

    pub fn at(&self, position: usize) -> Option<&Header> {
        self.headers.get(position)
    }

    pub fn position(&self, id: &HeaderId) -> Option<usize> {
        self.headers.iter().position(|h| &h.id == id)
    }

    pub fn contains(&self, id: &HeaderId) -> bool {
        self.position(id).is_some()
    }

    pub fn has_check(&self) -> bool {
        self.contains(&HeaderId::Check)
    }

    /// Row fields read by data columns, in declaration order.
    pub fn data_keys(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().filter_map(|h| h.id.data_key())
    }
}
