//! The single writer of grid state.
//!
//! [`GridController`] owns the headers, the rows, sort/filter/selection state, the edit machine
//! and every scroll position. Panes only ever see a read-only [`PaneContext`] for one frame;
//! interaction comes back in through [`GridController::handle_event`] and leaves as a
//! [`GridAction`] the host can react to (persist a cell, confirm a delete, sync a selection).
//!
//! The pipeline runs synchronously on every state change:
//!
//! ```text
//! rows --filter--> positions --sort--> view order --virtualize--> window --> panes
//! ```

use crate::edit::CellKey;
use crate::edit::EditCommand;
use crate::edit::EditMachine;
use crate::edit::EditNotice;
use crate::edit::EditOutcome;
use crate::edit::Notifier;
use crate::edit::TracingNotifier;
use crate::easing::DEFAULT_SCROLL_DURATION;
use crate::easing::ScrollAnimator;
use crate::easing::ScrollStep;
use crate::error::GridError;
use crate::error::Result;
use crate::filter::FilterState;
use crate::filter::apply_filters;
use crate::filter::select_options;
use crate::header::CellCommand;
use crate::header::CellContext;
use crate::header::EditContext;
use crate::header::Header;
use crate::header::HeaderId;
use crate::header::HeaderRegistry;
use crate::input::GridEvent;
use crate::input::KeyEvent;
use crate::input::MouseButton;
use crate::input::MouseEvent;
use crate::input::MouseEventKind;
use crate::keymap::GridBindings;
use crate::keymap::GridCommand;
use crate::layout::PaneLayout;
use crate::render::ScrollExtent;
use crate::row::INDEX_KEY;
use crate::row::Row;
use crate::row::RowKey;
use crate::row::validate_rows;
use crate::scroll::ScrollSource;
use crate::scroll::ScrollSync;
use crate::selection::SelectionEngine;
use crate::selection::TriState;
use crate::sort::SortDirection;
use crate::sort::SortMode;
use crate::sort::SortState;
use crate::sort::compute_sort;
use crate::style::GridStyle;
use crate::style::GridStyleConfig;
use crate::view::GridCursor;
use crate::view::PaneContext;
use crate::view::RenderedRegions;
use crate::view::grid_bands;
use crate::view::render_grid;
use crate::virtual_rows::RowVirtualizer;
use crate::virtual_rows::ScrollAlign;
use crate::virtual_rows::VirtualWindow;
use crate::widgets::DefaultWidgets;
use crate::widgets::GridWidgets;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use serde_json::Value;
use std::collections::BTreeSet;
use std::time::Duration;
use std::time::Instant;

#[derive(Clone, Debug)]
pub struct GridOptions {
    pub overscan: usize,
    pub sort_mode: SortMode,
    /// Cells can only enter edit mode while this is on.
    pub edit_enabled: bool,
    /// Required for a `check` column.
    pub selection_enabled: bool,
    /// Row field selection is keyed by.
    pub data_key: String,
    /// Duration of eased scroll-to. Zero jumps.
    pub scroll_duration: Duration,
    /// Max gap between two clicks on the same cell to count as a double click.
    pub double_click: Duration,
    /// Width reserved for the body's vertical scrollbar when it overflows.
    pub gutter_width: u16,
    /// Rows per wheel notch.
    pub wheel_step: u16,
    pub bindings: GridBindings,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            overscan: 3,
            sort_mode: SortMode::Single,
            edit_enabled: false,
            selection_enabled: false,
            data_key: INDEX_KEY.to_string(),
            scroll_duration: DEFAULT_SCROLL_DURATION,
            double_click: Duration::from_millis(400),
            gutter_width: 1,
            wheel_step: 3,
            bindings: GridBindings::default(),
        }
    }
}

/// What an interaction did, for the host to persist or mirror.
#[derive(Clone, Debug, PartialEq)]
pub enum GridAction {
    None,
    Redraw,
    SortChanged {
        column: HeaderId,
        direction: Option<SortDirection>,
    },
    SelectionChanged(Vec<RowKey>),
    CellUpdated {
        index: u64,
        key: String,
        value: Value,
    },
    /// A custom cell or editor replaced the row with this index.
    RowUpdated(u64),
    /// The row with this index was removed.
    DeleteRow(u64),
    EditStarted(CellKey),
    EditCancelled(CellKey),
    EditRejected {
        cell: CellKey,
        message: String,
    },
}

impl GridAction {
    pub fn needs_redraw(&self) -> bool {
        !matches!(self, GridAction::None)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Hit {
    Header { col: usize },
    Cell { row: usize, col: usize },
}

pub struct GridController {
    options: GridOptions,
    style: GridStyle,
    headers: HeaderRegistry,
    rows: Vec<Row>,
    sort: SortState,
    filter: FilterState,
    selection: SelectionEngine,
    edit: EditMachine,
    notifier: Box<dyn Notifier>,
    error: Option<GridError>,

    view_order: Vec<usize>,
    visible_keys: Vec<RowKey>,

    virtualizer: RowVirtualizer,
    animator: ScrollAnimator,
    scroll: ScrollSync,
    layout: PaneLayout,
    area: Rect,
    regions: RenderedRegions,

    cursor: Option<GridCursor>,
    hover_row: Option<usize>,
    check_anchor: Option<usize>,
    last_click: Option<(u64, usize, Instant)>,
    last_tick: Option<Instant>,
    dirty: bool,
}

impl Default for GridController {
    fn default() -> Self {
        Self::new(GridOptions::default())
    }
}

impl GridController {
    pub fn new(options: GridOptions) -> Self {
        let style = GridStyle::default();
        Self {
            sort: SortState::new(options.sort_mode),
            edit: EditMachine::new(options.edit_enabled),
            virtualizer: RowVirtualizer::new(style.row_height as u32, options.overscan),
            animator: ScrollAnimator::new(options.scroll_duration),
            options,
            style,
            headers: HeaderRegistry::default(),
            rows: Vec::new(),
            filter: FilterState::default(),
            selection: SelectionEngine::new(),
            notifier: Box::new(TracingNotifier),
            error: None,
            view_order: Vec::new(),
            visible_keys: Vec::new(),
            scroll: ScrollSync::default(),
            layout: PaneLayout::default(),
            area: Rect::default(),
            regions: RenderedRegions::default(),
            cursor: None,
            hover_row: None,
            check_anchor: None,
            last_click: None,
            last_tick: None,
            dirty: false,
        }
    }

    /// Builds a controller and installs `headers`, failing fast on a wiring mistake.
    pub fn with_headers(options: GridOptions, headers: Vec<Header>) -> Result<Self> {
        let mut grid = Self::new(options);
        grid.set_headers(headers)?;
        Ok(grid)
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn style(&self) -> &GridStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: GridStyle) {
        self.virtualizer.set_row_height(style.row_height as u32);
        self.style = style;
        self.relayout();
    }

    pub fn apply_style_config(&mut self, config: &GridStyleConfig) {
        let mut style = self.style.clone();
        style.apply(config);
        self.set_style(style);
    }

    pub fn set_notifier(&mut self, notifier: impl Notifier + 'static) {
        self.notifier = Box::new(notifier);
    }

    /// Host-level selection sync: called with every selected key after each change.
    pub fn on_selection_change(&mut self, f: impl FnMut(&[RowKey]) + 'static) {
        self.selection.on_change(f);
    }

    // ---- data ----

    pub fn set_headers(&mut self, headers: Vec<Header>) -> Result<()> {
        let registry = HeaderRegistry::new(headers).and_then(|reg| {
            if reg.has_check() && !self.options.selection_enabled {
                Err(GridError::SelectionNotWired)
            } else {
                Ok(reg)
            }
        });
        let registry = match registry {
            Ok(reg) => reg,
            Err(err) => {
                tracing::error!(%err, "rejected headers");
                self.error = Some(err.clone());
                return Err(err);
            }
        };

        self.edit.cancel();
        self.sort = SortState::from_headers(&registry, self.options.sort_mode);
        self.filter = FilterState::from_headers(&registry);
        self.headers = registry;
        self.error = validate_rows(&self.headers, &self.rows, &self.options.data_key).err();
        self.refresh();
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Replaces the row list. Rows missing a field the headers read are stored but the grid
    /// refuses to render them until the data or the headers are fixed.
    pub fn set_rows(&mut self, rows: Vec<Row>) -> Result<()> {
        self.edit.cancel();
        self.rows = rows;
        self.retain_selection();
        let checked = validate_rows(&self.headers, &self.rows, &self.options.data_key);
        self.error = checked.clone().err();
        if let Err(err) = &checked {
            tracing::error!(%err, "rejected rows");
        }
        self.refresh();
        checked
    }

    /// Re-runs the configuration and data-shape checks.
    pub fn validate(&self) -> Result<()> {
        if self.headers.has_check() && !self.options.selection_enabled {
            return Err(GridError::SelectionNotWired);
        }
        validate_rows(&self.headers, &self.rows, &self.options.data_key)
    }

    pub fn error(&self) -> Option<&GridError> {
        self.error.as_ref()
    }

    pub fn headers(&self) -> &HeaderRegistry {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: u64) -> Option<&Row> {
        self.rows.iter().find(|r| r.index == index)
    }

    fn row_position(&self, index: u64) -> Result<usize> {
        self.rows
            .iter()
            .position(|r| r.index == index)
            .ok_or(GridError::UnknownRow(index))
    }

    /// Positions into [`Self::rows`] after filtering and sorting.
    pub fn view_order(&self) -> &[usize] {
        &self.view_order
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        self.view_order.iter().filter_map(|&i| self.rows.get(i))
    }

    fn visible_row(&self, pos: usize) -> Option<&Row> {
        self.view_order.get(pos).and_then(|&i| self.rows.get(i))
    }

    pub fn visible_keys(&self) -> &[RowKey] {
        &self.visible_keys
    }

    /// Writes `value` into `row[key]` and re-runs the pipeline.
    pub fn update_cell(&mut self, index: u64, key: &str, value: Value) -> Result<()> {
        let known = self.headers.contains(&HeaderId::Column(key.to_string()))
            || self.rows.iter().any(|r| r.get(key).is_some());
        if !known {
            return Err(GridError::UnknownColumn(key.to_string()));
        }
        let pos = self.row_position(index)?;
        self.rows[pos].set(key, value);
        tracing::debug!(index, key, "cell updated");
        if key == self.options.data_key {
            self.retain_selection();
        }
        self.refresh();
        Ok(())
    }

    /// Replaces the row carrying `row.index`.
    pub fn update_row(&mut self, row: Row) -> Result<()> {
        let pos = self.row_position(row.index)?;
        validate_rows(&self.headers, std::slice::from_ref(&row), &self.options.data_key)?;
        self.rows[pos] = row;
        self.retain_selection();
        self.refresh();
        Ok(())
    }

    pub fn delete_row(&mut self, index: u64) -> Result<Row> {
        let pos = self.row_position(index)?;
        if self
            .edit
            .session()
            .is_some_and(|s| s.cell.index == index)
        {
            self.edit.cancel();
        }
        let row = self.rows.remove(pos);
        tracing::debug!(index, "row deleted");
        self.retain_selection();
        self.refresh();
        Ok(row)
    }

    fn retain_selection(&mut self) {
        let existing: BTreeSet<RowKey> = self
            .rows
            .iter()
            .map(|r| r.key(&self.options.data_key))
            .collect();
        self.selection.retain_existing(&existing);
    }

    fn refresh(&mut self) {
        let filtered = apply_filters(&self.headers, &self.rows, &self.filter);
        self.view_order = compute_sort(&self.headers, &self.rows, &filtered, &self.sort);
        self.visible_keys = self
            .view_order
            .iter()
            .map(|&i| self.rows[i].key(&self.options.data_key))
            .collect();
        self.virtualizer.set_row_count(self.view_order.len());
        self.cursor = match self.cursor {
            Some(c) if !self.view_order.is_empty() && !self.headers.is_empty() => Some(GridCursor {
                row: c.row.min(self.view_order.len() - 1),
                col: c.col.min(self.headers.len() - 1),
            }),
            _ => None,
        };
        if self.hover_row.is_some_and(|h| h >= self.view_order.len()) {
            self.hover_row = None;
        }
        self.relayout();
    }

    // ---- sort / filter ----

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn toggle_sort(&mut self, id: &HeaderId) -> GridAction {
        if !self.headers.get(id).is_some_and(|h| h.is_sortable()) {
            return GridAction::None;
        }
        let direction = self.sort.toggle(&self.headers, id);
        self.refresh();
        GridAction::SortChanged {
            column: id.clone(),
            direction,
        }
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    pub fn set_filter(&mut self, id: &HeaderId, value: impl Into<String>) -> GridAction {
        if !self.headers.get(id).is_some_and(|h| h.is_filterable()) {
            return GridAction::None;
        }
        let value = value.into();
        tracing::debug!(header = %id, value = %value, "filter changed");
        self.filter.set(id, value);
        self.refresh();
        GridAction::Redraw
    }

    pub fn clear_filters(&mut self) -> GridAction {
        if !self.filter.is_active() {
            return GridAction::None;
        }
        self.filter.clear();
        self.refresh();
        GridAction::Redraw
    }

    /// Choices for a select-type filter (or select editor) on `id`: the header's declared
    /// options, or else the distinct values of the column.
    pub fn filter_options(&self, id: &HeaderId) -> Vec<String> {
        match (self.headers.get(id), id.data_key()) {
            (Some(h), _) if !h.options.is_empty() => h.options.clone(),
            (_, Some(key)) => select_options(&self.rows, key),
            _ => Vec::new(),
        }
    }

    // ---- selection ----

    pub fn selection(&self) -> &SelectionEngine {
        &self.selection
    }

    pub fn selected_keys(&self) -> Vec<RowKey> {
        self.selection.selected().cloned().collect()
    }

    pub fn is_checked(&self, index: u64) -> bool {
        self.row(index)
            .is_some_and(|r| self.selection.is_checked(&r.key(&self.options.data_key)))
    }

    pub fn tri_state(&self) -> TriState {
        self.selection.tri_state(&self.visible_keys)
    }

    pub fn toggle_row(&mut self, index: u64) -> Result<GridAction> {
        if !self.options.selection_enabled {
            return Ok(GridAction::None);
        }
        let pos = self.row_position(index)?;
        let key = self.rows[pos].key(&self.options.data_key);
        self.selection.toggle(key);
        Ok(GridAction::SelectionChanged(self.selected_keys()))
    }

    fn toggle_row_at(&mut self, pos: usize) -> GridAction {
        if !self.options.selection_enabled {
            return GridAction::None;
        }
        let Some(key) = self.visible_keys.get(pos).cloned() else {
            return GridAction::None;
        };
        self.selection.toggle(key);
        self.check_anchor = Some(pos);
        GridAction::SelectionChanged(self.selected_keys())
    }

    fn select_range_to(&mut self, pos: usize) -> GridAction {
        let Some(anchor) = self.check_anchor else {
            return self.toggle_row_at(pos);
        };
        let (lo, hi) = if anchor <= pos { (anchor, pos) } else { (pos, anchor) };
        let hi = hi.min(self.visible_keys.len().saturating_sub(1));
        if lo > hi || self.visible_keys.is_empty() {
            return GridAction::None;
        }
        self.selection.select_range(&self.visible_keys[lo..=hi]);
        GridAction::SelectionChanged(self.selected_keys())
    }

    /// Selects every visible row, or clears the selection when they already all are.
    pub fn toggle_all(&mut self) -> GridAction {
        if !self.options.selection_enabled {
            return GridAction::None;
        }
        self.selection.toggle_all(&self.visible_keys);
        GridAction::SelectionChanged(self.selected_keys())
    }

    // ---- editing ----

    pub fn edit(&self) -> &EditMachine {
        &self.edit
    }

    pub fn set_edit_enabled(&mut self, enabled: bool) -> GridAction {
        self.options.edit_enabled = enabled;
        let outcome = self.edit.set_enabled(enabled);
        self.apply_edit_outcome(outcome)
    }

    /// Opens an edit session on `row[key]`. An open session elsewhere is committed first.
    pub fn begin_edit(&mut self, index: u64, key: &str) -> Result<GridAction> {
        let id = HeaderId::Column(key.to_string());
        let header = self
            .headers
            .get(&id)
            .ok_or_else(|| GridError::UnknownColumn(key.to_string()))?;
        let edit_type = header.edit_type;
        let current = self
            .row(index)
            .ok_or(GridError::UnknownRow(index))?
            .display(key);
        if !self.edit.is_enabled() {
            return Ok(GridAction::None);
        }

        let cell = CellKey::new(index, key);
        if self.edit.is_editing_cell(&cell) {
            return Ok(GridAction::None);
        }
        if self.edit.is_editing() {
            let outcome = self.edit.commit();
            let action = self.apply_edit_outcome(outcome);
            if self.edit.is_editing() {
                return Ok(action);
            }
        }

        let options = self.filter_options(&id);
        if self.edit.begin(cell.clone(), edit_type, current, options) {
            Ok(GridAction::EditStarted(cell))
        } else {
            Ok(GridAction::None)
        }
    }

    pub fn commit_edit(&mut self) -> GridAction {
        let outcome = self.edit.commit();
        self.apply_edit_outcome(outcome)
    }

    pub fn cancel_edit(&mut self) -> GridAction {
        let outcome = self.edit.cancel();
        self.apply_edit_outcome(outcome)
    }

    fn apply_edit_outcome(&mut self, outcome: EditOutcome) -> GridAction {
        match outcome {
            EditOutcome::Ignored => GridAction::None,
            EditOutcome::Redraw | EditOutcome::Swallowed => GridAction::Redraw,
            EditOutcome::Cancel { cell } => GridAction::EditCancelled(cell),
            EditOutcome::Rejected { cell, message } => self.reject_edit(cell, message),
            EditOutcome::Commit { cell, value } => self.write_edit(cell, value),
        }
    }

    fn reject_edit(&mut self, cell: CellKey, message: String) -> GridAction {
        self.notifier.notify(&EditNotice {
            cell: cell.clone(),
            message: message.clone(),
        });
        GridAction::EditRejected { cell, message }
    }

    fn write_edit(&mut self, cell: CellKey, text: String) -> GridAction {
        if self.row(cell.index).is_some_and(|r| r.display(&cell.key) == text) {
            return GridAction::Redraw;
        }
        let previous = self.row(cell.index).and_then(|r| r.get(&cell.key)).cloned();
        let value = match coerce_like(&cell.key, previous.as_ref(), text) {
            Ok(v) => v,
            Err(err) => return self.reject_edit(cell, err.to_string()),
        };
        if previous.as_ref() == Some(&value) {
            return GridAction::Redraw;
        }
        match self.update_cell(cell.index, &cell.key, value.clone()) {
            Ok(()) => GridAction::CellUpdated {
                index: cell.index,
                key: cell.key,
                value,
            },
            Err(err) => {
                tracing::warn!(%err, cell = %cell, "edit target vanished");
                GridAction::Redraw
            }
        }
    }

    /// Writes what a custom cell or editor asked for.
    fn apply_cell_command(&mut self, cell: CellKey, command: CellCommand) -> GridAction {
        let written = match command {
            CellCommand::SetCellValue(value) => self
                .update_cell(cell.index, &cell.key, value.clone())
                .map(|()| GridAction::CellUpdated {
                    index: cell.index,
                    key: cell.key.clone(),
                    value,
                }),
            CellCommand::UpdateRow(row) => {
                let index = row.index;
                self.update_row(row).map(|()| GridAction::RowUpdated(index))
            }
        };
        let action = match written {
            Ok(action) => action,
            Err(err) => {
                tracing::warn!(%err, cell = %cell, "cell command rejected");
                return GridAction::None;
            }
        };
        if let Some(value) = self.row(cell.index).map(|r| r.display(&cell.key)) {
            self.edit.rebase(value);
        }
        action
    }

    // ---- scrolling ----

    pub fn window(&self) -> &VirtualWindow {
        self.virtualizer.window()
    }

    pub fn layout(&self) -> &PaneLayout {
        &self.layout
    }

    pub fn scroll_top(&self) -> u64 {
        self.virtualizer.scroll_top()
    }

    pub fn total_height(&self) -> u64 {
        self.virtualizer.total_height()
    }

    pub fn header_left(&self) -> u32 {
        self.scroll.header_left()
    }

    pub fn body_left(&self) -> u32 {
        self.scroll.body_left()
    }

    pub fn is_scrolling(&self) -> bool {
        self.animator.is_animating()
    }

    /// Jumps to `top`, cancelling any eased scroll.
    pub fn set_scroll_top(&mut self, top: u64) -> u64 {
        self.animator.cancel();
        self.virtualizer.set_scroll_top(top)
    }

    pub fn scroll_by(&mut self, delta: i64) -> u64 {
        self.animator.cancel();
        self.virtualizer.scroll_by(delta)
    }

    /// Starts an eased scroll bringing view position `pos` into view. Returns the request id; a
    /// later request supersedes this one.
    pub fn scroll_to_row(&mut self, pos: usize, align: ScrollAlign, now: Instant) -> u64 {
        let target = self.virtualizer.offset_for(pos, align);
        let id = self.animator.start(self.virtualizer.scroll_top(), target, now);
        if self.animator.duration().is_zero() {
            self.tick(now);
        }
        id
    }

    /// Like [`Self::scroll_to_row`], addressing the row by its `index`.
    pub fn scroll_to_index(&mut self, index: u64, align: ScrollAlign, now: Instant) -> Result<u64> {
        let pos = self
            .view_order
            .iter()
            .position(|&i| self.rows[i].index == index)
            .ok_or(GridError::UnknownRow(index))?;
        Ok(self.scroll_to_row(pos, align, now))
    }

    pub fn set_scroll_left(&mut self, source: ScrollSource, left: u32) -> bool {
        self.scroll.on_scroll(source, left)
    }

    /// Advances animations to `now`. Returns `true` when the grid needs a redraw.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut redraw = std::mem::take(&mut self.dirty);
        if let Some(step) = self.animator.tick(now) {
            match step {
                ScrollStep::Moving(top) | ScrollStep::Done(top) => {
                    self.virtualizer.set_scroll_top(top);
                    redraw = true;
                }
                ScrollStep::Superseded => {}
            }
        }
        let dt = self
            .last_tick
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or_default();
        self.last_tick = Some(now);
        if let Some(session) = self.edit.session() {
            let settled = session.popup().is_settled();
            self.edit.advance(dt);
            redraw |= !settled;
        }
        redraw
    }

    // ---- layout ----

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn set_area(&mut self, area: Rect) {
        if self.area == area {
            return;
        }
        self.area = area;
        self.relayout();
    }

    /// Push-based resize; keeps the current origin.
    pub fn set_container_size(&mut self, width: u16, height: u16) {
        self.set_area(Rect::new(self.area.x, self.area.y, width, height));
    }

    fn relayout(&mut self) {
        let (_, body) = grid_bands(self.area, self.style.header_height);
        self.virtualizer.set_viewport_height(body.height as u32);
        let extent = ScrollExtent {
            offset: self.virtualizer.scroll_top(),
            viewport: body.height as u64,
            content: self.virtualizer.total_height(),
        };
        let gutter = if extent.overflows() {
            self.options.gutter_width
        } else {
            0
        };
        self.layout = PaneLayout::compute(&self.headers, self.area.width, gutter);
        self.scroll.set_max_left(self.layout.center_overflow());
    }

    // ---- cursor ----

    pub fn cursor(&self) -> Option<GridCursor> {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Option<GridCursor>) {
        self.cursor = cursor.filter(|c| c.row < self.view_order.len() && c.col < self.headers.len());
        self.ensure_cursor_visible();
    }

    pub fn hover_row(&self) -> Option<usize> {
        self.hover_row
    }

    pub fn set_hover_row(&mut self, pos: Option<usize>) -> bool {
        let pos = pos.filter(|p| *p < self.view_order.len());
        if self.hover_row == pos {
            return false;
        }
        self.hover_row = pos;
        true
    }

    fn move_cursor(&mut self, drow: i64, dcol: i64) -> GridAction {
        if self.view_order.is_empty() || self.headers.is_empty() {
            self.cursor = None;
            return GridAction::None;
        }
        let Some(c) = self.cursor else {
            self.set_cursor(Some(GridCursor::default()));
            return GridAction::Redraw;
        };
        let row = (c.row as i64 + drow).clamp(0, self.view_order.len() as i64 - 1) as usize;
        let col = (c.col as i64 + dcol).clamp(0, self.headers.len() as i64 - 1) as usize;
        self.set_cursor(Some(GridCursor { row, col }));
        GridAction::Redraw
    }

    fn ensure_cursor_visible(&mut self) {
        let Some(c) = self.cursor else {
            return;
        };
        let top = self.virtualizer.offset_for(c.row, ScrollAlign::Auto);
        self.set_scroll_top(top);

        let Some(col) = self.layout.center.columns.iter().find(|z| z.header == c.col) else {
            return;
        };
        let view_w = self.layout.center_viewport_width() as u32;
        let left = self.scroll.body_left();
        let next = if col.start < left {
            col.start
        } else if col.end() > left + view_w {
            col.end().saturating_sub(view_w)
        } else {
            left
        };
        self.scroll.on_scroll(ScrollSource::Body, next);
    }

    fn page_rows(&self) -> i64 {
        let (_, body) = grid_bands(self.area, self.style.header_height);
        (body.height / self.style.row_height.max(1)).max(1) as i64
    }

    // ---- events ----

    pub fn handle_event(&mut self, event: GridEvent) -> GridAction {
        self.handle_event_at(event, Instant::now())
    }

    /// Event entry point with an explicit clock, for double-click detection and scroll-to.
    pub fn handle_event_at(&mut self, event: GridEvent, now: Instant) -> GridAction {
        if self.error.is_some() {
            return match event {
                GridEvent::Resize { width, height } => {
                    self.set_container_size(width, height);
                    GridAction::Redraw
                }
                _ => GridAction::None,
            };
        }
        match event {
            GridEvent::Key(key) => self.handle_key(&key, now),
            GridEvent::Mouse(m) => self.handle_mouse(m, now),
            GridEvent::Paste(text) => {
                let outcome = self.edit.paste(&text);
                self.apply_edit_outcome(outcome)
            }
            GridEvent::Resize { width, height } => {
                self.set_container_size(width, height);
                GridAction::Redraw
            }
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> GridAction {
        if self.edit.is_editing() {
            return self.handle_edit_key(key);
        }
        if let Some(action) = self.handle_cell_key(key) {
            return action;
        }
        match self.options.bindings.action_for(key) {
            Some(cmd) => self.run_command(cmd, now),
            None => GridAction::None,
        }
    }

    fn handle_edit_key(&mut self, key: &KeyEvent) -> GridAction {
        let custom = self.edit.session().and_then(|session| {
            let header = self.headers.get(&HeaderId::Column(session.cell.key.clone()))?;
            let handler = header.edit_keys.as_ref()?;
            let row = self.row(session.cell.index)?;
            handler(
                key,
                &EditContext {
                    session,
                    row,
                    table_style: &self.style,
                },
            )
        });
        let outcome = match custom {
            Some(EditCommand::UpdateRow(row)) => {
                let Some(cell) = self.edit.session().map(|s| s.cell.clone()) else {
                    return GridAction::None;
                };
                return self.apply_cell_command(cell, CellCommand::UpdateRow(row));
            }
            Some(command) => self.edit.apply(command),
            None => self.edit.handle_key(key),
        };
        self.apply_edit_outcome(outcome)
    }

    /// Offers `key` to the custom cell under the cursor.
    fn handle_cell_key(&mut self, key: &KeyEvent) -> Option<GridAction> {
        let c = self.cursor?;
        let header = self.headers.at(c.col)?;
        let handler = header.cell_keys.as_ref()?;
        let data_key = header.id.data_key()?;
        let row = self.visible_row(c.row)?;
        let null = Value::Null;
        let command = handler(
            key,
            &CellContext {
                cell_value: row.get(data_key).unwrap_or(&null),
                row,
                table_style: &self.style,
                is_selected: self.selection.is_checked(&row.key(&self.options.data_key)),
                is_cursor: true,
            },
        )?;
        let cell = CellKey::new(row.index, data_key);
        Some(self.apply_cell_command(cell, command))
    }

    fn run_command(&mut self, cmd: GridCommand, now: Instant) -> GridAction {
        match cmd {
            GridCommand::Up => self.move_cursor(-1, 0),
            GridCommand::Down => self.move_cursor(1, 0),
            GridCommand::Left => self.move_cursor(0, -1),
            GridCommand::Right => self.move_cursor(0, 1),
            GridCommand::PageUp => self.move_cursor(-self.page_rows(), 0),
            GridCommand::PageDown => self.move_cursor(self.page_rows(), 0),
            GridCommand::Top => {
                if self.view_order.is_empty() {
                    return GridAction::None;
                }
                let col = self.cursor.map(|c| c.col).unwrap_or(0);
                self.cursor = Some(GridCursor { row: 0, col });
                self.scroll_to_row(0, ScrollAlign::Start, now);
                GridAction::Redraw
            }
            GridCommand::Bottom => {
                let Some(last) = self.view_order.len().checked_sub(1) else {
                    return GridAction::None;
                };
                let col = self.cursor.map(|c| c.col).unwrap_or(0);
                self.cursor = Some(GridCursor { row: last, col });
                self.scroll_to_row(last, ScrollAlign::End, now);
                GridAction::Redraw
            }
            GridCommand::ScrollLeft | GridCommand::ScrollRight => {
                let step = self.options.bindings.horiz_step;
                let delta = if cmd == GridCommand::ScrollLeft { -step } else { step };
                if self.scroll.scroll_by(ScrollSource::Body, delta) {
                    GridAction::Redraw
                } else {
                    GridAction::None
                }
            }
            GridCommand::ToggleSort => match self.cursor_header_id() {
                Some(id) => self.toggle_sort(&id),
                None => GridAction::None,
            },
            GridCommand::ToggleRow => match self.cursor {
                Some(c) => self.toggle_row_at(c.row),
                None => GridAction::None,
            },
            GridCommand::ToggleAll => self.toggle_all(),
            GridCommand::BeginEdit => match self.cursor {
                Some(c) => self.activate_cell(c.row, c.col),
                None => GridAction::None,
            },
            GridCommand::DeleteRow => match self.cursor {
                Some(c) => self.delete_at(c.row),
                None => GridAction::None,
            },
        }
    }

    fn cursor_header_id(&self) -> Option<HeaderId> {
        let c = self.cursor?;
        self.headers.at(c.col).map(|h| h.id.clone())
    }

    /// Enter/F2 on a cell, or a double click.
    fn activate_cell(&mut self, pos: usize, col: usize) -> GridAction {
        let Some(id) = self.headers.at(col).map(|h| h.id.clone()) else {
            return GridAction::None;
        };
        match id {
            HeaderId::Check => self.toggle_row_at(pos),
            HeaderId::Button => self.delete_at(pos),
            HeaderId::Index => GridAction::None,
            HeaderId::Column(key) => {
                let Some(index) = self.visible_row(pos).map(|r| r.index) else {
                    return GridAction::None;
                };
                self.begin_edit(index, &key).unwrap_or(GridAction::None)
            }
        }
    }

    fn delete_at(&mut self, pos: usize) -> GridAction {
        let Some(index) = self.visible_row(pos).map(|r| r.index) else {
            return GridAction::None;
        };
        match self.delete_row(index) {
            Ok(_) => GridAction::DeleteRow(index),
            Err(_) => GridAction::None,
        }
    }

    fn bands(&self) -> (Rect, Rect) {
        if self.regions.body.width > 0 || self.regions.header.width > 0 {
            (self.regions.header, self.regions.body)
        } else {
            grid_bands(self.area, self.style.header_height)
        }
    }

    fn hit_test(&self, x: u16, y: u16) -> Option<Hit> {
        let (header, body) = self.bands();
        let inside = |r: Rect| x >= r.x && x < r.right() && y >= r.y && y < r.bottom();
        if inside(header) {
            return self
                .layout
                .column_at(header, x, self.scroll.header_left())
                .map(|col| Hit::Header { col });
        }
        if inside(body) {
            let offset = self.virtualizer.scroll_top() + (y - body.y) as u64;
            let row = self.virtualizer.index_at(offset)?;
            let col = self.layout.column_at(body, x, self.scroll.body_left())?;
            return Some(Hit::Cell { row, col });
        }
        None
    }

    fn handle_mouse(&mut self, m: MouseEvent, now: Instant) -> GridAction {
        let (header, _) = self.bands();
        let source = if m.y >= header.y && m.y < header.bottom() {
            ScrollSource::Header
        } else {
            ScrollSource::Body
        };
        let wheel = self.options.wheel_step as i64 * self.style.row_height.max(1) as i64;
        let horiz = self.options.bindings.horiz_step;

        let changed = match m.kind {
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown if m.modifiers.shift => {
                let delta = if m.kind == MouseEventKind::ScrollUp { -horiz } else { horiz };
                self.scroll.scroll_by(source, delta)
            }
            MouseEventKind::ScrollUp => {
                let before = self.scroll_top();
                self.scroll_by(-wheel) != before
            }
            MouseEventKind::ScrollDown => {
                let before = self.scroll_top();
                self.scroll_by(wheel) != before
            }
            MouseEventKind::ScrollLeft => self.scroll.scroll_by(source, -horiz),
            MouseEventKind::ScrollRight => self.scroll.scroll_by(source, horiz),
            MouseEventKind::Moved => {
                let row = match self.hit_test(m.x, m.y) {
                    Some(Hit::Cell { row, .. }) => Some(row),
                    _ => None,
                };
                self.set_hover_row(row)
            }
            MouseEventKind::Down(MouseButton::Left) => return self.click(m, now),
            _ => false,
        };
        if changed {
            GridAction::Redraw
        } else {
            GridAction::None
        }
    }

    fn click(&mut self, m: MouseEvent, now: Instant) -> GridAction {
        if let Some(popup) = self.regions.popup {
            let a = popup.area;
            if m.x >= a.x && m.x < a.right() && m.y >= a.y && m.y < a.bottom() {
                let i = popup.first_option + (m.y - a.y) as usize;
                let outcome = self.edit.choose(i);
                return self.apply_edit_outcome(outcome);
            }
        }

        let target = self.hit_test(m.x, m.y);

        let mut closed = GridAction::None;
        if let Some(session) = self.edit.session() {
            let on_cell = match target {
                Some(Hit::Cell { row, col }) => {
                    self.cell_key_at(row, col).as_ref() == Some(&session.cell)
                }
                _ => false,
            };
            if on_cell {
                let outcome = self.edit.toggle_popup();
                return self.apply_edit_outcome(outcome);
            }
            let outcome = self.edit.outside_interaction();
            if outcome == EditOutcome::Swallowed {
                return GridAction::Redraw;
            }
            closed = self.apply_edit_outcome(outcome);
            if self.edit.is_editing() {
                return closed;
            }
        }

        let action = match self.hit_test(m.x, m.y) {
            Some(Hit::Header { col }) => match self.headers.at(col).map(|h| h.id.clone()) {
                Some(HeaderId::Check) => self.toggle_all(),
                Some(id) => self.toggle_sort(&id),
                None => GridAction::None,
            },
            Some(Hit::Cell { row, col }) => self.click_cell(row, col, m.modifiers.shift, now),
            None => GridAction::None,
        };
        match action {
            GridAction::None | GridAction::Redraw if closed != GridAction::None => closed,
            other => other,
        }
    }

    fn click_cell(&mut self, pos: usize, col: usize, shift: bool, now: Instant) -> GridAction {
        match self.headers.at(col).map(|h| h.id.clone()) {
            Some(HeaderId::Check) if shift => return self.select_range_to(pos),
            Some(HeaderId::Check) | Some(HeaderId::Button) => return self.activate_cell(pos, col),
            _ => {}
        }
        let Some(index) = self.visible_row(pos).map(|r| r.index) else {
            return GridAction::None;
        };
        self.cursor = Some(GridCursor { row: pos, col });

        let double = self.last_click.is_some_and(|(i, c, t)| {
            i == index && c == col && now.saturating_duration_since(t) <= self.options.double_click
        });
        if double {
            self.last_click = None;
            match self.activate_cell(pos, col) {
                GridAction::None => GridAction::Redraw,
                other => other,
            }
        } else {
            self.last_click = Some((index, col, now));
            GridAction::Redraw
        }
    }

    fn cell_key_at(&self, pos: usize, col: usize) -> Option<CellKey> {
        let key = self.headers.at(col)?.id.data_key()?;
        let row = self.visible_row(pos)?;
        Some(CellKey::new(row.index, key))
    }

    // ---- rendering ----

    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        self.render_with(area, buf, &DefaultWidgets);
    }

    /// Renders with host-supplied checkbox/input/select renderers.
    pub fn render_with(&mut self, area: Rect, buf: &mut Buffer, widgets: &dyn GridWidgets) {
        self.set_area(area);
        let ctx = PaneContext {
            headers: &self.headers,
            rows: &self.rows,
            view_order: &self.view_order,
            visible_keys: &self.visible_keys,
            window: self.virtualizer.window(),
            layout: &self.layout,
            style: &self.style,
            sort: &self.sort,
            filter: &self.filter,
            selection: &self.selection,
            edit: self.edit.session(),
            cursor: self.cursor,
            hover_row: self.hover_row,
            scroll_top: self.virtualizer.scroll_top(),
            total_height: self.virtualizer.total_height(),
            header_left: self.scroll.header_left(),
            body_left: self.scroll.body_left(),
            error: self.error.as_ref(),
        };
        self.regions = render_grid(area, buf, &ctx, widgets);
        // The editor has been drawn; it takes focus on the next frame.
        if self.edit.take_focus_request() {
            self.dirty = true;
        }
    }
}

/// Converts committed editor text back to the JSON type the cell held before.
fn coerce_like(key: &str, previous: Option<&Value>, text: String) -> Result<Value> {
    match previous {
        Some(Value::Number(_)) => {
            let t = text.trim();
            if let Ok(i) = t.parse::<i64>() {
                return Ok(Value::from(i));
            }
            t.parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| GridError::InvalidEditValue {
                    key: key.to_string(),
                    message: format!("`{text}` is not a number"),
                })
        }
        Some(Value::Bool(_)) => match text.trim() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(GridError::InvalidEditValue {
                key: key.to_string(),
                message: format!("`{text}` is not true/false"),
            }),
        },
        _ => Ok(Value::String(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::EditType;
    use crate::header::Pin;
    use crate::input::KeyCode;
    use crate::keymap::key_char;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn people() -> Vec<Row> {
        (0..50)
            .map(|i| {
                Row::new(i)
                    .with("name", format!("person{i}"))
                    .with("age", 20 + (i % 7))
            })
            .collect()
    }

    fn grid() -> GridController {
        let mut g = GridController::with_headers(
            GridOptions {
                selection_enabled: true,
                edit_enabled: true,
                scroll_duration: Duration::ZERO,
                ..Default::default()
            },
            vec![
                Header::check().pin(Pin::Left),
                Header::column("name", "Name", 12)
                    .sortable(true)
                    .editable(EditType::Input),
                Header::column("age", "Age", 6).sortable(true),
                Header::button("Del", 5).pin(Pin::Right),
            ],
        )
        .unwrap();
        g.set_rows(people()).unwrap();
        g.set_area(Rect::new(0, 0, 30, 11));
        g
    }

    fn click(x: u16, y: u16) -> GridEvent {
        GridEvent::Mouse(MouseEvent::new(x, y, MouseEventKind::Down(MouseButton::Left)))
    }

    #[test]
    fn check_header_requires_selection() {
        let err = GridController::with_headers(GridOptions::default(), vec![Header::check()])
            .err()
            .unwrap();
        assert_eq!(err, GridError::SelectionNotWired);
    }

    #[test]
    fn missing_keys_block_rendering() {
        let mut g = GridController::with_headers(
            GridOptions::default(),
            vec![Header::column("name", "Name", 10)],
        )
        .unwrap();
        let err = g.set_rows(vec![Row::new(0)]).unwrap_err();
        assert!(matches!(err, GridError::MissingKeys { index: 0, .. }));
        assert!(g.error().is_some());

        let mut buf = Buffer::empty(Rect::new(0, 0, 60, 3));
        g.render(buf.area, &mut buf);
        let first: String = (0..11).map(|x| buf.cell((x, 0)).unwrap().symbol().to_string()).collect();
        assert_eq!(first, "grid error:");
    }

    #[test]
    fn viewport_follows_area() {
        let g = grid();
        assert_eq!(g.window().start_index, 0);
        assert!(g.window().contains(9));
        assert_eq!(g.total_height(), 50);
        assert_eq!(g.layout().gutter, 1);
    }

    #[test]
    fn keyboard_moves_cursor_and_scrolls() {
        let mut g = grid();
        let now = Instant::now();
        g.handle_event_at(GridEvent::Key(key_char('j')), now);
        assert_eq!(g.cursor(), Some(GridCursor { row: 0, col: 0 }));
        for _ in 0..15 {
            g.handle_event_at(GridEvent::Key(key_char('j')), now);
        }
        assert_eq!(g.cursor().map(|c| c.row), Some(15));
        assert_eq!(g.scroll_top(), 6);
    }

    #[test]
    fn header_click_sorts_and_check_header_toggles_all() {
        let mut g = grid();
        let now = Instant::now();
        // name column starts after the 3-wide check column
        let action = g.handle_event_at(click(5, 0), now);
        assert_eq!(
            action,
            GridAction::SortChanged {
                column: HeaderId::parse("name"),
                direction: Some(SortDirection::Asc)
            }
        );
        let action = g.handle_event_at(click(1, 0), now);
        assert!(matches!(action, GridAction::SelectionChanged(ref k) if k.len() == 50));
        assert_eq!(g.tri_state(), TriState::All);
    }

    #[test]
    fn double_click_edits_and_enter_commits() {
        let mut g = grid();
        let now = Instant::now();
        g.handle_event_at(click(5, 1), now);
        let action = g.handle_event_at(click(5, 1), now + Duration::from_millis(100));
        assert_eq!(action, GridAction::EditStarted(CellKey::new(0, "name")));

        g.handle_event_at(GridEvent::Paste("!".into()), now);
        let action = g.handle_event_at(GridEvent::Key(KeyEvent::new(KeyCode::Enter)), now);
        assert_eq!(
            action,
            GridAction::CellUpdated {
                index: 0,
                key: "name".into(),
                value: json!("person0!")
            }
        );
        assert_eq!(g.row(0).unwrap().get("name"), Some(&json!("person0!")));
    }

    #[test]
    fn slow_clicks_do_not_edit() {
        let mut g = grid();
        let now = Instant::now();
        g.handle_event_at(click(5, 1), now);
        let action = g.handle_event_at(click(5, 1), now + Duration::from_secs(2));
        assert_eq!(action, GridAction::Redraw);
        assert!(!g.edit().is_editing());
    }

    #[test]
    fn shift_click_on_check_column_selects_a_range() {
        let mut g = grid();
        let now = Instant::now();
        g.handle_event_at(click(1, 2), now);
        let mut m = MouseEvent::new(1, 5, MouseEventKind::Down(MouseButton::Left));
        m.modifiers.shift = true;
        let action = g.handle_event_at(GridEvent::Mouse(m), now);
        assert!(matches!(action, GridAction::SelectionChanged(ref k) if k.len() == 4));
        assert!((1..=4).all(|i| g.is_checked(i)));
    }

    #[test]
    fn button_column_deletes_row() {
        let mut g = grid();
        let action = g.handle_event_at(click(26, 2), Instant::now());
        assert_eq!(action, GridAction::DeleteRow(1));
        assert_eq!(g.rows().len(), 49);
        assert!(g.row(1).is_none());
    }

    #[test]
    fn numeric_edit_keeps_number_type() {
        let mut g = grid();
        g.set_headers(vec![
            Header::column("name", "Name", 12),
            Header::column("age", "Age", 6).editable(EditType::Input),
        ])
        .unwrap();
        g.begin_edit(3, "age").unwrap();
        g.handle_event(GridEvent::Key(KeyEvent::new(KeyCode::Backspace)));
        g.handle_event(GridEvent::Key(KeyEvent::new(KeyCode::Backspace)));
        g.handle_event(GridEvent::Paste("41".into()));
        g.commit_edit();
        assert_eq!(g.row(3).unwrap().get("age"), Some(&json!(41)));

        g.begin_edit(3, "age").unwrap();
        g.handle_event(GridEvent::Paste("x".into()));
        let action = g.commit_edit();
        assert!(matches!(action, GridAction::EditRejected { .. }));
        assert_eq!(g.row(3).unwrap().get("age"), Some(&json!(41)));
    }

    #[test]
    fn scroll_to_index_is_eased_and_superseded() {
        let mut g = grid();
        g.animator.set_duration(Duration::from_millis(1000));
        let t0 = Instant::now();
        let first = g.scroll_to_index(40, ScrollAlign::Start, t0).unwrap();
        assert!(g.tick(t0 + Duration::from_millis(500)));
        let mid = g.scroll_top();
        assert!(mid > 0 && mid < 40);

        let second = g.scroll_to_index(0, ScrollAlign::Start, t0 + Duration::from_millis(500)).unwrap();
        assert!(second > first);
        g.tick(t0 + Duration::from_millis(2000));
        assert_eq!(g.scroll_top(), 0);
        assert!(!g.is_scrolling());
    }

    #[test]
    fn horizontal_scroll_mirrors_header_and_body() {
        let mut g = GridController::with_headers(
            GridOptions::default(),
            vec![
                Header::column("a", "A", 20),
                Header::column("b", "B", 20),
            ],
        )
        .unwrap();
        g.set_rows(vec![Row::new(0).with("a", 1).with("b", 2)]).unwrap();
        g.set_area(Rect::new(0, 0, 25, 5));
        assert!(g.set_scroll_left(ScrollSource::Body, 7));
        assert_eq!((g.header_left(), g.body_left()), (7, 7));
        assert!(g.set_scroll_left(ScrollSource::Header, 100));
        assert_eq!((g.header_left(), g.body_left()), (15, 15));
    }

    #[test]
    fn update_row_replaces_and_validates() {
        let mut g = grid();
        g.update_row(Row::new(4).with("name", "four").with("age", 1)).unwrap();
        assert_eq!(g.row(4).unwrap().display("name"), "four");

        let err = g.update_row(Row::new(4).with("name", "no age")).unwrap_err();
        assert!(matches!(err, GridError::MissingKeys { index: 4, .. }));
        assert_eq!(g.row(4).unwrap().display("name"), "four");

        let err = g.update_row(Row::new(999).with("name", "x").with("age", 1)).unwrap_err();
        assert_eq!(err, GridError::UnknownRow(999));
    }

    #[test]
    fn disabling_edit_mode_cancels_the_open_session() {
        let mut g = grid();
        g.begin_edit(0, "name").unwrap();
        g.handle_event(GridEvent::Paste("??".into()));
        assert_eq!(
            g.set_edit_enabled(false),
            GridAction::EditCancelled(CellKey::new(0, "name"))
        );
        assert_eq!(g.row(0).unwrap().display("name"), "person0");
        assert_eq!(g.begin_edit(0, "name").unwrap(), GridAction::None);
    }

    #[test]
    fn mouse_move_tracks_hover_row() {
        let mut g = grid();
        let moved = |x, y| GridEvent::Mouse(MouseEvent::new(x, y, MouseEventKind::Moved));
        assert_eq!(g.handle_event(moved(5, 3)), GridAction::Redraw);
        assert_eq!(g.hover_row(), Some(2));
        assert_eq!(g.handle_event(moved(8, 3)), GridAction::None);
        assert_eq!(g.handle_event(moved(5, 0)), GridAction::Redraw);
        assert_eq!(g.hover_row(), None);
    }

    #[test]
    fn horizontal_wheel_scrolls_both_bands() {
        let mut g = GridController::with_headers(
            GridOptions::default(),
            vec![
                Header::column("a", "A", 20),
                Header::column("b", "B", 20),
            ],
        )
        .unwrap();
        g.set_rows(vec![Row::new(0).with("a", 1).with("b", 2)]).unwrap();
        g.set_area(Rect::new(0, 0, 25, 5));
        let wheel = |kind| GridEvent::Mouse(MouseEvent::new(3, 1, kind));

        assert_eq!(g.handle_event(wheel(MouseEventKind::ScrollRight)), GridAction::Redraw);
        assert!(g.body_left() > 0);
        assert_eq!(g.header_left(), g.body_left());

        assert_eq!(g.handle_event(wheel(MouseEventKind::ScrollLeft)), GridAction::Redraw);
        assert_eq!((g.header_left(), g.body_left()), (0, 0));
        assert_eq!(g.handle_event(wheel(MouseEventKind::ScrollLeft)), GridAction::None);
    }

    #[test]
    fn blank_select_cell_does_not_swallow_clicks_forever() {
        let mut g = grid();
        g.set_headers(vec![
            Header::column("name", "Name", 12).editable(EditType::Select),
            Header::column("age", "Age", 6).sortable(true),
        ])
        .unwrap();
        g.update_cell(0, "name", Value::Null).unwrap();
        g.begin_edit(0, "name").unwrap();

        // the sortable age header: the first click closes the popup, the second exits and sorts
        assert_eq!(g.handle_event(click(14, 0)), GridAction::Redraw);
        assert!(g.edit().is_editing());
        let action = g.handle_event(click(14, 0));
        assert!(!g.edit().is_editing());
        assert!(matches!(action, GridAction::SortChanged { .. }));
        assert_eq!(g.row(0).unwrap().get("name"), Some(&Value::Null));
    }

    #[test]
    fn filter_then_toggle_all_only_selects_visible() {
        let mut g = grid();
        g.set_headers(vec![
            Header::check(),
            Header::column("name", "Name", 12).filter(crate::header::FilterType::Text),
            Header::column("age", "Age", 6),
        ])
        .unwrap();
        g.set_filter(&HeaderId::parse("name"), "person1");
        // person1, person10..person19
        assert_eq!(g.view_order().len(), 11);
        g.toggle_all();
        assert_eq!(g.selected_keys().len(), 11);
        g.clear_filters();
        assert_eq!(g.tri_state(), TriState::Partial);
    }
}
