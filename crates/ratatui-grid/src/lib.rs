//! `ratatui-grid` is a data grid for ratatui apps: pinned columns, natural-order sorting,
//! per-column filters, tri-state row selection and inline cell editing over a virtualized body.
//!
//! This crate re-exports [`ratatui_grid_core`] and adds a [`prelude`] with the types most apps
//! touch. Enable the `crossterm` feature for the crossterm event adapters.
//!
//! A typical loop:
//!
//! 1. build a [`GridController`] with [`GridOptions`] and a list of [`Header`]s,
//! 2. hand it rows with [`GridController::set_rows`],
//! 3. each frame call [`GridController::tick`] and [`GridController::render`],
//! 4. feed input through [`GridController::handle_event`] and persist the returned
//!    [`GridAction`]s.
//!
//! See `examples/grid_demo.rs` for a runnable crossterm app.
pub use ratatui_grid_core::*;

pub use ratatui_grid_core::controller::GridAction;
pub use ratatui_grid_core::controller::GridController;
pub use ratatui_grid_core::controller::GridOptions;
pub use ratatui_grid_core::error::GridError;
pub use ratatui_grid_core::header::Header;

pub mod prelude {
    pub use ratatui_grid_core::controller::GridAction;
    pub use ratatui_grid_core::controller::GridController;
    pub use ratatui_grid_core::controller::GridOptions;
    pub use ratatui_grid_core::edit::EditCommand;
    pub use ratatui_grid_core::edit::EditNotice;
    pub use ratatui_grid_core::edit::EditType;
    pub use ratatui_grid_core::error::GridError;
    pub use ratatui_grid_core::header::Align;
    pub use ratatui_grid_core::header::CellCommand;
    pub use ratatui_grid_core::header::FilterType;
    pub use ratatui_grid_core::header::Header;
    pub use ratatui_grid_core::header::HeaderId;
    pub use ratatui_grid_core::header::Pin;
    pub use ratatui_grid_core::input::GridEvent;
    pub use ratatui_grid_core::row::Row;
    pub use ratatui_grid_core::row::RowKey;
    pub use ratatui_grid_core::sort::SortDirection;
    pub use ratatui_grid_core::sort::SortMode;
    pub use ratatui_grid_core::style::GridStyle;
    pub use ratatui_grid_core::style::GridStyleConfig;
    pub use ratatui_grid_core::virtual_rows::ScrollAlign;

    #[cfg(feature = "crossterm")]
    pub use ratatui_grid_core::crossterm_input::grid_event_from_crossterm;
}
