//! `ratatui-grid-core` is a headless data grid engine for terminal UIs.
//!
//! A grid is described by an ordered list of [`header::Header`]s and a list of [`row::Row`]s.
//! Every state change re-runs one synchronous pipeline: filter, then sort, then virtualize the
//! visible window, then split the columns into three panes (left-pinned, scrollable center,
//! right-pinned).
//!
//! ## Design goals
//!
//! - Event-loop agnostic: you feed [`input::GridEvent`]s and call `render` from your app.
//! - Single writer: [`controller::GridController`] owns all state. Panes only read a
//!   [`view::PaneContext`] for the frame being drawn.
//! - Host-driven persistence: edits, deletes and selection changes come back as
//!   [`controller::GridAction`]s and the caller decides what to store.
//! - Failures are explicit: wiring mistakes surface as [`error::GridError`] and the grid renders
//!   the message instead of a half-configured table.
//!
//! ## Getting started
//!
//! Most users should depend on the facade crate `ratatui-grid`. Useful entry points:
//! - [`controller::GridController`]: the grid itself.
//! - [`header::Header`]: column declarations (pinning, sort, filter, edit type, custom cells).
//! - [`style::GridStyle`] / [`style::GridStyleConfig`]: theming, loadable from JSON.
//! - [`widgets::GridWidgets`]: swap the checkbox, text input and select renderers.
//! - [`crossterm_input`]: adapters from crossterm events (feature `crossterm`).
//!
//! ```
//! use ratatui::buffer::Buffer;
//! use ratatui::layout::Rect;
//! use ratatui_grid_core::controller::{GridController, GridOptions};
//! use ratatui_grid_core::header::{Header, HeaderId};
//! use ratatui_grid_core::row::Row;
//!
//! let mut grid = GridController::with_headers(
//!     GridOptions::default(),
//!     vec![
//!         Header::column("name", "Name", 10).sortable(true),
//!         Header::column("age", "Age", 5),
//!     ],
//! )?;
//! grid.set_rows(vec![
//!     Row::new(0).with("name", "Bob").with("age", 30),
//!     Row::new(1).with("name", "Amy").with("age", 25),
//! ])?;
//! grid.toggle_sort(&HeaderId::parse("name"));
//!
//! let names: Vec<String> = grid.visible_rows().map(|r| r.display("name")).collect();
//! assert_eq!(names, ["Amy", "Bob"]);
//!
//! let mut buf = Buffer::empty(Rect::new(0, 0, 20, 4));
//! grid.render(buf.area, &mut buf);
//! # Ok::<(), ratatui_grid_core::error::GridError>(())
//! ```
pub mod error;

pub mod collate;
pub mod filter;
pub mod row;
pub mod selection;
pub mod sort;

pub mod easing;
pub mod layout;
pub mod scroll;
pub mod transition;
pub mod virtual_rows;

pub mod edit;
pub mod header;

#[cfg(feature = "crossterm")]
pub mod crossterm_input;

pub mod input;
pub mod keymap;

pub mod render;
pub mod style;
pub mod view;
pub mod widgets;

pub mod controller;
