use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEventKind;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui_grid::prelude::*;
use std::io;
use std::time::Duration;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const TEAMS: [&str; 5] = ["Compilers", "Infra", "Mobile", "Platform", "Web"];

const STYLE: &str = r##"{
    "header_bg": "#303030",
    "header_bold": true,
    "zebra_odd_bg": "#1c1c1c",
    "cursor_bg": "blue"
}"##;

fn main() -> io::Result<()> {
    // Logs go to stderr, so only turn them on when asked (e.g. `RUST_LOG=debug ... 2>grid.log`).
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .with_ansi(false)
            .init();
    }

    let mut grid = build_grid().map_err(io::Error::other)?;

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &mut grid);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    res
}

fn build_grid() -> Result<GridController, GridError> {
    let mut grid = GridController::with_headers(
        GridOptions {
            edit_enabled: true,
            selection_enabled: true,
            ..Default::default()
        },
        vec![
            Header::check().pin(Pin::Left),
            Header::index(7).pin(Pin::Left),
            Header::column("name", "Name", 16)
                .pin(Pin::Left)
                .sortable(true)
                .filter(FilterType::Text)
                .editable(EditType::Input),
            Header::column("team", "Team", 12)
                .sortable(true)
                .filter(FilterType::Select)
                .editable(EditType::Select),
            Header::column("joined", "Joined", 12)
                .sortable(true)
                .editable(EditType::Date),
            Header::column("salary", "Salary", 10)
                .sortable(true)
                .data_align(Align::Right)
                .editable(EditType::Input)
                .formatter(|v, _| match v.as_i64() {
                    Some(n) => format!("{}k", n / 1000),
                    None => v.to_string(),
                }),
            Header::column("office", "Office", 14).sortable(true),
            Header::column("notes", "Notes", 30),
            Header::button("Del", 5).pin(Pin::Right),
        ],
    )?;

    if let Ok(config) = serde_json::from_str::<GridStyleConfig>(STYLE) {
        grid.apply_style_config(&config);
    }

    let offices = ["Berlin", "Lisbon", "Osaka", "Toronto"];
    let rows = (0..10_000u64)
        .map(|i| {
            Row::new(i)
                .with("name", format!("employee{i}"))
                .with("team", TEAMS[(i % 5) as usize])
                .with(
                    "joined",
                    format!("20{:02}-{:02}-{:02}", 10 + i % 14, 1 + i % 12, 1 + i % 28),
                )
                .with("salary", 40_000 + (i * 7_919) % 90_000)
                .with("office", offices[(i % 4) as usize])
                .with("notes", if i % 3 == 0 { "remote" } else { "" })
        })
        .collect();
    grid.set_rows(rows)?;
    Ok(grid)
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    grid: &mut GridController,
) -> io::Result<()> {
    let mut status = String::from("ready");
    let mut team_filter: Option<usize> = None;

    loop {
        grid.tick(Instant::now());
        terminal.draw(|f| {
            let area = f.area();
            let block = Block::default()
                .title("grid (hjkl, s sort, Space/a select, Enter edit, Del delete, t team filter, q)")
                .borders(Borders::ALL);
            let inner = block.inner(area);
            f.render_widget(block, area);

            let buf = f.buffer_mut();
            let grid_area = Rect::new(
                inner.x,
                inner.y,
                inner.width,
                inner.height.saturating_sub(1),
            );
            let status_area = Rect::new(inner.x, inner.y + grid_area.height, inner.width, 1);
            grid.render(grid_area, buf);
            render_status(status_area, buf, grid, &status);
        })?;

        if !crossterm::event::poll(Duration::from_millis(16))? {
            continue;
        }
        let ev = crossterm::event::read()?;
        if let Event::Key(key) = &ev
            && key.kind == KeyEventKind::Press
            && !grid.edit().is_editing()
        {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('t') => {
                    team_filter = match team_filter {
                        Some(i) if i + 1 < TEAMS.len() => Some(i + 1),
                        Some(_) => None,
                        None => Some(0),
                    };
                    let value = team_filter.map(|i| TEAMS[i]).unwrap_or("");
                    grid.set_filter(&HeaderId::parse("team"), value);
                    status = format!("team filter: {value:?}");
                    continue;
                }
                _ => {}
            }
        }

        let Some(ev) = grid_event_from_crossterm(ev) else {
            continue;
        };
        match grid.handle_event(ev) {
            GridAction::CellUpdated { index, key, value } => {
                status = format!("row {index}: {key} = {value}");
            }
            GridAction::RowUpdated(index) => status = format!("row {index} replaced"),
            GridAction::DeleteRow(index) => status = format!("deleted row {index}"),
            GridAction::SelectionChanged(keys) => status = format!("{} selected", keys.len()),
            GridAction::SortChanged { column, direction } => {
                status = format!("sort {column}: {direction:?}");
            }
            GridAction::EditRejected { message, .. } => status = message,
            GridAction::EditStarted(cell) => status = format!("editing {cell}"),
            GridAction::EditCancelled(cell) => status = format!("cancelled {cell}"),
            GridAction::Redraw | GridAction::None => {}
        }
    }
}

fn render_status(
    area: Rect,
    buf: &mut ratatui::buffer::Buffer,
    grid: &GridController,
    status: &str,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let cursor = grid
        .cursor()
        .map(|c| format!("r{} c{}", c.row, c.col))
        .unwrap_or("-".to_string());
    let s = format!(
        "{}/{} rows  cursor={cursor}  {status}",
        grid.view_order().len(),
        grid.rows().len()
    );
    let span = Span::styled(s, Style::default().fg(Color::Gray));
    buf.set_span(area.x, area.y, &span, area.width);
}
