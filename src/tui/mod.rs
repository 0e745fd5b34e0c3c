//! Ratatui-based terminal dashboard.
//!
//! A controls panel (date range, sector, smoothing window, raw toggle) drives
//! the query pipeline. Results are shown on two tabs: price trends (dual-axis
//! line chart) and correlation (scatter), with an optional raw-data table.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Tabs},
};

use crate::app::pipeline::{QueryOutput, QueryParams, filter_and_smooth};
use crate::domain::{ObservationTable, Sector};
use crate::error::AppError;
use crate::report::{ViewSummary, summarize};

mod charts;
mod controls;

use charts::{ScatterChart, TrendChart, date_bounds, day_number, padded_bounds, runs};
use controls::{Controls, DateAxis, Field, parse_date_input};

/// Start the TUI.
pub fn run(table: Arc<ObservationTable>, params: QueryParams, show_raw: bool) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(table, &params, show_raw);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Trends,
    Correlation,
}

impl Tab {
    fn toggle(self) -> Self {
        match self {
            Tab::Trends => Tab::Correlation,
            Tab::Correlation => Tab::Trends,
        }
    }
}

struct App {
    table: Arc<ObservationTable>,
    axis: DateAxis,
    controls: Controls,
    selected: Field,
    /// Text being typed into a date field, when editing.
    date_input: Option<String>,
    tab: Tab,
    raw_state: TableState,
    status: String,
    output: Option<QueryOutput>,
    summary: Option<ViewSummary>,
}

impl App {
    fn new(table: Arc<ObservationTable>, params: &QueryParams, show_raw: bool) -> Self {
        let axis = DateAxis::from_table(&table);
        let mut controls = Controls::new(params, show_raw);
        controls.clamp_to(&axis);
        let mut app = Self {
            table,
            axis,
            controls,
            selected: Field::Start,
            date_input: None,
            tab: Tab::Trends,
            raw_state: TableState::default(),
            status: String::new(),
            output: None,
            summary: None,
        };
        app.recompute();
        app.status = format!("Loaded {} rows.", app.table.len());
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply a key press. Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.date_input.is_some() {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.selected = self.selected.up(),
            KeyCode::Down => self.selected = self.selected.down(),
            KeyCode::Left => self.adjust(-1),
            KeyCode::Right => self.adjust(1),
            KeyCode::Tab => self.tab = self.tab.toggle(),
            KeyCode::Char(' ') => self.toggle_raw(),
            KeyCode::Enter => match self.selected {
                Field::Start | Field::End => {
                    let current = match self.selected {
                        Field::Start => self.controls.start,
                        _ => self.controls.end,
                    };
                    self.date_input = Some(current.to_string());
                    self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
                }
                Field::ShowRaw => self.toggle_raw(),
                Field::Sector | Field::Window => {}
            },
            KeyCode::PageDown => self.scroll_raw(10),
            KeyCode::PageUp => self.scroll_raw(-10),
            _ => {}
        }
        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.date_input = None;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                if let Some(text) = self.date_input.take() {
                    self.apply_date_input(&text);
                }
            }
            KeyCode::Backspace => {
                if let Some(input) = self.date_input.as_mut() {
                    input.pop();
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                if let Some(input) = self.date_input.as_mut() {
                    input.push(c);
                }
            }
            _ => {}
        }
    }

    fn apply_date_input(&mut self, text: &str) {
        let date = match parse_date_input(text) {
            Ok(d) => self.axis.clamp(d),
            Err(msg) => {
                self.status = msg;
                return;
            }
        };
        let result = match self.selected {
            Field::Start => self.controls.set_start(date),
            _ => self.controls.set_end(date),
        };
        match result {
            Ok(()) => {
                self.recompute();
                self.status = format!("range: {} .. {}", self.controls.start, self.controls.end);
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn adjust(&mut self, delta: isize) {
        match self.selected {
            Field::Start => {
                let next = self.axis.step(self.controls.start, delta);
                if let Err(err) = self.controls.set_start(next) {
                    self.status = err.to_string();
                    return;
                }
                self.status = format!("start: {}", self.controls.start);
            }
            Field::End => {
                let next = self.axis.step(self.controls.end, delta);
                if let Err(err) = self.controls.set_end(next) {
                    self.status = err.to_string();
                    return;
                }
                self.status = format!("end: {}", self.controls.end);
            }
            Field::Sector => {
                self.controls.sector = if delta >= 0 {
                    self.controls.sector.next()
                } else {
                    self.controls.sector.prev()
                };
                self.status = format!("sector: {}", self.controls.sector);
            }
            Field::Window => {
                self.controls.nudge_window(delta);
                self.status = format!("window: {}", self.controls.window);
            }
            Field::ShowRaw => {
                self.toggle_raw();
                return;
            }
        }
        self.recompute();
    }

    fn toggle_raw(&mut self) {
        self.controls.show_raw = !self.controls.show_raw;
        self.status = if self.controls.show_raw {
            "Showing raw data.".to_string()
        } else {
            "Raw data hidden.".to_string()
        };
    }

    fn scroll_raw(&mut self, delta: isize) {
        let rows = self.output.as_ref().map(|o| o.raw.len()).unwrap_or(0);
        if rows == 0 {
            return;
        }
        let cur = self.raw_state.offset() as isize;
        let next = (cur + delta).clamp(0, rows as isize - 1) as usize;
        *self.raw_state.offset_mut() = next;
    }

    /// Re-run the query for the current controls. Validation errors are
    /// shown in the status bar and the previous result is cleared.
    fn recompute(&mut self) {
        match self.controls.params() {
            Ok(params) => {
                let output = filter_and_smooth(&self.table, &params);
                self.summary = Some(summarize(&output));
                self.output = Some(output);
                *self.raw_state.offset_mut() = 0;
            }
            Err(err) => {
                tracing::warn!(error = %err, "query rejected");
                self.output = None;
                self.summary = None;
                self.status = err.to_string();
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("elec", Style::default().fg(Color::Cyan)),
            Span::raw(" - Electricity and Renewables"),
        ]));

        let stats = match &self.summary {
            Some(s) if s.rows > 0 => {
                let r = s
                    .correlation
                    .map(|r| format!("{r:.3}"))
                    .unwrap_or_else(|| "n/a".to_string());
                let mean_price = s.price.map(|p| format!("{:.2}", p.mean)).unwrap_or_default();
                format!("rows={} | mean price={mean_price} ¢/kWh | r(production, price)={r}", s.rows)
            }
            Some(_) => "rows=0".to_string(),
            None => "-".to_string(),
        };
        lines.push(Line::from(Span::styled(stats, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(0)])
            .split(area);

        self.draw_controls(frame, chunks[0]);

        let content = if self.controls.show_raw {
            Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(2), Constraint::Percentage(60), Constraint::Min(0)])
                .split(chunks[1])
        } else {
            Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(2), Constraint::Min(0)])
                .split(chunks[1])
        };

        self.draw_tabs(frame, content[0]);
        match self.tab {
            Tab::Trends => self.draw_trends(frame, content[1]),
            Tab::Correlation => self.draw_correlation(frame, content[1]),
        }
        if self.controls.show_raw {
            self.draw_raw_table(frame, content[2]);
        }
    }

    fn draw_controls(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let c = &self.controls;
        let editing = |field: Field| self.date_input.as_ref().filter(|_| self.selected == field);

        let start = match editing(Field::Start) {
            Some(text) => format!("{text}_"),
            None => c.start.to_string(),
        };
        let end = match editing(Field::End) {
            Some(text) => format!("{text}_"),
            None => c.end.to_string(),
        };

        let items = vec![
            ListItem::new(format!("Start:  {start}")),
            ListItem::new(format!("End:    {end}")),
            ListItem::new(format!("Sector: {}", c.sector.display_name())),
            ListItem::new(format!("Window: {} months", c.window)),
            ListItem::new(format!("Raw:    {}", if c.show_raw { "on" } else { "off" })),
        ];

        let bounds = match (self.axis.min(), self.axis.max()) {
            (Some(lo), Some(hi)) => format!("Controls ({lo} .. {hi})"),
            _ => "Controls".to_string(),
        };
        let list = List::new(items)
            .block(Block::default().title(bounds).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected.index()));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let selected = match self.tab {
            Tab::Trends => 0,
            Tab::Correlation => 1,
        };
        let tabs = Tabs::new(vec!["Price Trends", "Correlation Analysis"])
            .select(selected)
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_trends(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let sector = self.controls.sector;
        let title = format!("{} Price vs Production Over Time", sector.display_name());
        let Some(inner) = self.chart_frame(frame, area, title) else {
            return;
        };
        let Some(output) = &self.output else {
            return;
        };

        let price = runs(
            output
                .smoothed
                .iter()
                .map(|r| (day_number(r.date), r.price(sector))),
        );
        let production = runs(
            output
                .smoothed
                .iter()
                .map(|r| (day_number(r.date), r.production)),
        );

        // An empty selection still gets axes spanning the chosen range.
        let x_bounds = date_bounds(output.params.start, output.params.end);
        let price_bounds = padded_bounds(price.iter().flatten().map(|p| p.1), [0.0, 1.0]);
        let production_bounds = padded_bounds(production.iter().flatten().map(|p| p.1), [0.0, 1.0]);

        frame.render_widget(
            TrendChart {
                price: &price,
                production: &production,
                x_bounds,
                price_bounds,
                production_bounds,
            },
            inner,
        );
        self.empty_hint(frame, inner, output);
    }

    fn draw_correlation(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(inner) = self.chart_frame(frame, area, "Correlation Between Production and Prices".to_string())
        else {
            return;
        };
        let Some(output) = &self.output else {
            return;
        };

        let points = output.scatter_points();
        let x_bounds = padded_bounds(points.iter().map(|p| p.0), [0.0, 1.0]);
        let y_bounds = padded_bounds(points.iter().map(|p| p.1), [0.0, 1.0]);

        frame.render_widget(
            ScatterChart {
                points: &points,
                x_bounds,
                y_bounds,
                y_label: format!("{} Price (¢/kWh)", output.params.sector.display_name()),
            },
            inner,
        );
        self.empty_hint(frame, inner, output);
    }

    /// Draw the chart border and return the inner area, or `None` after
    /// drawing a placeholder when there is no result to plot.
    fn chart_frame(&self, frame: &mut ratatui::Frame<'_>, area: Rect, title: String) -> Option<Rect> {
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if self.output.is_none() {
            let msg = Paragraph::new("No valid query (see status bar).").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return None;
        }
        Some(inner)
    }

    fn empty_hint(&self, frame: &mut ratatui::Frame<'_>, inner: Rect, output: &QueryOutput) {
        if !output.is_empty() || inner.height == 0 {
            return;
        }
        let hint = Paragraph::new("No rows in selected range").style(Style::default().fg(Color::Yellow));
        let rect = Rect {
            x: inner.x + 1,
            y: inner.y,
            width: inner.width.saturating_sub(2),
            height: 1,
        };
        frame.render_widget(hint, rect);
    }

    fn draw_raw_table(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Raw Data").borders(Borders::ALL);
        let Some(output) = &self.output else {
            frame.render_widget(block, area);
            return;
        };

        let mut header = vec![Cell::from("date"), Cell::from("production")];
        header.extend(Sector::ALL.iter().map(|s| Cell::from(s.column())));
        let header = Row::new(header).style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

        let rows = output.raw.iter().map(|r| {
            let mut cells = vec![Cell::from(r.date.to_string()), Cell::from(format!("{:.1}", r.production))];
            cells.extend(Sector::ALL.iter().map(|s| Cell::from(format!("{:.3}", r.price(*s)))));
            Row::new(cells)
        });

        let widths = [
            Constraint::Length(11),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(18),
            Constraint::Length(17),
            Constraint::Length(17),
        ];
        let table = Table::new(rows, widths).header(header).block(block);
        frame.render_stateful_widget(table, area, &mut self.raw_state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit/toggle  Tab switch chart  Space raw  PgUp/PgDn scroll  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}
