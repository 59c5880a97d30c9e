//! Ratatui-based terminal UI.
//!
//! The screen has the grade histogram and distribution table on top, the
//! boundary slider below them, and a footer with the nearest-score readout.
//! Every boundary edit goes through the [`Controller`]; this module only maps
//! keys and mouse events onto controller calls and draws its snapshots.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table},
};
use tracing::{info, warn};

use crate::app::pipeline::{ScoreSource, Session};
use crate::domain::GradingConfig;
use crate::error::AppError;
use crate::grading::Controller;
use crate::io::discover::{discover_marks_sheets, display_path};
use crate::io::export::write_graded_sheet;
use crate::io::ingest::{Roster, SheetFormat, load_roster};

mod plotters_chart;
mod slider;

use plotters_chart::{Bar, HistogramChart, band_color};
use slider::{SliderTrack, column_to_value, nearest_handle};

/// Poll timeout when no recomputation is waiting.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Start the TUI.
pub fn run(config: GradingConfig, session: Session) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, session);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen, mouse) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Normal,
    /// Typing a value for the selected handle.
    Editing { buffer: String },
    /// Choosing a marks sheet to load.
    Opening { files: Vec<PathBuf>, cursor: usize },
}

struct App {
    config: GradingConfig,
    controller: Controller,
    roster: Roster,
    source: ScoreSource,
    selected: usize,
    /// Handle under an active mouse drag.
    dragging: Option<usize>,
    mode: Mode,
    status: String,
    /// Inner area of the slider block from the last draw, for hit-testing.
    track_area: Rect,
}

impl App {
    fn new(config: GradingConfig, session: Session) -> Self {
        let controller = Controller::new(session.boundaries, session.roster.scores(), config.debounce);
        let status = match session.roster.row_errors.len() {
            0 => format!("Loaded {}.", session.source.describe()),
            n => format!("Loaded {} ({n} rows without usable marks).", session.source.describe()),
        };
        let mut app = Self {
            config,
            controller,
            roster: session.roster,
            source: session.source,
            selected: 0,
            dragging: None,
            mode: Mode::Normal,
            status,
            track_area: Rect::default(),
        };
        if app.source == ScoreSource::Unloaded {
            app.offer_sheets(discover_marks_sheets());
        }
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            let timeout = self.poll_timeout(Instant::now());
            if event::poll(timeout).map_err(|e| AppError::terminal(format!("Event poll error: {e}")))? {
                match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                    Event::Key(key) => {
                        if key.kind == KeyEventKind::Press {
                            if self.handle_key(key) {
                                break;
                            }
                            needs_redraw = true;
                        }
                    }
                    Event::Mouse(mouse) => {
                        needs_redraw |= self.handle_mouse(mouse, Instant::now());
                    }
                    Event::Resize(_, _) => {
                        needs_redraw = true;
                    }
                    _ => {}
                }
            }

            if self.controller.tick(Instant::now()) {
                needs_redraw = true;
            }
        }
        Ok(())
    }

    /// Sleep until the next debounced recomputation is due, or idle.
    fn poll_timeout(&self, now: Instant) -> Duration {
        self.controller
            .next_deadline()
            .map_or(IDLE_POLL, |deadline| deadline.saturating_duration_since(now))
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match self.mode {
            Mode::Editing { .. } => {
                self.handle_edit_key(key.code);
                return false;
            }
            Mode::Opening { .. } => {
                self.handle_open_key(key.code);
                return false;
            }
            Mode::Normal => {}
        }

        let count = self.controller.boundaries().len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left | KeyCode::Right => {
                let step = self.nudge_step(key.modifiers);
                let delta = if key.code == KeyCode::Left { -step } else { step };
                match self.controller.drag_by(self.selected, delta, Instant::now()) {
                    Ok(value) => self.status = format!("{}: {value:.2}", self.selected_label()),
                    Err(err) => self.status = err.to_string(),
                }
            }
            KeyCode::Up | KeyCode::Tab => {
                self.selected = (self.selected + 1) % count;
                self.note_cap_only();
            }
            KeyCode::Down | KeyCode::BackTab => {
                self.selected = (self.selected + count - 1) % count;
                self.note_cap_only();
            }
            KeyCode::Enter => {
                self.controller.release();
                self.mode = Mode::Editing { buffer: String::new() };
                self.status = format!("Enter a value for {}. Enter to apply, Esc to cancel.", self.selected_label());
            }
            KeyCode::Char('r') => match self.controller.reset_defaults() {
                Ok(()) => self.status = "Boundaries reset to defaults.".to_string(),
                Err(err) => self.status = err.to_string(),
            },
            KeyCode::Char('v') => {
                let next = self.controller.boundaries().variant().next();
                self.controller.switch_variant(next);
                self.config.variant = next;
                self.selected = self.selected.min(self.controller.boundaries().len() - 1);
                self.status = format!("Layout: {}", next.display_name());
            }
            KeyCode::Char('o') => self.offer_sheets(discover_marks_sheets()),
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
        false
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        let Mode::Editing { buffer } = &mut self.mode else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let text = std::mem::take(buffer);
                self.mode = Mode::Normal;
                match self.controller.type_value(self.selected, &text) {
                    Ok(value) => self.status = format!("{}: {value:.2}", self.selected_label()),
                    Err(err) => self.status = err.to_string(),
                }
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
                buffer.push(c);
            }
            _ => {}
        }
    }

    fn handle_open_key(&mut self, code: KeyCode) {
        let Mode::Opening { files, cursor } = &mut self.mode else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                if self.source == ScoreSource::Unloaded {
                    self.status = "No sheet loaded. Press o to open one.".to_string();
                }
            }
            KeyCode::Up => *cursor = cursor.saturating_sub(1),
            KeyCode::Down => *cursor = (*cursor + 1).min(files.len().saturating_sub(1)),
            KeyCode::Enter => {
                let path = files.get(*cursor).cloned();
                self.mode = Mode::Normal;
                if let Some(path) = path {
                    self.load_sheet(path);
                }
            }
            _ => {}
        }
    }

    /// Returns whether anything changed on screen.
    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) -> bool {
        let area = self.track_area;
        if self.mode != Mode::Normal || area.width == 0 {
            return false;
        }
        let column = mouse.column.clamp(area.x, (area.x + area.width).saturating_sub(1)) - area.x;
        let value = column_to_value(self.controller.boundaries().range(), area.width, column);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let inside = mouse.row >= area.y
                    && mouse.row < area.y + area.height
                    && mouse.column >= area.x
                    && mouse.column < area.x + area.width;
                if !inside {
                    return false;
                }
                let Some(index) = nearest_handle(self.controller.boundaries(), area.width, column) else {
                    return false;
                };
                self.selected = index;
                self.dragging = Some(index);
                self.drag_selected(value, now);
                true
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.dragging.is_none() {
                    return false;
                }
                self.drag_selected(value, now);
                true
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.dragging.take().is_none() {
                    return false;
                }
                self.controller.release();
                true
            }
            _ => false,
        }
    }

    /// Open the sheet dialog on `files`, or explain why there is nothing to open.
    fn offer_sheets(&mut self, files: Vec<PathBuf>) {
        if files.is_empty() {
            self.status =
                "No sheets with a Marks column under the current directory. Try `grades tui -i <sheet>`.".to_string();
        } else {
            self.status = format!("{} sheet(s) found.", files.len());
            self.mode = Mode::Opening { files, cursor: 0 };
        }
    }

    fn note_cap_only(&mut self) {
        if self.controller.boundaries().is_cap_only(self.selected) {
            self.status = format!("{} grades nothing; it only caps the handle below it.", self.selected_label());
        }
    }

    fn drag_selected(&mut self, value: f64, now: Instant) {
        match self.controller.drag_to(self.selected, value, now) {
            Ok(applied) => self.status = format!("{}: {applied:.2}", self.selected_label()),
            Err(err) => self.status = err.to_string(),
        }
    }

    fn load_sheet(&mut self, path: PathBuf) {
        match load_roster(&path, self.controller.boundaries().range()) {
            Ok(roster) => {
                self.controller.load_scores(roster.scores());
                self.status = format!(
                    "Loaded {} ({} scores, {} rejected rows).",
                    path.display(),
                    roster.rows_used(),
                    roster.row_errors.len()
                );
                self.roster = roster;
                self.source = ScoreSource::Sheet(path);
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "sheet load failed");
                self.status = err.to_string();
            }
        }
    }

    fn export(&mut self) {
        if self.roster.rows_used() == 0 {
            self.status = AppError::empty_dataset("No scores to export.").to_string();
            return;
        }
        self.controller.release();

        let path = self
            .config
            .output
            .clone()
            .unwrap_or_else(|| default_export_path(&self.source));
        match write_graded_sheet(&path, &self.roster, self.controller.boundaries(), false) {
            Ok(rows) => {
                info!(path = %path.display(), rows, "exported from tui");
                self.status = format!("Exported {rows} rows to {}.", path.display());
            }
            Err(err) => {
                warn!(error = %err, "export failed");
                self.status = err.to_string();
            }
        }
    }

    fn nudge_step(&self, modifiers: KeyModifiers) -> f64 {
        let step = self.controller.boundaries().range().span() / 100.0;
        if modifiers.contains(KeyModifiers::SHIFT) {
            step * 5.0
        } else {
            step
        }
    }

    fn selected_label(&self) -> &'static str {
        self.controller.boundaries().handle_label(self.selected).unwrap_or("?")
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(5),
                Constraint::Length(4),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_slider(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);

        match &self.mode {
            Mode::Editing { buffer } => self.draw_edit_popup(frame, size, buffer),
            Mode::Opening { files, cursor } => draw_open_popup(frame, size, files, *cursor),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let summary = self.controller.summary();
        let average = summary.average.map_or_else(|| "-".to_string(), |a| format!("{a:.2}"));
        let mut spans = vec![
            Span::styled("grades", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {} | ", self.source.describe())),
            Span::styled(
                format!(
                    "layout: {} | n={} | average: {average}",
                    self.controller.boundaries().variant().display_name(),
                    summary.total,
                ),
                Style::default().fg(Color::Gray),
            ),
        ];
        if self.controller.is_stale() {
            spans.push(Span::styled(" | updating…", Style::default().fg(Color::Yellow)));
        }

        let p = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_table(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Distribution").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let summary = self.controller.summary();
        let bands = summary.rows.len();
        let bars: Vec<Bar> = summary
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| Bar {
                lower: row.lower,
                upper: row.upper,
                count: row.count as f64,
                color: band_color(i, bands),
            })
            .collect();

        let range = self.controller.boundaries().range();
        let y_top = (summary.max_count().max(1) as f64 * 1.15).ceil();
        let widget = HistogramChart {
            bars: &bars,
            boundaries: self.controller.boundaries().values(),
            average: summary.average,
            x_bounds: [range.min, range.max],
            y_bounds: [0.0, y_top],
            x_label: "marks",
            y_label: "students",
        };
        frame.render_widget(widget, inner);
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let summary = self.controller.summary();
        let grouped = summary.variant.percentage_groups().is_some();
        let bands = summary.rows.len();

        let mut header = vec!["Grade", "Range", "Students", "%age"];
        if grouped {
            header.push("Grouped");
        }

        let rows = summary.rows.iter().enumerate().rev().map(|(i, row)| {
            let plotters::style::RGBColor(r, g, b) = band_color(i, bands);
            let mut cells = vec![
                Cell::from(row.label).style(Style::default().fg(Color::Rgb(r, g, b))),
                Cell::from(format!("{:.2}-{:.2}", row.lower, row.upper)),
                Cell::from(row.count.to_string()),
                Cell::from(format!("{:.2}%", row.percentage)),
            ];
            if grouped {
                cells.push(Cell::from(
                    row.grouped_percentage.map(|p| format!("{p:.2}%")).unwrap_or_default(),
                ));
            }
            Row::new(cells)
        });

        let mut widths = vec![
            Constraint::Length(5),
            Constraint::Length(13),
            Constraint::Length(8),
            Constraint::Length(8),
        ];
        if grouped {
            widths.push(Constraint::Length(8));
        }

        let title = format!("Grades (total {})", summary.total);
        let table = Table::new(rows, widths)
            .header(Row::new(header).style(Style::default().add_modifier(Modifier::BOLD)))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(table, area);
    }

    fn draw_slider(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Boundaries").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.track_area = inner;

        let scores = self.controller.scores();
        let widget = SliderTrack {
            boundaries: self.controller.boundaries(),
            scores,
            selected: self.selected,
            dragging: self.dragging.is_some(),
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let feedback = match self.controller.feedback() {
            Some(f) => format!(
                "Difference : {:.2} ({:.2} to {:.2})",
                f.difference, f.below, f.above
            ),
            None => "Difference : -".to_string(),
        };
        let help = "←/→ nudge (shift ×5)  ↑/↓ select  Enter type  r reset  v layout  o open  e export  q quit";
        let text = Text::from(vec![
            Line::from(vec![
                Span::styled(feedback, Style::default().fg(Color::Cyan)),
                Span::raw(" | "),
                Span::styled(&self.status, Style::default().fg(Color::Yellow)),
            ]),
            Line::from(Span::styled(help, Style::default().fg(Color::Gray))),
        ]);
        let p = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_edit_popup(&self, frame: &mut ratatui::Frame<'_>, area: Rect, buffer: &str) {
        let rect = centered(area, 40, 3);
        let title = format!("{} value", self.selected_label());
        let p = Paragraph::new(format!("{buffer}_"))
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(Clear, rect);
        frame.render_widget(p, rect);
    }
}

fn draw_open_popup(frame: &mut ratatui::Frame<'_>, area: Rect, files: &[PathBuf], cursor: usize) {
    let height = (files.len() as u16 + 2).min(area.height.saturating_sub(2)).max(3);
    let rect = centered(area, 60, height);
    let items: Vec<ListItem> = files
        .iter()
        .map(|p| ListItem::new(display_path(p)))
        .collect();
    let list = List::new(items)
        .block(Block::default().title("Open marks sheet").borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
        .highlight_symbol("» ");

    let mut state = ListState::default();
    state.select(Some(cursor));
    frame.render_widget(Clear, rect);
    frame.render_stateful_widget(list, rect, &mut state);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Timestamped export path in the source sheet's format.
fn default_export_path(source: &ScoreSource) -> PathBuf {
    let format = match source {
        ScoreSource::Sheet(path) => SheetFormat::from_path(path).unwrap_or(SheetFormat::Csv),
        _ => SheetFormat::Csv,
    };
    let stem = chrono::Local::now().format("graded_%Y%m%d_%H%M%S");
    PathBuf::from(format!("{stem}.{}", format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ScoreRange, Variant};
    use crate::grading::BoundarySet;
    use ratatui::backend::TestBackend;

    fn app(variant: Variant, scores: &[f64]) -> App {
        let config = GradingConfig {
            variant,
            ..GradingConfig::default()
        };
        let session = Session {
            source: ScoreSource::Demo {
                count: scores.len(),
                seed: 0,
            },
            roster: Roster::from_scores(scores),
            boundaries: BoundarySet::with_defaults(variant, ScoreRange::default()),
        };
        let mut app = App::new(config, session);
        // 101 columns map one column per mark.
        app.track_area = Rect::new(1, 20, 101, 3);
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row: 21,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn typed_value_moves_selected_handle() {
        let mut app = app(Variant::Four, &[49.0, 60.0, 90.0]);
        assert!(!app.handle_key(key(KeyCode::Enter)));
        for c in "55".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.controller.boundaries().get(0), Some(55.0));
        assert_eq!(app.mode, Mode::Normal);
        // 49 and 60 now straddle D.
        let feedback = app.controller.feedback().unwrap();
        assert_eq!(feedback.difference, 11.0);
    }

    #[test]
    fn typed_garbage_is_rejected_without_change() {
        let mut app = app(Variant::Four, &[49.0]);
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char('-')));
        app.handle_key(key(KeyCode::Char('.')));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.controller.boundaries().get(0), Some(50.0));
        assert!(app.status.contains("not a valid number"));
    }

    #[test]
    fn arrows_select_and_nudge() {
        let mut app = app(Variant::Four, &[]);
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.selected, 1);
        app.handle_key(key(KeyCode::Right));
        app.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT));
        assert_eq!(app.controller.boundaries().get(1), Some(66.0));
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected, 3);
    }

    #[test]
    fn mouse_drag_moves_nearest_handle_and_release_recomputes() {
        let mut app = app(Variant::Four, &[45.0, 52.0]);
        let start = Instant::now();
        // Column 51 in the track is value 50, the D handle.
        assert!(app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 51), start));
        assert_eq!(app.dragging, Some(0));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 41), start);
        assert_eq!(app.controller.boundaries().get(0), Some(40.0));
        assert!(app.controller.is_stale());

        assert!(app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 41), start));
        assert!(!app.controller.is_stale());
        assert_eq!(app.dragging, None);
        // Both scores now reach D.
        assert_eq!(app.controller.summary().rows[1].count, 2);
    }

    #[test]
    fn drag_is_clamped_by_neighbour() {
        let mut app = app(Variant::Four, &[]);
        let now = Instant::now();
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 61), now);
        assert_eq!(app.selected, 1);
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 101), now);
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 101), now);
        assert_eq!(app.controller.boundaries().get(1), Some(75.0));
    }

    #[test]
    fn variant_switch_and_reset() {
        let mut app = app(Variant::Nine, &[46.0]);
        app.selected = 8;
        app.handle_key(key(KeyCode::Char('v')));
        assert_eq!(app.controller.boundaries().variant(), Variant::Four);
        assert_eq!(app.selected, 3);

        app.handle_key(key(KeyCode::Right));
        app.controller.release();
        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.controller.boundaries().values(), &[50.0, 60.0, 75.0, 85.0]);
    }

    #[test]
    fn export_writes_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("graded.csv");
        let mut app = app(Variant::Four, &[49.0, 90.0]);
        app.config.output = Some(out.clone());
        app.handle_key(key(KeyCode::Char('e')));

        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().next(), Some("SNo,Marks,Grade"));
        assert!(text.contains("1,49.00,F"));
        assert!(text.contains("2,90.00,A"));
    }

    #[test]
    fn export_to_xlsx_path_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("graded.xlsx");
        let mut app = app(Variant::Four, &[49.0, 90.0]);
        app.config.output = Some(out.clone());
        app.handle_key(key(KeyCode::Char('e')));

        let back = load_roster(&out, ScoreRange::default()).unwrap();
        let grades: Vec<_> = back.rows.iter().map(|r| back.field(r, "Grade").unwrap_or("")).collect();
        assert_eq!(grades, ["F", "A"]);
    }

    #[test]
    fn default_export_follows_source_format() {
        let xlsx = default_export_path(&ScoreSource::Sheet(PathBuf::from("term1/marks.xlsx")));
        assert_eq!(xlsx.extension().and_then(|e| e.to_str()), Some("xlsx"));
        let demo = default_export_path(&ScoreSource::Demo { count: 3, seed: 1 });
        assert_eq!(demo.extension().and_then(|e| e.to_str()), Some("csv"));
    }

    #[test]
    fn open_dialog_lists_sheets_or_explains() {
        let mut app = app(Variant::Four, &[]);
        app.offer_sheets(Vec::new());
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.status.contains("No sheets with a Marks column"));

        app.offer_sheets(vec![PathBuf::from("marks.csv")]);
        assert!(matches!(app.mode, Mode::Opening { ref files, cursor: 0 } if files.len() == 1));
        app.source = ScoreSource::Unloaded;
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.status.contains("Press o"));
    }

    #[test]
    fn selecting_cap_only_handle_explains_it() {
        let mut app = app(Variant::Nine, &[]);
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected, 8);
        assert!(app.status.contains("only caps"));
        // The keyboard can still move it.
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.controller.boundaries().get(8), Some(94.0));
    }

    #[test]
    fn export_without_scores_reports_empty_dataset() {
        let mut app = app(Variant::Four, &[]);
        app.handle_key(key(KeyCode::Char('e')));
        assert!(app.status.contains("No scores"));
    }

    #[test]
    fn draw_renders_table_and_feedback() {
        let mut app = app(Variant::Nine, &[46.0, 70.0, 90.0]);
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Grouped"));
        assert!(text.contains("Difference : -"));
        assert!(text.contains("average: 68.67"));
        // Slider inner area is recorded for hit-testing.
        assert_eq!(app.track_area.height, 3);
    }
}
