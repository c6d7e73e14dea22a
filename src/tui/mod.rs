//! Ratatui-based terminal UI.
//!
//! The TUI holds the two dashboard selectors (report mode, year), recomputes
//! the report synchronously whenever either changes, and renders the four
//! resulting views as charts, two per row.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::pipeline;
use crate::cli::DataArgs;
use crate::domain::{
    AggregateView, ChartKind, DataSource, GroupKey, Month, ReportMode, ReportResult, RunConfig,
    YEAR_MAX, YEAR_MIN,
};
use crate::error::AppError;
use crate::io::ingest::IngestedData;
use crate::report::{compute_report, year_selector_enabled};

mod plotters_chart;

use plotters_chart::TrendChart;

/// Start the TUI.
pub fn run(args: DataArgs) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(args)?;
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

struct App {
    config: RunConfig,
    dataset: IngestedData,
    report: Option<ReportResult>,
    selected_field: usize,
    status: String,
}

impl App {
    fn new(args: DataArgs) -> Result<Self, AppError> {
        let config = crate::app::run_config_from_args(
            &crate::cli::ReportArgs {
                data: args,
                mode: ReportMode::Yearly,
                year: YEAR_MIN,
            },
            None,
        );

        let dataset = pipeline::load_dataset(&config)?;
        let mut app = Self {
            status: format!("Loaded {} records.", dataset.stats.n_records),
            config,
            dataset,
            report: None,
            selected_field: 0,
        };
        app.recompute()?;
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
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
                    if self.handle_key(key.code)? {
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

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < 1 {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1)?,
            KeyCode::Right => self.adjust_field(1)?,
            KeyCode::Char('m') => {
                self.config.mode = self.config.mode.toggle();
                self.recompute()?;
                self.status = format!("report: {}", self.config.mode.display_name());
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('d') => {
                if let Some(report) = &self.report {
                    match crate::debug::write_debug_bundle(&self.dataset, &self.config, report) {
                        Ok(path) => {
                            self.status = format!("Wrote debug bundle: {}", path.display());
                        }
                        Err(err) => {
                            self.status = format!("Debug write failed: {err}");
                        }
                    }
                } else {
                    self.status = "No report computed yet.".to_string();
                }
            }
            _ => {}
        }

        Ok(false)
    }

    fn adjust_field(&mut self, delta: i32) -> Result<(), AppError> {
        match self.selected_field {
            0 => {
                self.config.mode = self.config.mode.toggle();
                self.recompute()?;
                self.status = format!("report: {}", self.config.mode.display_name());
            }
            1 => {
                if !year_selector_enabled(self.config.mode) {
                    self.status =
                        "Year selector is not applicable to Recession Period Statistics."
                            .to_string();
                    return Ok(());
                }
                let year = self.config.year.unwrap_or(YEAR_MIN);
                let next = if delta >= 0 {
                    year.saturating_add(1).min(YEAR_MAX)
                } else {
                    year.saturating_sub(1).max(YEAR_MIN)
                };
                self.config.year = Some(next);
                self.recompute()?;
                self.status = format!("year: {next}");
            }
            _ => {}
        }
        Ok(())
    }

    fn reload(&mut self) {
        if matches!(self.config.source, DataSource::Sample) {
            self.config.sample_seed = self.config.sample_seed.wrapping_add(1);
        }
        match pipeline::load_dataset(&self.config) {
            Ok(dataset) => {
                self.dataset = dataset;
                match self.recompute() {
                    Ok(()) => {
                        self.status = format!(
                            "Reloaded {} records (seed {}).",
                            self.dataset.stats.n_records, self.config.sample_seed
                        );
                    }
                    Err(err) => self.status = format!("Recompute failed: {err}"),
                }
            }
            Err(err) => self.status = format!("Reload failed: {err}"),
        }
    }

    /// One interaction, one synchronous report computation.
    fn recompute(&mut self) -> Result<(), AppError> {
        let report = compute_report(&self.dataset.records, self.config.mode, self.config.year)?;
        self.report = Some(report);
        Ok(())
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
            Span::styled("autostats", Style::default().fg(Color::Cyan)),
            Span::raw(" — Automobile Sales Statistics Dashboard"),
        ]));

        let year_label = if year_selector_enabled(self.config.mode) {
            self.config
                .year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "-".to_string())
        } else {
            "n/a".to_string()
        };

        lines.push(Line::from(Span::styled(
            format!(
                "report: {} | year: {year_label} | records: {} | years: {}-{} | recession rows: {}",
                self.config.mode.display_name(),
                self.dataset.stats.n_records,
                self.dataset.stats.year_min,
                self.dataset.stats.year_max,
                self.dataset.stats.recession_rows,
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(4)])
            .split(area);

        self.draw_charts(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    /// Four views, paired into two rows of two — a rendering concern only.
    fn draw_charts(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let quadrants: Vec<Rect> = rows
            .iter()
            .flat_map(|row| {
                Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(*row)
                    .to_vec()
            })
            .collect();

        let Some(report) = &self.report else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        };

        for (idx, view) in report.views.iter().enumerate() {
            self.draw_view(frame, quadrants[idx], idx, view);
        }
    }

    fn draw_view(&self, frame: &mut ratatui::Frame<'_>, area: Rect, idx: usize, view: &AggregateView) {
        let tag = (b'A' + idx as u8) as char;
        let block = Block::default()
            .title(format!("[{tag}] {}", view.title))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if view.is_empty() {
            let msg = Paragraph::new("(no matching rows)")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        match view.chart {
            ChartKind::Line => draw_line_view(frame, inner, view),
            ChartKind::Bar => draw_bar_view(frame, inner, view, Color::Cyan),
            ChartKind::Share => draw_share_view(frame, inner, view),
            ChartKind::GroupedBar => draw_grouped_bar_view(frame, inner, view),
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let year_label = if year_selector_enabled(self.config.mode) {
            self.config
                .year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "-".to_string())
        } else {
            "n/a (recession period)".to_string()
        };

        let items = vec![
            ListItem::new(format!("Report: {}", self.config.mode.display_name())),
            ListItem::new(format!("Year:   {year_label}")),
        ];

        let list = List::new(items)
            .block(Block::default().title("Selectors").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  m mode  r reload  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Build the ordered (x, y) series for a line view.
///
/// Year keys plot at the year number, month keys at their calendar ordinal.
fn line_series(view: &AggregateView) -> Vec<(f64, f64)> {
    view.rows
        .iter()
        .enumerate()
        .map(|(i, (key, value))| {
            let x = match key {
                GroupKey::Year(y) => f64::from(*y),
                GroupKey::Month(m) => month_ordinal(*m),
                // Line views only carry year or month keys; anything else is
                // plotted by row position.
                _ => (i + 1) as f64,
            };
            (x, *value)
        })
        .collect()
}

fn month_ordinal(month: Month) -> f64 {
    (Month::ALL.iter().position(|m| *m == month).unwrap_or(0) + 1) as f64
}

fn draw_line_view(frame: &mut ratatui::Frame<'_>, area: Rect, view: &AggregateView) {
    let series = line_series(view);

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in &series {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !(x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite()) {
        return;
    }
    // Single-point series still need a non-degenerate window.
    if x_max <= x_min {
        x_min -= 0.5;
        x_max += 0.5;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-9);
    let y_bounds = [y_min - pad, y_max + pad];

    let monthly = matches!(view.rows.first(), Some((GroupKey::Month(_), _)));
    let (x_label, fmt_x): (&str, fn(f64) -> String) = if monthly {
        ("month", fmt_axis_month)
    } else {
        ("year", fmt_axis_year)
    };

    let widget = TrendChart {
        series: &series,
        x_bounds: [x_min, x_max],
        y_bounds,
        x_label,
        y_label: "sales",
        fmt_x,
        fmt_y: fmt_axis_value,
    };
    frame.render_widget(widget, area);
}

fn draw_bar_view(frame: &mut ratatui::Frame<'_>, area: Rect, view: &AggregateView, color: Color) {
    let bars: Vec<Bar> = view
        .rows
        .iter()
        .map(|(key, value)| {
            Bar::default()
                .value(value.round().max(0.0) as u64)
                .text_value(format!("{value:.0}"))
                .label(Line::from(short_label(&key.label())))
        })
        .collect();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width(area, bars.len()))
        .bar_gap(1)
        .bar_style(Style::default().fg(color))
        .value_style(Style::default().fg(Color::Black).bg(color));
    frame.render_widget(chart, area);
}

/// Proportion view: percentage bars standing in for the dashboard's pie.
///
/// Zero-sum groups are valid; they render as zero-share slices.
fn draw_share_view(frame: &mut ratatui::Frame<'_>, area: Rect, view: &AggregateView) {
    let total: f64 = view.rows.iter().map(|(_, v)| v).sum();

    let bars: Vec<Bar> = view
        .rows
        .iter()
        .map(|(key, value)| {
            let pct = if total > 0.0 { 100.0 * value / total } else { 0.0 };
            Bar::default()
                .value(pct.round().max(0.0) as u64)
                .text_value(format!("{pct:.1}%"))
                .label(Line::from(short_label(&key.label())))
        })
        .collect();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        // Percent scale: keep bars comparable across redraws.
        .max(100)
        .bar_width(bar_width(area, bars.len()))
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Magenta))
        .value_style(Style::default().fg(Color::Black).bg(Color::Magenta));
    frame.render_widget(chart, area);
}

/// Clustered bars: one group per unemployment rate, one bar per vehicle type.
fn draw_grouped_bar_view(frame: &mut ratatui::Frame<'_>, area: Rect, view: &AggregateView) {
    // Rows arrive ordered by rate then vehicle type; fold consecutive rows
    // with the same rate into one group.
    let mut groups: Vec<(String, Vec<Bar>)> = Vec::new();
    for (key, value) in &view.rows {
        let GroupKey::RateVehicle { rate, vehicle_type } = key else {
            continue;
        };
        let label = format!("{rate:.1}%");
        let bar = Bar::default()
            .value(value.round().max(0.0) as u64)
            .text_value(format!("{value:.0}"))
            .label(Line::from(short_label(vehicle_type)));

        match groups.last_mut() {
            Some((last, bars)) if *last == label => bars.push(bar),
            _ => groups.push((label, vec![bar])),
        }
    }

    // Wide datasets produce more rate groups than a terminal can show; keep
    // the leftmost groups that fit rather than squeezing all of them.
    let per_group_width = 10u16;
    let max_groups = (area.width / per_group_width).max(1) as usize;

    let mut chart = BarChart::default()
        .bar_width(3)
        .bar_gap(0)
        .group_gap(2)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green));
    for (label, bars) in groups.iter().take(max_groups) {
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(label.clone()))
                .bars(bars),
        );
    }
    frame.render_widget(chart, area);
}

fn bar_width(area: Rect, n: usize) -> u16 {
    if n == 0 {
        return 1;
    }
    let usable = area.width.saturating_sub(n as u16); // 1-cell gaps
    (usable / n as u16).clamp(3, 12)
}

/// Bar labels have one bar-width of room; abbreviate long category names.
fn short_label(s: &str) -> String {
    if s.chars().count() <= 8 {
        s.to_string()
    } else {
        s.chars().take(7).chain(['.']).collect()
    }
}

fn fmt_axis_year(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_month(v: f64) -> String {
    let idx = v.round() as usize;
    if (1..=12).contains(&idx) {
        Month::ALL[idx - 1].label().to_string()
    } else {
        String::new()
    }
}

fn fmt_axis_value(v: f64) -> String {
    format!("{v:.0}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_series_uses_year_and_month_positions() {
        let view = AggregateView {
            title: "t".to_string(),
            chart: ChartKind::Line,
            rows: vec![
                (GroupKey::Year(1980), 10.0),
                (GroupKey::Year(1990), 20.0),
            ],
        };
        assert_eq!(line_series(&view), vec![(1980.0, 10.0), (1990.0, 20.0)]);

        let view = AggregateView {
            title: "t".to_string(),
            chart: ChartKind::Line,
            rows: vec![
                (GroupKey::Month(Month::Jan), 1.0),
                (GroupKey::Month(Month::Dec), 2.0),
            ],
        };
        assert_eq!(line_series(&view), vec![(1.0, 1.0), (12.0, 2.0)]);
    }

    #[test]
    fn short_label_abbreviates() {
        assert_eq!(short_label("Sports"), "Sports");
        assert_eq!(short_label("Mediumfamilycar"), "Mediumf.");
    }

    #[test]
    fn month_axis_formatter_is_bounded() {
        assert_eq!(fmt_axis_month(1.0), "Jan");
        assert_eq!(fmt_axis_month(12.0), "Dec");
        assert_eq!(fmt_axis_month(0.0), "");
        assert_eq!(fmt_axis_month(13.2), "");
    }
}
