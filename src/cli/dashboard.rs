use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};
use tracing::{info, warn};

use crate::catalog::CatalogClient;
use crate::charts::{ChartSpec, PieChart};
use crate::controller::{DashboardController, DashboardState};
use crate::error::Result;
use crate::fmt::{cents, percent, price_label, product_count};
use crate::logging;
use crate::models::Catalog;
use crate::settings::Settings;
use crate::tui::{
    init_terminal, palette_color, price_span, wrap_lines, BUTTON_STYLE, DISABLED_STYLE,
    ERROR_STYLE, FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE,
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

const SIDEBAR_WIDTH: u16 = 34;

const CATEGORY_PLACEHOLDER: &str = "Select a Category";
const PRODUCT_PLACEHOLDER: &str = "Select Products";
const NO_CATEGORY: &str = "No Category Selected";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Focus {
    Categories,
    Products,
    RunReport,
    Chart,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Categories => Focus::Products,
            Focus::Products => Focus::RunReport,
            Focus::RunReport => Focus::Chart,
            Focus::Chart => Focus::Categories,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Categories => Focus::Chart,
            Focus::Products => Focus::Categories,
            Focus::RunReport => Focus::Products,
            Focus::Chart => Focus::RunReport,
        }
    }
}

struct Dashboard {
    controller: DashboardController,
    api_url: String,
    focus: Focus,
    category_cursor: usize,
    product_cursor: usize,
    slice_cursor: usize,
    /// Id of the pie slice currently expanded.
    drilldown: Option<String>,
    status_message: Option<String>,
    /// A failed load keeps its message on screen; there is no retry.
    load_failed: bool,
}

impl Dashboard {
    fn new(api_url: String) -> Self {
        Self {
            controller: DashboardController::new(),
            api_url,
            focus: Focus::Categories,
            category_cursor: 0,
            product_cursor: 0,
            slice_cursor: 0,
            drilldown: None,
            status_message: None,
            load_failed: false,
        }
    }

    fn finish_load(&mut self, outcome: Result<Catalog>) {
        match self.controller.finish_load(outcome) {
            Ok(()) => {
                self.status_message = None;
                self.load_failed = false;
            }
            Err(e) => {
                self.status_message = Some(format!("Could not load catalog: {e}"));
                self.load_failed = true;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Returns true when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if !self.load_failed {
            self.status_message = None;
        }
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Char('c') | KeyCode::Char('C') => self.clear(),
            _ => match self.focus {
                Focus::Categories => self.handle_category_key(code),
                Focus::Products => self.handle_product_key(code),
                Focus::RunReport => self.handle_button_key(code),
                Focus::Chart => self.handle_chart_key(code),
            },
        }
        false
    }

    fn handle_category_key(&mut self, code: KeyCode) {
        let len = self.controller.categories().len();
        match code {
            KeyCode::Up => self.category_cursor = self.category_cursor.saturating_sub(1),
            KeyCode::Down => {
                self.category_cursor = (self.category_cursor + 1).min(len.saturating_sub(1))
            }
            KeyCode::Enter => {
                let Some(name) = self
                    .controller
                    .categories()
                    .get(self.category_cursor)
                    .map(|c| c.name.clone())
                else {
                    return;
                };
                self.controller.select_category(&name);
                self.product_cursor = 0;
                self.focus = Focus::Products;
            }
            _ => {}
        }
    }

    fn handle_product_key(&mut self, code: KeyCode) {
        let titles: Vec<String> = self
            .controller
            .products_in_active_category()
            .iter()
            .map(|p| p.title.clone())
            .collect();
        match code {
            KeyCode::Up => self.product_cursor = self.product_cursor.saturating_sub(1),
            KeyCode::Down => {
                self.product_cursor = (self.product_cursor + 1).min(titles.len().saturating_sub(1))
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(title) = titles.get(self.product_cursor) {
                    self.controller.toggle_product(title);
                }
            }
            _ => {}
        }
    }

    fn handle_button_key(&mut self, code: KeyCode) {
        if !matches!(code, KeyCode::Enter | KeyCode::Char(' ')) {
            return;
        }
        if !self.controller.report_enabled() {
            self.status_message = Some("Choose a category first.".to_string());
            return;
        }
        if self.controller.run_report() {
            self.drilldown = None;
            self.focus = Focus::Chart;
        }
    }

    fn handle_chart_key(&mut self, code: KeyCode) {
        let ChartSpec::Pie(pie) = self.controller.chart() else {
            return;
        };
        match code {
            KeyCode::Esc | KeyCode::Backspace => self.drilldown = None,
            _ if self.drilldown.is_some() => {}
            KeyCode::Up => self.slice_cursor = self.slice_cursor.saturating_sub(1),
            KeyCode::Down => {
                self.slice_cursor = (self.slice_cursor + 1).min(pie.slices.len().saturating_sub(1))
            }
            KeyCode::Enter => {
                self.drilldown = pie
                    .slices
                    .get(self.slice_cursor)
                    .map(|s| s.drilldown.clone());
            }
            _ => {}
        }
    }

    fn clear(&mut self) {
        self.controller.clear();
        self.category_cursor = 0;
        self.product_cursor = 0;
        self.slice_cursor = 0;
        self.drilldown = None;
        self.focus = Focus::Categories;
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);

        let [header_area, sep, body_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let mode = match self.controller.state() {
            _ if !self.controller.is_loaded() => "loading",
            DashboardState::NoCategory => "overview",
            DashboardState::CategorySelected => "filtering",
            DashboardState::ReportRun => "report",
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!(" Shelf: {}", self.api_url), HEADER_STYLE),
                Span::styled(format!("  [{mode}]"), FOOTER_STYLE),
            ])),
            header_area,
        );

        let sep_line = "━".repeat(area.width as usize);
        frame.render_widget(Paragraph::new(sep_line.as_str()).style(border_style), sep);

        let [sidebar_area, chart_area] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Fill(1)])
                .areas(body_area);

        self.draw_sidebar(frame, sidebar_area);
        self.draw_chart(frame, chart_area);

        if let Some(msg) = &self.status_message {
            let style = if self.load_failed {
                ERROR_STYLE
            } else {
                Style::default().fg(Color::Yellow)
            };
            frame.render_widget(Paragraph::new(format!(" {msg}")).style(style), hints_area);
        } else {
            frame.render_widget(
                Paragraph::new(format!(" {}", self.hints())).style(FOOTER_STYLE),
                hints_area,
            );
        }
    }

    fn hints(&self) -> &'static str {
        match self.focus {
            Focus::Categories => "Tab=next  Up/Down=navigate  Enter=select  c=clear  q=quit",
            Focus::Products => "Tab=next  Up/Down=navigate  Space=toggle  c=clear  q=quit",
            Focus::RunReport => "Tab=next  Enter=run report  c=clear  q=quit",
            Focus::Chart if self.drilldown.is_some() => "Esc=back  Tab=next  c=clear  q=quit",
            Focus::Chart => "Tab=next  Up/Down=slice  Enter=drill down  c=clear  q=quit",
        }
    }

    fn draw_sidebar(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [title_area, _, cat_label, cat_area, _, prod_label, prod_area, button_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(3),
            ])
            .areas(inner);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Filters", Style::default().add_modifier(Modifier::BOLD)),
                Span::styled("   c=Clear", FOOTER_STYLE),
            ])),
            title_area,
        );

        frame.render_widget(
            Paragraph::new(section_label(" Category", self.focus == Focus::Categories)),
            cat_label,
        );
        frame.render_widget(Paragraph::new(self.category_lines(cat_area.height)), cat_area);

        frame.render_widget(
            Paragraph::new(section_label(&self.product_heading(), self.focus == Focus::Products)),
            prod_label,
        );
        frame.render_widget(Paragraph::new(self.product_lines(prod_area.height)), prod_area);

        let button_style = if self.controller.report_enabled() {
            BUTTON_STYLE
        } else {
            DISABLED_STYLE
        };
        let frame_style = if self.focus == Focus::RunReport {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(" Run Report ", button_style))
                .alignment(Alignment::Center)
                .block(Block::bordered().border_style(frame_style)),
            button_area,
        );
    }

    fn product_heading(&self) -> String {
        match self.controller.selected_products().len() {
            0 => " Product".to_string(),
            n => format!(" Product ({n} selected)"),
        }
    }

    fn category_lines(&self, height: u16) -> Vec<Line<'static>> {
        let categories = self.controller.categories();
        let focused = self.focus == Focus::Categories;
        let selected = self.controller.selected_category();

        let mut lines = vec![Line::from(Span::styled(
            format!("   {CATEGORY_PLACEHOLDER}"),
            DISABLED_STYLE.add_modifier(Modifier::ITALIC),
        ))];
        let rows = (height as usize).saturating_sub(1);
        let (start, end) = visible_window(self.category_cursor, categories.len(), rows);
        for (i, cat) in categories.iter().enumerate().take(end).skip(start) {
            let marker = if focused && i == self.category_cursor { ">" } else { " " };
            let dot = if selected == Some(cat.name.as_str()) { "●" } else { " " };
            let label = truncate(&cat.name, SIDEBAR_WIDTH as usize - 6);
            let style = if focused && i == self.category_cursor {
                SELECTED_STYLE
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(format!(" {marker}{dot} {label}"), style)));
        }
        lines
    }

    fn product_lines(&self, height: u16) -> Vec<Line<'static>> {
        if self.controller.selected_category().is_none() {
            return vec![Line::from(Span::styled(format!("   {NO_CATEGORY}"), DISABLED_STYLE))];
        }
        let products = self.controller.products_in_active_category();
        let focused = self.focus == Focus::Products;

        let mut lines = vec![Line::from(Span::styled(
            format!("   {PRODUCT_PLACEHOLDER}"),
            DISABLED_STYLE.add_modifier(Modifier::ITALIC),
        ))];
        if products.is_empty() {
            lines.push(Line::from(Span::styled("   (none)", DISABLED_STYLE)));
            return lines;
        }
        let rows = (height as usize).saturating_sub(1);
        let (start, end) = visible_window(self.product_cursor, products.len(), rows);
        for (i, product) in products.iter().enumerate().take(end).skip(start) {
            let marker = if focused && i == self.product_cursor { ">" } else { " " };
            let check = if self.controller.is_product_selected(&product.title) {
                "[x]"
            } else {
                "[ ]"
            };
            let label = truncate(&product.title, SIDEBAR_WIDTH as usize - 8);
            let style = if focused && i == self.product_cursor {
                SELECTED_STYLE
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(format!(" {marker}{check} {label}"), style)));
        }
        lines
    }

    fn draw_chart(&self, frame: &mut Frame, area: Rect) {
        let area = Rect {
            x: area.x + 1,
            width: area.width.saturating_sub(2),
            ..area
        };
        let chart = self.controller.chart();
        match &chart {
            ChartSpec::Loading | ChartSpec::Placeholder { .. } => {
                draw_centered_title(frame, area, chart.title())
            }
            ChartSpec::Pie(pie) => {
                match self.drilldown.as_deref().and_then(|id| pie.drilldown_for(id)) {
                    Some(series) => draw_price_bars(
                        frame,
                        area,
                        &format!("{} ({})", series.name, product_count(series.points.len())),
                        &series.points,
                    ),
                    None => self.draw_pie(frame, area, pie),
                }
            }
            ChartSpec::Column(col) => draw_price_bars(frame, area, &col.title, &col.points),
        }
    }

    /// A terminal has no pie; each slice becomes a horizontal bar with its share.
    fn draw_pie(&self, frame: &mut Frame, area: Rect, pie: &PieChart) {
        let [title_area, bars_area, total_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(Span::styled(
                pie.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            title_area,
        );

        let focused = self.focus == Focus::Chart;
        let label_width = pie
            .slices
            .iter()
            .map(|s| s.name.chars().count())
            .max()
            .unwrap_or(0)
            .min(24)
            + 2;

        let (start, end) = visible_window(self.slice_cursor, pie.slices.len(), bars_area.height as usize);
        let bars: Vec<Bar> = pie
            .slices
            .iter()
            .enumerate()
            .take(end)
            .skip(start)
            .map(|(i, slice)| {
                let marker = if focused && i == self.slice_cursor { ">" } else { " " };
                Bar::default()
                    .value(slice.count as u64)
                    .label(Line::from(format!(
                        "{marker}{:<width$}",
                        truncate(&slice.name, label_width - 2),
                        width = label_width - 1
                    )))
                    .text_value(format!(
                        "{} ({})",
                        slice.count,
                        percent(pie.percentage(slice))
                    ))
                    .style(Style::default().fg(palette_color(i)))
                    .value_style(Style::default().fg(Color::Black).bg(palette_color(i)))
            })
            .collect();

        let chart = BarChart::default()
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, bars_area);

        frame.render_widget(
            Paragraph::new(format!(
                "Total: {} in {} categories",
                product_count(pie.total()),
                pie.slices.len()
            ))
            .style(FOOTER_STYLE),
            total_area,
        );
    }
}

fn section_label(text: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    Line::from(Span::styled(text.to_string(), style))
}

fn draw_centered_title(frame: &mut Frame, area: Rect, title: &str) {
    let lines = wrap_lines(title, area.width.saturating_sub(4) as usize);
    let top = area.height.saturating_sub(lines.len() as u16) / 2;
    let [_, text_area] =
        Layout::vertical([Constraint::Length(top), Constraint::Fill(1)]).areas(area);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::BOLD)),
        text_area,
    );
}

/// Vertical bars of product prices: the column report and the pie drilldown.
fn draw_price_bars(frame: &mut Frame, area: Rect, title: &str, points: &[(String, f64)]) {
    let [title_area, bars_area, axis_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new(Line::from(vec![Span::styled(
            title.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )])),
        title_area,
    );

    let bar_width = column_bar_width(bars_area.width, points.len());
    let bars: Vec<Bar> = points
        .iter()
        .enumerate()
        .map(|(i, (name, amount))| {
            Bar::default()
                .value(cents(*amount))
                .label(Line::from(truncate(name, bar_width as usize)))
                .text_value(price_label(*amount))
                .style(Style::default().fg(palette_color(i)))
                .value_style(Style::default().fg(Color::Black).bg(palette_color(i)))
        })
        .collect();

    let chart = BarChart::default()
        .bar_width(bar_width)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, bars_area);

    let max = points.iter().map(|(_, p)| *p).fold(0.0_f64, f64::max);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Price (in USD)  max ", FOOTER_STYLE),
            price_span(max),
        ])),
        axis_area,
    );
}

/// Widest bar that still fits every point, within sane bounds.
fn column_bar_width(available: u16, count: usize) -> u16 {
    if count == 0 {
        return 3;
    }
    let per_bar = available as usize / count;
    (per_bar.saturating_sub(1) as u16).clamp(3, 12)
}

/// Rows `[start, end)` of a list of `len` items that fit in `height` rows and
/// keep `cursor` visible.
fn visible_window(cursor: usize, len: usize, height: usize) -> (usize, usize) {
    if height == 0 || len == 0 {
        return (0, 0);
    }
    let start = if cursor >= height { cursor + 1 - height } else { 0 };
    (start, (start + height).min(len))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max == 0 {
        String::new()
    } else {
        let truncated: String = s.chars().take(max - 1).collect();
        format!("{truncated}\u{2026}")
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

pub fn run(settings: &Settings) -> Result<()> {
    logging::init_file(&settings.log_path())?;
    info!(api = %settings.api_base_url, "dashboard starting");

    // The fetch starts before the first frame so "Loading..." is what the
    // user sees until it lands.
    let runtime = super::runtime()?;
    let client = CatalogClient::from_settings(settings)?;
    let mut dashboard = Dashboard::new(client.base_url().to_string());

    let (tx, rx) = mpsc::channel();
    runtime.spawn(async move {
        let _ = tx.send(client.load_catalog().await);
    });

    let mut pending: Option<Receiver<Result<Catalog>>> = Some(rx);

    let mut terminal = init_terminal();

    let result: Result<()> = loop {
        if let Some(rx) = &pending {
            match rx.try_recv() {
                Ok(outcome) => {
                    dashboard.finish_load(outcome);
                    pending = None;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    warn!("catalog task ended without a result");
                    dashboard.status_message = Some("Could not load catalog.".to_string());
                    dashboard.load_failed = true;
                    pending = None;
                }
            }
        }

        if let Err(e) = terminal.draw(|frame| dashboard.draw(frame)) {
            break Err(e.into());
        }

        match event::poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => break Err(e.into()),
        }

        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    break Ok(());
                }
                if dashboard.handle_key(key.code) {
                    break Ok(());
                }
            }
            _ => {}
        }
    };

    drop(terminal);
    ratatui::restore();
    runtime.shutdown_background();
    info!("dashboard closed");
    result
}
