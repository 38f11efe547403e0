use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Clear, Dataset as ChartDataset,
    Gauge, GraphType, Paragraph, Row, Table, Tabs, Wrap,
};

use nba_terminal::charts::HistogramBin;
use nba_terminal::config::AppConfig;
use nba_terminal::correlation::Correlation;
use nba_terminal::dashboard::{
    CORRELATION_COMMENTARY, DashboardView, NO_MATCH_MESSAGE, OVERVIEW_COMMENTARY,
};
use nba_terminal::export;
use nba_terminal::filter::MIN_POINTS_CEIL;
use nba_terminal::player_stats::StatColumn;
use nba_terminal::season_cache::SeasonCache;
use nba_terminal::state::{AppState, LoadState, POINTS_BIG_STEP, POINTS_STEP, Tab, tab_label};
use nba_terminal::stats_fetch::source_from_config;

struct App {
    state: AppState,
    cache: SeasonCache,
    config: AppConfig,
    should_quit: bool,
    needs_load: bool,
}

impl App {
    fn new(config: AppConfig, cache: SeasonCache) -> Self {
        let mut state = AppState::new(config.season.clone(), config.initial_criteria());
        state.source_label = cache.source_label();
        Self {
            state,
            cache,
            config,
            should_quit: false,
            needs_load: true,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        let arrow_step = if key.modifiers.contains(KeyModifiers::SHIFT) {
            POINTS_BIG_STEP
        } else {
            POINTS_STEP
        };
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => self.state.toggle_tab(),
            KeyCode::Char('1') => self.state.tab = Tab::Overview,
            KeyCode::Char('2') => self.state.tab = Tab::Correlation,
            KeyCode::Char('+') | KeyCode::Char('=') => self.state.raise_min_points(POINTS_STEP),
            KeyCode::Char('-') | KeyCode::Char('_') => self.state.lower_min_points(POINTS_STEP),
            KeyCode::Right => self.state.raise_min_points(arrow_step),
            KeyCode::Left => self.state.lower_min_points(arrow_step),
            KeyCode::PageUp => self.state.raise_min_points(POINTS_BIG_STEP),
            KeyCode::PageDown => self.state.lower_min_points(POINTS_BIG_STEP),
            KeyCode::Char('t') => self.state.cycle_team_next(),
            KeyCode::Char('T') => self.state.cycle_team_prev(),
            KeyCode::Char('0') => self.state.reset_filters(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_reload(),
            KeyCode::Char('e') | KeyCode::Char('E') => self.export_view(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn request_reload(&mut self) {
        if self.state.load == LoadState::Loaded {
            self.state
                .push_log("[INFO] Season already loaded; data is cached for this session");
            return;
        }
        self.needs_load = true;
    }

    fn load_dataset(&mut self) {
        self.needs_load = false;
        let season = self.state.season.clone();
        self.state.push_log(format!(
            "[INFO] Fetching {season} from {}",
            self.cache.source_label()
        ));
        match self.cache.get_or_fetch(&season) {
            Ok(dataset) => self.state.set_dataset(dataset),
            Err(err) => self.state.set_load_error(err.to_string()),
        }
    }

    fn export_view(&mut self) {
        let Some(dataset) = self.state.dataset.clone() else {
            self.state.push_log("[INFO] Nothing to export yet");
            return;
        };
        let path = export::default_export_path(&self.config.export_dir, dataset.season());
        match export::export_view(&path, &dataset, &self.state.criteria) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Exported {} players to {}",
                report.players,
                report.path.display()
            )),
            Err(err) => self.state.push_log(format!("[ERROR] Export failed: {err:#}")),
        }
    }
}

fn main() -> Result<()> {
    let config = AppConfig::load();
    let source = source_from_config(&config)?;
    let cache = SeasonCache::new(source);
    let mut app = App::new(config, cache);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        // Draw the loading frame first; the fetch itself blocks.
        if app.needs_load {
            app.load_dataset();
            continue;
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let selected = match app.state.tab {
        Tab::Overview => 0,
        Tab::Correlation => 1,
    };
    let tabs = Tabs::new(vec![tab_label(Tab::Overview), tab_label(Tab::Correlation)])
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(30)])
        .split(chunks[2]);

    render_sidebar(frame, body[0], &app.state);
    render_main(frame, body[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[3]);

    let footer = Paragraph::new(footer_text()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[4]);

    if app.state.help_overlay {
        let area = frame.size();
        render_help_overlay(frame, area);
    }
}

fn header_text(app: &App) -> String {
    let status = match &app.state.load {
        LoadState::Idle => "LOADING".to_string(),
        LoadState::Loaded => "READY".to_string(),
        LoadState::Failed(_) => "FETCH FAILED".to_string(),
    };
    let line1 = format!(
        "  .-.  NBA ANALYTICS | Season {} | {} | {}",
        app.state.season, app.state.source_label, status
    );
    let line2 = " ( o )".to_string();
    let line3 = "  '-'".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text() -> String {
    "Tab/1/2 View | +/- ←/→ Min PTS (Shift x10) | t/T Team | 0 Reset | j/k Move | e Export | r Retry | ? Help | q Quit".to_string()
}

fn render_sidebar(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title("Filter Statistics")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(inner);

    let min_points = state.criteria.minimum_points();
    frame.render_widget(Paragraph::new("Minimum Points Scored"), rows[0]);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::LightBlue).bg(Color::Black))
        .ratio(f64::from(min_points) / f64::from(MIN_POINTS_CEIL))
        .label(format!("{min_points} / {MIN_POINTS_CEIL}"));
    frame.render_widget(gauge, rows[1]);

    frame.render_widget(Paragraph::new("Select Team"), rows[2]);
    let team = Paragraph::new(format!("< {} >", state.criteria.team.label()))
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(team, rows[3]);

    let summary = match &state.view {
        Some(view) => view.summary_lines().join("\n"),
        None => "No data loaded".to_string(),
    };
    frame.render_widget(
        Paragraph::new(summary).wrap(Wrap { trim: true }),
        rows[4],
    );
}

fn render_main(frame: &mut Frame, area: Rect, state: &AppState) {
    let placeholder = match (&state.load, &state.view) {
        (LoadState::Idle, _) => Some("Loading season data...".to_string()),
        (LoadState::Failed(msg), _) => {
            Some(format!("Data retrieval failed: {msg}\nPress r to retry"))
        }
        (LoadState::Loaded, None) => Some("No data loaded".to_string()),
        (LoadState::Loaded, Some(view)) if view.is_no_match() => {
            Some(NO_MATCH_MESSAGE.to_string())
        }
        _ => None,
    };
    if let Some(text) = placeholder {
        let style = if matches!(state.load, LoadState::Failed(_)) {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let empty = Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }
    let Some(view) = state.view.as_ref() else {
        return;
    };

    match state.tab {
        Tab::Overview => render_overview(frame, area, view, state.leaderboard_selected),
        Tab::Correlation => render_correlation(frame, area, view),
    }
}

fn render_overview(frame: &mut Frame, area: Rect, view: &DashboardView, selected: usize) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(55),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(area);

    let bars = view
        .leaderboard
        .iter()
        .enumerate()
        .map(|(idx, bar)| {
            let style = if idx == selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(points_color(bar.points, view.leaderboard[0].points))
            };
            Bar::default()
                .value(bar.points.round().max(0.0) as u64)
                .label(Line::from(short_name(&bar.player_name, 14)))
                .text_value(format!("{:.0} {}", bar.points, bar.team_abbreviation))
                .style(style)
        })
        .collect::<Vec<_>>();
    let leaders = BarChart::default()
        .block(
            Block::default()
                .title(format!("Top {} Scorers (PTS)", bars.len()))
                .borders(Borders::ALL),
        )
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0);
    frame.render_widget(leaders, rows[0]);

    render_histogram(frame, rows[1], &view.histogram);

    let commentary = Paragraph::new(format!("Analysis: {OVERVIEW_COMMENTARY}"))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(commentary, rows[2]);
}

fn render_histogram(frame: &mut Frame, area: Rect, bins: &[HistogramBin]) {
    let bars = bins
        .iter()
        .map(|bin| {
            Bar::default()
                .value(bin.count as u64)
                .label(Line::from(format!("{:.0}", bin.lower * 100.0)))
                .text_value(bin.count.to_string())
                .style(Style::default().fg(Color::Cyan))
        })
        .collect::<Vec<_>>();
    let inner_width = area.width.saturating_sub(2);
    let slot = (inner_width / bins.len().max(1) as u16).max(2);
    let chart = BarChart::default()
        .block(
            Block::default()
                .title("Field Goal % Distribution")
                .borders(Borders::ALL),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(slot.saturating_sub(1).max(1))
        .bar_gap(1);
    frame.render_widget(chart, area);
}

fn render_correlation(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(55),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(area);

    render_scatter(frame, rows[0], view);
    render_heatmap(frame, rows[1], &view.correlation);

    let commentary = Paragraph::new(format!("Analysis: {CORRELATION_COMMENTARY}"))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(commentary, rows[2]);
}

fn render_scatter(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let scatter = &view.scatter;
    let datasets = vec![
        ChartDataset::default()
            .name("low PTS")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::DarkGray))
            .data(&scatter.low),
        ChartDataset::default()
            .name("mid PTS")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Cyan))
            .data(&scatter.mid),
        ChartDataset::default()
            .name("high PTS")
            .marker(symbols::Marker::Block)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Yellow))
            .data(&scatter.high),
    ];

    let x_max = nice_ceiling(scatter.max_rebounds);
    let y_max = nice_ceiling(scatter.max_assists);
    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title("Rebounds vs Assists (marker = points tier)")
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("REB")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(axis_labels(x_max)),
        )
        .y_axis(
            Axis::default()
                .title("AST")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(axis_labels(y_max)),
        );
    frame.render_widget(chart, area);
}

fn render_heatmap(frame: &mut Frame, area: Rect, correlation: &Correlation) {
    let block = Block::default()
        .title("Metric Correlation")
        .borders(Borders::ALL);
    let matrix = match correlation {
        Correlation::Defined(m) => m,
        Correlation::Undefined(reason) => {
            let text = Paragraph::new(format!("Correlation unavailable ({reason})"))
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(text, area);
            return;
        }
    };

    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(StatColumn::ALL.iter().map(|c| Cell::from(c.label())))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows = StatColumn::ALL
        .iter()
        .map(|a| {
            let label = Cell::from(a.label()).style(Style::default().add_modifier(Modifier::BOLD));
            let mut cells = vec![label];
            cells.extend(StatColumn::ALL.iter().map(|b| {
                let r = matrix.get(*a, *b);
                Cell::from(format!("{r:+.2}")).style(heat_style(r))
            }));
            Row::new(cells)
        })
        .collect::<Vec<_>>();

    let widths = [Constraint::Length(5); 6];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn heat_style(r: f64) -> Style {
    let intensity = (r.abs().clamp(0.0, 1.0) * 200.0) as u8;
    let bg = if r >= 0.0 {
        Color::Rgb(55 + intensity, 40, 40)
    } else {
        Color::Rgb(40, 40, 55 + intensity)
    };
    Style::default().fg(Color::White).bg(bg)
}

fn points_color(points: f64, max: f64) -> Color {
    if max <= 0.0 {
        return Color::Green;
    }
    let ratio = points / max;
    if ratio > 0.85 {
        Color::LightRed
    } else if ratio > 0.65 {
        Color::LightMagenta
    } else {
        Color::LightBlue
    }
}

fn axis_labels(max: f64) -> Vec<Span<'static>> {
    vec![
        Span::raw("0"),
        Span::raw(format!("{:.0}", max / 2.0)),
        Span::raw(format!("{max:.0}")),
    ]
}

fn nice_ceiling(value: f64) -> f64 {
    if value <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(value.log10().floor());
    (value / magnitude).ceil() * magnitude
}

fn short_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let mut out = name.chars().take(max.saturating_sub(1)).collect::<String>();
    out.push('.');
    out
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "NBA Analytics - Help",
        "",
        "Filters:",
        "  + / - or ← / →  Min points +/- 25",
        "  Shift+← / →     Min points +/- 250",
        "  PgUp / PgDn     Min points +/- 250",
        "  t / T           Next / previous team",
        "  0               Reset filters",
        "",
        "Views:",
        "  Tab / 1 / 2     Switch tab",
        "  j/k or ↑/↓      Move leaderboard highlight",
        "",
        "Other:",
        "  e               Export view to xlsx",
        "  r               Retry failed fetch",
        "  ?               Toggle help",
        "  q               Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
