use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState};

use betsmarter_terminal::config::{AppConfig, StoreSource};
use betsmarter_terminal::debounce::Debouncer;
use betsmarter_terminal::filters::{MIN_SEARCH_LEN, TOLERANCE_STEP};
use betsmarter_terminal::records::odds_label;
use betsmarter_terminal::state::{AppState, Delta, Field, ProviderCommand, apply_delta};
use betsmarter_terminal::stats::format_count;
use betsmarter_terminal::{open_store, worker};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
    tolerance_debounce: Debouncer,
    table_state: TableState,
    source_label: String,
}

impl App {
    fn new(cfg: &AppConfig, cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        let source_label = match &cfg.source {
            StoreSource::Remote(remote) => format!("table {}", remote.table),
            StoreSource::Fixture(path) => format!("offline {}", path.display()),
        };
        Self {
            state: AppState::new(cfg.page_size),
            should_quit: false,
            cmd_tx,
            tolerance_debounce: Debouncer::new(cfg.debounce),
            table_state: TableState::default(),
            source_label,
        }
    }

    fn send(&mut self, cmd: ProviderCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Query worker stopped");
        }
    }

    fn refresh_filters(&mut self) {
        self.tolerance_debounce.cancel();
        let req = self.state.filters_changed();
        self.send(ProviderCommand::Refresh(req));
    }

    fn refresh_page(&mut self) {
        let req = self.state.begin_refresh();
        self.send(ProviderCommand::Refresh(req));
    }

    fn reload_all(&mut self) {
        self.send(ProviderCommand::LoadTotal);
        self.send(ProviderCommand::LoadLeagues);
        self.refresh_filters();
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => self.should_quit = true,
                KeyCode::Char('u') => {
                    if self.state.clear_field() {
                        self.refresh_filters();
                    }
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                if self.state.help_overlay {
                    self.state.help_overlay = false;
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::F(1) => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::F(5) => {
                self.state.push_log("[INFO] Reloading");
                self.reload_all();
            }
            KeyCode::Tab => self.state.focus_next(),
            KeyCode::BackTab => self.state.focus_prev(),
            KeyCode::Up => self.state.select_prev(),
            KeyCode::Down => self.state.select_next(),
            KeyCode::PageDown => {
                if self.state.pager.go_next() {
                    self.refresh_page();
                }
            }
            KeyCode::PageUp => {
                if self.state.pager.go_prev() {
                    self.refresh_page();
                }
            }
            KeyCode::Home => {
                if self.state.pager.go_first() {
                    self.refresh_page();
                }
            }
            KeyCode::End => {
                if self.state.pager.go_last() {
                    self.refresh_page();
                }
            }
            KeyCode::Backspace => {
                if self.state.backspace() {
                    self.refresh_filters();
                }
            }
            KeyCode::Delete => {
                if self.state.clear_field() {
                    self.refresh_filters();
                }
            }
            KeyCode::Left => self.adjust_focused(false),
            KeyCode::Right => self.adjust_focused(true),
            KeyCode::Enter if self.state.focus == Field::Away => {
                self.state.toggle_away();
                self.refresh_filters();
            }
            KeyCode::Char(ch) => match self.state.focus {
                Field::Tolerance => match ch {
                    '+' | '=' => self.adjust_focused(true),
                    '-' | '_' => self.adjust_focused(false),
                    _ => {}
                },
                Field::Away | Field::League => {
                    if ch == ' ' {
                        self.adjust_focused(true);
                    }
                }
                _ => {
                    if self.state.input_char(ch) {
                        self.refresh_filters();
                    }
                }
            },
            _ => {}
        }
    }

    fn adjust_focused(&mut self, forward: bool) {
        match self.state.focus {
            Field::Tolerance => {
                let delta = if forward { TOLERANCE_STEP } else { -TOLERANCE_STEP };
                if self.state.step_tolerance(delta) {
                    self.tolerance_debounce.schedule(Instant::now());
                }
            }
            Field::League => {
                if self.state.cycle_league(forward) {
                    self.refresh_filters();
                }
            }
            Field::Away => {
                self.state.toggle_away();
                self.refresh_filters();
            }
            Field::Odd1 | Field::OddX | Field::Odd2 | Field::Search => {}
        }
    }

    fn on_tick(&mut self, now: Instant) {
        if self.tolerance_debounce.fire_if_due(now) {
            self.refresh_filters();
        }
        if self.state.needs_refresh {
            self.refresh_page();
        }
        let selected = (!self.state.rows.is_empty()).then_some(self.state.selected);
        self.table_state.select(selected);
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cfg = AppConfig::from_env()?;
    let store = open_store(&cfg.source)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    worker::spawn_query_worker(store, cfg.retry, tx, cmd_rx);

    let mut app = App::new(&cfg, cmd_tx);
    app.state
        .push_log(format!("[INFO] Connected to {}", app.source_label));
    app.reload_all();
    let res = run_app(&mut terminal, &mut app, rx);

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

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        let now = Instant::now();
        app.on_tick(now);

        terminal.draw(|f| ui(f, app))?;

        let timeout = app
            .tolerance_debounce
            .remaining(now)
            .map_or(tick_rate, |left| left.min(tick_rate));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(8),
            Constraint::Length(5),
            Constraint::Min(6),
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_filters(frame, chunks[1], &app.state);
    render_stats(frame, chunks[2], &app.state);
    render_matches(frame, chunks[3], &app.state, &mut app.table_state);
    render_pagination(frame, chunks[4], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[5]);

    let footer = Paragraph::new(
        "Tab Field | type to filter | ←/→ League/Edge | PgUp/PgDn Page | Home/End First/Last | F5 Reload | F1 Help | Esc Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[6]);

    if app.state.help_overlay {
        let area = frame.size();
        render_help_overlay(frame, area);
    }
}

fn header_text(app: &App) -> String {
    format!(
        "BET SMARTER | {} matches | {}",
        format_count(app.state.total_records),
        app.source_label
    )
}

fn render_filters(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Filters").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3)])
        .split(inner);

    let odds_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(20),
            Constraint::Min(0),
        ])
        .split(rows[0]);
    let search_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(30),
            Constraint::Length(10),
            Constraint::Length(24),
            Constraint::Min(0),
        ])
        .split(rows[1]);

    let f = &state.filters;
    render_field(frame, odds_cols[0], state, Field::Odd1, &f.odd1, "");
    render_field(frame, odds_cols[1], state, Field::OddX, &f.oddx, "");
    render_field(frame, odds_cols[2], state, Field::Odd2, &f.odd2, "");
    render_field(
        frame,
        odds_cols[3],
        state,
        Field::Tolerance,
        &format!("[-] {} [+]", f.tolerance),
        "",
    );

    let hint = format!("Min {MIN_SEARCH_LEN} characters");
    render_field(frame, search_cols[0], state, Field::Search, &f.search, &hint);
    let away = if f.away { "[x]" } else { "[ ]" };
    render_field(frame, search_cols[1], state, Field::Away, away, "");
    render_field(
        frame,
        search_cols[2],
        state,
        Field::League,
        &format!("< {} >", f.league.label()),
        "",
    );
}

fn render_field(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    field: Field,
    value: &str,
    placeholder: &str,
) {
    let focused = state.focus == field;
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(field.label())
        .borders(Borders::ALL)
        .border_style(border_style);

    let paragraph = if value.is_empty() && !focused {
        Paragraph::new(placeholder.to_string()).style(Style::default().fg(Color::DarkGray))
    } else if focused && field.is_text() {
        Paragraph::new(format!("{value}_"))
    } else {
        Paragraph::new(value.to_string())
    };
    frame.render_widget(paragraph.block(block), area);
}

fn render_stats(frame: &mut Frame, area: Rect, state: &AppState) {
    let view = state.stats_view();
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let header = Row::new(
        std::iter::once(Cell::from(format!("Games: {}", format_count(view.filtered))))
            .chain(view.cells.iter().map(|c| Cell::from(c.kind.label()))),
    )
    .style(bold);
    let row = Row::new(
        std::iter::once(Cell::from("ODDS 1X2"))
            .chain(view.cells.iter().map(|c| Cell::from(c.label()))),
    );

    let widths = [
        Constraint::Length(16),
        Constraint::Ratio(1, 5),
        Constraint::Ratio(1, 5),
        Constraint::Ratio(1, 5),
        Constraint::Ratio(1, 5),
        Constraint::Ratio(1, 5),
    ];
    let table = Table::new(vec![row], widths)
        .header(header)
        .block(Block::default().title("Stats").borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_matches(frame: &mut Frame, area: Rect, state: &AppState, table_state: &mut TableState) {
    let title = if state.loading {
        "Matches (loading...)"
    } else {
        "Matches"
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    if state.rows.is_empty() {
        let text = if state.loading {
            "Loading..."
        } else {
            "No matches for these filters"
        };
        let empty = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(["Time", "League", "Teams", "1", "X", "2", "R", "S"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = state.rows.iter().map(|m| {
        let teams = format!(
            "{}\n{}",
            m.team1.as_deref().unwrap_or("-"),
            m.team2.as_deref().unwrap_or("-")
        );
        Row::new(vec![
            Cell::from(m.kickoff_label()),
            Cell::from(m.league.clone().unwrap_or_default()),
            Cell::from(teams),
            Cell::from(odds_label(m.odd1)),
            Cell::from(odds_label(m.oddx)),
            Cell::from(odds_label(m.odd2)),
            Cell::from(m.result_label()),
            Cell::from(m.score_label()),
        ])
        .height(2)
    });

    let widths = [
        Constraint::Length(17),
        Constraint::Length(8),
        Constraint::Min(20),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(3),
        Constraint::Length(7),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_stateful_widget(table, area, table_state);
}

fn render_pagination(frame: &mut Frame, area: Rect, state: &AppState) {
    let pager = &state.pager;
    let on = Style::default().add_modifier(Modifier::BOLD);
    let off = Style::default().fg(Color::DarkGray);
    let prev_style = if pager.has_prev() { on } else { off };
    let next_style = if pager.has_next() { on } else { off };

    let line = Line::from(vec![
        Span::styled("|<", prev_style),
        Span::raw("  "),
        Span::styled("<", prev_style),
        Span::raw("   "),
        Span::styled(pager.range_label(), on),
        Span::raw(format!(
            "  (page {}/{})   ",
            pager.page() + 1,
            pager.last_page() + 1
        )),
        Span::styled(">", next_style),
        Span::raw("  "),
        Span::styled(">|", next_style),
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
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
        "BET SMARTER - Help",
        "",
        "Filters:",
        "  Tab / Shift-Tab   Next / previous field",
        "  type              Edit odds or team search",
        "  Backspace / Del   Delete char / clear field (also Ctrl-U)",
        "  ←/→ or +/-        Edge of odds (0.00 - 0.50)",
        "  ←/→ or Space      League, Away toggle",
        "",
        "Results:",
        "  ↑/↓               Move selection",
        "  PgUp / PgDn       Previous / next page",
        "  Home / End        First / last page",
        "  F5                Reload leagues and totals",
        "",
        "  F1                Toggle help",
        "  Esc / Ctrl-C      Quit",
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
