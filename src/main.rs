mod app;
mod event;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};
use tracing_subscriber::EnvFilter;

use timesquiz::config::Config;
use timesquiz::engine::difficulty::Difficulty;
use timesquiz::engine::quiz_engine::QuizEngine;
use timesquiz::store::json_store::default_data_dir;
use timesquiz::store::share::SharePayload;

use app::{App, AppScreen, ClearTarget, SETTINGS_FIELDS};
use event::{AppEvent, EventHandler};
use ui::components::high_scores::HighScores;
use ui::components::progress_bar::ProgressBar;
use ui::components::question_card::QuestionCard;
use ui::components::results::ResultsPanel;
use ui::components::stats_dashboard::StatsDashboard;
use ui::components::stats_sidebar::StatsSidebar;
use ui::layout::{QuizLayout, panel};

const LOG_FILE: &str = "timesquiz.log";

#[derive(Parser)]
#[command(name = "timesquiz", version, about = "Terminal multiplication-table quiz")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Number of questions per quiz")]
    questions: Option<usize>,

    #[arg(short, long, help = "Difficulty selected in the menu (easy, medium, hard)")]
    difficulty: Option<String>,

    #[arg(long, help = "Directory holding saved progress")]
    data_dir: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Write a backup of all progress ('-' for stdout) and exit")]
    export: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Write a statistics summary ('-' for stdout) and exit")]
    export_stats: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Merge a backup file into saved progress and exit")]
    import: Option<PathBuf>,

    #[arg(long, help = "Print a share link for your results and exit")]
    share: bool,

    #[arg(long, value_name = "LINK", help = "Show the challenge inside a share link and exit")]
    open_share: Option<String>,

    #[arg(long, help = "Delete all high scores and exit")]
    clear_scores: bool,

    #[arg(long, help = "Delete all saved data and exit")]
    clear_all: bool,
}

impl Cli {
    fn is_batch(&self) -> bool {
        self.export.is_some()
            || self.export_stats.is_some()
            || self.import.is_some()
            || self.share
            || self.open_share.is_some()
            || self.clear_scores
            || self.clear_all
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    init_logging(&data_dir);

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("ignoring unreadable config: {e}");
        Config::default()
    });
    if let Some(count) = cli.questions {
        config.question_count = count;
        config.validate();
    }
    if let Some(key) = &cli.difficulty {
        config.default_difficulty = Difficulty::from_key(key)?;
    }

    if cli.is_batch() {
        return run_batch(&cli, &config, data_dir);
    }

    let mut app = App::new(config, app::open_store(Some(data_dir)))?;
    if let Some(theme_name) = &cli.theme {
        app.apply_theme(theme_name);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(200));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!("{err:?}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Log to a file in the data directory; the terminal belongs to the UI.
fn init_logging(data_dir: &Path) {
    let file = fs::create_dir_all(data_dir).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(data_dir.join(LOG_FILE))
    });
    let Ok(file) = file else {
        return;
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "timesquiz=info".parse() {
        filter = filter.add_directive(directive);
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn run_batch(cli: &Cli, config: &Config, data_dir: PathBuf) -> Result<()> {
    let mut engine = QuizEngine::open(app::open_store(Some(data_dir)))?;

    if cli.clear_all {
        engine.clear_all_data()?;
        println!("All data cleared.");
    } else if cli.clear_scores {
        engine.clear_scores()?;
        println!("All scores cleared.");
    }

    if let Some(path) = &cli.import {
        let payload = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let summary = engine.import_snapshot(&payload)?;
        println!(
            "Imported {} scores, {} tables and {} achievements.",
            summary.scores, summary.tables, summary.achievements
        );
    }

    if let Some(path) = &cli.export {
        write_output(path, &engine.export_snapshot()?, "Progress")?;
    }

    if let Some(path) = &cli.export_stats {
        write_output(path, &engine.export_statistics()?, "Statistics")?;
    }

    if cli.share {
        println!("{}", engine.share_payload().challenge_text());
        println!();
        println!("{}", engine.share_url(&config.share_base_url)?);
    }

    if let Some(link) = &cli.open_share {
        println!("{}", SharePayload::decode(link)?.challenge_text());
    }

    Ok(())
}

/// Write `json` to `path`, or to stdout when `path` is `-`.
fn write_output(path: &Path, json: &str, what: &str) -> Result<()> {
    if path.as_os_str() == "-" {
        println!("{json}");
    } else {
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("{what} saved to {}", path.display());
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.tick(),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            if app.screen == AppScreen::Quiz {
                app.quit_quiz();
            }
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::NamePrompt => app.handle_name_key(key),
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::QuizResult => handle_result_key(app, key),
        AppScreen::HighScores => handle_high_scores_key(app, key),
        AppScreen::Stats => handle_stats_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
        AppScreen::Share => handle_share_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => app.run_menu_action(app.menu.selected_action()),
        KeyCode::Char(ch) => {
            if let Some(action) = app.menu.action_for_key(ch) {
                app.run_menu_action(action);
            }
        }
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    if app.feedback.is_some() {
        match key.code {
            KeyCode::Esc => app.quit_quiz(),
            _ => app.dismiss_feedback(),
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.quit_quiz(),
        KeyCode::Char(ch @ '1'..='4') => app.answer(ch as usize - '1' as usize),
        KeyCode::Left | KeyCode::Char('h') => app.move_selection(-1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.move_selection(1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(0, 1),
        KeyCode::Enter | KeyCode::Char(' ') => app.answer_selected(),
        _ => {}
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') | KeyCode::Enter => app.retry_quiz(),
        KeyCode::Char('h') => app.go_to_high_scores(),
        KeyCode::Char('s') => app.go_to_stats(),
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_menu(),
        _ => {}
    }
}

fn handle_high_scores_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.score_tab = app.score_tab.next(),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
            app.score_tab = app.score_tab.prev()
        }
        _ => {}
    }
}

fn handle_stats_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Char('1') => app.stats_tab = 0,
        KeyCode::Char('2') => app.stats_tab = 1,
        KeyCode::Char('3') => app.stats_tab = 2,
        KeyCode::Tab | KeyCode::Right => app.next_stats_tab(),
        KeyCode::BackTab | KeyCode::Left => app.prev_stats_tab(),
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    if app.confirm_clear.is_some() {
        match key.code {
            KeyCode::Char('y') => app.confirm_clear_yes(),
            KeyCode::Char('n') | KeyCode::Esc => app.confirm_clear = None,
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.save_settings();
            app.go_to_menu();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.settings_selected = app.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.settings_selected = (app.settings_selected + 1).min(SETTINGS_FIELDS - 1);
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle_forward(),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle_backward(),
        _ => {}
    }
}

fn handle_share_key(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter) {
        app.go_to_menu();
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::NamePrompt => render_name_prompt(frame, app),
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Quiz => render_quiz(frame, app),
        AppScreen::QuizResult => render_result(frame, app),
        AppScreen::HighScores => render_high_scores(frame, app),
        AppScreen::Stats => render_stats(frame, app),
        AppScreen::Settings => render_settings(frame, app),
        AppScreen::Share => render_share(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect, info: &str) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " timesquiz ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info.to_string(),
            Style::default().fg(colors.muted()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

/// Key hints, or the status message when there is one. Hints that do not
/// fit the width wrap onto lines the area may not show.
fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hints: &[&str]) {
    let colors = &app.theme.colors;
    let lines: Vec<Line> = match &app.status {
        Some(status) => vec![Line::from(Span::styled(
            format!(" {status}"),
            Style::default().fg(colors.warning()),
        ))],
        None => ui::layout::pack_hint_lines(hints, area.width as usize)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.muted()))))
            .collect(),
    };
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_name_prompt(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let area = panel(frame.area(), 56, 12);

    let block = Block::bordered()
        .title(" Welcome ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (before, cursor, after) = app.name_input.render_parts();
    let cursor_text = cursor.map_or_else(|| " ".to_string(), |c| c.to_string());
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "What's your name?",
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(before.to_string(), Style::default().fg(colors.accent())),
            Span::styled(
                cursor_text,
                Style::default().fg(colors.bg()).bg(colors.accent()),
            ),
            Span::styled(after.to_string(), Style::default().fg(colors.accent())),
        ]),
        Line::from(""),
    ];
    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(colors.warning()),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Enter] Continue  [Esc] Skip",
        Style::default().fg(colors.muted()),
    )));
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let overall = app.engine.overall_stats();
    let header_info = format!(
        " Quizzes {} | Best {}% | Mastered {}/12",
        overall.total_quizzes,
        overall.best_score,
        app.engine.tables().mastered_count(),
    );
    render_header(frame, app, layout[0], &header_info);

    let menu_area = panel(layout[1], 56, 24);
    frame.render_widget(&app.menu, menu_area);

    render_footer(
        frame,
        app,
        layout[2],
        &["[1-3] Start", "[h] Scores", "[s] Stats", "[p] Share", "[c] Settings", "[q] Quit"],
    );
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let (Some(session), Some(question)) = (app.engine.session(), app.question.as_ref()) else {
        return;
    };

    let quiz_layout = QuizLayout::new(area);
    let elapsed = app.engine.elapsed_millis();

    let answered = session.current_index();
    let number = if app.feedback.is_some() { answered } else { answered + 1 };
    let header_info = if quiz_layout.header_carries_score() {
        format!(
            " {} | Score {}/{} | {}",
            session.difficulty().display_name(),
            session.score(),
            answered,
            timesquiz::session::result::format_clock(elapsed)
        )
    } else {
        format!(" {} ", session.difficulty().display_name())
    };
    render_header(frame, app, quiz_layout.header, &header_info);

    let card = QuestionCard::new(question, number, session.len(), app.theme)
        .selected(app.selected_option)
        .feedback(app.feedback.as_ref());
    frame.render_widget(card, quiz_layout.card);

    if let Some(bar_area) = quiz_layout.progress {
        let progress = ProgressBar::new("Progress", session.progress(), app.theme)
            .caption(format!("{answered}/{}", session.len()));
        frame.render_widget(progress, bar_area);
    }

    if let Some(sidebar_area) = quiz_layout.sidebar {
        let best = app.engine.top_scores(session.difficulty()).first();
        let sidebar = StatsSidebar::new(session, elapsed, best, app.theme);
        frame.render_widget(sidebar, sidebar_area);
    }

    let hints: &[&str] = match &app.feedback {
        Some(fb) if fb.completion.is_some() => &["[any key] See results", "[Esc] Menu"],
        Some(_) => &["[any key] Next question", "[Esc] Quit quiz"],
        None => &["[1-4] Answer", "[arrows] Select", "[Enter] Confirm", "[Esc] Quit quiz"],
    };
    render_footer(frame, app, quiz_layout.footer, hints);
}

fn render_result(frame: &mut ratatui::Frame, app: &App) {
    let Some(completion) = &app.last_completion else {
        return;
    };
    let user_name = app.engine.user_name();
    let centered = panel(frame.area(), 72, 24);
    let results = ResultsPanel {
        completion,
        difficulty: app.difficulty,
        achievements: &app.session_achievements,
        user_name: user_name.as_deref(),
        theme: app.theme,
    };
    frame.render_widget(results, centered);
}

fn render_high_scores(frame: &mut ratatui::Frame, app: &App) {
    let centered = panel(frame.area(), 72, 22);
    let table = HighScores {
        difficulty: app.score_tab,
        scores: app.engine.top_scores(app.score_tab),
        theme: app.theme,
    };
    frame.render_widget(table, centered);
}

fn render_stats(frame: &mut ratatui::Frame, app: &App) {
    let overall = app.engine.overall_stats();
    let by_difficulty = app.engine.difficulty_stats();
    let recent = app.engine.recent_achievements();
    let table_stats = app.engine.table_stats();
    let insight = app.engine.progress_insight();
    let chart = app.engine.chart_points();

    let dashboard = StatsDashboard {
        overall: &overall,
        by_difficulty: &by_difficulty,
        recent: &recent,
        tables: app.engine.tables(),
        table_stats: &table_stats,
        insight: &insight,
        chart: &chart,
        active_tab: app.stats_tab,
        theme: app.theme,
    };
    frame.render_widget(dashboard, frame.area());
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let centered = panel(frame.area(), 64, 25);

    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let fields: [(&str, String); SETTINGS_FIELDS] = [
        ("Theme", app.config.theme.clone()),
        ("Questions per quiz", app.config.question_count.to_string()),
        ("Default difficulty", app.config.default_difficulty.display_name().to_string()),
        ("Player name", app.engine.user_name().unwrap_or_else(|| "-".to_string())),
        ("Clear all scores", "press Enter".to_string()),
        ("Clear all data", "press Enter".to_string()),
    ];

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(fields.len() as u16 * 3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    Paragraph::new(Line::from(Span::styled(
        "  Use arrows to navigate, Enter/Right to change, ESC to save & exit",
        Style::default().fg(colors.muted()),
    )))
    .render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(fields.iter().map(|_| Constraint::Length(3)).collect::<Vec<_>>())
        .split(layout[1]);

    for (i, (label, value)) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };
        let danger = i >= 4;

        let label_style = Style::default()
            .fg(match (is_selected, danger) {
                (_, true) => colors.incorrect(),
                (true, false) => colors.accent(),
                (false, false) => colors.fg(),
            })
            .add_modifier(if is_selected { Modifier::BOLD } else { Modifier::empty() });
        let value_style = Style::default().fg(if is_selected {
            colors.highlight()
        } else {
            colors.muted()
        });
        let value_text = if danger {
            format!("     {value}")
        } else {
            format!("     < {value} >")
        };

        let lines = vec![
            Line::from(Span::styled(format!("{indicator}{label}:"), label_style)),
            Line::from(Span::styled(value_text, value_style)),
        ];
        Paragraph::new(lines).render(field_layout[i], frame.buffer_mut());
    }

    let footer = match &app.status {
        Some(status) => Span::styled(format!("  {status}"), Style::default().fg(colors.warning())),
        None => Span::styled(
            "  [ESC] Save & back  [Enter/arrows] Change value",
            Style::default().fg(colors.accent()),
        ),
    };
    Paragraph::new(Line::from(footer)).render(layout[3], frame.buffer_mut());

    if let Some(target) = app.confirm_clear {
        let question = match target {
            ClearTarget::Scores => "Delete all high scores? (y/n)",
            ClearTarget::Everything => "Delete ALL saved data? (y/n)",
        };
        let dialog_area = panel(centered, 40, 5);
        Clear.render(dialog_area, frame.buffer_mut());
        Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                question,
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::bordered()
                .title(" Confirm ")
                .border_style(Style::default().fg(colors.incorrect()))
                .style(Style::default().bg(colors.bg())),
        )
        .render(dialog_area, frame.buffer_mut());
    }
}

fn render_share(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let centered = panel(frame.area(), 80, 20);

    let mut lines: Vec<Line> = Vec::new();
    if let Some(text) = &app.share_text {
        lines.extend(
            text.lines()
                .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(colors.fg())))),
        );
        lines.push(Line::from(""));
    }
    match &app.share_url {
        Some(url) => {
            lines.push(Line::from(Span::styled(
                "Send this link to a friend:",
                Style::default().fg(colors.muted()),
            )));
            lines.push(Line::from(Span::styled(
                url.clone(),
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )));
        }
        None => lines.push(Line::from(Span::styled(
            app.status.clone().unwrap_or_default(),
            Style::default().fg(colors.warning()),
        ))),
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Esc] Back",
        Style::default().fg(colors.muted()),
    )));

    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::bordered()
                .title(" Share Your Results ")
                .border_style(Style::default().fg(colors.accent()))
                .style(Style::default().bg(colors.bg())),
        )
        .render(centered, frame.buffer_mut());
}
