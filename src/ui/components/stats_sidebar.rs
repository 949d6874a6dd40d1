use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use timesquiz::session::quiz::QuizSession;
use timesquiz::session::result::{ScoreRecord, format_clock, percentage};

use crate::ui::theme::Theme;

/// Live numbers for the running quiz, with the best result to chase.
pub struct StatsSidebar<'a> {
    session: &'a QuizSession,
    elapsed_millis: u64,
    best: Option<&'a ScoreRecord>,
    theme: &'a Theme,
}

impl<'a> StatsSidebar<'a> {
    pub fn new(
        session: &'a QuizSession,
        elapsed_millis: u64,
        best: Option<&'a ScoreRecord>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            session,
            elapsed_millis,
            best,
            theme,
        }
    }
}

impl Widget for StatsSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(6)])
            .split(area);

        let stats = self.session.stats();
        let answered = stats.total;
        let accuracy = percentage(stats.correct, answered);
        let label = |text: &'static str| Span::styled(text, Style::default().fg(colors.fg()));

        let lines = vec![
            Line::from(vec![
                label("Score:       "),
                Span::styled(
                    format!("{} / {}", self.session.score(), answered),
                    Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                label("Accuracy:    "),
                Span::styled(
                    if answered == 0 { "-".to_string() } else { format!("{accuracy}%") },
                    Style::default().fg(colors.grade(accuracy)),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                label("Streak:      "),
                Span::styled(
                    format!("{} (best {})", stats.current_streak, stats.best_streak),
                    Style::default().fg(colors.highlight()),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                label("Fast answers:"),
                Span::styled(format!(" {}", stats.fast_answers), Style::default().fg(colors.fg())),
            ]),
            Line::from(""),
            Line::from(vec![
                label("Time:        "),
                Span::styled(format_clock(self.elapsed_millis), Style::default().fg(colors.fg())),
            ]),
        ];

        let block = Block::bordered()
            .title(format!(" {} ", self.session.difficulty().display_name()))
            .border_style(Style::default().fg(colors.border()));
        Paragraph::new(lines).block(block).render(sections[0], buf);

        let best_lines = match self.best {
            Some(best) => vec![
                Line::from(vec![
                    label("Score: "),
                    Span::styled(
                        format!("{}%", best.percentage),
                        Style::default().fg(colors.gold()).add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(vec![
                    label("Time:  "),
                    Span::styled(format_clock(best.elapsed_millis), Style::default().fg(colors.fg())),
                ]),
            ],
            None => vec![Line::from(Span::styled(
                "No score yet",
                Style::default().fg(colors.muted()),
            ))],
        };
        let block = Block::bordered()
            .title(" Best ")
            .border_style(Style::default().fg(colors.border()));
        Paragraph::new(best_lines).block(block).render(sections[1], buf);
    }
}
