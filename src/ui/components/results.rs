use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use timesquiz::engine::achievements::AchievementEvent;
use timesquiz::engine::difficulty::Difficulty;
use timesquiz::engine::quiz_engine::Completion;
use timesquiz::session::result::format_clock;

use crate::ui::theme::Theme;

/// Summary shown when a quiz finishes.
pub struct ResultsPanel<'a> {
    pub completion: &'a Completion,
    pub difficulty: Difficulty,
    pub achievements: &'a [AchievementEvent],
    pub user_name: Option<&'a str>,
    pub theme: &'a Theme,
}

impl Widget for ResultsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let record = &self.completion.record;

        let block = Block::bordered()
            .title(format!(" Quiz Complete: {} ", self.difficulty.display_name()))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let title = match self.user_name {
            Some(name) => format!("Congratulations, {name}!"),
            None => "Congratulations!".to_string(),
        };
        let mut title_spans = vec![Span::styled(
            title,
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )];
        if self.completion.is_high_score {
            title_spans.push(Span::styled(
                "  \u{1f3c6} New high score!",
                Style::default().fg(colors.gold()).add_modifier(Modifier::BOLD),
            ));
        }
        Paragraph::new(Line::from(title_spans))
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let score_line = Line::from(vec![
            Span::styled("  Score:    ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{}%", record.percentage),
                Style::default()
                    .fg(colors.grade(record.percentage))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({}/{} correct)", record.correct_count, record.total_count),
                Style::default().fg(colors.muted()),
            ),
        ]);
        Paragraph::new(score_line).render(layout[1], buf);

        let time_line = Line::from(vec![
            Span::styled("  Time:     ", Style::default().fg(colors.fg())),
            Span::styled(format_clock(record.elapsed_millis), Style::default().fg(colors.fg())),
            Span::styled(
                format!(
                    "  ({:.1}s per question)",
                    record.elapsed_secs() / f64::from(record.total_count.max(1))
                ),
                Style::default().fg(colors.muted()),
            ),
        ]);
        Paragraph::new(time_line).render(layout[2], buf);

        let achievement_text = if self.achievements.is_empty() {
            "none this time".to_string()
        } else {
            self.achievements
                .iter()
                .map(|a| format!("{} {}", a.kind.icon(), a.title))
                .collect::<Vec<_>>()
                .join("  ")
        };
        let achievements_line = Line::from(vec![
            Span::styled("  Unlocked: ", Style::default().fg(colors.fg())),
            Span::styled(achievement_text, Style::default().fg(colors.gold())),
        ]);
        Paragraph::new(achievements_line).render(layout[3], buf);

        Paragraph::new(Line::from(Span::styled(
            "  Your progress",
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )))
        .render(layout[4], buf);

        let insight: Vec<Line> = self
            .completion
            .insight
            .lines()
            .map(|l| Line::from(Span::styled(format!("  {l}"), Style::default().fg(colors.fg()))))
            .collect();
        Paragraph::new(insight)
            .wrap(Wrap { trim: false })
            .render(layout[5], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  [r/Enter] Play again  ", Style::default().fg(colors.accent())),
            Span::styled("[h] High scores  ", Style::default().fg(colors.accent())),
            Span::styled("[s] Stats  ", Style::default().fg(colors.accent())),
            Span::styled("[q] Menu", Style::default().fg(colors.accent())),
        ]))
        .render(layout[6], buf);
    }
}
