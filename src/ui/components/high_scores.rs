use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use timesquiz::engine::difficulty::Difficulty;
use timesquiz::engine::score_book::PODIUM_SIZE;
use timesquiz::session::result::{ScoreRecord, format_clock};

use crate::ui::theme::Theme;

const MEDALS: [&str; PODIUM_SIZE] = ["\u{1f947}", "\u{1f948}", "\u{1f949}"];

/// One leaderboard, with a tab strip to switch difficulty.
pub struct HighScores<'a> {
    pub difficulty: Difficulty,
    pub scores: &'a [ScoreRecord],
    pub theme: &'a Theme,
}

impl Widget for HighScores<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" High Scores ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let mut tabs = Vec::new();
        for d in Difficulty::ALL {
            let style = if d == self.difficulty {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(colors.muted())
            };
            tabs.push(Span::styled(format!(" {} ", d.display_name()), style));
            tabs.push(Span::raw("  "));
        }
        Paragraph::new(Line::from(tabs)).render(layout[0], buf);

        let header = Line::from(Span::styled(
            format!("  {:<5} {:>6} {:>9} {:>7}   {}", "Rank", "Score", "Correct", "Time", "Date"),
            Style::default().fg(colors.muted()).add_modifier(Modifier::BOLD),
        ));
        Paragraph::new(header).render(layout[1], buf);

        let lines: Vec<Line> = if self.scores.is_empty() {
            vec![Line::from(Span::styled(
                "  No scores yet. Finish a quiz to get on the board!",
                Style::default().fg(colors.muted()),
            ))]
        } else {
            self.scores
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let rank = MEDALS
                        .get(i)
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{}.", i + 1));
                    let style = if i < PODIUM_SIZE {
                        Style::default().fg(colors.gold())
                    } else {
                        Style::default().fg(colors.fg())
                    };
                    Line::from(Span::styled(
                        format!(
                            "  {:<5} {:>5}% {:>6}/{:<2} {:>7}   {}",
                            rank,
                            s.percentage,
                            s.correct_count,
                            s.total_count,
                            format_clock(s.elapsed_millis),
                            s.completed_at.format("%Y-%m-%d")
                        ),
                        style,
                    ))
                })
                .collect()
        };
        Paragraph::new(lines).render(layout[2], buf);

        Paragraph::new(Line::from(Span::styled(
            "  [Tab/\u{2190}\u{2192}] Difficulty  [q] Menu",
            Style::default().fg(colors.accent()),
        )))
        .render(layout[3], buf);
    }
}
