use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use timesquiz::engine::achievements::AchievementEvent;
use timesquiz::engine::insights::{ChartPoint, DifficultyStats, OverallStats};
use timesquiz::engine::table_progress::{TableProgressTracker, TableSummary};

use crate::ui::components::chart::ScoreChart;
use crate::ui::components::mastery_grid::MasteryGrid;
use crate::ui::theme::Theme;

pub const TAB_COUNT: usize = 3;

const TABS: [&str; TAB_COUNT] = ["[1] Overview", "[2] Tables", "[3] Progress"];

pub struct StatsDashboard<'a> {
    pub overall: &'a OverallStats,
    pub by_difficulty: &'a [DifficultyStats],
    pub recent: &'a [&'a AchievementEvent],
    pub tables: &'a TableProgressTracker,
    pub table_stats: &'a [TableSummary],
    pub insight: &'a str,
    pub chart: &'a [ChartPoint],
    pub active_tab: usize,
    pub theme: &'a Theme,
}

impl Widget for StatsDashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Statistics ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(inner);

        let tab_spans: Vec<Span> = TABS
            .iter()
            .enumerate()
            .flat_map(|(i, &label)| {
                let style = if i == self.active_tab {
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default().fg(colors.muted())
                };
                vec![Span::styled(format!(" {label} "), style), Span::raw("  ")]
            })
            .collect();
        Paragraph::new(Line::from(tab_spans)).render(layout[0], buf);

        match self.active_tab {
            0 => self.render_overview(layout[1], buf),
            1 => self.render_tables(layout[1], buf),
            _ => ScoreChart::new(self.chart, self.theme).render(layout[1], buf),
        }

        Paragraph::new(Line::from(Span::styled(
            "  [ESC/q] Back  [Tab] Next tab  [1-3] Switch tab",
            Style::default().fg(colors.accent()),
        )))
        .render(layout[2], buf);
    }
}

impl StatsDashboard<'_> {
    fn render_overview(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let label = |text: String| Span::styled(text, Style::default().fg(colors.fg()));
        let value = |text: String| {
            Span::styled(
                text,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )
        };

        let o = self.overall;
        let mut lines = vec![
            Line::from(vec![label("  Quizzes played: ".into()), value(o.total_quizzes.to_string())]),
            Line::from(vec![label("  Average score:  ".into()), value(format!("{}%", o.average_score))]),
            Line::from(vec![label("  Best score:     ".into()), value(format!("{}%", o.best_score))]),
            Line::from(vec![label("  Best streak:    ".into()), value(o.best_streak.to_string())]),
            Line::from(vec![label("  Time practiced: ".into()), value(format!("{} min", o.total_minutes))]),
            Line::from(""),
        ];

        if self.by_difficulty.is_empty() {
            lines.push(Line::from(Span::styled(
                "  No quizzes completed yet.",
                Style::default().fg(colors.muted()),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                format!("  {:<8} {:>5} {:>6} {:>6} {:>6}", "Level", "Plays", "Avg", "Best", "Time"),
                Style::default().fg(colors.muted()).add_modifier(Modifier::BOLD),
            )));
            for d in self.by_difficulty {
                lines.push(Line::from(Span::styled(
                    format!(
                        "  {:<8} {:>5} {:>5}% {:>5}% {:>5}s",
                        d.difficulty.display_name(),
                        d.plays,
                        d.average_score,
                        d.best_score,
                        d.average_secs
                    ),
                    Style::default().fg(colors.grade(d.average_score)),
                )));
            }
        }

        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .title(" Overall ")
                    .border_style(Style::default().fg(colors.border())),
            )
            .render(columns[0], buf);

        let achievement_lines: Vec<Line> = if self.recent.is_empty() {
            vec![Line::from(Span::styled(
                "  Keep answering to unlock achievements!",
                Style::default().fg(colors.muted()),
            ))]
        } else {
            self.recent
                .iter()
                .map(|a| {
                    Line::from(vec![
                        Span::styled(
                            format!("  {} {}", a.kind.icon(), a.title),
                            Style::default().fg(colors.gold()),
                        ),
                        Span::styled(
                            format!("  {}", a.unlocked_at.format("%b %d")),
                            Style::default().fg(colors.muted()),
                        ),
                    ])
                })
                .collect()
        };
        Paragraph::new(achievement_lines)
            .block(
                Block::bordered()
                    .title(" Recent Achievements ")
                    .border_style(Style::default().fg(colors.border())),
            )
            .render(columns[1], buf);
    }

    fn render_tables(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(3)])
            .split(area);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(36), Constraint::Min(20)])
            .split(rows[0]);

        MasteryGrid::new(self.tables, self.theme).render(top[0], buf);

        Paragraph::new(
            self.insight
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(colors.fg()))))
                .collect::<Vec<_>>(),
        )
        .wrap(Wrap { trim: true })
        .block(
            Block::bordered()
                .title(" Insight ")
                .border_style(Style::default().fg(colors.border())),
        )
        .render(top[1], buf);

        let mut lines = vec![Line::from(Span::styled(
            format!("  {:<6} {:>8} {:>9} {:>9}", "Table", "Accuracy", "Avg time", "Attempts"),
            Style::default().fg(colors.muted()).add_modifier(Modifier::BOLD),
        ))];
        for s in self.table_stats.iter().filter(|s| s.total > 0) {
            let mut spans = vec![Span::styled(
                format!(
                    "  {:<6} {:>7}% {:>8.1}s {:>9}",
                    format!("{}x", s.table),
                    s.accuracy,
                    s.avg_time_secs,
                    s.total
                ),
                Style::default().fg(colors.grade(s.accuracy)),
            )];
            if s.mastered {
                spans.push(Span::styled("  mastered", Style::default().fg(colors.gold())));
            } else if s.needs_practice {
                spans.push(Span::styled("  practice", Style::default().fg(colors.incorrect())));
            }
            lines.push(Line::from(spans));
        }
        if lines.len() == 1 {
            lines.push(Line::from(Span::styled(
                "  No answers recorded yet.",
                Style::default().fg(colors.muted()),
            )));
        }
        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .title(" Per Table ")
                    .border_style(Style::default().fg(colors.border())),
            )
            .render(rows[1], buf);
    }
}
