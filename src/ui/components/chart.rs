use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::Line;
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType, Paragraph, Widget};

use timesquiz::engine::insights::ChartPoint;

use crate::ui::theme::Theme;

/// Percentage of recent quizzes, oldest on the left.
pub struct ScoreChart<'a> {
    data: Vec<(f64, f64)>,
    theme: &'a Theme,
}

impl<'a> ScoreChart<'a> {
    pub fn new(points: &[ChartPoint], theme: &'a Theme) -> Self {
        let data = points
            .iter()
            .enumerate()
            .map(|(i, p)| ((i + 1) as f64, f64::from(p.percentage)))
            .collect();
        Self { data, theme }
    }
}

impl Widget for ScoreChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" Recent Scores ")
            .border_style(Style::default().fg(colors.border()));

        if self.data.is_empty() {
            Paragraph::new(Line::from(
                "No quiz data available yet. Complete some quizzes to see your progress!",
            ))
            .style(Style::default().fg(colors.muted()))
            .alignment(Alignment::Center)
            .block(block)
            .render(area, buf);
            return;
        }

        let max_x = self.data.len().max(2) as f64;

        let dataset = Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(colors.accent()))
            .data(&self.data);

        let chart = Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .title("Quiz")
                    .style(Style::default().fg(colors.muted()))
                    .bounds([1.0, max_x]),
            )
            .y_axis(
                Axis::default()
                    .title("%")
                    .style(Style::default().fg(colors.muted()))
                    .labels(["0", "50", "100"])
                    .bounds([0.0, 100.0]),
            );

        chart.render(area, buf);
    }
}
