use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use timesquiz::engine::question::{OPTION_COUNT, Question};
use timesquiz::engine::quiz_engine::AnswerFeedback;

use crate::ui::theme::Theme;

/// The question prompt, its four options in a 2x2 grid, and feedback on
/// the last answer once one is given.
pub struct QuestionCard<'a> {
    question: &'a Question,
    number: usize,
    total: usize,
    selected: usize,
    feedback: Option<&'a AnswerFeedback>,
    theme: &'a Theme,
}

impl<'a> QuestionCard<'a> {
    pub fn new(question: &'a Question, number: usize, total: usize, theme: &'a Theme) -> Self {
        Self {
            question,
            number,
            total,
            selected: 0,
            feedback: None,
            theme,
        }
    }

    pub fn selected(mut self, selected: usize) -> Self {
        self.selected = selected;
        self
    }

    pub fn feedback(mut self, feedback: Option<&'a AnswerFeedback>) -> Self {
        self.feedback = feedback;
        self
    }

    fn option_style(&self, index: usize) -> Style {
        let colors = &self.theme.colors;
        let value = self.question.options[index];
        match self.feedback {
            Some(fb) if value == fb.outcome.correct_product => Style::default()
                .fg(colors.bg())
                .bg(colors.correct())
                .add_modifier(Modifier::BOLD),
            Some(fb) if !fb.is_correct() && value == fb.outcome.chosen => Style::default()
                .fg(colors.bg())
                .bg(colors.incorrect())
                .add_modifier(Modifier::BOLD),
            Some(_) => Style::default().fg(colors.muted()),
            None if index == self.selected => Style::default()
                .fg(colors.bg())
                .bg(colors.accent())
                .add_modifier(Modifier::BOLD),
            None => Style::default().fg(colors.fg()),
        }
    }

    fn feedback_lines(&self, fb: &AnswerFeedback) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let mut lines = Vec::new();
        let headline = if fb.is_correct() {
            Span::styled(
                format!("Correct! ({:.1}s)", fb.outcome.response_millis as f64 / 1000.0),
                Style::default().fg(colors.correct()).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(
                format!("Not quite. {}", self.question.worked()),
                Style::default().fg(colors.incorrect()).add_modifier(Modifier::BOLD),
            )
        };
        lines.push(Line::from(vec![headline]));
        if let Some(message) = &fb.message {
            lines.push(Line::from(Span::styled(
                message.clone(),
                Style::default().fg(if fb.is_correct() { colors.fg() } else { colors.highlight() }),
            )));
        }
        for event in &fb.achievements {
            lines.push(Line::from(vec![
                Span::raw(format!("{} ", event.kind.icon())),
                Span::styled(
                    event.title.clone(),
                    Style::default().fg(colors.gold()).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {}", event.message), Style::default().fg(colors.fg())),
            ]));
        }
        if let Some(err) = &fb.save_error {
            lines.push(Line::from(Span::styled(
                format!("Progress not saved: {err}"),
                Style::default().fg(colors.warning()),
            )));
        }
        lines
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" Question {} / {} ", self.number, self.total))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(inner);

        let prompt = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                self.question.prompt(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center);
        prompt.render(layout[1], buf);

        for row in 0..OPTION_COUNT / 2 {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(10),
                    Constraint::Percentage(38),
                    Constraint::Percentage(4),
                    Constraint::Percentage(38),
                    Constraint::Percentage(10),
                ])
                .split(layout[3 + row]);
            for col in 0..2 {
                let index = row * 2 + col;
                let style = self.option_style(index);
                let cell = cells[1 + col * 2];
                let option = Paragraph::new(vec![
                    Line::from(""),
                    Line::from(format!("[{}]  {}", index + 1, self.question.options[index])),
                ])
                .alignment(Alignment::Center)
                .style(style);
                option.render(cell, buf);
            }
        }

        if let Some(fb) = self.feedback {
            Paragraph::new(self.feedback_lines(fb))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .render(layout[5], buf);
        }
    }
}
