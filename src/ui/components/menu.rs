use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use timesquiz::engine::difficulty::Difficulty;

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Start(Difficulty),
    HighScores,
    Statistics,
    Share,
    Settings,
}

pub struct MenuItem {
    pub key: char,
    pub label: String,
    pub description: String,
    pub action: MenuAction,
}

pub struct Menu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
    pub greeting: Option<String>,
}

impl<'a> Menu<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        let mut items: Vec<MenuItem> = Difficulty::ALL
            .into_iter()
            .zip(['1', '2', '3'])
            .map(|(difficulty, key)| {
                let band = difficulty.band();
                MenuItem {
                    key,
                    label: band.display_name.to_string(),
                    description: format!(
                        "Tables {} to {} times 1 to 12",
                        band.min_factor, band.max_factor
                    ),
                    action: MenuAction::Start(difficulty),
                }
            })
            .collect();
        items.extend([
            MenuItem {
                key: 'h',
                label: "High Scores".to_string(),
                description: "Best results for each difficulty".to_string(),
                action: MenuAction::HighScores,
            },
            MenuItem {
                key: 's',
                label: "Statistics".to_string(),
                description: "Progress, mastery and achievements".to_string(),
                action: MenuAction::Statistics,
            },
            MenuItem {
                key: 'p',
                label: "Share".to_string(),
                description: "Challenge a friend with a link".to_string(),
                action: MenuAction::Share,
            },
            MenuItem {
                key: 'c',
                label: "Settings".to_string(),
                description: "Theme, quiz length and data".to_string(),
                action: MenuAction::Settings,
            },
        ]);
        Self {
            items,
            selected: 0,
            theme,
            greeting: None,
        }
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    pub fn selected_action(&self) -> MenuAction {
        self.items[self.selected].action
    }

    pub fn action_for_key(&self, key: char) -> Option<MenuAction> {
        self.items.iter().find(|i| i.key == key).map(|i| i.action)
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let subtitle = self
            .greeting
            .clone()
            .unwrap_or_else(|| "Multiplication Quiz".to_string());
        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "timesquiz",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(subtitle, Style::default().fg(colors.fg()))),
            Line::from(""),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(2))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, item) in self.items.iter().enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };

            let label_text = format!(" {indicator} [{}] {}", item.key, item.label);
            let desc_text = format!("       {}", item.description);
            let label_style = Style::default()
                .fg(if is_selected { colors.accent() } else { colors.fg() })
                .add_modifier(if is_selected {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                });

            let lines = vec![
                Line::from(Span::styled(label_text, label_style)),
                Line::from(Span::styled(desc_text, Style::default().fg(colors.muted()))),
            ];

            if let Some(slot) = menu_layout.get(i) {
                Paragraph::new(lines).render(*slot, buf);
            }
        }
    }
}
