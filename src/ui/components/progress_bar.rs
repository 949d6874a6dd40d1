use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Bordered bar with a centred caption, e.g. "7 / 20".
pub struct ProgressBar<'a> {
    pub label: String,
    pub caption: String,
    pub ratio: f64,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(label: &str, ratio: f64, theme: &'a Theme) -> Self {
        let ratio = ratio.clamp(0.0, 1.0);
        Self {
            label: label.to_string(),
            caption: format!("{:.0}%", ratio * 100.0),
            ratio,
            theme,
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.label))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio * inner.width as f64) as u16;
        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(colors.bar_filled())
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let caption_width = self.caption.chars().count() as u16;
        let caption_x = inner.x + (inner.width.saturating_sub(caption_width)) / 2;
        buf.set_string(caption_x, inner.y, &self.caption, Style::default().fg(colors.fg()));
    }
}
