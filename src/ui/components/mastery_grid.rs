use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Widget};

use timesquiz::engine::table_progress::{FIRST_TABLE, LAST_TABLE, MasteryStatus, TableProgressTracker};

use crate::ui::theme::{Theme, ThemeColors};

const CELL_WIDTH: u16 = 8;
const COLUMNS: u16 = 4;

/// Times tables 1-12 as a grid of cells coloured by mastery status.
pub struct MasteryGrid<'a> {
    tracker: &'a TableProgressTracker,
    theme: &'a Theme,
}

impl<'a> MasteryGrid<'a> {
    pub fn new(tracker: &'a TableProgressTracker, theme: &'a Theme) -> Self {
        Self { tracker, theme }
    }
}

fn status_cell(status: MasteryStatus, colors: &ThemeColors) -> (char, Color) {
    match status {
        MasteryStatus::NotAttempted => ('\u{00b7}', colors.muted()),
        MasteryStatus::Mastered => ('\u{2605}', colors.gold()),
        MasteryStatus::Learning => ('\u{25d0}', colors.correct()),
        MasteryStatus::NeedsPractice => ('!', colors.incorrect()),
    }
}

impl Widget for MasteryGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Table Mastery ")
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < CELL_WIDTH * COLUMNS || inner.height < 4 {
            return;
        }

        for table in FIRST_TABLE..=LAST_TABLE {
            let slot = (table - FIRST_TABLE) as u16;
            let x = inner.x + (slot % COLUMNS) * CELL_WIDTH;
            let y = inner.y + slot / COLUMNS;
            let Some(progress) = self.tracker.table(table) else {
                continue;
            };
            let (symbol, color) = status_cell(progress.status(), colors);
            let accuracy = if progress.total == 0 {
                "  -".to_string()
            } else {
                format!("{:>3}", progress.accuracy())
            };
            buf.set_string(
                x,
                y,
                format!("{table:>2}{symbol}"),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            );
            buf.set_string(x + 3, y, format!("{accuracy}%"), Style::default().fg(colors.muted()));
        }

        let legend_y = inner.y + (LAST_TABLE - FIRST_TABLE + 1).div_ceil(COLUMNS as u32) as u16 + 1;
        if legend_y < inner.y + inner.height {
            let mut x = inner.x;
            for status in [
                MasteryStatus::Mastered,
                MasteryStatus::Learning,
                MasteryStatus::NeedsPractice,
                MasteryStatus::NotAttempted,
            ] {
                let (symbol, color) = status_cell(status, colors);
                let text = format!("{symbol} {}  ", status.label());
                let width = text.chars().count() as u16;
                if x + width > inner.x + inner.width {
                    break;
                }
                buf.set_string(x, legend_y, text, Style::default().fg(color));
                x += width;
            }
        }
    }
}
