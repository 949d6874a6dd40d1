use ratatui::layout::{Constraint, Layout, Rect};

const SIDEBAR_MIN_WIDTH: u16 = 100;
const PROGRESS_MIN_WIDTH: u16 = 60;
const PROGRESS_MIN_HEIGHT: u16 = 20;
const SIDEBAR_WIDTH: u16 = 32;

/// Regions of the quiz screen. The sidebar and progress bar drop out as the
/// terminal shrinks; the card always gets what is left.
pub struct QuizLayout {
    pub header: Rect,
    pub card: Rect,
    pub progress: Option<Rect>,
    pub sidebar: Option<Rect>,
    pub footer: Rect,
}

impl QuizLayout {
    pub fn new(area: Rect) -> Self {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .areas(area);

        let (main, sidebar) = if area.width >= SIDEBAR_MIN_WIDTH {
            let [main, side] =
                Layout::horizontal([Constraint::Min(40), Constraint::Length(SIDEBAR_WIDTH)]).areas(body);
            (main, Some(side))
        } else {
            (body, None)
        };

        let (card, progress) = if area.width >= PROGRESS_MIN_WIDTH && area.height >= PROGRESS_MIN_HEIGHT {
            let [card, bar] = Layout::vertical([Constraint::Min(12), Constraint::Length(3)]).areas(main);
            (card, Some(bar))
        } else {
            (main, None)
        };

        Self {
            header,
            card,
            progress,
            sidebar,
            footer,
        }
    }

    /// Score and clock go in the header when there is no sidebar to show them.
    pub fn header_carries_score(&self) -> bool {
        self.sidebar.is_none()
    }
}

/// Greedily pack key hints into as few lines as fit `width`.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for hint in hints.iter().filter(|h| !h.is_empty()) {
        match out.last_mut() {
            Some(line) if line.chars().count() + 2 + hint.chars().count() <= width => {
                line.push_str("  ");
                line.push_str(hint);
            }
            _ if width > 0 => out.push(format!(" {hint}")),
            _ => {}
        }
    }
    out
}

/// A `width` x `height` panel centred in `area`, shrunk to fit.
pub fn panel(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_hint_lines_wraps() {
        let hints = ["[1-4] Answer", "[Enter] Confirm", "[Esc] Quit quiz"];
        assert_eq!(
            pack_hint_lines(&hints, 80),
            vec![" [1-4] Answer  [Enter] Confirm  [Esc] Quit quiz".to_string()]
        );
        assert_eq!(pack_hint_lines(&hints, 20).len(), 3);
        assert!(pack_hint_lines(&hints, 0).is_empty());
        assert!(pack_hint_lines(&[], 80).is_empty());
    }

    #[test]
    fn test_panel_centres_and_clamps() {
        let big = Rect::new(0, 0, 200, 60);
        assert_eq!(panel(big, 56, 12), Rect::new(72, 24, 56, 12));

        let small = Rect::new(5, 2, 40, 10);
        assert_eq!(panel(small, 56, 12), small);
    }

    #[test]
    fn test_wide_terminal_gets_sidebar_and_progress() {
        let layout = QuizLayout::new(Rect::new(0, 0, 120, 40));
        let sidebar = layout.sidebar.unwrap();
        assert_eq!(sidebar.width, SIDEBAR_WIDTH);
        assert!(layout.progress.is_some());
        assert!(!layout.header_carries_score());
        assert_eq!(layout.card.width + sidebar.width, 120);
    }

    #[test]
    fn test_narrow_terminal_is_card_only() {
        let layout = QuizLayout::new(Rect::new(0, 0, 50, 30));
        assert!(layout.sidebar.is_none());
        assert!(layout.progress.is_none());
        assert!(layout.header_carries_score());
        assert_eq!(layout.card.width, 50);

        let short = QuizLayout::new(Rect::new(0, 0, 80, 16));
        assert!(short.progress.is_none());
    }
}
