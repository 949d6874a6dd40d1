use std::fs;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub muted: String,
    pub accent: String,
    pub accent_dim: String,
    pub border: String,
    pub border_focused: String,
    pub header_bg: String,
    pub header_fg: String,
    pub bar_filled: String,
    pub bar_empty: String,
    pub highlight: String,
    pub correct: String,
    pub incorrect: String,
    pub warning: String,
    pub gold: String,
}

impl Theme {
    pub fn load(name: &str) -> Option<Self> {
        // User themes shadow bundled ones of the same name
        let user_theme_path = timesquiz::config::config_dir()
            .join("themes")
            .join(format!("{name}.toml"));
        if let Ok(content) = fs::read_to_string(&user_theme_path) {
            match toml::from_str::<Theme>(&content) {
                Ok(theme) => return Some(theme),
                Err(e) => tracing::warn!(path = %user_theme_path.display(), "bad theme file: {e}"),
            }
        }

        let filename = format!("{name}.toml");
        let file = ThemeAssets::get(&filename)?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str::<Theme>(content).ok()
    }

    pub fn available_themes() -> Vec<String> {
        let mut names: Vec<String> = ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect();
        names.sort();
        names
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load("catppuccin-mocha").unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#1e1e2e".to_string(),
            fg: "#cdd6f4".to_string(),
            muted: "#6c7086".to_string(),
            accent: "#89b4fa".to_string(),
            accent_dim: "#45475a".to_string(),
            border: "#45475a".to_string(),
            border_focused: "#89b4fa".to_string(),
            header_bg: "#313244".to_string(),
            header_fg: "#cdd6f4".to_string(),
            bar_filled: "#89b4fa".to_string(),
            bar_empty: "#313244".to_string(),
            highlight: "#f9e2af".to_string(),
            correct: "#a6e3a1".to_string(),
            incorrect: "#f38ba8".to_string(),
            warning: "#fab387".to_string(),
            gold: "#f9e2af".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6
            && let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            )
        {
            return Color::Rgb(r, g, b);
        }
        Color::White
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn muted(&self) -> Color { Self::parse_color(&self.muted) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn accent_dim(&self) -> Color { Self::parse_color(&self.accent_dim) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn border_focused(&self) -> Color { Self::parse_color(&self.border_focused) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn bar_filled(&self) -> Color { Self::parse_color(&self.bar_filled) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(&self.bar_empty) }
    pub fn highlight(&self) -> Color { Self::parse_color(&self.highlight) }
    pub fn correct(&self) -> Color { Self::parse_color(&self.correct) }
    pub fn incorrect(&self) -> Color { Self::parse_color(&self.incorrect) }
    pub fn warning(&self) -> Color { Self::parse_color(&self.warning) }
    pub fn gold(&self) -> Color { Self::parse_color(&self.gold) }

    /// Green for strong percentages, amber for middling, red otherwise.
    pub fn grade(&self, percentage: u32) -> Color {
        if percentage >= 90 {
            self.correct()
        } else if percentage >= 70 {
            self.warning()
        } else {
            self.incorrect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_themes_parse() {
        let names = Theme::available_themes();
        assert!(names.contains(&"catppuccin-mocha".to_string()));
        for name in names {
            let file = ThemeAssets::get(&format!("{name}.toml")).unwrap();
            let content = std::str::from_utf8(file.data.as_ref()).unwrap();
            let theme: Theme = toml::from_str(content).unwrap();
            assert_eq!(theme.name, name);
        }
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(ThemeColors::parse_color("#ff8000"), Color::Rgb(255, 128, 0));
        assert_eq!(ThemeColors::parse_color("nope"), Color::White);
    }
}
