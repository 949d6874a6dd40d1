use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
}

/// Single-line text field for the name and import prompts.
pub struct LineInput {
    text: String,
    /// Cursor position as a char index (0 = before first char).
    cursor: usize,
    max_chars: usize,
}

impl LineInput {
    pub fn new(text: &str, max_chars: usize) -> Self {
        let text: String = text.chars().take(max_chars).collect();
        Self {
            cursor: text.chars().count(),
            text,
            max_chars,
        }
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Returns (before_cursor, cursor_char, after_cursor) for styled rendering.
    /// When cursor is at end of text, cursor_char is None.
    pub fn render_parts(&self) -> (&str, Option<char>, &str) {
        let byte_offset = self.char_to_byte(self.cursor);
        match self.text[byte_offset..].chars().next() {
            Some(ch) => {
                let next_byte = byte_offset + ch.len_utf8();
                (&self.text[..byte_offset], Some(ch), &self.text[next_byte..])
            }
            None => (&self.text, None, ""),
        }
    }

    pub fn handle(&mut self, key: KeyEvent) -> InputResult {
        let len = self.text.chars().count();
        match key.code {
            KeyCode::Esc => return InputResult::Cancel,
            KeyCode::Enter => return InputResult::Submit,
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(len),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = len,
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.remove_at(self.cursor);
                }
            }
            KeyCode::Delete => {
                if self.cursor < len {
                    self.remove_at(self.cursor);
                }
            }
            KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.cursor = 0;
            }
            KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.cursor = len;
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.clear();
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if len < self.max_chars {
                    let byte_offset = self.char_to_byte(self.cursor);
                    self.text.insert(byte_offset, ch);
                    self.cursor += 1;
                }
            }
            _ => {}
        }
        InputResult::Continue
    }

    fn remove_at(&mut self, char_index: usize) {
        let byte_offset = self.char_to_byte(char_index);
        if let Some(ch) = self.text[byte_offset..].chars().next() {
            self.text
                .replace_range(byte_offset..byte_offset + ch.len_utf8(), "");
        }
    }

    fn char_to_byte(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut LineInput, s: &str) {
        for ch in s.chars() {
            input.handle(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn test_typing_and_editing() {
        let mut input = LineInput::new("", 20);
        type_str(&mut input, "Ada");
        assert_eq!(input.value(), "Ada");
        input.handle(key(KeyCode::Left));
        input.handle(key(KeyCode::Backspace));
        assert_eq!(input.value(), "Aa");
        input.handle(key(KeyCode::Home));
        input.handle(key(KeyCode::Delete));
        assert_eq!(input.value(), "a");
    }

    #[test]
    fn test_max_chars() {
        let mut input = LineInput::new("", 3);
        type_str(&mut input, "Grace");
        assert_eq!(input.value(), "Gra");
    }

    #[test]
    fn test_multibyte_cursor() {
        let mut input = LineInput::new("Zoë", 20);
        input.handle(key(KeyCode::Left));
        assert_eq!(input.render_parts(), ("Zo", Some('ë'), ""));
        input.handle(key(KeyCode::Backspace));
        assert_eq!(input.value(), "Zë");
    }

    #[test]
    fn test_submit_and_cancel() {
        let mut input = LineInput::new("x", 5);
        assert_eq!(input.handle(key(KeyCode::Enter)), InputResult::Submit);
        assert_eq!(input.handle(key(KeyCode::Esc)), InputResult::Cancel);
        assert_eq!(input.handle(key(KeyCode::Char('y'))), InputResult::Continue);
    }
}
