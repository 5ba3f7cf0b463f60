//! Input line state
//!
//! Single-line editing only: printable characters append (bounded by
//! the visible line width), backspace erases, Enter submits. Multi-line
//! input is out of scope.

/// Key events the input line cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Enter,
    Backspace,
}

/// What a key event did to the input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEffect {
    /// Buffer edited (or key ignored); just redraw.
    Edited,
    /// Enter on a non-empty buffer: the submitted line.
    Submitted(String),
}

/// The single-line input buffer.
#[derive(Debug)]
pub struct InputState {
    buffer: String,
    max_width: usize,
}

impl InputState {
    pub fn new(max_width: usize) -> Self {
        Self {
            buffer: String::new(),
            max_width: max_width.max(1),
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Track the visible line width; typing stops at the edge.
    pub fn set_max_width(&mut self, max_width: usize) {
        self.max_width = max_width.max(1);
    }

    pub fn handle_key(&mut self, key: KeyInput) -> InputEffect {
        match key {
            KeyInput::Char(c) => {
                if self.buffer.chars().count() < self.max_width {
                    self.buffer.push(c);
                }
                InputEffect::Edited
            }
            KeyInput::Backspace => {
                self.buffer.pop();
                InputEffect::Edited
            }
            KeyInput::Enter => {
                let line = std::mem::take(&mut self.buffer);
                if line.is_empty() {
                    InputEffect::Edited
                } else {
                    InputEffect::Submitted(line)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chars_append_and_echo() {
        let mut input = InputState::new(80);
        input.handle_key(KeyInput::Char('h'));
        input.handle_key(KeyInput::Char('i'));
        assert_eq!(input.buffer(), "hi");
    }

    #[test]
    fn test_backspace_erases_last() {
        let mut input = InputState::new(80);
        input.handle_key(KeyInput::Char('a'));
        input.handle_key(KeyInput::Char('b'));
        input.handle_key(KeyInput::Backspace);
        assert_eq!(input.buffer(), "a");

        // Backspace on an empty buffer is a no-op
        input.handle_key(KeyInput::Backspace);
        input.handle_key(KeyInput::Backspace);
        assert_eq!(input.buffer(), "");
    }

    #[test]
    fn test_enter_submits_and_clears() {
        let mut input = InputState::new(80);
        for c in "hello".chars() {
            input.handle_key(KeyInput::Char(c));
        }

        let effect = input.handle_key(KeyInput::Enter);
        assert_eq!(effect, InputEffect::Submitted("hello".to_string()));
        assert_eq!(input.buffer(), "");
    }

    #[test]
    fn test_enter_on_empty_buffer_is_no_submit() {
        let mut input = InputState::new(80);
        assert_eq!(input.handle_key(KeyInput::Enter), InputEffect::Edited);
    }

    #[test]
    fn test_typing_bounded_by_width() {
        let mut input = InputState::new(3);
        for c in "abcdef".chars() {
            input.handle_key(KeyInput::Char(c));
        }
        assert_eq!(input.buffer(), "abc");
    }
}
