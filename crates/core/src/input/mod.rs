use std::fmt;

use crate::{config::InputConfig, render::Styles};

/// Terminal-independent key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// A letter pressed together with Control, lower-cased.
    Ctrl(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

/// How the insertion cursor is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMode {
    #[default]
    Blink,
    Static,
    Hide,
}

impl CursorMode {
    /// blink → static → hide → blink
    pub fn next(self) -> Self {
        match self {
            Self::Blink => Self::Static,
            Self::Static => Self::Hide,
            Self::Hide => Self::Blink,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Blink => "blink",
            Self::Static => "static",
            Self::Hide => "hidden",
        }
    }
}

impl fmt::Display for CursorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Single-line text field holding the tempo being typed.
#[derive(Debug, Clone)]
pub struct TextInput {
    value: Vec<char>,
    cursor: usize,
    char_limit: usize,
    prompt: String,
    placeholder: String,
    cursor_mode: CursorMode,
}

impl TextInput {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            value: Vec::new(),
            cursor: 0,
            char_limit: config.char_limit,
            prompt: config.prompt.clone(),
            placeholder: config.placeholder.clone(),
            cursor_mode: CursorMode::default(),
        }
    }

    pub fn value(&self) -> String {
        self.value.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cursor_mode(&self) -> CursorMode {
        self.cursor_mode
    }

    pub fn set_cursor_mode(&mut self, mode: CursorMode) {
        self.cursor_mode = mode;
    }

    /// Applies an editing key and returns the resulting text. Keys the field
    /// does not understand leave it untouched.
    pub fn update(&mut self, key: Key) -> String {
        match key {
            Key::Char(ch) if !ch.is_control() => {
                if self.char_limit == 0 || self.value.len() < self.char_limit {
                    self.value.insert(self.cursor, ch);
                    self.cursor += 1;
                }
            }
            Key::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.value.remove(self.cursor);
            }
            Key::Delete if self.cursor < self.value.len() => {
                self.value.remove(self.cursor);
            }
            Key::Left => self.cursor = self.cursor.saturating_sub(1),
            Key::Right => self.cursor = (self.cursor + 1).min(self.value.len()),
            Key::Home => self.cursor = 0,
            Key::End => self.cursor = self.value.len(),
            _ => {}
        }
        self.value()
    }

    /// Prompt, text (or placeholder) and the cursor cell.
    pub fn view(&self, styles: &Styles) -> String {
        let mut out = styles.prompt.apply(self.prompt.as_str()).to_string();
        let cursor_style = match self.cursor_mode {
            CursorMode::Blink => Some(&styles.blinking_cursor),
            CursorMode::Static => Some(&styles.cursor),
            CursorMode::Hide => None,
        };

        if self.value.is_empty() {
            let mut placeholder = self.placeholder.chars();
            match (cursor_style, placeholder.next()) {
                (Some(style), Some(first)) => {
                    out.push_str(&style.apply(first).to_string());
                    let rest: String = placeholder.collect();
                    out.push_str(&styles.placeholder.apply(rest).to_string());
                }
                (Some(style), None) => out.push_str(&style.apply(' ').to_string()),
                (None, _) => out.push_str(&styles.placeholder.apply(&self.placeholder).to_string()),
            }
            return out;
        }

        let before: String = self.value[..self.cursor].iter().collect();
        out.push_str(&styles.text.apply(before).to_string());

        let under = self.value.get(self.cursor).copied();
        match cursor_style {
            Some(style) => out.push_str(&style.apply(under.unwrap_or(' ')).to_string()),
            None => {
                if let Some(ch) = under {
                    out.push_str(&styles.text.apply(ch).to_string());
                }
            }
        }

        if self.cursor + 1 < self.value.len() {
            let after: String = self.value[self.cursor + 1..].iter().collect();
            out.push_str(&styles.text.apply(after).to_string());
        }
        out
    }
}
