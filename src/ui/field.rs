//! Form fields.
//!
//! A login form is made of two kinds of field:
//!
//! - [`Picker`]: a fixed list of options cycled with ←/→ (the session)
//! - [`TextInput`]: a line of text, optionally masked (username, password)
//!
//! Both are wrapped in the [`Field`] enum so the form can dispatch render,
//! key handling, text retrieval and reset without knowing which is which.

use unicode_width::UnicodeWidthStr;

use super::keymapper::Key;
use super::renderer::{fit_columns, tail_columns};

/// Character shown in place of each masked character
pub const MASK_CHAR: char = '*';

/// One editable or selectable form element
#[derive(Debug, Clone)]
pub enum Field {
    Picker(Picker),
    TextInput(TextInput),
}

impl Field {
    /// Render the field as a single line no wider than `width` columns.
    pub fn render(&self, width: usize) -> String {
        match self {
            Field::Picker(picker) => picker.render(width),
            Field::TextInput(input) => input.render(width),
        }
    }

    pub fn handle(&mut self, key: &Key) {
        match self {
            Field::Picker(picker) => picker.handle(key),
            Field::TextInput(input) => input.handle(key),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Field::Picker(picker) => picker.selected_label(),
            Field::TextInput(input) => input.contents(),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Field::Picker(picker) => picker.reset(),
            Field::TextInput(input) => input.reset(),
        }
    }
}

/// Cycles through a non-empty list of options
#[derive(Debug, Clone)]
pub struct Picker {
    options: Vec<String>,
    selected: usize,
    default: usize,
}

impl Picker {
    /// Creates a picker over `options`, or `None` if there are none.
    pub fn new(options: Vec<String>) -> Option<Self> {
        if options.is_empty() {
            return None;
        }
        Some(Self {
            options,
            selected: 0,
            default: 0,
        })
    }

    /// Select `index` and make it the value `reset` returns to.
    /// Out of range indices are ignored.
    pub fn set_default(&mut self, index: usize) {
        if index < self.options.len() {
            self.selected = index;
            self.default = index;
        }
    }

    pub fn selected_label(&self) -> &str {
        &self.options[self.selected]
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.options.len();
    }

    pub fn prev(&mut self) {
        self.selected = (self.selected + self.options.len() - 1) % self.options.len();
    }

    pub fn handle(&mut self, key: &Key) {
        match key {
            Key::Right => self.next(),
            Key::Left => self.prev(),
            _ => {}
        }
    }

    pub fn reset(&mut self) {
        self.selected = self.default;
    }

    fn render(&self, width: usize) -> String {
        fit_columns(&format!("< {} >", self.selected_label()), 0, width)
    }
}

/// A single line text buffer
#[derive(Debug, Clone)]
pub struct TextInput {
    label: String,
    contents: String,
    masked: bool,
}

impl TextInput {
    pub fn new(label: impl Into<String>, masked: bool) -> Self {
        Self {
            label: label.into(),
            contents: String::new(),
            masked,
        }
    }

    pub fn with_contents(mut self, contents: impl Into<String>) -> Self {
        self.contents = contents.into();
        self
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn char_count(&self) -> usize {
        self.contents.chars().count()
    }

    pub fn append(&mut self, ch: char) {
        self.contents.push(ch);
    }

    /// Remove the last character; nothing happens on an empty buffer.
    pub fn backspace(&mut self) {
        self.contents.pop();
    }

    pub fn handle(&mut self, key: &Key) {
        match key {
            Key::Char(ch) => self.append(*ch),
            Key::Text(text) => self.contents.push_str(text),
            Key::Backspace => self.backspace(),
            _ => {}
        }
    }

    pub fn reset(&mut self) {
        self.contents.clear();
    }

    /// The value as it may be shown on screen
    pub fn display_value(&self) -> String {
        if self.masked {
            MASK_CHAR.to_string().repeat(self.char_count())
        } else {
            self.contents.clone()
        }
    }

    fn render(&self, width: usize) -> String {
        let prefix = format!("{}: ", self.label);
        let prefix_width = prefix.width();
        if prefix_width >= width {
            return fit_columns(&prefix, 0, width);
        }
        // Keep the end of the value visible while typing
        let value = tail_columns(&self.display_value(), width - prefix_width);
        format!("{}{}", prefix, value)
    }
}
