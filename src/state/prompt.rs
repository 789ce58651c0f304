//! Prompt - the editable command line.
//!
//! Text and cursor live in signals so the input renderer follows edits
//! without being told. The cursor is a character index, not a byte offset.

use crate::reactive::{batch, Signal};
use crate::terminal::KeyboardEvent;

pub struct Prompt {
    value: Signal<String>,
    cursor: Signal<usize>,
}

impl Prompt {
    pub fn new() -> Self {
        Self {
            value: Signal::new(String::new()),
            cursor: Signal::new(0),
        }
    }

    fn byte_offset(text: &str, chars: usize) -> usize {
        text.char_indices()
            .nth(chars)
            .map(|(offset, _)| offset)
            .unwrap_or(text.len())
    }

    /// Insert a character at the cursor.
    pub fn insert(&self, ch: char) {
        let cursor = self.cursor.get_untracked();
        batch(|| {
            self.value.update(|text| {
                let at = Self::byte_offset(text, cursor);
                text.insert(at, ch);
            });
            self.cursor.set(cursor + 1);
        });
    }

    /// Delete the character before the cursor.
    pub fn backspace(&self) {
        let cursor = self.cursor.get_untracked();
        if cursor == 0 {
            return;
        }
        batch(|| {
            self.value.update(|text| {
                let at = Self::byte_offset(text, cursor - 1);
                text.remove(at);
            });
            self.cursor.set(cursor - 1);
        });
    }

    pub fn move_left(&self) {
        let cursor = self.cursor.get_untracked();
        self.cursor.set(cursor.saturating_sub(1));
    }

    pub fn move_right(&self) {
        let len = self.value.with_untracked(|text| text.chars().count());
        let cursor = self.cursor.get_untracked();
        self.cursor.set((cursor + 1).min(len));
    }

    pub fn move_home(&self) {
        self.cursor.set(0);
    }

    pub fn move_end(&self) {
        let len = self.value.with_untracked(|text| text.chars().count());
        self.cursor.set(len);
    }

    /// Apply an editing key. Returns false for keys that are not edits.
    pub fn handle_key(&self, event: &KeyboardEvent) -> bool {
        if let Some(ch) = event.printable() {
            self.insert(ch);
            return true;
        }
        match event.name().as_str() {
            "Backspace" => self.backspace(),
            "ArrowLeft" => self.move_left(),
            "ArrowRight" => self.move_right(),
            "Home" => self.move_home(),
            "End" => self.move_end(),
            _ => return false,
        }
        true
    }

    /// Return the text and empty the prompt.
    pub fn take(&self) -> String {
        let text = self.value.get_untracked();
        self.clear();
        text
    }

    pub fn clear(&self) {
        batch(|| {
            self.value.set(String::new());
            self.cursor.set(0);
        });
    }

    /// Current text (tracked).
    pub fn value(&self) -> String {
        self.value.get()
    }

    /// Cursor position in characters (tracked).
    pub fn cursor(&self) -> usize {
        self.cursor.get()
    }
}

impl Default for Prompt {
    fn default() -> Self {
        Self::new()
    }
}
