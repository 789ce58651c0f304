//! Input - keyboard events, crossterm conversion and polling.
//!
//! Bridges crossterm's event system with the dashboard's key-name based
//! dispatch. Every key press is reduced to a [`KeyboardEvent`] whose
//! [`KeyboardEvent::name`] is what keybinding tables are keyed by.
//!
//! # Key names
//!
//! | Key                 | Name          |
//! |---------------------|---------------|
//! | printable character | `"q"`, `"/"`  |
//! | Enter / Esc / Tab   | `"Enter"`, `"Escape"`, `"Tab"` |
//! | arrows              | `"ArrowUp"` … |
//! | Ctrl + char         | `"Ctrl+c"`    |
//! | Alt + char          | `"Alt+x"`     |

use std::time::Duration;

use crossterm::event::{
    poll, read, Event as CrosstermEvent, KeyCode, KeyEvent as CrosstermKeyEvent, KeyEventKind,
    KeyModifiers,
};

// =============================================================================
// TYPES
// =============================================================================

/// Keyboard modifier state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::default() }
    }

    pub fn alt() -> Self {
        Self { alt: true, ..Self::default() }
    }

    pub fn shift() -> Self {
        Self { shift: true, ..Self::default() }
    }
}

/// Key event state (press, repeat, release)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Keyboard event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyboardEvent {
    /// The key that was pressed (e.g., "a", "Enter", "ArrowUp")
    pub key: String,
    pub modifiers: Modifiers,
    pub state: KeyState,
}

impl KeyboardEvent {
    /// Create a simple key press event
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            state: KeyState::Press,
        }
    }

    /// Create a key press with modifiers
    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            state: KeyState::Press,
        }
    }

    pub fn is_press(&self) -> bool {
        self.state == KeyState::Press
    }

    /// The binding name for this event.
    ///
    /// Ctrl and Alt are folded into the name; Shift is already reflected in
    /// the character itself ("Q" vs "q") so it only appears for named keys.
    pub fn name(&self) -> String {
        let mut name = String::new();
        if self.modifiers.ctrl {
            name.push_str("Ctrl+");
        }
        if self.modifiers.alt {
            name.push_str("Alt+");
        }
        if self.modifiers.shift && self.key.chars().count() > 1 {
            name.push_str("Shift+");
        }
        name.push_str(&self.key);
        name
    }

    /// The character this event types, if it is plain text input.
    pub fn printable(&self) -> Option<char> {
        if self.modifiers.ctrl || self.modifiers.alt {
            return None;
        }
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(c),
            _ => None,
        }
    }
}

/// Unified event type fed to the terminal wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Keyboard event
    Key(KeyboardEvent),
    /// Terminal resize event (new width, height)
    Resize(u16, u16),
    /// No event or unhandled event type
    None,
}

// =============================================================================
// KEY EVENT CONVERSION
// =============================================================================

/// Convert crossterm KeyEvent to our KeyboardEvent
pub fn convert_key_event(event: CrosstermKeyEvent) -> KeyboardEvent {
    let key = match event.code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Insert => "Insert".to_string(),
        _ => String::new(),
    };

    let state = match event.kind {
        KeyEventKind::Press => KeyState::Press,
        KeyEventKind::Repeat => KeyState::Repeat,
        KeyEventKind::Release => KeyState::Release,
    };

    let mut modifiers = convert_modifiers(event.modifiers);
    if event.code == KeyCode::BackTab {
        modifiers.shift = true;
    }
    // The character already carries the case
    if matches!(event.code, KeyCode::Char(_)) && !modifiers.ctrl && !modifiers.alt {
        modifiers.shift = false;
    }

    KeyboardEvent { key, modifiers, state }
}

/// Convert crossterm KeyModifiers to our Modifiers
fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    Modifiers {
        ctrl: mods.contains(KeyModifiers::CONTROL),
        alt: mods.contains(KeyModifiers::ALT),
        shift: mods.contains(KeyModifiers::SHIFT),
    }
}

/// Convert any crossterm event.
pub fn convert_event(event: CrosstermEvent) -> InputEvent {
    match event {
        CrosstermEvent::Key(key) => {
            let converted = convert_key_event(key);
            if converted.key.is_empty() {
                InputEvent::None
            } else {
                InputEvent::Key(converted)
            }
        }
        CrosstermEvent::Resize(w, h) => InputEvent::Resize(w, h),
        _ => InputEvent::None,
    }
}

// =============================================================================
// EVENT SOURCES
// =============================================================================

/// Where the event loop gets its input from.
pub trait EventSource {
    /// Wait up to `timeout` for the next event.
    fn poll_event(&mut self, timeout: Duration) -> std::io::Result<Option<InputEvent>>;
}

/// Events from the real terminal via crossterm.
#[derive(Debug, Default)]
pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn poll_event(&mut self, timeout: Duration) -> std::io::Result<Option<InputEvent>> {
        if poll(timeout)? {
            Ok(Some(convert_event(read()?)))
        } else {
            Ok(None)
        }
    }
}

/// A scripted event source for tests and headless runs.
///
/// Returns the queued events in order, then `None` forever.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    events: std::collections::VecDeque<InputEvent>,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self { events: events.into_iter().collect() }
    }

    /// Queue plain key presses by name.
    pub fn keys(keys: &[&str]) -> Self {
        Self::new(keys.iter().map(|k| InputEvent::Key(KeyboardEvent::new(*k))))
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSource for ScriptedEvents {
    fn poll_event(&mut self, _timeout: Duration) -> std::io::Result<Option<InputEvent>> {
        Ok(self.events.pop_front())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> CrosstermKeyEvent {
        CrosstermKeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_convert_char() {
        let event = convert_key_event(key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert_eq!(event.name(), "q");
        assert_eq!(event.printable(), Some('q'));
    }

    #[test]
    fn test_uppercase_drops_shift() {
        let event = convert_key_event(key(KeyCode::Char('Q'), KeyModifiers::SHIFT));
        assert_eq!(event.name(), "Q");
    }

    #[test]
    fn test_convert_ctrl_c() {
        let event = convert_key_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(event.name(), "Ctrl+c");
        assert_eq!(event.printable(), None);
    }

    #[test]
    fn test_convert_named_keys() {
        assert_eq!(convert_key_event(key(KeyCode::Esc, KeyModifiers::NONE)).name(), "Escape");
        assert_eq!(convert_key_event(key(KeyCode::Enter, KeyModifiers::NONE)).name(), "Enter");
        assert_eq!(convert_key_event(key(KeyCode::Up, KeyModifiers::NONE)).name(), "ArrowUp");
        assert_eq!(convert_key_event(key(KeyCode::BackTab, KeyModifiers::SHIFT)).name(), "Shift+Tab");
        assert_eq!(convert_key_event(key(KeyCode::F(5), KeyModifiers::NONE)).name(), "F5");
    }

    #[test]
    fn test_named_keys_not_printable() {
        assert_eq!(KeyboardEvent::new("Enter").printable(), None);
        assert_eq!(KeyboardEvent::new(" ").printable(), Some(' '));
    }

    #[test]
    fn test_convert_resize() {
        assert_eq!(convert_event(CrosstermEvent::Resize(100, 30)), InputEvent::Resize(100, 30));
        assert_eq!(convert_event(CrosstermEvent::FocusGained), InputEvent::None);
    }

    #[test]
    fn test_scripted_events() {
        let mut events = ScriptedEvents::keys(&["i", "Escape"]);
        let timeout = Duration::from_millis(0);
        assert_eq!(
            events.poll_event(timeout).unwrap(),
            Some(InputEvent::Key(KeyboardEvent::new("i")))
        );
        assert_eq!(
            events.poll_event(timeout).unwrap(),
            Some(InputEvent::Key(KeyboardEvent::new("Escape")))
        );
        assert_eq!(events.poll_event(timeout).unwrap(), None);
        assert!(events.is_empty());
    }
}
