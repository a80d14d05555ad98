//! Key mapping for the input prompt
//!
//! Converts crossterm key events into prompt actions.

use bitflags::bitflags;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

bitflags! {
    /// Modifier keys that turn a character into a chord.
    /// Shift only changes the character itself.
    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    pub struct Modifiers: u8 {
        const CTRL = 0b0001;
        const ALT  = 0b0010;
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        let mut result = Modifiers::empty();
        if mods.contains(KeyModifiers::CONTROL) {
            result |= Modifiers::CTRL;
        }
        if mods.contains(KeyModifiers::ALT) {
            result |= Modifiers::ALT;
        }
        result
    }
}

/// What a key press does to the prompt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputAction {
    /// Append a character to the input value
    Insert(char),
    /// Remove the last character
    Backspace,
    /// Run the input value
    Submit,
    /// Scroll the output view towards older lines
    ScrollUp,
    /// Scroll the output view towards newer lines
    ScrollDown,
    /// Jump back to the newest line
    ScrollBottom,
    /// Leave the terminal
    Quit,
    /// Swallowed without effect
    Ignore,
}

/// Key mapper for converting key events to prompt actions
pub struct KeyMapper;

impl KeyMapper {
    /// Map a crossterm KeyEvent to a prompt action
    pub fn map(event: &KeyEvent) -> InputAction {
        // Only process key press events
        if event.kind != KeyEventKind::Press {
            return InputAction::Ignore;
        }

        let mods = Modifiers::from(event.modifiers);

        match event.code {
            KeyCode::Char(ch) => Self::map_char(ch, mods),
            KeyCode::Enter => InputAction::Submit,
            KeyCode::Backspace => InputAction::Backspace,
            KeyCode::PageUp => InputAction::ScrollUp,
            KeyCode::PageDown => InputAction::ScrollDown,
            KeyCode::End => InputAction::ScrollBottom,

            // Arrow keys never move the caret
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => InputAction::Ignore,

            _ => InputAction::Ignore,
        }
    }

    /// Map a character with modifiers
    fn map_char(ch: char, mods: Modifiers) -> InputAction {
        if mods.contains(Modifiers::CTRL) {
            return match ch.to_ascii_lowercase() {
                'c' | 'd' => InputAction::Quit,
                _ => InputAction::Ignore,
            };
        }

        if mods.contains(Modifiers::ALT) {
            return InputAction::Ignore;
        }

        InputAction::Insert(ch)
    }
}
