//! Client input: mouse clicks and keyboard shortcuts mapped to game actions

use crate::rendering::Layout;
use macroquad::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    NewGame,
    Guess(char),
    RevealAnswer,
    Quit,
}

/// Turns raw macroquad input into `UiAction`s once per frame
pub struct InputManager {
    // Previous frame key states for edge detection
    prev_enter: bool,
    prev_tab: bool,
    prev_escape: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            prev_enter: false,
            prev_tab: false,
            prev_escape: false,
        }
    }

    /// Collects this frame's actions in the order they happened.
    pub fn update(&mut self, layout: &Layout) -> Vec<UiAction> {
        let mut actions = Vec::new();

        if is_mouse_button_pressed(MouseButton::Left) {
            let (x, y) = mouse_position();
            if let Some(action) = action_at(layout, vec2(x, y)) {
                actions.push(action);
            }
        }

        while let Some(typed) = get_char_pressed() {
            if let Some(action) = action_for_char(typed) {
                actions.push(action);
            }
        }

        let enter = is_key_down(KeyCode::Enter);
        let tab = is_key_down(KeyCode::Tab);
        let escape = is_key_down(KeyCode::Escape);

        if enter && !self.prev_enter {
            actions.push(UiAction::NewGame);
        }
        if tab && !self.prev_tab {
            actions.push(UiAction::RevealAnswer);
        }
        if escape && !self.prev_escape {
            actions.push(UiAction::Quit);
        }

        self.prev_enter = enter;
        self.prev_tab = tab;
        self.prev_escape = escape;

        actions
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn action_at(layout: &Layout, point: Vec2) -> Option<UiAction> {
    if layout.options_button().contains(point) {
        return Some(UiAction::NewGame);
    }
    if layout.reveal_button().contains(point) {
        return Some(UiAction::RevealAnswer);
    }
    layout.letter_at(point).map(UiAction::Guess)
}

/// Typed letters become guesses; anything else is ignored.
pub fn action_for_char(typed: char) -> Option<UiAction> {
    typed
        .is_ascii_alphabetic()
        .then(|| UiAction::Guess(typed.to_ascii_uppercase()))
}
