use glam::Vec2;

use crate::action::Action;
use crate::keymap::{Key, edge_action, held_bindings};

/// Number of key slots in the pressed-state array.
pub const KEY_SLOTS: usize = 1024;

/// Snapshot of input written by window callbacks and read once per frame.
pub struct InputState {
    pressed: [bool; KEY_SLOTS],
    last_cursor: Option<Vec2>,
    pointer_delta: Vec2,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            pressed: [false; KEY_SLOTS],
            last_cursor: None,
            pointer_delta: Vec2::ZERO,
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key transition. Returns the edge action bound to the key when
    /// it goes down, so the caller can react immediately (e.g. exit).
    pub fn set_key(&mut self, key: Key, pressed: bool) -> Option<Action> {
        let was_pressed = self.pressed[key.slot()];
        self.pressed[key.slot()] = pressed;
        if pressed != was_pressed {
            tracing::trace!(?key, pressed, "key state changed");
        }
        if pressed && !was_pressed {
            edge_action(key)
        } else {
            None
        }
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed[key.slot()]
    }

    /// Release every key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.pressed = [false; KEY_SLOTS];
    }

    /// Accumulate a raw pointer delta in pixels.
    pub fn add_pointer_delta(&mut self, dx: f64, dy: f64) {
        self.pointer_delta += Vec2::new(dx as f32, dy as f32);
    }

    /// Feed an absolute cursor position. The first position only seeds the
    /// tracker; later ones accumulate the difference to the previous one.
    pub fn cursor_moved_to(&mut self, x: f64, y: f64) {
        let position = Vec2::new(x as f32, y as f32);
        if let Some(last) = self.last_cursor {
            self.pointer_delta += position - last;
        }
        self.last_cursor = Some(position);
    }

    /// Return and clear the pointer motion accumulated since the last call.
    pub fn take_pointer_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.pointer_delta)
    }

    /// Actions for every held key, in binding order.
    pub fn held_actions(&self) -> Vec<Action> {
        held_bindings()
            .iter()
            .filter(|(key, _)| self.is_pressed(*key))
            .map(|(_, action)| *action)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityview_common::MoveDirection;

    #[test]
    fn key_press_and_release() {
        let mut input = InputState::new();
        assert!(!input.is_pressed(Key::W));
        input.set_key(Key::W, true);
        assert!(input.is_pressed(Key::W));
        input.set_key(Key::W, false);
        assert!(!input.is_pressed(Key::W));
    }

    #[test]
    fn edge_action_fires_once_per_press() {
        let mut input = InputState::new();
        assert_eq!(input.set_key(Key::Escape, true), Some(Action::Exit));
        // key repeat
        assert_eq!(input.set_key(Key::Escape, true), None);
        assert_eq!(input.set_key(Key::Escape, false), None);
        assert_eq!(input.set_key(Key::Escape, true), Some(Action::Exit));
    }

    #[test]
    fn held_actions_follow_binding_order() {
        let mut input = InputState::new();
        input.set_key(Key::D, true);
        input.set_key(Key::W, true);
        input.set_key(Key::N, true);
        assert_eq!(
            input.held_actions(),
            vec![
                Action::SetCollision(true),
                Action::Move(MoveDirection::Forward),
                Action::Move(MoveDirection::Right),
            ]
        );
    }

    #[test]
    fn cursor_positions_become_deltas() {
        let mut input = InputState::new();
        input.cursor_moved_to(100.0, 100.0);
        assert_eq!(input.take_pointer_delta(), Vec2::ZERO);
        input.cursor_moved_to(110.0, 95.0);
        input.cursor_moved_to(112.0, 90.0);
        assert_eq!(input.take_pointer_delta(), Vec2::new(12.0, -10.0));
        assert_eq!(input.take_pointer_delta(), Vec2::ZERO);
    }

    #[test]
    fn raw_deltas_accumulate() {
        let mut input = InputState::new();
        input.add_pointer_delta(1.5, -2.0);
        input.add_pointer_delta(0.5, 1.0);
        assert_eq!(input.take_pointer_delta(), Vec2::new(2.0, -1.0));
    }

    #[test]
    fn release_all_clears_keys() {
        let mut input = InputState::new();
        input.set_key(Key::Y, true);
        input.set_key(Key::Q, true);
        input.release_all();
        assert!(input.held_actions().is_empty());
    }
}
