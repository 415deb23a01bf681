//! Input: a per-frame snapshot of held keys and pointer motion, mapped to
//! high-level actions.
//!
//! # Invariants
//! - Window callbacks only write the snapshot; the frame loop reads it once per tick.
//! - Held-key actions are produced in a fixed binding order, so identical
//!   snapshots always yield identical action sequences.

pub mod action;
pub mod keymap;
pub mod state;

pub use action::{Action, Adjust, CarDrive};
pub use keymap::{Key, KeyParseError, edge_action, held_bindings};
pub use state::{InputState, KEY_SLOTS};

pub fn crate_info() -> &'static str {
    "cityview-input v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("input"));
    }
}
