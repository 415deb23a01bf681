//! Shared identifiers used by the input, scene and render crates.

pub mod types;

pub use types::{FillMode, MoveDirection, SceneObject};

pub fn crate_info() -> &'static str {
    "cityview-common v0.1.0"
}
