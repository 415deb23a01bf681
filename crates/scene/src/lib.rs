//! Scene: authoritative viewer state and the per-frame update step.
//!
//! # Invariants
//! - The camera basis stays orthonormal after every move, look and preview step.
//! - All state mutations flow through [`Scene::apply`] and [`Scene::step`].
//! - Stepping is pure with respect to the input snapshot: identical input
//!   sequences give identical view matrices.

pub mod animation;
pub mod camera;
pub mod collision;
pub mod config;
pub mod lighting;
pub mod placement;
pub mod scene;

pub use animation::AnimationState;
pub use camera::{Camera, CameraError, DEFAULT_PREVIEW_ORBIT};
pub use collision::CollisionPolicy;
pub use config::{ConfigError, SceneConfig};
pub use lighting::{FogState, LightState, SpotlightState};
pub use placement::Placements;
pub use scene::{Scene, SceneError};

pub fn crate_info() -> &'static str {
    "cityview-scene v0.1.0"
}
