//! Rendering Adapter: the per-frame plan and a renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read a [`FramePlan`] and cannot mutate scene state.
//! - The shadow pass and the main pass of one plan use the same light-space matrix.
//! - The shadow pass precedes the main pass; the skybox is the last draw.

mod plan;
mod renderer;

pub use plan::{Draw, FramePlan, FrameUniforms, PassKind, ShadowDraw, ShadowPlan, SkyboxPlan};
pub use renderer::{DebugTextRenderer, Renderer};

pub fn crate_info() -> &'static str {
    "cityview-render v0.1.0"
}
