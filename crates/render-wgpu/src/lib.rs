//! wgpu render backend for the city viewer.
//!
//! Executes a [`cityview_render::FramePlan`]: a depth-only shadow pass from
//! the directional light, then the main pass drawing the lit models, the
//! light cube and the skybox.
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - The shadow pass is encoded before the main pass in the same submission.
//! - The skybox is drawn last and never writes depth.
//! - GPU validation errors are logged, never fatal.

mod diagnostics;
mod gpu;
mod mesh;
mod pipeline;
mod shaders;
mod shadow;
mod skybox;
mod uniforms;

pub use diagnostics::{ErrorScope, install_uncaptured_error_handler};
pub use gpu::{RendererError, WgpuRenderer, fill_mode_features};

pub fn crate_info() -> &'static str {
    "cityview-render-wgpu v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert_eq!(crate_info(), "cityview-render-wgpu v0.1.0");
    }
}
