use std::fmt::Write;

use crate::plan::FramePlan;

/// Renderer-agnostic interface over a built [`FramePlan`].
///
/// A renderer reads the plan and produces output. It never sees the scene,
/// so it cannot mutate camera or animation state.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given plan.
    fn render(&self, plan: &FramePlan) -> Self::Output;
}

/// Text renderer used by the headless CLI and in tests.
///
/// Lists the uniforms and the draws of each pass in execution order.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, plan: &FramePlan) -> String {
        let u = &plan.uniforms;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} (fill={}) ===",
            plan.frame,
            plan.fill_mode.name()
        );
        let eye = u.view.inverse().w_axis.truncate();
        let _ = writeln!(out, "Camera: eye=({:.2}, {:.2}, {:.2})", eye.x, eye.y, eye.z);
        let _ = writeln!(
            out,
            "Light: dir=({:.2}, {:.2}, {:.2})",
            u.light_direction.x, u.light_direction.y, u.light_direction.z
        );
        let _ = writeln!(
            out,
            "Fog: {} density={:.3}",
            on_off(u.fog_enabled),
            u.fog_density
        );
        let _ = writeln!(out, "Spotlight: {}", on_off(u.spot_enabled));

        let _ = writeln!(out, "Shadow pass ({0}x{0}):", plan.shadow.map_size);
        for draw in &plan.shadow.draws {
            let p = draw.model.w_axis;
            let _ = writeln!(
                out,
                "  {} origin=({:.2}, {:.2}, {:.2})",
                draw.object.name(),
                p.x,
                p.y,
                p.z
            );
        }
        out.push_str("Main pass:\n");
        for draw in plan.main.iter().chain(std::iter::once(&plan.light_cube)) {
            let p = draw.model.w_axis;
            let _ = writeln!(
                out,
                "  {} origin=({:.2}, {:.2}, {:.2})",
                draw.object.name(),
                p.x,
                p.y,
                p.z
            );
        }
        out.push_str("  skybox\n");
        out
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}
