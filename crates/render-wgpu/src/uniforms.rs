use bytemuck::{Pod, Zeroable};
use cityview_render::{Draw, FrameUniforms};
use glam::{Mat4, Vec3};

/// Must match `Frame` in the scene shader (320 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct FrameBlock {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    light_space: [[f32; 4]; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
    spot_position: [f32; 4],
    spot_direction: [f32; 4],
    spot_color: [f32; 4],
    fog_color: [f32; 4],
    params: [f32; 4],
    spot_cutoffs: [f32; 4],
}

fn flag(enabled: bool) -> f32 {
    if enabled { 1.0 } else { 0.0 }
}

fn vec4(v: Vec3) -> [f32; 4] {
    v.extend(0.0).to_array()
}

impl From<&FrameUniforms> for FrameBlock {
    fn from(u: &FrameUniforms) -> Self {
        Self {
            view: u.view.to_cols_array_2d(),
            projection: u.projection.to_cols_array_2d(),
            light_space: u.light_space.to_cols_array_2d(),
            light_dir: vec4(u.light_direction),
            light_color: vec4(u.light_color),
            spot_position: vec4(u.spot_position),
            spot_direction: vec4(u.spot_direction),
            spot_color: vec4(u.spot_color),
            fog_color: vec4(u.fog_color),
            params: [
                u.fog_density,
                flag(u.fog_enabled),
                flag(u.spot_enabled),
                0.0,
            ],
            spot_cutoffs: [u.spot_inner_cutoff, u.spot_outer_cutoff, 0.0, 0.0],
        }
    }
}

/// Must match `Object` in every shader that binds group 1.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ObjectBlock {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
}

impl From<&Draw> for ObjectBlock {
    fn from(draw: &Draw) -> Self {
        Self {
            model: draw.model.to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(draw.normal_matrix).to_cols_array_2d(),
        }
    }
}

impl Default for ObjectBlock {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            normal_matrix: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct MaterialBlock {
    pub base_color: [f32; 4],
}

/// A single matrix: the light-space transform or the skybox view-projection.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct MatrixBlock {
    matrix: [[f32; 4]; 4],
}

impl From<Mat4> for MatrixBlock {
    fn from(matrix: Mat4) -> Self {
        Self {
            matrix: matrix.to_cols_array_2d(),
        }
    }
}
