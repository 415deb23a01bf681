use cityview_common::{FillMode, SceneObject};
use cityview_scene::Scene;
use glam::{Mat3, Mat4, Vec3};

/// Values shared by every draw of the main pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    /// World to light clip space, identical to the shadow pass transform.
    pub light_space: Mat4,
    /// Direction towards the light in world space.
    pub light_direction: Vec3,
    pub light_color: Vec3,
    pub fog_density: f32,
    pub fog_enabled: bool,
    pub fog_color: Vec3,
    pub spot_position: Vec3,
    pub spot_direction: Vec3,
    pub spot_inner_cutoff: f32,
    pub spot_outer_cutoff: f32,
    pub spot_color: Vec3,
    pub spot_enabled: bool,
}

/// One object drawn in the main pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draw {
    pub object: SceneObject,
    pub model: Mat4,
    /// `transpose(inverse(view * model))`, for eye-space normals.
    pub normal_matrix: Mat3,
}

impl Draw {
    fn new(object: SceneObject, model: Mat4, view: Mat4) -> Self {
        Self {
            object,
            model,
            normal_matrix: Mat3::from_mat4((view * model).inverse().transpose()),
        }
    }
}

/// One object drawn into the shadow map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowDraw {
    pub object: SceneObject,
    pub model: Mat4,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowPlan {
    pub light_space: Mat4,
    pub map_size: u32,
    pub draws: Vec<ShadowDraw>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyboxPlan {
    /// Camera view with its translation removed.
    pub view: Mat4,
    pub view_projection: Mat4,
}

/// Which pass a draw belongs to, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PassKind {
    Shadow,
    Main,
    LightCube,
    Skybox,
}

/// CPU-side description of one frame: uniform values and the ordered draw
/// lists of each pass. Built once per frame from the scene; a GPU backend
/// executes it without touching scene state.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub frame: u64,
    pub uniforms: FrameUniforms,
    pub shadow: ShadowPlan,
    pub main: Vec<Draw>,
    pub light_cube: Draw,
    pub skybox: SkyboxPlan,
    pub fill_mode: FillMode,
    pub clear_color: [f32; 4],
}

impl FramePlan {
    /// Build the plan for the current scene state. A non-positive or
    /// non-finite `aspect` (minimized window) falls back to square.
    pub fn build(scene: &Scene, aspect: f32) -> Self {
        let config = scene.config();
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };

        let view = scene.camera().view_matrix();
        let projection = Mat4::perspective_rh(
            config.projection.fov_y_degrees.to_radians(),
            aspect,
            config.projection.near,
            config.projection.far,
        );
        let light_space = scene.light_space_matrix();

        let uniforms = FrameUniforms {
            view,
            projection,
            light_space,
            light_direction: scene.light.world_direction(),
            light_color: scene.light.color,
            fog_density: scene.fog.density(),
            fog_enabled: scene.fog.enabled,
            fog_color: scene.fog.color,
            spot_position: scene.spotlight.position,
            spot_direction: scene.spotlight.direction,
            spot_inner_cutoff: scene.spotlight.inner_cutoff,
            spot_outer_cutoff: scene.spotlight.outer_cutoff,
            spot_color: scene.spotlight.color,
            spot_enabled: scene.spotlight.enabled,
        };

        let shadow = ShadowPlan {
            light_space,
            map_size: config.shadow.map_size,
            draws: SceneObject::ALL
                .iter()
                .filter(|object| object.casts_shadow())
                .map(|&object| ShadowDraw {
                    object,
                    model: scene.model_matrix(object),
                })
                .collect(),
        };

        let main = SceneObject::LIT
            .iter()
            .map(|&object| Draw::new(object, scene.model_matrix(object), view))
            .collect();

        let light_cube = Draw::new(
            SceneObject::LightCube,
            scene.model_matrix(SceneObject::LightCube),
            view,
        );

        let sky_view = Mat4::from_mat3(Mat3::from_mat4(view));
        let skybox = SkyboxPlan {
            view: sky_view,
            view_projection: projection * sky_view,
        };

        tracing::trace!(frame = scene.frame(), aspect, "frame plan built");

        Self {
            frame: scene.frame(),
            uniforms,
            shadow,
            main,
            light_cube,
            skybox,
            fill_mode: scene.fill_mode,
            clear_color: config.clear_color.0,
        }
    }

    /// Every draw of the frame in execution order.
    pub fn draw_order(&self) -> Vec<(PassKind, SceneObject)> {
        let mut order: Vec<_> = self
            .shadow
            .draws
            .iter()
            .map(|d| (PassKind::Shadow, d.object))
            .collect();
        order.extend(self.main.iter().map(|d| (PassKind::Main, d.object)));
        order.push((PassKind::LightCube, self.light_cube.object));
        order.push((PassKind::Skybox, SceneObject::Skybox));
        order
    }
}
