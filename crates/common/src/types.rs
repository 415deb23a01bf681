use serde::{Deserialize, Serialize};

/// One of the fixed renderable objects of the city scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SceneObject {
    City,
    CarBody,
    FrontWheels,
    BackWheels,
    LightCube,
    Skybox,
}

impl SceneObject {
    /// Every object, in draw order.
    pub const ALL: [SceneObject; 6] = [
        SceneObject::City,
        SceneObject::CarBody,
        SceneObject::FrontWheels,
        SceneObject::BackWheels,
        SceneObject::LightCube,
        SceneObject::Skybox,
    ];

    /// Objects drawn with lighting, fog and shadows. They are also the only
    /// objects written into the shadow map.
    pub const LIT: [SceneObject; 4] = [
        SceneObject::City,
        SceneObject::CarBody,
        SceneObject::FrontWheels,
        SceneObject::BackWheels,
    ];

    pub fn casts_shadow(self) -> bool {
        Self::LIT.contains(&self)
    }

    pub fn name(self) -> &'static str {
        match self {
            SceneObject::City => "city",
            SceneObject::CarBody => "car_body",
            SceneObject::FrontWheels => "front_wheels",
            SceneObject::BackWheels => "back_wheels",
            SceneObject::LightCube => "light_cube",
            SceneObject::Skybox => "skybox",
        }
    }
}

/// Camera translation direction, expressed in the camera's own basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Rasterization mode for the lit scene geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FillMode {
    #[default]
    Fill,
    Wireframe,
    Points,
}

impl FillMode {
    pub fn name(self) -> &'static str {
        match self {
            FillMode::Fill => "fill",
            FillMode::Wireframe => "wireframe",
            FillMode::Points => "points",
        }
    }
}
