//! Scene configuration. Every value has a default matching the shipped city
//! scene; a JSON file may override any subset of them.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::DEFAULT_PREVIEW_ORBIT;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub preview: PreviewConfig,
    pub collision: CollisionConfig,
    pub light: LightConfig,
    pub shadow: ShadowConfig,
    pub fog: FogConfig,
    pub spotlight: SpotlightConfig,
    pub car: CarConfig,
    pub placement: PlacementConfig,
    pub projection: ProjectionConfig,
    pub clear_color: ClearColor,
}

impl SceneConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Initial camera pose and movement tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Distance travelled per tick while a movement key is held.
    pub speed: f32,
    /// Degrees of rotation per pixel of pointer motion.
    pub look_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(33.0, 20.5, 15.0),
            target: Vec3::new(33.0, 20.6, -15.0),
            up: Vec3::Y,
            speed: 0.3,
            look_sensitivity: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Camera position at orbit angle zero.
    pub orbit_start: Vec3,
    /// Degrees added to the orbit angle every frame while the preview runs.
    pub angle_step: f32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            orbit_start: DEFAULT_PREVIEW_ORBIT,
            angle_step: 0.2,
        }
    }
}

/// Axis-aligned region the camera is kept inside when collisions are on.
/// The box has no ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub min_z: f32,
    pub max_z: f32,
    /// Speed used instead of the regular one when a move would leave the box.
    pub push_back_speed: f32,
    pub enabled: bool,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            min_x: -30.0,
            max_x: 80.0,
            min_y: 0.0,
            min_z: -90.0,
            max_z: 40.0,
            push_back_speed: -1.0,
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Direction towards the light before orbiting.
    pub direction: Vec3,
    pub color: Vec3,
    /// Initial orbit angle around world-up, in degrees.
    pub angle: f32,
    /// Degrees per tick while a light key is held.
    pub rotate_step: f32,
    /// The indicator cube sits at `direction * cube_offset_scale`.
    pub cube_offset_scale: f32,
    pub cube_scale: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-49.0, 62.5, -43.5),
            color: Vec3::ONE,
            angle: 0.0,
            rotate_step: 1.0,
            cube_offset_scale: 1.2,
            cube_scale: 0.5,
        }
    }
}

/// Fixed orthographic frustum of the directional light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Width and height of the square shadow map, in texels.
    pub map_size: u32,
    pub half_extent: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 4096,
            half_extent: 100.0,
            near: 0.1,
            far: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    pub density: f32,
    /// Density change per tick while a fog key is held.
    pub step: f32,
    pub enabled: bool,
    pub color: Vec3,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            density: 0.005,
            step: 0.001,
            enabled: false,
            color: Vec3::splat(0.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotlightConfig {
    pub position: Vec3,
    /// Point the spotlight is aimed at.
    pub aim: Vec3,
    pub inner_cutoff_degrees: f32,
    pub outer_cutoff_degrees: f32,
    pub color: Vec3,
    pub enabled: bool,
}

impl Default for SpotlightConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(49.25, 4.6148, -16.328),
            aim: Vec3::new(49.25, 2.6148, -16.328),
            inner_cutoff_degrees: 45.5,
            outer_cutoff_degrees: 90.0,
            color: Vec3::new(1.0, 0.9, 0.6),
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarConfig {
    /// Distance added per forward tick.
    pub forward_step: f32,
    /// Distance removed per reverse tick.
    pub reverse_step: f32,
    /// Wheel rotation per tick, in degrees.
    pub wheel_step: f32,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self {
            forward_step: 0.01,
            reverse_step: 0.1,
            wheel_step: 1.0,
        }
    }
}

/// Static placement of the city and the world-space pivots the wheel
/// assemblies spin around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub city_translation: Vec3,
    pub city_scale: f32,
    pub front_wheel_pivot: Vec3,
    pub back_wheel_pivot: Vec3,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            city_translation: Vec3::new(3.0, 0.05, 6.0),
            city_scale: 2.0,
            front_wheel_pivot: Vec3::new(68.085, 0.072701, -24.178),
            back_wheel_pivot: Vec3::new(68.085, 0.072704, -22.22),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClearColor(pub [f32; 4]);

impl Default for ClearColor {
    fn default() -> Self {
        Self([0.7, 0.7, 0.7, 1.0])
    }
}
