use cityview_common::{FillMode, MoveDirection, SceneObject};
use cityview_input::{Action, InputState};
use glam::{Mat4, Vec2};

use crate::animation::AnimationState;
use crate::camera::{Camera, CameraError};
use crate::collision::CollisionPolicy;
use crate::config::SceneConfig;
use crate::lighting::{FogState, LightState, SpotlightState};
use crate::placement::Placements;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("invalid initial camera: {0}")]
    Camera(#[from] CameraError),
}

/// The application context: every piece of mutable viewer state.
///
/// Owned by the frame loop. The camera is only changed through
/// [`Scene::look`], [`Scene::move_camera`] and the preview step, so the
/// collision policy and preview override cannot be bypassed.
pub struct Scene {
    config: SceneConfig,
    camera: Camera,
    placements: Placements,
    pub animation: AnimationState,
    pub light: LightState,
    pub fog: FogState,
    pub spotlight: SpotlightState,
    pub collision: CollisionPolicy,
    pub fill_mode: FillMode,
    frame: u64,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        let camera = Camera::new(
            config.camera.position,
            config.camera.target,
            config.camera.up,
        )?
        .with_preview_orbit(config.preview.orbit_start);

        Ok(Self {
            camera,
            placements: Placements::new(&config.placement, &config.light),
            animation: AnimationState::default(),
            light: LightState::new(&config.light),
            fog: FogState::new(&config.fog),
            spotlight: SpotlightState::new(&config.spotlight),
            collision: CollisionPolicy::new(&config.collision),
            fill_mode: FillMode::default(),
            frame: 0,
            config,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Number of completed [`Scene::step`] calls.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Rotate the camera from a pointer delta in pixels. Moving the pointer
    /// right turns the view right; moving it down pitches down.
    pub fn look(&mut self, pointer_delta: Vec2) {
        if pointer_delta == Vec2::ZERO {
            return;
        }
        let sensitivity = self.config.camera.look_sensitivity;
        self.camera
            .rotate(-pointer_delta.y * sensitivity, -pointer_delta.x * sensitivity);
    }

    /// Move the camera one tick, subject to the collision policy.
    pub fn move_camera(&mut self, direction: MoveDirection) {
        let speed = self
            .collision
            .resolve_speed(&self.camera, direction, self.config.camera.speed);
        self.camera.move_by(direction, speed);
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Move(direction) => self.move_camera(direction),
            Action::SetCollision(enabled) => self.collision.enabled = enabled,
            Action::SetPreview(active) => self.animation.preview_active = active,
            Action::SetFog(enabled) => self.fog.enabled = enabled,
            Action::FogDensity(adjust) => self.fog.adjust(adjust.sign() * self.config.fog.step),
            Action::SetSpotlight(enabled) => self.spotlight.enabled = enabled,
            Action::SetFillMode(mode) => self.fill_mode = mode,
            Action::RotateLight(adjust) => {
                self.light.rotate_by(adjust.sign() * self.config.light.rotate_step);
            }
            Action::DriveCar(drive) => self.animation.drive(drive, &self.config.car),
            Action::StopCar => self.animation.stop_car(),
            Action::ToggleHud | Action::Exit => {
                tracing::debug!(?action, "window action ignored by scene");
            }
        }
    }

    /// Run one frame of state updates from the input snapshot: pointer look,
    /// held-key actions, then the scripted preview.
    pub fn step(&mut self, input: &mut InputState) {
        self.look(input.take_pointer_delta());
        for action in input.held_actions() {
            self.apply(action);
        }
        if let Some(angle) = self.animation.advance_preview(self.config.preview.angle_step) {
            if let Err(e) = self.camera.scene_preview(angle) {
                tracing::warn!("preview step skipped: {e}");
            }
        }
        self.frame += 1;
    }

    pub fn model_matrix(&self, object: SceneObject) -> Mat4 {
        self.placements
            .model_matrix(object, &self.animation, &self.light)
    }

    pub fn light_space_matrix(&self) -> Mat4 {
        self.light.light_space_matrix(&self.config.shadow)
    }
}
