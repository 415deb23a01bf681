use cityview_common::MoveDirection;
use glam::Vec3;

use crate::camera::Camera;
use crate::config::CollisionConfig;

/// Soft boundary around the playable part of the city.
///
/// A move that would leave the box is replaced by a move at
/// `push_back_speed` (negative), nudging the camera back inside instead of
/// stopping it dead.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionPolicy {
    pub enabled: bool,
    min: Vec3,
    max: Vec3,
    push_back_speed: f32,
}

impl CollisionPolicy {
    pub fn new(config: &CollisionConfig) -> Self {
        Self {
            enabled: config.enabled,
            min: Vec3::new(config.min_x, config.min_y, config.min_z),
            max: Vec3::new(config.max_x, f32::INFINITY, config.max_z),
            push_back_speed: config.push_back_speed,
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Speed to actually use for moving `camera` in `direction`.
    ///
    /// Upward moves are never checked: the box has no ceiling.
    pub fn resolve_speed(&self, camera: &Camera, direction: MoveDirection, speed: f32) -> f32 {
        if !self.enabled || direction == MoveDirection::Up {
            return speed;
        }
        let destination = camera.position() + camera.basis(direction) * speed;
        if self.contains(destination) {
            speed
        } else {
            tracing::debug!(?direction, %destination, "camera move blocked, pushing back");
            self.push_back_speed
        }
    }
}
