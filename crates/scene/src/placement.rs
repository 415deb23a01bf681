use cityview_common::SceneObject;
use glam::{Mat4, Vec3};

use crate::animation::AnimationState;
use crate::config::{LightConfig, PlacementConfig};
use crate::lighting::LightState;

/// Per-object model-matrix rules of the city scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Placements {
    city: Mat4,
    front_wheel_pivot: Vec3,
    back_wheel_pivot: Vec3,
    light_cube_offset_scale: f32,
    light_cube_scale: f32,
}

impl Placements {
    pub fn new(placement: &PlacementConfig, light: &LightConfig) -> Self {
        Self {
            city: Mat4::from_translation(placement.city_translation)
                * Mat4::from_scale(Vec3::splat(placement.city_scale)),
            front_wheel_pivot: placement.front_wheel_pivot,
            back_wheel_pivot: placement.back_wheel_pivot,
            light_cube_offset_scale: light.cube_offset_scale,
            light_cube_scale: light.cube_scale,
        }
    }

    pub fn model_matrix(
        &self,
        object: SceneObject,
        animation: &AnimationState,
        light: &LightState,
    ) -> Mat4 {
        match object {
            SceneObject::City => self.city,
            SceneObject::CarBody if animation.car_active => {
                Mat4::from_translation(Vec3::new(0.0, 0.0, -animation.car_distance))
            }
            SceneObject::FrontWheels if animation.car_active => {
                wheel_matrix(self.front_wheel_pivot, animation)
            }
            SceneObject::BackWheels if animation.car_active => {
                wheel_matrix(self.back_wheel_pivot, animation)
            }
            SceneObject::CarBody | SceneObject::FrontWheels | SceneObject::BackWheels => {
                Mat4::IDENTITY
            }
            SceneObject::LightCube => {
                light.rotation()
                    * Mat4::from_translation(light.direction * self.light_cube_offset_scale)
                    * Mat4::from_scale(Vec3::splat(self.light_cube_scale))
            }
            SceneObject::Skybox => Mat4::IDENTITY,
        }
    }
}

/// Spin a wheel assembly around its own pivot, then carry it with the car body.
fn wheel_matrix(pivot: Vec3, animation: &AnimationState) -> Mat4 {
    Mat4::from_translation(pivot + Vec3::new(0.0, 0.0, -animation.car_distance))
        * Mat4::from_rotation_x(animation.wheel_angle.to_radians())
        * Mat4::from_translation(-pivot)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn placements() -> Placements {
        Placements::new(&PlacementConfig::default(), &LightConfig::default())
    }

    fn light() -> LightState {
        LightState::new(&LightConfig::default())
    }

    #[test]
    fn city_is_scaled_then_offset() {
        let m = placements().model_matrix(SceneObject::City, &AnimationState::default(), &light());
        assert!(m.transform_point3(Vec3::ZERO).abs_diff_eq(Vec3::new(3.0, 0.05, 6.0), EPS));
        assert!(m.transform_point3(Vec3::X).abs_diff_eq(Vec3::new(5.0, 0.05, 6.0), EPS));
    }

    #[test]
    fn car_parts_are_identity_until_animated() {
        let p = placements();
        let mut anim = AnimationState {
            car_distance: 4.0,
            wheel_angle: -30.0,
            ..AnimationState::default()
        };
        for object in [SceneObject::CarBody, SceneObject::FrontWheels, SceneObject::BackWheels] {
            assert_eq!(p.model_matrix(object, &anim, &light()), Mat4::IDENTITY);
        }
        anim.car_active = true;
        for object in [SceneObject::CarBody, SceneObject::FrontWheels, SceneObject::BackWheels] {
            assert_ne!(p.model_matrix(object, &anim, &light()), Mat4::IDENTITY);
        }
    }

    #[test]
    fn car_body_translates_along_negative_z() {
        let anim = AnimationState {
            car_active: true,
            car_distance: 2.5,
            ..AnimationState::default()
        };
        let m = placements().model_matrix(SceneObject::CarBody, &anim, &light());
        let moved = m.transform_point3(Vec3::new(1.0, 2.0, 3.0));
        assert!(moved.abs_diff_eq(Vec3::new(1.0, 2.0, 0.5), EPS));
    }

    #[test]
    fn wheel_pivot_follows_the_car() {
        let config = PlacementConfig::default();
        let anim = AnimationState {
            car_active: true,
            car_distance: 2.0,
            wheel_angle: -45.0,
            ..AnimationState::default()
        };
        let m = placements().model_matrix(SceneObject::FrontWheels, &anim, &light());
        let pivot = config.front_wheel_pivot;
        // the pivot itself only translates with the body
        assert!(
            m.transform_point3(pivot)
                .abs_diff_eq(pivot + Vec3::new(0.0, 0.0, -2.0), 1e-3)
        );
        // points on the rim keep their distance to the pivot
        let rim = pivot + Vec3::new(0.0, 0.3, 0.0);
        let moved = m.transform_point3(rim);
        let moved_pivot = pivot + Vec3::new(0.0, 0.0, -2.0);
        assert!((moved.distance(moved_pivot) - 0.3).abs() < 1e-3);
        assert!(!moved.abs_diff_eq(rim + Vec3::new(0.0, 0.0, -2.0), 1e-3));
    }

    #[test]
    fn wheels_use_their_own_pivots() {
        let anim = AnimationState {
            car_active: true,
            wheel_angle: 90.0,
            ..AnimationState::default()
        };
        let p = placements();
        let front = p.model_matrix(SceneObject::FrontWheels, &anim, &light());
        let back = p.model_matrix(SceneObject::BackWheels, &anim, &light());
        assert_ne!(front, back);
    }

    #[test]
    fn light_cube_follows_light_orbit() {
        let p = placements();
        let mut light = light();
        let anim = AnimationState::default();
        let at_zero = p
            .model_matrix(SceneObject::LightCube, &anim, &light)
            .transform_point3(Vec3::ZERO);
        assert!(at_zero.abs_diff_eq(light.direction * 1.2, 1e-3));

        light.rotate_by(45.0);
        let turned = p
            .model_matrix(SceneObject::LightCube, &anim, &light)
            .transform_point3(Vec3::ZERO);
        assert!(turned.abs_diff_eq(light.world_direction() * 1.2, 1e-3));
    }
}
