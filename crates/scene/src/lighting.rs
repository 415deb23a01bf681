use glam::{Mat4, Vec3};

use crate::config::{FogConfig, LightConfig, ShadowConfig, SpotlightConfig};

/// Directional light orbiting world-up.
#[derive(Debug, Clone, PartialEq)]
pub struct LightState {
    /// Direction towards the light at orbit angle zero.
    pub direction: Vec3,
    pub color: Vec3,
    /// Orbit angle around world-up, in degrees.
    pub angle: f32,
}

impl LightState {
    pub fn new(config: &LightConfig) -> Self {
        Self {
            direction: config.direction,
            color: config.color,
            angle: config.angle,
        }
    }

    pub fn rotate_by(&mut self, degrees: f32) {
        self.angle += degrees;
    }

    pub fn rotation(&self) -> Mat4 {
        Mat4::from_rotation_y(self.angle.to_radians())
    }

    /// Direction towards the light in world space for the current angle.
    pub fn world_direction(&self) -> Vec3 {
        self.rotation().transform_vector3(self.direction)
    }

    /// World to light clip space: an orthographic projection of the fixed
    /// shadow frustum, viewed from the orbited light position towards the origin.
    pub fn light_space_matrix(&self, shadow: &ShadowConfig) -> Mat4 {
        let view = Mat4::look_at_rh(self.world_direction(), Vec3::ZERO, Vec3::Y);
        let e = shadow.half_extent;
        let projection = Mat4::orthographic_rh(-e, e, -e, e, shadow.near, shadow.far);
        projection * view
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FogState {
    density: f32,
    pub enabled: bool,
    pub color: Vec3,
}

impl FogState {
    pub fn new(config: &FogConfig) -> Self {
        Self {
            density: config.density.clamp(0.0, 1.0),
            enabled: config.enabled,
            color: config.color,
        }
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    /// Change the density by `delta`, saturating at 0 and 1.
    pub fn adjust(&mut self, delta: f32) {
        self.density = (self.density + delta).clamp(0.0, 1.0);
    }
}

/// Fixed spotlight with a smooth edge between two cone angles.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotlightState {
    pub position: Vec3,
    pub direction: Vec3,
    /// Cosine of the angle inside which the spotlight is at full strength.
    pub inner_cutoff: f32,
    /// Cosine of the angle outside which the spotlight contributes nothing.
    pub outer_cutoff: f32,
    pub color: Vec3,
    pub enabled: bool,
}

impl SpotlightState {
    pub fn new(config: &SpotlightConfig) -> Self {
        Self {
            position: config.position,
            direction: (config.aim - config.position)
                .try_normalize()
                .unwrap_or(Vec3::NEG_Y),
            inner_cutoff: config.inner_cutoff_degrees.to_radians().cos(),
            outer_cutoff: config.outer_cutoff_degrees.to_radians().cos(),
            color: config.color,
            enabled: config.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3Swizzles, Vec4Swizzles};

    const EPS: f32 = 1e-4;

    #[test]
    fn zero_angle_keeps_base_direction() {
        let light = LightState::new(&LightConfig::default());
        assert!(light.world_direction().abs_diff_eq(Vec3::new(-49.0, 62.5, -43.5), EPS));
    }

    #[test]
    fn rotation_orbits_around_world_up() {
        let mut light = LightState::new(&LightConfig::default());
        let base = light.world_direction();
        light.rotate_by(90.0);
        let turned = light.world_direction();
        assert!((turned.y - base.y).abs() < EPS);
        assert!((turned.length() - base.length()).abs() < 1e-3);
        assert!(turned.xz().dot(base.xz()).abs() < 1e-2);
    }

    #[test]
    fn light_space_maps_origin_into_depth_range() {
        let light = LightState::new(&LightConfig::default());
        let shadow = ShadowConfig::default();
        let clip = light.light_space_matrix(&shadow) * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let distance = light.world_direction().length();
        // orthographic: w stays 1, origin sits on the light's axis
        assert!((clip.w - 1.0).abs() < EPS);
        assert!(clip.xy().abs_diff_eq(glam::Vec2::ZERO, EPS));
        let expected_depth = (distance - shadow.near) / (shadow.far - shadow.near);
        assert!((clip.z - expected_depth).abs() < 1e-3);
    }

    #[test]
    fn points_beyond_the_shadow_box_fall_outside_the_map() {
        let light = LightState::new(&LightConfig::default());
        let shadow = ShadowConfig::default();
        let matrix = light.light_space_matrix(&shadow);
        let forward = (-light.world_direction()).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward);

        let inside = matrix * (right * 90.0).extend(1.0);
        assert!(inside.x.abs() <= 1.0);

        for (point, axis) in [(right * 110.0, 0), (-right * 110.0, 0), (up * 110.0, 1)] {
            let clip = matrix * point.extend(1.0);
            let uv = [clip.x * 0.5 + 0.5, 0.5 - clip.y * 0.5];
            assert!(clip[axis].abs() > 1.0, "{point:?} -> {clip:?}");
            assert!(!(0.0..=1.0).contains(&uv[axis]), "{point:?} -> {uv:?}");
        }
    }

    #[test]
    fn light_space_depends_only_on_angle() {
        let shadow = ShadowConfig::default();
        let mut a = LightState::new(&LightConfig::default());
        let mut b = LightState::new(&LightConfig::default());
        a.rotate_by(10.0);
        a.rotate_by(5.0);
        b.rotate_by(15.0);
        assert!(
            a.light_space_matrix(&shadow)
                .abs_diff_eq(b.light_space_matrix(&shadow), EPS)
        );
    }

    #[test]
    fn fog_density_saturates_high() {
        let mut fog = FogState::new(&FogConfig {
            density: 0.999,
            ..FogConfig::default()
        });
        for _ in 0..10 {
            fog.adjust(0.001);
            assert!(fog.density() <= 1.0);
        }
        assert_eq!(fog.density(), 1.0);
    }

    #[test]
    fn fog_density_saturates_low() {
        let mut fog = FogState::new(&FogConfig {
            density: 0.002,
            ..FogConfig::default()
        });
        for _ in 0..10 {
            fog.adjust(-0.001);
            assert!(fog.density() >= 0.0);
        }
        assert_eq!(fog.density(), 0.0);
    }

    #[test]
    fn spotlight_points_from_position_to_aim() {
        let spot = SpotlightState::new(&SpotlightConfig::default());
        assert!(spot.direction.abs_diff_eq(Vec3::NEG_Y, EPS));
        assert!((spot.inner_cutoff - 45.5_f32.to_radians().cos()).abs() < EPS);
        assert!(spot.outer_cutoff.abs() < EPS);
        assert!(!spot.enabled);
    }
}
