use cityview_common::MoveDirection;
use glam::{Mat4, Vec3};

/// Squared length below which a cross product counts as zero.
const DEGENERATE_EPSILON: f32 = 1e-10;

/// Default point the preview orbit starts from before rotation.
pub const DEFAULT_PREVIEW_ORBIT: Vec3 = Vec3::new(30.0, 30.0, 140.0);

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CameraError {
    #[error("degenerate camera basis: front {front} and up {up} do not span a plane")]
    DegenerateBasis { front: Vec3, up: Vec3 },
}

/// Free-flight camera defined by a position and a look-at target.
///
/// `up` is a fixed world reference. `front` and `right` are derived and kept
/// unit length, with `right = normalize(cross(front, up))`. Vertical look
/// (pitch) only moves `target`; `front`, which drives translation, follows yaw
/// alone, so looking up or down never changes the flight heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    front: Vec3,
    right: Vec3,
    preview_orbit: Vec3,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, up: Vec3) -> Result<Self, CameraError> {
        let up_unit = up.try_normalize().ok_or(CameraError::DegenerateBasis {
            front: target - position,
            up,
        })?;
        let front = (target - position)
            .try_normalize()
            .ok_or(CameraError::DegenerateBasis {
                front: Vec3::ZERO,
                up: up_unit,
            })?;
        let right = right_of(front, up_unit)?;
        Ok(Self {
            position,
            target,
            up: up_unit,
            front,
            right,
            preview_orbit: DEFAULT_PREVIEW_ORBIT,
        })
    }

    /// Override the point that [`Camera::scene_preview`] orbits from.
    pub fn with_preview_orbit(mut self, orbit: Vec3) -> Self {
        self.preview_orbit = orbit;
        self
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Unit vector that `direction` translates along.
    pub fn basis(&self, direction: MoveDirection) -> Vec3 {
        match direction {
            MoveDirection::Forward => self.front,
            MoveDirection::Backward => -self.front,
            MoveDirection::Left => -self.right,
            MoveDirection::Right => self.right,
            MoveDirection::Up => self.up,
            MoveDirection::Down => -self.up,
        }
    }

    /// Translate position and target together. A negative `speed` moves the
    /// opposite way. The basis is left untouched.
    pub fn move_by(&mut self, direction: MoveDirection, speed: f32) {
        let translation = self.basis(direction) * speed;
        self.position += translation;
        self.target += translation;
    }

    /// Yaw around `up` and pitch around `right`, pivoting `target` about the
    /// current position. Only the yaw is applied to `front`.
    ///
    /// `right` never tilts with pitch, so pitch accumulates without a clamp.
    /// Past 90 degrees the target swings over the zenith to behind the camera
    /// and the view, still using `up` as its roll reference, turns upside down.
    pub fn rotate(&mut self, pitch_degrees: f32, yaw_degrees: f32) {
        let yaw = Mat4::from_axis_angle(self.up, yaw_degrees.to_radians());
        let pitch = Mat4::from_axis_angle(self.right, pitch_degrees.to_radians());
        let pivoted = Mat4::from_translation(self.position)
            * yaw
            * pitch
            * Mat4::from_translation(-self.position);
        self.target = pivoted.transform_point3(self.target);

        self.front = yaw.transform_vector3(self.front).normalize();
        // yaw about `up` cannot bring `front` onto `up`
        self.right = self.front.cross(self.up).normalize();
    }

    /// Place the camera on the preview orbit at `angle_degrees` around world Y
    /// and re-aim the basis at the unchanged target.
    ///
    /// Leaves the camera untouched if the orbit point would give a degenerate basis.
    pub fn scene_preview(&mut self, angle_degrees: f32) -> Result<(), CameraError> {
        let position =
            Mat4::from_rotation_y(angle_degrees.to_radians()).transform_point3(self.preview_orbit);
        let front = (self.target - position)
            .try_normalize()
            .ok_or(CameraError::DegenerateBasis {
                front: Vec3::ZERO,
                up: Vec3::Y,
            })?;
        let right = right_of(front, Vec3::Y)?;

        self.position = position;
        self.front = front;
        self.right = right;
        Ok(())
    }
}

fn right_of(front: Vec3, up: Vec3) -> Result<Vec3, CameraError> {
    let cross = front.cross(up);
    if cross.length_squared() < DEGENERATE_EPSILON {
        return Err(CameraError::DegenerateBasis { front, up });
    }
    Ok(cross.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn origin_camera() -> Camera {
        Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y).unwrap()
    }

    fn assert_basis(cam: &Camera) {
        assert!((cam.front().length() - 1.0).abs() < EPS, "front {}", cam.front());
        assert!((cam.right().length() - 1.0).abs() < EPS, "right {}", cam.right());
        assert!(cam.front().dot(cam.right()).abs() < EPS);
        assert!(cam.right().dot(cam.up()).abs() < EPS);
    }

    #[test]
    fn construction_derives_basis() {
        let cam = origin_camera();
        assert!(cam.front().abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(cam.right().abs_diff_eq(Vec3::X, EPS));
        assert_basis(&cam);
    }

    #[test]
    fn construction_normalizes_up() {
        let cam = Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(0.0, 3.0, 0.0)).unwrap();
        assert!(cam.up().abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn tilted_initial_target_keeps_right_orthogonal() {
        let cam = Camera::new(
            Vec3::new(33.0, 20.5, 15.0),
            Vec3::new(33.0, 20.6, -15.0),
            Vec3::Y,
        )
        .unwrap();
        assert_basis(&cam);
    }

    #[test]
    fn degenerate_construction_fails() {
        let looking_up = Camera::new(Vec3::ZERO, Vec3::new(0.0, 10.0, 0.0), Vec3::Y);
        assert!(matches!(looking_up, Err(CameraError::DegenerateBasis { .. })));

        let no_direction = Camera::new(Vec3::ONE, Vec3::ONE, Vec3::Y);
        assert!(no_direction.is_err());

        let zero_up = Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::ZERO);
        assert!(zero_up.is_err());
    }

    #[test]
    fn move_right_end_to_end() {
        let mut cam = origin_camera();
        cam.move_by(MoveDirection::Right, 1.0);
        assert!(cam.position().abs_diff_eq(Vec3::new(1.0, 0.0, 5.0), EPS));
        assert!(cam.target().abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), EPS));
        assert!(cam.front().abs_diff_eq(Vec3::NEG_Z, EPS));
    }

    #[test]
    fn forward_then_backward_round_trips() {
        let mut cam = Camera::new(
            Vec3::new(33.0, 20.5, 15.0),
            Vec3::new(33.0, 20.6, -15.0),
            Vec3::Y,
        )
        .unwrap();
        cam.rotate(3.0, 27.0);
        let (pos, target, front, right) = (cam.position(), cam.target(), cam.front(), cam.right());

        cam.move_by(MoveDirection::Forward, 0.3);
        assert!(!cam.position().abs_diff_eq(pos, EPS));
        cam.move_by(MoveDirection::Backward, 0.3);

        assert!(cam.position().abs_diff_eq(pos, EPS));
        assert!(cam.target().abs_diff_eq(target, EPS));
        assert_eq!(cam.front(), front);
        assert_eq!(cam.right(), right);
    }

    #[test]
    fn negative_speed_reverses_direction() {
        let mut cam = origin_camera();
        cam.move_by(MoveDirection::Forward, -1.0);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 0.0, 6.0), EPS));
    }

    #[test]
    fn up_and_down_follow_world_up() {
        let mut cam = origin_camera();
        cam.move_by(MoveDirection::Up, 2.0);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 2.0, 5.0), EPS));
        cam.move_by(MoveDirection::Down, 2.0);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), EPS));
    }

    #[test]
    fn yaw_turns_front_and_target() {
        let mut cam = Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y).unwrap();
        cam.rotate(0.0, 90.0);
        assert!(cam.front().abs_diff_eq(Vec3::NEG_X, EPS));
        assert!(cam.target().abs_diff_eq(Vec3::NEG_X, EPS));
        assert!(cam.right().abs_diff_eq(Vec3::NEG_Z, EPS));
    }

    #[test]
    fn pitch_moves_target_but_not_front() {
        let mut cam = Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y).unwrap();
        cam.rotate(10.0, 0.0);
        assert!(cam.target().y > 0.0);
        assert!(cam.front().abs_diff_eq(Vec3::NEG_Z, EPS));
        assert_basis(&cam);
    }

    #[test]
    fn pitch_past_zenith_flips_the_view_behind() {
        let mut cam = origin_camera();
        cam.rotate(100.0, 0.0);
        let (sin, cos) = 100.0_f32.to_radians().sin_cos();
        let expected = Vec3::new(0.0, 5.0 * sin, 5.0 - 5.0 * cos);
        assert!(cam.target().abs_diff_eq(expected, 1e-3), "{}", cam.target());
        assert!(cam.target().z > cam.position().z);
        assert!(cam.front().abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(cam.right().abs_diff_eq(Vec3::X, EPS));

        let view = cam.view_matrix();
        assert!(view.is_finite());
        // the view now looks along +Z, opposite to `front`
        let look = (cam.target() - cam.position()).normalize();
        assert!(look.dot(cam.front()) < 0.0);
        let eye_right = view.row(0).truncate();
        assert!(eye_right.abs_diff_eq(Vec3::NEG_X, 1e-3), "{eye_right}");
    }

    #[test]
    fn rotation_pivots_around_position() {
        let mut cam = Camera::new(Vec3::new(5.0, 1.0, 5.0), Vec3::new(5.0, 1.0, 0.0), Vec3::Y)
            .unwrap();
        cam.rotate(15.0, -40.0);
        let distance = cam.target().distance(cam.position());
        assert!((distance - 5.0).abs() < EPS);
        assert_eq!(cam.position(), Vec3::new(5.0, 1.0, 5.0));
    }

    #[test]
    fn basis_stays_orthonormal_over_mixed_updates() {
        let mut cam = Camera::new(
            Vec3::new(33.0, 20.5, 15.0),
            Vec3::new(33.0, 20.6, -15.0),
            Vec3::Y,
        )
        .unwrap();
        let steps = [
            (1.5, -3.0),
            (-0.7, 12.0),
            (4.0, 0.1),
            (-2.2, -45.0),
            (0.0, 180.0),
        ];
        for (i, (pitch, yaw)) in steps.iter().cycle().take(500).enumerate() {
            cam.rotate(*pitch, *yaw);
            assert_basis(&cam);
            let direction = match i % 6 {
                0 => MoveDirection::Forward,
                1 => MoveDirection::Left,
                2 => MoveDirection::Backward,
                3 => MoveDirection::Right,
                4 => MoveDirection::Up,
                _ => MoveDirection::Down,
            };
            cam.move_by(direction, 0.3);
            assert_basis(&cam);
        }
        for angle in [0.0, 0.2, 90.0, 181.4, 719.8] {
            cam.scene_preview(angle).unwrap();
            assert_basis(&cam);
        }
    }

    #[test]
    fn view_matrix_is_deterministic() {
        let run = || {
            let mut cam = Camera::new(
                Vec3::new(33.0, 20.5, 15.0),
                Vec3::new(33.0, 20.6, -15.0),
                Vec3::Y,
            )
            .unwrap();
            cam.move_by(MoveDirection::Forward, 0.3);
            cam.rotate(2.5, -7.0);
            cam.move_by(MoveDirection::Left, 0.3);
            cam.rotate(-1.0, 30.0);
            cam.view_matrix()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn view_matrix_maps_target_onto_negative_z() {
        let cam = origin_camera();
        let target_in_view = cam.view_matrix().transform_point3(cam.target());
        assert!(target_in_view.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), EPS));
    }

    #[test]
    fn scene_preview_orbits_world_y() {
        let mut cam = origin_camera();
        cam.scene_preview(0.0).unwrap();
        assert!(cam.position().abs_diff_eq(DEFAULT_PREVIEW_ORBIT, EPS));

        cam.scene_preview(90.0).unwrap();
        // +90 degrees around Y sends +Z to +X
        assert!(cam.position().abs_diff_eq(Vec3::new(140.0, 30.0, -30.0), 1e-3));
        let expected_front = (cam.target() - cam.position()).normalize();
        assert!(cam.front().abs_diff_eq(expected_front, EPS));
    }

    #[test]
    fn scene_preview_is_idempotent() {
        let mut a = origin_camera();
        a.scene_preview(37.4).unwrap();
        let snapshot = a.clone();
        a.scene_preview(37.4).unwrap();
        assert_eq!(a, snapshot);
    }

    #[test]
    fn scene_preview_rejects_degenerate_orbit() {
        let mut cam = origin_camera().with_preview_orbit(Vec3::new(0.0, 30.0, 0.0));
        let before = cam.clone();
        assert!(cam.scene_preview(10.0).is_err());
        assert_eq!(cam, before);
    }
}
