use cityview_input::CarDrive;

use crate::config::CarConfig;

/// One full wheel turn, in degrees.
const FULL_TURN: f32 = 360.0;

/// Scripted preview orbit and car animation state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationState {
    /// Monotonic orbit angle of the preview fly-through, in degrees.
    pub preview_angle: f32,
    pub preview_active: bool,
    pub car_active: bool,
    /// Wheel rotation around world X, in degrees, within [-360, 360].
    pub wheel_angle: f32,
    /// Distance the car has travelled along -Z.
    pub car_distance: f32,
}

impl AnimationState {
    /// Advance the preview orbit by `step` degrees while the preview runs.
    /// Returns the new angle, or `None` when the preview is stopped.
    pub fn advance_preview(&mut self, step: f32) -> Option<f32> {
        if !self.preview_active {
            return None;
        }
        self.preview_angle += step;
        Some(self.preview_angle)
    }

    /// Advance the car animation one tick.
    ///
    /// A wheel that has reached a full turn resets to zero on the following
    /// tick instead of rotating past it.
    pub fn drive(&mut self, drive: CarDrive, car: &CarConfig) {
        self.car_active = true;
        match drive {
            CarDrive::Forward => {
                self.car_distance += car.forward_step;
                if self.wheel_angle <= -FULL_TURN {
                    self.wheel_angle = 0.0;
                } else {
                    self.wheel_angle -= car.wheel_step;
                }
            }
            CarDrive::Reverse => {
                self.car_distance -= car.reverse_step;
                if self.wheel_angle >= FULL_TURN {
                    self.wheel_angle = 0.0;
                } else {
                    self.wheel_angle += car.wheel_step;
                }
            }
        }
    }

    /// Freeze the car. Distance and wheel angle are kept for the next drive.
    pub fn stop_car(&mut self) {
        self.car_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_only_advances_while_active() {
        let mut anim = AnimationState::default();
        assert_eq!(anim.advance_preview(0.2), None);
        assert_eq!(anim.preview_angle, 0.0);

        anim.preview_active = true;
        anim.advance_preview(0.2);
        let angle = anim.advance_preview(0.2).unwrap();
        assert!((angle - 0.4).abs() < 1e-6);
    }

    #[test]
    fn forward_drive_decrements_wheel_and_adds_distance() {
        let car = CarConfig::default();
        let mut anim = AnimationState::default();
        anim.drive(CarDrive::Forward, &car);
        assert!(anim.car_active);
        assert_eq!(anim.wheel_angle, -1.0);
        assert!((anim.car_distance - 0.01).abs() < 1e-6);
    }

    #[test]
    fn reverse_drive_is_opposite_in_sign() {
        let car = CarConfig::default();
        let mut anim = AnimationState::default();
        anim.drive(CarDrive::Reverse, &car);
        assert_eq!(anim.wheel_angle, 1.0);
        assert!((anim.car_distance + 0.1).abs() < 1e-6);
    }

    #[test]
    fn forward_wheel_wraps_after_full_turn() {
        let car = CarConfig::default();
        let mut anim = AnimationState::default();
        for _ in 0..360 {
            anim.drive(CarDrive::Forward, &car);
        }
        assert_eq!(anim.wheel_angle, -360.0);
        anim.drive(CarDrive::Forward, &car);
        assert_eq!(anim.wheel_angle, 0.0);
        anim.drive(CarDrive::Forward, &car);
        assert_eq!(anim.wheel_angle, -1.0);
    }

    #[test]
    fn reverse_wheel_wraps_after_full_turn() {
        let car = CarConfig::default();
        let mut anim = AnimationState::default();
        for _ in 0..360 {
            anim.drive(CarDrive::Reverse, &car);
        }
        assert_eq!(anim.wheel_angle, 360.0);
        anim.drive(CarDrive::Reverse, &car);
        assert_eq!(anim.wheel_angle, 0.0);
    }

    #[test]
    fn stop_keeps_progress() {
        let car = CarConfig::default();
        let mut anim = AnimationState::default();
        for _ in 0..5 {
            anim.drive(CarDrive::Forward, &car);
        }
        anim.stop_car();
        assert!(!anim.car_active);
        assert_eq!(anim.wheel_angle, -5.0);
        assert!(anim.car_distance > 0.0);
    }
}
