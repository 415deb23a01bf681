use cityview_common::{FillMode, MoveDirection};

/// Direction of a stepwise adjustment (fog density, light orbit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjust {
    Increase,
    Decrease,
}

impl Adjust {
    pub fn sign(self) -> f32 {
        match self {
            Adjust::Increase => 1.0,
            Adjust::Decrease => -1.0,
        }
    }
}

/// Car animation drive direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarDrive {
    Forward,
    Reverse,
}

/// A high-level action produced from raw input.
///
/// The scene consumes actions, never key codes, so the desktop frame loop and
/// the headless CLI drive the exact same state transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Translate the camera one tick in the given direction.
    Move(MoveDirection),
    /// Enable or disable the collision push-back policy.
    SetCollision(bool),
    /// Start or stop the scripted orbit fly-through.
    SetPreview(bool),
    SetFog(bool),
    FogDensity(Adjust),
    SetSpotlight(bool),
    SetFillMode(FillMode),
    /// Orbit the directional light around world-up by one step.
    RotateLight(Adjust),
    /// Advance the car animation one tick.
    DriveCar(CarDrive),
    StopCar,
    /// Show or hide the HUD overlay.
    ToggleHud,
    /// Close the window.
    Exit,
}
