use std::str::FromStr;

use cityview_common::{FillMode, MoveDirection};

use crate::action::{Action, Adjust, CarDrive};

/// Keys the viewer reacts to.
///
/// Discriminants are the slot indices in [`crate::InputState`]: printable keys
/// use their ASCII code, named keys sit above the printable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Key {
    Digit1 = b'1' as u16,
    Digit2 = b'2' as u16,
    Digit3 = b'3' as u16,
    Digit4 = b'4' as u16,
    Digit5 = b'5' as u16,
    Digit6 = b'6' as u16,
    Digit7 = b'7' as u16,
    Digit8 = b'8' as u16,
    Digit9 = b'9' as u16,
    A = b'A' as u16,
    C = b'C' as u16,
    D = b'D' as u16,
    E = b'E' as u16,
    I = b'I' as u16,
    M = b'M' as u16,
    N = b'N' as u16,
    Q = b'Q' as u16,
    R = b'R' as u16,
    S = b'S' as u16,
    T = b'T' as u16,
    U = b'U' as u16,
    V = b'V' as u16,
    W = b'W' as u16,
    Y = b'Y' as u16,
    Escape = 256,
    F1 = 290,
}

impl Key {
    pub fn slot(self) -> usize {
        self as u16 as usize
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown key name: {0:?}")]
pub struct KeyParseError(pub String);

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim().to_ascii_uppercase().as_str() {
            "1" => Key::Digit1,
            "2" => Key::Digit2,
            "3" => Key::Digit3,
            "4" => Key::Digit4,
            "5" => Key::Digit5,
            "6" => Key::Digit6,
            "7" => Key::Digit7,
            "8" => Key::Digit8,
            "9" => Key::Digit9,
            "A" => Key::A,
            "C" => Key::C,
            "D" => Key::D,
            "E" => Key::E,
            "I" => Key::I,
            "M" => Key::M,
            "N" => Key::N,
            "Q" => Key::Q,
            "R" => Key::R,
            "S" => Key::S,
            "T" => Key::T,
            "U" => Key::U,
            "V" => Key::V,
            "W" => Key::W,
            "Y" => Key::Y,
            "ESC" | "ESCAPE" => Key::Escape,
            "F1" => Key::F1,
            _ => return Err(KeyParseError(s.to_string())),
        };
        Ok(key)
    }
}

/// Actions repeated every tick while their key is held, in evaluation order.
const HELD_BINDINGS: [(Key, Action); 24] = [
    (Key::N, Action::SetCollision(true)),
    (Key::M, Action::SetCollision(false)),
    (Key::W, Action::Move(MoveDirection::Forward)),
    (Key::S, Action::Move(MoveDirection::Backward)),
    (Key::A, Action::Move(MoveDirection::Left)),
    (Key::D, Action::Move(MoveDirection::Right)),
    (Key::T, Action::Move(MoveDirection::Up)),
    (Key::R, Action::Move(MoveDirection::Down)),
    (Key::Q, Action::RotateLight(Adjust::Decrease)),
    (Key::E, Action::RotateLight(Adjust::Increase)),
    (Key::Digit1, Action::SetPreview(true)),
    (Key::Digit2, Action::SetPreview(false)),
    (Key::Digit3, Action::SetFog(true)),
    (Key::Digit4, Action::SetFog(false)),
    (Key::Digit5, Action::FogDensity(Adjust::Increase)),
    (Key::Digit6, Action::FogDensity(Adjust::Decrease)),
    (Key::C, Action::SetSpotlight(true)),
    (Key::V, Action::SetSpotlight(false)),
    (Key::Digit7, Action::SetFillMode(FillMode::Wireframe)),
    (Key::Digit8, Action::SetFillMode(FillMode::Points)),
    (Key::Digit9, Action::SetFillMode(FillMode::Fill)),
    (Key::Y, Action::DriveCar(CarDrive::Forward)),
    (Key::U, Action::StopCar),
    (Key::I, Action::DriveCar(CarDrive::Reverse)),
];

pub fn held_bindings() -> &'static [(Key, Action)] {
    &HELD_BINDINGS
}

/// Action fired once on the press edge of a key, if any.
pub fn edge_action(key: Key) -> Option<Action> {
    match key {
        Key::Escape => Some(Action::Exit),
        Key::F1 => Some(Action::ToggleHud),
        _ => None,
    }
}
