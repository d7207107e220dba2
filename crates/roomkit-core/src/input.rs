//! Pointer events delivered by the input collaborator.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The pointer left the interactive surface.
    Leave,
    /// Explicit cancel (e.g. the Escape key).
    Cancel,
}

/// A pointer event in device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub device_position: Point,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, device_position: Point) -> Self {
        Self {
            phase,
            device_position,
        }
    }

    pub fn down(device_position: Point) -> Self {
        Self::new(PointerPhase::Down, device_position)
    }

    pub fn moved(device_position: Point) -> Self {
        Self::new(PointerPhase::Move, device_position)
    }

    pub fn up(device_position: Point) -> Self {
        Self::new(PointerPhase::Up, device_position)
    }

    pub fn leave(device_position: Point) -> Self {
        Self::new(PointerPhase::Leave, device_position)
    }

    pub fn cancel() -> Self {
        Self::new(PointerPhase::Cancel, Point::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names() {
        let event: PointerEvent =
            serde_json::from_str(r#"{ "phase": "leave", "device_position": { "x": 0.0, "y": 0.0 } }"#).unwrap();
        assert_eq!(event.phase, PointerPhase::Leave);
        assert_eq!(serde_json::to_string(&PointerPhase::Cancel).unwrap(), r#""cancel""#);
    }

    #[test]
    fn test_event_from_json() {
        let event: PointerEvent =
            serde_json::from_str(r#"{ "phase": "down", "device_position": { "x": 10.0, "y": 20.0 } }"#).unwrap();
        assert_eq!(event, PointerEvent::down(Point::new(10.0, 20.0)));
    }
}
