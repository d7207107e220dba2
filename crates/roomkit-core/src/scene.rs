//! Positioned scene handed to the rendering collaborator.
//!
//! The renderer owns camera, lights and the draw loop; all it gets from the
//! core is an ordered list of what to draw and where.

use crate::model::{AssetKind, ItemId};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Rotation about the x axis that lays a plane flat on the floor.
pub const FLAT_ON_FLOOR: f64 = FRAC_PI_2;

/// A point in the 3D room. `y` is up; the floor plane is `x`/`z`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Lift a floor point to the given elevation.
    pub fn on_floor(point: Point, elevation: f64) -> Self {
        Self::new(point.x, elevation, point.y)
    }

    /// Drop the elevation.
    pub fn to_floor(self) -> Point {
        Point::new(self.x, self.z)
    }
}

/// One drawable entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntry {
    pub item_id: ItemId,
    pub asset_id: AssetKind,
    pub position: Position3,
    /// Rotation about the x axis, in radians.
    pub rotation: f64,
    /// The renderer draws two stacked sub-meshes at the same position.
    pub is_composite: bool,
}

/// Ordered list of drawables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionedScene {
    pub entries: Vec<SceneEntry>,
}

impl PositionedScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: SceneEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, item_id: ItemId) -> Option<&SceneEntry> {
        self.entries.iter().find(|entry| entry.item_id == item_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneEntry> {
        self.entries.iter()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
