//! Furniture items.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier for furniture items, assigned once at creation.
pub type ItemId = Uuid;

/// Asset identifier of a furniture model. Several items may share one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetKind(String);

impl AssetKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetKind {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

impl From<String> for AssetKind {
    fn from(kind: String) -> Self {
        Self(kind)
    }
}

/// A piece of furniture placed on the floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureItem {
    pub(crate) id: ItemId,
    /// Which asset renders this item.
    pub kind: AssetKind,
    /// Center of the item's footprint in grid space.
    pub position: Point,
    /// Rendered as two stacked sub-meshes that move and place as one unit.
    pub is_composite: bool,
    /// Width and depth of the item on the floor.
    pub footprint: Size,
}

impl FurnitureItem {
    /// Footprint of items whose size has not been set explicitly.
    pub const DEFAULT_FOOTPRINT: Size = Size::new(1.0, 1.0);

    /// Create a new item with a fresh id.
    pub fn new(kind: impl Into<AssetKind>, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: kind.into(),
            position,
            is_composite: false,
            footprint: Self::DEFAULT_FOOTPRINT,
        }
    }

    /// Mark the item as composite.
    pub fn with_composite(mut self, is_composite: bool) -> Self {
        self.is_composite = is_composite;
        self
    }

    /// Set the floor footprint.
    pub fn with_footprint(mut self, footprint: Size) -> Self {
        self.footprint = footprint;
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Half of the footprint along each axis.
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.footprint.width / 2.0, self.footprint.height / 2.0)
    }

    /// Footprint rectangle in grid space.
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, self.footprint)
    }

    /// Check if a floor point lies on this item's footprint.
    pub fn hit_test(&self, point: Point) -> bool {
        let bounds = self.bounds();
        point.x >= bounds.x0 && point.x <= bounds.x1 && point.y >= bounds.y0 && point.y <= bounds.y1
    }
}
