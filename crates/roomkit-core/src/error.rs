//! Error types for the layout engine.

use crate::model::{AssetKind, ItemId};
use thiserror::Error;

/// Errors raised while editing or placing a layout.
///
/// None of these are fatal to the editing session: each one affects a
/// single item, vertex edit or pointer gesture and leaves the rest of the
/// layout usable.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Asset resolution failed for the item at `index` in placement order.
    /// Items from `index` onwards have no offset.
    #[error("Asset load failed at index {index} (item {item_id}): {source}")]
    AssetLoadFailure {
        index: usize,
        item_id: ItemId,
        #[source]
        source: AssetError,
    },
    #[error("Invalid room polygon: {0}")]
    InvalidPolygon(#[from] PolygonError),
    /// A commit was received without an active drag session.
    #[error("No active drag session to commit")]
    DragTargetNotFound,
    /// A lookup by asset kind matched more than one item.
    #[error("Asset kind '{kind}' is shared by {count} items; look up by id instead")]
    IdentityAmbiguity { kind: AssetKind, count: usize },
    #[error("No item with asset kind '{0}'")]
    KindNotFound(AssetKind),
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),
    #[error("Item already exists: {0}")]
    DuplicateItem(ItemId),
}

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Reasons a room-area polygon is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolygonError {
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("edge {0} has zero length")]
    ZeroLengthEdge(usize),
    #[error("edges {0} and {1} intersect")]
    SelfIntersection(usize, usize),
    #[error("vertex index {index} out of range (polygon has {len} vertices)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors reported by an asset loader.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),
    #[error("Asset load failed: {0}")]
    Failed(String),
    #[error("Asset load timed out after {0} ms")]
    TimedOut(u64),
    #[error("Asset has an invalid bounding box width: {0}")]
    InvalidSize(f64),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}
