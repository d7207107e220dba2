//! Editor configuration.

use crate::error::ConfigError;
use crate::snap::SnapMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default grid cell size in world units.
pub const DEFAULT_CELL_SIZE: f64 = 1.0;

/// Default side length of the visible floor grid.
pub const DEFAULT_GRID_EXTENT: f64 = 18.0;

/// Height a dragged item is lifted to, so it reads clearly above the floor.
pub const DEFAULT_DRAG_ELEVATION: f64 = 20.0;

/// Quantization settings shared by every snap operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Size of one square grid cell.
    pub cell_size: f64,
    /// Side length of the visible grid, centered on the origin.
    pub extent: f64,
    /// How a dropped item is aligned.
    pub item_snap: SnapMode,
    /// How a dragged room vertex is aligned.
    pub vertex_snap: SnapMode,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            extent: DEFAULT_GRID_EXTENT,
            item_snap: SnapMode::EdgeAligned,
            vertex_snap: SnapMode::Grid,
        }
    }
}

impl GridConfig {
    /// Create a grid with the given cell size and the default extent.
    pub fn with_cell_size(cell_size: f64) -> Self {
        Self {
            cell_size,
            ..Self::default()
        }
    }

    /// Number of cells along one side of the visible grid.
    pub fn divisions(&self) -> usize {
        if self.cell_size <= 0.0 || !self.extent.is_finite() {
            return 0;
        }
        (self.extent / self.cell_size).round().max(0.0) as usize
    }
}

/// Where the first item of a placement pass starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlacementOrigin {
    /// Start packing at x = 0.
    #[default]
    Zero,
    /// Start packing at the room polygon's smallest x.
    PolygonMinX,
}

/// Top-level editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub grid: GridConfig,
    /// Elevation of an item while it is being dragged.
    pub drag_elevation: f64,
    /// Elevation of an item at rest.
    pub resting_elevation: f64,
    /// Extrusion depth of the room solid.
    pub room_depth: f64,
    /// Per-item asset resolution timeout in milliseconds.
    pub asset_timeout_ms: u64,
    pub placement_origin: PlacementOrigin,
    /// Pick radius for room vertex handles, in world units.
    pub handle_tolerance: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            drag_elevation: DEFAULT_DRAG_ELEVATION,
            resting_elevation: 0.0,
            room_depth: 2.5,
            asset_timeout_ms: 5000,
            placement_origin: PlacementOrigin::default(),
            handle_tolerance: 0.25,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from a file, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => config,
                Err(err) => {
                    log::warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!("Failed to read {}: {err}. Using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.grid.cell_size.is_finite() && self.grid.cell_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "grid.cell_size must be positive, got {}",
                self.grid.cell_size
            )));
        }
        if !(self.grid.extent.is_finite() && self.grid.extent >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "grid.extent must be non-negative, got {}",
                self.grid.extent
            )));
        }
        if !(self.room_depth.is_finite() && self.room_depth > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "room_depth must be positive, got {}",
                self.room_depth
            )));
        }
        if self.asset_timeout_ms == 0 {
            return Err(ConfigError::Invalid("asset_timeout_ms must be non-zero".into()));
        }
        if !(self.handle_tolerance.is_finite() && self.handle_tolerance >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "handle_tolerance must be non-negative, got {}",
                self.handle_tolerance
            )));
        }
        Ok(())
    }
}
