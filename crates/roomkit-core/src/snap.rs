//! Grid snapping for item placement and room vertices.
//!
//! Everything here is a pure function of its arguments.

use crate::config::GridConfig;
use kurbo::{Line, Point, Vec2};
use serde::{Deserialize, Serialize};

/// How a point is aligned to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapMode {
    /// No snapping.
    None,
    /// Snap to the nearest grid intersection.
    #[default]
    Grid,
    /// Snap so the object's bounding-box edges sit on grid lines.
    EdgeAligned,
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }
}

fn usable_cell(cell_size: f64) -> bool {
    cell_size.is_finite() && cell_size > 0.0
}

/// Round `value` to the nearest multiple of `cell_size`.
///
/// Returns `value` unchanged when `cell_size` is not a positive finite number.
pub fn quantize(value: f64, cell_size: f64) -> f64 {
    if !usable_cell(cell_size) {
        return value;
    }
    (value / cell_size).round() * cell_size
}

/// Snap a center coordinate so the object's edge, not its center, lands on
/// the nearest grid line.
///
/// The center goes `half_extent` below the grid line when the raw value was
/// below that line, and `half_extent` above it otherwise.
pub fn edge_aligned_snap(value: f64, cell_size: f64, half_extent: f64) -> f64 {
    let line = quantize(value, cell_size);
    if value < line {
        line - half_extent
    } else {
        line + half_extent
    }
}

/// Snap a point to the nearest grid intersection.
pub fn quantize_point(point: Point, cell_size: f64) -> SnapResult {
    if !usable_cell(cell_size) {
        return SnapResult::none(point);
    }
    SnapResult {
        point: Point::new(quantize(point.x, cell_size), quantize(point.y, cell_size)),
        snapped_x: true,
        snapped_y: true,
    }
}

/// Edge-align a center point on both axes using the object's half-extents.
pub fn edge_aligned_snap_point(point: Point, cell_size: f64, half_extents: Vec2) -> SnapResult {
    if !usable_cell(cell_size) {
        return SnapResult::none(point);
    }
    SnapResult {
        point: Point::new(
            edge_aligned_snap(point.x, cell_size, half_extents.x),
            edge_aligned_snap(point.y, cell_size, half_extents.y),
        ),
        snapped_x: true,
        snapped_y: true,
    }
}

/// Snap a point based on the snap mode.
pub fn snap_point(point: Point, mode: SnapMode, cell_size: f64, half_extents: Vec2) -> SnapResult {
    match mode {
        SnapMode::None => SnapResult::none(point),
        SnapMode::Grid => quantize_point(point, cell_size),
        SnapMode::EdgeAligned => edge_aligned_snap_point(point, cell_size, half_extents),
    }
}

/// Integer coordinates of the grid cell containing `point`.
pub fn cell_of(point: Point, cell_size: f64) -> Option<(i64, i64)> {
    if !usable_cell(cell_size) {
        return None;
    }
    Some((
        (point.x / cell_size).floor() as i64,
        (point.y / cell_size).floor() as i64,
    ))
}

/// Lines of the visible floor grid, centered on the origin.
///
/// Vertical lines come first (left to right), then horizontal lines
/// (top to bottom).
pub fn grid_lines(grid: &GridConfig) -> Vec<Line> {
    let divisions = grid.divisions();
    if divisions == 0 {
        return Vec::new();
    }
    let half = grid.extent / 2.0;
    let step = grid.extent / divisions as f64;
    let mut lines = Vec::with_capacity((divisions + 1) * 2);
    for i in 0..=divisions {
        let x = -half + i as f64 * step;
        lines.push(Line::new((x, -half), (x, half)));
    }
    for i in 0..=divisions {
        let y = -half + i as f64 * step;
        lines.push(Line::new((-half, y), (half, y)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn quantize_is_idempotent(value in -1.0e4f64..1.0e4, cell in 0.01f64..100.0) {
            let once = quantize(value, cell);
            let twice = quantize(once, cell);
            prop_assert!(
                (twice - once).abs() <= 1e-9 * once.abs().max(1.0),
                "quantize({value}, {cell}) = {once}, requantized to {twice}"
            );
        }

        #[test]
        fn edge_aligned_offset_is_exactly_half_extent(
            value in -1.0e4f64..1.0e4,
            cell in 0.01f64..100.0,
            half in 0.01f64..50.0,
        ) {
            let line = quantize(value, cell);
            let offset = (edge_aligned_snap(value, cell, half) - line).abs();
            prop_assert!(
                (offset - half).abs() <= 1e-9 * (line.abs() + half),
                "value {value}, cell {cell}: offset {offset} from line {line}, expected {half}"
            );
        }

        #[test]
        fn edge_aligned_lands_on_side_of_pointer(value in -1.0e4f64..1.0e4, cell in 0.01f64..100.0) {
            let line = quantize(value, cell);
            let snapped = edge_aligned_snap(value, cell, cell / 2.0);
            prop_assert_eq!(snapped < line, value < line);
        }
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(23.0, 20.0), 20.0);
        assert_eq!(quantize(31.0, 20.0), 40.0);
        assert_eq!(quantize(-0.4, 1.0), 0.0);
        assert_eq!(quantize(2.6, 0.5), 2.5);
    }


    #[test]
    fn test_quantize_ignores_bad_cell() {
        assert_eq!(quantize(3.3, 0.0), 3.3);
        assert_eq!(quantize(3.3, -1.0), 3.3);
        assert_eq!(quantize(3.3, f64::NAN), 3.3);
    }


    #[test]
    fn test_edge_aligned_sign() {
        // Below the nearest line: object sits on the low side.
        assert_eq!(edge_aligned_snap(2.7, 1.0, 0.5), 2.5);
        // Above (or on) the nearest line: object sits on the high side.
        assert_eq!(edge_aligned_snap(3.3, 1.0, 0.5), 3.5);
        assert_eq!(edge_aligned_snap(3.0, 1.0, 0.5), 3.5);
        // Sign follows the grid line, not integer rounding.
        assert_eq!(edge_aligned_snap(4.6, 2.0, 1.0), 5.0);
    }

    #[test]
    fn test_quantize_point() {
        let result = quantize_point(Point::new(23.0, 47.0), 20.0);
        assert_eq!(result.point, Point::new(20.0, 40.0));
        assert!(result.snapped_x);
        assert!(result.snapped_y);
    }

    #[test]
    fn test_snap_point_modes() {
        let p = Point::new(3.3, 2.7);
        let half = Vec2::new(0.5, 0.5);
        assert_eq!(snap_point(p, SnapMode::None, 1.0, half), SnapResult::none(p));
        assert_eq!(snap_point(p, SnapMode::Grid, 1.0, half).point, Point::new(3.0, 3.0));
        assert_eq!(snap_point(p, SnapMode::EdgeAligned, 1.0, half).point, Point::new(3.5, 2.5));
    }

    #[test]
    fn test_cell_of() {
        assert_eq!(cell_of(Point::new(3.3, 2.7), 1.0), Some((3, 2)));
        assert_eq!(cell_of(Point::new(-0.1, 0.0), 1.0), Some((-1, 0)));
        assert_eq!(cell_of(Point::ZERO, 0.0), None);
    }

    #[test]
    fn test_grid_lines() {
        let grid = GridConfig {
            cell_size: 1.8,
            ..GridConfig::default()
        };
        let lines = grid_lines(&grid);
        assert_eq!(lines.len(), 22);
        assert_eq!(lines[0], Line::new((-9.0, -9.0), (-9.0, 9.0)));
        assert_eq!(lines[21], Line::new((-9.0, 9.0), (9.0, 9.0)));
    }
}
