//! Room-area polygon and its validity checks.

use crate::error::PolygonError;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Relative tolerance for degenerate edges and collinearity tests, scaled
/// by the polygon's extent.
const RELATIVE_EPSILON: f64 = 1e-9;

/// Side length of the default square room.
pub const DEFAULT_ROOM_SIDE: f64 = 6.0;

/// Ordered, implicitly closed floor boundary.
///
/// Always holds at least three vertices with no zero-length edge and no
/// crossing edges. Mutations produce a new validated polygon, so a
/// rejected edit leaves the original untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct RoomAreaPolygon {
    vertices: Vec<Point>,
}

impl RoomAreaPolygon {
    /// Create a polygon, validating it.
    pub fn new(vertices: Vec<Point>) -> Result<Self, PolygonError> {
        validate(&vertices)?;
        Ok(Self { vertices })
    }

    /// Axis-aligned square with one corner at the origin.
    pub fn square(side: f64) -> Result<Self, PolygonError> {
        Self::new(vec![
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ])
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex(&self, index: usize) -> Option<Point> {
        self.vertices.get(index).copied()
    }

    /// Edges as `(start, end)` pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Midpoint of edge `index` (from vertex `index` to the next one).
    pub fn edge_midpoint(&self, index: usize) -> Option<Point> {
        let n = self.vertices.len();
        let a = self.vertices.get(index)?;
        let b = self.vertices[(index + 1) % n];
        Some(a.midpoint(b))
    }

    /// Bounding rectangle of all vertices.
    pub fn bounds(&self) -> Rect {
        self.vertices
            .iter()
            .skip(1)
            .fold(Rect::from_points(self.vertices[0], self.vertices[0]), |r, &p| r.union_pt(p))
    }

    pub fn min_x(&self) -> f64 {
        self.bounds().x0
    }

    /// Copy with vertex `index` replaced.
    pub fn with_vertex(&self, index: usize, point: Point) -> Result<Self, PolygonError> {
        self.check_index(index)?;
        let mut vertices = self.vertices.clone();
        vertices[index] = point;
        Self::new(vertices)
    }

    /// Copy with `point` inserted before position `index` (`index == len` appends).
    pub fn with_inserted(&self, index: usize, point: Point) -> Result<Self, PolygonError> {
        if index > self.vertices.len() {
            return Err(PolygonError::IndexOutOfRange {
                index,
                len: self.vertices.len(),
            });
        }
        let mut vertices = self.vertices.clone();
        vertices.insert(index, point);
        Self::new(vertices)
    }

    /// Copy with vertex `index` removed.
    pub fn with_removed(&self, index: usize) -> Result<Self, PolygonError> {
        self.check_index(index)?;
        let mut vertices = self.vertices.clone();
        vertices.remove(index);
        Self::new(vertices)
    }

    fn check_index(&self, index: usize) -> Result<(), PolygonError> {
        if index >= self.vertices.len() {
            Err(PolygonError::IndexOutOfRange {
                index,
                len: self.vertices.len(),
            })
        } else {
            Ok(())
        }
    }
}

impl Default for RoomAreaPolygon {
    fn default() -> Self {
        let side = DEFAULT_ROOM_SIDE;
        Self {
            vertices: vec![
                Point::new(0.0, 0.0),
                Point::new(side, 0.0),
                Point::new(side, side),
                Point::new(0.0, side),
            ],
        }
    }
}

impl TryFrom<Vec<Point>> for RoomAreaPolygon {
    type Error = PolygonError;

    fn try_from(vertices: Vec<Point>) -> Result<Self, Self::Error> {
        Self::new(vertices)
    }
}

impl From<RoomAreaPolygon> for Vec<Point> {
    fn from(polygon: RoomAreaPolygon) -> Self {
        polygon.vertices
    }
}

/// Length and area thresholds for one polygon.
#[derive(Debug, Clone, Copy)]
struct Tolerance {
    length: f64,
    area: f64,
}

impl Tolerance {
    fn for_vertices(vertices: &[Point]) -> Self {
        let bounds = vertices
            .iter()
            .fold(Rect::from_points(vertices[0], vertices[0]), |r, &p| r.union_pt(p));
        let extent = bounds.width().max(bounds.height());
        let length = RELATIVE_EPSILON * extent;
        Self {
            length,
            area: length * extent,
        }
    }
}

/// Check vertex count, edge lengths and edge crossings.
pub fn validate(vertices: &[Point]) -> Result<(), PolygonError> {
    let n = vertices.len();
    if n < 3 {
        return Err(PolygonError::TooFewVertices(n));
    }

    let tol = Tolerance::for_vertices(vertices);
    let edge = |i: usize| (vertices[i], vertices[(i + 1) % n]);

    for i in 0..n {
        let (a, b) = edge(i);
        if (b - a).hypot() <= tol.length {
            return Err(PolygonError::ZeroLengthEdge(i));
        }
    }

    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = edge(i);
            let (c, d) = edge(j);
            if j == i + 1 {
                // Shared vertex is b == c.
                if folds_back(a, b, d, tol) {
                    return Err(PolygonError::SelfIntersection(i, j));
                }
            } else if i == 0 && j == n - 1 {
                // Closing edge: shared vertex is a == d.
                if folds_back(b, a, c, tol) {
                    return Err(PolygonError::SelfIntersection(i, j));
                }
            } else if segments_intersect(a, b, c, d, tol) {
                return Err(PolygonError::SelfIntersection(i, j));
            }
        }
    }
    Ok(())
}

/// Two edges meeting at `shared` overlap when they run back along each other.
fn folds_back(prev: Point, shared: Point, next: Point, tol: Tolerance) -> bool {
    let u = prev - shared;
    let v = next - shared;
    u.cross(v).abs() <= tol.area && u.dot(v) > 0.0
}

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

fn on_segment(a: Point, b: Point, p: Point, eps: f64) -> bool {
    p.x >= a.x.min(b.x) - eps && p.x <= a.x.max(b.x) + eps && p.y >= a.y.min(b.y) - eps && p.y <= a.y.max(b.y) + eps
}

/// Whether closed segments `ab` and `cd` share any point.
fn segments_intersect(a: Point, b: Point, c: Point, d: Point, tol: Tolerance) -> bool {
    let eps = tol.area;
    let d1 = orientation(c, d, a);
    let d2 = orientation(c, d, b);
    let d3 = orientation(a, b, c);
    let d4 = orientation(a, b, d);

    if ((d1 > eps && d2 < -eps) || (d1 < -eps && d2 > eps)) && ((d3 > eps && d4 < -eps) || (d3 < -eps && d4 > eps)) {
        return true;
    }

    let len = tol.length;
    (d1.abs() <= eps && on_segment(c, d, a, len))
        || (d2.abs() <= eps && on_segment(c, d, b, len))
        || (d3.abs() <= eps && on_segment(a, b, c, len))
        || (d4.abs() <= eps && on_segment(a, b, d, len))
}

/// Signed area (positive for counter-clockwise winding in a y-up frame).
pub fn signed_area(vertices: &[Point]) -> f64 {
    let n = vertices.len();
    (0..n)
        .map(|i| {
            let a = vertices[i].to_vec2();
            let b = vertices[(i + 1) % n].to_vec2();
            a.cross(b)
        })
        .sum::<f64>()
        / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> RoomAreaPolygon {
        RoomAreaPolygon::square(6.0).unwrap()
    }

    #[test]
    fn test_square_is_valid() {
        let poly = square();
        assert_eq!(poly.len(), 4);
        assert_eq!(poly.edges().count(), 4);
        assert_eq!(poly.bounds(), Rect::new(0.0, 0.0, 6.0, 6.0));
        assert_eq!(signed_area(poly.vertices()), 36.0);
    }

    #[test]
    fn test_default_is_valid() {
        let poly = RoomAreaPolygon::default();
        assert!(validate(poly.vertices()).is_ok());
        assert_eq!(poly, square());
    }

    #[test]
    fn test_too_few_vertices() {
        let result = RoomAreaPolygon::new(vec![Point::ZERO, Point::new(1.0, 0.0)]);
        assert_eq!(result, Err(PolygonError::TooFewVertices(2)));
    }

    #[test]
    fn test_zero_length_edge() {
        let result = RoomAreaPolygon::new(vec![
            Point::ZERO,
            Point::ZERO,
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ]);
        assert_eq!(result, Err(PolygonError::ZeroLengthEdge(0)));
    }

    #[test]
    fn test_small_rooms_are_valid() {
        let tiny = RoomAreaPolygon::square(1e-5).unwrap();
        assert_eq!(tiny.len(), 4);

        let sliver = RoomAreaPolygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2e-5, 0.0),
            Point::new(2e-5, 2e-5),
            Point::new(1e-5, 1e-5),
            Point::new(0.0, 2e-5),
        ]);
        assert!(sliver.is_ok());
    }

    #[test]
    fn test_tiny_bowtie_is_rejected() {
        let result = RoomAreaPolygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2e-5, 2e-5),
            Point::new(2e-5, 0.0),
            Point::new(0.0, 2e-5),
        ]);
        assert!(matches!(result, Err(PolygonError::SelfIntersection(_, _))));
    }

    #[test]
    fn test_large_room_short_edge() {
        let result = RoomAreaPolygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1e6, 0.0),
            Point::new(1e6, 1e-4),
            Point::new(1e6, 1e6),
            Point::new(0.0, 1e6),
        ]);
        assert!(matches!(result, Err(PolygonError::ZeroLengthEdge(1))));
    }

    #[test]
    fn test_bowtie_is_rejected() {
        let result = RoomAreaPolygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(2.0, 0.0),
            Point::new(0.0, 2.0),
        ]);
        assert!(matches!(result, Err(PolygonError::SelfIntersection(_, _))));
    }

    #[test]
    fn test_collinear_triangle_is_rejected() {
        let result = RoomAreaPolygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ]);
        assert!(matches!(result, Err(PolygonError::SelfIntersection(_, _))));
    }

    #[test]
    fn test_concave_polygon_is_valid() {
        let result = RoomAreaPolygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(2.0, 1.0),
            Point::new(0.0, 4.0),
        ]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_with_vertex_leaves_original() {
        let poly = square();
        let moved = poly.with_vertex(1, Point::new(7.0, 0.0)).unwrap();
        assert_eq!(poly.vertex(1), Some(Point::new(6.0, 0.0)));
        assert_eq!(moved.vertex(1), Some(Point::new(7.0, 0.0)));
    }

    #[test]
    fn test_with_vertex_rejects_crossing() {
        let poly = square();
        // Pull vertex 1 up through the top edge.
        let result = poly.with_vertex(1, Point::new(3.0, 8.0));
        assert!(matches!(result, Err(PolygonError::SelfIntersection(_, _))));
    }

    #[test]
    fn test_remove_below_three_rejected() {
        let tri = RoomAreaPolygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ])
        .unwrap();
        assert_eq!(tri.with_removed(0), Err(PolygonError::TooFewVertices(2)));
    }

    #[test]
    fn test_index_out_of_range() {
        let poly = square();
        assert_eq!(
            poly.with_vertex(9, Point::ZERO),
            Err(PolygonError::IndexOutOfRange { index: 9, len: 4 })
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let result: Result<RoomAreaPolygon, _> = serde_json::from_str(r#"[{"x":0.0,"y":0.0},{"x":1.0,"y":0.0}]"#);
        assert!(result.is_err());
    }
}
