//! Room-area outline, extruded solid, and vertex handles.

use crate::config::GridConfig;
use crate::error::LayoutResult;
use crate::model::{signed_area, LayoutModel, RoomAreaPolygon};
use crate::scene::Position3;
use crate::snap::snap_point;
use kurbo::{BezPath, Point, Vec2};

/// A vertical wall face raised from one polygon edge.
#[derive(Debug, Clone, PartialEq)]
pub struct WallQuad {
    /// Index of the polygon edge this wall stands on.
    pub edge: usize,
    /// Bottom-start, bottom-end, top-end, top-start.
    pub corners: [Position3; 4],
}

/// The room volume: the floor polygon extruded upwards by `depth`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSolid {
    /// Floor vertices, counter-clockwise.
    pub floor: Vec<Point>,
    pub depth: f64,
    pub walls: Vec<WallQuad>,
}

/// Geometry built from one version of the room polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomGeometry {
    /// Closed boundary outline for the floor view.
    pub outline: BezPath,
    pub solid: RoomSolid,
    /// Build counter; every rebuild gets a new value.
    pub generation: u64,
}

/// What a room handle edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomHandleKind {
    /// Moves the vertex at this index.
    Vertex(usize),
    /// Inserts a new vertex into the edge starting at this index.
    EdgeMidpoint(usize),
}

/// A draggable room handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomHandle {
    pub kind: RoomHandleKind,
    /// Position in grid space.
    pub position: Point,
}

impl RoomHandle {
    pub fn new(kind: RoomHandleKind, position: Point) -> Self {
        Self { kind, position }
    }

    /// Check if a floor point hits this handle.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// One handle per vertex, followed by one midpoint handle per edge.
pub fn room_handles(polygon: &RoomAreaPolygon) -> Vec<RoomHandle> {
    let mut handles: Vec<RoomHandle> = polygon
        .vertices()
        .iter()
        .enumerate()
        .map(|(i, &v)| RoomHandle::new(RoomHandleKind::Vertex(i), v))
        .collect();
    handles.extend(
        polygon
            .edges()
            .enumerate()
            .map(|(i, (a, b))| RoomHandle::new(RoomHandleKind::EdgeMidpoint(i), a.midpoint(b))),
    );
    handles
}

/// The vertex handle under `point`, nearest first.
pub fn hit_test_vertex(polygon: &RoomAreaPolygon, point: Point, tolerance: f64) -> Option<RoomHandle> {
    nearest_handle(polygon, point, tolerance, true)
}

/// The edge-midpoint handle under `point`, nearest first.
pub fn hit_test_midpoint(polygon: &RoomAreaPolygon, point: Point, tolerance: f64) -> Option<RoomHandle> {
    nearest_handle(polygon, point, tolerance, false)
}

fn nearest_handle(polygon: &RoomAreaPolygon, point: Point, tolerance: f64, vertex: bool) -> Option<RoomHandle> {
    room_handles(polygon)
        .into_iter()
        .filter(|h| matches!(h.kind, RoomHandleKind::Vertex(_)) == vertex)
        .filter(|h| h.hit_test(point, tolerance))
        .min_by(|a, b| {
            let da = (point - a.position).hypot2();
            let db = (point - b.position).hypot2();
            da.total_cmp(&db)
        })
}

/// Rebuilds room geometry whenever the polygon changes.
#[derive(Debug, Clone)]
pub struct RoomAreaGeometryBuilder {
    depth: f64,
    geometry: Option<RoomGeometry>,
    generation: u64,
}

impl RoomAreaGeometryBuilder {
    pub fn new(depth: f64) -> Self {
        Self {
            depth,
            geometry: None,
            generation: 0,
        }
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    /// The current geometry, if anything has been built yet.
    pub fn geometry(&self) -> Option<&RoomGeometry> {
        self.geometry.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Discard the current outline and solid and build new ones.
    pub fn rebuild(&mut self, polygon: &RoomAreaPolygon) -> &RoomGeometry {
        self.geometry = None;
        self.generation += 1;
        log::debug!(
            "rebuilding room geometry #{} from {} vertices",
            self.generation,
            polygon.len()
        );
        self.geometry.insert(RoomGeometry {
            outline: build_outline(polygon),
            solid: build_solid(polygon, self.depth),
            generation: self.generation,
        })
    }

    /// Snap `target` to the grid, write it at `index`, and rebuild.
    pub fn move_vertex(
        &mut self,
        model: &mut LayoutModel,
        index: usize,
        target: Point,
        grid: &GridConfig,
    ) -> LayoutResult<Point> {
        let snapped = snap_point(target, grid.vertex_snap, grid.cell_size, Vec2::ZERO).point;
        if let Err(err) = model.set_vertex(index, snapped) {
            log::warn!("rejected move of room vertex {index} to {snapped:?}: {err}");
            return Err(err.into());
        }
        self.rebuild(model.room());
        Ok(snapped)
    }

    /// Split edge `edge` with a new grid-snapped vertex; returns its index.
    pub fn insert_vertex(
        &mut self,
        model: &mut LayoutModel,
        edge: usize,
        target: Point,
        grid: &GridConfig,
    ) -> LayoutResult<usize> {
        let snapped = snap_point(target, grid.vertex_snap, grid.cell_size, Vec2::ZERO).point;
        let index = edge + 1;
        if let Err(err) = model.insert_vertex(index, snapped) {
            log::warn!("rejected new room vertex on edge {edge} at {snapped:?}: {err}");
            return Err(err.into());
        }
        self.rebuild(model.room());
        Ok(index)
    }

    /// Remove a vertex. Never drops the polygon below three vertices.
    pub fn remove_vertex(&mut self, model: &mut LayoutModel, index: usize) -> LayoutResult<Point> {
        let removed = match model.remove_vertex(index) {
            Ok(point) => point,
            Err(err) => {
                log::warn!("rejected removal of room vertex {index}: {err}");
                return Err(err.into());
            }
        };
        self.rebuild(model.room());
        Ok(removed)
    }
}

fn build_outline(polygon: &RoomAreaPolygon) -> BezPath {
    let mut path = BezPath::new();
    let mut vertices = polygon.vertices().iter();
    if let Some(&first) = vertices.next() {
        path.move_to(first);
        for &v in vertices {
            path.line_to(v);
        }
        path.close_path();
    }
    path
}

fn build_solid(polygon: &RoomAreaPolygon, depth: f64) -> RoomSolid {
    let mut floor = polygon.vertices().to_vec();
    let reversed = signed_area(&floor) < 0.0;
    if reversed {
        floor.reverse();
    }
    let n = floor.len();
    let walls = (0..n)
        .map(|i| {
            let a = floor[i];
            let b = floor[(i + 1) % n];
            // Report the edge index of the caller's polygon, not the rewound copy.
            let edge = if reversed { (2 * n - i - 2) % n } else { i };
            WallQuad {
                edge,
                corners: [
                    Position3::on_floor(a, 0.0),
                    Position3::on_floor(b, 0.0),
                    Position3::on_floor(b, depth),
                    Position3::on_floor(a, depth),
                ],
            }
        })
        .collect();
    RoomSolid { floor, depth, walls }
}
