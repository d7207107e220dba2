//! RoomKit Core Library
//!
//! Platform-agnostic layout engine for the RoomKit furniture editor: the
//! room and furniture model, grid snapping, the drag interaction state
//! machine, room geometry and sequential furniture placement.

pub mod camera;
pub mod config;
pub mod drag;
pub mod error;
pub mod input;
pub mod model;
pub mod placement;
pub mod room;
pub mod scene;
pub mod session;
pub mod snap;

pub use camera::{FloorCamera, GroundProjector};
pub use config::{EditorConfig, GridConfig, PlacementOrigin};
pub use drag::{DragInteractionController, DragOutput, DragSession, DragState, DragSubject};
pub use error::{AssetError, ConfigError, LayoutError, LayoutResult, PolygonError};
pub use input::{PointerEvent, PointerPhase};
pub use model::{AssetKind, FurnitureItem, ItemId, LayoutEvent, LayoutModel, RoomAreaPolygon};
pub use placement::{
    solve_offsets, AssetLoader, AssetPart, AssetRequest, BoxFuture, BoxSize, Placement, PlacementPipeline,
    PlacementReport, ResolvedAsset, Timer,
};
pub use room::{RoomAreaGeometryBuilder, RoomGeometry, RoomHandle, RoomHandleKind};
pub use scene::{Position3, PositionedScene, SceneEntry};
pub use session::EditorSession;
pub use snap::{edge_aligned_snap, quantize, snap_point, SnapMode, SnapResult};
