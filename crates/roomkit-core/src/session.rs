//! One editing session: the model plus everything allowed to write to it.

use crate::camera::GroundProjector;
use crate::config::EditorConfig;
use crate::drag::{DragContext, DragInteractionController, DragOutput, DragSubject};
use crate::error::LayoutResult;
use crate::input::PointerEvent;
use crate::model::{LayoutEvent, LayoutModel};
use crate::placement::{AssetLoader, PlacementPipeline, PlacementReport, Timer};
use crate::room::{room_handles, RoomAreaGeometryBuilder, RoomGeometry, RoomHandle};
use crate::scene::{PositionedScene, Position3, SceneEntry, FLAT_ON_FLOOR};
use kurbo::Point;

/// Owns the layout model and routes edits into it.
///
/// The floor and room views read from the session; only the drag
/// controller and the room geometry builder write to the model.
pub struct EditorSession {
    config: EditorConfig,
    model: LayoutModel,
    controller: DragInteractionController,
    room: RoomAreaGeometryBuilder,
    events: Vec<LayoutEvent>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    /// Start a session on the default layout.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_model(config, LayoutModel::default())
    }

    pub fn with_model(config: EditorConfig, model: LayoutModel) -> Self {
        let controller = DragInteractionController::new(&config);
        let mut room = RoomAreaGeometryBuilder::new(config.room_depth);
        room.rebuild(model.room());
        Self {
            config,
            model,
            controller,
            room,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn model(&self) -> &LayoutModel {
        &self.model
    }

    pub fn controller(&self) -> &DragInteractionController {
        &self.controller
    }

    pub fn room_geometry(&self) -> Option<&RoomGeometry> {
        self.room.geometry()
    }

    /// Draggable handles of the current room polygon.
    pub fn room_handles(&self) -> Vec<RoomHandle> {
        room_handles(self.model.room())
    }

    /// Feed a pointer event to the drag controller.
    pub fn handle_pointer(&mut self, event: PointerEvent, projector: &dyn GroundProjector) -> LayoutResult<Vec<DragOutput>> {
        let mut ctx = DragContext {
            model: &mut self.model,
            room: &mut self.room,
            projector,
        };
        let result = self.controller.handle_event(event, &mut ctx);
        self.flush();
        result
    }

    /// Abort the active drag, if any.
    pub fn cancel_drag(&mut self) -> Option<DragOutput> {
        self.controller.cancel()
    }

    /// Remove a room vertex.
    pub fn remove_room_vertex(&mut self, index: usize) -> LayoutResult<Point> {
        let result = self.room.remove_vertex(&mut self.model, index);
        self.flush();
        result
    }

    fn flush(&mut self) {
        self.events.extend(self.model.drain_events());
    }

    /// Change notifications since the last call, in order.
    pub fn take_events(&mut self) -> Vec<LayoutEvent> {
        std::mem::take(&mut self.events)
    }

    /// Items laid flat on the floor plan, in list order.
    ///
    /// The dragged item is drawn at its live position and raised.
    pub fn floor_scene(&self) -> PositionedScene {
        let active = self.controller.session();
        let mut scene = PositionedScene::new();
        for item in self.model.items() {
            let position = match active {
                Some(session) if session.subject == DragSubject::Item(item.id()) => session.live_position,
                _ => item.position,
            };
            scene.push(SceneEntry {
                item_id: item.id(),
                asset_id: item.kind.clone(),
                position: Position3::on_floor(position, self.controller.elevation_of(item.id())),
                rotation: FLAT_ON_FLOOR,
                is_composite: item.is_composite,
            });
        }
        scene
    }

    /// Items packed along x by a placement pass.
    pub fn room_scene<H>(&self, report: &PlacementReport<H>) -> PositionedScene {
        let mut scene = PositionedScene::new();
        for placement in &report.placed {
            scene.push(SceneEntry {
                item_id: placement.item_id,
                asset_id: placement.kind.clone(),
                position: Position3::new(placement.offset, self.config.resting_elevation, 0.0),
                rotation: 0.0,
                is_composite: placement.is_composite(),
            });
        }
        scene
    }

    /// Resolve every item's asset in x order and pack them.
    pub async fn place_furniture<L: AssetLoader, T: Timer>(&self, loader: &L, timer: &T) -> PlacementReport<L::Handle> {
        PlacementPipeline::for_model(&self.model, &self.config, loader, timer)
            .run()
            .await
    }
}
