//! Pointer-driven drag interaction.
//!
//! The controller is a small state machine:
//!
//! ```text
//! Idle --down on object--> Armed --move--> Dragging --up--> (commit) --> Idle
//!                            |                 |
//!                            +--up: release----+--leave/cancel: restore--> Idle
//! ```
//!
//! While dragging, the subject follows the projected pointer freely. Snapping
//! happens once, on commit, and the snapped result is the only thing written
//! to the [`LayoutModel`].

use crate::camera::GroundProjector;
use crate::config::{EditorConfig, GridConfig};
use crate::error::{LayoutError, LayoutResult};
use crate::input::{PointerEvent, PointerPhase};
use crate::model::{ItemId, LayoutModel};
use crate::room::{hit_test_midpoint, hit_test_vertex, RoomAreaGeometryBuilder, RoomHandleKind};
use crate::snap::snap_point;
use kurbo::{Point, Vec2};

/// What is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragSubject {
    Item(ItemId),
    /// A room polygon vertex, by index.
    Vertex(usize),
    /// The midpoint handle of a room edge; committing inserts a vertex.
    EdgeMidpoint(usize),
}

/// An in-progress drag. Lives from pointer-down to pointer-up or cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub subject: DragSubject,
    /// Where the subject was when the drag started.
    pub origin_position: Point,
    /// Unsnapped position following the pointer.
    pub live_position: Point,
    /// Half of the subject's footprint; zero for room handles.
    pub half_extents: Vec2,
}

impl DragSession {
    fn new(subject: DragSubject, origin: Point, half_extents: Vec2) -> Self {
        Self {
            subject,
            origin_position: origin,
            live_position: origin,
            half_extents,
        }
    }
}

/// Controller state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Pointer is down on a subject that has not moved yet.
    Armed(DragSession),
    Dragging(DragSession),
}

/// Notifications produced by the controller for the views.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutput {
    /// A subject was picked up and raised.
    ObjectPicked { subject: DragSubject, elevation: f64 },
    /// The subject moved to a new unsnapped position.
    ObjectMoved {
        subject: DragSubject,
        position: Point,
        elevation: f64,
    },
    /// The drag was committed to the model.
    ObjectCommitted {
        subject: DragSubject,
        from: Point,
        to: Point,
    },
    /// Pointer went up without the subject moving; nothing was written.
    ObjectReleased { subject: DragSubject },
    /// The drag was aborted and the subject put back.
    ObjectCancelled { subject: DragSubject, restored: Point },
}

/// Everything a pointer event may touch.
pub struct DragContext<'a> {
    pub model: &'a mut LayoutModel,
    pub room: &'a mut RoomAreaGeometryBuilder,
    pub projector: &'a dyn GroundProjector,
}

/// Turns pointer events into moves of furniture items and room vertices.
#[derive(Debug, Clone)]
pub struct DragInteractionController {
    state: DragState,
    grid: GridConfig,
    drag_elevation: f64,
    resting_elevation: f64,
    handle_tolerance: f64,
}

impl DragInteractionController {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            state: DragState::Idle,
            grid: config.grid,
            drag_elevation: config.drag_elevation,
            resting_elevation: config.resting_elevation,
            handle_tolerance: config.handle_tolerance,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Idle => None,
            DragState::Armed(session) | DragState::Dragging(session) => Some(session),
        }
    }

    pub fn is_active(&self) -> bool {
        self.session().is_some()
    }

    /// Current elevation of an item: raised while it is the drag subject.
    pub fn elevation_of(&self, id: ItemId) -> f64 {
        match self.session() {
            Some(session) if session.subject == DragSubject::Item(id) => self.drag_elevation,
            _ => self.resting_elevation,
        }
    }

    /// Feed one pointer event through the state machine.
    pub fn handle_event(&mut self, event: PointerEvent, ctx: &mut DragContext<'_>) -> LayoutResult<Vec<DragOutput>> {
        match event.phase {
            PointerPhase::Down => Ok(self.pointer_down(event.device_position, ctx)),
            PointerPhase::Move => Ok(self.pointer_move(event.device_position, ctx).into_iter().collect()),
            PointerPhase::Up => self.pointer_up(event.device_position, ctx).map(|output| vec![output]),
            PointerPhase::Leave | PointerPhase::Cancel => Ok(self.cancel().into_iter().collect()),
        }
    }

    fn pointer_down(&mut self, device_position: Point, ctx: &mut DragContext<'_>) -> Vec<DragOutput> {
        let mut outputs = Vec::new();

        // A second press while a session is open means the release was lost:
        // finish the old session the way a release would before starting over.
        match std::mem::take(&mut self.state) {
            DragState::Idle => {}
            DragState::Armed(session) => {
                log::debug!("pointer down while {:?} armed; releasing it first", session.subject);
                outputs.push(DragOutput::ObjectReleased {
                    subject: session.subject,
                });
            }
            DragState::Dragging(session) => {
                log::debug!("pointer down during active drag of {:?}; committing it first", session.subject);
                let (subject, origin) = (session.subject, session.origin_position);
                match self.commit(session, ctx) {
                    Ok(output) => outputs.push(output),
                    Err(err) => {
                        log::warn!("forced commit of {subject:?} rejected: {err}");
                        outputs.push(DragOutput::ObjectCancelled {
                            subject,
                            restored: origin,
                        });
                    }
                }
            }
        }

        let Some(point) = ctx.projector.project(device_position) else {
            return outputs;
        };
        let Some(session) = self.pick(point, ctx.model) else {
            return outputs;
        };

        log::debug!("armed drag of {:?} at {:?}", session.subject, session.origin_position);
        outputs.push(DragOutput::ObjectPicked {
            subject: session.subject,
            elevation: self.drag_elevation,
        });
        self.state = DragState::Armed(session);
        outputs
    }

    /// Vertex handles first, then the front-most item, then edge midpoints.
    fn pick(&self, point: Point, model: &LayoutModel) -> Option<DragSession> {
        let room = model.room();
        if let Some(handle) = hit_test_vertex(room, point, self.handle_tolerance) {
            return Some(Self::handle_session(handle.kind, handle.position));
        }

        let item = model
            .items_at_point(point)
            .into_iter()
            .next()
            .and_then(|id| model.item(id));
        if let Some(item) = item {
            return Some(DragSession::new(DragSubject::Item(item.id()), item.position, item.half_extents()));
        }

        hit_test_midpoint(room, point, self.handle_tolerance).map(|handle| Self::handle_session(handle.kind, handle.position))
    }

    fn handle_session(kind: RoomHandleKind, position: Point) -> DragSession {
        let subject = match kind {
            RoomHandleKind::Vertex(i) => DragSubject::Vertex(i),
            RoomHandleKind::EdgeMidpoint(i) => DragSubject::EdgeMidpoint(i),
        };
        DragSession::new(subject, position, Vec2::ZERO)
    }

    fn pointer_move(&mut self, device_position: Point, ctx: &mut DragContext<'_>) -> Option<DragOutput> {
        let session = self.take_session()?;
        let Some(point) = ctx.projector.project(device_position) else {
            // Ray missed the floor; hold the last position.
            self.state = DragState::Dragging(session);
            return None;
        };

        let mut session = session;
        session.live_position = point;
        let output = DragOutput::ObjectMoved {
            subject: session.subject,
            position: point,
            elevation: self.drag_elevation,
        };
        self.state = DragState::Dragging(session);
        Some(output)
    }

    fn pointer_up(&mut self, device_position: Point, ctx: &mut DragContext<'_>) -> LayoutResult<DragOutput> {
        match std::mem::take(&mut self.state) {
            DragState::Idle => Err(LayoutError::DragTargetNotFound),
            DragState::Armed(session) => {
                log::debug!("released {:?} without moving", session.subject);
                Ok(DragOutput::ObjectReleased {
                    subject: session.subject,
                })
            }
            DragState::Dragging(mut session) => {
                if let Some(point) = ctx.projector.project(device_position) {
                    session.live_position = point;
                }
                self.commit(session, ctx)
            }
        }
    }

    /// Abort the active drag, putting the subject back where it started.
    pub fn cancel(&mut self) -> Option<DragOutput> {
        let session = self.take_session()?;
        log::debug!("cancelled drag of {:?}", session.subject);
        Some(DragOutput::ObjectCancelled {
            subject: session.subject,
            restored: session.origin_position,
        })
    }

    fn take_session(&mut self) -> Option<DragSession> {
        match std::mem::take(&mut self.state) {
            DragState::Idle => None,
            DragState::Armed(session) | DragState::Dragging(session) => Some(session),
        }
    }

    /// Snap and write the session's final position. The controller is idle
    /// afterwards whether or not the write succeeded.
    fn commit(&mut self, session: DragSession, ctx: &mut DragContext<'_>) -> LayoutResult<DragOutput> {
        self.state = DragState::Idle;
        let from = session.origin_position;
        let to = match session.subject {
            DragSubject::Item(id) => {
                let snapped = snap_point(session.live_position, self.grid.item_snap, self.grid.cell_size, session.half_extents).point;
                ctx.model.move_item(id, snapped)?;
                snapped
            }
            DragSubject::Vertex(index) => ctx.room.move_vertex(ctx.model, index, session.live_position, &self.grid)?,
            DragSubject::EdgeMidpoint(edge) => {
                let index = ctx.room.insert_vertex(ctx.model, edge, session.live_position, &self.grid)?;
                ctx.model.room().vertex(index).unwrap_or(session.live_position)
            }
        };
        log::debug!("committed {:?}: {:?} -> {:?}", session.subject, from, to);
        Ok(DragOutput::ObjectCommitted {
            subject: session.subject,
            from,
            to,
        })
    }
}
