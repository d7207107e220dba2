//! Canonical layout model shared by the floor and room views.

mod item;
mod polygon;

pub use item::{AssetKind, FurnitureItem, ItemId};
pub use polygon::{signed_area, validate as validate_polygon, RoomAreaPolygon, DEFAULT_ROOM_SIDE};

use crate::error::{LayoutError, LayoutResult, PolygonError};
use kurbo::Point;
use std::collections::HashMap;

/// Change notification emitted after every model write.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent {
    ItemAdded(ItemId),
    ItemRemoved(ItemId),
    ItemMoved { id: ItemId, from: Point, to: Point },
    ItemsReordered,
    RoomAreaChanged,
}

/// The single source of truth for one editing session.
///
/// Items are keyed by their stable id; `order` keeps the list order the
/// views iterate in. Every mutation bumps the revision and queues a
/// [`LayoutEvent`] before returning.
#[derive(Debug, Clone)]
pub struct LayoutModel {
    room: RoomAreaPolygon,
    items: HashMap<ItemId, FurnitureItem>,
    order: Vec<ItemId>,
    revision: u64,
    events: Vec<LayoutEvent>,
}

impl Default for LayoutModel {
    /// The starting layout: five units in a row inside a square room.
    fn default() -> Self {
        let mut model = Self::new(RoomAreaPolygon::default());
        let kinds = [
            ("triple", false),
            ("oven", true),
            ("default", false),
            ("default", false),
            ("triple", false),
        ];
        for (i, (kind, composite)) in kinds.into_iter().enumerate() {
            model.add_item(kind, Point::new(i as f64 + 0.5, 0.5), composite);
        }
        model.events.clear();
        model.revision = 0;
        model
    }
}

impl LayoutModel {
    /// Create an empty layout inside the given room.
    pub fn new(room: RoomAreaPolygon) -> Self {
        Self {
            room,
            items: HashMap::new(),
            order: Vec::new(),
            revision: 0,
            events: Vec::new(),
        }
    }

    fn notify(&mut self, event: LayoutEvent) {
        self.revision += 1;
        log::debug!("layout r{}: {:?}", self.revision, event);
        self.events.push(event);
    }

    /// Monotonic counter bumped on every write.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Take all pending change notifications.
    pub fn drain_events(&mut self) -> Vec<LayoutEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Create an item and append it to the list.
    pub fn add_item(&mut self, kind: impl Into<AssetKind>, position: Point, is_composite: bool) -> ItemId {
        let item = FurnitureItem::new(kind, position).with_composite(is_composite);
        let id = item.id();
        self.order.push(id);
        self.items.insert(id, item);
        self.notify(LayoutEvent::ItemAdded(id));
        id
    }

    /// Append a fully built item.
    pub fn add_furniture(&mut self, item: FurnitureItem) -> LayoutResult<ItemId> {
        let id = item.id();
        if self.items.contains_key(&id) {
            return Err(LayoutError::DuplicateItem(id));
        }
        self.order.push(id);
        self.items.insert(id, item);
        self.notify(LayoutEvent::ItemAdded(id));
        Ok(id)
    }

    pub fn remove_item(&mut self, id: ItemId) -> LayoutResult<FurnitureItem> {
        let item = self.items.remove(&id).ok_or(LayoutError::ItemNotFound(id))?;
        self.order.retain(|&item_id| item_id != id);
        self.notify(LayoutEvent::ItemRemoved(id));
        Ok(item)
    }

    pub fn item(&self, id: ItemId) -> Option<&FurnitureItem> {
        self.items.get(&id)
    }

    /// Items in list order.
    pub fn items(&self) -> impl Iterator<Item = &FurnitureItem> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    /// Items sorted by ascending x; ties keep list order.
    pub fn items_by_x(&self) -> Vec<&FurnitureItem> {
        let mut items: Vec<_> = self.items().collect();
        items.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
        items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look an item up by asset kind. Fails when the kind is not unique.
    pub fn find_by_kind(&self, kind: &AssetKind) -> LayoutResult<&FurnitureItem> {
        let matches: Vec<_> = self.items().filter(|item| &item.kind == kind).collect();
        match matches.as_slice() {
            [item] => Ok(*item),
            [] => Err(LayoutError::KindNotFound(kind.clone())),
            _ => Err(LayoutError::IdentityAmbiguity {
                kind: kind.clone(),
                count: matches.len(),
            }),
        }
    }

    /// Items whose footprint contains `point`, front-most (last in list) first.
    pub fn items_at_point(&self, point: Point) -> Vec<ItemId> {
        self.order
            .iter()
            .rev()
            .filter(|id| self.items.get(id).is_some_and(|item| item.hit_test(point)))
            .copied()
            .collect()
    }

    /// Swap the list positions of two items.
    pub fn swap_items(&mut self, a: ItemId, b: ItemId) -> LayoutResult<()> {
        let pos_a = self.position_of(a)?;
        let pos_b = self.position_of(b)?;
        if pos_a != pos_b {
            self.order.swap(pos_a, pos_b);
            self.notify(LayoutEvent::ItemsReordered);
        }
        Ok(())
    }

    fn position_of(&self, id: ItemId) -> LayoutResult<usize> {
        self.order
            .iter()
            .position(|&item_id| item_id == id)
            .ok_or(LayoutError::ItemNotFound(id))
    }

    /// Write a new center position for an item, by stable id.
    pub(crate) fn move_item(&mut self, id: ItemId, position: Point) -> LayoutResult<()> {
        let item = self.items.get_mut(&id).ok_or(LayoutError::ItemNotFound(id))?;
        let from = item.position;
        item.position = position;
        self.notify(LayoutEvent::ItemMoved { id, from, to: position });
        Ok(())
    }

    pub fn room(&self) -> &RoomAreaPolygon {
        &self.room
    }

    pub(crate) fn set_vertex(&mut self, index: usize, point: Point) -> Result<(), PolygonError> {
        self.room = self.room.with_vertex(index, point)?;
        self.notify(LayoutEvent::RoomAreaChanged);
        Ok(())
    }

    pub(crate) fn insert_vertex(&mut self, index: usize, point: Point) -> Result<(), PolygonError> {
        self.room = self.room.with_inserted(index, point)?;
        self.notify(LayoutEvent::RoomAreaChanged);
        Ok(())
    }

    pub(crate) fn remove_vertex(&mut self, index: usize) -> Result<Point, PolygonError> {
        let removed = self.room.vertex(index);
        self.room = self.room.with_removed(index)?;
        self.notify(LayoutEvent::RoomAreaChanged);
        // with_removed already rejected a bad index
        Ok(removed.unwrap_or_default())
    }
}
