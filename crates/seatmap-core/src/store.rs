//! Canvas entity store: the normalized scene graph of one active project.

use crate::entities::{Door, Element, ElementPatch, EntityId, PowerPoint, TextLabel, Wall};
use crate::sync::{RemoteLayoutId, SyncStatus};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Serializable state of one project's scene graph.
///
/// The serialization boundary: entities are stored as ordered arrays (the
/// order is the paint order), converted from the store's keyed-map-plus-order
/// representation by [`CanvasEntityStore::canvas_data`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasSnapshot {
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub walls: Vec<Wall>,
    #[serde(default)]
    pub doors: Vec<Door>,
    #[serde(default)]
    pub texts: Vec<TextLabel>,
    #[serde(default)]
    pub power_points: Vec<PowerPoint>,
    /// Visible region in real space (meters).
    #[serde(default)]
    pub view_box: Rect,
    /// Remote layout id from the last successful background sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_layout_id: Option<RemoteLayoutId>,
}

impl CanvasSnapshot {
    /// Serialize to pretty JSON for persistence.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Mutable per-project scene graph.
///
/// Owns the entities of exactly one project at a time. Entities live in keyed
/// maps with parallel order lists (insertion order = paint order). Project
/// isolation is guaranteed by [`initialize_project`](Self::initialize_project)
/// being a full replace, never a merge.
#[derive(Debug)]
pub struct CanvasEntityStore {
    active_project: Option<Uuid>,
    /// Physical bounds of the active project's room, in meters.
    bounds: Rect,
    view_box: Rect,

    elements: HashMap<EntityId, Element>,
    element_order: Vec<EntityId>,
    walls: HashMap<EntityId, Wall>,
    wall_order: Vec<EntityId>,
    doors: HashMap<EntityId, Door>,
    door_order: Vec<EntityId>,
    texts: HashMap<EntityId, TextLabel>,
    text_order: Vec<EntityId>,
    power_points: HashMap<EntityId, PowerPoint>,
    power_point_order: Vec<EntityId>,

    remote_layout_id: Option<RemoteLayoutId>,
    sync_status: SyncStatus,
    /// Set by every mutating operation, cleared when the project is flushed.
    dirty: bool,
}

impl CanvasEntityStore {
    /// Create an empty store with the given physical bounds.
    pub fn new(bounds: Rect) -> Self {
        Self {
            active_project: None,
            bounds,
            view_box: bounds,
            elements: HashMap::new(),
            element_order: Vec::new(),
            walls: HashMap::new(),
            wall_order: Vec::new(),
            doors: HashMap::new(),
            door_order: Vec::new(),
            texts: HashMap::new(),
            text_order: Vec::new(),
            power_points: HashMap::new(),
            power_point_order: Vec::new(),
            remote_layout_id: None,
            sync_status: SyncStatus::Idle,
            dirty: false,
        }
    }

    /// The project currently loaded into this store.
    pub fn active_project(&self) -> Option<Uuid> {
        self.active_project
    }

    /// Physical bounds of the active project's room, in meters.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Current visible region in real space.
    pub fn view_box(&self) -> Rect {
        self.view_box
    }

    pub fn set_view_box(&mut self, view_box: Rect) {
        self.view_box = view_box;
        self.dirty = true;
    }

    // --- elements ------------------------------------------------------

    /// Add an element, returning its id so callers can wire up references.
    pub fn add_element(&mut self, element: Element) -> EntityId {
        let id = element.id;
        if self.elements.insert(id, element).is_none() {
            self.element_order.push(id);
        }
        self.dirty = true;
        id
    }

    /// Get an element by id.
    pub fn element(&self, id: EntityId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Merge a partial update into an element.
    ///
    /// Unknown ids are a no-op (an update can race a concurrent removal).
    /// Returns whether the patch was applied.
    pub fn update_element(&mut self, id: EntityId, patch: &ElementPatch) -> bool {
        match self.elements.get_mut(&id) {
            Some(element) => {
                patch.apply(element);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Remove an element, cascading to dependent chairs.
    ///
    /// Removing a table removes every chair listed in its `chair_ids`;
    /// removing a chair unlinks it from its parent table's `chair_ids`.
    /// Unknown ids are a no-op.
    pub fn remove_element(&mut self, id: EntityId) -> Option<Element> {
        let removed = self.elements.remove(&id)?;
        self.element_order.retain(|&e| e != id);
        self.dirty = true;

        if let Some(table) = &removed.table {
            for chair_id in &table.chair_ids {
                if self.elements.remove(chair_id).is_some() {
                    self.element_order.retain(|e| e != chair_id);
                }
            }
        }

        if let Some(chair) = &removed.chair {
            if let Some(parent) = self.elements.get_mut(&chair.parent_table) {
                if let Some(table) = parent.table.as_mut() {
                    table.chair_ids.retain(|&c| c != id);
                }
            }
        }

        Some(removed)
    }

    /// Elements in paint order (back to front).
    pub fn elements_ordered(&self) -> impl Iterator<Item = &Element> {
        self.element_order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Number of elements in the store.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Move an element to the top of the paint order.
    pub fn bring_to_front(&mut self, id: EntityId) {
        if self.elements.contains_key(&id) {
            self.element_order.retain(|&e| e != id);
            self.element_order.push(id);
            self.dirty = true;
        }
    }

    /// Move an element to the bottom of the paint order.
    pub fn send_to_back(&mut self, id: EntityId) {
        if self.elements.contains_key(&id) {
            self.element_order.retain(|&e| e != id);
            self.element_order.insert(0, id);
            self.dirty = true;
        }
    }

    /// Chairs whose parent table no longer exists.
    ///
    /// Always empty if the cascade invariant holds; exposed for integrity
    /// checks.
    pub fn orphaned_chairs(&self) -> Vec<EntityId> {
        self.elements
            .values()
            .filter_map(|e| {
                let chair = e.chair.as_ref()?;
                (!self.elements.contains_key(&chair.parent_table)).then_some(e.id)
            })
            .collect()
    }

    // --- structural entities -------------------------------------------

    pub fn add_wall(&mut self, wall: Wall) -> EntityId {
        let id = wall.id;
        if self.walls.insert(id, wall).is_none() {
            self.wall_order.push(id);
        }
        self.dirty = true;
        id
    }

    pub fn wall(&self, id: EntityId) -> Option<&Wall> {
        self.walls.get(&id)
    }

    /// Mutable access for updates; `None` for unknown ids, never an error.
    pub fn wall_mut(&mut self, id: EntityId) -> Option<&mut Wall> {
        let wall = self.walls.get_mut(&id);
        if wall.is_some() {
            self.dirty = true;
        }
        wall
    }

    pub fn remove_wall(&mut self, id: EntityId) -> Option<Wall> {
        let removed = self.walls.remove(&id)?;
        self.wall_order.retain(|&e| e != id);
        self.dirty = true;
        Some(removed)
    }

    pub fn walls_ordered(&self) -> impl Iterator<Item = &Wall> {
        self.wall_order.iter().filter_map(|id| self.walls.get(id))
    }

    pub fn add_door(&mut self, door: Door) -> EntityId {
        let id = door.id;
        if self.doors.insert(id, door).is_none() {
            self.door_order.push(id);
        }
        self.dirty = true;
        id
    }

    pub fn door(&self, id: EntityId) -> Option<&Door> {
        self.doors.get(&id)
    }

    pub fn door_mut(&mut self, id: EntityId) -> Option<&mut Door> {
        let door = self.doors.get_mut(&id);
        if door.is_some() {
            self.dirty = true;
        }
        door
    }

    pub fn remove_door(&mut self, id: EntityId) -> Option<Door> {
        let removed = self.doors.remove(&id)?;
        self.door_order.retain(|&e| e != id);
        self.dirty = true;
        Some(removed)
    }

    pub fn doors_ordered(&self) -> impl Iterator<Item = &Door> {
        self.door_order.iter().filter_map(|id| self.doors.get(id))
    }

    pub fn add_text(&mut self, text: TextLabel) -> EntityId {
        let id = text.id;
        if self.texts.insert(id, text).is_none() {
            self.text_order.push(id);
        }
        self.dirty = true;
        id
    }

    pub fn text(&self, id: EntityId) -> Option<&TextLabel> {
        self.texts.get(&id)
    }

    pub fn text_mut(&mut self, id: EntityId) -> Option<&mut TextLabel> {
        let text = self.texts.get_mut(&id);
        if text.is_some() {
            self.dirty = true;
        }
        text
    }

    pub fn remove_text(&mut self, id: EntityId) -> Option<TextLabel> {
        let removed = self.texts.remove(&id)?;
        self.text_order.retain(|&e| e != id);
        self.dirty = true;
        Some(removed)
    }

    pub fn texts_ordered(&self) -> impl Iterator<Item = &TextLabel> {
        self.text_order.iter().filter_map(|id| self.texts.get(id))
    }

    pub fn add_power_point(&mut self, power_point: PowerPoint) -> EntityId {
        let id = power_point.id;
        if self.power_points.insert(id, power_point).is_none() {
            self.power_point_order.push(id);
        }
        self.dirty = true;
        id
    }

    pub fn power_point(&self, id: EntityId) -> Option<&PowerPoint> {
        self.power_points.get(&id)
    }

    pub fn power_point_mut(&mut self, id: EntityId) -> Option<&mut PowerPoint> {
        let power_point = self.power_points.get_mut(&id);
        if power_point.is_some() {
            self.dirty = true;
        }
        power_point
    }

    pub fn remove_power_point(&mut self, id: EntityId) -> Option<PowerPoint> {
        let removed = self.power_points.remove(&id)?;
        self.power_point_order.retain(|&e| e != id);
        self.dirty = true;
        Some(removed)
    }

    pub fn power_points_ordered(&self) -> impl Iterator<Item = &PowerPoint> {
        self.power_point_order
            .iter()
            .filter_map(|id| self.power_points.get(id))
    }

    /// Whether the store holds no entities at all.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
            && self.walls.is_empty()
            && self.doors.is_empty()
            && self.texts.is_empty()
            && self.power_points.is_empty()
    }

    // --- serialization boundary ----------------------------------------

    /// Snapshot the scene graph as ordered arrays for persistence.
    pub fn canvas_data(&self) -> CanvasSnapshot {
        CanvasSnapshot {
            elements: self.elements_ordered().cloned().collect(),
            walls: self.walls_ordered().cloned().collect(),
            doors: self.doors_ordered().cloned().collect(),
            texts: self.texts_ordered().cloned().collect(),
            power_points: self.power_points_ordered().cloned().collect(),
            view_box: self.view_box,
            remote_layout_id: self.remote_layout_id.clone(),
        }
    }

    /// Replace the entire store contents with another project's state.
    ///
    /// A full replace, never a merge: entities of the previous project can
    /// never leak into the newly initialized one. `None` loads an empty
    /// project.
    pub fn initialize_project(
        &mut self,
        project_id: Uuid,
        bounds: Rect,
        snapshot: Option<CanvasSnapshot>,
    ) {
        let snapshot = snapshot.unwrap_or_default();

        self.active_project = Some(project_id);
        self.bounds = bounds;
        self.view_box = if snapshot.view_box.is_zero_area() {
            bounds
        } else {
            snapshot.view_box
        };
        self.remote_layout_id = snapshot.remote_layout_id;
        self.sync_status = SyncStatus::Idle;
        self.dirty = false;

        self.elements.clear();
        self.element_order.clear();
        for element in snapshot.elements {
            self.element_order.push(element.id);
            self.elements.insert(element.id, element);
        }

        self.walls.clear();
        self.wall_order.clear();
        for wall in snapshot.walls {
            self.wall_order.push(wall.id);
            self.walls.insert(wall.id, wall);
        }

        self.doors.clear();
        self.door_order.clear();
        for door in snapshot.doors {
            self.door_order.push(door.id);
            self.doors.insert(door.id, door);
        }

        self.texts.clear();
        self.text_order.clear();
        for text in snapshot.texts {
            self.text_order.push(text.id);
            self.texts.insert(text.id, text);
        }

        self.power_points.clear();
        self.power_point_order.clear();
        for power_point in snapshot.power_points {
            self.power_point_order.push(power_point.id);
            self.power_points.insert(power_point.id, power_point);
        }
    }

    // --- sync metadata -------------------------------------------------

    pub fn sync_status(&self) -> SyncStatus {
        self.sync_status
    }

    /// Updated from background sync events; never blocks editing.
    pub fn set_sync_status(&mut self, status: SyncStatus) {
        self.sync_status = status;
    }

    pub fn remote_layout_id(&self) -> Option<&RemoteLayoutId> {
        self.remote_layout_id.as_ref()
    }

    pub fn set_remote_layout_id(&mut self, id: Option<RemoteLayoutId>) {
        self.remote_layout_id = id;
    }

    /// Whether there are edits not yet flushed to local storage.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Called after a flush.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}
