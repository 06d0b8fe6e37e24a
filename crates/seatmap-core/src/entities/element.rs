//! Drawable elements: shapes, tables, chairs, custom template instances.

use super::{ElementStyle, EntityId, ShapeKind};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Dietary requirement recorded against a seated guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dietary {
    #[default]
    Standard,
    Vegetarian,
    Vegan,
    GlutenFree,
    Kosher,
    Halal,
}

/// Table payload: seat bookkeeping for a table element.
///
/// Invariant: once generation completes, `chair_ids.len() == seats` and every
/// listed id exists as a chair element whose [`ChairData::parent_table`] points
/// back at this table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    /// Human-readable size, e.g. "180 cm".
    pub size_label: String,
    /// Number of seats at this table.
    pub seats: usize,
    /// Physical size in meters (diameter or long side).
    pub actual_size_m: f64,
    /// Ids of the generated chair elements, in seat order.
    pub chair_ids: Vec<EntityId>,
}

/// Chair payload: ownership and guest assignment for a chair element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChairData {
    /// The table this chair belongs to.
    pub parent_table: EntityId,
    /// 0-based seat position, unique within the table.
    pub seat_index: usize,
    /// Assigned guest id, if any.
    pub guest_id: Option<String>,
    /// Assigned guest display name.
    pub guest_name: Option<String>,
    /// Guest dietary requirement.
    pub dietary: Option<Dietary>,
}

impl ChairData {
    /// Create an unassigned chair for a seat at the given table.
    pub fn new(parent_table: EntityId, seat_index: usize) -> Self {
        Self {
            parent_table,
            seat_index,
            guest_id: None,
            guest_name: None,
            dietary: None,
        }
    }
}

/// A drawable unit on the layout canvas.
///
/// Position and size are in real space (meters); rotation is in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: EntityId,
    #[serde(flatten)]
    pub kind: ShapeKind,
    /// Top-left corner in real space (meters).
    pub position: Point,
    /// Width in meters.
    pub width: f64,
    /// Height in meters.
    pub height: f64,
    /// Rotation in degrees around the element center.
    #[serde(default)]
    pub rotation: f64,
    pub style: ElementStyle,
    /// Present when `kind` is a table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableData>,
    /// Present when `kind` is a chair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chair: Option<ChairData>,
    /// SVG path data for custom template shapes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_path: Option<String>,
}

impl Element {
    /// Create a new element with a fresh id.
    pub fn new(kind: ShapeKind, position: Point, width: f64, height: f64) -> Self {
        Self {
            id: EntityId::new_v4(),
            kind,
            position,
            width,
            height,
            rotation: 0.0,
            style: ElementStyle::default(),
            table: None,
            chair: None,
            custom_path: None,
        }
    }

    /// Center of the element in real space.
    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.width / 2.0,
            self.position.y + self.height / 2.0,
        )
    }

    /// Axis-aligned bounds in real space, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }
}

/// Partial update for an element; only present fields are applied.
///
/// Merged tolerantly so a stale update racing a concurrent removal is a no-op
/// rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPatch {
    pub position: Option<Point>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub style: Option<ElementStyle>,
    /// Guest assignment for chair elements: `(guest_id, guest_name, dietary)`.
    pub guest: Option<(Option<String>, Option<String>, Option<Dietary>)>,
    /// Replacement chair id list for table elements. Used by the generators,
    /// which only learn the chair ids after creating the chairs.
    pub table_chairs: Option<Vec<EntityId>>,
}

impl ElementPatch {
    /// A patch that moves the element.
    pub fn move_to(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// A patch that assigns a guest to a chair.
    pub fn assign_guest(id: impl Into<String>, name: impl Into<String>, dietary: Dietary) -> Self {
        Self {
            guest: Some((Some(id.into()), Some(name.into()), Some(dietary))),
            ..Self::default()
        }
    }

    /// Apply this patch to an element.
    pub fn apply(&self, element: &mut Element) {
        if let Some(position) = self.position {
            element.position = position;
        }
        if let Some(width) = self.width {
            element.width = width;
        }
        if let Some(height) = self.height {
            element.height = height;
        }
        if let Some(rotation) = self.rotation {
            element.rotation = rotation;
        }
        if let Some(style) = self.style {
            element.style = style;
        }
        if let Some((guest_id, guest_name, dietary)) = &self.guest {
            if let Some(chair) = element.chair.as_mut() {
                chair.guest_id = guest_id.clone();
                chair.guest_name = guest_name.clone();
                chair.dietary = *dietary;
            }
        }
        if let Some(chair_ids) = &self.table_chairs {
            if let Some(table) = element.table.as_mut() {
                table.chair_ids = chair_ids.clone();
            }
        }
    }
}
