//! Entity definitions for the layout canvas.

mod element;
mod structural;

pub use element::{ChairData, Dietary, Element, ElementPatch, TableData};
pub use structural::{Door, PowerPoint, TextLabel, Wall};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for any canvas entity.
pub type EntityId = Uuid;

/// Table shape family, determining the chair placement geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Circular table; chairs on a surrounding circle.
    Round,
    /// Elliptical table; chairs follow the local ellipse radius.
    Oval,
    /// Rectangular table; chairs on the long edges only.
    Rectangular,
    /// Square table; chairs on all four edges.
    Square,
}

/// The kind of a drawable element.
///
/// A tagged union rather than a string tag, so "is this a table" is a typed
/// capability check instead of prefix matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeKind {
    /// Plain rectangular shape (dance floor, stage, buffet, ...).
    Rectangle,
    /// Plain elliptical shape.
    Ellipse,
    /// A table of the given shape family.
    Table {
        #[serde(rename = "table_kind")]
        table: TableKind,
    },
    /// A chair, owned by a table via [`ChairData::parent_table`].
    Chair,
    /// A custom element instantiated from a shape template.
    Custom { template: String },
}

impl ShapeKind {
    /// Whether this element is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, ShapeKind::Table { .. })
    }

    /// Whether this element is a chair.
    pub fn is_chair(&self) -> bool {
        matches!(self, ShapeKind::Chair)
    }

    /// The table shape family, if this element is a table.
    pub fn table_kind(&self) -> Option<TableKind> {
        match self {
            ShapeKind::Table { table } => Some(*table),
            _ => None,
        }
    }
}

/// Serializable RGBA8 color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }
}

/// Fill and stroke styling shared by all drawable elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    /// Fill color (None = no fill).
    pub fill: Option<Rgba>,
    /// Stroke color.
    pub stroke: Rgba,
    /// Stroke width in pixels.
    pub stroke_width: f64,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            fill: Some(Rgba::white()),
            stroke: Rgba::black(),
            stroke_width: 1.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_kind_capabilities() {
        let table = ShapeKind::Table {
            table: TableKind::Round,
        };
        assert!(table.is_table());
        assert!(!table.is_chair());
        assert_eq!(table.table_kind(), Some(TableKind::Round));

        assert!(ShapeKind::Chair.is_chair());
        assert_eq!(ShapeKind::Rectangle.table_kind(), None);
        assert!(
            !ShapeKind::Custom {
                template: "arch".into()
            }
            .is_table()
        );
    }

    #[test]
    fn test_shape_kind_serde_tag() {
        let kind = ShapeKind::Table {
            table: TableKind::Oval,
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert!(json.contains("\"kind\":\"table\""), "got {json}");
        let back: ShapeKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }
}
