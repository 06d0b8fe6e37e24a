//! Structural entities: walls, doors, text labels, power points.
//!
//! These are simple positioned entities with their own id namespace in the
//! store. Doors carry no wall association.

use super::EntityId;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A straight wall segment, in real space (meters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: EntityId,
    pub start: Point,
    pub end: Point,
    /// Wall thickness in meters.
    pub thickness: f64,
}

impl Wall {
    pub fn new(start: Point, end: Point, thickness: f64) -> Self {
        Self {
            id: EntityId::new_v4(),
            start,
            end,
            thickness,
        }
    }

    /// Wall length in meters.
    pub fn length(&self) -> f64 {
        (self.end - self.start).hypot()
    }
}

/// A door opening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub id: EntityId,
    /// Hinge-side position in real space (meters).
    pub position: Point,
    /// Opening width in meters.
    pub width: f64,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
}

impl Door {
    pub fn new(position: Point, width: f64) -> Self {
        Self {
            id: EntityId::new_v4(),
            position,
            width,
            rotation: 0.0,
        }
    }
}

/// A free-floating text annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub id: EntityId,
    pub position: Point,
    pub content: String,
    /// Font size in pixels at reference scale.
    pub font_size: f64,
    #[serde(default)]
    pub rotation: f64,
}

impl TextLabel {
    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self {
            id: EntityId::new_v4(),
            position,
            content: content.into(),
            font_size: 16.0,
            rotation: 0.0,
        }
    }
}

/// A power outlet marker, so vendors know where to plug in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerPoint {
    pub id: EntityId,
    pub position: Point,
    /// Optional label, e.g. "DJ booth".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PowerPoint {
    pub fn new(position: Point) -> Self {
        Self {
            id: EntityId::new_v4(),
            position,
            label: None,
        }
    }
}
