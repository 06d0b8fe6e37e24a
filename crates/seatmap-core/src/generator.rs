//! Procedural table and chair placement.
//!
//! Given a table shape, size, seat count and quantity, the generator creates
//! table elements plus their chairs in the store, deterministically and
//! without overlap. Wiring is three-step by necessity: the table element is
//! created first so its id exists, chairs are created referencing it, and
//! only then is the table's `chair_ids` list patched in, since chair ids are
//! unknown until the chairs exist.

use crate::entities::{ChairData, Element, ElementPatch, EntityId, ShapeKind, TableData, TableKind};
use crate::scale::round_to_precision;
use crate::store::CanvasEntityStore;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

/// Tables per row when placing a batch.
pub const MAX_TABLES_PER_ROW: usize = 4;

/// Chair footprint, in meters.
pub const CHAIR_SIZE_M: f64 = 0.45;

/// Gap between a table edge and the chair edge, in meters.
pub const CHAIR_CLEARANCE_M: f64 = 0.1;

/// Aisle between neighboring table cells, in meters.
pub const TABLE_SPACING_M: f64 = 1.0;

/// Generated table centers are kept on a millimeter lattice so regenerating
/// the same request yields byte-identical snapshots.
const PLACEMENT_PRECISION_M: f64 = 0.001;

/// Unit of a requested table size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Cm,
    M,
}

/// Requested table dimensions.
///
/// Round tables read `width` as the diameter, square tables as the side
/// length; oval and rectangular tables use both dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeSpec {
    pub width: f64,
    pub depth: f64,
    pub unit: Unit,
}

impl SizeSpec {
    pub fn new(width: f64, depth: f64, unit: Unit) -> Self {
        Self { width, depth, unit }
    }

    /// A size with equal width and depth (round diameter, square side).
    pub fn uniform(size: f64, unit: Unit) -> Self {
        Self::new(size, size, unit)
    }

    /// Normalize to meters.
    fn to_meters(self) -> (f64, f64) {
        match self.unit {
            Unit::Cm => (self.width / 100.0, self.depth / 100.0),
            Unit::M => (self.width, self.depth),
        }
    }

    /// Display label in the requested unit, e.g. "180 cm" or "1.8 × 0.9 m".
    fn label(self) -> String {
        let unit = match self.unit {
            Unit::Cm => "cm",
            Unit::M => "m",
        };
        if (self.width - self.depth).abs() < f64::EPSILON {
            format!("{} {unit}", self.width)
        } else {
            format!("{} × {} {unit}", self.width, self.depth)
        }
    }
}

/// A batch of tables to generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRequest {
    pub kind: TableKind,
    pub size: SizeSpec,
    pub seats: usize,
    pub quantity: usize,
}

/// Rejected generator input. Nothing is added to the store on error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeneratorError {
    #[error("table size must be positive, got {0} × {1} m")]
    NonPositiveSize(f64, f64),
    #[error("seat count must be at least 1")]
    ZeroSeats,
    #[error("quantity must be at least 1")]
    ZeroQuantity,
}

/// Generate `quantity` tables with chairs, arranged in a grid of up to
/// [`MAX_TABLES_PER_ROW`] per row and centered on the store's bounds center.
///
/// Returns the ids of the created table elements.
pub fn generate(
    store: &mut CanvasEntityStore,
    request: &TableRequest,
) -> Result<Vec<EntityId>, GeneratorError> {
    let (width_m, depth_m) = request.size.to_meters();

    // Validate everything before the first store mutation, so a rejected
    // request never leaves partial generation behind.
    if width_m <= 0.0 || depth_m <= 0.0 {
        return Err(GeneratorError::NonPositiveSize(width_m, depth_m));
    }
    if request.seats == 0 {
        return Err(GeneratorError::ZeroSeats);
    }
    if request.quantity == 0 {
        return Err(GeneratorError::ZeroQuantity);
    }

    // Footprint of one table including its chair ring, plus aisle spacing.
    let chair_ring = 2.0 * (CHAIR_CLEARANCE_M + CHAIR_SIZE_M);
    let cell_w = width_m + chair_ring + TABLE_SPACING_M;
    let cell_h = depth_m + chair_ring + TABLE_SPACING_M;

    let items_per_row = request.quantity.min(MAX_TABLES_PER_ROW);
    let rows = request.quantity.div_ceil(items_per_row);
    let block_center = store.bounds().center();

    log::debug!(
        "generating {} {:?} table(s), {} seats each, {} per row",
        request.quantity,
        request.kind,
        request.seats,
        items_per_row
    );

    let mut table_ids = Vec::with_capacity(request.quantity);
    for index in 0..request.quantity {
        let col = index % items_per_row;
        let row = index / items_per_row;
        let center = Point::new(
            round_to_precision(
                block_center.x + (col as f64 - (items_per_row - 1) as f64 / 2.0) * cell_w,
                PLACEMENT_PRECISION_M,
            ),
            round_to_precision(
                block_center.y + (row as f64 - (rows - 1) as f64 / 2.0) * cell_h,
                PLACEMENT_PRECISION_M,
            ),
        );
        table_ids.push(generate_one(store, request, center, width_m, depth_m));
    }
    Ok(table_ids)
}

/// Create one table and its chairs, centered at `center` (meters).
fn generate_one(
    store: &mut CanvasEntityStore,
    request: &TableRequest,
    center: Point,
    width_m: f64,
    depth_m: f64,
) -> EntityId {
    // Step 1: the table itself, so its id is available for the chairs.
    let mut table = Element::new(
        ShapeKind::Table {
            table: request.kind,
        },
        Point::new(center.x - width_m / 2.0, center.y - depth_m / 2.0),
        width_m,
        depth_m,
    );
    table.table = Some(TableData {
        size_label: request.size.label(),
        seats: request.seats,
        actual_size_m: width_m.max(depth_m),
        chair_ids: Vec::new(),
    });
    let table_id = store.add_element(table);

    // Step 2: chairs referencing the table.
    let placements = match request.kind {
        TableKind::Round => round_chair_placements(center, width_m, request.seats),
        TableKind::Oval => oval_chair_placements(center, width_m, depth_m, request.seats),
        TableKind::Rectangular => rect_chair_placements(center, width_m, depth_m, request.seats),
        TableKind::Square => square_chair_placements(center, width_m, request.seats),
    };

    let mut chair_ids = Vec::with_capacity(placements.len());
    for (seat_index, placement) in placements.into_iter().enumerate() {
        let mut chair = Element::new(
            ShapeKind::Chair,
            Point::new(
                placement.center.x - CHAIR_SIZE_M / 2.0,
                placement.center.y - CHAIR_SIZE_M / 2.0,
            ),
            CHAIR_SIZE_M,
            CHAIR_SIZE_M,
        );
        chair.rotation = placement.rotation;
        chair.chair = Some(ChairData::new(table_id, seat_index));
        chair_ids.push(store.add_element(chair));
    }

    // Step 3: back-patch the complete chair list onto the table.
    store.update_element(
        table_id,
        &ElementPatch {
            table_chairs: Some(chair_ids),
            ..ElementPatch::default()
        },
    );

    table_id
}

/// Chair center and facing rotation, in meters / degrees.
struct ChairPlacement {
    center: Point,
    rotation: f64,
}

/// Distance from table center to chair center for a table edge at `edge_radius`.
fn chair_radius(edge_radius: f64) -> f64 {
    edge_radius + CHAIR_CLEARANCE_M + CHAIR_SIZE_M / 2.0
}

/// Seat angle: equally spaced, seat 0 at the top (-90°), clockwise.
fn seat_angle(seat: usize, seats: usize) -> f64 {
    (seat as f64 / seats as f64) * 2.0 * PI - PI / 2.0
}

/// Round table: chairs on a circle around the table.
fn round_chair_placements(center: Point, diameter: f64, seats: usize) -> Vec<ChairPlacement> {
    let radius = chair_radius(diameter / 2.0);
    (0..seats)
        .map(|seat| {
            let angle = seat_angle(seat, seats);
            ChairPlacement {
                center: Point::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                ),
                // Face the table center.
                rotation: angle.to_degrees() + 90.0,
            }
        })
        .collect()
}

/// Oval table: chairs at the local ellipse radius for each seat angle.
///
/// Using the local radius `r(θ) = 1 / sqrt((cosθ/rx)² + (sinθ/ry)²)` keeps
/// the chair-to-edge gap uniform; a circular placement at the major radius
/// would cluster chairs unevenly along the major axis.
fn oval_chair_placements(
    center: Point,
    width: f64,
    depth: f64,
    seats: usize,
) -> Vec<ChairPlacement> {
    let rx = width / 2.0;
    let ry = depth / 2.0;
    (0..seats)
        .map(|seat| {
            let angle = seat_angle(seat, seats);
            let local = 1.0 / ((angle.cos() / rx).powi(2) + (angle.sin() / ry).powi(2)).sqrt();
            let radius = chair_radius(local);
            ChairPlacement {
                center: Point::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                ),
                rotation: angle.to_degrees() + 90.0,
            }
        })
        .collect()
}

/// Rectangular table: seats on the top and bottom edges only.
///
/// An odd seat count puts the extra seat on the top edge. Top chairs face
/// down (0°), bottom chairs face up (180°).
fn rect_chair_placements(
    center: Point,
    width: f64,
    depth: f64,
    seats: usize,
) -> Vec<ChairPlacement> {
    let top_count = seats / 2 + seats % 2;
    let bottom_count = seats / 2;
    let offset = chair_radius(depth / 2.0);
    let left = center.x - width / 2.0;

    let mut placements = Vec::with_capacity(seats);
    for i in 0..top_count {
        placements.push(ChairPlacement {
            center: Point::new(
                left + width * (i as f64 + 0.5) / top_count as f64,
                center.y - offset,
            ),
            rotation: 0.0,
        });
    }
    for i in 0..bottom_count {
        placements.push(ChairPlacement {
            center: Point::new(
                left + width * (i as f64 + 0.5) / bottom_count as f64,
                center.y + offset,
            ),
            rotation: 180.0,
        });
    }
    placements
}

/// Square table: seats split across all four edges, remainder distributed one
/// per edge starting at the top so no requested seat is dropped.
///
/// Edge order is top, right, bottom, left; each edge's seats are centered on
/// the edge midpoint.
fn square_chair_placements(center: Point, side: f64, seats: usize) -> Vec<ChairPlacement> {
    let base = seats / 4;
    let remainder = seats % 4;
    let offset = chair_radius(side / 2.0);

    let mut placements = Vec::with_capacity(seats);
    for edge in 0..4 {
        let count = base + usize::from(edge < remainder);
        for i in 0..count {
            // Position along the edge, relative to its midpoint.
            let along = side * (i as f64 + 0.5) / count as f64 - side / 2.0;
            let (chair_center, rotation) = match edge {
                // top
                0 => (Point::new(center.x + along, center.y - offset), 0.0),
                // right
                1 => (Point::new(center.x + offset, center.y + along), 90.0),
                // bottom
                2 => (Point::new(center.x + along, center.y + offset), 180.0),
                // left
                _ => (Point::new(center.x - offset, center.y + along), 270.0),
            };
            placements.push(ChairPlacement {
                center: chair_center,
                rotation,
            });
        }
    }
    placements
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn store() -> CanvasEntityStore {
        let bounds = Rect::new(0.0, 0.0, 20.0, 12.0);
        let mut store = CanvasEntityStore::new(bounds);
        store.initialize_project(Uuid::new_v4(), bounds, None);
        store
    }

    fn chairs_of(store: &CanvasEntityStore, table_id: EntityId) -> Vec<&Element> {
        store
            .element(table_id)
            .and_then(|t| t.table.as_ref())
            .map(|t| {
                t.chair_ids
                    .iter()
                    .map(|&id| store.element(id).expect("chair exists"))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_round_table_eight_seats() {
        let mut store = store();
        let ids = generate(
            &mut store,
            &TableRequest {
                kind: TableKind::Round,
                size: SizeSpec::uniform(180.0, Unit::Cm),
                seats: 8,
                quantity: 1,
            },
        )
        .unwrap();

        assert_eq!(ids.len(), 1);
        assert_eq!(store.element_count(), 9);

        let table = store.element(ids[0]).unwrap();
        assert_eq!(table.kind.table_kind(), Some(TableKind::Round));
        assert!((table.width - 1.8).abs() < 1e-12, "cm not normalized");

        let data = table.table.as_ref().unwrap();
        assert_eq!(data.chair_ids.len(), 8);
        assert_eq!(data.size_label, "180 cm");

        let seat_indices: HashSet<usize> = chairs_of(&store, ids[0])
            .iter()
            .map(|c| c.chair.as_ref().unwrap().seat_index)
            .collect();
        assert_eq!(seat_indices, (0..8).collect::<HashSet<_>>());
    }

    #[test]
    fn test_round_chairs_on_clearance_circle_starting_at_top() {
        let mut store = store();
        let ids = generate(
            &mut store,
            &TableRequest {
                kind: TableKind::Round,
                size: SizeSpec::uniform(1.8, Unit::M),
                seats: 4,
                quantity: 1,
            },
        )
        .unwrap();

        let table_center = store.element(ids[0]).unwrap().center();
        let expected_radius = 0.9 + CHAIR_CLEARANCE_M + CHAIR_SIZE_M / 2.0;

        let chairs = chairs_of(&store, ids[0]);
        for chair in &chairs {
            let d = (chair.center() - table_center).hypot();
            assert!((d - expected_radius).abs() < 1e-9, "radius {d}");
        }

        // Seat 0 sits directly above the center.
        let first = chairs
            .iter()
            .find(|c| c.chair.as_ref().unwrap().seat_index == 0)
            .unwrap();
        assert!((first.center().x - table_center.x).abs() < 1e-9);
        assert!(first.center().y < table_center.y);
    }

    #[test]
    fn test_oval_chairs_follow_local_ellipse_radius() {
        let mut store = store();
        let ids = generate(
            &mut store,
            &TableRequest {
                kind: TableKind::Oval,
                size: SizeSpec::new(2.4, 1.2, Unit::M),
                seats: 6,
                quantity: 1,
            },
        )
        .unwrap();

        let table_center = store.element(ids[0]).unwrap().center();
        let (rx, ry) = (1.2, 0.6);

        for chair in chairs_of(&store, ids[0]) {
            let seat = chair.chair.as_ref().unwrap().seat_index;
            let angle = seat_angle(seat, 6);
            let local = 1.0 / ((angle.cos() / rx).powi(2) + (angle.sin() / ry).powi(2)).sqrt();
            let expected = chair_radius(local);
            let actual = (chair.center() - table_center).hypot();
            assert!(
                (actual - expected).abs() < 1e-9,
                "seat {seat}: {actual} vs {expected}"
            );
        }
    }

    #[test]
    fn test_rectangular_odd_seats_extra_on_top() {
        let mut store = store();
        let ids = generate(
            &mut store,
            &TableRequest {
                kind: TableKind::Rectangular,
                size: SizeSpec::new(1.8, 0.9, Unit::M),
                seats: 5,
                quantity: 1,
            },
        )
        .unwrap();

        let table_center_y = store.element(ids[0]).unwrap().center().y;
        let chairs = chairs_of(&store, ids[0]);
        let top: Vec<_> = chairs
            .iter()
            .filter(|c| c.center().y < table_center_y)
            .collect();
        let bottom: Vec<_> = chairs
            .iter()
            .filter(|c| c.center().y > table_center_y)
            .collect();

        assert_eq!(top.len(), 3);
        assert_eq!(bottom.len(), 2);
        assert!(top.iter().all(|c| c.rotation == 0.0));
        assert!(bottom.iter().all(|c| c.rotation == 180.0));
    }

    #[test]
    fn test_square_eight_seats_two_per_edge() {
        let mut store = store();
        let ids = generate(
            &mut store,
            &TableRequest {
                kind: TableKind::Square,
                size: SizeSpec::uniform(1.2, Unit::M),
                seats: 8,
                quantity: 1,
            },
        )
        .unwrap();

        let mut per_rotation: Vec<usize> = [0.0, 90.0, 180.0, 270.0]
            .iter()
            .map(|&r| {
                chairs_of(&store, ids[0])
                    .iter()
                    .filter(|c| c.rotation == r)
                    .count()
            })
            .collect();
        per_rotation.sort_unstable();
        assert_eq!(per_rotation, vec![2, 2, 2, 2]);
    }

    #[test]
    fn test_square_remainder_seats_not_dropped() {
        let mut store = store();
        let ids = generate(
            &mut store,
            &TableRequest {
                kind: TableKind::Square,
                size: SizeSpec::uniform(1.2, Unit::M),
                seats: 9,
                quantity: 1,
            },
        )
        .unwrap();

        let data = store.element(ids[0]).unwrap().table.as_ref().unwrap();
        assert_eq!(data.chair_ids.len(), 9);

        // Extra seat lands on the top edge.
        let top_count = chairs_of(&store, ids[0])
            .iter()
            .filter(|c| c.rotation == 0.0)
            .count();
        assert_eq!(top_count, 3);
    }

    #[test]
    fn test_batch_grid_four_per_row_centered() {
        let mut store = store();
        let ids = generate(
            &mut store,
            &TableRequest {
                kind: TableKind::Round,
                size: SizeSpec::uniform(1.5, Unit::M),
                seats: 6,
                quantity: 4,
            },
        )
        .unwrap();

        assert_eq!(ids.len(), 4);
        let centers: Vec<Point> = ids
            .iter()
            .map(|&id| store.element(id).unwrap().center())
            .collect();

        // One row of four, so every table sits on the bounds' horizontal
        // centerline and the row is centered on the bounds' center.
        let bounds_center = store.bounds().center();
        for c in &centers {
            assert!((c.y - bounds_center.y).abs() < 1e-9);
        }
        let mean_x = centers.iter().map(|c| c.x).sum::<f64>() / centers.len() as f64;
        assert!((mean_x - bounds_center.x).abs() < 1e-9);
    }

    #[test]
    fn test_batch_wraps_after_four() {
        let mut store = store();
        let ids = generate(
            &mut store,
            &TableRequest {
                kind: TableKind::Square,
                size: SizeSpec::uniform(1.0, Unit::M),
                seats: 4,
                quantity: 5,
            },
        )
        .unwrap();

        let ys: HashSet<i64> = ids
            .iter()
            .map(|&id| (store.element(id).unwrap().center().y * 1000.0).round() as i64)
            .collect();
        assert_eq!(ys.len(), 2, "5 tables should occupy 2 rows");
    }

    #[test]
    fn test_invalid_input_leaves_store_untouched() {
        let mut store = store();
        let base = TableRequest {
            kind: TableKind::Round,
            size: SizeSpec::uniform(1.8, Unit::M),
            seats: 8,
            quantity: 1,
        };

        let zero_size = TableRequest {
            size: SizeSpec::uniform(0.0, Unit::M),
            ..base.clone()
        };
        assert!(matches!(
            generate(&mut store, &zero_size),
            Err(GeneratorError::NonPositiveSize(..))
        ));

        let zero_seats = TableRequest {
            seats: 0,
            ..base.clone()
        };
        assert!(matches!(
            generate(&mut store, &zero_seats),
            Err(GeneratorError::ZeroSeats)
        ));

        let zero_quantity = TableRequest {
            quantity: 0,
            ..base
        };
        assert!(matches!(
            generate(&mut store, &zero_quantity),
            Err(GeneratorError::ZeroQuantity)
        ));

        assert_eq!(store.element_count(), 0);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let request = TableRequest {
            kind: TableKind::Oval,
            size: SizeSpec::new(240.0, 120.0, Unit::Cm),
            seats: 10,
            quantity: 3,
        };

        let mut a = store();
        let mut b = store();
        let ids_a = generate(&mut a, &request).unwrap();
        let ids_b = generate(&mut b, &request).unwrap();

        let positions = |s: &CanvasEntityStore, ids: &[EntityId]| -> Vec<(Point, f64)> {
            ids.iter()
                .flat_map(|&id| {
                    let mut row = vec![(s.element(id).unwrap().center(), 0.0)];
                    row.extend(
                        chairs_of(s, id)
                            .iter()
                            .map(|c| (c.center(), c.rotation)),
                    );
                    row
                })
                .collect()
        };
        assert_eq!(positions(&a, &ids_a), positions(&b, &ids_b));
    }
}
