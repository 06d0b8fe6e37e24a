//! Seatmap Core Library
//!
//! Coordinate and canvas-state engine for the Seatmap floor-plan editor:
//! meters/pixels scale conversion, the normalized per-project entity store,
//! procedural table and chair generation, and the project lifecycle manager
//! that keeps switching synchronous while remote persistence runs in the
//! background.

pub mod entities;
pub mod generator;
pub mod project;
pub mod scale;
pub mod storage;
pub mod store;
pub mod sync;

pub use entities::{
    ChairData, Dietary, Door, Element, ElementPatch, ElementStyle, EntityId, PowerPoint, Rgba,
    ShapeKind, TableData, TableKind, TextLabel, Wall,
};
pub use generator::{GeneratorError, SizeSpec, TableRequest, Unit, generate};
pub use project::{DEFAULT_AUTOSAVE_INTERVAL_SECS, Project, ProjectError, ProjectManager};
pub use scale::{
    GridConfig, MAX_ZOOM, MIN_ZOOM, PIXELS_PER_METER, ScaleState, clamp_zoom, round_to_precision,
    snap_to_grid,
};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use store::{CanvasEntityStore, CanvasSnapshot};
pub use sync::{
    NullRemote, ProjectMeta, RemoteLayoutId, RemoteLayoutStore, RemoteSyncError, SyncDispatcher,
    SyncEvent, SyncStatus,
};
