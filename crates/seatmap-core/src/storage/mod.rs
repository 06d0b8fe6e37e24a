//! Local persistence for project snapshots.
//!
//! The local store is exclusively owned by the
//! [`ProjectManager`](crate::project::ProjectManager); no other component
//! writes to it. Operations are synchronous because the flush-before-load
//! ordering of a project switch depends on them completing in sequence.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::project::Project;
use crate::store::CanvasSnapshot;
use thiserror::Error;
use uuid::Uuid;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value persistence scoped by project id.
///
/// Stores each project's canvas snapshot, the project list, and the id of the
/// last active project. Absent data is `Ok(None)` / empty, not an error;
/// malformed data surfaces as an error the caller downgrades to "empty
/// project".
pub trait Storage: Send + Sync {
    /// Persist a project's canvas snapshot.
    fn save_snapshot(&self, project_id: Uuid, snapshot: &CanvasSnapshot) -> StorageResult<()>;

    /// Load a project's canvas snapshot, `None` if never saved.
    fn load_snapshot(&self, project_id: Uuid) -> StorageResult<Option<CanvasSnapshot>>;

    /// Delete a project's persisted snapshot. Deleting a missing snapshot is
    /// not an error.
    fn delete_snapshot(&self, project_id: Uuid) -> StorageResult<()>;

    /// Persist the project list.
    fn save_projects(&self, projects: &[Project]) -> StorageResult<()>;

    /// Load the project list, empty if never saved.
    fn load_projects(&self) -> StorageResult<Vec<Project>>;

    /// Persist the last active project id.
    fn save_last_active(&self, project_id: Uuid) -> StorageResult<()>;

    /// Load the last active project id, `None` if never saved.
    fn load_last_active(&self) -> StorageResult<Option<Uuid>>;
}
