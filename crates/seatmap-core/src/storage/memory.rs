//! In-memory storage implementation.

use super::{Storage, StorageError, StorageResult};
use crate::project::Project;
use crate::store::CanvasSnapshot;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    snapshots: RwLock<HashMap<Uuid, CanvasSnapshot>>,
    projects: RwLock<Vec<Project>>,
    last_active: RwLock<Option<Uuid>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_err<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Other(format!("lock error: {e}"))
}

impl Storage for MemoryStorage {
    fn save_snapshot(&self, project_id: Uuid, snapshot: &CanvasSnapshot) -> StorageResult<()> {
        let mut snapshots = self.snapshots.write().map_err(lock_err)?;
        snapshots.insert(project_id, snapshot.clone());
        Ok(())
    }

    fn load_snapshot(&self, project_id: Uuid) -> StorageResult<Option<CanvasSnapshot>> {
        let snapshots = self.snapshots.read().map_err(lock_err)?;
        Ok(snapshots.get(&project_id).cloned())
    }

    fn delete_snapshot(&self, project_id: Uuid) -> StorageResult<()> {
        let mut snapshots = self.snapshots.write().map_err(lock_err)?;
        snapshots.remove(&project_id);
        Ok(())
    }

    fn save_projects(&self, projects: &[Project]) -> StorageResult<()> {
        let mut stored = self.projects.write().map_err(lock_err)?;
        *stored = projects.to_vec();
        Ok(())
    }

    fn load_projects(&self) -> StorageResult<Vec<Project>> {
        let stored = self.projects.read().map_err(lock_err)?;
        Ok(stored.clone())
    }

    fn save_last_active(&self, project_id: Uuid) -> StorageResult<()> {
        let mut last = self.last_active.write().map_err(lock_err)?;
        *last = Some(project_id);
        Ok(())
    }

    fn load_last_active(&self) -> StorageResult<Option<Uuid>> {
        let last = self.last_active.read().map_err(lock_err)?;
        Ok(*last)
    }
}
