//! File-based storage implementation.
//!
//! Stores each project's snapshot as a JSON file in a base directory, plus
//! `projects.json` for the project list and `last-active.json` for the last
//! active project id.

use super::{Storage, StorageError, StorageResult};
use crate::project::Project;
use crate::store::CanvasSnapshot;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

const PROJECTS_FILE: &str = "projects.json";
const LAST_ACTIVE_FILE: &str = "last-active.json";

/// File-based storage rooted at a base directory.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("failed to create storage directory: {e}"))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the platform data directory
    /// (`~/.local/share/seatmap/projects` on Linux).
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("could not determine home directory".to_string()))?;
        Self::new(base.join("seatmap").join("projects"))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    fn snapshot_path(&self, project_id: Uuid) -> PathBuf {
        self.base_path.join(format!("{project_id}.json"))
    }

    fn write_json(&self, path: PathBuf, json: String) -> StorageResult<()> {
        fs::write(&path, json)
            .map_err(|e| StorageError::Io(format!("failed to write {}: {e}", path.display())))
    }

    fn read_json(&self, path: PathBuf) -> StorageResult<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StorageError::Io(format!("failed to read {}: {e}", path.display())))
    }
}

impl Storage for FileStorage {
    fn save_snapshot(&self, project_id: Uuid, snapshot: &CanvasSnapshot) -> StorageResult<()> {
        let json = snapshot
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.write_json(self.snapshot_path(project_id), json)
    }

    fn load_snapshot(&self, project_id: Uuid) -> StorageResult<Option<CanvasSnapshot>> {
        let path = self.snapshot_path(project_id);
        match self.read_json(path.clone())? {
            Some(json) => CanvasSnapshot::from_json(&json).map(Some).map_err(|e| {
                StorageError::Serialization(format!("failed to parse {}: {e}", path.display()))
            }),
            None => Ok(None),
        }
    }

    fn delete_snapshot(&self, project_id: Uuid) -> StorageResult<()> {
        let path = self.snapshot_path(project_id);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                StorageError::Io(format!("failed to delete {}: {e}", path.display()))
            })?;
        }
        Ok(())
    }

    fn save_projects(&self, projects: &[Project]) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(projects)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.write_json(self.base_path.join(PROJECTS_FILE), json)
    }

    fn load_projects(&self) -> StorageResult<Vec<Project>> {
        match self.read_json(self.base_path.join(PROJECTS_FILE))? {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                StorageError::Serialization(format!("failed to parse project list: {e}"))
            }),
            None => Ok(Vec::new()),
        }
    }

    fn save_last_active(&self, project_id: Uuid) -> StorageResult<()> {
        let json = serde_json::to_string(&project_id)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.write_json(self.base_path.join(LAST_ACTIVE_FILE), json)
    }

    fn load_last_active(&self) -> StorageResult<Option<Uuid>> {
        match self.read_json(self.base_path.join(LAST_ACTIVE_FILE))? {
            Some(json) => serde_json::from_str(&json).map(Some).map_err(|e| {
                StorageError::Serialization(format!("failed to parse last-active id: {e}"))
            }),
            None => Ok(None),
        }
    }
}
