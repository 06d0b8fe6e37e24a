//! Project lifecycle: switching, autosave, creation and deletion.
//!
//! Switching the active project is synchronous and strictly ordered:
//! flush the current project to local storage, load the target's snapshot,
//! swap the store, then dispatch a background remote sync for the previous
//! project. Any reordering risks showing one project's canvas with another
//! project's data, or losing unsaved edits. Remote sync failures never block
//! or roll anything back.

use crate::store::{CanvasEntityStore, CanvasSnapshot};
use crate::storage::{Storage, StorageError};
use crate::sync::{
    ProjectMeta, RemoteLayoutId, RemoteLayoutStore, SyncDispatcher, SyncEvent, SyncStatus,
};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

/// Autosave interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Default room bounds for new projects, in meters (A4 landscape aspect).
pub const DEFAULT_BOUNDS: Rect = Rect::new(0.0, 0.0, 29.7, 21.0);

/// A floor-plan project. Owns exactly one canvas snapshot, addressed by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// Physical room bounds in meters.
    pub bounds: Rect,
    /// Remote id from the last successful background sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_layout_id: Option<RemoteLayoutId>,
    /// Associated event in the planning dashboard, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
}

impl Project {
    /// Create a new project with a fresh id and an empty canvas.
    pub fn new(name: impl Into<String>, bounds: Rect) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            bounds,
            remote_layout_id: None,
            event_id: None,
        }
    }
}

/// Project lifecycle errors.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("unknown project: {0}")]
    UnknownProject(Uuid),
    /// Deleting the last remaining project is a rejected user action.
    #[error("cannot delete the last remaining project")]
    LastProject,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Orchestrates the active project and its persistence.
///
/// Owns the [`CanvasEntityStore`] and the local storage adapter; hosts reach
/// the scene graph through [`store`](Self::store) / [`store_mut`](Self::store_mut)
/// and drive [`tick`](Self::tick) from their timer loop.
pub struct ProjectManager<S: Storage> {
    storage: Arc<S>,
    dispatcher: SyncDispatcher,
    projects: Vec<Project>,
    active: Uuid,
    store: CanvasEntityStore,
    interval: Duration,
    last_flush: Option<Instant>,
}

impl<S: Storage> ProjectManager<S> {
    /// Restore the project list and last active project from storage.
    ///
    /// Creates a first default project when storage is empty; malformed
    /// stored state degrades to an empty project rather than failing.
    pub fn new(storage: Arc<S>, remote: Arc<dyn RemoteLayoutStore>) -> Result<Self, ProjectError> {
        let mut projects = storage.load_projects().unwrap_or_else(|e| {
            log::warn!("failed to load project list, starting fresh: {e}");
            Vec::new()
        });
        if projects.is_empty() {
            projects.push(Project::new("Untitled layout", DEFAULT_BOUNDS));
            storage.save_projects(&projects)?;
        }

        let active = storage
            .load_last_active()
            .unwrap_or_else(|e| {
                log::warn!("failed to load last active project id: {e}");
                None
            })
            .filter(|id| projects.iter().any(|p| p.id == *id))
            .unwrap_or(projects[0].id);

        let mut manager = Self {
            storage,
            dispatcher: SyncDispatcher::new(remote),
            projects,
            active,
            store: CanvasEntityStore::new(DEFAULT_BOUNDS),
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_flush: None,
        };
        manager.load_into_store(active);
        Ok(manager)
    }

    /// The scene graph of the active project.
    pub fn store(&self) -> &CanvasEntityStore {
        &self.store
    }

    /// Mutable scene graph of the active project.
    pub fn store_mut(&mut self) -> &mut CanvasEntityStore {
        &mut self.store
    }

    /// All known projects.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// The active project.
    pub fn active_project(&self) -> &Project {
        // The active id is always a member of the project list.
        self.projects
            .iter()
            .find(|p| p.id == self.active)
            .unwrap_or(&self.projects[0])
    }

    /// Set the autosave interval.
    pub fn set_autosave_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn project(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Read the target's snapshot from storage and swap it into the store.
    /// Missing or malformed data loads as an empty project.
    fn load_into_store(&mut self, target: Uuid) {
        let loaded = match self.storage.load_snapshot(target) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("snapshot for project {target} unreadable, loading empty: {e}");
                None
            }
        };
        let bounds = self.project(target).map_or(DEFAULT_BOUNDS, |p| p.bounds);
        self.store.initialize_project(target, bounds, loaded);
    }

    /// Flush the active project's canvas to local storage.
    pub fn flush(&mut self) -> Result<(), ProjectError> {
        let snapshot = self.store.canvas_data();
        self.storage.save_snapshot(self.active, &snapshot)?;
        self.store.mark_clean();
        self.last_flush = Some(Instant::now());
        log::debug!("flushed project {}", self.active);
        Ok(())
    }

    /// Switch the active project.
    ///
    /// Flush → load → swap, then a fire-and-forget remote sync for the
    /// project being left. Switching to the already-active project is a
    /// no-op. Sync status never gates switching.
    pub fn switch_project(&mut self, target: Uuid) -> Result<(), ProjectError> {
        if self.project(target).is_none() {
            return Err(ProjectError::UnknownProject(target));
        }
        if target == self.active {
            return Ok(());
        }

        let previous = self.active;

        // 1. Flush the current canvas under the current project's key.
        let previous_snapshot = self.store.canvas_data();
        self.storage.save_snapshot(previous, &previous_snapshot)?;
        self.store.mark_clean();
        self.last_flush = Some(Instant::now());

        // 2 + 3. Load the target and swap; the only mutation point for the
        // active project pointer.
        self.active = target;
        self.load_into_store(target);

        if let Err(e) = self.storage.save_last_active(target) {
            log::warn!("failed to persist last active project: {e}");
        }

        // 4. Background remote sync for the project we left.
        self.dispatch_sync(previous, previous_snapshot);

        log::info!("switched active project {previous} -> {target}");
        Ok(())
    }

    fn dispatch_sync(&self, project_id: Uuid, snapshot: CanvasSnapshot) {
        let Some(project) = self.project(project_id) else {
            return;
        };
        self.dispatcher.dispatch(
            snapshot,
            ProjectMeta {
                project_id,
                name: project.name.clone(),
                event_id: project.event_id,
                remote_layout_id: project.remote_layout_id.clone(),
            },
        );
    }

    /// Create a project and make it active. The current project is flushed
    /// first.
    pub fn create_project(
        &mut self,
        name: impl Into<String>,
        bounds: Rect,
        event_id: Option<Uuid>,
    ) -> Result<Uuid, ProjectError> {
        self.flush()?;

        let mut project = Project::new(name, bounds);
        project.event_id = event_id;
        let id = project.id;
        self.projects.push(project);
        self.storage.save_projects(&self.projects)?;

        self.switch_project(id)?;
        Ok(id)
    }

    /// Delete a project and its persisted snapshot.
    ///
    /// Deleting the active project switches to another existing project
    /// first. Deleting the last remaining project is rejected.
    pub fn delete_project(&mut self, id: Uuid) -> Result<(), ProjectError> {
        if self.project(id).is_none() {
            return Err(ProjectError::UnknownProject(id));
        }
        if self.projects.len() == 1 {
            return Err(ProjectError::LastProject);
        }

        if id == self.active {
            let fallback = self
                .projects
                .iter()
                .map(|p| p.id)
                .find(|&p| p != id)
                .ok_or(ProjectError::LastProject)?;
            self.switch_project(fallback)?;
        }

        self.projects.retain(|p| p.id != id);
        self.storage.delete_snapshot(id)?;
        self.storage.save_projects(&self.projects)?;
        log::info!("deleted project {id}");

        // A sync already in flight for this project will complete into the
        // void; its events are discarded in poll_sync.
        Ok(())
    }

    /// Whether the autosave interval has elapsed with unsaved edits.
    pub fn should_save(&self) -> bool {
        if !self.store.is_dirty() {
            return false;
        }
        match self.last_flush {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Flush if dirty and the interval elapsed. Returns whether a flush ran.
    pub fn maybe_autosave(&mut self) -> Result<bool, ProjectError> {
        if !self.should_save() {
            return Ok(false);
        }
        self.flush()?;
        Ok(true)
    }

    /// Apply pending background sync events.
    ///
    /// Events for projects that no longer exist are discarded silently; only
    /// the active project's events touch the store's sync status.
    pub fn poll_sync(&mut self) {
        for event in self.dispatcher.poll_events() {
            match event {
                SyncEvent::Started { project_id } => {
                    if project_id == self.active {
                        self.store.set_sync_status(SyncStatus::Syncing);
                    }
                }
                SyncEvent::Completed {
                    project_id,
                    remote_id,
                } => {
                    let Some(project) = self.projects.iter_mut().find(|p| p.id == project_id)
                    else {
                        log::debug!("discarding sync result for deleted project {project_id}");
                        continue;
                    };
                    project.remote_layout_id = Some(remote_id.clone());
                    if project_id == self.active {
                        self.store.set_remote_layout_id(Some(remote_id));
                        self.store.set_sync_status(SyncStatus::Synced);
                    }
                    if let Err(e) = self.storage.save_projects(&self.projects) {
                        log::warn!("failed to persist remote layout id: {e}");
                    }
                }
                SyncEvent::Failed {
                    project_id,
                    message,
                } => {
                    if self.project(project_id).is_none() {
                        log::debug!("discarding sync failure for deleted project {project_id}");
                        continue;
                    }
                    log::warn!("remote sync failed for project {project_id}: {message}");
                    if project_id == self.active {
                        self.store.set_sync_status(SyncStatus::Error);
                    }
                }
            }
        }
    }

    /// Timer-driven maintenance: apply sync events, then autosave if due.
    pub fn tick(&mut self) -> Result<(), ProjectError> {
        self.poll_sync();
        self.maybe_autosave()?;
        Ok(())
    }

    /// Sync the active project to the remote store in the background.
    pub fn sync_active(&mut self) {
        let snapshot = self.store.canvas_data();
        self.dispatch_sync(self.active, snapshot);
    }

    /// Final flush and state persistence on teardown.
    pub fn shutdown(&mut self) -> Result<(), ProjectError> {
        self.flush()?;
        self.storage.save_projects(&self.projects)?;
        self.storage.save_last_active(self.active)?;
        log::info!("project manager shut down, active project {}", self.active);
        Ok(())
    }
}
