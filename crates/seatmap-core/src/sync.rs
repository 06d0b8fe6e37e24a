//! Background persistence to the remote layout store.
//!
//! The core never awaits the remote store. Each save runs on a detached
//! worker thread which reports progress through an mpsc channel; the host
//! drains events with [`SyncDispatcher::poll_events`] on its timer tick and
//! applies them to the active store's sync status. A save for a project that
//! has since been deleted simply produces events nobody applies.

use crate::store::CanvasSnapshot;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use thiserror::Error;
use uuid::Uuid;

/// Identifier assigned by the remote store to a persisted layout.
pub type RemoteLayoutId = String;

/// Sync state of the active project, consumed by the UI loading indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No sync attempted yet.
    #[default]
    Idle,
    /// A background save is in flight.
    Syncing,
    /// The last background save succeeded.
    Synced,
    /// The last background save failed. Local editing is unaffected.
    Error,
}

/// Project metadata sent alongside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMeta {
    /// Project the snapshot belongs to.
    pub project_id: Uuid,
    /// Display name shown in the remote dashboard.
    pub name: String,
    /// Associated event, if the project is linked to one.
    pub event_id: Option<Uuid>,
    /// Remote id from a previous save, for updates instead of inserts.
    pub remote_layout_id: Option<RemoteLayoutId>,
}

/// Errors surfaced by a remote layout store.
#[derive(Debug, Clone, Error)]
pub enum RemoteSyncError {
    #[error("remote store unreachable: {0}")]
    Unreachable(String),
    #[error("remote store rejected the layout: {0}")]
    Rejected(String),
}

/// Contract for the remote persistence backend.
///
/// Implementations block until the save completes; the dispatcher runs them
/// off the critical path, so the blocking call is the suspension point the
/// core treats as a detached background task.
pub trait RemoteLayoutStore: Send + Sync + 'static {
    /// Persist a snapshot remotely and return its remote layout id.
    fn save(
        &self,
        snapshot: &CanvasSnapshot,
        meta: &ProjectMeta,
    ) -> Result<RemoteLayoutId, RemoteSyncError>;
}

/// No-op remote store for offline hosts and tests.
#[derive(Debug, Default)]
pub struct NullRemote;

impl RemoteLayoutStore for NullRemote {
    fn save(
        &self,
        _snapshot: &CanvasSnapshot,
        meta: &ProjectMeta,
    ) -> Result<RemoteLayoutId, RemoteSyncError> {
        Ok(meta
            .remote_layout_id
            .clone()
            .unwrap_or_else(|| format!("local-{}", meta.project_id)))
    }
}

/// Events emitted by background save workers.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// A save started for the given project.
    Started { project_id: Uuid },
    /// A save finished; the remote id should be recorded on the project.
    Completed {
        project_id: Uuid,
        remote_id: RemoteLayoutId,
    },
    /// A save failed; local state is untouched.
    Failed { project_id: Uuid, message: String },
}

/// Fire-and-forget dispatcher for remote saves.
pub struct SyncDispatcher {
    remote: Arc<dyn RemoteLayoutStore>,
    event_tx: Sender<SyncEvent>,
    event_rx: Receiver<SyncEvent>,
}

impl SyncDispatcher {
    /// Create a dispatcher over the given remote store.
    pub fn new(remote: Arc<dyn RemoteLayoutStore>) -> Self {
        let (event_tx, event_rx) = channel();
        Self {
            remote,
            event_tx,
            event_rx,
        }
    }

    /// Kick off a background save. Returns immediately.
    pub fn dispatch(&self, snapshot: CanvasSnapshot, meta: ProjectMeta) {
        let remote = Arc::clone(&self.remote);
        let event_tx = self.event_tx.clone();
        let project_id = meta.project_id;

        // Send failures mean the dispatcher was dropped; the result is
        // discarded, matching the deleted-project rule.
        let _ = event_tx.send(SyncEvent::Started { project_id });

        thread::spawn(move || {
            log::debug!("background sync started for project {project_id}");
            match remote.save(&snapshot, &meta) {
                Ok(remote_id) => {
                    log::info!("project {project_id} synced as remote layout {remote_id}");
                    let _ = event_tx.send(SyncEvent::Completed {
                        project_id,
                        remote_id,
                    });
                }
                Err(e) => {
                    log::warn!("background sync failed for project {project_id}: {e}");
                    let _ = event_tx.send(SyncEvent::Failed {
                        project_id,
                        message: e.to_string(),
                    });
                }
            }
        });
    }

    /// Drain pending events (non-blocking).
    pub fn poll_events(&self) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    struct RecordingRemote {
        saves: Mutex<Vec<ProjectMeta>>,
        fail: bool,
    }

    impl RemoteLayoutStore for RecordingRemote {
        fn save(
            &self,
            _snapshot: &CanvasSnapshot,
            meta: &ProjectMeta,
        ) -> Result<RemoteLayoutId, RemoteSyncError> {
            self.saves.lock().unwrap().push(meta.clone());
            if self.fail {
                Err(RemoteSyncError::Unreachable("connection refused".into()))
            } else {
                Ok("layout-42".into())
            }
        }
    }

    fn wait_for_events(dispatcher: &SyncDispatcher, count: usize) -> Vec<SyncEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while events.len() < count && Instant::now() < deadline {
            events.extend(dispatcher.poll_events());
            thread::sleep(Duration::from_millis(5));
        }
        events
    }

    fn meta() -> ProjectMeta {
        ProjectMeta {
            project_id: Uuid::new_v4(),
            name: "Smith wedding".into(),
            event_id: None,
            remote_layout_id: None,
        }
    }

    #[test]
    fn test_dispatch_reports_completion() {
        let remote = Arc::new(RecordingRemote {
            saves: Mutex::new(Vec::new()),
            fail: false,
        });
        let dispatcher = SyncDispatcher::new(remote.clone());

        dispatcher.dispatch(CanvasSnapshot::default(), meta());
        let events = wait_for_events(&dispatcher, 2);

        assert!(matches!(events[0], SyncEvent::Started { .. }));
        assert!(matches!(
            &events[1],
            SyncEvent::Completed { remote_id, .. } if remote_id == "layout-42"
        ));
        assert_eq!(remote.saves.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_dispatch_reports_failure() {
        let dispatcher = SyncDispatcher::new(Arc::new(RecordingRemote {
            saves: Mutex::new(Vec::new()),
            fail: true,
        }));

        dispatcher.dispatch(CanvasSnapshot::default(), meta());
        let events = wait_for_events(&dispatcher, 2);

        assert!(matches!(&events[1], SyncEvent::Failed { message, .. }
            if message.contains("connection refused")));
    }

    #[test]
    fn test_null_remote_echoes_existing_id() {
        let mut m = meta();
        m.remote_layout_id = Some("layout-7".into());
        let id = NullRemote.save(&CanvasSnapshot::default(), &m).unwrap();
        assert_eq!(id, "layout-7");
    }
}
