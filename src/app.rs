//! Application state and initialization
//!
//! The composition root: wires the entity store, services, sync queue,
//! and background worker together. The host application constructs one
//! `AppState` and drives everything through it; no component reaches
//! for a global.

use crate::config::SYNC_QUEUE_CAPACITY;
use crate::services::{NotesService, RetentionSweeper, TrashService};
use crate::store::EntityStore;
use crate::sync::{spawn_worker, RemoteBackend, SyncOp, SyncQueue, SyncService};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Central application state holding all services
pub struct AppState {
    pub store: EntityStore,
    pub notes: NotesService,
    pub trash: TrashService,
    pub sweeper: RetentionSweeper,
    pub sync: SyncService,
    queue: SyncQueue,
    worker: JoinHandle<()>,
}

impl AppState {
    /// Wire up the full data layer. `user_id` is `None` while signed
    /// out; local mutation works either way and remote sync becomes a
    /// no-op.
    pub fn new(backend: Arc<dyn RemoteBackend>, user_id: Option<String>) -> Self {
        tracing::info!("Initializing data layer");

        let store = EntityStore::new();
        let (queue, rx) = SyncQueue::new(SYNC_QUEUE_CAPACITY);

        let sync = SyncService::new(store.clone(), backend, user_id);
        let worker = spawn_worker(sync.clone(), rx);

        let trash = TrashService::new(store.clone(), queue.clone());
        let notes = NotesService::new(store.clone(), trash.clone(), queue.clone());
        let sweeper = RetentionSweeper::new(store.clone(), trash.clone());

        tracing::info!("Data layer initialized");

        Self {
            store,
            notes,
            trash,
            sweeper,
            sync,
            queue,
            worker,
        }
    }

    /// Enqueue a full pull behind everything already queued.
    pub fn request_pull(&self) {
        self.queue.enqueue(SyncOp::PullAll);
    }

    /// Drain the sync queue and stop the worker.
    pub async fn shutdown(self) {
        self.queue.shutdown().await;
        if let Err(e) = self.worker.await {
            tracing::error!("Sync worker terminated abnormally: {}", e);
        }
    }
}
