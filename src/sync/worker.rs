//! Sync queue and background worker
//!
//! Local mutations enqueue operations here and return immediately; a
//! single background task mirrors them to the remote store. Remote
//! failures are logged and dropped, never surfaced to the mutating
//! caller; the next full pull reconciles any drift.

use crate::store::{DeletedFolder, DeletedNote, Folder, Note};
use crate::sync::SyncService;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One unit of remote mirroring work.
#[derive(Debug)]
pub enum SyncOp {
    UpsertNote(Note),
    TrashNote(DeletedNote),
    RestoreNote(Note),
    PurgeNote { id: String, image_urls: Vec<String> },
    UpsertFolder(Folder),
    /// Batch upsert in the given order (parents before children).
    UpsertFolders(Vec<Folder>),
    TrashFolder(DeletedFolder),
    RestoreFolder(Folder),
    PurgeFolder { id: String },
    PullAll,
    /// Drains nothing further; the worker exits after seeing this.
    Shutdown,
}

/// Bounded, clonable handle for enqueueing sync operations.
#[derive(Clone)]
pub struct SyncQueue {
    tx: mpsc::Sender<SyncOp>,
}

impl SyncQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<SyncOp>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Fire-and-forget enqueue. A full or closed queue drops the
    /// operation with a warning.
    pub fn enqueue(&self, op: SyncOp) {
        match self.tx.try_send(op) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(op)) => {
                tracing::warn!("Sync queue full, dropping operation: {:?}", op);
            }
            Err(mpsc::error::TrySendError::Closed(op)) => {
                tracing::warn!("Sync queue closed, dropping operation: {:?}", op);
            }
        }
    }

    /// Ask the worker to stop after processing everything already
    /// queued.
    pub async fn shutdown(&self) {
        if self.tx.send(SyncOp::Shutdown).await.is_err() {
            tracing::warn!("Sync worker already stopped");
        }
    }
}

/// Spawn the background worker consuming the queue.
pub fn spawn_worker(service: SyncService, mut rx: mpsc::Receiver<SyncOp>) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("Sync worker started");

        while let Some(op) = rx.recv().await {
            if matches!(op, SyncOp::Shutdown) {
                break;
            }
            service.apply(op).await;
        }

        tracing::info!("Sync worker stopped");
    })
}
