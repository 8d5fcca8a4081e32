//! Trash lifecycle service
//!
//! Soft delete, restore, and permanent purge. Local moves are applied
//! first and are authoritative; remote mirroring is enqueued
//! fire-and-forget.

use crate::config::TRASH_RETENTION_DAYS;
use crate::error::Result;
use crate::store::{DeletedFolder, DeletedNote, EntityStore, Folder, Note};
use crate::sync::{SyncOp, SyncQueue};
use chrono::{DateTime, Utc};

/// Days left before an entry deleted at `deleted_at` becomes eligible
/// for permanent deletion. 30 at the moment of deletion, 0 once the
/// window has elapsed, never negative.
pub fn days_until_permanent_deletion(deleted_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let elapsed = (now - deleted_at).num_days();
    (TRASH_RETENTION_DAYS - elapsed).max(0)
}

/// Service for moving entities between their active and deleted
/// collections
#[derive(Clone)]
pub struct TrashService {
    store: EntityStore,
    queue: SyncQueue,
}

impl TrashService {
    pub fn new(store: EntityStore, queue: SyncQueue) -> Self {
        Self { store, queue }
    }

    /// Soft delete a note: move it to the trash stamped with the
    /// current time.
    pub async fn soft_delete_note(&self, id: &str) -> Result<DeletedNote> {
        let deleted = self.store.trash_note(id, Utc::now()).await?;
        tracing::info!("Note moved to trash: {}", id);

        self.queue.enqueue(SyncOp::TrashNote(deleted.clone()));
        Ok(deleted)
    }

    pub async fn soft_delete_folder(&self, id: &str) -> Result<DeletedFolder> {
        let deleted = self.store.trash_folder(id, Utc::now()).await?;
        tracing::info!("Folder moved to trash: {}", id);

        self.queue.enqueue(SyncOp::TrashFolder(deleted.clone()));
        Ok(deleted)
    }

    /// Restore a note from the trash. The note keeps its original
    /// timestamps; restoring is not a content mutation.
    pub async fn restore_note(&self, id: &str) -> Result<Note> {
        let note = self.store.restore_note(id).await?;
        tracing::info!("Note restored from trash: {}", id);

        self.queue.enqueue(SyncOp::RestoreNote(note.clone()));
        Ok(note)
    }

    pub async fn restore_folder(&self, id: &str) -> Result<Folder> {
        let folder = self.store.restore_folder(id).await?;
        tracing::info!("Folder restored from trash: {}", id);

        self.queue.enqueue(SyncOp::RestoreFolder(folder.clone()));
        Ok(folder)
    }

    /// Permanently purge a trashed note together with its image
    /// artifacts. Idempotent: returns false when the id was already
    /// gone.
    pub async fn purge_note(&self, id: &str) -> bool {
        match self.store.purge_note(id).await {
            Some(deleted) => {
                tracing::info!("Note purged: {}", id);
                self.queue.enqueue(SyncOp::PurgeNote {
                    id: deleted.note.id,
                    image_urls: deleted.note.image_urls,
                });
                true
            }
            None => {
                tracing::debug!("Purge of {} skipped, not in trash", id);
                false
            }
        }
    }

    pub async fn purge_folder(&self, id: &str) -> bool {
        match self.store.purge_folder(id).await {
            Some(deleted) => {
                tracing::info!("Folder purged: {}", id);
                self.queue.enqueue(SyncOp::PurgeFolder {
                    id: deleted.folder.id,
                });
                true
            }
            None => {
                tracing::debug!("Purge of {} skipped, not in trash", id);
                false
            }
        }
    }
}
