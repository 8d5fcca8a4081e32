//! Notes service
//!
//! High-level business logic for notes and folders: CRUD orchestration,
//! the write-time folder cycle check, and cascading folder deletion.
//! Every local mutation enqueues its remote mirror fire-and-forget.

use crate::error::{AppError, Result};
use crate::services::hierarchy;
use crate::services::trash::TrashService;
use crate::store::{
    CreateFolderRequest, CreateNoteRequest, EntityStore, Folder, Note, UpdateFolderRequest,
    UpdateNoteRequest,
};
use crate::sync::{SyncOp, SyncQueue};
use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

/// Service for managing notes and folders
#[derive(Clone)]
pub struct NotesService {
    store: EntityStore,
    trash: TrashService,
    queue: SyncQueue,
}

impl NotesService {
    pub fn new(store: EntityStore, trash: TrashService, queue: SyncQueue) -> Self {
        Self {
            store,
            trash,
            queue,
        }
    }

    // ===== Notes =====

    /// Create a new note
    pub async fn create_note(&self, req: CreateNoteRequest) -> Result<Note> {
        if let Some(folder_id) = &req.folder_id {
            self.store.get_folder(folder_id).await?;
        }

        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4().to_string(),
            title: req.title,
            content: req.content,
            created_at: now,
            updated_at: now,
            is_pinned: false,
            is_locked: false,
            folder_id: req.folder_id,
            image_urls: req.image_urls,
        };

        self.store.insert_note(note.clone()).await;
        tracing::info!("Note created: {}", note.id);

        self.queue.enqueue(SyncOp::UpsertNote(note.clone()));
        Ok(note)
    }

    pub async fn get_note(&self, id: &str) -> Result<Note> {
        self.store.get_note(id).await
    }

    pub async fn list_notes(&self) -> Vec<Note> {
        self.store.list_notes().await
    }

    /// Update a note, refreshing its modification time
    pub async fn update_note(&self, req: UpdateNoteRequest) -> Result<Note> {
        if let Some(Some(folder_id)) = &req.folder_id {
            self.store.get_folder(folder_id).await?;
        }

        let note = self.store.apply_note_update(req, Utc::now()).await?;
        tracing::debug!("Note updated: {}", note.id);

        self.queue.enqueue(SyncOp::UpsertNote(note.clone()));
        Ok(note)
    }

    /// Soft delete a note
    pub async fn delete_note(&self, id: &str) -> Result<()> {
        self.trash.soft_delete_note(id).await?;
        Ok(())
    }

    /// Restore a note from the trash
    pub async fn restore_note(&self, id: &str) -> Result<Note> {
        self.trash.restore_note(id).await
    }

    // ===== Folders =====

    /// Create a new folder
    pub async fn create_folder(&self, req: CreateFolderRequest) -> Result<Folder> {
        if let Some(parent_id) = &req.parent_folder_id {
            self.store.get_folder(parent_id).await?;
        }

        let now = Utc::now();
        let folder = Folder {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            color: req.color,
            parent_folder_id: req.parent_folder_id,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_folder(folder.clone()).await;
        tracing::info!("Folder created: {}", folder.id);

        self.queue.enqueue(SyncOp::UpsertFolder(folder.clone()));
        Ok(folder)
    }

    pub async fn get_folder(&self, id: &str) -> Result<Folder> {
        self.store.get_folder(id).await
    }

    pub async fn list_folders(&self) -> Vec<Folder> {
        self.store.list_folders().await
    }

    /// Update a folder. Reparenting is rejected when the new parent's
    /// ancestor chain reaches the folder itself.
    pub async fn update_folder(&self, req: UpdateFolderRequest) -> Result<Folder> {
        if let Some(Some(parent_id)) = &req.parent_folder_id {
            self.store.get_folder(parent_id).await?;

            let folders = self.store.list_folders().await;
            if would_create_cycle(&folders, &req.id, parent_id) {
                return Err(AppError::FolderCycle(req.id));
            }
        }

        let folder = self.store.apply_folder_update(req, Utc::now()).await?;
        tracing::debug!("Folder updated: {}", folder.id);

        self.queue.enqueue(SyncOp::UpsertFolder(folder.clone()));
        Ok(folder)
    }

    /// Delete a folder and everything under it: every descendant
    /// folder, and every note filed in any folder of the deletion set,
    /// is soft-deleted. Returns the deletion set of folder ids.
    ///
    /// Remote mirroring is enqueued independently per entity; a partial
    /// remote failure is not rolled back.
    pub async fn delete_folder(&self, id: &str) -> Result<HashSet<String>> {
        self.store.get_folder(id).await?;

        let folders = self.store.list_folders().await;
        let mut deletion_set = hierarchy::descendants(id, &folders);
        deletion_set.insert(id.to_string());

        let notes = self.store.list_notes().await;
        let mut notes_trashed = 0usize;
        for note in &notes {
            if let Some(folder_id) = &note.folder_id {
                if deletion_set.contains(folder_id) {
                    self.trash.soft_delete_note(&note.id).await?;
                    notes_trashed += 1;
                }
            }
        }

        for folder in &folders {
            if deletion_set.contains(&folder.id) {
                self.trash.soft_delete_folder(&folder.id).await?;
            }
        }

        tracing::info!(
            "Folder {} deleted with {} descendant folders and {} notes",
            id,
            deletion_set.len() - 1,
            notes_trashed
        );

        Ok(deletion_set)
    }

    /// Restore a folder from the trash
    pub async fn restore_folder(&self, id: &str) -> Result<Folder> {
        self.trash.restore_folder(id).await
    }
}

/// True when making `new_parent` the parent of `folder_id` would close
/// a cycle through the parent chain.
fn would_create_cycle(folders: &[Folder], folder_id: &str, new_parent: &str) -> bool {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut current = Some(new_parent);

    while let Some(id) = current {
        if id == folder_id {
            return true;
        }
        if !visited.insert(id) {
            // Pre-existing cycle above the new parent; it does not
            // involve this folder.
            return false;
        }
        current = folders
            .iter()
            .find(|f| f.id == id)
            .and_then(|f| f.parent_folder_id.as_deref());
    }

    false
}
