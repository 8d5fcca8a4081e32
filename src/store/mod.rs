//! Entity store
//!
//! This module provides the in-memory collections that are the single
//! source of truth for the UI:
//! - Model definitions
//! - The `EntityStore` with serialized mutation and the atomic
//!   active ↔ trash moves

pub mod models;

pub use models::*;

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Collections {
    notes: Vec<Note>,
    folders: Vec<Folder>,
    deleted_notes: Vec<DeletedNote>,
    deleted_folders: Vec<DeletedFolder>,
    expense_budget: Option<ExpenseBudget>,
    expense_reminder: Option<ExpenseReminder>,
}

/// In-memory store of all entity collections.
///
/// One mutex serializes every mutation, so an entity is never observable
/// in both its active and deleted collection (or neither) mid-move.
/// Constructed once by the composition root and injected into services.
#[derive(Clone, Default)]
pub struct EntityStore {
    inner: Arc<Mutex<Collections>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Notes =====

    pub async fn insert_note(&self, note: Note) {
        let mut c = self.inner.lock().await;
        c.notes.push(note);
    }

    pub async fn get_note(&self, id: &str) -> Result<Note> {
        let c = self.inner.lock().await;
        c.notes
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(|| AppError::NoteNotFound(id.to_string()))
    }

    pub async fn list_notes(&self) -> Vec<Note> {
        self.inner.lock().await.notes.clone()
    }

    /// Apply an update request, refreshing `updated_at`.
    pub async fn apply_note_update(
        &self,
        req: UpdateNoteRequest,
        now: DateTime<Utc>,
    ) -> Result<Note> {
        let mut c = self.inner.lock().await;
        let note = c
            .notes
            .iter_mut()
            .find(|n| n.id == req.id)
            .ok_or_else(|| AppError::NoteNotFound(req.id.clone()))?;

        if let Some(title) = req.title {
            note.title = title;
        }
        if let Some(content) = req.content {
            note.content = content;
        }
        if let Some(pinned) = req.is_pinned {
            note.is_pinned = pinned;
        }
        if let Some(locked) = req.is_locked {
            note.is_locked = locked;
        }
        if let Some(folder_id) = req.folder_id {
            note.folder_id = folder_id;
        }
        if let Some(urls) = req.image_urls {
            note.image_urls = urls;
        }
        note.updated_at = now;

        Ok(note.clone())
    }

    // ===== Folders =====

    pub async fn insert_folder(&self, folder: Folder) {
        let mut c = self.inner.lock().await;
        c.folders.push(folder);
    }

    pub async fn get_folder(&self, id: &str) -> Result<Folder> {
        let c = self.inner.lock().await;
        c.folders
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| AppError::FolderNotFound(id.to_string()))
    }

    pub async fn list_folders(&self) -> Vec<Folder> {
        self.inner.lock().await.folders.clone()
    }

    pub async fn apply_folder_update(
        &self,
        req: UpdateFolderRequest,
        now: DateTime<Utc>,
    ) -> Result<Folder> {
        let mut c = self.inner.lock().await;
        let folder = c
            .folders
            .iter_mut()
            .find(|f| f.id == req.id)
            .ok_or_else(|| AppError::FolderNotFound(req.id.clone()))?;

        if let Some(name) = req.name {
            folder.name = name;
        }
        if let Some(color) = req.color {
            folder.color = color;
        }
        if let Some(parent) = req.parent_folder_id {
            folder.parent_folder_id = parent;
        }
        folder.updated_at = now;

        Ok(folder.clone())
    }

    // ===== Trash moves =====
    //
    // Each move happens under a single lock acquisition so no observer
    // ever sees the entity in both collections or in neither.

    /// Move a note from the active collection to the trash.
    pub async fn trash_note(&self, id: &str, now: DateTime<Utc>) -> Result<DeletedNote> {
        let mut c = self.inner.lock().await;
        let pos = c
            .notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| AppError::NoteNotFound(id.to_string()))?;

        let note = c.notes.remove(pos);
        let deleted = DeletedNote {
            note,
            deleted_at: now,
        };
        c.deleted_notes.push(deleted.clone());

        Ok(deleted)
    }

    /// Move a note from the trash back to the active collection.
    /// Timestamps are preserved; restore does not count as a mutation
    /// of the note's content.
    pub async fn restore_note(&self, id: &str) -> Result<Note> {
        let mut c = self.inner.lock().await;
        let pos = c
            .deleted_notes
            .iter()
            .position(|d| d.note.id == id)
            .ok_or_else(|| AppError::NoteNotFound(id.to_string()))?;

        let deleted = c.deleted_notes.remove(pos);
        c.notes.push(deleted.note.clone());

        Ok(deleted.note)
    }

    /// Permanently remove a note from the trash. Idempotent: purging an
    /// id that is no longer in the trash returns `None`.
    pub async fn purge_note(&self, id: &str) -> Option<DeletedNote> {
        let mut c = self.inner.lock().await;
        let pos = c.deleted_notes.iter().position(|d| d.note.id == id)?;
        Some(c.deleted_notes.remove(pos))
    }

    pub async fn trash_folder(&self, id: &str, now: DateTime<Utc>) -> Result<DeletedFolder> {
        let mut c = self.inner.lock().await;
        let pos = c
            .folders
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| AppError::FolderNotFound(id.to_string()))?;

        let folder = c.folders.remove(pos);
        let deleted = DeletedFolder {
            folder,
            deleted_at: now,
        };
        c.deleted_folders.push(deleted.clone());

        Ok(deleted)
    }

    pub async fn restore_folder(&self, id: &str) -> Result<Folder> {
        let mut c = self.inner.lock().await;
        let pos = c
            .deleted_folders
            .iter()
            .position(|d| d.folder.id == id)
            .ok_or_else(|| AppError::FolderNotFound(id.to_string()))?;

        let deleted = c.deleted_folders.remove(pos);
        c.folders.push(deleted.folder.clone());

        Ok(deleted.folder)
    }

    pub async fn purge_folder(&self, id: &str) -> Option<DeletedFolder> {
        let mut c = self.inner.lock().await;
        let pos = c.deleted_folders.iter().position(|d| d.folder.id == id)?;
        Some(c.deleted_folders.remove(pos))
    }

    pub async fn list_deleted_notes(&self) -> Vec<DeletedNote> {
        self.inner.lock().await.deleted_notes.clone()
    }

    pub async fn list_deleted_folders(&self) -> Vec<DeletedFolder> {
        self.inner.lock().await.deleted_folders.clone()
    }

    // ===== Full replacement (pull) =====

    pub async fn replace_notes(&self, notes: Vec<Note>) {
        self.inner.lock().await.notes = notes;
    }

    pub async fn replace_folders(&self, folders: Vec<Folder>) {
        self.inner.lock().await.folders = folders;
    }

    pub async fn replace_deleted_notes(&self, deleted: Vec<DeletedNote>) {
        self.inner.lock().await.deleted_notes = deleted;
    }

    pub async fn replace_deleted_folders(&self, deleted: Vec<DeletedFolder>) {
        self.inner.lock().await.deleted_folders = deleted;
    }

    // ===== Expense configuration =====

    pub async fn expense_budget(&self) -> Option<ExpenseBudget> {
        self.inner.lock().await.expense_budget.clone()
    }

    pub async fn set_expense_budget(&self, budget: Option<ExpenseBudget>) {
        self.inner.lock().await.expense_budget = budget;
    }

    pub async fn expense_reminder(&self) -> Option<ExpenseReminder> {
        self.inner.lock().await.expense_reminder.clone()
    }

    pub async fn set_expense_reminder(&self, reminder: Option<ExpenseReminder>) {
        self.inner.lock().await.expense_reminder = reminder;
    }
}
