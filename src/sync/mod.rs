//! Remote synchronization
//!
//! This module mirrors local state to the remote relational store:
//! - Row representations and row ↔ entity translation
//! - The `RemoteBackend` seam and its HTTP implementation
//! - The bounded sync queue and its background worker
//! - `SyncService`, which executes queued operations and full pulls
//!
//! Local state is authoritative. A failed remote write is logged and
//! dropped; a pull only replaces a local collection when the remote
//! returned at least one parseable row.

pub mod backend;
pub mod rows;
pub mod worker;

pub use backend::{HttpBackend, RemoteBackend};
pub use rows::{DeletedFolderRow, DeletedNoteRow, FolderRow, NoteRow};
pub use worker::{spawn_worker, SyncOp, SyncQueue};

use crate::config::{DELETED_FOLDERS_TABLE, DELETED_NOTES_TABLE, FOLDERS_TABLE, NOTES_TABLE};
use crate::error::{AppError, Result};
use crate::services::hierarchy;
use crate::store::EntityStore;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Executes sync operations against the remote backend.
///
/// Every remote call is gated on an authenticated user id; without one,
/// operations degrade to a logged warning and the local mutation stands.
#[derive(Clone)]
pub struct SyncService {
    store: EntityStore,
    backend: Arc<dyn RemoteBackend>,
    user_id: Option<String>,
}

impl SyncService {
    pub fn new(store: EntityStore, backend: Arc<dyn RemoteBackend>, user_id: Option<String>) -> Self {
        Self {
            store,
            backend,
            user_id,
        }
    }

    /// Execute one queued operation. Failures are logged here and never
    /// propagated; the caller already moved on.
    pub async fn apply(&self, op: SyncOp) {
        let Some(user_id) = self.user_id.clone() else {
            tracing::warn!("No authenticated user, skipping remote sync: {:?}", op);
            return;
        };

        match op {
            SyncOp::UpsertNote(note) => {
                self.upsert(NOTES_TABLE, NoteRow::from_note(&note, &user_id))
                    .await;
            }
            SyncOp::TrashNote(deleted) => {
                self.upsert(
                    DELETED_NOTES_TABLE,
                    DeletedNoteRow::from_deleted_note(&deleted, &user_id),
                )
                .await;
                self.delete(NOTES_TABLE, &deleted.note.id).await;
            }
            SyncOp::RestoreNote(note) => {
                self.upsert(NOTES_TABLE, NoteRow::from_note(&note, &user_id))
                    .await;
                self.delete(DELETED_NOTES_TABLE, &note.id).await;
            }
            SyncOp::PurgeNote { id, image_urls } => {
                // Best-effort artifact cleanup; a stray image never
                // blocks removal of the record.
                for url in &image_urls {
                    if let Err(e) = self.backend.delete_artifact(url).await {
                        tracing::warn!("Failed to delete image artifact {}: {}", url, e);
                    }
                }
                self.delete(DELETED_NOTES_TABLE, &id).await;
            }
            SyncOp::UpsertFolder(folder) => {
                self.upsert(FOLDERS_TABLE, FolderRow::from_folder(&folder, &user_id))
                    .await;
            }
            SyncOp::UpsertFolders(folders) => {
                // Pre-ordered parents-first; uploaded sequentially so the
                // remote foreign key from child to parent always resolves.
                for folder in &folders {
                    self.upsert(FOLDERS_TABLE, FolderRow::from_folder(folder, &user_id))
                        .await;
                }
            }
            SyncOp::TrashFolder(deleted) => {
                self.upsert(
                    DELETED_FOLDERS_TABLE,
                    DeletedFolderRow::from_deleted_folder(&deleted, &user_id),
                )
                .await;
                self.delete(FOLDERS_TABLE, &deleted.folder.id).await;
            }
            SyncOp::RestoreFolder(folder) => {
                self.upsert(FOLDERS_TABLE, FolderRow::from_folder(&folder, &user_id))
                    .await;
                self.delete(DELETED_FOLDERS_TABLE, &folder.id).await;
            }
            SyncOp::PurgeFolder { id } => {
                self.delete(DELETED_FOLDERS_TABLE, &id).await;
            }
            SyncOp::PullAll => {
                if let Err(e) = self.pull_all().await {
                    tracing::warn!("Pull failed: {}", e);
                }
            }
            SyncOp::Shutdown => {}
        }
    }

    async fn upsert<R: serde::Serialize>(&self, table: &str, row: R) {
        let value = match serde_json::to_value(&row) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("Failed to encode row for {}: {}", table, e);
                return;
            }
        };
        if let Err(e) = self.backend.upsert_row(table, value).await {
            tracing::warn!("Remote upsert into {} failed: {}", table, e);
        }
    }

    async fn delete(&self, table: &str, id: &str) {
        if let Err(e) = self.backend.delete_row(table, id).await {
            tracing::warn!("Remote delete from {} failed: {}", table, e);
        }
    }

    /// Push the whole local state, folders in parent-first order so the
    /// remote parent foreign key always resolves.
    pub async fn push_all(&self) {
        let folders = hierarchy::topological_order(&self.store.list_folders().await);
        self.apply(SyncOp::UpsertFolders(folders)).await;

        for note in self.store.list_notes().await {
            self.apply(SyncOp::UpsertNote(note)).await;
        }
        for deleted in self.store.list_deleted_notes().await {
            self.apply(SyncOp::TrashNote(deleted)).await;
        }
        for deleted in self.store.list_deleted_folders().await {
            self.apply(SyncOp::TrashFolder(deleted)).await;
        }
    }

    /// Pull every collection. A collection is replaced only when the
    /// remote returned a non-empty list with at least one parseable
    /// row; otherwise the local collection is retained unchanged.
    pub async fn pull_all(&self) -> Result<()> {
        let Some(user_id) = self.user_id.clone() else {
            tracing::warn!("No authenticated user, skipping pull");
            return Err(AppError::Unauthenticated);
        };

        match self.backend.fetch_rows(NOTES_TABLE, &user_id).await {
            Ok(raw) => {
                let parsed = parse_rows(&raw, NoteRow::into_note);
                if replace_allowed(NOTES_TABLE, raw.len(), parsed.len()) {
                    self.store.replace_notes(parsed).await;
                }
            }
            Err(e) => tracing::warn!("Fetching {} failed: {}", NOTES_TABLE, e),
        }

        match self.backend.fetch_rows(FOLDERS_TABLE, &user_id).await {
            Ok(raw) => {
                let now = Utc::now();
                let parsed = parse_rows(&raw, |row: FolderRow| row.into_folder(now));
                if replace_allowed(FOLDERS_TABLE, raw.len(), parsed.len()) {
                    self.store.replace_folders(parsed).await;
                }
            }
            Err(e) => tracing::warn!("Fetching {} failed: {}", FOLDERS_TABLE, e),
        }

        match self.backend.fetch_rows(DELETED_NOTES_TABLE, &user_id).await {
            Ok(raw) => {
                let parsed = parse_rows(&raw, DeletedNoteRow::into_deleted_note);
                if replace_allowed(DELETED_NOTES_TABLE, raw.len(), parsed.len()) {
                    self.store.replace_deleted_notes(parsed).await;
                }
            }
            Err(e) => tracing::warn!("Fetching {} failed: {}", DELETED_NOTES_TABLE, e),
        }

        match self
            .backend
            .fetch_rows(DELETED_FOLDERS_TABLE, &user_id)
            .await
        {
            Ok(raw) => {
                let parsed = parse_rows(&raw, DeletedFolderRow::into_deleted_folder);
                if replace_allowed(DELETED_FOLDERS_TABLE, raw.len(), parsed.len()) {
                    self.store.replace_deleted_folders(parsed).await;
                }
            }
            Err(e) => tracing::warn!("Fetching {} failed: {}", DELETED_FOLDERS_TABLE, e),
        }

        Ok(())
    }
}

/// Decode and translate a raw batch, dropping (and logging) rows that
/// fail either step.
fn parse_rows<Row, Entity>(
    raw: &[Value],
    translate: impl Fn(Row) -> Result<Entity>,
) -> Vec<Entity>
where
    Row: DeserializeOwned,
{
    raw.iter()
        .filter_map(|value| match serde_json::from_value::<Row>(value.clone()) {
            Ok(row) => match translate(row) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    tracing::warn!("Dropping unparseable row: {}", e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Dropping undecodable row: {}", e);
                None
            }
        })
        .collect()
}

/// Defensive rule against transient bad responses: only replace local
/// state when the remote actually produced something usable.
fn replace_allowed(table: &str, fetched: usize, parsed: usize) -> bool {
    if fetched == 0 {
        tracing::debug!("Remote {} is empty, retaining local collection", table);
        false
    } else if parsed == 0 {
        tracing::warn!(
            "All {} rows from {} failed to parse, retaining local collection",
            fetched,
            table
        );
        false
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory backend recording every call.
    #[derive(Default)]
    struct MockBackend {
        tables: Mutex<HashMap<String, Vec<Value>>>,
        deleted_artifacts: Mutex<Vec<String>>,
        fail_writes: bool,
    }

    #[async_trait]
    impl RemoteBackend for MockBackend {
        async fn upsert_row(&self, table: &str, row: Value) -> crate::error::Result<()> {
            if self.fail_writes {
                return Err(AppError::RemoteWrite("simulated outage".to_string()));
            }
            let mut tables = self.tables.lock().unwrap();
            let rows = tables.entry(table.to_string()).or_default();
            let id = row.get("id").cloned();
            rows.retain(|r| r.get("id") != id.as_ref());
            rows.push(row);
            Ok(())
        }

        async fn delete_row(&self, table: &str, id: &str) -> crate::error::Result<()> {
            if self.fail_writes {
                return Err(AppError::RemoteWrite("simulated outage".to_string()));
            }
            let mut tables = self.tables.lock().unwrap();
            if let Some(rows) = tables.get_mut(table) {
                rows.retain(|r| r.get("id").and_then(|v| v.as_str()) != Some(id));
            }
            Ok(())
        }

        async fn fetch_rows(&self, table: &str, _user_id: &str) -> crate::error::Result<Vec<Value>> {
            Ok(self
                .tables
                .lock()
                .unwrap()
                .get(table)
                .cloned()
                .unwrap_or_default())
        }

        async fn delete_artifact(&self, url: &str) -> crate::error::Result<()> {
            self.deleted_artifacts.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    const USER: &str = "4f0c2f6e-2f47-4e36-b0f6-0a1b2c3d4e5f";

    fn note_value(id: &str, title: &str) -> Value {
        json!({
            "id": id,
            "user_id": USER,
            "title": title,
            "content": "",
            "is_locked": false,
            "date_created": "2026-08-01T09:30:00.000000Z",
            "date_modified": "2026-08-01T09:30:00.000000Z",
            "is_pinned": false,
            "folder_id": null,
            "image_attachments": [],
        })
    }

    fn sample_note(id: &str) -> crate::store::Note {
        let now = Utc::now();
        crate::store::Note {
            id: id.to_string(),
            title: "local".to_string(),
            content: String::new(),
            created_at: now,
            updated_at: now,
            is_pinned: false,
            is_locked: false,
            folder_id: None,
            image_urls: vec![],
        }
    }

    fn service_with(backend: MockBackend, store: EntityStore) -> SyncService {
        SyncService::new(store, Arc::new(backend), Some(USER.to_string()))
    }

    #[tokio::test]
    async fn test_pull_with_empty_remote_retains_local() {
        let store = EntityStore::new();
        store.insert_note(sample_note("n1")).await;
        let before = store.list_notes().await;

        let service = service_with(MockBackend::default(), store.clone());
        service.pull_all().await.unwrap();

        assert_eq!(store.list_notes().await, before);
    }

    #[tokio::test]
    async fn test_pull_with_all_bad_rows_retains_local() {
        let store = EntityStore::new();
        store.insert_note(sample_note("n1")).await;
        let before = store.list_notes().await;

        let backend = MockBackend::default();
        backend.tables.lock().unwrap().insert(
            NOTES_TABLE.to_string(),
            vec![note_value("not-a-uuid", "bad"), json!({"garbage": true})],
        );

        let service = service_with(backend, store.clone());
        service.pull_all().await.unwrap();

        assert_eq!(store.list_notes().await, before);
    }

    #[tokio::test]
    async fn test_pull_with_one_good_row_replaces_local() {
        let store = EntityStore::new();
        store.insert_note(sample_note("n1")).await;

        let backend = MockBackend::default();
        backend.tables.lock().unwrap().insert(
            NOTES_TABLE.to_string(),
            vec![
                note_value("aaaaaaaa-bbbb-4ccc-8ddd-eeeeffff0001", "remote"),
                note_value("not-a-uuid", "bad"),
            ],
        );

        let service = service_with(backend, store.clone());
        service.pull_all().await.unwrap();

        let notes = store.list_notes().await;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "remote");
    }

    #[tokio::test]
    async fn test_failed_write_leaves_local_untouched() {
        let store = EntityStore::new();
        store.insert_note(sample_note("n1")).await;

        let backend = MockBackend {
            fail_writes: true,
            ..Default::default()
        };
        let service = service_with(backend, store.clone());

        service
            .apply(SyncOp::UpsertNote(store.get_note("n1").await.unwrap()))
            .await;

        assert_eq!(store.list_notes().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unauthenticated_apply_is_noop() {
        let store = EntityStore::new();
        let backend = Arc::new(MockBackend::default());
        let service = SyncService::new(store.clone(), backend.clone(), None);

        service.apply(SyncOp::UpsertNote(sample_note("n1"))).await;

        assert!(backend.tables.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purge_note_deletes_artifacts_and_row() {
        let store = EntityStore::new();
        let backend = Arc::new(MockBackend::default());
        backend.tables.lock().unwrap().insert(
            DELETED_NOTES_TABLE.to_string(),
            vec![json!({"id": "aaaaaaaa-bbbb-4ccc-8ddd-eeeeffff0001"})],
        );

        let service =
            SyncService::new(store, backend.clone(), Some(USER.to_string()));
        service
            .apply(SyncOp::PurgeNote {
                id: "aaaaaaaa-bbbb-4ccc-8ddd-eeeeffff0001".to_string(),
                image_urls: vec!["https://cdn/img1".to_string(), "https://cdn/img2".to_string()],
            })
            .await;

        assert_eq!(backend.deleted_artifacts.lock().unwrap().len(), 2);
        assert!(backend.tables.lock().unwrap()[DELETED_NOTES_TABLE].is_empty());
    }
}
