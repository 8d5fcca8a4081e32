//! Integration tests for notesync
//!
//! These tests verify end-to-end functionality including:
//! - Cascading folder deletion and remote mirroring
//! - Trash round trips
//! - Retention sweeping
//! - Pull semantics against a remote backend

use async_trait::async_trait;
use chrono::{Duration, Utc};
use notesync::app::AppState;
use notesync::config::{DELETED_FOLDERS_TABLE, DELETED_NOTES_TABLE, FOLDERS_TABLE, NOTES_TABLE};
use notesync::error::Result;
use notesync::store::{CreateFolderRequest, CreateNoteRequest, UpdateNoteRequest};
use notesync::sync::RemoteBackend;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const USER: &str = "4f0c2f6e-2f47-4e36-b0f6-0a1b2c3d4e5f";

/// In-memory remote backend recording every row and artifact change.
#[derive(Default)]
struct MockBackend {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    deleted_artifacts: Mutex<Vec<String>>,
}

impl MockBackend {
    fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn ids(&self, table: &str) -> Vec<String> {
        self.rows(table)
            .iter()
            .filter_map(|r| r.get("id").and_then(|v| v.as_str()).map(String::from))
            .collect()
    }

    fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables.lock().unwrap().insert(table.to_string(), rows);
    }
}

#[async_trait]
impl RemoteBackend for MockBackend {
    async fn upsert_row(&self, table: &str, row: Value) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let id = row.get("id").cloned();
        rows.retain(|r| r.get("id") != id.as_ref());
        rows.push(row);
        Ok(())
    }

    async fn delete_row(&self, table: &str, id: &str) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|r| r.get("id").and_then(|v| v.as_str()) != Some(id));
        }
        Ok(())
    }

    async fn fetch_rows(&self, table: &str, _user_id: &str) -> Result<Vec<Value>> {
        Ok(self.rows(table))
    }

    async fn delete_artifact(&self, url: &str) -> Result<()> {
        self.deleted_artifacts.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

fn create_app() -> (AppState, Arc<MockBackend>) {
    notesync::logging::try_init_logging();

    let backend = Arc::new(MockBackend::default());
    let app = AppState::new(backend.clone(), Some(USER.to_string()));
    (app, backend)
}

#[tokio::test]
async fn test_cascading_delete_mirrors_to_remote() {
    let (app, backend) = create_app();

    // A (root) <- B <- C
    let a = app
        .notes
        .create_folder(CreateFolderRequest {
            name: "A".to_string(),
            color: "#ff0000".to_string(),
            parent_folder_id: None,
        })
        .await
        .unwrap();
    let b = app
        .notes
        .create_folder(CreateFolderRequest {
            name: "B".to_string(),
            color: "#00ff00".to_string(),
            parent_folder_id: Some(a.id.clone()),
        })
        .await
        .unwrap();
    let c = app
        .notes
        .create_folder(CreateFolderRequest {
            name: "C".to_string(),
            color: "#0000ff".to_string(),
            parent_folder_id: Some(b.id.clone()),
        })
        .await
        .unwrap();

    let note = app
        .notes
        .create_note(CreateNoteRequest {
            title: "filed in C".to_string(),
            content: "body".to_string(),
            folder_id: Some(c.id.clone()),
            image_urls: vec![],
        })
        .await
        .unwrap();

    let deletion_set = app.notes.delete_folder(&a.id).await.unwrap();
    assert_eq!(deletion_set.len(), 3);

    app.shutdown().await;

    // Active remote tables drained, shadow tables populated.
    assert!(backend.ids(FOLDERS_TABLE).is_empty());
    assert!(backend.ids(NOTES_TABLE).is_empty());

    let mut deleted_folders = backend.ids(DELETED_FOLDERS_TABLE);
    deleted_folders.sort();
    let mut expected = vec![a.id, b.id, c.id];
    expected.sort();
    assert_eq!(deleted_folders, expected);

    assert_eq!(backend.ids(DELETED_NOTES_TABLE), vec![note.id]);
}

#[tokio::test]
async fn test_trash_restore_round_trip_mirrors_to_remote() {
    let (app, backend) = create_app();

    let note = app
        .notes
        .create_note(CreateNoteRequest {
            title: "keeper".to_string(),
            content: "body".to_string(),
            folder_id: None,
            image_urls: vec![],
        })
        .await
        .unwrap();

    app.notes.delete_note(&note.id).await.unwrap();
    let restored = app.notes.restore_note(&note.id).await.unwrap();
    assert_eq!(restored, note);

    app.shutdown().await;

    assert_eq!(backend.ids(NOTES_TABLE), vec![note.id]);
    assert!(backend.ids(DELETED_NOTES_TABLE).is_empty());
}

#[tokio::test]
async fn test_sweep_purges_expired_trash_and_artifacts() {
    let (app, backend) = create_app();

    let note = app
        .notes
        .create_note(CreateNoteRequest {
            title: "old receipt".to_string(),
            content: "$9.99".to_string(),
            folder_id: None,
            image_urls: vec!["https://cdn/receipt.jpg".to_string()],
        })
        .await
        .unwrap();

    // Backdate the deletion past the retention window.
    app.store
        .trash_note(&note.id, Utc::now() - Duration::days(31))
        .await
        .unwrap();

    let outcome = app.sweeper.sweep().await;
    assert_eq!(outcome.notes_purged, 1);
    assert!(app.store.list_deleted_notes().await.is_empty());

    app.shutdown().await;

    assert!(backend.ids(DELETED_NOTES_TABLE).is_empty());
    assert_eq!(
        *backend.deleted_artifacts.lock().unwrap(),
        vec!["https://cdn/receipt.jpg".to_string()]
    );
}

#[tokio::test]
async fn test_signed_out_mutations_stay_local() {
    let backend = Arc::new(MockBackend::default());
    let app = AppState::new(backend.clone(), None);

    let note = app
        .notes
        .create_note(CreateNoteRequest {
            title: "offline".to_string(),
            content: "body".to_string(),
            folder_id: None,
            image_urls: vec![],
        })
        .await
        .unwrap();

    assert!(app.store.get_note(&note.id).await.is_ok());

    app.shutdown().await;

    assert!(backend.tables.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_pull_replaces_local_with_remote() {
    let (app, backend) = create_app();

    // Insert directly so no push op races the seeded remote state.
    let now = Utc::now();
    app.store
        .insert_note(notesync::store::Note {
            id: "bbbbbbbb-cccc-4ddd-8eee-ffff00001111".to_string(),
            title: "stale local".to_string(),
            content: String::new(),
            created_at: now,
            updated_at: now,
            is_pinned: false,
            is_locked: false,
            folder_id: None,
            image_urls: vec![],
        })
        .await;

    backend.seed(
        NOTES_TABLE,
        vec![json!({
            "id": "aaaaaaaa-bbbb-4ccc-8ddd-eeeeffff0001",
            "user_id": USER,
            "title": "remote truth",
            "content": "",
            "is_locked": false,
            "date_created": "2026-08-01T09:30:00.000000Z",
            "date_modified": "2026-08-01T09:30:00.000000Z",
            "is_pinned": false,
            "folder_id": null,
            "image_attachments": "[\"url1\",\"url2\"]",
        })],
    );

    let store = app.store.clone();
    app.request_pull();
    app.shutdown().await;

    let notes = store.list_notes().await;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "remote truth");
    // Legacy string-encoded attachments decode like the array form.
    assert_eq!(notes[0].image_urls, vec!["url1", "url2"]);
}

#[tokio::test]
async fn test_full_push_uploads_parents_before_children() {
    let (app, backend) = create_app();

    let now = Utc::now();
    let folder = |id: &str, parent: Option<&str>| notesync::store::Folder {
        id: id.to_string(),
        name: id.to_string(),
        color: "#123456".to_string(),
        parent_folder_id: parent.map(String::from),
        created_at: now,
        updated_at: now,
    };

    // Insert children first to make the upload order do the work.
    app.store.insert_folder(folder("c", Some("b"))).await;
    app.store.insert_folder(folder("b", Some("a"))).await;
    app.store.insert_folder(folder("a", None)).await;

    app.sync.push_all().await;
    app.shutdown().await;

    let ids = backend.ids(FOLDERS_TABLE);
    let pos = |id: &str| ids.iter().position(|i| i == id).unwrap();
    assert!(pos("a") < pos("b"));
    assert!(pos("b") < pos("c"));
}

#[tokio::test]
async fn test_updates_are_mirrored_in_order() {
    let (app, backend) = create_app();

    let note = app
        .notes
        .create_note(CreateNoteRequest {
            title: "v1".to_string(),
            content: String::new(),
            folder_id: None,
            image_urls: vec![],
        })
        .await
        .unwrap();

    app.notes
        .update_note(UpdateNoteRequest {
            id: note.id.clone(),
            title: Some("v2".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    app.shutdown().await;

    let rows = backend.rows(NOTES_TABLE);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("title").and_then(|v| v.as_str()), Some("v2"));
}
