//! Remote row representations
//!
//! Row structs mirroring the remote relational tables, plus the
//! translation between rows and local entities. Translation is lenient:
//! a malformed row is dropped from its batch and never aborts a pull.

use crate::error::{AppError, Result};
use crate::store::{DeletedFolder, DeletedNote, Folder, Note};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Row in the `notes` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub is_locked: bool,
    pub date_created: String,
    pub date_modified: String,
    pub is_pinned: bool,
    #[serde(default)]
    pub folder_id: Option<String>,
    /// Either an array of strings (current) or a JSON-encoded string
    /// holding such an array (legacy).
    #[serde(default)]
    pub image_attachments: Option<Value>,
}

/// Row in the `deleted_notes` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedNoteRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub folder_id: Option<String>,
    pub is_pinned: bool,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: String,
}

/// Row in the `folders` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub parent_folder_id: Option<String>,
}

/// Row in the `deleted_folders` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedFolderRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub parent_folder_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: String,
}

/// Parse an ISO-8601 timestamp. The fractional-seconds form with an
/// offset is preferred; a plain `YYYY-MM-DDTHH:MM:SS` without offset
/// falls back to UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| AppError::InvalidRow(format!("unparseable timestamp: {s}")))
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

fn validate_id(id: &str) -> Result<String> {
    Uuid::parse_str(id)
        .map(|_| id.to_string())
        .map_err(|_| AppError::InvalidRow(format!("malformed id: {id}")))
}

/// A malformed optional reference is treated as absent rather than
/// dropping the whole row.
fn lenient_reference(id: Option<String>) -> Option<String> {
    match id {
        Some(id) if Uuid::parse_str(&id).is_ok() => Some(id),
        Some(id) => {
            tracing::warn!("Dropping malformed folder reference: {}", id);
            None
        }
        None => None,
    }
}

/// Decode `image_attachments`, attempting the current array encoding
/// first and the legacy JSON-encoded-string encoding second. Yields an
/// empty list when both fail.
pub fn decode_image_attachments(value: Option<&Value>) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };

    if let Some(array) = value.as_array() {
        return array
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect();
    }

    if let Some(encoded) = value.as_str() {
        match serde_json::from_str::<Vec<String>>(encoded) {
            Ok(urls) => return urls,
            Err(e) => {
                tracing::warn!("Unparseable legacy image_attachments field: {}", e);
            }
        }
    }

    Vec::new()
}

impl NoteRow {
    pub fn from_note(note: &Note, user_id: &str) -> Self {
        Self {
            id: note.id.clone(),
            user_id: user_id.to_string(),
            title: note.title.clone(),
            content: note.content.clone(),
            is_locked: note.is_locked,
            date_created: format_timestamp(note.created_at),
            date_modified: format_timestamp(note.updated_at),
            is_pinned: note.is_pinned,
            folder_id: note.folder_id.clone(),
            image_attachments: Some(Value::Array(
                note.image_urls.iter().cloned().map(Value::String).collect(),
            )),
        }
    }

    pub fn into_note(self) -> Result<Note> {
        let image_urls = decode_image_attachments(self.image_attachments.as_ref());
        Ok(Note {
            id: validate_id(&self.id)?,
            title: self.title,
            content: self.content,
            created_at: parse_timestamp(&self.date_created)?,
            updated_at: parse_timestamp(&self.date_modified)?,
            is_pinned: self.is_pinned,
            is_locked: self.is_locked,
            folder_id: lenient_reference(self.folder_id),
            image_urls,
        })
    }
}

impl DeletedNoteRow {
    pub fn from_deleted_note(deleted: &DeletedNote, user_id: &str) -> Self {
        Self {
            id: deleted.note.id.clone(),
            user_id: user_id.to_string(),
            title: deleted.note.title.clone(),
            content: deleted.note.content.clone(),
            folder_id: deleted.note.folder_id.clone(),
            is_pinned: deleted.note.is_pinned,
            created_at: format_timestamp(deleted.note.created_at),
            updated_at: format_timestamp(deleted.note.updated_at),
            deleted_at: format_timestamp(deleted.deleted_at),
        }
    }

    /// The `deleted_notes` table does not carry lock state or image
    /// attachments, so those reset on a round trip through a pull.
    pub fn into_deleted_note(self) -> Result<DeletedNote> {
        Ok(DeletedNote {
            note: Note {
                id: validate_id(&self.id)?,
                title: self.title,
                content: self.content,
                created_at: parse_timestamp(&self.created_at)?,
                updated_at: parse_timestamp(&self.updated_at)?,
                is_pinned: self.is_pinned,
                is_locked: false,
                folder_id: lenient_reference(self.folder_id),
                image_urls: Vec::new(),
            },
            deleted_at: parse_timestamp(&self.deleted_at)?,
        })
    }
}

impl FolderRow {
    pub fn from_folder(folder: &Folder, user_id: &str) -> Self {
        Self {
            id: folder.id.clone(),
            user_id: user_id.to_string(),
            name: folder.name.clone(),
            color: folder.color.clone(),
            parent_folder_id: folder.parent_folder_id.clone(),
        }
    }

    /// The `folders` table carries no timestamps; a pulled folder gets
    /// fresh local ones.
    pub fn into_folder(self, now: DateTime<Utc>) -> Result<Folder> {
        Ok(Folder {
            id: validate_id(&self.id)?,
            name: self.name,
            color: self.color,
            parent_folder_id: lenient_reference(self.parent_folder_id),
            created_at: now,
            updated_at: now,
        })
    }
}

impl DeletedFolderRow {
    pub fn from_deleted_folder(deleted: &DeletedFolder, user_id: &str) -> Self {
        Self {
            id: deleted.folder.id.clone(),
            user_id: user_id.to_string(),
            name: deleted.folder.name.clone(),
            color: deleted.folder.color.clone(),
            parent_folder_id: deleted.folder.parent_folder_id.clone(),
            created_at: format_timestamp(deleted.folder.created_at),
            updated_at: format_timestamp(deleted.folder.updated_at),
            deleted_at: format_timestamp(deleted.deleted_at),
        }
    }

    pub fn into_deleted_folder(self) -> Result<DeletedFolder> {
        Ok(DeletedFolder {
            folder: Folder {
                id: validate_id(&self.id)?,
                name: self.name,
                color: self.color,
                parent_folder_id: lenient_reference(self.parent_folder_id),
                created_at: parse_timestamp(&self.created_at)?,
                updated_at: parse_timestamp(&self.updated_at)?,
            },
            deleted_at: parse_timestamp(&self.deleted_at)?,
        })
    }
}
