//! Entity models
//!
//! Rust structs representing the local entities.
//! All models use serde for serialization to the host application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note with optional folder placement and image attachments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub folder_id: Option<String>,
    /// Remote URLs of attached images, in display order
    pub image_urls: Vec<String>,
}

/// A folder in the self-referential folder forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub color: String,
    pub parent_folder_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shadow copy of a soft-deleted note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedNote {
    pub note: Note,
    pub deleted_at: DateTime<Utc>,
}

/// Shadow copy of a soft-deleted folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedFolder {
    pub folder: Folder,
    pub deleted_at: DateTime<Utc>,
}

/// Create note request
#[derive(Debug, Default, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub folder_id: Option<String>,
    pub image_urls: Vec<String>,
}

/// Update note request. `None` fields are left untouched; `folder_id`
/// is doubly optional so a note can be moved out of its folder.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateNoteRequest {
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_pinned: Option<bool>,
    pub is_locked: Option<bool>,
    pub folder_id: Option<Option<String>>,
    pub image_urls: Option<Vec<String>>,
}

/// Create folder request
#[derive(Debug, Default, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
    pub color: String,
    pub parent_folder_id: Option<String>,
}

/// Update folder request
#[derive(Debug, Default, Deserialize)]
pub struct UpdateFolderRequest {
    pub id: String,
    pub name: Option<String>,
    pub color: Option<String>,
    pub parent_folder_id: Option<Option<String>>,
}

/// Budget period for expense tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Yearly,
}

/// Spending limit configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseBudget {
    pub id: String,
    pub limit: f64,
    pub period: BudgetPeriod,
}

/// Reminder cadence for expense review notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderCadence {
    Daily,
    Weekly,
    Monthly,
}

/// Expense review reminder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseReminder {
    pub id: String,
    pub cadence: ReminderCadence,
    /// Hour of day (0-23) the reminder fires
    pub hour_of_day: u8,
}
