//! Error types for the notesync data layer
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized across an FFI boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Folder cycle: {0} would become its own ancestor")]
    FolderCycle(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error("Remote write failed: {0}")]
    RemoteWrite(String),

    #[error("No authenticated user")]
    Unauthenticated,

    #[error("{0}")]
    Generic(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
