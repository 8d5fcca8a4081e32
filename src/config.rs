//! Application configuration constants
//!
//! Central location for configuration constants, resource limits,
//! and remote table names used throughout the crate.

// ===== Trash Retention =====

/// Days a soft-deleted entity stays in the trash before it becomes
/// eligible for permanent deletion.
pub const TRASH_RETENTION_DAYS: i64 = 30;

// ===== Folder Hierarchy Limits =====

/// Depth reporting cap for folder nesting.
/// The UI assumes at most three levels; deeper (or cyclic) parent chains
/// are truncated to this value rather than treated as an error.
pub const MAX_FOLDER_DEPTH: usize = 3;

// ===== Sync Queue =====

/// Capacity of the bounded sync queue. Operations enqueued while the
/// queue is full are dropped with a warning and reconciled by the next
/// full pull.
pub const SYNC_QUEUE_CAPACITY: usize = 256;

/// Default interval between automatic retention sweeps, in seconds.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;

// ===== Remote Table Names =====

pub const NOTES_TABLE: &str = "notes";
pub const DELETED_NOTES_TABLE: &str = "deleted_notes";
pub const FOLDERS_TABLE: &str = "folders";
pub const DELETED_FOLDERS_TABLE: &str = "deleted_folders";
