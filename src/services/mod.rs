//! Services module
//!
//! Business logic services that coordinate between the host application
//! and the entity store.

pub mod hierarchy;
pub mod notes;
pub mod stats;
pub mod sweeper;
pub mod trash;

pub use notes::NotesService;
pub use sweeper::RetentionSweeper;
pub use trash::TrashService;
