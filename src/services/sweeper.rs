//! Retention sweeper
//!
//! Scans the deleted collections and permanently purges entries whose
//! deletion timestamp is strictly older than the retention window.
//! Runs on demand; an optional background loop re-runs it on an
//! interval chosen by the caller.

use crate::config::{DEFAULT_SWEEP_INTERVAL_SECS, TRASH_RETENTION_DAYS};
use crate::services::trash::TrashService;
use crate::store::EntityStore;
use chrono::{DateTime, Duration, Utc};

/// Counts from one sweep pass
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub notes_purged: usize,
    pub folders_purged: usize,
}

/// Sweeper over both deleted collections
#[derive(Clone)]
pub struct RetentionSweeper {
    store: EntityStore,
    trash: TrashService,
}

impl RetentionSweeper {
    pub fn new(store: EntityStore, trash: TrashService) -> Self {
        Self { store, trash }
    }

    /// Purge everything in the trash that expired before now.
    pub async fn sweep(&self) -> SweepOutcome {
        self.sweep_at(Utc::now()).await
    }

    /// Purge entries deleted strictly more than the retention window
    /// before `now`. An entry deleted exactly at the boundary is kept
    /// until the next pass.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> SweepOutcome {
        let cutoff = now - Duration::days(TRASH_RETENTION_DAYS);
        let mut outcome = SweepOutcome::default();

        for deleted in self.store.list_deleted_notes().await {
            if deleted.deleted_at < cutoff && self.trash.purge_note(&deleted.note.id).await {
                outcome.notes_purged += 1;
            }
        }

        for deleted in self.store.list_deleted_folders().await {
            if deleted.deleted_at < cutoff && self.trash.purge_folder(&deleted.folder.id).await {
                outcome.folders_purged += 1;
            }
        }

        if outcome.notes_purged > 0 || outcome.folders_purged > 0 {
            tracing::info!(
                "Retention sweep purged {} notes and {} folders",
                outcome.notes_purged,
                outcome.folders_purged
            );
        }

        outcome
    }

    /// Start the background sweep loop with the default interval.
    pub fn start_scheduler(self) {
        self.start_scheduler_with_interval(std::time::Duration::from_secs(
            DEFAULT_SWEEP_INTERVAL_SECS,
        ));
    }

    /// Start the background sweep loop with a caller-chosen interval.
    pub fn start_scheduler_with_interval(self, interval: std::time::Duration) {
        tokio::spawn(async move {
            tracing::info!("Starting retention sweeper");

            let mut ticker = tokio::time::interval(interval);

            loop {
                ticker.tick().await;
                self.sweep().await;
            }
        });
    }
}
