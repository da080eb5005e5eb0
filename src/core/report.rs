use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::engine::MirrorProgress;

/// Summary of one mirror run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorReport {
    /// Job identifier (matches config)
    pub job_id: String,

    /// Canonicalized source root
    pub source: PathBuf,

    /// Canonicalized destination root
    pub target: PathBuf,

    /// Start timestamp
    pub started_at: DateTime<Utc>,

    /// Completion timestamp (None if the run aborted)
    pub completed_at: Option<DateTime<Utc>>,

    /// Files written to the destination
    pub files_copied: u64,

    /// Files skipped because source and destination were the same file
    pub files_skipped: u64,

    /// Destination entries removed (files and directories)
    pub entries_deleted: u64,

    /// Total bytes copied
    pub bytes_copied: u64,

    /// Source directories traversed
    pub directories_scanned: u64,

    /// Whether the run completed successfully
    pub is_complete: bool,
}

impl MirrorReport {
    pub fn new(job_id: String, source: PathBuf, target: PathBuf) -> Self {
        Self {
            job_id,
            source,
            target,
            started_at: Utc::now(),
            completed_at: None,
            files_copied: 0,
            files_skipped: 0,
            entries_deleted: 0,
            bytes_copied: 0,
            directories_scanned: 0,
            is_complete: false,
        }
    }

    /// Take the current counters from a progress snapshot
    pub fn record(&mut self, progress: &MirrorProgress) {
        self.files_copied = progress.files_copied;
        self.files_skipped = progress.files_skipped;
        self.entries_deleted = progress.entries_deleted;
        self.bytes_copied = progress.bytes_copied;
        self.directories_scanned = progress.directories_scanned;
    }

    pub fn mark_complete(&mut self) {
        self.completed_at = Some(Utc::now());
        self.is_complete = true;
    }
}
