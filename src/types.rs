//! Core types for ipfs-batch-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One row of the input manifest
///
/// The three required fields are populated from the `name`, `unit-name`, and
/// `url` columns; the optional MIME hint comes from `metadata_mime_type`.
/// Any other column is preserved opaquely in [`extra`](Self::extra) and never
/// interpreted by the pipeline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Display name, first filename component
    pub display_name: String,
    /// Unit label, second filename component
    pub unit_label: String,
    /// Source reference, expected scheme `ipfs://<cid>[#fragment]`
    pub source_uri: String,
    /// Free-text MIME type hint, used only for extension inference
    pub mime_hint: Option<String>,
    /// Unrecognized manifest columns, passed through untouched
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl AssetRecord {
    /// Whether all three required fields are non-empty after trimming
    ///
    /// Records failing this check are silently excluded from processing and
    /// from success/failure counts.
    pub fn has_required_fields(&self) -> bool {
        !self.display_name.trim().is_empty()
            && !self.unit_label.trim().is_empty()
            && !self.source_uri.trim().is_empty()
    }
}

/// Terminal status of one processed record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    /// Payload retrieved with HTTP 200
    Success,
    /// Source URI did not use the `ipfs://` scheme; neither success nor failure
    SkippedScheme,
    /// Gateway answered with a non-200 status
    Http(u16),
    /// Fetch timed out
    Timeout,
    /// Transport-level failure
    Network(String),
}

impl FetchStatus {
    /// Whether this status counts as a failure in session accounting
    ///
    /// Scheme skips count as neither success nor failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            FetchStatus::Http(_) | FetchStatus::Timeout | FetchStatus::Network(_)
        )
    }
}

/// Result of processing one [`AssetRecord`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Derived output filename for this record
    pub filename: String,
    /// Terminal status
    pub status: FetchStatus,
    /// Payload bytes, present iff `status == Success`
    ///
    /// Ownership moves to the packager or filesystem writer; the option is
    /// taken out at that point so the bytes are not held twice.
    pub payload: Option<Vec<u8>>,
}

/// One packaged archive part
///
/// Created when a part is sealed; never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveHandle {
    /// Path of the written ZIP file
    pub path: PathBuf,
    /// On-disk size of the part in bytes
    pub size_bytes: u64,
    /// Number of member entries in the part
    pub member_count: usize,
    /// 1-based position of this part in the run's output sequence
    pub sequence_index: usize,
}

/// State of one end-to-end run
///
/// Created when a run starts, mutated only by the pipeline while it runs,
/// finalized once the run completes, then handed back to the caller.
#[derive(Clone, Debug, Default)]
pub struct BatchSession {
    /// Total records in the manifest (including rows later skipped)
    pub total_records: usize,
    /// Records seen so far, skipped rows included
    pub processed_count: usize,
    /// Records fetched successfully
    pub success_count: usize,
    /// Records whose fetch failed
    pub fail_count: usize,
    /// Append-only run log, insertion order significant
    pub log: Vec<String>,
    /// Archive parts written (empty in directory mode)
    pub archives: Vec<ArchiveHandle>,
    /// Directory individual files were written to (directory mode only)
    pub output_dir: Option<PathBuf>,
    /// When the run started
    pub started_at: Option<DateTime<Utc>>,
    /// When the run finished
    pub finished_at: Option<DateTime<Utc>>,
    /// Whether the run stopped before processing every record
    /// (structural manifest error or cancellation)
    pub aborted: bool,
}

/// Progress hook, called with a fraction in `0.0..=1.0` after each record
pub type ProgressFn = dyn Fn(f64) + Send + Sync;

/// Log hook, called once per user-visible log line
pub type LogFn = dyn Fn(&str) + Send + Sync;
