//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "mode": { "kind": "two_pool", "sources": ["/photos"], "target": "/downloads" },
//!   "algorithm": "md5",
//!   "duplicates": [
//!     {
//!       "hash": "abc123...",
//!       "size": 1024,
//!       "original": { "path": "/photos/a.jpg", "label": "photos/a.jpg", "size": 1024 },
//!       "duplicates": [
//!         { "path": "/downloads/a.jpg", "label": "downloads/a.jpg", "size": 1024 }
//!       ]
//!     }
//!   ],
//!   "errors": [{ "path": "/photos/locked", "message": "Permission denied: /photos/locked" }],
//!   "summary": {
//!     "total_files": 100,
//!     "duplicate_groups": 5,
//!     "exit_code": 3,
//!     "exit_code_name": "FD003"
//!   },
//!   "removal": null
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use super::OutputError;
use crate::actions::RemovalReport;
use crate::duplicates::{DedupMode, DedupReport, DuplicateGroup, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::{FileRecord, HashAlgorithm};

/// One file in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Path as enumerated
    pub path: String,
    /// `parent/file` label
    pub label: String,
    /// File size in bytes
    pub size: u64,
}

impl From<&FileRecord> for JsonFile {
    fn from(file: &FileRecord) -> Self {
        Self {
            path: file.path.to_string_lossy().into_owned(),
            label: file.label(),
            size: file.size,
        }
    }
}

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Fingerprint as lowercase hexadecimal
    pub hash: String,
    /// Size of the original in bytes
    pub size: u64,
    /// The retained original
    pub original: JsonFile,
    /// Copies of the original, in discovery order
    pub duplicates: Vec<JsonFile>,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from a DuplicateGroup.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            hash: group.hash_hex(),
            size: group.size,
            original: JsonFile::from(group.original()),
            duplicates: group.duplicates().iter().map(JsonFile::from).collect(),
        }
    }
}

/// A skipped path in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonError {
    /// The path that was skipped
    pub path: String,
    /// Why it was skipped
    pub message: String,
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Files under the target, in two-pool mode
    pub target_files: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates (bytes)
    pub reclaimable_space: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "FD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            target_files: summary.target_files,
            hashed_files: summary.hashed_files,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// One removal outcome in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRemovalOutcome {
    /// File that was targeted
    pub path: String,
    /// Whether it was deleted
    pub removed: bool,
    /// Bytes freed, when deleted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    /// Why it was kept, when not deleted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Removal pass in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRemoval {
    /// Per-file outcomes in report order
    pub outcomes: Vec<JsonRemovalOutcome>,
    /// Total bytes freed
    pub bytes_freed: u64,
    /// Whether the pass stopped early
    pub interrupted: bool,
}

impl From<&RemovalReport> for JsonRemoval {
    fn from(removal: &RemovalReport) -> Self {
        Self {
            outcomes: removal
                .outcomes
                .iter()
                .map(|o| JsonRemovalOutcome {
                    path: o.path.to_string_lossy().into_owned(),
                    removed: o.is_removed(),
                    bytes: o.result.as_ref().ok().copied(),
                    error: o.result.as_ref().err().map(ToString::to_string),
                })
                .collect(),
            bytes_freed: removal.bytes_freed,
            interrupted: removal.interrupted,
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// The comparison that was performed
    pub mode: DedupMode,
    /// Digest algorithm
    pub algorithm: HashAlgorithm,
    /// List of duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Paths skipped during the scan
    pub errors: Vec<JsonError>,
    /// Scan summary statistics
    pub summary: JsonSummary,
    /// Removal outcomes, when removal ran
    pub removal: Option<JsonRemoval>,
}

impl JsonOutput {
    /// Create a new JSON output from a report, an optional removal pass and
    /// the run's exit code.
    #[must_use]
    pub fn new(report: &DedupReport, removal: Option<&RemovalReport>, exit_code: ExitCode) -> Self {
        Self {
            mode: report.mode.clone(),
            algorithm: report.algorithm,
            duplicates: report
                .groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            errors: report
                .summary
                .errors
                .iter()
                .map(|e| JsonError {
                    path: e.path().to_string_lossy().into_owned(),
                    message: e.to_string(),
                })
                .collect(),
            summary: JsonSummary::from_scan_summary(&report.summary, exit_code),
            removal: removal.map(JsonRemoval::from),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON and a trailing newline to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), OutputError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}
