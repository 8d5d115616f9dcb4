//! Removal of target-side duplicates found by a two-pool scan.
//!
//! # Overview
//!
//! Removal only ever runs on a two-pool [`DedupReport`]: every duplicate
//! lying under the scanned target is deleted, and the source original at
//! the head of each group is never touched.
//!
//! # Safety
//!
//! - The target passed to removal must be the target the report was built
//!   from; anything else is rejected before the first deletion.
//! - Each file's size is re-checked against the scanned size right before
//!   deletion. A file that changed in between is left alone and reported as
//!   modified.
//! - Every deletion is independent; a failure is recorded and the next file
//!   is attempted.
//!
//! # Example
//!
//! ```no_run
//! use finddupes::actions::{remove_duplicates, RemoveConfig};
//! use finddupes::duplicates::DuplicateFinder;
//! use std::path::{Path, PathBuf};
//!
//! let finder = DuplicateFinder::with_defaults();
//! let report = finder
//!     .find_matches(vec![PathBuf::from("/photos")], PathBuf::from("/downloads"))
//!     .unwrap();
//!
//! let removal = remove_duplicates(&report, Some(Path::new("/downloads")), &RemoveConfig::default())
//!     .unwrap();
//! println!("{}", removal.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::duplicates::DedupReport;
use crate::error::ConfigError;
use crate::scanner::{path_utils, FileRecord};

/// Error type for a single deletion.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File changed since the scan and was kept.
    #[error("file modified since scan: {path} (size {expected} -> {actual})")]
    Modified {
        /// File that changed
        path: PathBuf,
        /// Size recorded during the scan
        expected: u64,
        /// Size found before deletion
        actual: u64,
    },

    /// The duplicate does not lie under the removal target.
    #[error("refusing to delete outside the target: {0}")]
    OutsideTarget(PathBuf),

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// File the error refers to
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::OutsideTarget(p)
            | Self::Modified { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Outcome of one attempted deletion.
#[derive(Debug)]
pub struct RemovalOutcome {
    /// File that was targeted
    pub path: PathBuf,
    /// Bytes freed on success, or why the file was kept
    pub result: Result<u64, DeleteError>,
}

impl RemovalOutcome {
    /// Whether the file was deleted.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-file outcomes of a removal pass, in report order.
#[derive(Debug, Default)]
pub struct RemovalReport {
    /// One entry per attempted deletion
    pub outcomes: Vec<RemovalOutcome>,
    /// Total bytes freed.
    pub bytes_freed: u64,
    /// Whether the pass stopped early on a shutdown request
    pub interrupted: bool,
}

impl RemovalReport {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_removed()).count()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    /// Total number of attempted deletions.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.outcomes.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(RemovalOutcome::is_removed)
    }

    /// Errors of the failed deletions.
    pub fn failures(&self) -> impl Iterator<Item = &DeleteError> + '_ {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err())
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = bytesize::ByteSize(self.bytes_freed);
        if self.all_succeeded() {
            format!("Removed {} file(s), freed {}", self.success_count(), freed)
        } else {
            format!(
                "Removed {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                freed
            )
        }
    }
}

/// Callback trait for removal progress reporting.
pub trait RemoveProgressCallback: Send + Sync {
    /// Called before each file deletion.
    fn on_before_remove(&self, path: &Path, index: usize, total: usize);

    /// Called after each attempted deletion.
    fn on_removed(&self, outcome: &RemovalOutcome);
}

/// Configuration for removal.
#[derive(Clone)]
pub struct RemoveConfig {
    /// Re-check each file's size against the scanned size before deleting.
    pub verify_size: bool,
    /// Optional shutdown flag; remaining files are skipped once it is set.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn RemoveProgressCallback>>,
}

impl std::fmt::Debug for RemoveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoveConfig")
            .field("verify_size", &self.verify_size)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for RemoveConfig {
    fn default() -> Self {
        Self {
            verify_size: true,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl RemoveConfig {
    /// Enable/disable the size re-check.
    #[must_use]
    pub fn with_verify_size(mut self, verify: bool) -> Self {
        self.verify_size = verify;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn RemoveProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Delete every target-side duplicate in `report`.
///
/// # Errors
///
/// Returns [`ConfigError::RemovalWithoutTarget`] when `target_root` is
/// missing or `report` comes from a closed-set scan, and
/// [`ConfigError::TargetMismatch`] when `target_root` is not the directory
/// the report was built from. Both are raised before any deletion.
/// Per-file failures are not errors; they are listed in the returned
/// report.
pub fn remove_duplicates(
    report: &DedupReport,
    target_root: Option<&Path>,
    config: &RemoveConfig,
) -> Result<RemovalReport, ConfigError> {
    let given = target_root.ok_or(ConfigError::RemovalWithoutTarget)?;
    let scanned = report
        .mode
        .target()
        .ok_or(ConfigError::RemovalWithoutTarget)?;

    let target = path_utils::comparable_path(given);
    if target != path_utils::comparable_path(scanned) {
        return Err(ConfigError::TargetMismatch {
            given: given.to_path_buf(),
            scanned: scanned.to_path_buf(),
        });
    }

    let planned: Vec<&FileRecord> = report
        .groups
        .iter()
        .flat_map(|group| group.duplicates())
        .collect();
    let total = planned.len();
    log::info!("Removing {} duplicate(s) from {}", total, given.display());

    let mut removal = RemovalReport::default();
    for (index, file) in planned.into_iter().enumerate() {
        if config.is_shutdown_requested() {
            log::warn!(
                "Removal interrupted, {} file(s) not attempted",
                total - index
            );
            removal.interrupted = true;
            break;
        }

        if let Some(ref callback) = config.progress_callback {
            callback.on_before_remove(&file.path, index, total);
        }

        let result = if path_utils::comparable_path(&file.path).starts_with(&target) {
            remove_file(file, config.verify_size)
        } else {
            Err(DeleteError::OutsideTarget(file.path.clone()))
        };

        match result {
            Ok(size) => {
                log::info!("Removed: {} ({} bytes)", file.path.display(), size);
                removal.bytes_freed += size;
            }
            Err(ref e) => log::warn!("Failed to remove {}: {}", file.path.display(), e),
        }

        let outcome = RemovalOutcome {
            path: file.path.clone(),
            result,
        };
        if let Some(ref callback) = config.progress_callback {
            callback.on_removed(&outcome);
        }
        removal.outcomes.push(outcome);
    }

    log::info!("{}", removal.summary());
    Ok(removal)
}

/// Delete a single scanned file, returning the bytes freed.
///
/// # Errors
///
/// - `NotFound` if the file no longer exists
/// - `Modified` if `verify_size` is set and the size changed since the scan
/// - `PermissionDenied` or `Io` if the deletion itself fails
pub fn remove_file(file: &FileRecord, verify_size: bool) -> Result<u64, DeleteError> {
    let metadata =
        fs::symlink_metadata(&file.path).map_err(|e| DeleteError::from_io(&file.path, e))?;

    if verify_size && (!metadata.is_file() || metadata.len() != file.size) {
        return Err(DeleteError::Modified {
            path: file.path.clone(),
            expected: file.size,
            actual: metadata.len(),
        });
    }

    fs::remove_file(&file.path).map_err(|e| DeleteError::from_io(&file.path, e))?;
    Ok(metadata.len())
}
