//! Duplicate finder: enumeration, parallel hashing and indexing.
//!
//! # Overview
//!
//! A run moves through a fixed pipeline:
//! 1. **Validate** the roots (existence, directory, nesting rules)
//! 2. **Walk** every root in order, collecting [`FileRecord`]s
//! 3. **Hash** the records on a bounded rayon pool, collecting results in
//!    enumeration order
//! 4. **Index** the results with a single writer, either closed-set
//!    ([`DuplicateFinder::index_all`]) or two-pool
//!    ([`DuplicateFinder::index_between`])
//!
//! Hashing runs in parallel but the index is folded sequentially, so which
//! file becomes a group's original depends only on enumeration order.
//!
//! # Example
//!
//! ```no_run
//! use finddupes::duplicates::{DedupMode, DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let mode = DedupMode::TwoPool {
//!     sources: vec![PathBuf::from("/photos")],
//!     target: PathBuf::from("/downloads"),
//! };
//!
//! let report = finder.find(&mode).unwrap();
//! for group in &report.groups {
//!     println!("{} has {} copies", group.original().path.display(), group.duplicate_count());
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;

use super::groups::{DedupIndex, DuplicateGroup, SourceIndex};
use crate::error::{ConfigError, ExitCode};
use crate::progress::ProgressCallback;
use crate::scanner::{
    path_utils, FileRecord, Fingerprint, HashAlgorithm, HashError, Hasher, MultiWalker,
    ScanError, WalkerConfig, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE,
};

/// Which comparison a run performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DedupMode {
    /// Every file is compared against every other file under `roots`.
    ClosedSet {
        /// Directories pooled into one set
        roots: Vec<PathBuf>,
    },
    /// Files under `target` are compared against files under `sources`.
    TwoPool {
        /// Directories holding the originals
        sources: Vec<PathBuf>,
        /// Directory holding candidate copies
        target: PathBuf,
    },
}

impl DedupMode {
    /// Build a mode from a source list and an optional target.
    #[must_use]
    pub fn from_paths(sources: Vec<PathBuf>, target: Option<PathBuf>) -> Self {
        match target {
            Some(target) => Self::TwoPool { sources, target },
            None => Self::ClosedSet { roots: sources },
        }
    }

    /// The target directory, in two-pool mode.
    #[must_use]
    pub fn target(&self) -> Option<&Path> {
        match self {
            Self::ClosedSet { .. } => None,
            Self::TwoPool { target, .. } => Some(target),
        }
    }

    /// The source (or closed-set) roots.
    #[must_use]
    pub fn sources(&self) -> &[PathBuf] {
        match self {
            Self::ClosedSet { roots } => roots,
            Self::TwoPool { sources, .. } => sources,
        }
    }
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Digest algorithm for fingerprints.
    pub algorithm: HashAlgorithm,
    /// Read buffer size for hashing, in bytes.
    pub chunk_size: usize,
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("algorithm", &self.algorithm)
            .field("chunk_size", &self.chunk_size)
            .field("io_threads", &self.io_threads)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            io_threads: 4,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the hashing chunk size, clamped to `1..=MAX_CHUNK_SIZE` bytes.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, MAX_CHUNK_SIZE);
        self
    }

    /// Create a new configuration with custom I/O thread count.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
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
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Groups found by one indexing pass plus the files that could not be hashed.
#[derive(Debug, Default)]
pub struct IndexOutcome {
    /// Duplicate groups in materialization order
    pub groups: Vec<DuplicateGroup>,
    /// Files that were skipped because hashing failed
    pub errors: Vec<ScanError>,
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of files enumerated
    pub total_files: usize,
    /// Total size of all enumerated files in bytes
    pub total_size: u64,
    /// Files enumerated under the target, in two-pool mode
    pub target_files: usize,
    /// Files successfully hashed
    pub hashed_files: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Total space held by duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Every entry skipped during walking or hashing
    pub errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize(self.total_size).to_string()
    }

    /// Whether any entry was skipped.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn record_groups(&mut self, groups: &[DuplicateGroup]) {
        self.duplicate_groups = groups.len();
        self.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        self.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
    }
}

/// Result of a completed run.
#[derive(Debug)]
pub struct DedupReport {
    /// The comparison that was performed
    pub mode: DedupMode,
    /// Digest algorithm used for fingerprints
    pub algorithm: HashAlgorithm,
    /// Duplicate groups in materialization order
    pub groups: Vec<DuplicateGroup>,
    /// Counts, timings and skipped entries
    pub summary: ScanSummary,
}

impl DedupReport {
    /// Whether at least one duplicate was found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Exit code for a run that stops after reporting.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if !self.has_duplicates() {
            ExitCode::NoDuplicates
        } else if self.summary.has_errors() {
            ExitCode::PartialSuccess
        } else {
            ExitCode::Success
        }
    }
}

/// Errors that end a run without a report.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The run configuration was rejected before any hashing.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

type HashResults = Vec<(FileRecord, Result<Fingerprint, HashError>)>;

/// Duplicate finder that orchestrates the detection pipeline.
///
/// # Example
///
/// ```no_run
/// use finddupes::duplicates::DuplicateFinder;
/// use std::path::PathBuf;
///
/// let finder = DuplicateFinder::with_defaults();
/// match finder.find_duplicates_in_paths(vec![PathBuf::from(".")]) {
///     Ok(report) => println!("Found {} duplicate groups", report.groups.len()),
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new(config.algorithm).with_chunk_size(config.chunk_size);
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(Arc::clone(flag));
        }
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The finder's configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Check the roots of `mode` without touching file content.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a root is missing or not a directory, no
    /// source is given, or the target and a source are nested in either
    /// direction.
    pub fn validate(&self, mode: &DedupMode) -> Result<(), ConfigError> {
        let sources = mode.sources();
        if sources.is_empty() {
            return Err(ConfigError::NoSources);
        }

        for root in sources {
            check_directory(root)?;
        }

        if let Some(target) = mode.target() {
            check_directory(target)?;
            for source in sources {
                if path_utils::is_within(target, source) {
                    return Err(ConfigError::TargetInsideSource {
                        target: target.to_path_buf(),
                        source_dir: source.clone(),
                    });
                }
                if path_utils::is_within(source, target) {
                    return Err(ConfigError::SourceInsideTarget {
                        source_dir: source.clone(),
                        target: target.to_path_buf(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Run the full pipeline for `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Config`] when validation fails and
    /// [`FinderError::Interrupted`] when the shutdown flag is raised.
    /// Unreadable files never fail the run; they are listed in
    /// [`ScanSummary::errors`].
    pub fn find(&self, mode: &DedupMode) -> Result<DedupReport, FinderError> {
        self.validate(mode)?;

        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let outcome = match mode {
            DedupMode::ClosedSet { roots } => {
                log::info!("Starting closed-set scan of {} root(s)", roots.len());
                let files = self.enumerate(roots, &mut summary)?;
                self.index_all(files)?
            }
            DedupMode::TwoPool { sources, target } => {
                log::info!(
                    "Starting two-pool scan: {} source root(s) against {}",
                    sources.len(),
                    target.display()
                );
                let source_files = self.enumerate(sources, &mut summary)?;
                let target_files = self.enumerate(std::slice::from_ref(target), &mut summary)?;
                summary.target_files = target_files.len();
                self.index_between(source_files, target_files)?
            }
        };

        summary.hashed_files = summary.total_files.saturating_sub(outcome.errors.len());
        summary.errors.extend(outcome.errors);
        summary.record_groups(&outcome.groups);
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} files, {} duplicate groups, {} reclaimable, {} error(s) in {:.2?}",
            summary.total_files,
            summary.duplicate_groups,
            summary.reclaimable_display(),
            summary.errors.len(),
            summary.scan_duration
        );

        Ok(DedupReport {
            mode: mode.clone(),
            algorithm: self.config.algorithm,
            groups: outcome.groups,
            summary,
        })
    }

    /// Closed-set scan over `roots`.
    ///
    /// # Errors
    ///
    /// See [`DuplicateFinder::find`].
    pub fn find_duplicates_in_paths(&self, roots: Vec<PathBuf>) -> Result<DedupReport, FinderError> {
        self.find(&DedupMode::ClosedSet { roots })
    }

    /// Two-pool scan of `target` against `sources`.
    ///
    /// # Errors
    ///
    /// See [`DuplicateFinder::find`].
    pub fn find_matches(
        &self,
        sources: Vec<PathBuf>,
        target: PathBuf,
    ) -> Result<DedupReport, FinderError> {
        self.find(&DedupMode::TwoPool { sources, target })
    }

    /// Walk `roots` in order, collecting records and recording walk errors.
    fn enumerate(
        &self,
        roots: &[PathBuf],
        summary: &mut ScanSummary,
    ) -> Result<Vec<FileRecord>, FinderError> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        let mut walker = MultiWalker::new(roots.to_vec(), self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }

        let mut files = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => {
                    summary.total_files += 1;
                    summary.total_size += file.size;
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(files.len() + 1, &file.path.to_string_lossy());
                    }
                    files.push(file);
                }
                Err(e) => summary.errors.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        if self.config.is_shutdown_requested() {
            log::info!("Walking interrupted by shutdown signal");
            return Err(FinderError::Interrupted);
        }

        log::debug!("Enumerated {} files", files.len());
        Ok(files)
    }

    /// Closed-set indexing: group every record by fingerprint.
    ///
    /// Records are hashed in parallel and folded in the order given, so the
    /// first record of each group is the earliest one in `files`.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if shutdown was requested.
    pub fn index_all(&self, files: Vec<FileRecord>) -> Result<IndexOutcome, FinderError> {
        log::info!("Hashing {} files", files.len());
        let results = self.hash_files(files, "hashing")?;

        let mut index = DedupIndex::new();
        let mut errors = Vec::new();
        for (file, result) in results {
            match result {
                Ok(fingerprint) => {
                    index.insert(file, fingerprint);
                }
                Err(e) => errors.push(ScanError::Hash(e)),
            }
        }

        log::debug!(
            "Indexed {} distinct fingerprints into {} groups",
            index.fingerprint_count(),
            index.group_count()
        );

        Ok(IndexOutcome {
            groups: index.into_groups(),
            errors,
        })
    }

    /// Two-pool indexing: report target records that match a source record.
    ///
    /// Target records without a source counterpart are dropped, even when
    /// they duplicate each other.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if shutdown was requested.
    pub fn index_between(
        &self,
        sources: Vec<FileRecord>,
        targets: Vec<FileRecord>,
    ) -> Result<IndexOutcome, FinderError> {
        let mut errors = Vec::new();

        log::info!("Hashing {} source files", sources.len());
        let mut source_index = SourceIndex::new();
        for (file, result) in self.hash_files(sources, "source")? {
            match result {
                Ok(fingerprint) => {
                    source_index.insert(file, fingerprint);
                }
                Err(e) => errors.push(ScanError::Hash(e)),
            }
        }

        log::info!("Hashing {} target files", targets.len());
        let mut index = DedupIndex::new();
        for (file, result) in self.hash_files(targets, "target")? {
            match result {
                Ok(fingerprint) => match source_index.get(&fingerprint) {
                    Some(original) => {
                        index.insert_match(original, file, fingerprint);
                    }
                    None => log::trace!("No source match: {}", file.path.display()),
                },
                Err(e) => errors.push(ScanError::Hash(e)),
            }
        }

        Ok(IndexOutcome {
            groups: index.into_groups(),
            errors,
        })
    }

    /// Hash `files` on a bounded pool, returning results in input order.
    fn hash_files(&self, files: Vec<FileRecord>, phase: &str) -> Result<HashResults, FinderError> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(phase, files.len());
        }

        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()
        {
            Ok(pool) => pool.install(|| self.hash_parallel(files)),
            Err(e) => {
                log::warn!(
                    "Failed to create custom thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                self.hash_parallel(files)
            }
        };

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(phase);
        }

        if self.config.is_shutdown_requested() {
            log::info!("Hashing interrupted by shutdown signal");
            return Err(FinderError::Interrupted);
        }

        Ok(results)
    }

    fn hash_parallel(&self, files: Vec<FileRecord>) -> HashResults {
        files
            .into_par_iter()
            .enumerate()
            .map(|(idx, file)| {
                if let Some(ref callback) = self.config.progress_callback {
                    callback.on_progress(idx + 1, &file.path.to_string_lossy());
                }

                let result = self.hasher.hash_file(&file.path);
                match result {
                    Ok(ref fingerprint) => {
                        log::trace!("{} {}", fingerprint, file.path.display());
                        if let Some(ref callback) = self.config.progress_callback {
                            callback.on_item_completed(file.size);
                        }
                    }
                    Err(ref e) if e.is_interrupted() => {
                        log::debug!("Hashing stopped: {}", file.path.display());
                    }
                    Err(ref e) => log::warn!("Skipping {}: {}", file.path.display(), e),
                }
                (file, result)
            })
            .collect()
    }
}

fn check_directory(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(ConfigError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}
