//! Structured error handling, configuration errors and exit codes.

use std::path::PathBuf;

use serde::Serialize;

/// Exit codes for the finddupes application.
///
/// - 0: Success (completed normally, duplicates found)
/// - 1: General error (unexpected failure)
/// - 2: No duplicates found (completed normally, no duplicates)
/// - 3: Partial success (completed with some non-fatal errors)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Scan completed and duplicates were found.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Partial success: Scan completed but encountered some non-fatal errors.
    PartialSuccess = 3,
    /// Interrupted: Scan was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "FD000",
            Self::GeneralError => "FD001",
            Self::NoDuplicates => "FD002",
            Self::PartialSuccess => "FD003",
            Self::Interrupted => "FD130",
        }
    }

    /// Pick the exit code for an error that escaped `run_app`.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        let interrupted = err
            .downcast_ref::<crate::duplicates::FinderError>()
            .is_some_and(|e| matches!(e, crate::duplicates::FinderError::Interrupted));
        if interrupted {
            Self::Interrupted
        } else {
            Self::GeneralError
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "FD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}

/// Invalid run configuration.
///
/// Always raised before any hashing or deletion starts.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A root does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// A root exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// No source directory was given.
    #[error("At least one source directory is required")]
    NoSources,

    /// The target is a source, or lies inside one.
    #[error("Target {target} is inside source {source_dir}")]
    TargetInsideSource {
        /// The offending target
        target: PathBuf,
        /// The source containing it
        source_dir: PathBuf,
    },

    /// A source lies inside the target.
    #[error("Source {source_dir} is inside target {target}")]
    SourceInsideTarget {
        /// The offending source
        source_dir: PathBuf,
        /// The target containing it
        target: PathBuf,
    },

    /// Removal was requested without a two-pool report.
    #[error("Removal requires a target directory")]
    RemovalWithoutTarget,

    /// Removal was requested for a target other than the one scanned.
    #[error("Removal target {given} does not match scanned target {scanned}")]
    TargetMismatch {
        /// Target passed to removal
        given: PathBuf,
        /// Target the report was built from
        scanned: PathBuf,
    },

    /// A configuration value is invalid.
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key
        key: String,
        /// What is wrong with it
        message: String,
    },
}
