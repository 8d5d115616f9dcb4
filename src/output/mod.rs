//! Output formatters for duplicate scan results.
//!
//! This module provides different output formats for scan results:
//! - Text for the console (default)
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! Every formatter renders the report first and, when a removal pass ran,
//! its per-file outcomes after it.
//!
//! # Example
//!
//! ```no_run
//! use finddupes::duplicates::DuplicateFinder;
//! use finddupes::output::json::JsonOutput;
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let report = finder.find_duplicates_in_paths(vec![PathBuf::from(".")]).unwrap();
//!
//! // Output as JSON to stdout
//! let output = JsonOutput::new(&report, None, report.exit_code());
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod csv;
pub mod json;
pub mod text;

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actions::RemovalReport;
use crate::duplicates::DedupReport;
use crate::error::ExitCode;

// Re-export main types
pub use self::csv::CsvOutput;
pub use self::json::JsonOutput;
pub use self::text::TextOutput;

/// Report rendering format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// JSON document
    Json,
    /// One CSV row per file
    Csv,
}

impl OutputFormat {
    /// Whether the format is meant for other programs rather than people.
    #[must_use]
    pub fn is_machine_readable(self) -> bool {
        !matches!(self, Self::Text)
    }
}

/// Errors that can occur while rendering output.
#[derive(Debug, Error)]
pub enum OutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
}

/// Render `report` (and `removal`, if any) to `writer` in `format`.
///
/// # Errors
///
/// Returns [`OutputError`] if writing or serialization fails.
pub fn write_report<W: io::Write>(
    format: OutputFormat,
    report: &DedupReport,
    removal: Option<&RemovalReport>,
    exit_code: ExitCode,
    mut writer: W,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Text => TextOutput::new(report, removal).write_to(writer),
        OutputFormat::Json => JsonOutput::new(report, removal, exit_code).write_to(&mut writer),
        OutputFormat::Csv => CsvOutput::new(report, removal).write_to(writer),
    }
}
