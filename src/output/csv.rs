//! CSV output formatter for duplicate scan results.
//!
//! Provides machine-readable CSV output for spreadsheets and data analysis.
//! One row is generated for each file of each group.
//!
//! # Columns
//!
//! - `group_id`: Numeric ID identifying the duplicate group (1-based)
//! - `hash`: Content fingerprint (hexadecimal)
//! - `role`: `original` or `duplicate`
//! - `path`: Path to the file
//! - `label`: `parent/file` label
//! - `size`: File size in bytes
//! - `removal`: Empty unless removal ran; then `removed` or the failure reason
//!
//! # Example
//!
//! ```no_run
//! use finddupes::duplicates::DuplicateFinder;
//! use finddupes::output::csv::CsvOutput;
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let report = finder.find_duplicates_in_paths(vec![PathBuf::from(".")]).unwrap();
//!
//! let output = CsvOutput::new(&report, None);
//! output.write_to(std::io::stdout()).unwrap();
//! ```

use std::collections::HashMap;
use std::io;
use std::path::Path;

use serde::Serialize;

use super::OutputError;
use crate::actions::RemovalReport;
use crate::duplicates::DedupReport;

/// A single row in the CSV output.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    group_id: usize,
    hash: &'a str,
    role: &'static str,
    path: String,
    label: String,
    size: u64,
    removal: String,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    report: &'a DedupReport,
    removal: Option<&'a RemovalReport>,
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(report: &'a DedupReport, removal: Option<&'a RemovalReport>) -> Self {
        Self { report, removal }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), OutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let outcomes: HashMap<&Path, String> = self
            .removal
            .map(|removal| {
                removal
                    .outcomes
                    .iter()
                    .map(|o| {
                        let status = match o.result {
                            Ok(_) => "removed".to_string(),
                            Err(ref e) => e.to_string(),
                        };
                        (o.path.as_path(), status)
                    })
                    .collect()
            })
            .unwrap_or_default();

        if self.report.groups.is_empty() {
            // Header only
            csv_writer.write_record([
                "group_id", "hash", "role", "path", "label", "size", "removal",
            ])?;
        }

        for (idx, group) in self.report.groups.iter().enumerate() {
            let group_id = idx + 1;
            let hash_hex = group.hash_hex();

            for (position, file) in group.files.iter().enumerate() {
                let row = CsvRow {
                    group_id,
                    hash: &hash_hex,
                    role: if position == 0 { "original" } else { "duplicate" },
                    path: file.path.to_string_lossy().into_owned(),
                    label: file.label(),
                    size: file.size,
                    removal: outcomes.get(file.path.as_path()).cloned().unwrap_or_default(),
                };

                csv_writer.serialize(row)?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if serialization fails.
    pub fn to_string(&self) -> Result<String, OutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
