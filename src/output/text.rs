//! Console listing of duplicate groups.
//!
//! Each group is printed with its original first, followed by the
//! duplicates in discovery order. Every entry carries its short
//! `parent/file` label next to the full path.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use super::OutputError;
use crate::actions::RemovalReport;
use crate::duplicates::{DedupMode, DedupReport};

/// Line printed when a run found nothing.
pub const NO_DUPLICATES_MESSAGE: &str = "No duplicate files found.";

/// Human-readable report formatter.
pub struct TextOutput<'a> {
    report: &'a DedupReport,
    removal: Option<&'a RemovalReport>,
}

impl<'a> TextOutput<'a> {
    /// Create a new text formatter.
    #[must_use]
    pub fn new(report: &'a DedupReport, removal: Option<&'a RemovalReport>) -> Self {
        Self { report, removal }
    }

    /// Write the listing to the given writer.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Io`] if writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), OutputError> {
        self.write_groups(&mut writer)?;
        self.write_summary(&mut writer)?;
        self.write_warnings(&mut writer)?;
        if let Some(removal) = self.removal {
            write_removal(&mut writer, removal)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Render the listing as a string.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if rendering fails.
    pub fn to_string(&self) -> Result<String, OutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn write_groups<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if !self.report.has_duplicates() {
            writeln!(writer, "{}", NO_DUPLICATES_MESSAGE.green())?;
            return Ok(());
        }

        let duplicate_role = match self.report.mode {
            DedupMode::ClosedSet { .. } => "duplicate",
            DedupMode::TwoPool { .. } => "match",
        };

        for (idx, group) in self.report.groups.iter().enumerate() {
            writeln!(
                writer,
                "{} {} ({} each, {} {})",
                format!("Group {}", idx + 1).bold(),
                group.hash_hex().dim(),
                ByteSize(group.size),
                group.len(),
                if group.len() == 1 { "file" } else { "files" }
            )?;

            let original = group.original();
            writeln!(
                writer,
                "  {:<10} {}  [{}]",
                "original".cyan(),
                original.path.display(),
                original.label()
            )?;
            for file in group.duplicates() {
                writeln!(
                    writer,
                    "  {:<10} {}  [{}]",
                    duplicate_role.yellow(),
                    file.path.display(),
                    file.label()
                )?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    fn write_summary<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let summary = &self.report.summary;
        if self.report.has_duplicates() {
            writeln!(
                writer,
                "Found {} duplicate group(s) with {} duplicate file(s), {} reclaimable",
                summary.duplicate_groups,
                summary.duplicate_files,
                summary.reclaimable_display()
            )?;
        }
        writeln!(
            writer,
            "Scanned {} file(s) ({}) with {} in {:.2?}",
            summary.total_files,
            summary.total_size_display(),
            self.report.algorithm,
            summary.scan_duration
        )
    }

    fn write_warnings<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let errors = &self.report.summary.errors;
        if errors.is_empty() {
            return Ok(());
        }

        writeln!(writer)?;
        writeln!(
            writer,
            "{}",
            format!("Skipped {} unreadable path(s):", errors.len()).yellow()
        )?;
        for error in errors {
            writeln!(writer, "  {error}")?;
        }
        Ok(())
    }
}

fn write_removal<W: Write>(writer: &mut W, removal: &RemovalReport) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "Removal".bold())?;
    for outcome in &removal.outcomes {
        match outcome.result {
            Ok(size) => writeln!(
                writer,
                "  {:<8} {} ({})",
                "removed".green(),
                outcome.path.display(),
                ByteSize(size)
            )?,
            Err(ref e) => writeln!(writer, "  {:<8} {}", "failed".red(), e)?,
        }
    }
    if removal.interrupted {
        writeln!(writer, "  {}", "interrupted, remaining files kept".yellow())?;
    }
    writeln!(writer, "{}", removal.summary())
}
