//! finddupes - content-addressed duplicate file finder.
//!
//! Files are fingerprinted by streaming their contents through a digest
//! (MD5 by default, or SHA-256, SHA-512, BLAKE3). Two modes are supported:
//!
//! - **Closed set**: every file under the given roots is compared against
//!   every other; the first copy in traversal order is the original.
//! - **Two pool**: files under a target directory are compared against the
//!   source directories only. Target files that duplicate a source can then
//!   be removed.
//!
//! ```no_run
//! use finddupes::duplicates::{DedupMode, DuplicateFinder};
//! use std::path::PathBuf;
//!
//! let mode = DedupMode::from_paths(
//!     vec![PathBuf::from("/photos")],
//!     Some(PathBuf::from("/downloads")),
//! );
//! let report = DuplicateFinder::with_defaults().find(&mode).unwrap();
//! for group in &report.groups {
//!     println!("{} has {} copies", group.original().label(), group.duplicate_count());
//! }
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actions::{remove_duplicates, RemovalReport, RemoveConfig};
use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::{DedupMode, DuplicateFinder};
use crate::error::ExitCode;
use crate::progress::Progress;

/// Run one invocation of the command-line tool.
///
/// The report is written to stdout; logs and progress go to stderr.
///
/// # Errors
///
/// Returns an error for invalid configuration, invalid directory nesting,
/// an interrupted scan (`FinderError::Interrupted`) or a failure to write
/// the report. Unreadable files and failed deletions are not errors; they
/// are reported and lower the exit code to [`ExitCode::PartialSuccess`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    if cli.no_color || !io::stdout().is_terminal() {
        yansi::disable();
    }

    let config = Config::load(cli.config.as_deref())
        .context("failed to load configuration")?
        .with_cli_overrides(&cli);
    config.validate()?;
    log::debug!("Effective configuration: {config:?}");

    let shutdown = signal::install_handler();

    let mut finder_config = config
        .finder_config()
        .with_shutdown_flag(shutdown.get_flag());
    let show_progress = !cli.quiet
        && !cli.no_progress
        && !cli.output.is_machine_readable()
        && io::stderr().is_terminal();
    if show_progress {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let mode = DedupMode::from_paths(cli.sources.clone(), cli.target.clone());
    let report = DuplicateFinder::new(finder_config).find(&mode)?;

    let removal = if cli.remove {
        let remove_config = RemoveConfig::default().with_shutdown_flag(shutdown.get_flag());
        Some(remove_duplicates(
            &report,
            cli.target.as_deref(),
            &remove_config,
        )?)
    } else {
        None
    };

    let exit_code = exit_code_for(&report, removal.as_ref());

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_report(cli.output, &report, removal.as_ref(), exit_code, &mut handle)
        .context("failed to write report")?;
    handle.flush()?;

    Ok(exit_code)
}

/// Combine the scan result and the removal pass into the process exit code.
fn exit_code_for(report: &duplicates::DedupReport, removal: Option<&RemovalReport>) -> ExitCode {
    match removal {
        Some(removal) if removal.interrupted => ExitCode::Interrupted,
        Some(removal) if !removal.all_succeeded() && report.has_duplicates() => {
            ExitCode::PartialSuccess
        }
        _ => report.exit_code(),
    }
}
