//! Logging setup on top of the `log` facade and `env_logger`.
//!
//! The level comes from `RUST_LOG` when it is set, otherwise from the
//! command-line flags: `--quiet` keeps errors only, `-v` enables debug and
//! `-vv` enables trace, and the default is info. Logs go to stderr; stdout
//! carries the report.
//!
//! Debug builds prefix each line with a timestamp and module path, release
//! builds print the level and message only.
//!
//! ```rust,no_run
//! use finddupes::logging::init_logging;
//!
//! init_logging(1, false);
//! log::debug!("scanning");
//! ```

use std::env;
use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Initialize the global logger.
///
/// Calling this more than once is harmless; later calls are ignored, which
/// lets tests drive [`crate::run_app`] repeatedly in one process.
pub fn init_logging(verbose: u8, quiet: bool) {
    let from_env = env::var_os("RUST_LOG").is_some();

    let mut builder = Builder::new();
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    configure_format(&mut builder);

    if builder.try_init().is_ok() {
        log::debug!(
            "Logging initialized at level {:?}{}",
            log::max_level(),
            if from_env { " (from RUST_LOG)" } else { "" }
        );
    }
}

#[cfg(debug_assertions)]
fn configure_format(builder: &mut Builder) {
    builder.format(|buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        writeln!(
            buf,
            "{} {style}{:<5}{style:#} [{}] {}",
            buf.timestamp_millis(),
            level,
            record.module_path().unwrap_or("finddupes"),
            record.args()
        )
    });
}

#[cfg(not(debug_assertions))]
fn configure_format(builder: &mut Builder) {
    builder.format(|buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        writeln!(buf, "{style}{:<5}{style:#} {}", level, record.args())
    });
}

/// Map the verbosity flags to a level filter.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
