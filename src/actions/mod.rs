//! File actions module.
//!
//! Removal of target-side duplicates after a two-pool scan. Deletion is
//! permanent; there is no recycle bin.
//!
//! ```no_run
//! use finddupes::actions::remove_file;
//! use finddupes::scanner::FileRecord;
//! use std::path::PathBuf;
//!
//! let file = FileRecord::new(PathBuf::from("/downloads/copy.jpg"), 2048);
//! let freed = remove_file(&file, true);
//! ```

pub mod remove;

pub use remove::{
    remove_duplicates, remove_file, DeleteError, RemovalOutcome, RemovalReport, RemoveConfig,
    RemoveProgressCallback,
};
