//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Fingerprint indexing in closed-set and two-pool modes
//! - Duplicate group management
//! - The [`DuplicateFinder`] pipeline that ties walking, hashing and
//!   indexing together

pub mod finder;
pub mod groups;

pub use finder::{
    DedupMode, DedupReport, DuplicateFinder, FinderConfig, FinderError, IndexOutcome,
    ScanSummary,
};
pub use groups::{DedupIndex, DuplicateGroup, Insertion, SourceIndex};
