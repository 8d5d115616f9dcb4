//! Duplicate groups and the fingerprint indexes that build them.
//!
//! # Overview
//!
//! [`DedupIndex`] maps each fingerprint either to the single record seen so
//! far or to the group it has been promoted into. A group is materialized
//! the moment a second record with the same fingerprint arrives, and groups
//! are kept in the order they were materialized.
//!
//! [`SourceIndex`] is the lookup table for two-pool mode: fingerprint to the
//! source record that carries it.
//!
//! # Example
//!
//! ```
//! use finddupes::duplicates::{DedupIndex, Insertion};
//! use finddupes::scanner::{FileRecord, Fingerprint};
//! use std::path::PathBuf;
//!
//! let fp = Fingerprint::from_slice(&[0xab; 16]);
//! let mut index = DedupIndex::new();
//!
//! let a = FileRecord::new(PathBuf::from("/data/a.txt"), 4);
//! let b = FileRecord::new(PathBuf::from("/data/b.txt"), 4);
//!
//! assert_eq!(index.insert(a, fp.clone()), Insertion::FirstSeen);
//! assert_eq!(index.insert(b, fp), Insertion::Promoted);
//!
//! let groups = index.into_groups();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].original().path, PathBuf::from("/data/a.txt"));
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::scanner::{FileRecord, Fingerprint};

/// Confirmed group of byte-identical files.
///
/// `files[0]` is the original; every later entry is a duplicate of it.
/// Members stay in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// Content fingerprint shared by every member
    pub fingerprint: Fingerprint,
    /// Size of the original in bytes
    pub size: u64,
    /// The original followed by its duplicates
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create a group from an original and its first duplicate.
    #[must_use]
    pub fn new(fingerprint: Fingerprint, original: FileRecord, duplicate: FileRecord) -> Self {
        Self {
            fingerprint,
            size: original.size,
            files: vec![original, duplicate],
        }
    }

    /// Append another duplicate.
    pub fn push(&mut self, duplicate: FileRecord) {
        self.files.push(duplicate);
    }

    /// The retained original.
    #[must_use]
    pub fn original(&self) -> &FileRecord {
        &self.files[0]
    }

    /// Every member except the original.
    #[must_use]
    pub fn duplicates(&self) -> &[FileRecord] {
        &self.files[1..]
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Always false for a constructed group.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Space held by the duplicates.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.duplicates().iter().map(|f| f.size).sum()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Fingerprint as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        self.fingerprint.to_hex()
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Whether `path` is a member of this group.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f.path == path)
    }
}

/// What an insertion did to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// First record carrying this fingerprint.
    FirstSeen,
    /// Second record: a new group was created.
    Promoted,
    /// Record appended to an existing group.
    Appended,
}

#[derive(Debug)]
enum Slot {
    Single(FileRecord),
    Group(usize),
}

/// Fingerprint index for closed-set deduplication.
///
/// The index is the single writer of its groups: records must be inserted in
/// enumeration order for "first seen is the original" to hold.
#[derive(Debug, Default)]
pub struct DedupIndex {
    slots: HashMap<Fingerprint, Slot>,
    groups: Vec<DuplicateGroup>,
}

impl DedupIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `file` under `fingerprint`.
    pub fn insert(&mut self, file: FileRecord, fingerprint: Fingerprint) -> Insertion {
        match self.slots.get_mut(&fingerprint) {
            None => {
                log::trace!("First seen {}: {}", fingerprint, file.path.display());
                self.slots.insert(fingerprint, Slot::Single(file));
                Insertion::FirstSeen
            }
            Some(Slot::Group(idx)) => {
                log::debug!("Duplicate of group {}: {}", idx, file.path.display());
                self.groups[*idx].push(file);
                Insertion::Appended
            }
            Some(slot) => {
                let idx = self.groups.len();
                if let Slot::Single(original) = std::mem::replace(slot, Slot::Group(idx)) {
                    log::debug!(
                        "New duplicate group {}: {} == {}",
                        idx,
                        original.path.display(),
                        file.path.display()
                    );
                    self.groups
                        .push(DuplicateGroup::new(fingerprint, original, file));
                }
                Insertion::Promoted
            }
        }
    }

    /// Record a target file that matches a source `original`.
    ///
    /// The group keyed by `fingerprint` is created with `original` at its
    /// head on the first match and grows on later matches. The source record
    /// itself is never inserted as a standalone entry.
    pub fn insert_match(
        &mut self,
        original: &FileRecord,
        file: FileRecord,
        fingerprint: Fingerprint,
    ) -> Insertion {
        match self.slots.get(&fingerprint) {
            Some(Slot::Group(idx)) => {
                let idx = *idx;
                log::debug!("Target match for group {}: {}", idx, file.path.display());
                self.groups[idx].push(file);
                Insertion::Appended
            }
            Some(Slot::Single(_)) | None => {
                let idx = self.groups.len();
                log::debug!(
                    "New match group {}: {} == {}",
                    idx,
                    original.path.display(),
                    file.path.display()
                );
                self.groups.push(DuplicateGroup::new(
                    fingerprint.clone(),
                    original.clone(),
                    file,
                ));
                self.slots.insert(fingerprint, Slot::Group(idx));
                Insertion::Promoted
            }
        }
    }

    /// Groups materialized so far, in creation order.
    #[must_use]
    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    /// Number of groups materialized so far.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of distinct fingerprints seen.
    #[must_use]
    pub fn fingerprint_count(&self) -> usize {
        self.slots.len()
    }

    /// Consume the index, returning its groups in creation order.
    #[must_use]
    pub fn into_groups(self) -> Vec<DuplicateGroup> {
        self.groups
    }
}

/// Source-pool lookup for two-pool deduplication.
///
/// When two source files share a fingerprint the later one replaces the
/// earlier one.
#[derive(Debug, Default)]
pub struct SourceIndex {
    records: HashMap<Fingerprint, FileRecord>,
}

impl SourceIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `file` under `fingerprint`, returning the record it replaced.
    pub fn insert(&mut self, file: FileRecord, fingerprint: Fingerprint) -> Option<FileRecord> {
        let replaced = self.records.insert(fingerprint, file);
        if let Some(ref old) = replaced {
            log::debug!("Source collision, replacing {}", old.path.display());
        }
        replaced
    }

    /// The source record carrying `fingerprint`, if any.
    #[must_use]
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&FileRecord> {
        self.records.get(fingerprint)
    }

    /// Number of distinct source fingerprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no source has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
