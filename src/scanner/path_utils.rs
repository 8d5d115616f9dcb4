//! Path normalization, nesting checks and display labels.
//!
//! Directory roots given by the user are compared after canonicalization and
//! Unicode NFC normalization, so `./photos`, `photos/` and an NFD-encoded
//! spelling of the same directory all compare equal.
//!
//! # Example
//!
//! ```
//! use finddupes::scanner::path_utils::{display_label, normalize_path_str};
//! use std::path::Path;
//!
//! assert_eq!(normalize_path_str("cafe\u{0301}"), "café");
//! assert_eq!(display_label(Path::new("/music/live/track.flac")), "live/track.flac");
//! ```

use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

/// Normalize a path string to NFC (Composed) form.
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Resolve `path` to an absolute, NFC-normalized form for comparison.
///
/// Symlinks and `..` components are resolved when the path exists. A path
/// that cannot be canonicalized is made absolute against the current
/// directory instead.
#[must_use]
pub fn comparable_path(path: &Path) -> PathBuf {
    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    });

    match resolved.to_str() {
        Some(s) if cfg!(windows) => PathBuf::from(normalize_path_str(s).to_lowercase()),
        Some(s) => PathBuf::from(normalize_path_str(s)),
        None => resolved,
    }
}

/// Whether `path` is `ancestor` itself or lies somewhere beneath it.
///
/// Comparison is component-wise, so `/data/photos2` is not inside
/// `/data/photos`.
#[must_use]
pub fn is_within(path: &Path, ancestor: &Path) -> bool {
    comparable_path(path).starts_with(comparable_path(ancestor))
}

/// Drop roots that repeat or lie inside another listed root.
///
/// The order of the remaining roots is preserved, and the original
/// spelling of each kept root is returned unchanged.
#[must_use]
pub fn collapse_roots(roots: Vec<PathBuf>) -> Vec<PathBuf> {
    let resolved: Vec<PathBuf> = roots.iter().map(|r| comparable_path(r)).collect();
    let mut kept = Vec::with_capacity(roots.len());

    for (i, root) in roots.into_iter().enumerate() {
        let current = &resolved[i];
        let shadowed = resolved.iter().enumerate().any(|(j, other)| {
            if i == j {
                return false;
            }
            if current == other {
                // Identical roots: keep the first occurrence only.
                j < i
            } else {
                current.starts_with(other)
            }
        });

        if shadowed {
            log::debug!("Skipping root already covered by another root: {}", root.display());
        } else {
            kept.push(root);
        }
    }

    kept
}

/// Human-readable label for a file: `parent-folder/filename`.
///
/// Falls back to the bare file name when the file has no named parent.
#[must_use]
pub fn display_label(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    match path.parent().and_then(Path::file_name) {
        Some(parent) => Path::new(parent).join(file_name).to_string_lossy().into_owned(),
        None => file_name,
    }
}
