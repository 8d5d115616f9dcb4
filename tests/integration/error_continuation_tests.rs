use finddupes::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use finddupes::error::ExitCode;
use finddupes::scanner::{FileRecord, HashError, ScanError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &[u8]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_missing_files_are_reported_not_grouped() {
    let finder = DuplicateFinder::with_defaults();
    let files = vec![
        FileRecord::new(PathBuf::from("nonexistent_1.txt"), 100),
        FileRecord::new(PathBuf::from("nonexistent_2.txt"), 100),
    ];

    let outcome = finder.index_all(files).unwrap();

    assert!(outcome.groups.is_empty());
    assert_eq!(outcome.errors.len(), 2);
    for err in &outcome.errors {
        match err {
            ScanError::Hash(HashError::NotFound(_)) => {}
            other => panic!("Expected NotFound hash error, got: {other:?}"),
        }
    }
}

#[test]
fn test_missing_file_between_readable_copies() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a", b"copy");
    let b = write(dir.path(), "b", b"copy");
    let files = vec![
        FileRecord::new(a.clone(), 4),
        FileRecord::new(dir.path().join("gone"), 4),
        FileRecord::new(b.clone(), 4),
    ];

    let outcome = DuplicateFinder::with_defaults().index_all(files).unwrap();

    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].paths(), vec![a, b]);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].path(), dir.path().join("gone"));
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", b"same");
    write(dir.path(), "b.txt", b"same");
    let locked = write(dir.path(), "locked.txt", b"same");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(vec![dir.path().to_path_buf()])
        .unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(report.groups.len(), 1);
    let group = &report.groups[0];
    assert!(group.contains(&dir.path().join("a.txt")));
    assert!(group.contains(&dir.path().join("b.txt")));

    // Privileged users can still read the file
    let in_errors = report.summary.errors.iter().any(|e| e.path() == locked);
    assert!(in_errors != group.contains(&locked));
    if in_errors {
        assert_eq!(report.exit_code(), ExitCode::PartialSuccess);
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_does_not_hide_siblings() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    write(dir.path(), "open/a", b"twin");
    write(dir.path(), "open/b", b"twin");
    write(dir.path(), "sealed/c", b"twin");
    let sealed = dir.path().join("sealed");
    fs::set_permissions(&sealed, fs::Permissions::from_mode(0o000)).unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(vec![dir.path().to_path_buf()])
        .unwrap();

    fs::set_permissions(&sealed, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(report.groups.len(), 1);
    let group = &report.groups[0];
    assert!(group.contains(&dir.path().join("open/a")));
    assert!(group.contains(&dir.path().join("open/b")));

    let sealed_in_group = group.contains(&sealed.join("c"));
    let sealed_in_errors = report
        .summary
        .errors
        .iter()
        .any(|e| e.path().starts_with(&sealed));
    assert!(sealed_in_group != sealed_in_errors);
}

#[test]
fn test_shutdown_before_scan_is_interrupted() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a", b"x");
    write(dir.path(), "b", b"x");

    let config = FinderConfig::default().with_shutdown_flag(Arc::new(AtomicBool::new(true)));
    let result = DuplicateFinder::new(config).find_duplicates_in_paths(vec![dir.path().to_path_buf()]);

    assert!(matches!(result, Err(FinderError::Interrupted)));
}
