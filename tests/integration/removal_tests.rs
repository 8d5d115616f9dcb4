use finddupes::actions::{remove_duplicates, DeleteError, RemoveConfig};
use finddupes::duplicates::DuplicateFinder;
use finddupes::error::ConfigError;
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

struct Fixture {
    _dir: TempDir,
    source: PathBuf,
    target: PathBuf,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("src");
    let target = dir.path().join("tgt");
    write(&source, "x.bin", b"AAAA");
    write(&target, "y.bin", b"AAAA");
    write(&target, "z.bin", b"BBBB");
    Fixture {
        _dir: dir,
        source,
        target,
    }
}

#[test]
fn test_removal_deletes_only_target_copy() {
    let fx = fixture();
    let finder = DuplicateFinder::with_defaults();
    let report = finder
        .find_matches(vec![fx.source.clone()], fx.target.clone())
        .unwrap();

    let removal =
        remove_duplicates(&report, Some(&fx.target), &RemoveConfig::default()).unwrap();

    assert_eq!(removal.success_count(), 1);
    assert!(removal.all_succeeded());
    assert_eq!(removal.bytes_freed, 4);
    assert_eq!(removal.outcomes[0].path, fx.target.join("y.bin"));

    assert!(fx.source.join("x.bin").exists());
    assert!(!fx.target.join("y.bin").exists());
    assert!(fx.target.join("z.bin").exists());

    // A repeat run finds nothing left to remove
    let again = finder
        .find_matches(vec![fx.source.clone()], fx.target.clone())
        .unwrap();
    assert!(!again.has_duplicates());
}

#[test]
fn test_removal_without_target_is_rejected() {
    let fx = fixture();
    let report = DuplicateFinder::with_defaults()
        .find_matches(vec![fx.source.clone()], fx.target.clone())
        .unwrap();

    let err = remove_duplicates(&report, None, &RemoveConfig::default()).unwrap_err();
    assert_eq!(err, ConfigError::RemovalWithoutTarget);
    assert!(fx.target.join("y.bin").exists());
}

#[test]
fn test_removal_after_closed_set_scan_is_rejected() {
    let fx = fixture();
    let report = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(vec![fx.source.clone(), fx.target.clone()])
        .unwrap();
    assert!(report.has_duplicates());

    let err =
        remove_duplicates(&report, Some(&fx.target), &RemoveConfig::default()).unwrap_err();
    assert_eq!(err, ConfigError::RemovalWithoutTarget);
    assert!(fx.target.join("y.bin").exists());
}

#[test]
fn test_removal_with_other_target_is_rejected() {
    let fx = fixture();
    let report = DuplicateFinder::with_defaults()
        .find_matches(vec![fx.source.clone()], fx.target.clone())
        .unwrap();

    let err =
        remove_duplicates(&report, Some(&fx.source), &RemoveConfig::default()).unwrap_err();
    assert!(matches!(err, ConfigError::TargetMismatch { .. }));
}

#[test]
fn test_modified_file_is_kept() {
    let fx = fixture();
    let report = DuplicateFinder::with_defaults()
        .find_matches(vec![fx.source.clone()], fx.target.clone())
        .unwrap();

    fs::write(fx.target.join("y.bin"), b"AAAA plus more").unwrap();

    let removal =
        remove_duplicates(&report, Some(&fx.target), &RemoveConfig::default()).unwrap();

    assert_eq!(removal.failure_count(), 1);
    assert!(matches!(
        removal.outcomes[0].result,
        Err(DeleteError::Modified {
            expected: 4,
            actual: 14,
            ..
        })
    ));
    assert!(fx.target.join("y.bin").exists());
}

#[test]
fn test_vanished_file_does_not_stop_others() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("src");
    let target = dir.path().join("tgt");
    write(&source, "a", b"one");
    write(&source, "b", b"two");
    write(&target, "a", b"one");
    write(&target, "b", b"two");

    let report = DuplicateFinder::with_defaults()
        .find_matches(vec![source], target.clone())
        .unwrap();
    assert_eq!(report.groups.len(), 2);

    fs::remove_file(target.join("a")).unwrap();

    let removal = remove_duplicates(&report, Some(&target), &RemoveConfig::default()).unwrap();

    assert_eq!(removal.total_count(), 2);
    assert!(matches!(
        removal.outcomes[0].result,
        Err(DeleteError::NotFound(_))
    ));
    assert!(removal.outcomes[1].is_removed());
    assert!(!target.join("b").exists());
    assert!(removal.summary().contains("1 failed"));
}

#[test]
fn test_interrupted_removal_stops_before_deleting() {
    let fx = fixture();
    let report = DuplicateFinder::with_defaults()
        .find_matches(vec![fx.source.clone()], fx.target.clone())
        .unwrap();

    let config = RemoveConfig::default().with_shutdown_flag(Arc::new(AtomicBool::new(true)));
    let removal = remove_duplicates(&report, Some(&fx.target), &config).unwrap();

    assert!(removal.interrupted);
    assert_eq!(removal.total_count(), 0);
    assert!(fx.target.join("y.bin").exists());
}
