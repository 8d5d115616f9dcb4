use finddupes::duplicates::{DedupMode, DuplicateFinder, FinderError};
use finddupes::error::ConfigError;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &[u8]) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// `src/x.bin = AAAA`, `tgt/y.bin = AAAA`, `tgt/z.bin = BBBB`.
fn source_and_target() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("src");
    let target = dir.path().join("tgt");
    write(&source, "x.bin", b"AAAA");
    write(&target, "y.bin", b"AAAA");
    write(&target, "z.bin", b"BBBB");
    (dir, source, target)
}

#[test]
fn test_target_copy_of_source_is_reported() {
    let (_dir, source, target) = source_and_target();

    let report = DuplicateFinder::with_defaults()
        .find_matches(vec![source.clone()], target.clone())
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    let group = &report.groups[0];
    assert_eq!(group.original().path, source.join("x.bin"));
    assert_eq!(group.duplicates().len(), 1);
    assert_eq!(group.duplicates()[0].path, target.join("y.bin"));
    assert!(!group.contains(&target.join("z.bin")));

    assert_eq!(report.summary.total_files, 3);
    assert_eq!(report.summary.target_files, 2);
    assert_eq!(report.mode.target(), Some(target.as_path()));
}

#[test]
fn test_target_only_duplicates_are_ignored() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("src");
    let target = dir.path().join("tgt");
    write(&source, "s.txt", b"source only");
    write(&target, "a.txt", b"target twin");
    write(&target, "b.txt", b"target twin");

    let report = DuplicateFinder::with_defaults()
        .find_matches(vec![source], target)
        .unwrap();

    assert!(!report.has_duplicates());
}

#[test]
fn test_source_internal_duplicates_are_ignored() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("src");
    let target = dir.path().join("tgt");
    write(&source, "a.txt", b"twin");
    write(&source, "b.txt", b"twin");
    write(&target, "c.txt", b"different");

    let report = DuplicateFinder::with_defaults()
        .find_matches(vec![source], target)
        .unwrap();

    assert!(!report.has_duplicates());
}

#[test]
fn test_several_target_copies_share_one_group() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("src");
    let target = dir.path().join("tgt");
    write(&source, "orig.jpg", b"jpeg bytes");
    write(&target, "1/copy.jpg", b"jpeg bytes");
    write(&target, "2/copy.jpg", b"jpeg bytes");

    let report = DuplicateFinder::with_defaults()
        .find_matches(vec![source.clone()], target)
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].original().path, source.join("orig.jpg"));
    assert_eq!(report.groups[0].duplicate_count(), 2);
    assert_eq!(report.groups[0].duplicates()[0].label(), "1/copy.jpg");
    assert_eq!(report.groups[0].duplicates()[1].label(), "2/copy.jpg");
}

#[test]
fn test_multiple_source_roots() {
    let dir = TempDir::new().unwrap();
    let photos = dir.path().join("photos");
    let music = dir.path().join("music");
    let target = dir.path().join("downloads");
    write(&photos, "p.raw", b"photo");
    write(&music, "m.flac", b"music");
    write(&target, "p.raw", b"photo");
    write(&target, "m.flac", b"music");

    let report = DuplicateFinder::with_defaults()
        .find_matches(vec![photos.clone(), music.clone()], target)
        .unwrap();

    assert_eq!(report.groups.len(), 2);
    // Groups follow target enumeration order: m.flac before p.raw
    assert_eq!(report.groups[0].original().path, music.join("m.flac"));
    assert_eq!(report.groups[1].original().path, photos.join("p.raw"));
}

#[test]
fn test_target_inside_source_rejected_before_hashing() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("src");
    let target = source.join("inner");
    write(&target, "file", b"data");

    let err = DuplicateFinder::with_defaults()
        .find_matches(vec![source], target)
        .unwrap_err();

    assert!(matches!(
        err,
        FinderError::Config(ConfigError::TargetInsideSource { .. })
    ));
}

#[test]
fn test_source_inside_target_rejected() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("tgt");
    let source = target.join("src");
    write(&source, "file", b"data");

    let err = DuplicateFinder::with_defaults()
        .find_matches(vec![source], target)
        .unwrap_err();

    assert!(matches!(
        err,
        FinderError::Config(ConfigError::SourceInsideTarget { .. })
    ));
}

#[test]
fn test_target_equal_to_source_rejected() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "file", b"data");

    let mode = DedupMode::from_paths(
        vec![dir.path().to_path_buf()],
        Some(dir.path().to_path_buf()),
    );
    let err = DuplicateFinder::with_defaults().find(&mode).unwrap_err();

    assert!(matches!(
        err,
        FinderError::Config(ConfigError::TargetInsideSource { .. })
    ));
}

#[test]
fn test_sibling_with_common_prefix_is_not_nested() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("photos");
    let target = dir.path().join("photos2");
    write(&source, "a", b"same");
    write(&target, "a", b"same");

    let report = DuplicateFinder::with_defaults()
        .find_matches(vec![source], target)
        .unwrap();

    assert_eq!(report.groups.len(), 1);
}

#[test]
fn test_missing_target_rejected() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("src");
    write(&source, "a", b"data");

    let err = DuplicateFinder::with_defaults()
        .find_matches(vec![source], dir.path().join("nope"))
        .unwrap_err();

    assert!(matches!(
        err,
        FinderError::Config(ConfigError::PathNotFound(_))
    ));
}

#[test]
fn test_gitignore_in_target_does_not_hide_copies() {
    let (_dir, source, target) = source_and_target();
    write(&target, ".gitignore", b"*.bin\n");

    let report = DuplicateFinder::with_defaults()
        .find_matches(vec![source], target.clone())
        .unwrap();

    assert_eq!(report.summary.target_files, 3);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].duplicates()[0].path, target.join("y.bin"));
}
