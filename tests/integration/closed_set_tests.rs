use finddupes::duplicates::{DuplicateFinder, FinderConfig};
use finddupes::scanner::{HashAlgorithm, WalkerConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &[u8]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn relative_paths(root: &Path, paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn test_three_identical_files_one_group() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", b"same content");
    write(dir.path(), "sub/b.txt", b"same content");
    write(dir.path(), "c.txt", b"same content");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(vec![dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    let group = &report.groups[0];
    assert_eq!(
        relative_paths(dir.path(), &group.paths()),
        vec!["a.txt", "c.txt", "sub/b.txt"]
    );
    assert!(group.original().path.ends_with("a.txt"));
    assert_eq!(group.duplicate_count(), 2);
    assert_eq!(report.summary.duplicate_files, 2);
    assert_eq!(report.summary.reclaimable_space, 24);
}

#[test]
fn test_distinct_contents_form_separate_groups() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "one/x", b"xxxx");
    write(dir.path(), "one/y", b"yyyy");
    write(dir.path(), "two/x", b"xxxx");
    write(dir.path(), "two/y", b"yyyy");
    write(dir.path(), "unique", b"zzzz");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(vec![dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.groups.len(), 2);
    assert!(report.groups[0].original().path.ends_with("one/x"));
    assert!(report.groups[1].original().path.ends_with("one/y"));
    assert!(report
        .groups
        .iter()
        .all(|g| !g.contains(&dir.path().join("unique"))));
}

#[test]
fn test_no_duplicates_is_explicit() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a", b"alpha");
    write(dir.path(), "b", b"beta");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(vec![dir.path().to_path_buf()])
        .unwrap();

    assert!(!report.has_duplicates());
    assert_eq!(report.summary.total_files, 2);
    assert_eq!(report.summary.hashed_files, 2);
}

#[test]
fn test_scan_is_idempotent() {
    let dir = TempDir::new().unwrap();
    for i in 0..5 {
        write(dir.path(), &format!("d{i}/copy.bin"), b"payload");
        write(dir.path(), &format!("d{i}/own.bin"), format!("own {i}").as_bytes());
    }

    let finder = DuplicateFinder::with_defaults();
    let first = finder
        .find_duplicates_in_paths(vec![dir.path().to_path_buf()])
        .unwrap();
    let second = finder
        .find_duplicates_in_paths(vec![dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(first.groups, second.groups);
    assert_eq!(first.groups.len(), 1);
    assert!(first.groups[0].original().path.ends_with("d0/copy.bin"));
}

#[test]
fn test_groups_do_not_depend_on_chunk_size_or_threads() {
    let dir = TempDir::new().unwrap();
    let big: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    write(dir.path(), "a/big", &big);
    write(dir.path(), "b/big", &big);
    write(dir.path(), "c/small", b"s");
    write(dir.path(), "d/small", b"s");

    let baseline = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(vec![dir.path().to_path_buf()])
        .unwrap();

    for (chunk, threads) in [(1, 1), (7, 2), (4096, 8), (1 << 20, 3)] {
        let finder = DuplicateFinder::new(
            FinderConfig::default()
                .with_chunk_size(chunk)
                .with_io_threads(threads),
        );
        let report = finder
            .find_duplicates_in_paths(vec![dir.path().to_path_buf()])
            .unwrap();
        assert_eq!(report.groups, baseline.groups, "chunk {chunk}, threads {threads}");
    }
}

#[test]
fn test_every_algorithm_finds_same_groups() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a", b"content");
    write(dir.path(), "b", b"content");
    write(dir.path(), "c", b"other");

    for algorithm in HashAlgorithm::ALL {
        let finder = DuplicateFinder::new(FinderConfig::default().with_algorithm(algorithm));
        let report = finder
            .find_duplicates_in_paths(vec![dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(report.algorithm, algorithm);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].fingerprint.len(), algorithm.digest_len());
        assert_eq!(report.groups[0].len(), 2);
    }
}

#[test]
fn test_multiple_roots_pool_in_order() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write(second.path(), "z.txt", b"shared");
    write(first.path(), "y.txt", b"shared");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(vec![second.path().to_path_buf(), first.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert!(report.groups[0].original().path.starts_with(second.path()));
    assert!(report.groups[0].duplicates()[0].path.starts_with(first.path()));
}

#[test]
fn test_nested_root_is_not_counted_twice() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "sub/only.txt", b"single");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(vec![dir.path().to_path_buf(), dir.path().join("sub")])
        .unwrap();

    assert!(!report.has_duplicates());
    assert_eq!(report.summary.total_files, 1);
}

#[test]
fn test_empty_files_are_duplicates_of_each_other() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "empty1", b"");
    write(dir.path(), "empty2", b"");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates_in_paths(vec![dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].size, 0);
    assert_eq!(report.summary.reclaimable_space, 0);
}

#[test]
fn test_walker_filters_apply() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "keep1.dat", b"0123456789");
    write(dir.path(), "keep2.dat", b"0123456789");
    write(dir.path(), "skip.tmp", b"0123456789");
    write(dir.path(), ".hidden/copy.dat", b"0123456789");
    write(dir.path(), "tiny1", b"0");
    write(dir.path(), "tiny2", b"0");

    let walker = WalkerConfig::default()
        .with_skip_hidden(true)
        .with_size_bounds(Some(5), None)
        .with_ignore_patterns(vec!["*.tmp".to_string()]);
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker));
    let report = finder
        .find_duplicates_in_paths(vec![dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.summary.total_files, 2);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(
        relative_paths(dir.path(), &report.groups[0].paths()),
        vec!["keep1.dat", "keep2.dat"]
    );
}
