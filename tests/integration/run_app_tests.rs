use clap::Parser;
use finddupes::cli::Cli;
use finddupes::duplicates::FinderError;
use finddupes::error::{ConfigError, ExitCode};
use finddupes::run_app;
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

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["finddupes", "--quiet", "--no-progress"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn test_run_app_duplicates_found() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a", b"dup");
    write(dir.path(), "b", b"dup");

    let code = run(&[dir.path().to_str().unwrap()]).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_run_app_no_duplicates() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a", b"one");
    write(dir.path(), "b", b"two");

    let code = run(&[dir.path().to_str().unwrap(), "-o", "json"]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_run_app_remove_then_rerun() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("src");
    let target = dir.path().join("tgt");
    write(&source, "x.bin", b"AAAA");
    write(&target, "y.bin", b"AAAA");
    write(&target, "z.bin", b"BBBB");

    let code = run(&[
        source.to_str().unwrap(),
        "--target",
        target.to_str().unwrap(),
        "--remove",
        "-o",
        "csv",
    ])
    .unwrap();
    assert_eq!(code, ExitCode::Success);
    assert!(!target.join("y.bin").exists());
    assert!(target.join("z.bin").exists());
    assert!(source.join("x.bin").exists());

    let code = run(&[
        source.to_str().unwrap(),
        "--target",
        target.to_str().unwrap(),
    ])
    .unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_run_app_rejects_nesting() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "inner/file", b"data");
    let inner = dir.path().join("inner");

    let err = run(&[
        dir.path().to_str().unwrap(),
        "--target",
        inner.to_str().unwrap(),
        "--remove",
    ])
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<FinderError>(),
        Some(FinderError::Config(ConfigError::TargetInsideSource { .. }))
    ));
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(inner.join("file").exists());
}

#[test]
fn test_run_app_missing_source() {
    let dir = TempDir::new().unwrap();
    let err = run(&[dir.path().join("missing").to_str().unwrap()]).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_run_app_invalid_config_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "data/a", b"x");
    let config = dir.path().join("finddupes.toml");
    fs::write(&config, "chunk_size = 0\n").unwrap();

    let err = run(&[
        dir.path().join("data").to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ])
    .unwrap_err();
    assert!(format!("{err:#}").contains("chunk_size"));
}
