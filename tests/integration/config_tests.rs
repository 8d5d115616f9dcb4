use clap::Parser;
use finddupes::cli::Cli;
use finddupes::config::Config;
use finddupes::error::ConfigError;
use finddupes::scanner::{HashAlgorithm, MAX_CHUNK_SIZE};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_toml_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
algorithm = "sha512"
io_threads = 2
chunk_size = 65536
skip_hidden = true
ignore_patterns = ["*.tmp", "cache/"]
min_size = 10
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();

    assert_eq!(config.algorithm, HashAlgorithm::Sha512);
    assert_eq!(config.io_threads, 2);
    assert_eq!(config.chunk_size, 65_536);
    assert!(config.skip_hidden);
    assert!(!config.follow_symlinks);
    assert_eq!(config.ignore_patterns, vec!["*.tmp", "cache/"]);
    assert_eq!(config.min_size, Some(10));
    assert_eq!(config.max_size, None);
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "follow_symlinks = true\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();

    assert!(config.follow_symlinks);
    assert_eq!(config.algorithm, HashAlgorithm::Md5);
    assert_eq!(config.io_threads, 4);
}

#[test]
fn test_cli_flags_override_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "algorithm = \"sha256\"\nio_threads = 2\n").unwrap();

    let cli = Cli::try_parse_from([
        "finddupes",
        "/src",
        "--config",
        path.to_str().unwrap(),
        "--algorithm",
        "blake3",
    ])
    .unwrap();
    let config = Config::load(cli.config.as_deref())
        .unwrap()
        .with_cli_overrides(&cli);

    assert_eq!(config.algorithm, HashAlgorithm::Blake3);
    assert_eq!(config.io_threads, 2);
}

#[test]
fn test_unknown_algorithm_names_the_key() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "algorithm = \"blake2\"\n").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();

    assert!(matches!(err, ConfigError::InvalidValue { .. }));
    assert!(err.to_string().contains("algorithm"));
}

#[test]
fn test_wrong_type_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "io_threads = \"many\"\n").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn test_zero_threads_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "io_threads = 0\n").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidValue {
            key: "io_threads".to_string(),
            message: "must be at least 1".to_string(),
        }
    );
}

#[test]
fn test_oversized_chunk_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "chunk_size = 4294967296\n").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidValue { ref key, .. } if key == "chunk_size"
    ));
}

#[test]
fn test_oversized_chunk_from_cli_is_rejected() {
    let cli = Cli::try_parse_from(["finddupes", "/src", "--chunk-size", "1GiB"]).unwrap();

    let config = Config::default().with_cli_overrides(&cli);
    assert!(config.chunk_size > MAX_CHUNK_SIZE);
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { ref key, .. }) if key == "chunk_size"
    ));
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::PathNotFound(_)));
}
