//! Loading `aerofix.toml` and opening sessions from it.

use super::*;
use aerofix::{Error, CONFIG_FILE_NAME};
use tempfile::TempDir;

#[test]
fn test_session_from_default_config_file() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    FixtureConfig::write_default_if_missing(&path).unwrap();

    let config = FixtureConfig::from_file(&path).unwrap();
    let server = MemoryServer::new();
    let mut session = Session::open(config, &server).unwrap();

    session.seed("k", "v").unwrap();
    assert!(server.contains(&aerofix::Key::new("test", "cache", "k")));
}

#[test]
fn test_prefix_from_config_file_scopes_keys() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "namespace = \"bar\"\nset = \"users\"\nprefix = \"it_\"\n",
    )
    .unwrap();

    let config = FixtureConfig::from_file(&path).unwrap();
    let server = MemoryServer::new();
    let mut session = Session::open(config, &server).unwrap();
    session.seed("42", 1).unwrap();

    assert!(server.contains(&aerofix::Key::new("bar", "users", "it_42")));
    assert_eq!(session.tracked_keys()[0].user_key, "it_42");
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "port = 0\n").unwrap();

    let err = FixtureConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_lenient_seed_from_config_file() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "strict_seed = false\n").unwrap();

    let config = FixtureConfig::from_file(&path).unwrap();
    let server = MemoryServer::new();
    let mut session = Session::open(config, &server).unwrap();

    server.fail_next_puts(1);
    session.seed("k", 1).unwrap();
    assert!(session.tracked_keys().is_empty());
    session.assert_absent("k", None).unwrap();
}
