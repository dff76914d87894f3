//! Connection policy: per suite, per test, degraded.

use super::*;
use aerofix::{ClientOptions, ConfigOverrides, Error};

#[test]
fn test_persistent_session_connects_once() {
    let (server, mut session) = quick_setup();
    for i in 0..3 {
        let mut test = session.scope().unwrap();
        test.seed(&format!("k{}", i), i).unwrap();
    }
    assert_eq!(server.connections_opened(), 1);
    assert!(session.is_connected());
    assert!(server.is_empty());
}

#[test]
fn test_reconnect_opens_connection_per_test() {
    init_tracing();
    let server = MemoryServer::new();
    let config = FixtureConfig {
        reconnect: true,
        ..isolated_config()
    };
    let mut session = Session::open(config, &server).unwrap();

    for i in 0..3 {
        let mut test = session.scope().unwrap();
        test.seed("k", i).unwrap();
        assert!(test.is_connected());
    }

    assert_eq!(server.connections_opened(), 3);
    assert!(!session.is_connected());
    assert!(server.is_empty());
}

#[test]
fn test_verbs_between_tests_need_connection_when_reconnecting() {
    init_tracing();
    let server = MemoryServer::new();
    let config = FixtureConfig {
        reconnect: true,
        ..isolated_config()
    };
    let mut session = Session::open(config, &server).unwrap();
    assert_eq!(session.seed("k", 1), Err(Error::NotConnected));
}

#[test]
fn test_unreachable_server_is_fatal_by_default() {
    init_tracing();
    let server = MemoryServer::new();
    server.set_offline(true);
    match Session::open(isolated_config(), &server) {
        Err(Error::Connect { address, .. }) => assert_eq!(address, "127.0.0.1:3000"),
        Err(other) => panic!("expected connect error, got {:?}", other),
        Ok(_) => panic!("expected connect error, got a session"),
    };
}

#[test]
fn test_silent_session_degrades_and_cleans_nothing() {
    init_tracing();
    let server = MemoryServer::new();
    server.set_offline(true);
    let config = FixtureConfig {
        silent: true,
        ..isolated_config()
    };
    let mut session = Session::open(config, &server).unwrap();

    assert!(!session.is_connected());
    assert_eq!(session.fetch("k"), Err(Error::NotConnected));
    let report = session.after_test();
    assert_eq!(report.total(), 0);
}

#[test]
fn test_client_options_reach_connector() {
    init_tracing();
    let server = MemoryServer::new();
    let options = ClientOptions {
        connect_timeout_ms: 20,
        persistent: false,
    };
    let config = FixtureConfig {
        client: options.clone(),
        ..isolated_config()
    };
    let _session = Session::open(config, &server).unwrap();
    assert_eq!(server.last_options(), Some(options));
}

#[test]
fn test_reconfigure_to_reconnect_mode() {
    let (server, mut session) = quick_setup();
    session.seed("k", 1).unwrap();

    let mut session = session
        .reconfigure(&ConfigOverrides {
            reconnect: Some(true),
            ..ConfigOverrides::default()
        })
        .unwrap();

    assert!(server.is_empty(), "old session must flush before reconfiguring");
    assert!(!session.is_connected());
    session.before_test().unwrap();
    assert!(session.is_connected());
    assert_eq!(server.connections_opened(), 2);
}
