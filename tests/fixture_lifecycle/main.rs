//! Fixture Lifecycle Test Suite
//!
//! End-to-end coverage of the fixture session against the in-process server:
//!
//! - `properties`: seed / assert / fetch / cleanup guarantees
//! - `reconnect`: per-suite vs per-test connections, degraded sessions
//! - `config_file`: loading `aerofix.toml` and reconfiguring
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test fixture_lifecycle
//!
//! # With log output
//! RUST_LOG=debug cargo test --test fixture_lifecycle -- --nocapture
//! ```

use std::sync::Once;

use aerofix::{FixtureConfig, MemoryServer, Session};

pub mod config_file;
pub mod properties;
pub mod reconnect;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

static INIT_TRACING: Once = Once::new();

/// Install a test-writer subscriber once per process.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Config with a per-test prefix so suites sharing a server never collide.
pub fn isolated_config() -> FixtureConfig {
    FixtureConfig {
        prefix: format!("{}_", uuid::Uuid::new_v4().simple()),
        ..FixtureConfig::default()
    }
}

/// Fresh server plus a session on it.
pub fn quick_setup() -> (MemoryServer, Session<MemoryServer>) {
    init_tracing();
    let server = MemoryServer::new();
    let session = Session::open(isolated_config(), server.clone())
        .expect("session should open against a live server");
    (server, session)
}
