//! Per-test guard.

use std::ops::{Deref, DerefMut};

use aerofix_client::Connector;

use crate::registry::FlushReport;
use crate::session::Session;

/// Borrow of a [`Session`] for the length of one test.
///
/// Created by [`Session::scope`], which has already run `before_test`.
/// Dropping the guard runs `after_test`, so seeded keys are removed even
/// when the test returns early with `?` or panics.
pub struct TestScope<'a, C: Connector> {
    session: &'a mut Session<C>,
    finished: bool,
}

impl<'a, C: Connector> TestScope<'a, C> {
    pub(crate) fn new(session: &'a mut Session<C>) -> Self {
        Self {
            session,
            finished: false,
        }
    }

    /// End the test now and return the cleanup report.
    pub fn finish(mut self) -> FlushReport {
        self.finished = true;
        self.session.after_test()
    }
}

impl<C: Connector> Deref for TestScope<'_, C> {
    type Target = Session<C>;

    fn deref(&self) -> &Session<C> {
        self.session
    }
}

impl<C: Connector> DerefMut for TestScope<'_, C> {
    fn deref_mut(&mut self) -> &mut Session<C> {
        self.session
    }
}

impl<C: Connector> Drop for TestScope<'_, C> {
    fn drop(&mut self) {
        if !self.finished {
            self.session.after_test();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixtureConfig;
    use aerofix_client::MemoryServer;

    #[test]
    fn scope_drop_flushes() {
        let server = MemoryServer::new();
        let mut session = Session::open(FixtureConfig::default(), server.clone()).unwrap();
        {
            let mut test = session.scope().unwrap();
            test.seed("a", 1).unwrap();
            assert_eq!(server.len(), 1);
        }
        assert!(server.is_empty());
        assert!(session.tracked_keys().is_empty());
    }

    #[test]
    fn finish_returns_report_once() {
        let server = MemoryServer::new();
        let mut session = Session::open(FixtureConfig::default(), server.clone()).unwrap();
        let mut test = session.scope().unwrap();
        test.seed("a", 1).unwrap();
        test.seed("b", 2).unwrap();
        let report = test.finish();
        assert_eq!(report.deleted, 2);
        assert!(server.is_empty());
    }

    #[test]
    fn scope_reconnects_per_test() {
        let server = MemoryServer::new();
        let config = FixtureConfig {
            reconnect: true,
            ..FixtureConfig::default()
        };
        let mut session = Session::open(config, server.clone()).unwrap();
        for _ in 0..3 {
            let test = session.scope().unwrap();
            assert!(test.is_connected());
        }
        assert!(!session.is_connected());
        assert_eq!(server.connections_opened(), 3);
    }

    #[test]
    fn scope_fails_when_reconnect_cannot_connect() {
        let server = MemoryServer::new();
        let config = FixtureConfig {
            reconnect: true,
            ..FixtureConfig::default()
        };
        let mut session = Session::open(config, server.clone()).unwrap();
        server.set_offline(true);
        assert!(session.scope().is_err());
    }
}
