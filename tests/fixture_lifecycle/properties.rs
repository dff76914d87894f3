//! Seed, assert, fetch and cleanup guarantees.

use super::*;
use aerofix::{Error, Value};
use proptest::prelude::*;

// =============================================================================
// SEED / FETCH
// =============================================================================

#[test]
fn test_seed_then_fetch_returns_value_unchanged() {
    let (_, mut session) = quick_setup();
    let fixtures = serde_json::json!({
        "string": "hello",
        "int": 42,
        "float": 2.5,
        "list": [1, "two", null],
        "map": {"nested": {"deep": true}}
    });

    for (key, json) in fixtures.as_object().expect("fixture is an object") {
        let value = Value::from(json.clone());
        session.seed(key, value.clone()).expect("seed should succeed");
        assert_eq!(
            session.fetch(key).expect("fetch should succeed"),
            value,
            "roundtrip failed for {}",
            key
        );
    }
}

#[test]
fn test_seed_overwrites_previous_value() {
    let (_, mut session) = quick_setup();
    session.seed("k", 1).unwrap();
    session.seed("k", 2).unwrap();
    assert_eq!(session.fetch("k").unwrap(), Value::Int(2));
    assert_eq!(session.tracked_keys().len(), 2);
}

#[test]
fn test_bytes_are_not_strings() {
    let (_, mut session) = quick_setup();
    session.seed("blob", b"abc".to_vec()).unwrap();
    session.assert_present("blob", Some(&Value::Bytes(b"abc".to_vec()))).unwrap();
    assert!(session
        .assert_present("blob", Some(&Value::from("abc")))
        .unwrap_err()
        .is_assertion());
}

// =============================================================================
// ASSERTIONS
// =============================================================================

#[test]
fn test_assert_absent_on_never_seeded_key() {
    let (_, session) = quick_setup();
    session.assert_absent("never", None).unwrap();
}

#[test]
fn test_assert_absent_fails_after_seed() {
    let (_, mut session) = quick_setup();
    session.seed("k", "v").unwrap();
    let err = session.assert_absent("k", None).unwrap_err();
    assert!(matches!(err, Error::Assertion { .. }));
}

#[test]
fn test_assert_present_after_cleanup_fails() {
    let (_, mut session) = quick_setup();
    session.seed("k", "v").unwrap();
    session.after_test();
    assert!(session.assert_present("k", None).unwrap_err().is_assertion());
    session.assert_absent("k", None).unwrap();
}

// =============================================================================
// CLEANUP
// =============================================================================

#[test]
fn test_cleanup_with_one_key_manually_deleted() {
    let (server, mut session) = quick_setup();
    session.seed("k1", 1).unwrap();
    session.seed("k2", 2).unwrap();
    server.remove(&session.key("k1"));

    let report = session.after_test();

    assert!(report.is_clean(), "cleanup must not fail: {:?}", report);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.already_absent, 1);
    session.assert_absent("k1", None).unwrap();
    session.assert_absent("k2", None).unwrap();
    assert!(session.tracked_keys().is_empty());
}

#[test]
fn test_cleanup_leaves_unseeded_records_alone() {
    let (server, mut session) = quick_setup();
    let foreign = session.key("foreign");
    server.insert(foreign.clone(), Value::Int(9));
    session.seed("mine", 1).unwrap();

    session.after_test();

    assert!(server.contains(&foreign));
    assert!(!server.contains(&session.key("mine")));
}

#[test]
fn test_failed_cleanup_does_not_leak_into_next_test() {
    let (server, mut session) = quick_setup();
    session.seed("k1", 1).unwrap();
    server.fail_next_deletes(2);

    let first = session.after_test();
    assert_eq!(first.failed.len(), 1);
    assert!(session.tracked_keys().is_empty());

    session.seed("k2", 2).unwrap();
    let second = session.after_test();
    assert_eq!(second.total(), 1);
    assert_eq!(second.deleted, 1);
}

#[test]
fn test_scope_cleans_up_on_early_return() {
    let (server, mut session) = quick_setup();

    fn failing_test(session: &mut Session<MemoryServer>) -> aerofix::Result<()> {
        let mut test = session.scope()?;
        test.seed("k", 1)?;
        test.assert_present("k", Some(&Value::Int(2)))?;
        Ok(())
    }

    assert!(failing_test(&mut session).unwrap_err().is_assertion());
    assert!(server.is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_registry_empty_after_flush(
        ops in proptest::collection::vec(("[a-z]{1,3}", any::<i64>(), any::<bool>()), 0..24)
    ) {
        let (server, mut session) = quick_setup();
        for (key, value, delete_manually) in &ops {
            session.seed(key, *value).unwrap();
            if *delete_manually {
                server.remove(&session.key(key));
            }
        }

        let report = session.after_test();

        prop_assert!(session.tracked_keys().is_empty());
        prop_assert!(report.is_clean());
        prop_assert_eq!(report.total(), ops.len());
        prop_assert!(server.is_empty());
    }
}
