//! Restoring a lineage from a versioned handle.
//!
//! Happens when an object arrives with a versioned handle but no version
//! history, e.g. when re-importing an exported item.

use crate::common::*;
use std::sync::Arc;

#[test]
fn restore_creates_history_and_version() {
    let t = TestEngine::new();
    let item = ObjectRef::item();

    let bound = t
        .engine
        .register_with(&t.ctx, &item, "123456789/100.4")
        .unwrap();
    assert_eq!(bound, "123456789/100.4");

    let history = t
        .history
        .find_history(&t.ctx, &item)
        .unwrap()
        .expect("history restored");
    let version = history.version_of(item.id).expect("version restored");
    assert_eq!(version.number, v(4));
    assert_eq!(version.summary, RESTORE_SUMMARY);
    assert_eq!(history.len(), 1);

    assert_eq!(t.engine.resolve(&t.ctx, "123456789/100.4").unwrap(), Some(item));
    assert_eq!(t.uri_values(&item), vec![t.resolvable("123456789/100.4")]);
}

#[test]
fn restore_retry_is_idempotent() {
    let t = TestEngine::new();
    let item = ObjectRef::item();
    t.engine
        .register_with(&t.ctx, &item, "123456789/100.4")
        .unwrap();
    let writes = t.registry.write_count();

    t.engine
        .register_with(&t.ctx, &item, "123456789/100.4")
        .unwrap();

    assert_eq!(t.history.history_count(), 1);
    let history = t.history.find_history(&t.ctx, &item).unwrap().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(t.registry.write_count(), writes);
}

#[test]
fn restore_completes_after_rejected_metadata_update() {
    let t = TestEngine::new();
    let item = ObjectRef::item();
    t.metadata.set_read_only(&item, true);

    let err = t
        .engine
        .register_with(&t.ctx, &item, "123456789/100.2")
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert!(matches!(
        err,
        Error::Unauthorized {
            operation: Operation::Synchronize,
            ..
        }
    ));
    // The binding happened before the refused write
    assert_eq!(t.bound(&item).as_deref(), Some("123456789/100.2"));
    assert!(t.history.find_history(&t.ctx, &item).unwrap().is_none());

    t.metadata.set_read_only(&item, false);
    t.engine
        .register_with(&t.ctx, &item, "123456789/100.2")
        .unwrap();

    let history = t.history.find_history(&t.ctx, &item).unwrap().unwrap();
    assert_eq!(history.version_of(item.id).unwrap().number, v(2));
    assert_eq!(t.uri_values(&item), vec![t.resolvable("123456789/100.2")]);
}

#[test]
fn restored_lineage_continues_numbering() {
    let t = TestEngine::new();
    let restored = ObjectRef::item();
    t.engine
        .register_with(&t.ctx, &restored, "123456789/100.4")
        .unwrap();

    let next = t.next_version(&restored);
    let history = t.history.find_history(&t.ctx, &next).unwrap().unwrap();
    assert_eq!(history.version_of(next.id).unwrap().number, v(5));

    // The restored object is also the lineage's first version, so the
    // next version derives from its handle with the suffix stripped
    let handle = t.engine.mint(&t.ctx, &next).unwrap();
    assert_eq!(handle, "123456789/100.5");
}

#[test]
fn restore_of_first_version_records_version_one() {
    let t = TestEngine::new();
    let item = ObjectRef::item();

    let bound = t
        .engine
        .register_with(&t.ctx, &item, "123456789/100.1")
        .unwrap();

    assert_eq!(bound, "123456789/100");
    let history = t.history.find_history(&t.ctx, &item).unwrap().unwrap();
    assert_eq!(history.version_of(item.id).unwrap().number, v(1));
}

#[test]
fn restore_into_taken_handle_fails() {
    let t = TestEngine::new();
    let owner = ObjectRef::item();
    t.engine
        .reserve(&t.ctx, &owner, "123456789/100.4")
        .unwrap();

    let item = ObjectRef::item();
    let err = t
        .engine
        .register_with(&t.ctx, &item, "123456789/100.4")
        .unwrap_err();

    assert!(matches!(err, Error::AlreadyBound { holder, .. } if holder == owner.id));
    assert!(t.history.find_history(&t.ctx, &item).unwrap().is_none());
}

#[test]
fn retry_after_failed_version_record_leaves_one_history() {
    let history = Arc::new(InMemoryHistoryStore::new());
    let flaky = Arc::new(FlakyVersions::new(history.clone()));
    let t = TestEngine::with_history(history, flaky.clone());
    let item = ObjectRef::item();

    flaky.fail_version_writes(1);
    let err = t
        .engine
        .register_with(&t.ctx, &item, "123456789/100.4")
        .unwrap_err();
    assert!(matches!(err, Error::Store { operation: Operation::Restore, .. }));
    assert_eq!(t.history.history_count(), 0);
    assert_eq!(t.bound(&item).as_deref(), Some("123456789/100.4"));

    t.engine
        .register_with(&t.ctx, &item, "123456789/100.4")
        .unwrap();

    assert_eq!(t.history.history_count(), 1);
    let lineage = t.history.find_history(&t.ctx, &item).unwrap().unwrap();
    assert_eq!(lineage.version_of(item.id).unwrap().number, v(4));
}

#[test]
fn retry_after_failed_persist_finds_the_lineage() {
    let history = Arc::new(InMemoryHistoryStore::new());
    let flaky = Arc::new(FlakyVersions::new(history.clone()));
    let t = TestEngine::with_history(history, flaky.clone());
    let item = ObjectRef::item();

    flaky.fail_persists(1);
    let err = t
        .engine
        .register_with(&t.ctx, &item, "123456789/100.2")
        .unwrap_err();
    assert!(matches!(err, Error::Store { operation: Operation::Restore, .. }));

    t.engine
        .register_with(&t.ctx, &item, "123456789/100.2")
        .unwrap();

    assert_eq!(t.history.history_count(), 1);
    let lineage = t.history.find_history(&t.ctx, &item).unwrap().unwrap();
    assert_eq!(lineage.len(), 1);
    assert_eq!(lineage.version_of(item.id).unwrap().number, v(2));
}

#[test]
fn padded_scheme_spelling_restores_canonical_handle() {
    let t = TestEngine::new();
    let item = ObjectRef::item();

    let bound = t
        .engine
        .register_with(&t.ctx, &item, "  hdl:123456789/100.3\n")
        .unwrap();

    assert_eq!(bound, "123456789/100.3");
    let lineage = t.history.find_history(&t.ctx, &item).unwrap().unwrap();
    assert_eq!(lineage.version_of(item.id).unwrap().number, v(3));
    assert_eq!(t.uri_values(&item), vec![t.resolvable("123456789/100.3")]);
}
