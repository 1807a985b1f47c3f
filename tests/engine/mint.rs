//! Minting: generated handles, lineage-derived handles and their failures.

use crate::common::*;
use std::sync::Arc;

// ============================================================================
// Unversioned objects
// ============================================================================

#[test]
fn unversioned_item_gets_generated_handle() {
    let t = TestEngine::new();
    let item = ObjectRef::item();

    let handle = t.engine.mint(&t.ctx, &item).unwrap();

    assert_eq!(handle, "123456789/1");
    assert_eq!(t.bound(&item).as_deref(), Some("123456789/1"));
}

#[test]
fn mint_is_idempotent() {
    let t = TestEngine::new();
    let item = ObjectRef::item();

    let first = t.engine.mint(&t.ctx, &item).unwrap();
    let writes = t.registry.write_count();
    let commits = t.metadata.commit_count();

    let second = t.engine.mint(&t.ctx, &item).unwrap();

    assert_eq!(first, second);
    assert_eq!(t.registry.write_count(), writes);
    assert_eq!(t.metadata.commit_count(), commits);
}

#[test]
fn collections_get_generated_handles_and_metadata() {
    let t = TestEngine::new();
    let collection = ObjectRef::collection();
    let community = ObjectRef::community();

    let a = t.engine.mint(&t.ctx, &collection).unwrap();
    let b = t.engine.mint(&t.ctx, &community).unwrap();

    assert_ne!(a, b);
    assert_eq!(t.uri_values(&collection), vec![t.resolvable(&a)]);
    assert_eq!(t.uri_values(&community), vec![t.resolvable(&b)]);
}

#[test]
fn undescribed_objects_get_no_metadata() {
    let t = TestEngine::new();
    let site = ObjectRef::new(ObjectId::new(), ObjectKind::Site);

    t.engine.mint(&t.ctx, &site).unwrap();

    assert!(t.uri_values(&site).is_empty());
    assert_eq!(t.metadata.commit_count(), 0);
}

// ============================================================================
// Lineage-derived handles
// ============================================================================

#[test]
fn versions_derive_from_first_handle() {
    let t = TestEngine::new();
    let items = t.lineage(&[1, 2, 5]);

    let h1 = t.engine.mint(&t.ctx, &items[0]).unwrap();
    let h2 = t.engine.mint(&t.ctx, &items[1]).unwrap();
    let h5 = t.engine.mint(&t.ctx, &items[2]).unwrap();

    assert_eq!(h1, "123456789/1");
    assert_eq!(h2, "123456789/1.2");
    assert_eq!(h5, "123456789/1.5");
}

#[test]
fn first_version_keeps_registered_handle() {
    let t = TestEngine::new();
    let items = t.sequential_lineage(2);
    t.engine
        .register_with(&t.ctx, &items[0], "123456789/100")
        .unwrap();

    let h2 = t.engine.mint(&t.ctx, &items[1]).unwrap();
    assert_eq!(h2, "123456789/100.2");

    let h3 = t.engine.mint(&t.ctx, &t.next_version(&items[1])).unwrap();
    assert_eq!(h3, "123456789/100.3");
}

#[test]
fn new_version_metadata_points_at_versioned_handle() {
    let t = TestEngine::new();
    let items = t.sequential_lineage(2);
    t.engine.mint(&t.ctx, &items[0]).unwrap();
    // The copy carries the first version's metadata
    t.seed_uris(&items[1], &["http://hdl.handle.net/123456789/1"]);

    let h2 = t.engine.mint(&t.ctx, &items[1]).unwrap();

    assert_eq!(t.uri_values(&items[1]), vec![t.resolvable(&h2)]);
    assert_eq!(t.uri_values(&items[0]), vec![t.resolvable("123456789/1")]);
}

#[test]
fn first_handle_with_version_suffix_is_stripped() {
    let t = TestEngine::new();
    let items = t.sequential_lineage(3);
    // Imported lineage whose first version was reserved with a suffix
    t.engine
        .reserve(&t.ctx, &items[0], "123456789/100.9")
        .unwrap();

    let h3 = t.engine.mint(&t.ctx, &items[2]).unwrap();
    assert_eq!(h3, "123456789/100.3");
}

#[test]
fn versioned_handle_held_elsewhere_fails() {
    let t = TestEngine::new();
    let items = t.sequential_lineage(2);
    t.engine.mint(&t.ctx, &items[0]).unwrap();
    let squatter = ObjectRef::item();
    t.engine
        .reserve(&t.ctx, &squatter, "123456789/1.2")
        .unwrap();

    let err = t.engine.mint(&t.ctx, &items[1]).unwrap_err();

    assert_eq!(
        err,
        Error::DuplicateVersionedIdentifier {
            object: items[1].id,
            kind: ObjectKind::Item,
            handle: "123456789/1.2".to_string(),
            version: v(2),
            holder: squatter.id,
        }
    );
    assert!(err.is_version_inconsistency());
    assert_eq!(t.bound(&items[1]), None);
}

#[test]
fn unbound_first_version_of_another_object_fails() {
    let t = TestEngine::new();
    let items = t.sequential_lineage(2);

    let err = t.engine.mint(&t.ctx, &items[1]).unwrap_err();

    assert!(matches!(
        err,
        Error::LineageUnbound { object, first, .. } if object == items[1].id && first == items[0].id
    ));
    assert_eq!(t.registry.write_count(), 0);
}

#[test]
fn missing_version_record_fails() {
    init_tracing();
    let history = Arc::new(InMemoryHistoryStore::new());
    let registry = Arc::new(InMemoryRegistry::new(PREFIX, RESOLVER));
    let engine = MintingEngine::new(
        HandleConfig::with_prefix(PREFIX),
        registry.clone(),
        Arc::new(DetachedVersions(history.clone())),
        Arc::new(InMemoryMetadataStore::new()),
    )
    .unwrap();

    let ctx = Context::new();
    let item = ObjectRef::item();
    let mut lineage = history.create_history(&ctx).unwrap();
    history
        .create_version(&ctx, &mut lineage, &item, "", chrono::Utc::now(), None)
        .unwrap();

    let err = engine.mint(&ctx, &item).unwrap_err();
    assert_eq!(
        err,
        Error::VersionRecordMissing {
            object: item.id,
            kind: ObjectKind::Item,
            history: lineage.id(),
        }
    );
    assert_eq!(registry.bound_count(), 0);
}

#[test]
fn non_versionable_item_ignores_lineage() {
    let t = TestEngine::new();
    let items = t.sequential_lineage(2);
    t.engine.mint(&t.ctx, &items[0]).unwrap();
    let plain = ObjectRef::with_capabilities(items[1].id, ObjectKind::Item, Capabilities::CONTENT);

    let handle = t.engine.mint(&t.ctx, &plain).unwrap();
    assert_eq!(handle, "123456789/2");
}

#[test]
fn register_mints_and_repairs_metadata() {
    let t = TestEngine::new();
    let item = ObjectRef::item();
    let handle = t.engine.register(&t.ctx, &item).unwrap();
    assert_eq!(t.uri_values(&item), vec![t.resolvable(&handle)]);

    // Metadata drifted; mint leaves it, register repairs it
    t.seed_uris(&item, &["hdl:123456789/77"]);
    t.engine.mint(&t.ctx, &item).unwrap();
    assert_eq!(t.uri_values(&item), vec!["hdl:123456789/77"]);

    let again = t.engine.register(&t.ctx, &item).unwrap();
    assert_eq!(again, handle);
    assert_eq!(t.uri_values(&item), vec![t.resolvable(&handle)]);
}
