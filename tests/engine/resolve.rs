//! Resolution, reverse lookup and deletion.

use crate::common::*;

#[test]
fn resolves_every_accepted_spelling() {
    let t = TestEngine::new();
    let item = ObjectRef::item();
    let handle = t.engine.mint(&t.ctx, &item).unwrap();

    for spelling in [
        handle.clone(),
        format!("hdl:{handle}"),
        format!("info:hdl/{handle}"),
        format!("http://hdl.handle.net/{handle}"),
        format!("https://hdl.handle.net/{handle}"),
        format!("  {handle}\n"),
    ] {
        assert_eq!(
            t.engine.resolve(&t.ctx, &spelling).unwrap(),
            Some(item),
            "spelling {spelling:?}"
        );
    }
}

#[test]
fn malformed_input_resolves_to_none() {
    let t = TestEngine::new();
    t.engine.mint(&t.ctx, &ObjectRef::item()).unwrap();

    for input in ["", "123456789", "/1", "abc/1", "123456789/", "123 456/1"] {
        assert_eq!(t.engine.resolve(&t.ctx, input).unwrap(), None, "input {input:?}");
        assert!(!t.engine.supports(input));
    }
}

#[test]
fn unknown_handle_resolves_to_none() {
    let t = TestEngine::new();
    assert!(t.engine.supports("123456789/404"));
    assert_eq!(t.engine.resolve(&t.ctx, "123456789/404").unwrap(), None);
}

#[test]
fn versioned_handles_resolve_to_their_version() {
    let t = TestEngine::new();
    let items = t.sequential_lineage(3);
    for item in &items {
        t.engine.mint(&t.ctx, item).unwrap();
    }

    assert_eq!(t.engine.resolve(&t.ctx, "123456789/1").unwrap(), Some(items[0]));
    assert_eq!(t.engine.resolve(&t.ctx, "123456789/1.2").unwrap(), Some(items[1]));
    assert_eq!(t.engine.resolve(&t.ctx, "hdl:123456789/1.3").unwrap(), Some(items[2]));
    // Version 1 is the bare handle
    assert_eq!(t.engine.resolve(&t.ctx, "123456789/1.1").unwrap(), Some(items[0]));
}

#[test]
fn lookup_returns_bound_handle() {
    let t = TestEngine::new();
    let item = ObjectRef::item();
    let handle = t.engine.mint(&t.ctx, &item).unwrap();
    assert_eq!(t.engine.lookup(&t.ctx, &item).unwrap(), handle);
}

#[test]
fn lookup_of_unbound_object_is_not_found() {
    let t = TestEngine::new();
    let item = ObjectRef::collection();
    assert_eq!(
        t.engine.lookup(&t.ctx, &item).unwrap_err(),
        Error::NotFound {
            object: item.id,
            kind: ObjectKind::Collection,
        }
    );
}

#[test]
fn delete_unbinds() {
    let t = TestEngine::new();
    let item = ObjectRef::item();
    let handle = t.engine.mint(&t.ctx, &item).unwrap();

    t.engine.delete(&t.ctx, &item).unwrap();

    assert_eq!(t.engine.resolve(&t.ctx, &handle).unwrap(), None);
    assert!(matches!(
        t.engine.lookup(&t.ctx, &item),
        Err(Error::NotFound { .. })
    ));
    assert!(t.registry.is_retired(&handle));
}

#[test]
fn delete_handle_ignores_the_given_text() {
    let t = TestEngine::new();
    let item = ObjectRef::item();
    let handle = t.engine.mint(&t.ctx, &item).unwrap();

    t.engine
        .delete_handle(&t.ctx, &item, "123456789/unrelated")
        .unwrap();

    assert_eq!(t.engine.resolve(&t.ctx, &handle).unwrap(), None);
}

#[test]
fn delete_of_unbound_object_succeeds() {
    let t = TestEngine::new();
    t.engine.delete(&t.ctx, &ObjectRef::item()).unwrap();
    assert_eq!(t.registry.write_count(), 0);
}

#[test]
fn mint_after_delete_is_fresh() {
    let t = TestEngine::new();
    let item = ObjectRef::item();
    let old = t.engine.mint(&t.ctx, &item).unwrap();
    t.engine.delete(&t.ctx, &item).unwrap();

    let new = t.engine.mint(&t.ctx, &item).unwrap();

    assert_ne!(new, old);
    assert_eq!(t.engine.resolve(&t.ctx, &old).unwrap(), None);
    assert_eq!(t.engine.resolve(&t.ctx, &new).unwrap(), Some(item));
    // Generation never reissues the retired string to anyone
    let other = t.engine.mint(&t.ctx, &ObjectRef::item()).unwrap();
    assert_ne!(other, old);
}

#[test]
fn retired_handle_can_be_registered_explicitly() {
    let t = TestEngine::new();
    let first = ObjectRef::item();
    let handle = t.engine.mint(&t.ctx, &first).unwrap();
    t.engine.delete(&t.ctx, &first).unwrap();

    let second = ObjectRef::item();
    t.engine.register_with(&t.ctx, &second, &handle).unwrap();

    assert_eq!(t.engine.resolve(&t.ctx, &handle).unwrap(), Some(second));
}

#[test]
fn handle_extracted_from_url() {
    assert_eq!(
        handle_from_url("http://hdl.handle.net/123456789/100").as_deref(),
        Some("123456789/100")
    );
    assert_eq!(
        handle_from_url("https://repo.example.org/handle/10673/7.2").as_deref(),
        Some("10673/7.2")
    );
    assert_eq!(handle_from_url("no-slashes"), None);
}
