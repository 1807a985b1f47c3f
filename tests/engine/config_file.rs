//! Engine construction from `handles.toml`.

use crate::common::*;
use tempfile::TempDir;

#[test]
fn engine_mints_under_configured_prefix() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "prefix = \"20.500.12345\"\n").unwrap();

    let config = HandleConfig::from_file(&path).unwrap();
    let t = TestEngine::with_config(config);

    assert_eq!(t.engine.prefix_source(), PrefixSource::Configured);
    assert_eq!(t.engine.mint(&t.ctx, &ObjectRef::item()).unwrap(), "20.500.12345/1");
}

#[test]
fn default_file_falls_back_to_example_prefix() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    HandleConfig::write_default_if_missing(&path).unwrap();

    let t = TestEngine::with_config(HandleConfig::from_file(&path).unwrap());

    assert_eq!(t.engine.prefix(), EXAMPLE_PREFIX);
    assert_eq!(t.engine.prefix_source(), PrefixSource::Fallback);
    assert_eq!(t.engine.mint(&t.ctx, &ObjectRef::item()).unwrap(), "123456789/1");
}

#[test]
fn disabled_versioning_prevents_construction() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "versioning_enabled = false\n").unwrap();

    let config = HandleConfig::from_file(&path).unwrap();
    let err = MintingEngine::ephemeral(config).unwrap_err();
    assert_eq!(err, Error::VersioningDisabled);
}

#[test]
fn written_config_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    let config = HandleConfig {
        prefix: Some("10673".to_string()),
        canonical_prefix: "https://repo.example.org/handle/".to_string(),
        versioning_enabled: true,
    };

    config.write_to_file(&path).unwrap();
    let loaded = HandleConfig::from_file(&path).unwrap();

    assert_eq!(loaded, config);
    let t = TestEngine::with_config(loaded);
    assert_eq!(
        t.engine.resolve(&t.ctx, "https://repo.example.org/handle/10673/1").unwrap(),
        None
    );
    assert!(t.engine.supports("https://repo.example.org/handle/10673/1"));
}
