//! Handle configuration via `handles.toml`
//!
//! The engine never reads global state: callers load a [`HandleConfig`] from
//! the repository's config directory (or build one in code) and pass it in.
//! On first start a commented default `handles.toml` can be written with
//! [`HandleConfig::write_default_if_missing`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use handlemint_core::identifier::{is_valid_prefix, GLOBAL_RESOLVER};

use crate::error::{Error, Result};

/// Config file name placed in the repository's config directory.
pub const CONFIG_FILE_NAME: &str = "handles.toml";

/// Prefix used when none is configured.
///
/// This is the placeholder naming authority of an unregistered install;
/// handles minted under it are not globally resolvable.
pub const EXAMPLE_PREFIX: &str = "123456789";

/// Where the effective prefix came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixSource {
    /// Set in configuration
    Configured,
    /// Not configured; [`EXAMPLE_PREFIX`] is in use
    Fallback,
}

/// Handle configuration loaded from `handles.toml`.
///
/// # Example
///
/// ```toml
/// # Naming authority registered for this repository
/// prefix = "10673"
/// canonical_prefix = "https://hdl.handle.net/"
/// versioning_enabled = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleConfig {
    /// Naming authority for generated handles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Prepended to a handle to form its resolvable URL.
    #[serde(default = "default_canonical_prefix")]
    pub canonical_prefix: String,
    /// Whether item versioning is turned on for the repository.
    #[serde(default = "default_versioning_enabled")]
    pub versioning_enabled: bool,
}

fn default_canonical_prefix() -> String {
    GLOBAL_RESOLVER.to_string()
}

fn default_versioning_enabled() -> bool {
    true
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            prefix: None,
            canonical_prefix: default_canonical_prefix(),
            versioning_enabled: default_versioning_enabled(),
        }
    }
}

impl HandleConfig {
    /// Config with the given prefix and all other settings at their defaults
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    /// Effective prefix and where it came from
    ///
    /// A missing or blank prefix falls back to [`EXAMPLE_PREFIX`] and emits
    /// a warning; it is never an error.
    pub fn resolve_prefix(&self) -> (String, PrefixSource) {
        match self.prefix.as_deref().map(str::trim) {
            Some(prefix) if !prefix.is_empty() => (prefix.to_string(), PrefixSource::Configured),
            _ => {
                warn!(
                    target: "handlemint::config",
                    fallback = EXAMPLE_PREFIX,
                    "No handle prefix configured; minting under the example prefix"
                );
                (EXAMPLE_PREFIX.to_string(), PrefixSource::Fallback)
            }
        }
    }

    /// Check field values.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a configured prefix is not a dotted run
    /// of digits.
    pub fn validate(&self) -> Result<()> {
        match self.prefix.as_deref().map(str::trim) {
            Some(prefix) if !prefix.is_empty() && !is_valid_prefix(prefix) => {
                Err(Error::config(format!(
                    "Invalid handle prefix '{}' in {}. Expected digits separated by single dots.",
                    prefix, CONFIG_FILE_NAME
                )))
            }
            _ => Ok(()),
        }
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Handle configuration
#
# Naming authority registered for this repository. When unset, handles are
# minted under the example prefix 123456789 and a warning is logged.
# prefix = "123456789"

# Prepended to a handle to form its resolvable URL; also stripped when
# parsing user input.
canonical_prefix = "http://hdl.handle.net/"

# Versioned handles (123456789/100.2) require item versioning.
versioning_enabled = true
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: HandleConfig = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
