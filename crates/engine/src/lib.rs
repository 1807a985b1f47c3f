//! Minting engine for handlemint
//!
//! This crate orchestrates the collaborators defined in `handlemint-core`:
//! - MintingEngine: mint, register, reserve, resolve, lookup, delete
//! - MetadataSynchronizer: keeps `dc.identifier.uri` in step with the handle
//! - HandleConfig: `handles.toml` configuration
//! - Error: structured engine errors
//!
//! The engine is the only component that knows how versioned handles are
//! derived from a lineage.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod error;
pub mod synchronizer;

pub use config::{HandleConfig, PrefixSource, CONFIG_FILE_NAME, EXAMPLE_PREFIX};
pub use engine::{InMemoryBackends, MintingEngine, RegistrationPath, RESTORE_SUMMARY};
pub use error::{Error, Operation, Result};
pub use synchronizer::MetadataSynchronizer;
