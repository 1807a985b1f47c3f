//! Storage layer for handlemint
//!
//! This crate implements in-memory versions of the three collaborator
//! contracts defined in `handlemint-core`:
//! - InMemoryRegistry: handle ↔ object bindings under one RwLock
//! - InMemoryHistoryStore: version lineages with a DashMap lineage index
//! - InMemoryMetadataStore: staged/committed descriptive metadata
//!
//! They back the engine's ephemeral mode and the test suites. Production
//! deployments implement the same traits over their own stores.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod history;
pub mod metadata;
pub mod registry;

pub use history::InMemoryHistoryStore;
pub use metadata::InMemoryMetadataStore;
pub use registry::InMemoryRegistry;
