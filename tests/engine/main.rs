//! Minting Engine Integration Tests
//!
//! End-to-end behaviour of the engine over the in-memory stores.

#[path = "../common/mod.rs"]
mod common;

mod config_file;
mod mint;
mod resolve;
mod restore;
