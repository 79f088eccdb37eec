//! Shared test utilities for palletline integration tests.
//!
//! This module provides:
//! - `TestHarness` with an in-memory database, a scan station and an inventory desk
//! - Builders for configs and scanner payloads

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
