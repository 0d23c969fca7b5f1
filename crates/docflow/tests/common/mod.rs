//! Shared test utilities for docflow integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated runs with a temp config directory
//! - helpers for collecting pipeline events

pub mod harness;

pub use harness::{fast_timing, TestHarness};
