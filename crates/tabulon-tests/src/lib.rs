//! Integration and property tests for the Tabulon engine.
//!
//! This crate has no library surface; everything lives under `tests/`.
