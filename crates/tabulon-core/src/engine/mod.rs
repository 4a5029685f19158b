//! The query engine for solved weight-table factor sets.
//!
//! This module provides:
//! - **errors**: Error types for query failures
//! - **variable**: Variable handles, domains, and query targets
//! - **table**: Dense weight-table algebra (combine, project, fold, map)
//! - **solution**: Scenario-keyed storage for solved factor sets
//! - **materialize**: Per-scenario, per-target marginal materialization
//! - **query**: Single-variable distribution and expectation queries
//! - **joint**: Multi-variable, order-aware joint queries

pub mod errors;
pub mod joint;
pub mod materialize;
pub mod query;
pub mod solution;
pub mod table;
pub mod variable;
