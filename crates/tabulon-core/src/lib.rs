//! # Tabulon Core
//!
//! Core engine for exact posterior queries over the weight-table factor
//! sets produced by an upstream elimination solver. Materializes a joint
//! table per solved scenario, projects it to per-target marginals, and
//! answers point and joint distribution queries against the result.

pub mod engine;

// Re-export commonly used types
pub use engine::errors::InferenceError;
pub use engine::joint::{JointColumn, JointDistribution, JointEngine};
pub use engine::materialize::{materialize, MarginalCache};
pub use engine::query::{Distribution, MarginalEngine};
pub use engine::solution::{Bounds, Solution, SolutionStore, SolveDiagnostics};
pub use engine::table::WeightTable;
pub use engine::variable::{Outcome, QueryTarget, Variable, VariableId};
