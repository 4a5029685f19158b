//! Target materialization: per-scenario, per-target marginal tables.
//!
//! After each completed solve, the factor set of every scenario is folded
//! into one joint table and projected down to each configured query
//! variable. The joint is combined once per scenario and shared by all of
//! that scenario's targets, so the cost of adding targets is one projection
//! each, not one recombination each.
//!
//! The result is an immutable [`MarginalCache`] snapshot. Under a repeating
//! (anytime) solver the cache is rebuilt from scratch on every completed
//! solve and swapped in as a whole; readers holding the previous snapshot
//! keep a consistent view and can never observe a partial rebuild.

use std::sync::Arc;

use rustc_hash::FxHashMap;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::engine::solution::{Bounds, SolutionStore};
use crate::engine::table::WeightTable;
use crate::engine::variable::{Variable, VariableId};

/// Immutable mapping from (scenario, query variable) to the un-normalized
/// marginal weight table materialized for it.
#[derive(Debug, Clone, Default)]
pub struct MarginalCache {
    marginals: FxHashMap<Bounds, FxHashMap<VariableId, Arc<WeightTable>>>,
}

impl MarginalCache {
    /// The cache of an instance that has not seen a completed solve yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of scenarios with materialized marginals.
    pub fn scenario_count(&self) -> usize {
        self.marginals.len()
    }

    /// Scenario keys in sorted order.
    pub fn scenarios(&self) -> Vec<Bounds> {
        let mut keys: Vec<Bounds> = self.marginals.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// The materialized marginal for a scenario and variable.
    pub fn marginal(&self, bounds: Bounds, id: VariableId) -> Option<&Arc<WeightTable>> {
        self.marginals.get(&bounds).and_then(|per_target| per_target.get(&id))
    }
}

/// Builds the marginal cache for every scenario in the store.
///
/// For each scenario the factor set is folded into one joint table; each
/// target variable is then projected out of that shared joint. An empty
/// factor set folds to the identity, so its marginals are scalar tables
/// holding 1.0. There are no error conditions: the solver guarantees a
/// consistent factor set before the store is handed over.
pub fn materialize(store: &SolutionStore, targets: &[Variable]) -> MarginalCache {
    let mut marginals = FxHashMap::default();
    for (bounds, solution) in store.iter() {
        let joint = WeightTable::combine_all(solution.factors());
        #[cfg(feature = "tracing")]
        tracing::debug!(
            scenario = ?bounds,
            factors = solution.factors().len(),
            joint_entries = joint.entry_count(),
            "combined scenario factor set"
        );

        #[cfg(feature = "rayon")]
        let per_target: Vec<(VariableId, Arc<WeightTable>)> = targets
            .par_iter()
            .map(|v| (v.id, Arc::new(joint.project(&[v.id]))))
            .collect();
        #[cfg(not(feature = "rayon"))]
        let per_target: Vec<(VariableId, Arc<WeightTable>)> = targets
            .iter()
            .map(|v| (v.id, Arc::new(joint.project(&[v.id]))))
            .collect();

        marginals.insert(bounds, per_target.into_iter().collect());
    }
    MarginalCache { marginals }
}
