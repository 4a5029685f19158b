//! Scenario-keyed storage for solved factor sets.
//!
//! A solve runs once per approximation scenario. Models with pruned or
//! unresolved support are solved twice, once under each bound; an exact
//! solve produces a single scenario. The store maps each scenario key to
//! the factor set the solver produced for it, read-only for the query
//! layer.

use rustc_hash::FxHashMap;

use crate::engine::table::WeightTable;

/// Scenario key distinguishing mutually exclusive approximation regimes.
///
/// An exact (unapproximated) solve stores its single solution under
/// `Lower` by convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bounds {
    /// Lower-bound scenario (or the sole scenario of an exact solve)
    Lower,
    /// Upper-bound scenario
    Upper,
}

/// Summary statistics for one solved factor set.
///
/// Auxiliary to the solution; the query layer ignores these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolveDiagnostics {
    /// Number of factors the solve produced.
    pub factor_count: usize,
    /// Largest factor scope in the set.
    pub widest_scope: usize,
    /// Total weight entries across the set.
    pub total_entries: usize,
}

/// The factor set produced by solving one scenario.
#[derive(Debug, Clone)]
pub struct Solution {
    factors: Vec<WeightTable>,
    diagnostics: SolveDiagnostics,
}

impl Solution {
    /// Wraps a solved factor set, computing its diagnostics.
    pub fn new(factors: Vec<WeightTable>) -> Self {
        let diagnostics = SolveDiagnostics {
            factor_count: factors.len(),
            widest_scope: factors.iter().map(|f| f.scope().len()).max().unwrap_or(0),
            total_entries: factors.iter().map(WeightTable::entry_count).sum(),
        };
        Self {
            factors,
            diagnostics,
        }
    }

    /// The solved factor set.
    pub fn factors(&self) -> &[WeightTable] {
        &self.factors
    }

    /// Summary statistics for this solution.
    pub fn diagnostics(&self) -> SolveDiagnostics {
        self.diagnostics
    }
}

/// Read-only mapping from scenario key to its solution.
#[derive(Debug, Clone, Default)]
pub struct SolutionStore {
    solutions: FxHashMap<Bounds, Solution>,
}

impl SolutionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the solution for a scenario, replacing any previous one.
    pub fn insert(&mut self, bounds: Bounds, solution: Solution) {
        self.solutions.insert(bounds, solution);
    }

    /// The solution for a scenario, if solved.
    pub fn get(&self, bounds: Bounds) -> Option<&Solution> {
        self.solutions.get(&bounds)
    }

    /// Scenario keys in sorted order, for deterministic iteration.
    pub fn bounds(&self) -> Vec<Bounds> {
        let mut keys: Vec<Bounds> = self.solutions.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Scenarios and their solutions in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (Bounds, &Solution)> + '_ {
        self.bounds()
            .into_iter()
            .filter_map(move |b| self.solutions.get(&b).map(|solution| (b, solution)))
    }

    /// Number of solved scenarios.
    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    /// Returns `true` if no scenario has been solved.
    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }
}
