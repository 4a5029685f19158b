//! Point queries: single-variable distributions and expectations.
//!
//! [`MarginalEngine`] owns the fixed list of query targets and the current
//! [`MarginalCache`] snapshot. A point distribution is only well-defined
//! when the target's support is fully resolved and exactly one solution
//! scenario is materialized; anything else is rejected up front instead of
//! returning a degraded answer.

use std::sync::Arc;

use crate::engine::errors::InferenceError;
use crate::engine::materialize::{materialize, MarginalCache};
use crate::engine::solution::SolutionStore;
use crate::engine::table::WeightTable;
use crate::engine::variable::{Outcome, QueryTarget, Variable};

/// Answers single-variable distribution and expectation queries against
/// materialized marginals.
///
/// The target list is fixed at construction. [`process_solutions`] rebuilds
/// the cache from a completed solve and swaps it in as an immutable
/// snapshot, so it may be called repeatedly under an anytime scheduler
/// without queries ever observing a half-replaced cache.
///
/// [`process_solutions`]: MarginalEngine::process_solutions
#[derive(Debug, Clone)]
pub struct MarginalEngine<V> {
    targets: Vec<QueryTarget<V>>,
    cache: Arc<MarginalCache>,
}

impl<V: Clone + PartialEq> MarginalEngine<V> {
    /// Creates an engine for a fixed set of query targets.
    ///
    /// The cache starts empty; queries fail with
    /// [`InferenceError::NoSolution`] until a solve has been processed.
    pub fn new(targets: Vec<QueryTarget<V>>) -> Self {
        Self {
            targets,
            cache: Arc::new(MarginalCache::empty()),
        }
    }

    /// The variables this engine was configured to track.
    pub fn targets(&self) -> &[QueryTarget<V>] {
        &self.targets
    }

    /// Materializes marginals for every scenario in the store and swaps
    /// the result in as the new cache snapshot.
    ///
    /// The previous snapshot is discarded wholesale; it is never patched.
    pub fn process_solutions(&mut self, store: &SolutionStore) {
        let variables: Vec<Variable> = self.targets.iter().map(QueryTarget::variable).collect();
        let rebuilt = materialize(store, &variables);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            scenarios = rebuilt.scenario_count(),
            targets = variables.len(),
            "swapping materialized marginal cache"
        );
        self.cache = Arc::new(rebuilt);
    }

    /// The current cache snapshot.
    pub fn cache_snapshot(&self) -> Arc<MarginalCache> {
        Arc::clone(&self.cache)
    }

    /// The posterior distribution of a single target.
    ///
    /// Fails with [`InferenceError::UnresolvedSupport`] if the target's
    /// domain contains the unresolved member, with
    /// [`InferenceError::MultipleScenarios`] if more than one scenario is
    /// materialized, and with [`InferenceError::ZeroMass`] if every weight
    /// in the marginal is zero. The support check runs first and no partial
    /// computation happens on a rejected query.
    pub fn distribution(&self, target: &QueryTarget<V>) -> Result<Distribution<V>, InferenceError> {
        if target.has_unresolved() {
            return Err(InferenceError::UnresolvedSupport(format!(
                "domain of '{}' contains the unresolved member; query it with a \
                 bounds-aware interval algorithm, or range the model so that no \
                 unresolved members remain",
                target.name()
            )));
        }
        match self.cache.scenario_count() {
            0 => {
                return Err(InferenceError::NoSolution(format!(
                    "no completed solve is available to answer a query for '{}'",
                    target.name()
                )))
            }
            1 => {}
            n => {
                return Err(InferenceError::MultipleScenarios(format!(
                    "{n} solution scenarios are materialized; a point distribution \
                     is only defined for exactly one, use bounds-aware querying",
                )))
            }
        }
        let bounds = self.cache.scenarios()[0];
        let marginal = self
            .cache
            .marginal(bounds, target.variable().id)
            .ok_or_else(|| {
                InferenceError::UnknownTarget(format!(
                    "'{}' is not among the query targets configured for this engine",
                    target.name()
                ))
            })?;
        Distribution::from_marginal(Arc::clone(marginal), target)
    }

    /// The expectation of `f` under the target's distribution.
    ///
    /// A pure function of [`distribution`](Self::distribution); no further
    /// validation happens here.
    pub fn expectation<F>(&self, target: &QueryTarget<V>, f: F) -> Result<f64, InferenceError>
    where
        F: Fn(&V) -> f64,
    {
        let distribution = self.distribution(target)?;
        Ok(distribution.iter().map(|(p, value)| p * f(value)).sum())
    }

    /// The probability that the target satisfies a predicate.
    pub fn probability<P>(&self, target: &QueryTarget<V>, predicate: P) -> Result<f64, InferenceError>
    where
        P: Fn(&V) -> bool,
    {
        self.expectation(target, |value| if predicate(value) { 1.0 } else { 0.0 })
    }
}

impl MarginalEngine<f64> {
    /// The mean of a real-valued target.
    pub fn mean(&self, target: &QueryTarget<f64>) -> Result<f64, InferenceError> {
        self.expectation(target, |value| *value)
    }

    /// The variance of a real-valued target.
    pub fn variance(&self, target: &QueryTarget<f64>) -> Result<f64, InferenceError> {
        let mean = self.mean(target)?;
        self.expectation(target, |value| (value - mean) * (value - mean))
    }
}

/// A normalized single-variable distribution.
///
/// Holds the materialized marginal and the target's resolved domain values.
/// [`iter`](Distribution::iter) is lazy and restartable: probabilities are
/// computed on the fly as weight over total mass, in the marginal table's
/// native index order, which is stable across calls.
#[derive(Debug, Clone)]
pub struct Distribution<V> {
    marginal: Arc<WeightTable>,
    total_mass: f64,
    values: Vec<V>,
}

impl<V: Clone + PartialEq> Distribution<V> {
    fn from_marginal(
        marginal: Arc<WeightTable>,
        target: &QueryTarget<V>,
    ) -> Result<Self, InferenceError> {
        let variable = target.variable();
        if marginal.position_of(variable.id).is_none() {
            // The solver never mentioned this variable, so its marginal
            // collapsed to the scalar identity during materialization.
            return Err(InferenceError::UnknownTarget(format!(
                "variable '{}' does not appear in the solved factor set",
                target.name()
            )));
        }
        if marginal.scope().len() != 1 {
            return Err(InferenceError::Internal(format!(
                "materialized marginal for '{}' covers more than that variable",
                target.name()
            )));
        }
        if marginal.entry_count() != target.domain().len() {
            return Err(InferenceError::Internal(format!(
                "materialized marginal for '{}' has {} entries for a domain of {}",
                target.name(),
                marginal.entry_count(),
                target.domain().len()
            )));
        }
        let total_mass = marginal.total_mass();
        if !(total_mass.is_finite() && total_mass > 0.0) {
            return Err(InferenceError::ZeroMass(format!(
                "every weight for '{}' is zero; its distribution cannot be normalized",
                target.name()
            )));
        }
        let values = target
            .domain()
            .iter()
            .map(|outcome| match outcome {
                Outcome::Value(v) => Ok(v.clone()),
                Outcome::Unresolved => Err(InferenceError::Internal(
                    "unresolved member survived the support check".into(),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            marginal,
            total_mass,
            values,
        })
    }

    /// Lazily enumerates `(probability, value)` pairs.
    ///
    /// Probabilities sum to 1.0 within floating-point tolerance.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &V)> + '_ {
        self.marginal
            .entries()
            .map(move |(index, weight)| (weight / self.total_mass, &self.values[index[0]]))
    }

    /// The un-normalized total mass of the underlying marginal.
    pub fn total_mass(&self) -> f64 {
        self.total_mass
    }

    /// Number of domain values in the distribution.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the distribution has no support points.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
