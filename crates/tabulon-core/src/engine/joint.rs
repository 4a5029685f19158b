//! Joint queries: multi-variable, order-aware distributions.
//!
//! [`JointEngine`] answers joint distribution queries directly against one
//! solved problem's factor set. It does not consult the marginal cache and
//! it supports only the single-scenario case; the caller hands it exactly
//! one solution at construction.
//!
//! The combined-and-projected table owns its variable ordering, which may
//! differ from the caller's requested order. Value tuples are emitted in
//! the table's native order and are never permuted; the returned
//! [`JointColumn`] ordering tells the caller which tuple position belongs
//! to which requested variable.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::engine::errors::InferenceError;
use crate::engine::solution::Solution;
use crate::engine::table::WeightTable;
use crate::engine::variable::{Outcome, QueryTarget, VariableId};

/// One requested variable's position within the joint result tuples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointColumn {
    /// The requested target's name
    pub name: Arc<str>,
    /// The underlying variable
    pub variable: VariableId,
    /// Index of this variable's component within every value tuple
    pub position: usize,
}

/// The result of a joint query: the reconciliation ordering plus the
/// normalized probability of every index combination.
#[derive(Debug, Clone)]
pub struct JointDistribution<V> {
    ordering: Vec<JointColumn>,
    entries: Vec<(f64, Vec<Outcome<V>>)>,
}

impl<V> JointDistribution<V> {
    /// Columns sorted by their position in the value tuples, ascending.
    ///
    /// Tuple positions must be interpreted through this list; they do not
    /// follow the order the query requested.
    pub fn ordering(&self) -> &[JointColumn] {
        &self.ordering
    }

    /// `(probability, value tuple)` pairs covering the full index space,
    /// zero-probability combinations included, in the table's native order.
    pub fn entries(&self) -> &[(f64, Vec<Outcome<V>>)] {
        &self.entries
    }

    /// Tuple position of a requested variable, by target name.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.ordering
            .iter()
            .find(|column| column.name.as_ref() == name)
            .map(|column| column.position)
    }
}

/// Answers joint queries against one solved, single-scenario problem.
#[derive(Debug, Clone)]
pub struct JointEngine {
    solution: Arc<Solution>,
}

impl JointEngine {
    /// Creates an engine over an explicit handle to the solved problem.
    pub fn new(solution: Arc<Solution>) -> Self {
        Self { solution }
    }

    /// The joint distribution over the requested variables.
    ///
    /// Combines the solution's full factor set into one joint table,
    /// projects it onto exactly the requested variables (correlations
    /// between them are preserved), normalizes, and enumerates the full
    /// index space. Each requested variable must appear at most once and
    /// must occur in the solved factor set.
    pub fn joint<V: Clone + PartialEq>(
        &self,
        targets: &[&QueryTarget<V>],
    ) -> Result<JointDistribution<V>, InferenceError> {
        for (i, target) in targets.iter().enumerate() {
            if targets[..i]
                .iter()
                .any(|seen| seen.variable().id == target.variable().id)
            {
                return Err(InferenceError::Validation(format!(
                    "variable '{}' is requested more than once in the joint query",
                    target.name()
                )));
            }
        }

        let joint = WeightTable::combine_all(self.solution.factors());
        let ids: Vec<VariableId> = targets.iter().map(|t| t.variable().id).collect();
        let projected = joint.project(&ids);

        // Reconcile the caller's (name, target) pairs with the projected
        // table's own variable ordering.
        let mut ordering = Vec::with_capacity(targets.len());
        for target in targets {
            let position = projected.position_of(target.variable().id).ok_or_else(|| {
                InferenceError::UnknownTarget(format!(
                    "variable '{}' does not appear in the solved factor set",
                    target.name()
                ))
            })?;
            ordering.push(JointColumn {
                name: Arc::from(target.name()),
                variable: target.variable().id,
                position,
            });
        }
        ordering.sort_by_key(|column| column.position);

        let normalized = projected.normalized()?;

        let by_id: FxHashMap<VariableId, &QueryTarget<V>> = targets
            .iter()
            .map(|target| (target.variable().id, *target))
            .collect();
        let mut entries = Vec::with_capacity(normalized.entry_count());
        for (index, probability) in normalized.entries() {
            let mut tuple = Vec::with_capacity(index.len());
            for (axis, variable) in normalized.scope().iter().enumerate() {
                let target = by_id.get(&variable.id).ok_or_else(|| {
                    InferenceError::Internal(
                        "projected scope contains a variable that was never requested".into(),
                    )
                })?;
                let outcome = target.outcome(index[axis]).ok_or_else(|| {
                    InferenceError::Internal(format!(
                        "index {} is outside the domain of '{}'",
                        index[axis],
                        target.name()
                    ))
                })?;
                tuple.push(outcome.clone());
            }
            entries.push((probability, tuple));
        }

        Ok(JointDistribution { ordering, entries })
    }
}
