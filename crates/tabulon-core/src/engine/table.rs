//! Dense weight tables over tuples of discrete variables.
//!
//! A [`WeightTable`] is a non-negative real-valued function over the
//! Cartesian product of its scope variables' domains, stored as a dense
//! `ndarray` array in row-major entry order. The operations here are the
//! classic table-factor algebra:
//!
//! - **combine**: pointwise product over the union of two scopes
//! - **project**: sum-marginalize onto a subset of the scope
//! - **fold / map**: associative reduction and elementwise transform
//! - **entries**: stable enumeration of the full index space
//!
//! The table with empty scope and single weight 1.0 is the multiplicative
//! identity under `combine`; folding a factor set seeded with it yields the
//! joint table of the set.

use itertools::Itertools;
use ndarray::{ArrayD, Axis, Dimension, IxDyn};
use smallvec::SmallVec;

use crate::engine::errors::InferenceError;
use crate::engine::variable::{Variable, VariableId};

/// A weight table over an ordered, duplicate-free tuple of variables.
///
/// The scope order defines the axis layout of the underlying array. Combine
/// and project preserve existing scope order rather than adopting any
/// caller-supplied order, so the table's own ordering is the only authority
/// on what an index tuple's positions mean.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    scope: SmallVec<[Variable; 4]>,
    weights: ArrayD<f64>,
}

impl WeightTable {
    /// The multiplicative identity: empty scope, one entry holding 1.0.
    pub fn identity() -> Self {
        Self {
            scope: SmallVec::new(),
            weights: ArrayD::from_elem(IxDyn(&[]), 1.0),
        }
    }

    /// Creates a table from a scope and a matching weight array.
    ///
    /// Validates that the scope has no duplicate variables, that the array
    /// shape matches the scope cardinalities, and that every weight is
    /// finite and non-negative.
    pub fn new(scope: Vec<Variable>, weights: ArrayD<f64>) -> Result<Self, InferenceError> {
        for (i, v) in scope.iter().enumerate() {
            if scope[..i].iter().any(|u| u.id == v.id) {
                return Err(InferenceError::Validation(format!(
                    "duplicate variable {:?} in table scope",
                    v.id
                )));
            }
        }
        if weights.ndim() != scope.len() {
            return Err(InferenceError::Validation(format!(
                "table has {} axes for a scope of {} variables",
                weights.ndim(),
                scope.len()
            )));
        }
        for (v, &len) in scope.iter().zip(weights.shape()) {
            if v.cardinality != len {
                return Err(InferenceError::Validation(format!(
                    "axis for variable {:?} has length {} but the variable's cardinality is {}",
                    v.id, len, v.cardinality
                )));
            }
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(InferenceError::Validation(
                "table weights must be finite and non-negative".into(),
            ));
        }
        Ok(Self {
            scope: SmallVec::from_vec(scope),
            weights,
        })
    }

    /// Creates a table from a scope and row-major weights, deriving the
    /// array shape from the scope cardinalities.
    pub fn from_weights(scope: Vec<Variable>, weights: Vec<f64>) -> Result<Self, InferenceError> {
        let shape: Vec<usize> = scope.iter().map(|v| v.cardinality).collect();
        let weights = ArrayD::from_shape_vec(IxDyn(&shape), weights).map_err(|e| {
            InferenceError::Validation(format!("weight vector does not match scope shape: {e}"))
        })?;
        Self::new(scope, weights)
    }

    /// The table's own variable ordering.
    pub fn scope(&self) -> &[Variable] {
        &self.scope
    }

    /// Returns `true` if this is the empty-scope identity-shaped table.
    pub fn is_scalar(&self) -> bool {
        self.scope.is_empty()
    }

    /// Number of entries in the table's full index space.
    pub fn entry_count(&self) -> usize {
        self.weights.len()
    }

    /// Position of a variable within the table's own ordering.
    pub fn position_of(&self, id: VariableId) -> Option<usize> {
        self.scope.iter().position(|v| v.id == id)
    }

    /// The weight at a full index tuple.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not match the table's shape.
    pub fn weight(&self, index: &[usize]) -> f64 {
        self.weights[IxDyn(index)]
    }

    /// Pointwise product over the union of the two scopes.
    ///
    /// Self's variables keep their positions and order; the other table's
    /// variables not already present are appended in its order. Disjoint
    /// scopes produce an outer product. A variable shared by both scopes
    /// must agree on cardinality; constructed tables cannot disagree.
    pub fn combine(&self, other: &WeightTable) -> WeightTable {
        let scope: SmallVec<[Variable; 4]> = self
            .scope
            .iter()
            .chain(other.scope.iter())
            .copied()
            .unique_by(|v| v.id)
            .collect();
        debug_assert!(
            other
                .scope
                .iter()
                .all(|v| scope.iter().any(|u| u.id == v.id && u.cardinality == v.cardinality)),
            "shared variables must agree on cardinality"
        );

        // Self occupies the leading positions of the union, so its index
        // tuple is a prefix of the result index. The other table's axes are
        // gathered through an explicit position map.
        let left_len = self.scope.len();
        let right: SmallVec<[usize; 4]> = other
            .scope
            .iter()
            .map(|v| {
                scope
                    .iter()
                    .position(|u| u.id == v.id)
                    .expect("scope union covers both operands")
            })
            .collect();

        let shape: Vec<usize> = scope.iter().map(|v| v.cardinality).collect();
        let mut weights = ArrayD::zeros(IxDyn(&shape));
        for (index, w) in weights.indexed_iter_mut() {
            let index = index.slice();
            let right_index: SmallVec<[usize; 4]> = right.iter().map(|&p| index[p]).collect();
            *w = self.weights[IxDyn(&index[..left_len])] * other.weights[IxDyn(&right_index)];
        }
        WeightTable { scope, weights }
    }

    /// Folds a factor set into its joint table, seeded with the identity.
    ///
    /// An empty set yields the identity itself. The product is commutative
    /// up to scope order, so the joint's weights do not depend on iteration
    /// order; its scope order follows first occurrence.
    pub fn combine_all<'a, I>(factors: I) -> WeightTable
    where
        I: IntoIterator<Item = &'a WeightTable>,
    {
        factors
            .into_iter()
            .fold(WeightTable::identity(), |joint, factor| joint.combine(factor))
    }

    /// Sum-marginalizes onto the listed variables.
    ///
    /// Every scope variable whose id is not in `keep` is summed out. The
    /// retained variables keep the table's own order, not the order of
    /// `keep`. Ids in `keep` that are not in the scope are ignored.
    pub fn project(&self, keep: &[VariableId]) -> WeightTable {
        let mut weights = self.weights.clone();
        // Sum out from the highest axis down so lower axis numbers stay valid.
        for (axis, var) in self.scope.iter().enumerate().rev() {
            if !keep.contains(&var.id) {
                weights = weights.sum_axis(Axis(axis));
            }
        }
        let scope: SmallVec<[Variable; 4]> = self
            .scope
            .iter()
            .filter(|v| keep.contains(&v.id))
            .copied()
            .collect();
        WeightTable { scope, weights }
    }

    /// Associative reduction over all entries.
    pub fn fold<F>(&self, seed: f64, op: F) -> f64
    where
        F: Fn(f64, f64) -> f64,
    {
        self.weights.iter().fold(seed, |acc, &w| op(acc, w))
    }

    /// Elementwise transform.
    pub fn map<F>(&self, f: F) -> WeightTable
    where
        F: Fn(f64) -> f64,
    {
        WeightTable {
            scope: self.scope.clone(),
            weights: self.weights.mapv(f),
        }
    }

    /// Total mass: the fold-sum of all weights.
    pub fn total_mass(&self) -> f64 {
        self.fold(0.0, |acc, w| acc + w)
    }

    /// Divides every weight by the total mass.
    ///
    /// A total mass that is zero or not finite cannot normalize anything
    /// and is reported explicitly rather than propagated as NaN.
    pub fn normalized(&self) -> Result<WeightTable, InferenceError> {
        let total = self.total_mass();
        if !(total.is_finite() && total > 0.0) {
            return Err(InferenceError::ZeroMass(format!(
                "cannot normalize a table with total mass {total}"
            )));
        }
        Ok(self.map(|w| w / total))
    }

    /// Enumerates the full index space as `(index tuple, weight)` pairs.
    ///
    /// Order is the array's native row-major order and is stable across
    /// repeated calls. The identity table yields exactly one entry with an
    /// empty tuple.
    pub fn entries(&self) -> impl Iterator<Item = (Vec<usize>, f64)> + '_ {
        self.weights
            .indexed_iter()
            .map(|(index, &w)| (index.slice().to_vec(), w))
    }
}
