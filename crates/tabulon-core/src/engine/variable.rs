//! Query variables and their value domains.
//!
//! A [`Variable`] is the lightweight handle weight tables are indexed by:
//! an identifier plus a domain cardinality. A [`QueryTarget`] additionally
//! carries a display name and the ordered domain of concrete values, so
//! index tuples can be translated back to values at the query boundary.
//! The engine itself only ever manipulates index tuples.

use std::sync::Arc;

use crate::engine::errors::InferenceError;

/// A unique identifier for a random variable.
///
/// VariableId implements Ord/PartialOrd for stable, deterministic iteration.
/// Uses u32 internally for efficient storage and indexing.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableId(pub u32);

/// A variable handle as seen by the weight-table algebra: identity plus the
/// size of its value domain. Cheap to copy; the concrete domain values live
/// on the owning [`QueryTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    /// The unique variable identifier
    pub id: VariableId,
    /// Number of members in the variable's domain
    pub cardinality: usize,
}

impl Variable {
    /// Creates a new variable handle.
    pub fn new(id: VariableId, cardinality: usize) -> Self {
        Self { id, cardinality }
    }
}

/// One member of a variable's domain.
///
/// `Unresolved` is the sentinel standing for outcomes collapsed by upstream
/// pruning; a domain containing it cannot back a point distribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Outcome<V> {
    /// A concrete, fully known domain value
    Value(V),
    /// Support collapsed during solving; the concrete value is not known
    Unresolved,
}

impl<V> Outcome<V> {
    /// Returns `true` if this member is the unresolved sentinel.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Outcome::Unresolved)
    }

    /// Returns the concrete value, if this member is resolved.
    pub fn value(&self) -> Option<&V> {
        match self {
            Outcome::Value(v) => Some(v),
            Outcome::Unresolved => None,
        }
    }
}

/// A variable the algorithm was configured to answer queries about.
///
/// Holds the ordered, duplicate-free domain used to translate table index
/// tuples into concrete values. The domain is fixed at construction; its
/// length is the variable's cardinality.
#[derive(Debug, Clone)]
pub struct QueryTarget<V> {
    variable: Variable,
    /// Using Arc<str> for cheap cloning (reference count increment, not allocation)
    name: Arc<str>,
    domain: Vec<Outcome<V>>,
}

impl<V: Clone + PartialEq> QueryTarget<V> {
    /// Creates a query target from a name, a variable id, and its domain.
    ///
    /// The domain must be non-empty and duplicate-free; its order defines the
    /// index layout of every table over this variable.
    pub fn new(
        name: impl Into<Arc<str>>,
        id: VariableId,
        domain: Vec<Outcome<V>>,
    ) -> Result<Self, InferenceError> {
        let name = name.into();
        if domain.is_empty() {
            return Err(InferenceError::Validation(format!(
                "domain of '{}' must not be empty",
                name
            )));
        }
        for (i, member) in domain.iter().enumerate() {
            if domain[..i].contains(member) {
                return Err(InferenceError::Validation(format!(
                    "domain of '{}' contains a duplicate member at index {}",
                    name, i
                )));
            }
        }
        let variable = Variable::new(id, domain.len());
        Ok(Self {
            variable,
            name,
            domain,
        })
    }

    /// The handle used to key weight tables over this variable.
    pub fn variable(&self) -> Variable {
        self.variable
    }

    /// The target's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered domain backing index translation.
    pub fn domain(&self) -> &[Outcome<V>] {
        &self.domain
    }

    /// Translates a table index for this variable into its domain member.
    pub fn outcome(&self, index: usize) -> Option<&Outcome<V>> {
        self.domain.get(index)
    }

    /// Returns `true` if the domain contains the unresolved sentinel.
    pub fn has_unresolved(&self) -> bool {
        self.domain.iter().any(Outcome::is_unresolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_cardinality_matches_domain_length() {
        let target = QueryTarget::new(
            "coin",
            VariableId(7),
            vec![Outcome::Value("heads"), Outcome::Value("tails")],
        )
        .unwrap();
        assert_eq!(target.variable().cardinality, 2);
        assert_eq!(target.outcome(1), Some(&Outcome::Value("tails")));
        assert!(!target.has_unresolved());
    }

    #[test]
    fn duplicate_domain_member_is_rejected() {
        let result = QueryTarget::new(
            "d",
            VariableId(1),
            vec![Outcome::Value(3u32), Outcome::Value(3u32)],
        );
        assert!(matches!(result, Err(InferenceError::Validation(_))));
    }

    #[test]
    fn empty_domain_is_rejected() {
        let result = QueryTarget::<u32>::new("empty", VariableId(1), vec![]);
        assert!(matches!(result, Err(InferenceError::Validation(_))));
    }

    #[test]
    fn unresolved_member_is_detected() {
        let target = QueryTarget::new(
            "pruned",
            VariableId(2),
            vec![Outcome::Value(0u32), Outcome::Value(1), Outcome::Unresolved],
        )
        .unwrap();
        assert!(target.has_unresolved());
        assert_eq!(target.variable().cardinality, 3);
    }
}
