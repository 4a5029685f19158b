//! Error types for Tabulon query execution.

use thiserror::Error;

/// Errors that can occur while materializing or querying solved factor sets.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in the future without breaking changes.
///
/// All public APIs return `Result<T, InferenceError>` to avoid panics in
/// library code. Every variant is unrecoverable at this layer: nothing is
/// retried or downgraded to a partial answer.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The queried variable's domain contains the unresolved member, so its
    /// probability mass cannot be point-determined.
    #[error("unresolved support: {0}")]
    UnresolvedSupport(String),

    /// More than one solution scenario is materialized, so no single point
    /// distribution exists.
    #[error("multiple solution scenarios: {0}")]
    MultipleScenarios(String),

    /// Normalization would divide by a total mass that is zero or not finite.
    #[error("zero-mass distribution: {0}")]
    ZeroMass(String),

    /// No completed solve is available to query yet.
    #[error("no solution available: {0}")]
    NoSolution(String),

    /// The requested variable is not covered by the configured targets or the
    /// solved factor set.
    #[error("unknown query target: {0}")]
    UnknownTarget(String),

    /// Malformed input (bad table shape, duplicate scope or domain members).
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal invariant breach (programmer error, not user error).
    #[error("internal error: {0}")]
    Internal(String),
}
