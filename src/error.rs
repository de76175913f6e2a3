//! Error types shared by the statistical layer and the parameter optimizer.
//!
//! Every failure is local to the parameter tuple being evaluated: callers get a
//! value of [`MvpError`] back instead of a degraded MVP, and a discrete search
//! over extra bits keeps going when a single candidate fails.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, MvpError>;

/// Failure of a single extra-bits candidate during a discrete search.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateFailure {
    /// Extra bits of the failing candidate
    pub d: u32,
    /// Reason the candidate could not be evaluated
    pub error: MvpError,
}

/// Errors raised while evaluating or optimizing the memory-variance product.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum MvpError {
    /// A partition probability came out negative: invalid `(b, t)` or precision loss.
    #[error("partition probability omega{index} is negative ({value:e}) at b = {b}, t = {t}")]
    NegativeProbability {
        index: usize,
        b: f64,
        t: f64,
        value: f64,
    },

    /// A variance formula produced a value that is not a positive finite number.
    #[error("{family} produced an invalid memory-variance product ({value})")]
    InvalidMvp { family: &'static str, value: f64 },

    /// The bounded minimizer ran out of iterations.
    #[error("{method} did not converge within {iterations} iterations")]
    NonConvergence {
        method: &'static str,
        iterations: u32,
    },

    /// Numerical integration did not reach the requested tolerance.
    #[error("numerical integration did not converge after {levels} refinement levels")]
    QuadratureNonConvergence { levels: u32 },

    /// The estimator family only supports a restricted parameter set.
    #[error("{family} scheme constraint violated: {detail}")]
    SchemeConstraint {
        family: &'static str,
        detail: &'static str,
    },

    /// A parameter or configuration value is outside its domain.
    #[error("invalid parameter {name} = {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// A parameter the family depends on was not supplied.
    #[error("missing parameter {name}")]
    MissingParameter { name: &'static str },

    /// Every candidate of a discrete extra-bits search failed.
    #[error("all {count} extra-bit candidates failed", count = .failures.len())]
    NoFeasibleCandidate { failures: Vec<CandidateFailure> },

    /// The coefficient vector would not fit into memory.
    #[error("{d} extra bits need 2^{d} coefficients, at most 2^{max} are supported")]
    TooManyCoefficients { d: u32, max: u32 },

    /// A deserialized record violates the result invariants.
    #[error("invalid result record: {0}")]
    InvalidResult(&'static str),
}
