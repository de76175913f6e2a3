//! `mvp-engine` is a Rust crate for evaluating and optimizing the memory-variance product (MVP) of probabilistic cardinality estimation sketches.
//!
//! The MVP of a sketch is its memory in bits times the asymptotic relative variance of its estimator, so lower is better.
//! This library computes it for several estimator families as a function of the register base `b`, the number of extra bits `d`
//! and, for ratio-average estimators, a shape parameter `t`. Parameters left free are resolved to the optimum by discrete and
//! bounded continuous search.
//!
//! ```
//! use mvp_engine::{Evaluator, Family, Query};
//!
//! let evaluator = Evaluator::default();
//! let result = evaluator.evaluate(Family::MARTINGALE, &Query::new().q(6.0).d(0).b(2.0)).unwrap();
//! assert!((result.mvp() - 6.0 * std::f64::consts::LN_2).abs() < 1e-12);
//! ```
pub mod coefficients;
pub mod config;
mod double_double;
pub mod error;
pub mod family;
pub mod information;
pub mod minimize;
pub mod optimizer;
pub mod partition;
pub mod quadrature;
pub mod real;
pub mod result;
#[cfg(feature = "with_serde")]
mod serde;
pub mod special;
pub mod variance;

pub use crate::config::{EngineConfig, Precision};
pub use crate::double_double::DoubleDouble;
pub use crate::error::{CandidateFailure, MvpError, Result};
pub use crate::family::{Family, Point, VarianceModel};
pub use crate::optimizer::{Axis, DSearch, Evaluator, Query};
pub use crate::result::MvpResult;
