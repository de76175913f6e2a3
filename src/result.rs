//! Resolved evaluation result.

use std::fmt;

use crate::config::EngineConfig;
use crate::error::{MvpError, Result};
use crate::family::Point;
use crate::variance;

/// Memory-variance product at a fully resolved parameter tuple.
///
/// Results are immutable once created and always hold a positive finite `mvp`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MvpResult {
    point: Point,
    mvp: f64,
}

impl MvpResult {
    /// Creates a result, rejecting records that violate the result invariants.
    pub fn try_new(point: Point, mvp: f64) -> Result<Self> {
        if !(mvp.is_finite() && mvp > 0.0) {
            return Err(MvpError::InvalidResult("mvp must be positive and finite"));
        }
        if !point.b.is_finite() {
            return Err(MvpError::InvalidResult("b must be finite"));
        }
        if point.q.is_some_and(|q| !(q.is_finite() && q >= 0.0)) {
            return Err(MvpError::InvalidResult("q must be non-negative and finite"));
        }
        if point.t.is_some_and(|t| !(t.is_finite() && t >= 0.0)) {
            return Err(MvpError::InvalidResult("t must be non-negative and finite"));
        }
        Ok(Self { point, mvp })
    }

    #[inline]
    pub fn point(&self) -> &Point {
        &self.point
    }

    #[inline]
    pub fn q(&self) -> Option<f64> {
        self.point.q
    }

    #[inline]
    pub fn d(&self) -> u32 {
        self.point.d
    }

    #[inline]
    pub fn b(&self) -> f64 {
        self.point.b
    }

    #[inline]
    pub fn t(&self) -> Option<f64> {
        self.point.t
    }

    #[inline]
    pub fn mvp(&self) -> f64 {
        self.mvp
    }

    /// Relative variance per register bit `mvp / (q + d)`, if `q` is known.
    #[inline]
    pub fn variance_factor(&self) -> Option<f64> {
        self.point
            .q
            .map(|q| self.mvp / (q + f64::from(self.point.d)))
    }

    /// Efficiency relative to the Fisher information bound at the same `(q, d, b)`.
    ///
    /// A value of one means the estimator attains the bound.
    pub fn efficiency(&self, config: &EngineConfig) -> Result<f64> {
        let q = self
            .point
            .q
            .ok_or(MvpError::MissingParameter { name: "q" })?;
        Ok(variance::lower_bound(q, self.point.d, self.point.b, config)? / self.mvp)
    }
}

impl fmt::Display for MvpResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.point.q {
            Some(q) => write!(f, "q = {q}")?,
            None => f.write_str("q = -")?,
        }
        write!(f, ", d = {}, b = {}", self.point.d, self.point.b)?;
        if let Some(t) = self.point.t {
            write!(f, ", t = {t}")?;
        }
        write!(f, ", mvp = {}", self.mvp)
    }
}
