//! Engine configuration.
//!
//! Search bounds, tolerances and the working precision are carried by an
//! [`EngineConfig`] value handed to the [`Evaluator`](crate::Evaluator); there is
//! no process-wide state, so differently configured evaluators can coexist.

use crate::error::{MvpError, Result};

/// Working precision of the statistical layer.
///
/// Only the final scalar of every formula is narrowed to `f64` before it reaches
/// the minimizer or a result record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Precision {
    /// Plain IEEE-754 double precision
    Double,
    /// Double-double arithmetic, about 31 significant decimal digits
    #[default]
    DoubleDouble,
}

impl Precision {
    /// Largest extra-bits search cap the precision supports.
    ///
    /// Double precision stops resolving the `d`-dependence once `b^(-d) / (b - 1)`
    /// drops below its epsilon relative to one, which happens around `d = 22` for
    /// `b = 5` and `d = 50` for `b = 2`.
    pub const fn max_d_cap(self) -> u32 {
        match self {
            Precision::Double => 30,
            Precision::DoubleDouble => 100,
        }
    }

    /// Relative tolerance for successive tanh-sinh refinement levels
    pub(crate) const fn quadrature_tolerance(self) -> f64 {
        match self {
            Precision::Double => 1e-13,
            Precision::DoubleDouble => 1e-24,
        }
    }
}

/// Search bounds, tolerances and precision used by an evaluator.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Working precision of the formulas
    pub precision: Precision,
    /// Extra-bits search cap, overriding the family default when set
    pub d_max: Option<u32>,
    /// Bounds of the base search
    pub b_bounds: (f64, f64),
    /// Bounds of the shape search
    pub t_bounds: (f64, f64),
    /// Start of the joint base/shape search
    pub b_start: f64,
    /// Start of the joint base/shape search
    pub t_start: f64,
    /// Absolute tolerance of the scalar minimizer in the search variable
    pub xatol: f64,
    /// Function evaluation budget of the scalar minimizer
    pub max_iterations: u32,
    /// Simplex size at which the joint search stops
    pub simplex_xatol: f64,
    /// Spread of simplex values at which the joint search stops
    pub simplex_fatol: f64,
    /// Iteration budget of the joint search
    pub simplex_max_iterations: u32,
    /// Maximum number of step halvings in numerical integration
    pub quadrature_max_level: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            precision: Precision::default(),
            d_max: None,
            b_bounds: (1.0, 5.0),
            t_bounds: (1e-3, 5.0),
            b_start: 2.0,
            t_start: 1.0,
            xatol: 1e-12,
            max_iterations: 500,
            simplex_xatol: 1e-9,
            simplex_fatol: 1e-13,
            simplex_max_iterations: 4000,
            quadrature_max_level: 12,
        }
    }
}

impl EngineConfig {
    /// Set working precision
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Set extra-bits search cap for all families
    pub fn with_d_max(mut self, d_max: u32) -> Self {
        self.d_max = Some(d_max);
        self
    }

    /// Set base search bounds
    pub fn with_b_bounds(mut self, min: f64, max: f64) -> Self {
        self.b_bounds = (min, max);
        self
    }

    /// Set shape search bounds
    pub fn with_t_bounds(mut self, min: f64, max: f64) -> Self {
        self.t_bounds = (min, max);
        self
    }

    /// Set scalar minimizer tolerance
    pub fn with_xatol(mut self, xatol: f64) -> Self {
        self.xatol = xatol;
        self
    }

    /// Check that bounds are ordered, tolerances positive and the `d` cap
    /// supported by the working precision.
    pub fn validate(&self) -> Result<()> {
        if let Some(d_max) = self.d_max {
            if d_max > self.precision.max_d_cap() {
                return Err(MvpError::InvalidParameter {
                    name: "d_max",
                    value: f64::from(d_max),
                });
            }
        }
        let (b_min, b_max) = self.b_bounds;
        if !(b_min >= 1.0 && b_min < b_max && b_max.is_finite()) {
            return Err(MvpError::InvalidParameter {
                name: "b_bounds",
                value: b_min,
            });
        }
        let (t_min, t_max) = self.t_bounds;
        if !(t_min > 0.0 && t_min < t_max && t_max.is_finite()) {
            return Err(MvpError::InvalidParameter {
                name: "t_bounds",
                value: t_min,
            });
        }
        for (name, value) in [
            ("xatol", self.xatol),
            ("simplex_xatol", self.simplex_xatol),
            ("simplex_fatol", self.simplex_fatol),
        ] {
            if !(value > 0.0) {
                return Err(MvpError::InvalidParameter { name, value });
            }
        }
        if self.max_iterations == 0 || self.simplex_max_iterations == 0 {
            return Err(MvpError::InvalidParameter {
                name: "max_iterations",
                value: 0.0,
            });
        }
        Ok(())
    }
}
