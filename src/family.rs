//! Estimator families evaluated by the engine.
//!
//! Every family implements [`VarianceModel`]; the closed set of families is the
//! [`Family`] enum, which dispatches statically through `enum_dispatch`.

use std::fmt;

use enum_dispatch::enum_dispatch;

use crate::config::EngineConfig;
use crate::error::{MvpError, Result};
use crate::optimizer::{Axis, Query};
use crate::variance;

/// Fully resolved parameter tuple of one evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// Register value width, present for query-time estimators
    pub q: Option<f64>,
    /// Extra bits
    pub d: u32,
    /// Register resolution base
    pub b: f64,
    /// Shape of the ratio-average estimators
    pub t: Option<f64>,
}

impl Point {
    pub fn new(q: Option<f64>, d: u32, b: f64, t: Option<f64>) -> Self {
        Self { q, d, b, t }
    }

    fn register_width(&self) -> Result<f64> {
        self.q.ok_or(MvpError::MissingParameter { name: "q" })
    }

    fn shape(&self) -> Result<f64> {
        self.t.ok_or(MvpError::MissingParameter { name: "t" })
    }
}

/// Estimator families supported by the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[enum_dispatch]
pub enum Family {
    LowerBound(LowerBound),
    Gra(Gra),
    Fgra(Fgra),
    Martingale(Martingale),
    CompressedLowerBound(CompressedLowerBound),
    CompressedMartingale(CompressedMartingale),
}

/// Variance model of one estimator family.
#[enum_dispatch(Family)]
pub trait VarianceModel {
    /// Human-readable family name used in errors and logs
    fn name(&self) -> &'static str;

    /// Whether the model depends on the shape parameter `t`
    fn uses_shape(&self) -> bool {
        false
    }

    /// Whether the model depends on the register value width `q`
    fn uses_register_width(&self) -> bool {
        true
    }

    /// Upper end of a free extra-bits search
    fn default_d_max(&self) -> u32 {
        30
    }

    /// Reject or narrow query axes the scheme cannot support.
    fn constrain(&self, query: &Query) -> Result<Query> {
        Ok(*query)
    }

    /// Unoptimized memory-variance product at a fully resolved point.
    fn mvp(&self, point: &Point, config: &EngineConfig) -> Result<f64>;
}

/// Maximum-likelihood estimation at the Fisher information bound
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LowerBound;

/// Generalized ratio-average estimator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Gra;

/// Fast generalized ratio-average estimator, defined for `b = 2` and `d = 2` only
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fgra;

/// Martingale (online) estimator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Martingale;

/// Maximum-likelihood estimation with entropy-optimal compression of the registers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompressedLowerBound;

/// Martingale estimator with entropy-optimal compression of the registers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompressedMartingale;

impl VarianceModel for LowerBound {
    fn name(&self) -> &'static str {
        "lower bound"
    }

    fn mvp(&self, point: &Point, config: &EngineConfig) -> Result<f64> {
        variance::lower_bound(point.register_width()?, point.d, point.b, config)
    }
}

impl VarianceModel for Gra {
    fn name(&self) -> &'static str {
        "GRA"
    }

    fn uses_shape(&self) -> bool {
        true
    }

    fn default_d_max(&self) -> u32 {
        20
    }

    fn mvp(&self, point: &Point, config: &EngineConfig) -> Result<f64> {
        let q = point.register_width()?;
        variance::gra(q, point.d, point.b, point.shape()?, config)
    }
}

/// Extra bits the fast estimator is defined for
const FGRA_EXTRA_BITS: u32 = 2;
/// Register base the fast estimator is defined for
const FGRA_BASE: f64 = 2.0;

impl VarianceModel for Fgra {
    fn name(&self) -> &'static str {
        "FGRA"
    }

    fn uses_shape(&self) -> bool {
        true
    }

    fn default_d_max(&self) -> u32 {
        FGRA_EXTRA_BITS
    }

    fn constrain(&self, query: &Query) -> Result<Query> {
        let d = match query.d {
            Axis::Free | Axis::Fixed(FGRA_EXTRA_BITS) => Axis::Fixed(FGRA_EXTRA_BITS),
            Axis::Search { min, max } if min <= FGRA_EXTRA_BITS && FGRA_EXTRA_BITS <= max => {
                Axis::Fixed(FGRA_EXTRA_BITS)
            }
            _ => return Err(self.violation("requires exactly 2 extra bits")),
        };
        let b = match query.b {
            Axis::Free => Axis::Fixed(FGRA_BASE),
            Axis::Fixed(b) if b == FGRA_BASE => Axis::Fixed(FGRA_BASE),
            _ => return Err(self.violation("requires base 2")),
        };
        Ok(Query { d, b, ..*query })
    }

    fn mvp(&self, point: &Point, config: &EngineConfig) -> Result<f64> {
        if point.d != FGRA_EXTRA_BITS {
            return Err(self.violation("requires exactly 2 extra bits"));
        }
        if point.b != FGRA_BASE {
            return Err(self.violation("requires base 2"));
        }
        variance::fgra(point.register_width()?, point.b, point.shape()?, config)
    }
}

impl Fgra {
    fn violation(&self, detail: &'static str) -> MvpError {
        MvpError::SchemeConstraint {
            family: self.name(),
            detail,
        }
    }
}

impl VarianceModel for Martingale {
    fn name(&self) -> &'static str {
        "martingale"
    }

    fn mvp(&self, point: &Point, config: &EngineConfig) -> Result<f64> {
        variance::martingale(point.register_width()?, point.d, point.b, config)
    }
}

impl VarianceModel for CompressedLowerBound {
    fn name(&self) -> &'static str {
        "compressed lower bound"
    }

    fn uses_register_width(&self) -> bool {
        false
    }

    fn mvp(&self, point: &Point, config: &EngineConfig) -> Result<f64> {
        variance::lower_bound_compressed(point.d, point.b, config)
    }
}

impl VarianceModel for CompressedMartingale {
    fn name(&self) -> &'static str {
        "compressed martingale"
    }

    fn uses_register_width(&self) -> bool {
        false
    }

    fn mvp(&self, point: &Point, config: &EngineConfig) -> Result<f64> {
        variance::martingale_compressed(point.d, point.b, config)
    }
}

impl Family {
    pub const LOWER_BOUND: Family = Family::LowerBound(LowerBound);
    pub const GRA: Family = Family::Gra(Gra);
    pub const FGRA: Family = Family::Fgra(Fgra);
    pub const MARTINGALE: Family = Family::Martingale(Martingale);
    pub const COMPRESSED_LOWER_BOUND: Family = Family::CompressedLowerBound(CompressedLowerBound);
    pub const COMPRESSED_MARTINGALE: Family = Family::CompressedMartingale(CompressedMartingale);

    /// All families in reporting order
    pub const ALL: [Family; 6] = [
        Family::LOWER_BOUND,
        Family::COMPRESSED_LOWER_BOUND,
        Family::GRA,
        Family::FGRA,
        Family::MARTINGALE,
        Family::COMPRESSED_MARTINGALE,
    ];
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
