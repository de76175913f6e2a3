//! Numeric abstraction of the statistical layer.
//!
//! Formulas are written once against [`Real`] and instantiated for `f64` and for
//! [`DoubleDouble`](crate::double_double::DoubleDouble). The only narrowing back to
//! `f64` happens in [`Real::to_f64`], invoked where a formula hands its scalar to
//! the optimizer.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Real number type used inside the statistical formulas.
pub trait Real:
    Copy
    + Debug
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
    fn from_f64(x: f64) -> Self;

    /// Narrow to standard precision
    fn to_f64(self) -> f64;

    fn exp(self) -> Self;

    /// `e^x - 1`, accurate for small `|x|`
    fn exp_m1(self) -> Self;

    fn ln(self) -> Self;

    /// `ln(1 + x)`, accurate for small `|x|`
    fn ln_1p(self) -> Self;

    /// Natural logarithm of the gamma function for positive arguments
    fn ln_gamma(self) -> Self;

    /// `ln(2)`
    fn ln_2() -> Self;

    /// `2 * pi`
    fn two_pi() -> Self;

    fn abs(self) -> Self {
        if self < Self::zero() {
            -self
        } else {
            self
        }
    }

    #[inline]
    fn zero() -> Self {
        Self::from_f64(0.0)
    }

    #[inline]
    fn one() -> Self {
        Self::from_f64(1.0)
    }
}

impl Real for f64 {
    #[inline]
    fn from_f64(x: f64) -> Self {
        x
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn exp(self) -> Self {
        f64::exp(self)
    }

    #[inline]
    fn exp_m1(self) -> Self {
        f64::exp_m1(self)
    }

    #[inline]
    fn ln(self) -> Self {
        f64::ln(self)
    }

    #[inline]
    fn ln_1p(self) -> Self {
        f64::ln_1p(self)
    }

    #[inline]
    fn ln_gamma(self) -> Self {
        statrs::function::gamma::ln_gamma(self)
    }

    #[inline]
    fn ln_2() -> Self {
        std::f64::consts::LN_2
    }

    #[inline]
    fn two_pi() -> Self {
        std::f64::consts::TAU
    }

    #[inline]
    fn abs(self) -> Self {
        f64::abs(self)
    }
}

/// Evaluate an expression generic over [`Real`] at the requested [`Precision`].
///
/// The expression sees the selected type under the given alias:
/// `at_precision!(precision, R => gra::<R>(..).to_f64())`.
///
/// [`Precision`]: crate::config::Precision
macro_rules! at_precision {
    ($precision:expr, $r:ident => $body:expr) => {
        match $precision {
            $crate::config::Precision::Double => {
                type $r = f64;
                $body
            }
            $crate::config::Precision::DoubleDouble => {
                type $r = $crate::double_double::DoubleDouble;
                $body
            }
        }
    };
}

pub(crate) use at_precision;
