//! Double-double arithmetic.
//!
//! A value is the unevaluated sum `hi + lo` of two `f64` with `|lo| <= ulp(hi) / 2`,
//! which gives roughly 106 significand bits (about 31 decimal digits). This is
//! enough headroom for the cancellations in the partition probabilities, the
//! gamma ratios of the ratio-average estimators and the entropy quadrature.
//!
//! Algorithms follow the classic error-free transformations:
//! - `two_sum` / `quick_two_sum` for addition,
//! - `two_prod` via fused multiply-add for multiplication,
//! - argument reduction by `ln 2` plus squaring for `exp`,
//! - one Newton step on `exp` for `ln`.
//!
//! Non-finite values are carried in `hi` with `lo = 0`.

use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::real::Real;
use crate::special::stirling_ln_gamma;

/// Number of squarings after the Taylor step in `exp`
const EXP_SQUARINGS: i32 = 9;

#[derive(Clone, Copy, Default, PartialEq)]
pub struct DoubleDouble {
    hi: f64,
    lo: f64,
}

impl DoubleDouble {
    pub const ZERO: Self = Self::new(0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 0.0);
    pub const LN_2: Self = Self::new(6.931471805599453e-1, 2.3190468138462996e-17);
    pub const TWO_PI: Self = Self::new(6.283185307179586, 2.4492935982947064e-16);
    pub const INFINITY: Self = Self::new(f64::INFINITY, 0.0);
    pub const NAN: Self = Self::new(f64::NAN, 0.0);

    const fn new(hi: f64, lo: f64) -> Self {
        Self { hi, lo }
    }

    /// Leading component
    #[inline]
    pub fn hi(self) -> f64 {
        self.hi
    }

    /// Trailing component
    #[inline]
    pub fn lo(self) -> f64 {
        self.lo
    }

    /// Renormalize `hi + lo`, keeping non-finite values in `hi`
    #[inline]
    fn renormalize(hi: f64, lo: f64) -> Self {
        if hi.is_finite() {
            let (hi, lo) = quick_two_sum(hi, lo);
            Self { hi, lo }
        } else {
            Self { hi, lo: 0.0 }
        }
    }

    /// Multiply by a power of two, exact barring overflow and underflow
    #[inline]
    fn scale(self, factor: f64) -> Self {
        Self::renormalize(self.hi * factor, self.lo * factor)
    }

    /// Quotient by a small integer
    #[inline]
    fn div_int(self, n: u32) -> Self {
        self / Self::from(f64::from(n))
    }

    /// `e^x - 1` for `|x| < 1` from its Taylor series
    fn exp_m1_series(self) -> Self {
        let mut sum = self;
        let mut term = self;
        for n in 2..64 {
            term = term * self;
            term = term.div_int(n);
            sum += term;
            if term.hi.abs() <= 1e-34 * sum.hi.abs() {
                break;
            }
        }
        sum
    }
}

/// `a + b` as a value and its rounding error
#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bb = s - a;
    let err = (a - (s - bb)) + (b - bb);
    (s, err)
}

/// `a + b` as a value and its rounding error, requires `|a| >= |b|`
#[inline]
fn quick_two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let err = b - (s - a);
    (s, err)
}

/// `a * b` as a value and its rounding error
#[inline]
fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    let err = a.mul_add(b, -p);
    (p, err)
}

impl From<f64> for DoubleDouble {
    #[inline]
    fn from(x: f64) -> Self {
        Self { hi: x, lo: 0.0 }
    }
}

impl Add for DoubleDouble {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let (s1, s2) = two_sum(self.hi, rhs.hi);
        if !s1.is_finite() {
            return Self::from(s1);
        }
        let (t1, t2) = two_sum(self.lo, rhs.lo);
        let (s1, s2) = quick_two_sum(s1, s2 + t1);
        Self::renormalize(s1, s2 + t2)
    }
}

impl Sub for DoubleDouble {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Mul for DoubleDouble {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let (p1, p2) = two_prod(self.hi, rhs.hi);
        if !p1.is_finite() {
            return Self::from(p1);
        }
        let p2 = p2 + (self.hi * rhs.lo + self.lo * rhs.hi);
        Self::renormalize(p1, p2)
    }
}

impl Div for DoubleDouble {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        let q1 = self.hi / rhs.hi;
        if !q1.is_finite() || q1 == 0.0 {
            return Self::from(q1);
        }
        let r = self - rhs * Self::from(q1);
        let q2 = r.hi / rhs.hi;
        let r = r - rhs * Self::from(q2);
        let q3 = r.hi / rhs.hi;
        let (q1, q2) = quick_two_sum(q1, q2);
        Self { hi: q1, lo: q2 } + Self::from(q3)
    }
}

impl Neg for DoubleDouble {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl AddAssign for DoubleDouble {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for DoubleDouble {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for DoubleDouble {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl DivAssign for DoubleDouble {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl PartialOrd for DoubleDouble {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.hi.partial_cmp(&other.hi)? {
            Ordering::Equal => self.lo.partial_cmp(&other.lo),
            ordering => Some(ordering),
        }
    }
}

impl Debug for DoubleDouble {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "DoubleDouble({:e} + {:e})", self.hi, self.lo)
    }
}

impl Display for DoubleDouble {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.to_f64(), f)
    }
}

impl Real for DoubleDouble {
    #[inline]
    fn from_f64(x: f64) -> Self {
        Self::from(x)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        if self.hi.is_finite() {
            self.hi + self.lo
        } else {
            self.hi
        }
    }

    fn exp(self) -> Self {
        if self.hi.is_nan() {
            return Self::NAN;
        }
        if self.hi > 709.7 {
            return Self::INFINITY;
        }
        if self.hi < -745.0 {
            return Self::ZERO;
        }
        if self.hi == 0.0 {
            return Self::ONE;
        }

        // x = k ln 2 + r with |r| <= ln(2) / 2, then e^r = (e^(r / 512))^512
        let k = (self.hi / Self::LN_2.hi).round();
        let r = self - Self::LN_2 * Self::from(k);
        let r = r.scale(f64::powi(2.0, -EXP_SQUARINGS));

        // (1 + s)^2 - 1 = 2s + s^2 keeps the small part separate
        let mut s = r.exp_m1_series();
        for _ in 0..EXP_SQUARINGS {
            s = s.scale(2.0) + s * s;
        }
        // k is at most 1024 in magnitude, split to keep the factor finite
        let k = k as i32;
        let half = k / 2;
        (s + Self::ONE)
            .scale(f64::powi(2.0, half))
            .scale(f64::powi(2.0, k - half))
    }

    fn exp_m1(self) -> Self {
        if self.hi.abs() < 0.5 {
            self.exp_m1_series()
        } else {
            self.exp() - Self::ONE
        }
    }

    fn ln(self) -> Self {
        if self.hi.is_nan() || self.hi < 0.0 {
            return Self::NAN;
        }
        if self.hi == 0.0 {
            return -Self::INFINITY;
        }
        if self.hi.is_infinite() {
            return Self::INFINITY;
        }
        // Newton step on exp(x) = a from the double precision estimate
        let x = Self::from(self.hi.ln());
        x + self * (-x).exp() - Self::ONE
    }

    fn ln_1p(self) -> Self {
        if self.hi.abs() >= 0.25 {
            return (Self::ONE + self).ln();
        }
        // ln(1 + x) = 2 atanh(x / (2 + x))
        let u = self / (Self::from(2.0) + self);
        let u2 = u * u;
        let mut power = u;
        let mut sum = u;
        for n in (3..200).step_by(2) {
            power *= u2;
            let term = power.div_int(n);
            sum += term;
            if term.hi.abs() <= 1e-34 * sum.hi.abs() {
                break;
            }
        }
        sum.scale(2.0)
    }

    fn ln_gamma(self) -> Self {
        stirling_ln_gamma(self)
    }

    #[inline]
    fn ln_2() -> Self {
        Self::LN_2
    }

    #[inline]
    fn two_pi() -> Self {
        Self::TWO_PI
    }

    #[inline]
    fn abs(self) -> Self {
        if self.hi < 0.0 {
            -self
        } else {
            self
        }
    }
}
