//! Partition probabilities of the fast generalized ratio-average estimator.
//!
//! The four probabilities `omega0 .. omega3` cover mutually exclusive register
//! configurations and satisfy `omega0 + omega1 + omega2 + omega3 = 1 - b^(-t)`.
//! Each is a difference of two nearly equal powers. Every such difference has a
//! gap of exactly `b - 1` between the bases, so it is evaluated as
//! `x^(-t) - (x + g)^(-t) = (x + g)^(-t) * expm1(t * ln1p(g / x))`
//! without subtracting the powers themselves.

use crate::config::Precision;
use crate::error::{MvpError, Result};
use crate::real::{at_precision, Real};

/// `x^(-t) - (x + gap)^(-t)` for `x > 0`, `gap >= 0`
#[inline]
fn power_gap<R: Real>(x: R, gap: R, t: R) -> R {
    let upper = x + gap;
    (-t * upper.ln()).exp() * (t * (gap / x).ln_1p()).exp_m1()
}

/// `1 - b^(-t)`, the total mass of the four partitions
#[inline]
pub fn partition_total<R: Real>(b: R, t: R) -> R {
    -(-t * b.ln()).exp_m1()
}

#[inline]
fn checked<R: Real>(index: usize, b: R, t: R, value: R) -> Result<R> {
    if value >= R::zero() {
        Ok(value)
    } else {
        Err(MvpError::NegativeProbability {
            index,
            b: b.to_f64(),
            t: t.to_f64(),
            value: value.to_f64(),
        })
    }
}

/// `omega0 = (b^3 - b + 1)^(-t) - b^(-3t)`
pub fn omega0<R: Real>(b: R, t: R) -> Result<R> {
    let gap = b - R::one();
    checked(0, b, t, power_gap(b * b * b - gap, gap, t))
}

/// `omega1 = (b^2 - b + 1)^(-t) - b^(-2t) - omega0`
pub fn omega1<R: Real>(b: R, t: R) -> Result<R> {
    let w0 = omega0(b, t)?;
    omega1_from(b, t, w0)
}

/// `omega2 = (b^3 - b^2 + 1)^(-t) - (b^3 - b^2 + b)^(-t) - omega0`
pub fn omega2<R: Real>(b: R, t: R) -> Result<R> {
    let w0 = omega0(b, t)?;
    omega2_from(b, t, w0)
}

/// `omega3 = 1 - b^(-t) - omega0 - omega1 - omega2`
pub fn omega3<R: Real>(b: R, t: R) -> Result<R> {
    Ok(Partition::new(b, t)?.omega()[3])
}

fn omega1_from<R: Real>(b: R, t: R, w0: R) -> Result<R> {
    let gap = b - R::one();
    checked(1, b, t, power_gap(b * b - gap, gap, t) - w0)
}

fn omega2_from<R: Real>(b: R, t: R, w0: R) -> Result<R> {
    let gap = b - R::one();
    checked(2, b, t, power_gap(b * b * b - b * b + R::one(), gap, t) - w0)
}

/// All four partition probabilities at one `(b, t)`, each checked to be non-negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Partition<R> {
    omega: [R; 4],
}

impl<R: Real> Partition<R> {
    /// Evaluate `omega0 .. omega3`, failing on the first negative term.
    pub fn new(b: R, t: R) -> Result<Self> {
        let w0 = omega0(b, t)?;
        let w1 = omega1_from(b, t, w0)?;
        let w2 = omega2_from(b, t, w0)?;
        let w3 = checked(3, b, t, partition_total(b, t) - w0 - w1 - w2)?;
        Ok(Self {
            omega: [w0, w1, w2, w3],
        })
    }

    #[inline]
    pub fn omega(&self) -> [R; 4] {
        self.omega
    }

    /// Sum of the four probabilities
    #[inline]
    pub fn total(&self) -> R {
        self.omega.iter().fold(R::zero(), |acc, &w| acc + w)
    }

    /// Per-partition ratios `omega_i(t) / omega_i(2t)` against the partition at `2t`
    pub fn ratios(&self, doubled: &Partition<R>) -> [R; 4] {
        let mut ratios = self.omega;
        for (ratio, &w) in ratios.iter_mut().zip(doubled.omega.iter()) {
            *ratio /= w;
        }
        ratios
    }

    /// `sum_i omega_i(t)^2 / omega_i(2t)` against the partition at `2t`
    pub fn weight_sum(&self, doubled: &Partition<R>) -> R {
        self.ratios(doubled)
            .iter()
            .zip(self.omega.iter())
            .fold(R::zero(), |acc, (&ratio, &w)| acc + ratio * w)
    }
}

/// Partition probabilities at the requested precision, narrowed to `f64`.
pub fn omegas(b: f64, t: f64, precision: Precision) -> Result<[f64; 4]> {
    at_precision!(precision, R => {
        let partition = Partition::new(R::from_f64(b), R::from_f64(t))?;
        Ok(partition.omega().map(Real::to_f64))
    })
}
