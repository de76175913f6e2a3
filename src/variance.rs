//! Unoptimized memory-variance products for one fully specified parameter tuple.
//!
//! The generic `*_in` functions evaluate the closed forms in any [`Real`] type.
//! The `f64` entry points pick the working precision from an [`EngineConfig`],
//! narrow the final scalar once and reject values that are not positive finite
//! numbers, which signals invalid parameters or lost precision.
//!
//! `required_bits` is the register width `q + d`. Domain validity of `(d, b, t)`
//! is the caller's responsibility; out-of-domain tuples surface as
//! [`MvpError::InvalidMvp`] or [`MvpError::NegativeProbability`].

use crate::config::EngineConfig;
use crate::error::{MvpError, Result};
use crate::information::{entropy, fisher_information};
use crate::partition::Partition;
use crate::quadrature::TanhSinh;
use crate::real::{at_precision, Real};
use crate::special::{gamma_ratio, rate_normalized};

/// Theoretical minimum `(q + d) ln(b) / zeta(2, 1 + b^(-d) / (b - 1))`, `q + d` for `b <= 1`
#[inline]
pub fn lower_bound_in<R: Real>(required_bits: R, d: u32, b: R) -> R {
    required_bits / fisher_information(d, b)
}

/// Variance coefficient `(b - 1 + b^(-d)) / (2 rate_normalized(ln b))` of the martingale estimator
#[inline]
pub fn martingale_coefficient<R: Real>(d: u32, b: R) -> R {
    let ln_b = b.ln();
    let tail = (-R::from_f64(f64::from(d)) * ln_b).exp();
    (b - R::one() + tail) / (R::from_f64(2.0) * rate_normalized(ln_b))
}

#[inline]
pub fn martingale_in<R: Real>(required_bits: R, d: u32, b: R) -> R {
    martingale_coefficient(d, b) * required_bits
}

/// Generalized ratio-average estimator.
///
/// `t = 0` disables ratio averaging and yields exactly `required_bits`.
pub fn gra_in<R: Real>(required_bits: R, d: u32, b: R, t: R) -> R {
    if t == R::zero() {
        return required_bits;
    }
    let one = R::one();
    let two = R::from_f64(2.0);
    let ln_b = b.ln();
    let extra = R::from_f64(f64::from(d));
    let offset = b - one + (-extra * ln_b).exp();

    let mut sum = R::zero();
    for s in 1..=d {
        let s = R::from_f64(f64::from(s));
        let decay = (-t * s * ln_b).exp();
        let ratio = one + (b - one) * (-s * ln_b).exp() / offset;
        sum += two * ln_b * decay / (two * t * ratio.ln()).exp();
    }
    sum += ln_b;
    sum += two * (-t * extra * ln_b).exp() / (t * rate_normalized(t * ln_b));
    sum *= gamma_ratio(t);
    sum -= one;
    sum /= t * t;
    sum * required_bits
}

/// Fast generalized ratio-average estimator with two extra bits.
///
/// Combines the partitions at `t` and `2t` through `sum_i omega_i(t)^2 / omega_i(2t)`.
pub fn fgra_in<R: Real>(required_bits: R, b: R, t: R) -> Result<R> {
    let single = Partition::new(b, t)?;
    let doubled = Partition::new(b, t + t)?;
    let weight_sum = single.weight_sum(&doubled);
    Ok(required_bits / (t * t) * (gamma_ratio(t) * b.ln() / weight_sum - R::one()))
}

/// Lower bound after entropy-optimal compression of the register array
pub fn lower_bound_compressed_in<R: Real>(d: u32, b: R, quadrature: &TanhSinh) -> Result<R> {
    Ok(entropy(d, b, quadrature)? / fisher_information(d, b))
}

/// Martingale variance after entropy-optimal compression of the register array
pub fn martingale_compressed_in<R: Real>(d: u32, b: R, quadrature: &TanhSinh) -> Result<R> {
    Ok(entropy(d, b, quadrature)? * martingale_coefficient(d, b))
}

/// Reject anything that is not a positive finite memory-variance product.
#[inline]
pub(crate) fn checked_mvp(family: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(MvpError::InvalidMvp { family, value })
    }
}

#[inline]
fn required_bits(q: f64, d: u32) -> f64 {
    q + f64::from(d)
}

pub(crate) fn quadrature(config: &EngineConfig) -> TanhSinh {
    TanhSinh::new(
        config.precision.quadrature_tolerance(),
        config.quadrature_max_level,
    )
}

/// Lower bound of the memory-variance product at the configured precision.
pub fn lower_bound(q: f64, d: u32, b: f64, config: &EngineConfig) -> Result<f64> {
    let value = at_precision!(config.precision, R => {
        lower_bound_in(R::from_f64(required_bits(q, d)), d, R::from_f64(b)).to_f64()
    });
    checked_mvp("lower bound", value)
}

/// Martingale estimator at the configured precision.
pub fn martingale(q: f64, d: u32, b: f64, config: &EngineConfig) -> Result<f64> {
    let value = at_precision!(config.precision, R => {
        martingale_in(R::from_f64(required_bits(q, d)), d, R::from_f64(b)).to_f64()
    });
    checked_mvp("martingale", value)
}

/// Generalized ratio-average estimator at the configured precision.
pub fn gra(q: f64, d: u32, b: f64, t: f64, config: &EngineConfig) -> Result<f64> {
    let value = at_precision!(config.precision, R => {
        gra_in(R::from_f64(required_bits(q, d)), d, R::from_f64(b), R::from_f64(t)).to_f64()
    });
    checked_mvp("GRA", value)
}

/// Fast generalized ratio-average estimator at the configured precision.
pub fn fgra(q: f64, b: f64, t: f64, config: &EngineConfig) -> Result<f64> {
    let value = at_precision!(config.precision, R => {
        fgra_in(R::from_f64(required_bits(q, 2)), R::from_f64(b), R::from_f64(t))?.to_f64()
    });
    checked_mvp("FGRA", value)
}

/// Compressed lower bound at the configured precision.
pub fn lower_bound_compressed(d: u32, b: f64, config: &EngineConfig) -> Result<f64> {
    let quadrature = quadrature(config);
    let value = at_precision!(config.precision, R => {
        lower_bound_compressed_in(d, R::from_f64(b), &quadrature)?.to_f64()
    });
    checked_mvp("compressed lower bound", value)
}

/// Compressed martingale estimator at the configured precision.
pub fn martingale_compressed(d: u32, b: f64, config: &EngineConfig) -> Result<f64> {
    let quadrature = quadrature(config);
    let value = at_precision!(config.precision, R => {
        martingale_compressed_in(d, R::from_f64(b), &quadrature)?.to_f64()
    });
    checked_mvp("compressed martingale", value)
}
