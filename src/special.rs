//! Special functions needed by the variance formulas.
//!
//! All functions are generic over [`Real`] so that the same code runs in double
//! and in double-double precision. Both asymptotic expansions below use the
//! Bernoulli numbers `B_2 .. B_30` after shifting the argument to at least
//! [`ASYMPTOTIC_SHIFT`], which keeps the truncation error below `1e-36`.

use crate::real::Real;

/// Minimum argument at which the asymptotic expansions are evaluated
const ASYMPTOTIC_SHIFT: u32 = 30;

/// Bernoulli numbers `B_2k` for `k = 1..=15` as exact numerator/denominator pairs
const BERNOULLI: [(f64, f64); 15] = [
    (1.0, 6.0),
    (-1.0, 30.0),
    (1.0, 42.0),
    (-1.0, 30.0),
    (5.0, 66.0),
    (-691.0, 2730.0),
    (7.0, 6.0),
    (-3617.0, 510.0),
    (43867.0, 798.0),
    (-174611.0, 330.0),
    (854513.0, 138.0),
    (-236364091.0, 2730.0),
    (8553103.0, 6.0),
    (-23749461029.0, 870.0),
    (8615841276005.0, 14322.0),
];

/// Rate-normalized exponential `(e^x - 1) / x`, continuously extended by `1` at `x = 0`.
#[inline]
pub fn rate_normalized<R: Real>(x: R) -> R {
    if x == R::zero() {
        R::one()
    } else {
        x.exp_m1() / x
    }
}

/// Hurwitz zeta function `zeta(2, a) = sum_k 1 / (a + k)^2` for `a > 0`.
///
/// Sums the first terms directly and the tail with the Euler-Maclaurin formula
/// `1/x + 1/(2x^2) + sum_j B_2j / x^(2j+1)` at `x = a + ASYMPTOTIC_SHIFT`.
pub fn hurwitz_zeta2<R: Real>(a: R) -> R {
    let mut sum = R::zero();
    let mut x = a;
    for _ in 0..ASYMPTOTIC_SHIFT {
        sum += R::one() / (x * x);
        x += R::one();
    }

    let inv = R::one() / x;
    let inv2 = inv * inv;
    let mut tail = inv + inv2 / R::from_f64(2.0);
    let mut power = inv * inv2;
    for &(numerator, denominator) in BERNOULLI.iter() {
        tail += R::from_f64(numerator) / R::from_f64(denominator) * power;
        power *= inv2;
    }
    sum + tail
}

/// `ln(Gamma(x))` for `x > 0` from Stirling's series.
///
/// The argument is shifted up by the recurrence `Gamma(x + 1) = x Gamma(x)` so
/// that a fixed number of series terms suffices at double-double precision.
pub fn stirling_ln_gamma<R: Real>(x: R) -> R {
    let mut product = R::one();
    let mut z = x;
    for _ in 0..ASYMPTOTIC_SHIFT {
        product *= z;
        z += R::one();
    }

    let half = R::from_f64(0.5);
    let mut series = (z - half) * z.ln() - z + half * R::two_pi().ln();
    let inv = R::one() / z;
    let inv2 = inv * inv;
    let mut power = inv;
    for (k, &(numerator, denominator)) in BERNOULLI.iter().enumerate() {
        let two_k = 2.0 * (k as f64 + 1.0);
        series +=
            R::from_f64(numerator) / R::from_f64(denominator * two_k * (two_k - 1.0)) * power;
        power *= inv2;
    }
    series - product.ln()
}

/// `Gamma(t)` for `t > 0`
#[inline]
pub fn gamma<R: Real>(t: R) -> R {
    t.ln_gamma().exp()
}

/// `Gamma(2t) / Gamma(t)^2` for `t > 0`, evaluated in log space
#[inline]
pub fn gamma_ratio<R: Real>(t: R) -> R {
    let two = R::from_f64(2.0);
    ((two * t).ln_gamma() - two * t.ln_gamma()).exp()
}
