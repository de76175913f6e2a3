//! Fisher information and Shannon entropy of a single register.
//!
//! Both quantities depend on the number of extra bits `d` and the base `b` only
//! through the offset `p = b^(-d) / (b - 1)`. For `b <= 1` the register value is
//! an ungrouped geometric variable: its Fisher information is `1` and it cannot
//! be compressed, so the entropy is reported as `+inf`.

use crate::error::Result;
use crate::quadrature::TanhSinh;
use crate::real::Real;
use crate::special::hurwitz_zeta2;

/// Offset `p = b^(-d) / (b - 1)` of the register distribution for `b > 1`
#[inline]
pub(crate) fn register_offset<R: Real>(d: u32, b: R) -> R {
    (-R::from_f64(f64::from(d)) * b.ln()).exp() / (b - R::one())
}

/// Fisher information `zeta(2, 1 + p) / ln(b)` of one register, `1` for `b <= 1`.
pub fn fisher_information<R: Real>(d: u32, b: R) -> R {
    if b > R::one() {
        hurwitz_zeta2(R::one() + register_offset(d, b)) / b.ln()
    } else {
        R::one()
    }
}

/// Shannon entropy in bits of one register, `+inf` for `b <= 1`.
///
/// Evaluates `(1 / (1 + p) + I) / (ln(2) ln(b))` where
/// `I = int_0^1 z^p (1 - z) ln(1 - z) / (z ln(z)) dz`.
pub fn entropy<R: Real>(d: u32, b: R, quadrature: &TanhSinh) -> Result<R> {
    if !(b > R::one()) {
        return Ok(R::from_f64(f64::INFINITY));
    }
    let p = register_offset(d, b);
    let exponent = p - R::one();
    let half = R::from_f64(0.5);
    let integral = quadrature.integrate_unit(|z: R, c: R| {
        let ln_z = if z < half { z.ln() } else { (-c).ln_1p() };
        let ln_c = if c < half { c.ln() } else { (-z).ln_1p() };
        (exponent * ln_z).exp() * c * ln_c / ln_z
    })?;
    Ok((R::one() / (R::one() + p) + integral) / (R::ln_2() * b.ln()))
}
