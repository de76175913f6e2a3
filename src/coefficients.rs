//! Linear combination weights of the ratio-average estimators.
//!
//! Given a solved result, these calculators return the weights an estimator
//! implementation applies to the register-value histogram. They are diagnostic
//! only and play no part in the optimization.

use crate::config::Precision;
use crate::error::{MvpError, Result};
use crate::partition::Partition;
use crate::real::{at_precision, Real};
use crate::result::MvpResult;
use crate::special::gamma;

/// Largest number of extra bits for which GRA weights are materialized
pub const MAX_COEFFICIENT_BITS: u32 = 20;

fn shape(result: &MvpResult) -> Result<f64> {
    match result.t() {
        Some(t) if t > 0.0 => Ok(t),
        Some(t) => Err(MvpError::InvalidParameter { name: "t", value: t }),
        None => Err(MvpError::MissingParameter { name: "t" }),
    }
}

/// `2^d` weights of the generalized ratio-average estimator.
///
/// Weight `i` is `x_i ln(b) (b - 1 + b^(-t))^t / Gamma(t)` with
/// `x_i = 1 / (b^t - 1) + sum b^(t j)` over `j = 1..=d` for which bit `d - j` of `i` is clear.
pub fn gra_coefficients(result: &MvpResult, precision: Precision) -> Result<Vec<f64>> {
    let d = result.d();
    if d > MAX_COEFFICIENT_BITS {
        return Err(MvpError::TooManyCoefficients {
            d,
            max: MAX_COEFFICIENT_BITS,
        });
    }
    let t = shape(result)?;
    Ok(at_precision!(precision, R => {
        gra_coefficients_in(d, R::from_f64(result.b()), R::from_f64(t))
    }))
}

fn gra_coefficients_in<R: Real>(d: u32, b: R, t: R) -> Vec<f64> {
    let ln_b = b.ln();
    let one = R::one();
    let base = one / (t * ln_b).exp_m1();
    // b^(t j) for j = 1..=d
    let powers: Vec<R> = (1..=d)
        .map(|j| (t * R::from_f64(f64::from(j)) * ln_b).exp())
        .collect();
    let scale = ln_b * (t * (b - one + (-t * ln_b).exp()).ln()).exp() / gamma(t);

    (0..1u64 << d)
        .map(|i| {
            let mut x = base;
            for (j, &power) in (1..=d).zip(&powers) {
                if i & (1 << (d - j)) == 0 {
                    x += power;
                }
            }
            (x * scale).to_f64()
        })
        .collect()
}

/// Four weights of the fast generalized ratio-average estimator.
///
/// Weight `i` is `ln(b) / (Gamma(t) S) * omega_i(t) / omega_i(2t)` where
/// `S = sum omega_i(t)^2 / omega_i(2t)`.
pub fn fgra_coefficients(result: &MvpResult, precision: Precision) -> Result<[f64; 4]> {
    if result.d() != 2 {
        return Err(MvpError::SchemeConstraint {
            family: "FGRA",
            detail: "requires exactly 2 extra bits",
        });
    }
    let t = shape(result)?;
    at_precision!(precision, R => {
        let (b, t) = (R::from_f64(result.b()), R::from_f64(t));
        let single = Partition::new(b, t)?;
        let doubled = Partition::new(b, t + t)?;
        let scale = b.ln() / (gamma(t) * single.weight_sum(&doubled));
        Ok(single.ratios(&doubled).map(|ratio| (ratio * scale).to_f64()))
    })
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::family::Point;
    use approx::assert_relative_eq;
    use std::f64::consts::LN_2;
    use test_case::test_case;

    fn solved(d: u32, b: f64, t: Option<f64>) -> MvpResult {
        MvpResult::try_new(Point::new(Some(6.0), d, b, t), 5.0).unwrap()
    }

    #[test_case(0, vec![1.5]; "no extra bits")]
    #[test_case(2, vec![10.5, 4.5, 7.5, 1.5]; "two extra bits")]
    fn test_gra_coefficients(d: u32, multiples_of_ln2: Vec<f64>) {
        for precision in [Precision::Double, Precision::DoubleDouble] {
            let coefficients = gra_coefficients(&solved(d, 2.0, Some(1.0)), precision).unwrap();
            assert_eq!(coefficients.len(), 1 << d);
            for (actual, multiple) in coefficients.iter().zip(&multiples_of_ln2) {
                assert_relative_eq!(*actual, multiple * LN_2, max_relative = 1e-14);
            }
        }
    }

    #[test]
    fn test_gra_coefficients_limits() {
        let precision = Precision::Double;
        assert_eq!(
            gra_coefficients(&solved(21, 2.0, Some(1.0)), precision),
            Err(MvpError::TooManyCoefficients { d: 21, max: 20 })
        );
        assert_eq!(
            gra_coefficients(&solved(2, 2.0, None), precision),
            Err(MvpError::MissingParameter { name: "t" })
        );
        assert_eq!(
            gra_coefficients(&solved(2, 2.0, Some(0.0)), precision),
            Err(MvpError::InvalidParameter { name: "t", value: 0.0 })
        );
    }

    #[test]
    fn test_fgra_coefficients() {
        let expected = [
            6.037408544974055,
            2.415939555183636,
            3.364339873128046,
            0.9349240641245658,
        ];
        let tolerances = [(Precision::Double, 1e-12), (Precision::DoubleDouble, 1e-14)];
        for (precision, tolerance) in tolerances {
            let coefficients = fgra_coefficients(&solved(2, 2.0, Some(1.0)), precision).unwrap();
            for (actual, expected) in coefficients.iter().zip(&expected) {
                assert_relative_eq!(*actual, *expected, max_relative = tolerance);
            }
        }
    }

    #[test]
    fn test_fgra_coefficients_require_two_extra_bits() {
        assert!(matches!(
            fgra_coefficients(&solved(3, 2.0, Some(1.0)), Precision::DoubleDouble),
            Err(MvpError::SchemeConstraint { .. })
        ));
    }
}
