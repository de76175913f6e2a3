//! Tanh-sinh (double exponential) quadrature on the unit interval.
//!
//! The substitution `z = (1 + tanh(pi/2 * sinh(t))) / 2` maps `(0, 1)` onto the real
//! line and makes the transformed integrand decay double exponentially, which
//! handles the removable singularity of the entropy integrand at `z = 0` and its
//! logarithmic singularity at `z = 1` without special casing.
//!
//! Abscissas are produced together with their complements `1 - z`, computed
//! directly from the substitution, so integrands can evaluate `ln(1 - z)` close
//! to `z = 1` without cancellation.

use tracing::trace;

use crate::error::{MvpError, Result};
use crate::real::Real;

/// Truncation point of the transformed interval; the abscissa nearest to an
/// endpoint lies about `1e-61` away from it.
const T_MAX: f64 = 4.5;

/// Minimum refinement level before the convergence test is trusted
const MIN_LEVEL: u32 = 3;

/// Tanh-sinh integrator with a relative tolerance between successive levels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TanhSinh {
    tolerance: f64,
    max_level: u32,
}

impl TanhSinh {
    pub fn new(tolerance: f64, max_level: u32) -> Self {
        Self {
            tolerance,
            max_level: max_level.max(MIN_LEVEL),
        }
    }

    /// Integrate `f(z, 1 - z)` over `z` in `(0, 1)`.
    pub fn integrate_unit<R, F>(&self, f: F) -> Result<R>
    where
        R: Real,
        F: Fn(R, R) -> R,
    {
        // Level 0 uses unit step and includes the center node
        let (z, c, weight) = node::<R>(0.0);
        let mut sum = weight * f(z, c);
        let mut k = 1.0;
        while k <= T_MAX {
            sum += pair(&f, k);
            k += 1.0;
        }
        let mut previous = sum;

        let mut h = 1.0;
        for level in 1..=self.max_level {
            h /= 2.0;
            // only odd multiples of the new step are new abscissas
            let mut t = h;
            while t <= T_MAX {
                sum += pair(&f, t);
                t += 2.0 * h;
            }
            let estimate = sum * R::from_f64(h);
            let change = (estimate - previous).abs().to_f64();
            trace!(level, change, "tanh-sinh refinement");
            if level >= MIN_LEVEL && change <= self.tolerance * estimate.abs().to_f64() {
                return Ok(estimate);
            }
            previous = estimate;
        }

        Err(MvpError::QuadratureNonConvergence {
            levels: self.max_level,
        })
    }
}

/// Weighted contributions of the abscissa at `t` and its mirror at `-t`
#[inline]
fn pair<R, F>(f: &F, t: f64) -> R
where
    R: Real,
    F: Fn(R, R) -> R,
{
    let (z, c, weight) = node::<R>(t);
    weight * (f(z, c) + f(c, z))
}

/// Abscissa `z`, its complement `1 - z` and the weight `dz/dt` for `t >= 0`
fn node<R: Real>(t: f64) -> (R, R, R) {
    let two = R::from_f64(2.0);
    let half_pi = R::two_pi() / R::from_f64(4.0);
    let et = R::from_f64(t).exp();
    let cosh = (et + R::one() / et) / two;
    let sinh = (et - R::one() / et) / two;
    let q = (-two * half_pi * sinh).exp();
    let z = R::one() / (R::one() + q);
    let c = q / (R::one() + q);
    // dz/dt = pi cosh(t) z (1 - z)
    let weight = two * half_pi * cosh * z * c;
    (z, c, weight)
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::double_double::DoubleDouble;
    use approx::assert_relative_eq;

    #[test]
    fn test_node_complements() {
        let (z, c, _) = node::<DoubleDouble>(0.0);
        assert_eq!(z.to_f64(), 0.5);
        assert_eq!(c.to_f64(), 0.5);

        let (z, c, weight) = node::<DoubleDouble>(T_MAX);
        assert!(c.to_f64() > 0.0 && c.to_f64() < 1e-60);
        assert_eq!(z.to_f64(), 1.0);
        assert!(weight.to_f64() > 0.0);
    }

    #[test]
    fn test_integrate_constant() {
        let quadrature = TanhSinh::new(1e-13, 12);
        let value: f64 = quadrature.integrate_unit(|_, _| 1.0).unwrap();
        assert_relative_eq!(value, 1.0, max_relative = 1e-14);
    }

    #[test]
    fn test_integrate_endpoint_singularities() {
        let quadrature = TanhSinh::new(1e-13, 12);
        // int_0^1 -ln(1 - z) dz = 1
        let value: f64 = quadrature.integrate_unit(|_, c: f64| -c.ln()).unwrap();
        assert_relative_eq!(value, 1.0, max_relative = 1e-13);
        // int_0^1 z^(-1/2) dz = 2
        let value: f64 = quadrature.integrate_unit(|z: f64, _| 1.0 / z.sqrt()).unwrap();
        assert_relative_eq!(value, 2.0, max_relative = 1e-12);
    }

    #[test]
    fn test_integrate_double_double() {
        let quadrature = TanhSinh::new(1e-24, 12);
        // int_0^1 ln(z) ln(1 - z) dz = 2 - pi^2 / 6
        let value: DoubleDouble = quadrature
            .integrate_unit(|z: DoubleDouble, c: DoubleDouble| z.ln() * c.ln())
            .unwrap();
        let pi = DoubleDouble::TWO_PI / DoubleDouble::from(2.0);
        let expected = DoubleDouble::from(2.0) - pi * pi / DoubleDouble::from(6.0);
        assert!(((value - expected) / expected).abs().to_f64() < 1e-24);
    }

    #[test]
    fn test_non_convergence() {
        // an oscillating integrand cannot settle within three levels at this tolerance
        let quadrature = TanhSinh::new(1e-300, 3);
        let result: Result<f64> = quadrature.integrate_unit(|z: f64, _| (200.0 * z).sin());
        assert_eq!(
            result,
            Err(MvpError::QuadratureNonConvergence { levels: 3 })
        );
    }
}
