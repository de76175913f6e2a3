//! Bounded minimizers for the continuous parameter axes.
//!
//! # Scalar search
//!
//! [`bounded_brent`] combines golden-section and parabolic steps on a closed
//! interval and never evaluates the objective at the interval ends, so
//! formulas that degenerate at `b = 1` or `t = 0` remain usable with those
//! values as bounds. It stops once the bracket around the best point is smaller
//! than `2 (sqrt(eps) |x| + xatol / 3)`.
//!
//! # Joint search
//!
//! [`nelder_mead`] runs the downhill simplex method with standard coefficients
//! inside a box. Trial points that leave the box are clamped onto it. The search
//! stops when both the simplex diameter and the spread of its values fall below
//! their tolerances.
//!
//! Both minimizers propagate objective failures and report exhausting their
//! budget as [`MvpError::NonConvergence`].

use tracing::trace;

use crate::error::{MvpError, Result};

/// Located minimum of an objective
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Minimum<X> {
    /// Argument of the minimum
    pub x: X,
    /// Objective value at `x`
    pub fun: f64,
    /// Number of objective evaluations spent
    pub evaluations: u32,
}

/// Stopping rule of the scalar search
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrentOptions {
    /// Absolute tolerance in the search variable
    pub xatol: f64,
    /// Maximum number of objective evaluations
    pub max_evaluations: u32,
}

/// Stopping rule of the joint search
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimplexOptions {
    /// Maximum distance of the simplex vertices from the best vertex
    pub xatol: f64,
    /// Maximum spread of the objective over the simplex
    pub fatol: f64,
    /// Maximum number of iterations
    pub max_iterations: u32,
}

const GOLDEN_MEAN: f64 = 0.381_966_011_250_105_1;

/// Minimize a scalar function on `[lower, upper]`.
pub fn bounded_brent<F>(
    mut objective: F,
    lower: f64,
    upper: f64,
    options: BrentOptions,
) -> Result<Minimum<f64>>
where
    F: FnMut(f64) -> Result<f64>,
{
    if !(lower < upper) {
        return Err(MvpError::InvalidParameter {
            name: "lower bound",
            value: lower,
        });
    }
    let sqrt_eps = f64::EPSILON.sqrt();
    let (mut a, mut b) = (lower, upper);

    // best point so far, second best and previous second best
    let mut x = a + GOLDEN_MEAN * (b - a);
    let mut fx = objective(x)?;
    let (mut w, mut fw) = (x, fx);
    let (mut v, mut fv) = (x, fx);
    let mut evaluations = 1;

    let mut step = 0.0f64;
    let mut previous_step = 0.0f64;
    let mut midpoint = 0.5 * (a + b);
    let mut tol1 = sqrt_eps * x.abs() + options.xatol / 3.0;
    let mut tol2 = 2.0 * tol1;

    while (x - midpoint).abs() > tol2 - 0.5 * (b - a) {
        if evaluations >= options.max_evaluations {
            return Err(MvpError::NonConvergence {
                method: "bounded Brent",
                iterations: evaluations,
            });
        }

        let mut golden = true;
        if previous_step.abs() > tol1 {
            // parabola through x, w and v
            let r = (x - w) * (fx - fv);
            let q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            let mut q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            let older_step = previous_step;
            previous_step = step;

            if p.abs() < (0.5 * q * older_step).abs() && p > q * (a - x) && p < q * (b - x) {
                step = p / q;
                let u = x + step;
                if u - a < tol2 || b - u < tol2 {
                    step = tol1.copysign(midpoint - x);
                }
                golden = false;
            }
        }
        if golden {
            previous_step = if x >= midpoint { a - x } else { b - x };
            step = GOLDEN_MEAN * previous_step;
        }

        let direction = if step < 0.0 { -1.0 } else { 1.0 };
        let u = x + direction * step.abs().max(tol1);
        let fu = objective(u)?;
        evaluations += 1;
        trace!(evaluations, x = u, fun = fu, golden, "bounded Brent step");

        if fu <= fx {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            (v, fv) = (w, fw);
            (w, fw) = (x, fx);
            (x, fx) = (u, fu);
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                (v, fv) = (w, fw);
                (w, fw) = (u, fu);
            } else if fu <= fv || v == x || v == w {
                (v, fv) = (u, fu);
            }
        }

        midpoint = 0.5 * (a + b);
        tol1 = sqrt_eps * x.abs() + options.xatol / 3.0;
        tol2 = 2.0 * tol1;
    }

    Ok(Minimum {
        x,
        fun: fx,
        evaluations,
    })
}

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINKAGE: f64 = 0.5;

/// Relative perturbation of the start point for the initial simplex
const NONZERO_DELTA: f64 = 0.05;
/// Absolute perturbation for zero start coordinates
const ZERO_DELTA: f64 = 0.000_25;

/// Axis-aligned box of the joint search
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds<const N: usize> {
    pub lower: [f64; N],
    pub upper: [f64; N],
}

impl<const N: usize> Bounds<N> {
    fn clamp(&self, mut point: [f64; N]) -> [f64; N] {
        for ((x, &lo), &hi) in point.iter_mut().zip(&self.lower).zip(&self.upper) {
            *x = x.clamp(lo, hi);
        }
        point
    }

    fn validate(&self) -> Result<()> {
        for (&lo, &hi) in self.lower.iter().zip(&self.upper) {
            if !(lo < hi) {
                return Err(MvpError::InvalidParameter {
                    name: "lower bound",
                    value: lo,
                });
            }
        }
        Ok(())
    }
}

/// `(1 + coefficient) * centroid - coefficient * worst`
#[inline]
fn affine<const N: usize>(centroid: &[f64; N], worst: &[f64; N], coefficient: f64) -> [f64; N] {
    let mut point = [0.0; N];
    for ((p, &c), &w) in point.iter_mut().zip(centroid).zip(worst) {
        *p = (1.0 + coefficient) * c - coefficient * w;
    }
    point
}

/// Minimize a function of `N` variables inside `bounds`, starting at `start`.
pub fn nelder_mead<F, const N: usize>(
    mut objective: F,
    start: [f64; N],
    bounds: Bounds<N>,
    options: SimplexOptions,
) -> Result<Minimum<[f64; N]>>
where
    F: FnMut(&[f64; N]) -> Result<f64>,
{
    bounds.validate()?;
    let start = bounds.clamp(start);

    let mut vertices = Vec::with_capacity(N + 1);
    vertices.push(start);
    for k in 0..N {
        let mut vertex = start;
        vertex[k] = if vertex[k] != 0.0 {
            (1.0 + NONZERO_DELTA) * vertex[k]
        } else {
            ZERO_DELTA
        };
        // step back inside when the perturbation leaves the box
        if vertex[k] > bounds.upper[k] {
            vertex[k] = 2.0 * bounds.upper[k] - vertex[k];
        }
        vertices.push(bounds.clamp(vertex));
    }

    let mut evaluations = 0;
    let mut simplex = Vec::with_capacity(N + 1);
    for vertex in vertices {
        let value = objective(&vertex)?;
        evaluations += 1;
        simplex.push((vertex, value));
    }
    sort_simplex(&mut simplex);

    let mut iterations = 1;
    loop {
        let (best, best_value) = simplex[0];
        let diameter = simplex[1..]
            .iter()
            .flat_map(|(vertex, _)| vertex.iter().zip(&best).map(|(x, y)| (x - y).abs()))
            .fold(0.0f64, f64::max);
        let spread = simplex[1..]
            .iter()
            .map(|(_, value)| (value - best_value).abs())
            .fold(0.0f64, f64::max);
        if diameter <= options.xatol && spread <= options.fatol {
            break;
        }
        if iterations >= options.max_iterations {
            return Err(MvpError::NonConvergence {
                method: "Nelder-Mead",
                iterations,
            });
        }

        let mut centroid = [0.0; N];
        for (vertex, _) in &simplex[..N] {
            for (c, &x) in centroid.iter_mut().zip(vertex) {
                *c += x / N as f64;
            }
        }
        let (worst, worst_value) = simplex[N];
        let second_worst_value = simplex[N - 1].1;

        let reflected = bounds.clamp(affine(&centroid, &worst, REFLECTION));
        let reflected_value = objective(&reflected)?;
        evaluations += 1;

        let mut shrink = false;
        if reflected_value < best_value {
            let expanded = bounds.clamp(affine(&centroid, &worst, REFLECTION * EXPANSION));
            let expanded_value = objective(&expanded)?;
            evaluations += 1;
            simplex[N] = if expanded_value < reflected_value {
                (expanded, expanded_value)
            } else {
                (reflected, reflected_value)
            };
        } else if reflected_value < second_worst_value {
            simplex[N] = (reflected, reflected_value);
        } else if reflected_value < worst_value {
            let contracted = bounds.clamp(affine(&centroid, &worst, CONTRACTION * REFLECTION));
            let contracted_value = objective(&contracted)?;
            evaluations += 1;
            if contracted_value <= reflected_value {
                simplex[N] = (contracted, contracted_value);
            } else {
                shrink = true;
            }
        } else {
            let contracted = bounds.clamp(affine(&centroid, &worst, -CONTRACTION));
            let contracted_value = objective(&contracted)?;
            evaluations += 1;
            if contracted_value < worst_value {
                simplex[N] = (contracted, contracted_value);
            } else {
                shrink = true;
            }
        }

        if shrink {
            for (vertex, value) in simplex.iter_mut().skip(1) {
                for (x, &y) in vertex.iter_mut().zip(&best) {
                    *x = y + SHRINKAGE * (*x - y);
                }
                *vertex = bounds.clamp(*vertex);
                *value = objective(vertex)?;
                evaluations += 1;
            }
        }

        iterations += 1;
        sort_simplex(&mut simplex);
        trace!(
            iterations,
            best = ?simplex[0].0,
            fun = simplex[0].1,
            shrink,
            "Nelder-Mead step"
        );
    }

    let (x, fun) = simplex[0];
    Ok(Minimum {
        x,
        fun,
        evaluations,
    })
}

/// Order vertices by objective value, keeping the insertion order of ties
fn sort_simplex<const N: usize>(simplex: &mut [([f64; N], f64)]) {
    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    fn brent_options() -> BrentOptions {
        BrentOptions {
            xatol: 1e-12,
            max_evaluations: 500,
        }
    }

    fn simplex_options() -> SimplexOptions {
        SimplexOptions {
            xatol: 1e-9,
            fatol: 1e-13,
            max_iterations: 4000,
        }
    }

    #[test_case(0.3, 0.0, 1.0; "interior")]
    #[test_case(-2.0, -5.0, 5.0; "negative")]
    #[test_case(4.999, 1.0, 5.0; "near upper bound")]
    fn test_brent_quadratic(center: f64, lower: f64, upper: f64) {
        let minimum =
            bounded_brent(|x| Ok((x - center).powi(2) + 1.0), lower, upper, brent_options())
                .unwrap();
        assert_abs_diff_eq!(minimum.x, center, epsilon = 1e-7);
        assert_abs_diff_eq!(minimum.fun, 1.0, epsilon = 1e-13);
    }

    #[test]
    fn test_brent_boundary_minimum_never_evaluates_endpoint() {
        // decreasing towards the lower bound where the objective is undefined
        let minimum = bounded_brent(
            |x| {
                assert!(x > 1.0);
                Ok(x.ln() + x)
            },
            1.0,
            5.0,
            brent_options(),
        )
        .unwrap();
        assert!(minimum.x > 1.0);
        assert_abs_diff_eq!(minimum.x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_brent_transcendental() {
        // minimum of x - ln(x) at x = 1
        let minimum = bounded_brent(|x| Ok(x - x.ln()), 0.1, 3.0, brent_options()).unwrap();
        assert_abs_diff_eq!(minimum.x, 1.0, epsilon = 1e-7);
    }

    #[test]
    fn test_brent_budget() {
        let options = BrentOptions {
            xatol: 1e-12,
            max_evaluations: 5,
        };
        assert_eq!(
            bounded_brent(|x| Ok(x * x), -1.0, 2.0, options),
            Err(MvpError::NonConvergence {
                method: "bounded Brent",
                iterations: 5
            })
        );
    }

    #[test]
    fn test_brent_propagates_objective_error() {
        let err = MvpError::InvalidMvp {
            family: "test",
            value: -1.0,
        };
        let result = bounded_brent(|_| Err(err.clone()), 0.0, 1.0, brent_options());
        assert_eq!(result, Err(err));
    }

    #[test]
    fn test_brent_empty_interval() {
        assert!(matches!(
            bounded_brent(|x| Ok(x), 2.0, 2.0, brent_options()),
            Err(MvpError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_nelder_mead_rosenbrock() {
        let bounds = Bounds {
            lower: [-2.0, -2.0],
            upper: [2.0, 2.0],
        };
        let minimum = nelder_mead(
            |&[x, y]| Ok((1.0 - x).powi(2) + 100.0 * (y - x * x).powi(2)),
            [-1.2, 1.0],
            bounds,
            simplex_options(),
        )
        .unwrap();
        assert_abs_diff_eq!(minimum.x[0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(minimum.x[1], 1.0, epsilon = 1e-6);
        assert!(minimum.fun < 1e-12);
    }

    #[test]
    fn test_nelder_mead_active_bound() {
        // unconstrained minimum at (0, 3) lies below the box
        let bounds = Bounds {
            lower: [1.0, 0.0],
            upper: [5.0, 5.0],
        };
        let minimum = nelder_mead(
            |&[x, y]| Ok(x * x + (y - 3.0).powi(2)),
            [2.0, 1.0],
            bounds,
            simplex_options(),
        )
        .unwrap();
        assert_abs_diff_eq!(minimum.x[0], 1.0, epsilon = 1e-8);
        assert_abs_diff_eq!(minimum.x[1], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_nelder_mead_start_on_upper_bound() {
        let bounds = Bounds {
            lower: [0.0],
            upper: [1.0],
        };
        let minimum =
            nelder_mead(|&[x]| Ok((x - 0.5).powi(2)), [1.0], bounds, simplex_options()).unwrap();
        assert_abs_diff_eq!(minimum.x[0], 0.5, epsilon = 1e-8);
    }

    #[test]
    fn test_nelder_mead_budget() {
        let bounds = Bounds {
            lower: [-2.0, -2.0],
            upper: [2.0, 2.0],
        };
        let options = SimplexOptions {
            max_iterations: 3,
            ..simplex_options()
        };
        assert_eq!(
            nelder_mead(
                |&[x, y]| Ok(x * x + y * y),
                [1.0, 1.0],
                bounds,
                options
            ),
            Err(MvpError::NonConvergence {
                method: "Nelder-Mead",
                iterations: 3
            })
        );
    }
}
