//! Resolution of partially specified parameter tuples.
//!
//! A [`Query`] states for every axis whether it is fixed, free within the
//! configured bounds, or searched within explicit bounds. [`Evaluator::evaluate`]
//! resolves it into a single [`MvpResult`]:
//!
//! | extra bits `d` | base `b` | shape `t` | strategy |
//! |---|---|---|---|
//! | fixed | fixed | fixed | direct evaluation |
//! | fixed | searched | fixed | bounded scalar search over `b` |
//! | fixed | fixed | searched | bounded scalar search over `t` |
//! | fixed | searched | searched | joint simplex search from `(b_start, t_start)` |
//! | searched | any | any | ascending scan over `d`, resolving `b` and `t` per candidate |
//!
//! The `t` axis only matters for families that use a shape parameter. The scan
//! over `d` keeps the first candidate with the smallest MVP, so ties go to the
//! smaller `d`. Candidates that fail are logged and skipped; the scan fails
//! only when no candidate succeeds.

use tracing::{debug, warn};

use crate::config::{EngineConfig, Precision};
use crate::error::{CandidateFailure, MvpError, Result};
use crate::family::{Family, Point, VarianceModel};
use crate::information;
use crate::minimize::{bounded_brent, nelder_mead, BrentOptions, Bounds, SimplexOptions};
use crate::real::{at_precision, Real};
use crate::result::MvpResult;
use crate::variance::quadrature;

/// Specification of one parameter axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Axis<T> {
    /// Search within the bounds configured on the evaluator
    #[default]
    Free,
    /// Use exactly this value
    Fixed(T),
    /// Search within explicit inclusive bounds
    Search { min: T, max: T },
}

/// Partially specified parameter tuple.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Query {
    /// Register value width; required by query-time estimators
    pub q: Option<f64>,
    pub d: Axis<u32>,
    pub b: Axis<f64>,
    pub t: Axis<f64>,
}

impl Query {
    /// Query with every axis free and no register width
    pub fn new() -> Self {
        Self::default()
    }

    /// Set register value width
    pub fn q(mut self, q: f64) -> Self {
        self.q = Some(q);
        self
    }

    /// Fix extra bits
    pub fn d(mut self, d: u32) -> Self {
        self.d = Axis::Fixed(d);
        self
    }

    /// Fix base
    pub fn b(mut self, b: f64) -> Self {
        self.b = Axis::Fixed(b);
        self
    }

    /// Fix shape
    pub fn t(mut self, t: f64) -> Self {
        self.t = Axis::Fixed(t);
        self
    }

    pub fn d_axis(mut self, d: Axis<u32>) -> Self {
        self.d = d;
        self
    }

    pub fn b_axis(mut self, b: Axis<f64>) -> Self {
        self.b = b;
        self
    }

    pub fn t_axis(mut self, t: Axis<f64>) -> Self {
        self.t = t;
        self
    }
}

/// Outcome of a scan over extra bits.
#[derive(Clone, Debug, PartialEq)]
pub struct DSearch {
    /// Candidate with the smallest MVP
    pub best: MvpResult,
    /// Candidates that could not be evaluated, in ascending `d`
    pub failures: Vec<CandidateFailure>,
}

/// Continuous axis after applying the configured bounds
#[derive(Clone, Copy, Debug, PartialEq)]
enum Range {
    Fixed(f64),
    Search(f64, f64),
}

/// Evaluates and optimizes memory-variance products under one configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Evaluator {
    config: EngineConfig,
}

impl Evaluator {
    /// Creates an evaluator after validating the configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve `query` into the optimal result of `family`.
    pub fn evaluate(&self, family: Family, query: &Query) -> Result<MvpResult> {
        let query = self.prepare(family, query)?;
        match query.d {
            Axis::Fixed(d) => {
                self.d_range(family, query.d)?;
                self.resolve_continuous(family, &query, d)
            }
            Axis::Free | Axis::Search { .. } => Ok(self.scan(family, &query)?.best),
        }
    }

    /// Scan the extra bits of `query` and report failed candidates alongside the optimum.
    ///
    /// A fixed `d` axis is scanned as a single candidate.
    pub fn search_extra_bits(&self, family: Family, query: &Query) -> Result<DSearch> {
        let query = self.prepare(family, query)?;
        self.scan(family, &query)
    }

    /// Evaluate several queries of one family, one result per query.
    pub fn sweep<'a, I>(&self, family: Family, queries: I) -> Vec<Result<MvpResult>>
    where
        I: IntoIterator<Item = &'a Query>,
    {
        queries
            .into_iter()
            .map(|query| self.evaluate(family, query))
            .collect()
    }

    /// Unoptimized MVP of `family` at a fully resolved point.
    pub fn mvp(&self, family: Family, point: &Point) -> Result<MvpResult> {
        let point = normalize_point(family, point);
        MvpResult::try_new(point, family.mvp(&point, &self.config)?)
    }

    /// Relative difference between double and double-double evaluation of one point.
    ///
    /// Large values mark the parameter region where double precision is no
    /// longer trustworthy.
    pub fn precision_drift(&self, family: Family, point: &Point) -> Result<f64> {
        let point = normalize_point(family, point);
        let double = family.mvp(&point, &self.config.clone().with_precision(Precision::Double))?;
        let extended = family.mvp(
            &point,
            &self.config.clone().with_precision(Precision::DoubleDouble),
        )?;
        Ok(((double - extended) / extended).abs())
    }

    /// Shannon entropy in bits of one register at the configured precision.
    pub fn entropy(&self, d: u32, b: f64) -> Result<f64> {
        let quadrature = quadrature(&self.config);
        Ok(at_precision!(self.config.precision, R => {
            information::entropy(d, R::from_f64(b), &quadrature)?.to_f64()
        }))
    }

    /// Fisher information of one register at the configured precision.
    pub fn fisher_information(&self, d: u32, b: f64) -> f64 {
        at_precision!(self.config.precision, R => {
            information::fisher_information(d, R::from_f64(b)).to_f64()
        })
    }

    /// Apply family constraints and validate the register width.
    fn prepare(&self, family: Family, query: &Query) -> Result<Query> {
        let query = family.constrain(query)?;
        if family.uses_register_width() {
            match query.q {
                None => return Err(MvpError::MissingParameter { name: "q" }),
                Some(q) if !(q.is_finite() && q >= 0.0) => {
                    return Err(MvpError::InvalidParameter { name: "q", value: q })
                }
                Some(_) => {}
            }
        }
        Ok(query)
    }

    /// Ascending scan over the `d` candidates of a prepared query
    fn scan(&self, family: Family, query: &Query) -> Result<DSearch> {
        let (first, last) = self.d_range(family, query.d)?;
        scan_extra_bits(family.name(), first..=last, |d| {
            self.resolve_continuous(family, query, d)
        })
    }

    fn d_range(&self, family: Family, axis: Axis<u32>) -> Result<(u32, u32)> {
        let cap = self.config.precision.max_d_cap();
        let (first, last) = match axis {
            Axis::Fixed(d) => (d, d),
            Axis::Free => (0, self.config.d_max.unwrap_or(family.default_d_max()).min(cap)),
            Axis::Search { min, max } => (min, max),
        };
        if first > last {
            return Err(MvpError::InvalidParameter {
                name: "d",
                value: f64::from(first),
            });
        }
        if last > cap {
            return Err(MvpError::InvalidParameter {
                name: "d",
                value: f64::from(last),
            });
        }
        Ok((first, last))
    }

    fn continuous_range(
        &self,
        name: &'static str,
        axis: Axis<f64>,
        bounds: (f64, f64),
    ) -> Result<Range> {
        match axis {
            Axis::Fixed(value) if value.is_finite() => Ok(Range::Fixed(value)),
            Axis::Fixed(value) => Err(MvpError::InvalidParameter { name, value }),
            Axis::Free => Ok(Range::Search(bounds.0, bounds.1)),
            Axis::Search { min, max } if min < max && min.is_finite() && max.is_finite() => {
                Ok(Range::Search(min, max))
            }
            Axis::Search { min, .. } => Err(MvpError::InvalidParameter { name, value: min }),
        }
    }

    /// Resolve the base and shape axes for one value of `d`.
    fn resolve_continuous(&self, family: Family, query: &Query, d: u32) -> Result<MvpResult> {
        let config = &self.config;
        let q = if family.uses_register_width() {
            query.q
        } else {
            None
        };
        let b = self.continuous_range("b", query.b, config.b_bounds)?;
        let t = if family.uses_shape() {
            Some(self.continuous_range("t", query.t, config.t_bounds)?)
        } else {
            None
        };
        let brent = BrentOptions {
            xatol: config.xatol,
            max_evaluations: config.max_iterations,
        };
        let at = |b: f64, t: Option<f64>| Point::new(q, d, b, t);

        let (strategy, point, mvp) = match (b, t) {
            (Range::Fixed(b), None) => {
                let point = at(b, None);
                ("direct", point, family.mvp(&point, config)?)
            }
            (Range::Fixed(b), Some(Range::Fixed(t))) => {
                let point = at(b, Some(t));
                ("direct", point, family.mvp(&point, config)?)
            }
            (Range::Search(lower, upper), None) => {
                let minimum =
                    bounded_brent(|b| family.mvp(&at(b, None), config), lower, upper, brent)?;
                ("base search", at(minimum.x, None), minimum.fun)
            }
            (Range::Search(lower, upper), Some(Range::Fixed(t))) => {
                let minimum =
                    bounded_brent(|b| family.mvp(&at(b, Some(t)), config), lower, upper, brent)?;
                ("base search", at(minimum.x, Some(t)), minimum.fun)
            }
            (Range::Fixed(b), Some(Range::Search(lower, upper))) => {
                let minimum =
                    bounded_brent(|t| family.mvp(&at(b, Some(t)), config), lower, upper, brent)?;
                ("shape search", at(b, Some(minimum.x)), minimum.fun)
            }
            (Range::Search(b_lower, b_upper), Some(Range::Search(t_lower, t_upper))) => {
                let bounds = Bounds {
                    lower: [b_lower, t_lower],
                    upper: [b_upper, t_upper],
                };
                let options = SimplexOptions {
                    xatol: config.simplex_xatol,
                    fatol: config.simplex_fatol,
                    max_iterations: config.simplex_max_iterations,
                };
                let minimum = nelder_mead(
                    |&[b, t]| family.mvp(&at(b, Some(t)), config),
                    [config.b_start, config.t_start],
                    bounds,
                    options,
                )?;
                let [b, t] = minimum.x;
                ("joint search", at(b, Some(t)), minimum.fun)
            }
        };

        let result = MvpResult::try_new(point, mvp)?;
        debug!(
            family = family.name(),
            strategy,
            q = ?result.q(),
            d = result.d(),
            b = result.b(),
            t = ?result.t(),
            mvp = result.mvp(),
            "resolved query"
        );
        Ok(result)
    }
}

/// Keep the first candidate with the smallest MVP, collecting failures.
fn scan_extra_bits<I, F>(family: &'static str, candidates: I, mut resolve: F) -> Result<DSearch>
where
    I: IntoIterator<Item = u32>,
    F: FnMut(u32) -> Result<MvpResult>,
{
    let mut best: Option<MvpResult> = None;
    let mut failures = Vec::new();
    for d in candidates {
        match resolve(d) {
            Ok(candidate) => {
                if best.map_or(true, |best| candidate.mvp() < best.mvp()) {
                    best = Some(candidate);
                }
            }
            Err(error) => {
                warn!(family, d, %error, "extra-bit candidate failed");
                failures.push(CandidateFailure { d, error });
            }
        }
    }
    match best {
        Some(best) => Ok(DSearch { best, failures }),
        None => Err(MvpError::NoFeasibleCandidate { failures }),
    }
}

/// Drop the parameters a family does not depend on
fn normalize_point(family: Family, point: &Point) -> Point {
    Point {
        q: point.q.filter(|_| family.uses_register_width()),
        t: point.t.filter(|_| family.uses_shape()),
        ..*point
    }
}
