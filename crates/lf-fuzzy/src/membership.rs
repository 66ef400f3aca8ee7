//! Membership functions.
//!
//! Constructors validate parameter shape and ordering; [`MembershipFunction::evaluate`]
//! is total and always returns a degree in `[0, 1]`.

use lf_core::{Real, ValidationError, clamp_unit};
use serde::{Deserialize, Serialize};

use crate::error::FuzzyResult;

/// Shape selector used with raw parameter slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipKind {
    Triangular,
    Trapezoidal,
    Gaussian,
    Bell,
    Sigmoid,
    SCurve,
    ZCurve,
    PiShaped,
    PiecewiseLinear,
}

/// A validated membership function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MembershipFunction {
    Triangular { left: Real, peak: Real, right: Real },
    Trapezoidal { a: Real, b: Real, c: Real, d: Real },
    Gaussian { mean: Real, sigma: Real },
    /// Generalized bell: `1 / (1 + |(x - center) / width|^(2 slope))`.
    Bell { width: Real, slope: Real, center: Real },
    Sigmoid { slope: Real, center: Real },
    SCurve { start: Real, end: Real },
    ZCurve { start: Real, end: Real },
    /// Rising S-curve over `a..b`, plateau `b..c`, falling Z-curve over `c..d`.
    PiShaped { a: Real, b: Real, c: Real, d: Real },
    /// Linear interpolation between `(x, y)` points, flat beyond the ends.
    PiecewiseLinear { points: Vec<(Real, Real)> },
}

fn s_curve(x: Real, start: Real, end: Real) -> Real {
    if x <= start {
        return 0.0;
    }
    if x >= end {
        return 1.0;
    }
    let mid = (start + end) / 2.0;
    let span = end - start;
    if x <= mid {
        2.0 * ((x - start) / span).powi(2)
    } else {
        1.0 - 2.0 * ((x - end) / span).powi(2)
    }
}

impl MembershipFunction {
    pub fn triangular(left: Real, peak: Real, right: Real) -> FuzzyResult<Self> {
        Self::checked(Self::Triangular { left, peak, right })
    }

    pub fn trapezoidal(a: Real, b: Real, c: Real, d: Real) -> FuzzyResult<Self> {
        Self::checked(Self::Trapezoidal { a, b, c, d })
    }

    pub fn gaussian(mean: Real, sigma: Real) -> FuzzyResult<Self> {
        Self::checked(Self::Gaussian { mean, sigma })
    }

    pub fn bell(width: Real, slope: Real, center: Real) -> FuzzyResult<Self> {
        Self::checked(Self::Bell {
            width,
            slope,
            center,
        })
    }

    pub fn sigmoid(slope: Real, center: Real) -> FuzzyResult<Self> {
        Self::checked(Self::Sigmoid { slope, center })
    }

    pub fn s_curve(start: Real, end: Real) -> FuzzyResult<Self> {
        Self::checked(Self::SCurve { start, end })
    }

    pub fn z_curve(start: Real, end: Real) -> FuzzyResult<Self> {
        Self::checked(Self::ZCurve { start, end })
    }

    pub fn pi_shaped(a: Real, b: Real, c: Real, d: Real) -> FuzzyResult<Self> {
        Self::checked(Self::PiShaped { a, b, c, d })
    }

    pub fn piecewise_linear(points: Vec<(Real, Real)>) -> FuzzyResult<Self> {
        Self::checked(Self::PiecewiseLinear { points })
    }

    fn checked(mf: Self) -> FuzzyResult<Self> {
        mf.validate()?;
        Ok(mf)
    }

    /// Build from a kind and a flat parameter list, in declaration order.
    ///
    /// Piecewise-linear parameters are interleaved `x0, y0, x1, y1, …`.
    pub fn from_params(kind: MembershipKind, params: &[Real]) -> FuzzyResult<Self> {
        let expect = |n: usize| -> FuzzyResult<()> {
            if params.len() == n {
                Ok(())
            } else {
                Err(ValidationError::single(format!(
                    "{kind:?} takes {n} parameters, got {}",
                    params.len()
                ))
                .into())
            }
        };
        match kind {
            MembershipKind::Triangular => {
                expect(3)?;
                Self::triangular(params[0], params[1], params[2])
            }
            MembershipKind::Trapezoidal => {
                expect(4)?;
                Self::trapezoidal(params[0], params[1], params[2], params[3])
            }
            MembershipKind::Gaussian => {
                expect(2)?;
                Self::gaussian(params[0], params[1])
            }
            MembershipKind::Bell => {
                expect(3)?;
                Self::bell(params[0], params[1], params[2])
            }
            MembershipKind::Sigmoid => {
                expect(2)?;
                Self::sigmoid(params[0], params[1])
            }
            MembershipKind::SCurve => {
                expect(2)?;
                Self::s_curve(params[0], params[1])
            }
            MembershipKind::ZCurve => {
                expect(2)?;
                Self::z_curve(params[0], params[1])
            }
            MembershipKind::PiShaped => {
                expect(4)?;
                Self::pi_shaped(params[0], params[1], params[2], params[3])
            }
            MembershipKind::PiecewiseLinear => {
                if params.is_empty() || params.len() % 2 != 0 {
                    return Err(ValidationError::single(format!(
                        "PiecewiseLinear takes x/y pairs, got {} values",
                        params.len()
                    ))
                    .into());
                }
                let points = params.chunks_exact(2).map(|p| (p[0], p[1])).collect();
                Self::piecewise_linear(points)
            }
        }
    }

    pub fn kind(&self) -> MembershipKind {
        match self {
            Self::Triangular { .. } => MembershipKind::Triangular,
            Self::Trapezoidal { .. } => MembershipKind::Trapezoidal,
            Self::Gaussian { .. } => MembershipKind::Gaussian,
            Self::Bell { .. } => MembershipKind::Bell,
            Self::Sigmoid { .. } => MembershipKind::Sigmoid,
            Self::SCurve { .. } => MembershipKind::SCurve,
            Self::ZCurve { .. } => MembershipKind::ZCurve,
            Self::PiShaped { .. } => MembershipKind::PiShaped,
            Self::PiecewiseLinear { .. } => MembershipKind::PiecewiseLinear,
        }
    }

    /// Check parameter shape and ordering, reporting every problem found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();
        let name = format!("{:?}", self.kind());
        let all_finite = |values: &[Real]| values.iter().all(|v| v.is_finite());

        match self {
            Self::Triangular { left, peak, right } => {
                err.check(all_finite(&[*left, *peak, *right]), || {
                    format!("{name} parameters must be finite")
                });
                err.check(left < peak && peak < right, || {
                    format!("{name} requires left < peak < right ({left}, {peak}, {right})")
                });
            }
            Self::Trapezoidal { a, b, c, d } | Self::PiShaped { a, b, c, d } => {
                err.check(all_finite(&[*a, *b, *c, *d]), || {
                    format!("{name} parameters must be finite")
                });
                let ordered = if matches!(self, Self::PiShaped { .. }) {
                    a < b && b <= c && c < d
                } else {
                    a <= b && b <= c && c <= d && a < d
                };
                err.check(ordered, || {
                    format!("{name} parameters out of order ({a}, {b}, {c}, {d})")
                });
            }
            Self::Gaussian { mean, sigma } => {
                err.check(all_finite(&[*mean, *sigma]), || {
                    format!("{name} parameters must be finite")
                });
                err.check(*sigma > 0.0, || format!("{name} sigma must be positive"));
            }
            Self::Bell {
                width,
                slope,
                center,
            } => {
                err.check(all_finite(&[*width, *slope, *center]), || {
                    format!("{name} parameters must be finite")
                });
                err.check(*width > 0.0, || format!("{name} width must be positive"));
                err.check(*slope > 0.0, || format!("{name} slope must be positive"));
            }
            Self::Sigmoid { slope, center } => {
                err.check(all_finite(&[*slope, *center]), || {
                    format!("{name} parameters must be finite")
                });
            }
            Self::SCurve { start, end } | Self::ZCurve { start, end } => {
                err.check(all_finite(&[*start, *end]), || {
                    format!("{name} parameters must be finite")
                });
                err.check(start < end, || format!("{name} requires start < end"));
            }
            Self::PiecewiseLinear { points } => {
                err.check(!points.is_empty(), || format!("{name} needs at least one point"));
                err.check(
                    points.iter().all(|(x, y)| x.is_finite() && y.is_finite()),
                    || format!("{name} points must be finite"),
                );
                err.check(points.windows(2).all(|w| w[0].0 < w[1].0), || {
                    format!("{name} x values must be strictly increasing")
                });
                err.check(
                    points.iter().all(|(_, y)| (0.0..=1.0).contains(y)),
                    || format!("{name} y values must lie in [0, 1]"),
                );
            }
        }
        err.into_result()
    }

    pub fn evaluate(&self, x: Real) -> Real {
        let mu = match self {
            Self::Triangular { left, peak, right } => {
                if x <= *left || x >= *right {
                    0.0
                } else if x == *peak {
                    1.0
                } else if x < *peak {
                    (x - left) / (peak - left)
                } else {
                    (right - x) / (right - peak)
                }
            }
            Self::Trapezoidal { a, b, c, d } => {
                if x < *a || x > *d {
                    0.0
                } else if x >= *b && x <= *c {
                    1.0
                } else if x < *b {
                    (x - a) / (b - a)
                } else {
                    (d - x) / (d - c)
                }
            }
            Self::Gaussian { mean, sigma } => (-(x - mean).powi(2) / (2.0 * sigma * sigma)).exp(),
            Self::Bell {
                width,
                slope,
                center,
            } => 1.0 / (1.0 + ((x - center) / width).abs().powf(2.0 * slope)),
            Self::Sigmoid { slope, center } => 1.0 / (1.0 + (-slope * (x - center)).exp()),
            Self::SCurve { start, end } => s_curve(x, *start, *end),
            Self::ZCurve { start, end } => 1.0 - s_curve(x, *start, *end),
            Self::PiShaped { a, b, c, d } => {
                if x <= *b {
                    s_curve(x, *a, *b)
                } else if x <= *c {
                    1.0
                } else {
                    1.0 - s_curve(x, *c, *d)
                }
            }
            Self::PiecewiseLinear { points } => piecewise(points, x),
        };
        clamp_unit(mu)
    }
}

fn piecewise(points: &[(Real, Real)], x: Real) -> Real {
    let (Some(&(x0, y0)), Some(&(xn, yn))) = (points.first(), points.last()) else {
        return 0.0;
    };
    if x <= x0 {
        return y0;
    }
    if x >= xn {
        return yn;
    }
    points
        .windows(2)
        .find(|w| x <= w[1].0)
        .map_or(yn, |w| {
            let ((xa, ya), (xb, yb)) = (w[0], w[1]);
            ya + (yb - ya) * (x - xa) / (xb - xa)
        })
}

/// Validate `params` for `kind`, then evaluate at `x`.
pub fn evaluate_membership(kind: MembershipKind, x: Real, params: &[Real]) -> FuzzyResult<Real> {
    Ok(MembershipFunction::from_params(kind, params)?.evaluate(x))
}
