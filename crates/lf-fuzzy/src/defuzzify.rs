//! Defuzzification over a sampled output universe.

use lf_core::{Real, Tolerances, nearly_equal};
use serde::{Deserialize, Serialize};

/// Crisp-value extraction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Defuzzification {
    /// Centre of gravity.
    #[default]
    Cog,
    /// Mean of the maximizing samples.
    Mom,
    /// Smallest maximizing sample.
    Som,
    /// Largest maximizing sample.
    Lom,
    /// Bisector of area.
    Boa,
}

/// Evenly spaced `(x, μ(x))` samples across `range`, endpoints included.
pub fn sample(range: (Real, Real), resolution: usize, f: impl Fn(Real) -> Real) -> Vec<(Real, Real)> {
    let (min, max) = range;
    let n = resolution.max(2);
    let step = (max - min) / (n - 1) as Real;
    (0..n)
        .map(|i| {
            let x = if i == n - 1 { max } else { min + step * i as Real };
            (x, f(x))
        })
        .collect()
}

/// Sample `f` over `range` and reduce it to a crisp value.
///
/// A zero membership everywhere yields the midpoint of the range.
pub fn defuzzify(
    method: Defuzzification,
    range: (Real, Real),
    resolution: usize,
    f: impl Fn(Real) -> Real,
) -> Real {
    if range.0 == range.1 {
        return range.0;
    }
    defuzzify_samples(method, &sample(range, resolution, f), range)
}

pub fn defuzzify_samples(
    method: Defuzzification,
    samples: &[(Real, Real)],
    range: (Real, Real),
) -> Real {
    let midpoint = (range.0 + range.1) / 2.0;
    let total: Real = samples.iter().map(|(_, mu)| mu).sum();
    if samples.is_empty() || total <= 0.0 {
        return midpoint;
    }

    match method {
        Defuzzification::Cog => samples.iter().map(|(x, mu)| x * mu).sum::<Real>() / total,
        Defuzzification::Mom | Defuzzification::Som | Defuzzification::Lom => {
            let peak = samples.iter().map(|(_, mu)| *mu).fold(0.0, Real::max);
            let maxima: Vec<Real> = samples
                .iter()
                .filter(|(_, mu)| nearly_equal(peak, *mu, Tolerances::default()))
                .map(|(x, _)| *x)
                .collect();
            match (method, maxima.first(), maxima.last()) {
                (Defuzzification::Som, Some(first), _) => *first,
                (Defuzzification::Lom, _, Some(last)) => *last,
                _ if !maxima.is_empty() => maxima.iter().sum::<Real>() / maxima.len() as Real,
                _ => midpoint,
            }
        }
        Defuzzification::Boa => {
            let half = total / 2.0;
            let mut running = 0.0;
            samples
                .iter()
                .find(|(_, mu)| {
                    running += mu;
                    running >= half
                })
                .map_or(midpoint, |(x, _)| *x)
        }
    }
}
