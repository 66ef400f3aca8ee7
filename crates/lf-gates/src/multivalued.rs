//! Multi-valued logics: Łukasiewicz, Post, ternary (Kleene) and quaternary.
//!
//! Truth values are plain numbers in `0..=max`. Ternary and quaternary
//! operators snap inputs to the nearest level first.

use lf_core::Real;

fn fold_min(inputs: &[Real]) -> Real {
    inputs.iter().copied().reduce(Real::min).unwrap_or(0.0)
}

fn fold_max(inputs: &[Real]) -> Real {
    inputs.iter().copied().reduce(Real::max).unwrap_or(0.0)
}

fn level(v: Real, max: u8) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, Real::from(max)) as u8
}

// Łukasiewicz

pub fn lukasiewicz_and(inputs: &[Real]) -> Real {
    fold_min(inputs)
}

pub fn lukasiewicz_or(inputs: &[Real]) -> Real {
    fold_max(inputs)
}

pub fn lukasiewicz_not(a: Real, max: Real) -> Real {
    max - a
}

pub fn lukasiewicz_imply(a: Real, b: Real, max: Real) -> Real {
    (max - a + b).min(max)
}

// Post algebra

/// Cyclic negation: `(x + 1) mod levels`.
pub fn post_not(a: Real, levels: u32) -> Real {
    if levels == 0 {
        return 0.0;
    }
    let next = (a.round() + 1.0).rem_euclid(Real::from(levels));
    if next.is_finite() { next } else { 0.0 }
}

pub fn post_min(inputs: &[Real]) -> Real {
    fold_min(inputs)
}

pub fn post_max(inputs: &[Real]) -> Real {
    fold_max(inputs)
}

// Ternary (Kleene): 0 = false, 1 = unknown, 2 = true

pub fn ternary_and(inputs: &[Real]) -> Real {
    let Some((first, rest)) = inputs.split_first() else {
        return 0.0;
    };
    let acc = rest.iter().fold(level(*first, 2), |acc, &v| {
        let b = level(v, 2);
        if acc == 0 || b == 0 {
            0
        } else if acc == 2 && b == 2 {
            2
        } else {
            1
        }
    });
    Real::from(acc)
}

pub fn ternary_or(inputs: &[Real]) -> Real {
    let Some((first, rest)) = inputs.split_first() else {
        return 0.0;
    };
    let acc = rest.iter().fold(level(*first, 2), |acc, &v| {
        let b = level(v, 2);
        if acc == 2 || b == 2 {
            2
        } else if acc == 0 && b == 0 {
            0
        } else {
            1
        }
    });
    Real::from(acc)
}

pub fn ternary_not(a: Real) -> Real {
    Real::from(2 - level(a, 2))
}

/// The shared value when all inputs agree, otherwise unknown (1).
pub fn ternary_consensus(inputs: &[Real]) -> Real {
    let Some((first, rest)) = inputs.split_first() else {
        return 1.0;
    };
    let a = level(*first, 2);
    if rest.iter().all(|&v| level(v, 2) == a) {
        Real::from(a)
    } else {
        1.0
    }
}

// Quaternary: 0..=3

pub fn quaternary_and(inputs: &[Real]) -> Real {
    fold_min(inputs)
}

pub fn quaternary_or(inputs: &[Real]) -> Real {
    fold_max(inputs)
}

pub fn quaternary_not(a: Real) -> Real {
    3.0 - a
}

pub fn quaternary_average(inputs: &[Real]) -> Real {
    if inputs.is_empty() {
        return 0.0;
    }
    let mean = inputs.iter().sum::<Real>() / inputs.len() as Real;
    mean.round()
}
