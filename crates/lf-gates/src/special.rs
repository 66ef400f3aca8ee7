//! Selection and encoding gates.
//!
//! Multi-line outputs (DEMUX, DECODER) are returned as one-hot words:
//! line `i` active reads as `2^i`.

use lf_core::{Real, truthy};

use crate::threshold::count_true;

fn index_of(v: Real) -> Option<usize> {
    if v.is_finite() && v >= 0.0 {
        Some(v.floor() as usize)
    } else {
        None
    }
}

/// `inputs[0]` selects among the data inputs that follow it.
pub fn mux(inputs: &[Real]) -> Real {
    let Some((select, data)) = inputs.split_first() else {
        return 0.0;
    };
    index_of(*select)
        .and_then(|i| data.get(i).copied())
        .unwrap_or(0.0)
}

/// Routes a truthy `data` to line `select`.
pub fn demux(data: Real, select: Real) -> Real {
    match index_of(select) {
        Some(line) if truthy(data) => 2.0_f64.powi(line.min(1023) as i32),
        _ => 0.0,
    }
}

/// Priority encoder: index of the highest truthy line, 0 when none is set.
pub fn encoder(lines: &[Real]) -> Real {
    lines
        .iter()
        .rposition(|&v| truthy(v))
        .map_or(0.0, |i| i as Real)
}

/// Reads the inputs as bits (most significant first) and activates that line.
///
/// Lines past 1023 saturate at `2^1023`, as in [`demux`].
pub fn decoder(bits: &[Real]) -> Real {
    let value: Real = bits
        .iter()
        .fold(0.0, |acc, &b| acc * 2.0 + if truthy(b) { 1.0 } else { 0.0 });
    2.0_f64.powi(value.min(1023.0) as i32)
}

/// 1 when an odd number of inputs are truthy.
pub fn parity(inputs: &[Real]) -> Real {
    if count_true(inputs) % 2 == 1 { 1.0 } else { 0.0 }
}

/// Three-way comparison: 0 below, 1 equal, 2 above.
pub fn comparator(a: Real, b: Real) -> Real {
    if a < b {
        0.0
    } else if a > b {
        2.0
    } else {
        1.0
    }
}

/// Expand a one-hot word into `lines` booleans.
pub fn one_hot_lines(word: Real, lines: usize) -> Vec<bool> {
    let word = if word.is_finite() && word > 0.0 {
        word as u64
    } else {
        0
    };
    (0..lines)
        .map(|i| i < 64 && word & (1_u64 << i) != 0)
        .collect()
}
