//! Counting gates: the result depends only on how many inputs are truthy.

use lf_core::{Real, truthy};

pub fn count_true(inputs: &[Real]) -> usize {
    inputs.iter().filter(|&&v| truthy(v)).count()
}

/// More than half of the inputs are truthy.
pub fn majority(inputs: &[Real]) -> bool {
    count_true(inputs) * 2 > inputs.len()
}

/// Fewer than half of the inputs are truthy.
pub fn minority(inputs: &[Real]) -> bool {
    count_true(inputs) * 2 < inputs.len()
}

pub fn at_least(inputs: &[Real], k: u32) -> bool {
    count_true(inputs) >= k as usize
}

pub fn exactly(inputs: &[Real], k: u32) -> bool {
    count_true(inputs) == k as usize
}

pub fn at_most(inputs: &[Real], k: u32) -> bool {
    count_true(inputs) <= k as usize
}
