//! Classical boolean gates over truthy inputs.

use lf_core::{Real, truthy};

pub fn and(inputs: &[Real]) -> bool {
    inputs.iter().all(|&v| truthy(v))
}

pub fn or(inputs: &[Real]) -> bool {
    inputs.iter().any(|&v| truthy(v))
}

pub fn not(a: Real) -> bool {
    !truthy(a)
}

pub fn nand(inputs: &[Real]) -> bool {
    !and(inputs)
}

pub fn nor(inputs: &[Real]) -> bool {
    !or(inputs)
}

/// Parity over a sequential fold: true for an odd count of truthy inputs.
pub fn xor(inputs: &[Real]) -> bool {
    inputs.iter().fold(false, |acc, &v| acc ^ truthy(v))
}

pub fn xnor(inputs: &[Real]) -> bool {
    !xor(inputs)
}

pub fn imply(a: Real, b: Real) -> bool {
    !truthy(a) || truthy(b)
}

pub fn nimply(a: Real, b: Real) -> bool {
    truthy(a) && !truthy(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_or_over_mixed_inputs() {
        assert!(!and(&[1.0, 1.0, 0.0]));
        assert!(or(&[1.0, 1.0, 0.0]));
        assert!(and(&[]));
        assert!(!or(&[]));
    }

    #[test]
    fn xor_is_parity() {
        assert!(!xor(&[1.0, 1.0, 0.0]));
        assert!(xor(&[1.0, 0.0, 0.0]));
        assert!(xor(&[1.0, 1.0, 1.0]));
        assert!(xnor(&[1.0, 1.0]));
    }

    #[test]
    fn implication_pair() {
        assert!(imply(0.0, 0.0));
        assert!(imply(0.0, 1.0));
        assert!(!imply(1.0, 0.0));
        assert!(imply(1.0, 1.0));
        assert!(nimply(1.0, 0.0));
        assert!(!nimply(1.0, 1.0));
    }
}
