use crate::LfError;

/// Signal and membership values.
pub type Real = f64;

/// Closeness test for plateau and tie detection.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

/// Reject NaN and infinities before they reach downstream nodes.
pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, LfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(LfError::NonFinite { what, value: v })
    }
}

/// Boolean reading of a signal: non-zero and not NaN.
pub fn truthy(v: Real) -> bool {
    v != 0.0 && !v.is_nan()
}

/// Boolean results travel as `1.0` / `0.0`.
pub fn from_bool(b: bool) -> Real {
    if b { 1.0 } else { 0.0 }
}

/// Clamp into the unit interval; NaN maps to 0.
pub fn clamp_unit(v: Real) -> Real {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plateau_detection_uses_both_tolerances() {
        let tol = Tolerances::default();
        assert!(nearly_equal(0.8, 0.8 + 1e-13, tol));
        assert!(nearly_equal(1e6, 1e6 + 1e-4, tol));
        assert!(!nearly_equal(0.8, 0.8 + 1e-6, tol));
    }

    #[test]
    fn infinities_are_rejected_with_context() {
        assert_eq!(ensure_finite(0.5, "gate output"), Ok(0.5));
        let err = ensure_finite(Real::INFINITY, "gate output").unwrap_err();
        assert_eq!(err.to_string(), "gate output is not finite: inf");
    }

    #[test]
    fn truthiness() {
        assert!(truthy(1.0));
        assert!(truthy(-0.5));
        assert!(!truthy(0.0));
        assert!(!truthy(Real::NAN));
        assert_eq!(from_bool(true), 1.0);
        assert_eq!(from_bool(false), 0.0);
    }

    #[test]
    fn clamp_unit_handles_nan() {
        assert_eq!(clamp_unit(Real::NAN), 0.0);
        assert_eq!(clamp_unit(1.7), 1.0);
        assert_eq!(clamp_unit(-2.0), 0.0);
        assert_eq!(clamp_unit(0.25), 0.25);
    }
}
