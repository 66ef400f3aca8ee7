//! Values carried between nodes during a flow pass.

use serde::{Deserialize, Serialize};

use crate::numeric::{Real, truthy};

/// Signal on a node output.
///
/// Routers mark inactive branches with `NoSignal` so downstream nodes can
/// tell "not fired" apart from a computed zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum SignalValue {
    /// Scalar floating-point signal.
    Scalar(Real),
    /// Explicitly cleared output.
    #[default]
    NoSignal,
}

impl SignalValue {
    /// Create a scalar signal.
    pub fn scalar(value: Real) -> Self {
        Self::Scalar(value)
    }

    /// Get the scalar value as an option.
    pub fn as_scalar_opt(&self) -> Option<Real> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::NoSignal => None,
        }
    }

    /// Scalar value, treating `NoSignal` as zero.
    pub fn as_scalar_or_zero(&self) -> Real {
        self.as_scalar_opt().unwrap_or(0.0)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    pub fn is_truthy(&self) -> bool {
        self.as_scalar_opt().is_some_and(truthy)
    }
}

impl From<Real> for SignalValue {
    fn from(value: Real) -> Self {
        Self::Scalar(value)
    }
}

impl From<bool> for SignalValue {
    fn from(value: bool) -> Self {
        Self::Scalar(crate::numeric::from_bool(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_accessors() {
        let val = SignalValue::scalar(2.5);
        assert_eq!(val.as_scalar_opt(), Some(2.5));
        assert!(val.is_active());
        assert!(val.is_truthy());
    }

    #[test]
    fn no_signal_is_inactive() {
        let val = SignalValue::NoSignal;
        assert_eq!(val.as_scalar_opt(), None);
        assert_eq!(val.as_scalar_or_zero(), 0.0);
        assert!(!val.is_active());
        assert!(!val.is_truthy());
    }

    #[test]
    fn bool_conversion() {
        assert_eq!(SignalValue::from(true), SignalValue::Scalar(1.0));
        assert_eq!(SignalValue::from(false), SignalValue::Scalar(0.0));
    }
}
