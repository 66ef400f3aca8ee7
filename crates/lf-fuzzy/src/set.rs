//! Discrete fuzzy sets with an optional continuous fallback.

use lf_core::{Real, clamp_unit};

use crate::complement::Complement;
use crate::membership::MembershipFunction;
use crate::norms::{SNorm, TNorm};

/// Degrees at or below this are treated as outside the support.
const SUPPORT_EPSILON: Real = 1e-10;

/// A fuzzy set over the reals.
///
/// Explicit elements win over the attached membership function; elements
/// with no explicit degree and no function have membership 0.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FuzzySet {
    /// Sorted by element.
    elements: Vec<(Real, Real)>,
    function: Option<MembershipFunction>,
    /// Applied in order to the function's degree.
    complements: Vec<Complement>,
}

impl FuzzySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_function(function: MembershipFunction) -> Self {
        Self {
            elements: Vec::new(),
            function: Some(function),
            complements: Vec::new(),
        }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (Real, Real)>) -> Self {
        let mut set = Self::new();
        for (x, mu) in pairs {
            set.insert(x, mu);
        }
        set
    }

    pub fn function(&self) -> Option<&MembershipFunction> {
        self.function.as_ref()
    }

    /// Set the degree of `x`, clamped into `[0, 1]`. Non-finite elements are ignored.
    pub fn insert(&mut self, x: Real, mu: Real) {
        if !x.is_finite() {
            return;
        }
        let mu = clamp_unit(mu);
        match self.elements.binary_search_by(|(e, _)| e.total_cmp(&x)) {
            Ok(i) => self.elements[i].1 = mu,
            Err(i) => self.elements.insert(i, (x, mu)),
        }
    }

    pub fn membership(&self, x: Real) -> Real {
        if let Ok(i) = self.elements.binary_search_by(|(e, _)| e.total_cmp(&x)) {
            return self.elements[i].1;
        }
        self.function.as_ref().map_or(0.0, |f| {
            self.complements
                .iter()
                .fold(f.evaluate(x), |mu, c| c.apply(mu))
        })
    }

    pub fn elements(&self) -> impl Iterator<Item = (Real, Real)> + '_ {
        self.elements.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn merged_keys(&self, other: &Self) -> Vec<Real> {
        let mut keys: Vec<Real> = self.elements().chain(other.elements()).map(|(x, _)| x).collect();
        keys.sort_by(Real::total_cmp);
        keys.dedup();
        keys
    }

    /// Pointwise S-norm over the union of both element sets.
    pub fn union(&self, other: &Self, s_norm: SNorm) -> Self {
        let pairs = self
            .merged_keys(other)
            .into_iter()
            .map(|x| (x, s_norm.apply(self.membership(x), other.membership(x))));
        Self::from_pairs(pairs)
    }

    pub fn intersection(&self, other: &Self, t_norm: TNorm) -> Self {
        let pairs = self
            .merged_keys(other)
            .into_iter()
            .map(|x| (x, t_norm.apply(self.membership(x), other.membership(x))));
        Self::from_pairs(pairs)
    }

    /// Complements every explicit degree and the continuous fallback.
    pub fn complement(&self, complement: Complement) -> Self {
        let mut set = Self::from_pairs(self.elements().map(|(x, mu)| (x, complement.apply(mu))));
        if let Some(function) = &self.function {
            set.function = Some(function.clone());
            set.complements = self.complements.clone();
            set.complements.push(complement);
        }
        set
    }

    /// Elements whose degree is at least `alpha`, ascending.
    pub fn alpha_cut(&self, alpha: Real) -> Vec<Real> {
        self.elements()
            .filter(|(_, mu)| *mu >= alpha)
            .map(|(x, _)| x)
            .collect()
    }

    pub fn support(&self) -> Vec<Real> {
        self.elements()
            .filter(|(_, mu)| *mu > SUPPORT_EPSILON)
            .map(|(x, _)| x)
            .collect()
    }

    pub fn core(&self) -> Vec<Real> {
        self.alpha_cut(1.0 - SUPPORT_EPSILON)
    }

    /// Sigma-count: sum of all explicit degrees.
    pub fn cardinality(&self) -> Real {
        self.elements().map(|(_, mu)| mu).sum()
    }

    pub fn height(&self) -> Real {
        self.elements().map(|(_, mu)| mu).fold(0.0, Real::max)
    }

    pub fn is_normal(&self) -> bool {
        self.height() >= 1.0 - SUPPORT_EPSILON
    }
}
