//! Mamdani-style fuzzy inference.
//!
//! Inference runs in four stages:
//! 1. Fuzzify every crisp input against its variable's terms
//! 2. Fire each rule: T-norm across antecedent degrees, scaled by rule weight
//! 3. Aggregate firing strengths per output term with the S-norm
//! 4. Clip (or scale) each output term by its strength via the implication,
//!    combine with the S-norm and defuzzify over the output range

use std::collections::HashMap;

use indexmap::IndexMap;
use lf_core::{Real, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::defuzzify::{Defuzzification, defuzzify};
use crate::error::{FuzzyError, FuzzyResult};
use crate::implication::Implication;
use crate::membership::MembershipFunction;
use crate::norms::{SNorm, TNorm};

/// Default number of samples taken across an output range.
pub const DEFAULT_RESOLUTION: usize = 101;

/// Degrees of membership keyed by variable, then term.
pub type Degrees = IndexMap<String, IndexMap<String, Real>>;

/// A named universe with labelled membership functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinguisticVariable {
    pub range: (Real, Real),
    #[serde(default)]
    pub terms: IndexMap<String, MembershipFunction>,
}

impl LinguisticVariable {
    pub fn new(min: Real, max: Real) -> Self {
        Self {
            range: (min, max),
            terms: IndexMap::new(),
        }
    }

    pub fn with_term(mut self, name: impl Into<String>, function: MembershipFunction) -> Self {
        self.add_term(name, function);
        self
    }

    pub fn add_term(&mut self, name: impl Into<String>, function: MembershipFunction) {
        self.terms.insert(name.into(), function);
    }

    pub fn validate(&self, name: &str) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();
        let (min, max) = self.range;
        err.check(min.is_finite() && max.is_finite() && min < max, || {
            format!("variable '{name}' needs a finite range with min < max, got ({min}, {max})")
        });
        err.check(!self.terms.is_empty(), || {
            format!("variable '{name}' has no terms")
        });
        for (term, function) in &self.terms {
            if let Err(e) = function.validate() {
                for v in e.violations {
                    err.push(format!("{name}.{term}: {v}"));
                }
            }
        }
        err.into_result()
    }

    /// Degree of `x` in every term.
    pub fn fuzzify(&self, x: Real) -> IndexMap<String, Real> {
        self.terms
            .iter()
            .map(|(term, f)| (term.clone(), f.evaluate(x)))
            .collect()
    }
}

fn default_weight() -> Real {
    1.0
}

/// `IF var is term AND … THEN var is term …`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyRule {
    pub antecedent: IndexMap<String, String>,
    pub consequent: IndexMap<String, String>,
    #[serde(default = "default_weight")]
    pub weight: Real,
}

impl Default for FuzzyRule {
    fn default() -> Self {
        Self {
            antecedent: IndexMap::new(),
            consequent: IndexMap::new(),
            weight: default_weight(),
        }
    }
}

impl FuzzyRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn when(mut self, variable: impl Into<String>, term: impl Into<String>) -> Self {
        self.antecedent.insert(variable.into(), term.into());
        self
    }

    pub fn then(mut self, variable: impl Into<String>, term: impl Into<String>) -> Self {
        self.consequent.insert(variable.into(), term.into());
        self
    }

    pub fn with_weight(mut self, weight: Real) -> Self {
        self.weight = weight;
        self
    }
}

fn default_resolution() -> usize {
    DEFAULT_RESOLUTION
}

/// Operator choices for one inference system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default)]
    pub t_norm: TNorm,
    #[serde(default)]
    pub s_norm: SNorm,
    #[serde(default)]
    pub implication: Implication,
    #[serde(default)]
    pub defuzzification: Defuzzification,
    #[serde(default = "default_resolution")]
    pub resolution: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            t_norm: TNorm::default(),
            s_norm: SNorm::default(),
            implication: Implication::default(),
            defuzzification: Defuzzification::default(),
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl InferenceConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();
        if let Err(e) = self.t_norm.validate() {
            err.extend(e);
        }
        if let Err(e) = self.s_norm.validate() {
            err.extend(e);
        }
        err.check(self.resolution >= 2, || {
            format!("resolution must be at least 2, got {}", self.resolution)
        });
        err.into_result()
    }
}

/// Everything one [`FuzzyInferenceSystem::infer`] call produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InferenceOutcome {
    /// Crisp value per output variable, in declaration order.
    pub outputs: IndexMap<String, Real>,
    /// Firing strength per rule, weight applied, in rule order.
    pub rule_activations: Vec<Real>,
    /// Aggregated strength per output term.
    pub term_activations: Degrees,
    /// Input degrees per term.
    pub fuzzified: Degrees,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FuzzyInferenceSystem {
    #[serde(default)]
    pub config: InferenceConfig,
    #[serde(default)]
    inputs: IndexMap<String, LinguisticVariable>,
    #[serde(default)]
    outputs: IndexMap<String, LinguisticVariable>,
    #[serde(default)]
    rules: Vec<FuzzyRule>,
}

impl FuzzyInferenceSystem {
    pub fn new(config: InferenceConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn inputs(&self) -> &IndexMap<String, LinguisticVariable> {
        &self.inputs
    }

    pub fn outputs(&self) -> &IndexMap<String, LinguisticVariable> {
        &self.outputs
    }

    pub fn rules(&self) -> &[FuzzyRule] {
        &self.rules
    }

    pub fn add_input(
        &mut self,
        name: impl Into<String>,
        variable: LinguisticVariable,
    ) -> FuzzyResult<()> {
        let name = name.into();
        variable.validate(&name)?;
        self.inputs.insert(name, variable);
        Ok(())
    }

    pub fn add_output(
        &mut self,
        name: impl Into<String>,
        variable: LinguisticVariable,
    ) -> FuzzyResult<()> {
        let name = name.into();
        variable.validate(&name)?;
        self.outputs.insert(name, variable);
        Ok(())
    }

    /// Append a rule after checking that every variable and term it names exists.
    pub fn add_rule(&mut self, rule: FuzzyRule) -> FuzzyResult<()> {
        self.check_rule(&rule)?;
        self.rules.push(rule);
        Ok(())
    }

    fn check_rule(&self, rule: &FuzzyRule) -> FuzzyResult<()> {
        if !(rule.weight.is_finite() && (0.0..=1.0).contains(&rule.weight)) {
            return Err(ValidationError::single(format!(
                "rule weight must lie in [0, 1], got {}",
                rule.weight
            ))
            .into());
        }
        if rule.consequent.is_empty() {
            return Err(ValidationError::single("rule has no consequent").into());
        }
        for (side, vars, clauses) in [
            ("input", &self.inputs, &rule.antecedent),
            ("output", &self.outputs, &rule.consequent),
        ] {
            for (variable, term) in clauses {
                let Some(var) = vars.get(variable) else {
                    debug!(side, variable = %variable, "rule names unknown variable");
                    return Err(FuzzyError::UnknownVariable {
                        name: variable.clone(),
                    });
                };
                if !var.terms.contains_key(term) {
                    return Err(FuzzyError::UnknownTerm {
                        variable: variable.clone(),
                        term: term.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Re-check a whole system, e.g. after deserializing it.
    pub fn validate(&self) -> FuzzyResult<()> {
        let mut err = ValidationError::new();
        if let Err(e) = self.config.validate() {
            err.extend(e);
        }
        for (name, var) in self.inputs.iter().chain(&self.outputs) {
            if let Err(e) = var.validate(name) {
                err.extend(e);
            }
        }
        err.into_result()?;
        self.rules.iter().try_for_each(|rule| self.check_rule(rule))
    }

    /// Fuzzify every declared input. Fails on the first input with no value.
    pub fn fuzzify(&self, values: &HashMap<String, Real>) -> FuzzyResult<Degrees> {
        self.inputs
            .iter()
            .map(|(name, var)| {
                let x = values
                    .get(name)
                    .copied()
                    .ok_or_else(|| FuzzyError::MissingInput { name: name.clone() })?;
                Ok((name.clone(), var.fuzzify(x)))
            })
            .collect()
    }

    fn fire(&self, rule: &FuzzyRule, fuzzified: &Degrees) -> Real {
        let mut degrees = rule.antecedent.iter().map(|(variable, term)| {
            fuzzified
                .get(variable)
                .and_then(|terms| terms.get(term))
                .copied()
                .unwrap_or(0.0)
        });
        let Some(first) = degrees.next() else {
            return 0.0;
        };
        let strength = degrees.fold(first, |acc, mu| self.config.t_norm.apply(acc, mu));
        strength * rule.weight
    }

    pub fn infer(&self, values: &HashMap<String, Real>) -> FuzzyResult<InferenceOutcome> {
        let fuzzified = self.fuzzify(values)?;
        let rule_activations: Vec<Real> =
            self.rules.iter().map(|r| self.fire(r, &fuzzified)).collect();

        let mut term_activations: Degrees = self
            .outputs
            .iter()
            .map(|(name, var)| {
                let terms: IndexMap<String, Real> =
                    var.terms.keys().map(|t| (t.clone(), 0.0)).collect();
                (name.clone(), terms)
            })
            .collect();
        for (rule, &strength) in self.rules.iter().zip(&rule_activations) {
            if strength <= 0.0 {
                continue;
            }
            for (variable, term) in &rule.consequent {
                if let Some(slot) = term_activations
                    .get_mut(variable)
                    .and_then(|terms| terms.get_mut(term))
                {
                    *slot = self.config.s_norm.apply(*slot, strength);
                }
            }
        }

        let config = self.config;
        let mut outputs = IndexMap::with_capacity(self.outputs.len());
        for (name, var) in &self.outputs {
            let active: Vec<(Real, &MembershipFunction)> = term_activations
                .get(name)
                .into_iter()
                .flat_map(|terms| terms.iter())
                .filter(|(_, strength)| **strength > 0.0)
                .filter_map(|(term, strength)| var.terms.get(term).map(|f| (*strength, f)))
                .collect();
            let aggregated = |x: Real| {
                active.iter().fold(0.0, |acc, (strength, f)| {
                    config
                        .s_norm
                        .apply(acc, config.implication.apply(*strength, f.evaluate(x)))
                })
            };
            let crisp = defuzzify(config.defuzzification, var.range, config.resolution, aggregated);
            debug!(output = %name, active_terms = active.len(), crisp, "defuzzified");
            outputs.insert(name.clone(), crisp);
        }

        Ok(InferenceOutcome {
            outputs,
            rule_activations,
            term_activations,
            fuzzified,
        })
    }
}
