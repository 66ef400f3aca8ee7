//! End-to-end inference over a system loaded from YAML.

use std::collections::HashMap;

use lf_fuzzy::{
    Defuzzification, FuzzyInferenceSystem, FuzzyRule, MembershipFunction, SNorm, TNorm,
};
use proptest::prelude::*;

const TIPPER: &str = r#"
config:
  t_norm: { type: min }
  s_norm: { type: max }
  implication: mamdani
  defuzzification: cog
inputs:
  service:
    range: [0.0, 10.0]
    terms:
      poor: { type: gaussian, mean: 0.0, sigma: 1.5 }
      good: { type: gaussian, mean: 5.0, sigma: 1.5 }
      excellent: { type: gaussian, mean: 10.0, sigma: 1.5 }
  food:
    range: [0.0, 10.0]
    terms:
      rancid: { type: trapezoidal, a: 0.0, b: 0.0, c: 1.0, d: 3.0 }
      delicious: { type: trapezoidal, a: 7.0, b: 9.0, c: 10.0, d: 10.0 }
outputs:
  tip:
    range: [0.0, 30.0]
    terms:
      cheap: { type: triangular, left: 0.0, peak: 5.0, right: 10.0 }
      average: { type: triangular, left: 10.0, peak: 15.0, right: 20.0 }
      generous: { type: triangular, left: 20.0, peak: 25.0, right: 30.0 }
rules:
  - antecedent: { service: poor }
    consequent: { tip: cheap }
  - antecedent: { service: good }
    consequent: { tip: average }
  - antecedent: { service: excellent, food: delicious }
    consequent: { tip: generous }
"#;

fn tipper() -> FuzzyInferenceSystem {
    let fis: FuzzyInferenceSystem = serde_yaml::from_str(TIPPER).unwrap();
    fis.validate().unwrap();
    fis
}

fn values(service: f64, food: f64) -> HashMap<String, f64> {
    HashMap::from([("service".to_string(), service), ("food".to_string(), food)])
}

#[test]
fn yaml_system_loads_with_declaration_order() {
    let fis = tipper();
    assert_eq!(fis.config.t_norm, TNorm::Min);
    assert_eq!(fis.config.s_norm, SNorm::Max);
    assert_eq!(fis.config.defuzzification, Defuzzification::Cog);
    assert_eq!(fis.config.resolution, 101);
    let names: Vec<_> = fis.inputs().keys().cloned().collect();
    assert_eq!(names, vec!["service", "food"]);
    assert_eq!(fis.rules().len(), 3);
}

#[test]
fn better_service_tips_more() {
    let fis = tipper();
    let bad = fis.infer(&values(1.0, 5.0)).unwrap().outputs["tip"];
    let ok = fis.infer(&values(5.0, 5.0)).unwrap().outputs["tip"];
    let great = fis.infer(&values(10.0, 10.0)).unwrap().outputs["tip"];
    assert!(bad < ok, "{bad} < {ok}");
    assert!(ok < great, "{ok} < {great}");
}

#[test]
fn conjunctive_rule_uses_the_weaker_antecedent() {
    let fis = tipper();
    let out = fis.infer(&values(10.0, 8.0)).unwrap();
    // excellent(10) = 1, delicious(8) = 0.5
    assert!((out.rule_activations[2] - 0.5).abs() < 1e-12);
    assert!((out.term_activations["tip"]["generous"] - 0.5).abs() < 1e-12);
}

#[test]
fn unknown_rule_reference_fails_validation() {
    let mut fis = tipper();
    let err = fis
        .add_rule(FuzzyRule::new().when("ambience", "cozy").then("tip", "generous"))
        .unwrap_err();
    assert!(err.to_string().contains("ambience"));
}

#[test]
fn round_trips_through_json() {
    let fis = tipper();
    let json = serde_json::to_string(&fis).unwrap();
    let back: FuzzyInferenceSystem = serde_json::from_str(&json).unwrap();
    assert_eq!(back, fis);
}

proptest! {
    #[test]
    fn membership_stays_in_unit_interval(x in -100.0..100.0f64) {
        let shapes = [
            MembershipFunction::triangular(-10.0, 0.0, 10.0).unwrap(),
            MembershipFunction::trapezoidal(-5.0, -1.0, 1.0, 5.0).unwrap(),
            MembershipFunction::gaussian(3.0, 2.0).unwrap(),
            MembershipFunction::bell(2.0, 3.0, 0.0).unwrap(),
            MembershipFunction::sigmoid(-4.0, 1.0).unwrap(),
            MembershipFunction::pi_shaped(-8.0, -2.0, 2.0, 8.0).unwrap(),
        ];
        for mf in &shapes {
            let mu = mf.evaluate(x);
            prop_assert!((0.0..=1.0).contains(&mu), "{mf:?} at {x} gave {mu}");
        }
    }

    #[test]
    fn crisp_output_stays_in_range(service in 0.0..=10.0f64, food in 0.0..=10.0f64) {
        let tip = tipper().infer(&values(service, food)).unwrap().outputs["tip"];
        prop_assert!((0.0..=30.0).contains(&tip));
    }
}
