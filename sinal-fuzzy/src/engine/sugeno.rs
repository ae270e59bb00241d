//! Takagi-Sugeno de ordem zero
//!
//! Saída = Σ(wᵢ·zᵢ) / Σwᵢ, com `zᵢ` constante nítida da regra `i`.
//! Com Σw = 0 nenhuma regra disparou e o motor devolve `default_output`.

use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::error::{FuzzyError, FuzzyResult};
use crate::rule::{Consequent, RuleBase};
use crate::snapshot::Snapshot;
use super::{Inference, InferenceEngine};

/// Saída quando nenhuma regra dispara (unidades de tempo)
pub const DEFAULT_SUGENO_OUTPUT: f64 = 10.0;

fn default_output() -> f64 {
    DEFAULT_SUGENO_OUTPUT
}

/// Motor Sugeno (média ponderada)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SugenoEngine {
    #[serde(default = "default_output")]
    pub default_output: f64,
}

impl Default for SugenoEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SUGENO_OUTPUT)
    }
}

impl SugenoEngine {
    pub fn new(default_output: f64) -> Self {
        Self { default_output }
    }
}

impl InferenceEngine for SugenoEngine {
    fn name(&self) -> &'static str {
        "sugeno"
    }

    fn infer(&self, base: &RuleBase, snapshot: &Snapshot) -> FuzzyResult<Inference> {
        let strengths = base.firing_strengths(snapshot)?;

        let mut pairs = Vec::with_capacity(strengths.len());
        for (index, (rule, &strength)) in base.rules().iter().zip(&strengths).enumerate() {
            match rule.consequent() {
                Consequent::Crisp(value) => pairs.push((strength, *value)),
                Consequent::Term(term) => {
                    return Err(FuzzyError::InvalidRule {
                        index,
                        reason: format!("sugeno engine needs crisp consequents, got term '{}'", term),
                    })
                }
            }
        }

        // Soma em ordem canônica: resultado independe da ordem das regras
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        let (weighted, total) = pairs
            .iter()
            .fold((0.0, 0.0), |(num, den), (w, z)| (num + w * z, den + w));

        if total == 0.0 {
            debug!(default = self.default_output, "no rule fired, using default output");
            return Ok(Inference {
                output: self.default_output,
                strengths,
                fallback: true,
            });
        }

        Ok(Inference {
            output: weighted / total,
            strengths,
            fallback: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use crate::universe::Universe;
    use crate::variable::Variable;

    fn base() -> RuleBase {
        let level = Variable::antecedent("level", Universe::unit_step(0.0, 10.0).unwrap())
            .with_term("low", &[0.0, 0.0, 5.0])
            .unwrap()
            .with_term("high", &[5.0, 10.0, 10.0])
            .unwrap();
        RuleBase::sugeno(
            vec![level],
            vec![
                Rule::crisp(&[("level", "low")], 2.0),
                Rule::crisp(&[("level", "high")], 8.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_weighted_average() {
        let engine = SugenoEngine::default();
        // low(2.5) = 0.5, high(2.5) = 0
        let result = engine.infer(&base(), &Snapshot::new().with("level", 2.5)).unwrap();
        assert_eq!(result.output, 2.0);
        assert_eq!(result.strengths, vec![0.5, 0.0]);
        assert!(!result.fallback);
    }

    #[test]
    fn test_fallback_when_nothing_fires() {
        let engine = SugenoEngine::new(10.0);
        // Ambos os termos valem 0 exatamente no ponto 5
        let result = engine.infer(&base(), &Snapshot::new().with("level", 5.0)).unwrap();
        assert_eq!(result.output, 10.0);
        assert!(result.fallback);
    }

    #[test]
    fn test_rejects_term_consequents() {
        let level = Variable::antecedent("level", Universe::unit_step(0.0, 10.0).unwrap())
            .with_auto_partition(3)
            .unwrap();
        let out = Variable::consequent("out", Universe::unit_step(0.0, 10.0).unwrap())
            .with_auto_partition(3)
            .unwrap();
        let base = RuleBase::mamdani(vec![level], out, vec![Rule::term(&[("level", "good")], "good")]).unwrap();
        let result = SugenoEngine::default().infer(&base, &Snapshot::new().with("level", 9.0));
        assert!(matches!(result, Err(FuzzyError::InvalidRule { index: 0, .. })));
    }
}
