//! Mamdani
//!
//! Cada regra recorta (min) o termo consequente na sua força de disparo; os
//! conjuntos recortados são agregados por máximo ponto a ponto no universo
//! da variável de saída e o resultado é defuzzificado.
//!
//! A resolução é o passo do universo consequente.

use serde::{Deserialize, Serialize};
use crate::defuzz::Defuzzifier;
use crate::error::{FuzzyError, FuzzyResult};
use crate::membership::MembershipSet;
use crate::rule::{Consequent, RuleBase};
use crate::snapshot::Snapshot;
use super::{Inference, InferenceEngine};

/// Motor Mamdani (agregação max-min)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MamdaniEngine {
    #[serde(default)]
    pub defuzzifier: Defuzzifier,
}

impl MamdaniEngine {
    pub fn new(defuzzifier: Defuzzifier) -> Self {
        Self { defuzzifier }
    }

    /// Conjunto agregado amostrado: `(pontos, graus)`
    pub fn aggregate(&self, base: &RuleBase, strengths: &[f64]) -> FuzzyResult<(Vec<f64>, Vec<f64>)> {
        let output = base
            .consequent()
            .ok_or_else(|| FuzzyError::Config("mamdani engine needs an output variable".into()))?;

        let mut clipped: Vec<(&MembershipSet, f64)> = Vec::with_capacity(strengths.len());
        for (index, (rule, &strength)) in base.rules().iter().zip(strengths).enumerate() {
            match rule.consequent() {
                Consequent::Term(term) => clipped.push((output.require_term(term)?, strength)),
                Consequent::Crisp(_) => {
                    return Err(FuzzyError::InvalidRule {
                        index,
                        reason: "mamdani engine needs term consequents".into(),
                    })
                }
            }
        }

        let xs: Vec<f64> = output.universe().points().collect();
        let ys = xs
            .iter()
            .map(|&x| {
                clipped
                    .iter()
                    .map(|(set, strength)| strength.min(set.degree(x)))
                    .fold(0.0, f64::max)
            })
            .collect();
        Ok((xs, ys))
    }
}

impl InferenceEngine for MamdaniEngine {
    fn name(&self) -> &'static str {
        "mamdani"
    }

    fn infer(&self, base: &RuleBase, snapshot: &Snapshot) -> FuzzyResult<Inference> {
        let strengths = base.firing_strengths(snapshot)?;
        let (xs, ys) = self.aggregate(base, &strengths)?;

        let output = self.defuzzifier.apply(&xs, &ys).ok_or_else(|| {
            let name = base.consequent().map(|v| v.name().to_string()).unwrap_or_default();
            FuzzyError::UndefinedOutput(name)
        })?;

        Ok(Inference {
            output,
            strengths,
            fallback: false,
        })
    }
}
