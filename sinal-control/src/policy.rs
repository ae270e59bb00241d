//! Políticas de duração de verde
//!
//! Uma política transforma o agregado de sensores de um passo em uma
//! [`Decision`]. O laço aplica histerese, atuador e telemetria.
//!
//! | Política | Decisão |
//! |:---------|:--------|
//! | [`FuzzyPolicy`] | inferência Sugeno ou Mamdani sobre uma `RuleBase` |
//! | [`LinearPolicy`] | modelo linear saturado (geração de dados de treino) |
//! | [`FixedTimePolicy`] | nunca atua; observa a duração do plano fixo |

use serde::{Deserialize, Serialize};
use sinal_fuzzy::{Engine, FuzzyError, InferenceEngine, RuleBase};
use crate::error::{ControlError, ControlResult};
use crate::sensing::{InputNames, TrafficSnapshot};

/// Resultado da política para um passo
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Candidato a aplicar
    Apply {
        output: f64,
        strengths: Option<Vec<f64>>,
        fallback: bool,
    },
    /// Saída indefinida (agregado Mamdani nulo)
    Undefined,
    /// Sem controle: apenas registrar a duração corrente do simulador
    Observe,
}

/// Tratamento de `UndefinedOutput` pelo laço
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedOutputPolicy {
    /// Mantém a última saída (nada é aplicado)
    #[default]
    HoldPrevious,
    /// Usa um valor fixo como candidato
    Fallback(f64),
    /// Descarta o passo
    Skip,
}

/// Estratégia de decisão do laço
pub trait DurationPolicy {
    /// Nome para logs e resumo
    fn name(&self) -> &str;

    /// Decide a duração a partir do agregado do passo
    fn decide(&self, traffic: &TrafficSnapshot) -> ControlResult<Decision>;

    /// `true` se a política consome a amostra de pico
    fn needs_peak(&self) -> bool {
        false
    }

    /// `true` se toda decisão vai ao atuador, sem filtro de histerese
    fn bypasses_hysteresis(&self) -> bool {
        false
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FUZZY
// ═══════════════════════════════════════════════════════════════════════════════

/// Política fuzzy: motor + base de regras + mapeamento de entradas
#[derive(Debug, Clone)]
pub struct FuzzyPolicy {
    engine: Engine,
    base: RuleBase,
    inputs: InputNames,
    name: String,
}

impl FuzzyPolicy {
    /// Valida que toda variável usada pelas regras é alimentada pelo laço
    pub fn new(engine: Engine, base: RuleBase, inputs: InputNames) -> ControlResult<Self> {
        let provided = inputs.provided();
        if let Some(missing) = base.required_inputs().into_iter().find(|r| !provided.contains(r)) {
            return Err(ControlError::InvalidConfig(format!(
                "rule base needs input '{}' which the loop does not provide",
                missing
            )));
        }
        let name = format!("fuzzy-{}", engine.name());
        Ok(Self {
            engine,
            base,
            inputs,
            name,
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn rule_base(&self) -> &RuleBase {
        &self.base
    }

    pub fn inputs(&self) -> &InputNames {
        &self.inputs
    }
}

impl DurationPolicy for FuzzyPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, traffic: &TrafficSnapshot) -> ControlResult<Decision> {
        let snapshot = traffic.to_inputs(&self.inputs);
        match self.engine.infer(&self.base, &snapshot) {
            Ok(inference) => Ok(Decision::Apply {
                output: inference.output,
                strengths: Some(inference.strengths),
                fallback: inference.fallback,
            }),
            Err(FuzzyError::UndefinedOutput(_)) => Ok(Decision::Undefined),
            Err(e) => Err(e.into()),
        }
    }

    fn needs_peak(&self) -> bool {
        self.inputs
            .peak
            .as_deref()
            .is_some_and(|peak| self.base.required_inputs().contains(peak))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LINEAR
// ═══════════════════════════════════════════════════════════════════════════════

/// `clamp(base + a·veículos + b·espera + c·maior_faixa, min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearPolicy {
    pub intercept: f64,
    pub vehicles_weight: f64,
    pub waiting_weight: f64,
    pub lane_peak_weight: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for LinearPolicy {
    fn default() -> Self {
        Self {
            intercept: 10.0,
            vehicles_weight: 0.5,
            waiting_weight: 0.2,
            lane_peak_weight: 0.1,
            min: 5.0,
            max: 60.0,
        }
    }
}

impl LinearPolicy {
    pub fn green_time(&self, vehicles: f64, waiting: f64, lane_peak: f64) -> f64 {
        let raw = self.intercept
            + self.vehicles_weight * vehicles
            + self.waiting_weight * waiting
            + self.lane_peak_weight * lane_peak;
        raw.max(self.min).min(self.max)
    }
}

impl DurationPolicy for LinearPolicy {
    fn name(&self) -> &str {
        "linear"
    }

    fn decide(&self, traffic: &TrafficSnapshot) -> ControlResult<Decision> {
        Ok(Decision::Apply {
            output: self.green_time(traffic.vehicles, traffic.waiting_time, traffic.max_lane_vehicles),
            strengths: None,
            fallback: false,
        })
    }

    /// Dados de treino registram a duração aplicada em todo passo
    fn bypasses_hysteresis(&self) -> bool {
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FIXED
// ═══════════════════════════════════════════════════════════════════════════════

/// Plano fixo do simulador (linha de base)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedTimePolicy;

impl DurationPolicy for FixedTimePolicy {
    fn name(&self) -> &str {
        "fixed"
    }

    fn decide(&self, _traffic: &TrafficSnapshot) -> ControlResult<Decision> {
        Ok(Decision::Observe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sinal_fuzzy::{Rule, SugenoEngine, Universe, Variable};

    fn base() -> RuleBase {
        let vehicles = Variable::antecedent("num_vehicles", Universe::unit_step(0.0, 50.0).unwrap())
            .with_term("low", &[0.0, 0.0, 20.0])
            .unwrap()
            .with_term("high", &[30.0, 50.0, 50.0])
            .unwrap();
        RuleBase::sugeno(
            vec![vehicles],
            vec![
                Rule::crisp(&[("num_vehicles", "low")], 10.0),
                Rule::crisp(&[("num_vehicles", "high")], 55.0),
            ],
        )
        .unwrap()
    }

    fn traffic(vehicles: f64) -> TrafficSnapshot {
        TrafficSnapshot {
            vehicles,
            ..Default::default()
        }
    }

    #[test]
    fn test_fuzzy_policy_decides() {
        let policy = FuzzyPolicy::new(SugenoEngine::default().into(), base(), InputNames::default()).unwrap();
        assert_eq!(policy.name(), "fuzzy-sugeno");
        match policy.decide(&traffic(50.0)).unwrap() {
            Decision::Apply { output, strengths, fallback } => {
                assert_eq!(output, 55.0);
                assert_eq!(strengths, Some(vec![0.0, 1.0]));
                assert!(!fallback);
            }
            other => panic!("unexpected decision {:?}", other),
        }
    }

    #[test]
    fn test_fuzzy_policy_rejects_unprovided_input() {
        let inputs = InputNames {
            vehicles: "vehicles".into(),
            ..Default::default()
        };
        let result = FuzzyPolicy::new(SugenoEngine::default().into(), base(), inputs);
        assert!(matches!(result, Err(ControlError::InvalidConfig(_))));
    }

    #[test]
    fn test_fuzzy_policy_does_not_need_unused_peak() {
        let policy = FuzzyPolicy::new(SugenoEngine::default().into(), base(), InputNames::with_peak()).unwrap();
        assert!(!policy.needs_peak());
    }

    #[test]
    fn test_linear_policy_clamps() {
        let policy = LinearPolicy::default();
        assert_eq!(policy.green_time(0.0, 0.0, 0.0), 10.0);
        assert_eq!(policy.green_time(10.0, 20.0, 5.0), 10.0 + 5.0 + 4.0 + 0.5);
        assert_eq!(policy.green_time(200.0, 0.0, 0.0), 60.0);
        assert_eq!(
            LinearPolicy { intercept: -50.0, ..Default::default() }.green_time(0.0, 0.0, 0.0),
            5.0
        );
    }

    #[test]
    fn test_linear_policy_partial_config() {
        #[derive(Deserialize)]
        struct Holder {
            linear: LinearPolicy,
        }
        let h: Holder = toml::from_str("[linear]\nmax = 90.0").unwrap();
        assert_eq!(h.linear.max, 90.0);
        assert_eq!(h.linear.intercept, 10.0);
        assert_eq!(h.linear.vehicles_weight, 0.5);
        assert!(h.linear.bypasses_hysteresis());
        assert!(!FixedTimePolicy.bypasses_hysteresis());
    }

    #[test]
    fn test_fixed_policy_observes() {
        assert_eq!(FixedTimePolicy.decide(&traffic(12.0)).unwrap(), Decision::Observe);
    }

    #[test]
    fn test_undefined_output_policy_serde() {
        #[derive(Deserialize)]
        struct Holder {
            policy: UndefinedOutputPolicy,
        }
        let h: Holder = toml::from_str("policy = \"skip\"").unwrap();
        assert_eq!(h.policy, UndefinedOutputPolicy::Skip);
        let h: Holder = toml::from_str("policy = { fallback = 12.5 }").unwrap();
        assert_eq!(h.policy, UndefinedOutputPolicy::Fallback(12.5));
        assert_eq!(UndefinedOutputPolicy::default(), UndefinedOutputPolicy::HoldPrevious);
    }
}
