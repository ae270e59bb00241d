//! Histerese por faixa
//!
//! Guarda o último valor aplicado em cada faixa controlada. Um candidato só
//! chega ao atuador se a faixa ainda não tem valor ou se `|v' - v| >= limiar`.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// Limiar de mudança padrão (unidades de tempo)
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 3.0;

/// Decide se `candidate` passa o filtro dado o último valor aplicado
pub fn passes_threshold(previous: Option<f64>, candidate: f64, threshold: f64) -> bool {
    match previous {
        None => true,
        Some(value) => (candidate - value).abs() >= threshold,
    }
}

/// Último valor aplicado por faixa
///
/// Mutado apenas pelo laço de controle após uma aplicação bem-sucedida.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LaneHysteresisState {
    lanes: BTreeMap<String, Option<f64>>,
}

impl LaneHysteresisState {
    /// Estado com todas as faixas sem valor
    pub fn new<I, L>(lanes: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            lanes: lanes.into_iter().map(|l| (l.into(), None)).collect(),
        }
    }

    /// Último valor aplicado na faixa
    pub fn get(&self, lane: &str) -> Option<f64> {
        self.lanes.get(lane).copied().flatten()
    }

    /// `true` se o candidato deve ser aplicado na faixa
    pub fn should_apply(&self, lane: &str, candidate: f64, threshold: f64) -> bool {
        passes_threshold(self.get(lane), candidate, threshold)
    }

    /// Registra aplicação
    pub fn record(&mut self, lane: &str, value: f64) {
        self.lanes.insert(lane.to_string(), Some(value));
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.lanes.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_output_always_applied() {
        let state = LaneHysteresisState::new(["a", "b"]);
        assert!(state.should_apply("a", 0.1, DEFAULT_CHANGE_THRESHOLD));
        assert!(state.should_apply("b", 1000.0, DEFAULT_CHANGE_THRESHOLD));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut state = LaneHysteresisState::new(["a"]);
        state.record("a", 20.0);
        assert!(!state.should_apply("a", 22.9, 3.0));
        assert!(state.should_apply("a", 23.0, 3.0));
        assert!(state.should_apply("a", 17.0, 3.0));
        assert!(!state.should_apply("a", 17.5, 3.0));
    }

    #[test]
    fn test_record_replaces_in_place() {
        let mut state = LaneHysteresisState::new(["a"]);
        state.record("a", 10.0);
        state.record("a", 14.0);
        assert_eq!(state.get("a"), Some(14.0));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_zero_threshold_applies_every_change() {
        assert!(passes_threshold(Some(10.0), 10.0, 0.0));
        assert!(passes_threshold(Some(10.0), 10.01, 0.0));
    }

    proptest! {
        #[test]
        fn prop_applied_values_respect_threshold(
            candidates in prop::collection::vec(0.0f64..120.0, 1..60),
            threshold in 0.0f64..10.0,
        ) {
            let mut state = LaneHysteresisState::new(["a"]);
            let mut applied = Vec::new();
            for c in candidates {
                if state.should_apply("a", c, threshold) {
                    state.record("a", c);
                    applied.push(c);
                }
            }
            prop_assert!(!applied.is_empty());
            for pair in applied.windows(2) {
                prop_assert!((pair[1] - pair[0]).abs() >= threshold);
            }
        }
    }
}
