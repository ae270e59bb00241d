//! Motores de inferência
//!
//! Duas estratégias atrás de um único contrato `infer(base, snapshot)`:
//!
//! ```text
//! Snapshot ──► RuleBase::firing_strengths ──┬──► Sugeno : Σ(w·z) / Σw
//!                                           └──► Mamdani: max(min(w, μ)) ──► defuzz
//! ```
//!
//! Os motores não conhecem a semântica do domínio: variáveis e regras são
//! dados injetados.

mod mamdani;
mod sugeno;

pub use mamdani::MamdaniEngine;
pub use sugeno::{SugenoEngine, DEFAULT_SUGENO_OUTPUT};

use serde::{Deserialize, Serialize};
use crate::error::FuzzyResult;
use crate::rule::RuleBase;
use crate::snapshot::Snapshot;

/// Resultado de uma inferência
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inference {
    /// Saída nítida
    pub output: f64,
    /// Força de disparo por regra (ordem da base)
    pub strengths: Vec<f64>,
    /// `true` quando a saída veio da política de fallback (Sugeno com Σw = 0)
    pub fallback: bool,
}

/// Contrato comum dos motores
pub trait InferenceEngine {
    /// Nome da estratégia (para logs)
    fn name(&self) -> &'static str;

    /// Executa a inferência completa
    fn infer(&self, base: &RuleBase, snapshot: &Snapshot) -> FuzzyResult<Inference>;

    /// Apenas a saída nítida
    fn output(&self, base: &RuleBase, snapshot: &Snapshot) -> FuzzyResult<f64> {
        self.infer(base, snapshot).map(|i| i.output)
    }
}

/// Estratégia selecionável em configuração
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Engine {
    Sugeno(SugenoEngine),
    Mamdani(MamdaniEngine),
}

impl Default for Engine {
    fn default() -> Self {
        Engine::Sugeno(SugenoEngine::default())
    }
}

impl InferenceEngine for Engine {
    fn name(&self) -> &'static str {
        match self {
            Engine::Sugeno(e) => e.name(),
            Engine::Mamdani(e) => e.name(),
        }
    }

    fn infer(&self, base: &RuleBase, snapshot: &Snapshot) -> FuzzyResult<Inference> {
        match self {
            Engine::Sugeno(e) => e.infer(base, snapshot),
            Engine::Mamdani(e) => e.infer(base, snapshot),
        }
    }
}

impl From<SugenoEngine> for Engine {
    fn from(engine: SugenoEngine) -> Self {
        Engine::Sugeno(engine)
    }
}

impl From<MamdaniEngine> for Engine {
    fn from(engine: MamdaniEngine) -> Self {
        Engine::Mamdani(engine)
    }
}

/// Atalho: saída nítida de `engine` para `snapshot`
pub fn infer(engine: &impl InferenceEngine, base: &RuleBase, snapshot: &Snapshot) -> FuzzyResult<f64> {
    engine.output(base, snapshot)
}
