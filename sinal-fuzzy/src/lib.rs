//! # 🌫️ sinal-fuzzy — Motor de Inferência Fuzzy
//!
//! Biblioteca de pertinência, base de regras (t-norma mínimo) e dois motores
//! de inferência intercambiáveis: Mamdani (agregação max-min + defuzzificação)
//! e Takagi-Sugeno (média ponderada de consequentes nítidos).
//!
//! ## Arquitetura
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                  RuleBase                      │
//! │  ┌────────────┐   ┌────────────┐   ┌────────┐  │
//! │  │ Variable   │ … │ Variable   │   │ Rule[] │  │
//! │  │ (Universe, │   │ (Universe, │   │ AND →  │  │
//! │  │  terms)    │   │  terms)    │   │ then   │  │
//! │  └────────────┘   └────────────┘   └────────┘  │
//! └────────────────────────────────────────────────┘
//!          ↓  fire(rule, snapshot) = min(μ)
//! ┌────────────────────────────────────────────────┐
//! │     InferenceEngine: Sugeno │ Mamdani          │
//! └────────────────────────────────────────────────┘
//!          ↓
//!     saída nítida (f64)
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use sinal_fuzzy::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let load = Variable::antecedent("load", Universe::unit_step(0.0, 10.0)?)
//!     .with_term("low", &[0.0, 0.0, 5.0])?
//!     .with_term("high", &[5.0, 10.0, 10.0])?;
//!
//! let base = RuleBase::sugeno(
//!     vec![load],
//!     vec![
//!         Rule::crisp(&[("load", "low")], 2.0),
//!         Rule::crisp(&[("load", "high")], 8.0),
//!     ],
//! )?;
//!
//! let output = infer(&SugenoEngine::default(), &base, &Snapshot::new().with("load", 2.5))?;
//! assert_eq!(output, 2.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Garantias
//!
//! - Graus sempre em `[0, 1]`; entradas fora do universo são saturadas
//! - Sugeno sem regra ativa devolve a saída default (não divide por zero)
//! - Mamdani com agregado nulo sinaliza `UndefinedOutput`
//! - Motores sem estado mutável: mesma entrada, mesma saída

pub mod error;
pub mod universe;
pub mod membership;
pub mod variable;
pub mod snapshot;
pub mod rule;
pub mod defuzz;
pub mod engine;
pub mod persist;
pub mod prelude;

pub use error::{FuzzyError, FuzzyResult};
pub use universe::{Universe, MAX_UNIVERSE_POINTS};
pub use membership::{auto_partition, auto_partition_named, membership, partition_names, MembershipSet, Shape};
pub use variable::{Variable, VariableKind};
pub use snapshot::Snapshot;
pub use rule::{Clause, Consequent, Rule, RuleBase, RuleBaseSpec, RuleStyle};
pub use defuzz::Defuzzifier;
pub use engine::{
    infer, Engine, Inference, InferenceEngine, MamdaniEngine, SugenoEngine, DEFAULT_SUGENO_OUTPUT,
};
