//! # Prelude
//!
//! ```
//! use sinal_fuzzy::prelude::*;
//! ```

pub use crate::error::{FuzzyError, FuzzyResult};
pub use crate::universe::Universe;
pub use crate::membership::{auto_partition, membership, MembershipSet};
pub use crate::variable::{Variable, VariableKind};
pub use crate::snapshot::Snapshot;
pub use crate::rule::{Clause, Consequent, Rule, RuleBase, RuleStyle};
pub use crate::defuzz::Defuzzifier;
pub use crate::engine::{infer, Engine, Inference, InferenceEngine, MamdaniEngine, SugenoEngine};
