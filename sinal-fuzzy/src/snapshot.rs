//! Snapshot de entradas
//!
//! Conjunto de leituras correntes, indexado pelo nome da variável
//! antecedente. Ordenado para logs reprodutíveis.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::error::{FuzzyError, FuzzyResult};

/// Leituras de um ciclo de inferência
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    values: BTreeMap<String, f64>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder
    pub fn with(mut self, variable: impl Into<String>, value: f64) -> Self {
        self.insert(variable, value);
        self
    }

    /// Insere ou substitui uma leitura
    pub fn insert(&mut self, variable: impl Into<String>, value: f64) {
        self.values.insert(variable.into(), value);
    }

    pub fn get(&self, variable: &str) -> Option<f64> {
        self.values.get(variable).copied()
    }

    /// Leitura obrigatória (`InputMissing` se ausente)
    pub fn require(&self, variable: &str) -> FuzzyResult<f64> {
        self.get(variable)
            .ok_or_else(|| FuzzyError::InputMissing(variable.to_string()))
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.values.contains_key(variable)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for (k, v) in iter {
            snapshot.insert(k, v);
        }
        snapshot
    }
}
