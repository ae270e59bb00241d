//! Variáveis linguísticas
//!
//! Uma variável agrupa conjuntos fuzzy sobre um mesmo universo e é marcada
//! como antecedente (entrada) ou consequente (saída).

use serde::{Deserialize, Serialize};
use crate::error::{FuzzyError, FuzzyResult};
use crate::membership::{auto_partition, auto_partition_named, membership, MembershipSet};
use crate::universe::Universe;

/// Papel da variável nas regras
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Antecedent,
    Consequent,
}

/// Variável linguística
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    kind: VariableKind,
    universe: Universe,
    #[serde(default)]
    terms: Vec<MembershipSet>,
}

impl Variable {
    /// Cria variável sem termos
    pub fn new(name: impl Into<String>, kind: VariableKind, universe: Universe) -> Self {
        Self {
            name: name.into(),
            kind,
            universe,
            terms: Vec::new(),
        }
    }

    /// Variável de entrada
    pub fn antecedent(name: impl Into<String>, universe: Universe) -> Self {
        Self::new(name, VariableKind::Antecedent, universe)
    }

    /// Variável de saída
    pub fn consequent(name: impl Into<String>, universe: Universe) -> Self {
        Self::new(name, VariableKind::Consequent, universe)
    }

    /// Adiciona termo por vértices (builder)
    pub fn with_term(mut self, name: &str, vertices: &[f64]) -> FuzzyResult<Self> {
        self.add_term(MembershipSet::new(name, vertices)?)?;
        Ok(self)
    }

    /// Substitui os termos por `n` partições automáticas
    pub fn with_auto_partition(mut self, n: usize) -> FuzzyResult<Self> {
        self.terms = auto_partition(&self.universe, n)?;
        Ok(self)
    }

    /// Substitui os termos por partições automáticas nomeadas
    pub fn with_named_partition(mut self, names: &[&str]) -> FuzzyResult<Self> {
        self.terms = auto_partition_named(&self.universe, names)?;
        Ok(self)
    }

    /// Adiciona termo
    pub fn add_term(&mut self, set: MembershipSet) -> FuzzyResult<()> {
        if self.term(set.name()).is_some() {
            return Err(FuzzyError::DuplicateTerm {
                variable: self.name.clone(),
                term: set.name().to_string(),
            });
        }
        self.terms.push(set);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn terms(&self) -> &[MembershipSet] {
        &self.terms
    }

    /// Busca termo pelo nome
    pub fn term(&self, name: &str) -> Option<&MembershipSet> {
        self.terms.iter().find(|t| t.name() == name)
    }

    /// Busca termo, falhando com `UnknownTerm`
    pub fn require_term(&self, name: &str) -> FuzzyResult<&MembershipSet> {
        self.term(name).ok_or_else(|| FuzzyError::UnknownTerm {
            variable: self.name.clone(),
            term: name.to_string(),
        })
    }

    /// Grau de `value` no termo `term` (valor saturado no universo)
    pub fn degree(&self, term: &str, value: f64) -> FuzzyResult<f64> {
        if value.is_nan() {
            return Err(FuzzyError::InvalidInput {
                variable: self.name.clone(),
                value,
            });
        }
        let set = self.require_term(term)?;
        Ok(membership(&self.universe, set, value))
    }

    /// Fuzzifica o valor em todos os termos
    pub fn fuzzify(&self, value: f64) -> Vec<(&str, f64)> {
        self.terms
            .iter()
            .map(|t| (t.name(), membership(&self.universe, t, value)))
            .collect()
    }

    /// Valida a variável isoladamente
    pub(crate) fn validate(&self) -> FuzzyResult<()> {
        if self.name.trim().is_empty() {
            return Err(FuzzyError::Config("variable name must not be empty".into()));
        }
        if self.terms.is_empty() {
            return Err(FuzzyError::Config(format!(
                "variable '{}' has no terms",
                self.name
            )));
        }
        for (i, term) in self.terms.iter().enumerate() {
            if self.terms[..i].iter().any(|t| t.name() == term.name()) {
                return Err(FuzzyError::DuplicateTerm {
                    variable: self.name.clone(),
                    term: term.name().to_string(),
                });
            }
        }
        Ok(())
    }
}
