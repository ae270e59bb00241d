//! Base de regras e força de disparo
//!
//! Cada regra é uma conjunção (AND) de cláusulas `variável é termo` com um
//! único consequente: constante nítida (Sugeno) ou termo da variável de
//! saída (Mamdani). A força de disparo é o mínimo dos graus das cláusulas.
//!
//! A ordem das regras não altera resultados, mas é preservada para logs.

use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};
use crate::error::{FuzzyError, FuzzyResult};
use crate::snapshot::Snapshot;
use crate::variable::{Variable, VariableKind};

/// Cláusula `variable IS term`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clause {
    pub variable: String,
    pub term: String,
}

impl Clause {
    pub fn new(variable: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            term: term.into(),
        }
    }
}

/// Consequente da regra
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Consequent {
    /// Constante nítida (Takagi-Sugeno de ordem zero)
    Crisp(f64),
    /// Termo da variável consequente (Mamdani)
    Term(String),
}

/// Estilo da base de regras, deduzido dos consequentes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStyle {
    Sugeno,
    Mamdani,
}

/// Regra fuzzy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    then: Consequent,
    when: Vec<Clause>,
}

impl Rule {
    pub fn new(when: Vec<Clause>, then: Consequent) -> Self {
        Self { then, when }
    }

    /// Regra Sugeno: `(var, termo)...` → constante
    pub fn crisp(clauses: &[(&str, &str)], value: f64) -> Self {
        Self::new(to_clauses(clauses), Consequent::Crisp(value))
    }

    /// Regra Mamdani: `(var, termo)...` → termo de saída
    pub fn term(clauses: &[(&str, &str)], term: &str) -> Self {
        Self::new(to_clauses(clauses), Consequent::Term(term.to_string()))
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.when
    }

    pub fn consequent(&self) -> &Consequent {
        &self.then
    }
}

fn to_clauses(clauses: &[(&str, &str)]) -> Vec<Clause> {
    clauses.iter().map(|(v, t)| Clause::new(*v, *t)).collect()
}

/// Forma persistida (validada ao carregar)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleBaseSpec {
    pub antecedents: Vec<Variable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consequent: Option<Variable>,
    pub rules: Vec<Rule>,
}

/// Base de regras imutável com assinatura fixa de antecedentes/consequente
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RuleBaseSpec", into = "RuleBaseSpec")]
pub struct RuleBase {
    antecedents: Vec<Variable>,
    consequent: Option<Variable>,
    rules: Vec<Rule>,
    style: RuleStyle,
}

impl RuleBase {
    /// Base Sugeno (consequentes nítidos)
    pub fn sugeno(antecedents: Vec<Variable>, rules: Vec<Rule>) -> FuzzyResult<Self> {
        Self::new(antecedents, None, rules)
    }

    /// Base Mamdani (consequentes são termos de `consequent`)
    pub fn mamdani(antecedents: Vec<Variable>, consequent: Variable, rules: Vec<Rule>) -> FuzzyResult<Self> {
        Self::new(antecedents, Some(consequent), rules)
    }

    /// Cria e valida a base
    pub fn new(antecedents: Vec<Variable>, consequent: Option<Variable>, rules: Vec<Rule>) -> FuzzyResult<Self> {
        let style = validate(&antecedents, consequent.as_ref(), &rules)?;
        Ok(Self {
            antecedents,
            consequent,
            rules,
            style,
        })
    }

    pub fn antecedents(&self) -> &[Variable] {
        &self.antecedents
    }

    pub fn consequent(&self) -> Option<&Variable> {
        self.consequent.as_ref()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn style(&self) -> RuleStyle {
        self.style
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Busca antecedente pelo nome
    pub fn antecedent(&self, name: &str) -> Option<&Variable> {
        self.antecedents.iter().find(|v| v.name() == name)
    }

    /// Variáveis efetivamente usadas pelas regras
    pub fn required_inputs(&self) -> BTreeSet<&str> {
        self.rules
            .iter()
            .flat_map(|r| r.clauses().iter().map(|c| c.variable.as_str()))
            .collect()
    }

    /// Força de disparo: mínimo dos graus das cláusulas
    pub fn fire(&self, rule: &Rule, snapshot: &Snapshot) -> FuzzyResult<f64> {
        let mut strength = 1.0_f64;
        for clause in rule.clauses() {
            let variable = self
                .antecedent(&clause.variable)
                .ok_or_else(|| FuzzyError::UnknownVariable(clause.variable.clone()))?;
            let value = snapshot.require(&clause.variable)?;
            strength = strength.min(variable.degree(&clause.term, value)?);
        }
        Ok(strength)
    }

    /// Forças de disparo de todas as regras, na ordem da base
    pub fn firing_strengths(&self, snapshot: &Snapshot) -> FuzzyResult<Vec<f64>> {
        self.rules.iter().map(|r| self.fire(r, snapshot)).collect()
    }

    /// Nova base com as regras em outra ordem (mesma assinatura)
    pub fn with_rules(&self, rules: Vec<Rule>) -> FuzzyResult<Self> {
        Self::new(self.antecedents.clone(), self.consequent.clone(), rules)
    }
}

impl TryFrom<RuleBaseSpec> for RuleBase {
    type Error = FuzzyError;

    fn try_from(spec: RuleBaseSpec) -> FuzzyResult<Self> {
        RuleBase::new(spec.antecedents, spec.consequent, spec.rules)
    }
}

impl From<RuleBase> for RuleBaseSpec {
    fn from(base: RuleBase) -> Self {
        Self {
            antecedents: base.antecedents,
            consequent: base.consequent,
            rules: base.rules,
        }
    }
}

fn validate(antecedents: &[Variable], consequent: Option<&Variable>, rules: &[Rule]) -> FuzzyResult<RuleStyle> {
    if antecedents.is_empty() {
        return Err(FuzzyError::Config("rule base needs at least one antecedent".into()));
    }
    for (i, variable) in antecedents.iter().enumerate() {
        variable.validate()?;
        if variable.kind() != VariableKind::Antecedent {
            return Err(FuzzyError::Config(format!(
                "variable '{}' is not an antecedent",
                variable.name()
            )));
        }
        if antecedents[..i].iter().any(|v| v.name() == variable.name()) {
            return Err(FuzzyError::Config(format!(
                "duplicate antecedent '{}'",
                variable.name()
            )));
        }
    }
    if let Some(output) = consequent {
        output.validate()?;
        if output.kind() != VariableKind::Consequent {
            return Err(FuzzyError::Config(format!(
                "variable '{}' is not a consequent",
                output.name()
            )));
        }
    }
    if rules.is_empty() {
        return Err(FuzzyError::Config("rule base has no rules".into()));
    }

    let style = match consequent {
        None => RuleStyle::Sugeno,
        Some(_) => RuleStyle::Mamdani,
    };

    for (index, rule) in rules.iter().enumerate() {
        let invalid = |reason: String| FuzzyError::InvalidRule { index, reason };

        if rule.clauses().is_empty() {
            return Err(invalid("rule has no clauses".into()));
        }
        for clause in rule.clauses() {
            let variable = antecedents
                .iter()
                .find(|v| v.name() == clause.variable)
                .ok_or_else(|| FuzzyError::UnknownVariable(clause.variable.clone()))?;
            variable.require_term(&clause.term)?;
        }
        match (rule.consequent(), consequent) {
            (Consequent::Crisp(value), None) => {
                if !value.is_finite() {
                    return Err(invalid(format!("crisp consequent must be finite, got {}", value)));
                }
            }
            (Consequent::Term(term), Some(output)) => {
                output.require_term(term)?;
            }
            (Consequent::Crisp(_), Some(output)) => {
                return Err(invalid(format!(
                    "crisp consequent in a rule base with output variable '{}'",
                    output.name()
                )));
            }
            (Consequent::Term(term), None) => {
                return Err(invalid(format!(
                    "term consequent '{}' without an output variable",
                    term
                )));
            }
        }
    }

    Ok(style)
}
