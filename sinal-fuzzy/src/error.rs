//! Erros do motor fuzzy

use thiserror::Error;

pub type FuzzyResult<T> = Result<T, FuzzyError>;

/// Erros de construção e inferência fuzzy
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FuzzyError {
    /// Universo mal definido (limites ou passo)
    #[error("Invalid universe: {0}")]
    InvalidUniverse(String),

    /// Conjunto fuzzy com vértices inválidos
    #[error("Invalid membership set '{name}': {reason}")]
    InvalidSet { name: String, reason: String },

    /// Termo repetido dentro de uma variável
    #[error("Duplicate term '{term}' in variable '{variable}'")]
    DuplicateTerm { variable: String, term: String },

    /// Variável não declarada na base de regras
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// Termo não declarado na variável
    #[error("Unknown term '{term}' for variable '{variable}'")]
    UnknownTerm { variable: String, term: String },

    /// Regra mal formada
    #[error("Invalid rule #{index}: {reason}")]
    InvalidRule { index: usize, reason: String },

    /// Entrada exigida por uma regra ausente no snapshot
    #[error("Input missing for variable '{0}'")]
    InputMissing(String),

    /// Valor de entrada não numérico (NaN)
    #[error("Invalid input for variable '{variable}': {value}")]
    InvalidInput { variable: String, value: f64 },

    /// Conjunto agregado identicamente nulo (Mamdani)
    #[error("Undefined output: aggregate set for '{0}' is empty")]
    UndefinedOutput(String),

    /// Falha de (de)serialização da configuração
    #[error("Config error: {0}")]
    Config(String),
}

impl FuzzyError {
    /// Erro recuperável pelo chamador (segurar valor anterior ou usar default)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FuzzyError::UndefinedOutput(_))
    }
}
