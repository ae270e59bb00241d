//! Persistência da base de regras (TOML / JSON)
//!
//! Toda carga passa pela validação de [`RuleBase::new`]: limites de
//! universo, vértices e cláusulas voltam exatamente como foram gravados.

use std::path::Path;
use crate::error::{FuzzyError, FuzzyResult};
use crate::rule::RuleBase;

impl RuleBase {
    /// Carrega de TOML
    pub fn from_toml_str(content: &str) -> FuzzyResult<Self> {
        toml::from_str(content).map_err(|e| FuzzyError::Config(format!("Failed to parse rule base TOML: {}", e)))
    }

    /// Serializa em TOML
    pub fn to_toml_string(&self) -> FuzzyResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| FuzzyError::Config(format!("Failed to serialize rule base: {}", e)))
    }

    /// Carrega de JSON
    pub fn from_json_str(content: &str) -> FuzzyResult<Self> {
        serde_json::from_str(content).map_err(|e| FuzzyError::Config(format!("Failed to parse rule base JSON: {}", e)))
    }

    /// Serializa em JSON (indentado)
    pub fn to_json_string(&self) -> FuzzyResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FuzzyError::Config(format!("Failed to serialize rule base: {}", e)))
    }

    /// Carrega de arquivo; `.json` é lido como JSON, o resto como TOML
    pub fn from_file(path: &Path) -> FuzzyResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FuzzyError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }
}
