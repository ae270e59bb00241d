//! Erros do laço de controle

use thiserror::Error;
use sinal_fuzzy::FuzzyError;

pub type ControlResult<T> = Result<T, ControlError>;

/// Erros de controle
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Simulação não pôde ser iniciada (fatal, sem retry)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Falha ao avançar ou consultar a simulação
    #[error("Simulation error: {0}")]
    Simulation(String),

    /// Leitura de sensor falhou
    #[error("Sensor read failed for '{sensor}': {reason}")]
    SensorRead { sensor: String, reason: String },

    /// Atuador recusou o comando
    #[error("Actuator error: {0}")]
    Actuator(String),

    /// Erro do motor de inferência
    #[error("Inference error: {0}")]
    Inference(#[from] FuzzyError),

    /// Escrita de telemetria falhou
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// Configuração inválida
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Erro de I/O
    #[error("IO error: {0}")]
    Io(String),
}

impl ControlError {
    /// Entrada exigida por uma regra ausente no snapshot
    pub fn is_input_missing(&self) -> bool {
        matches!(self, ControlError::Inference(FuzzyError::InputMissing(_)))
    }

    /// Agregado Mamdani nulo
    pub fn is_undefined_output(&self) -> bool {
        matches!(self, ControlError::Inference(FuzzyError::UndefinedOutput(_)))
    }
}

impl From<std::io::Error> for ControlError {
    fn from(err: std::io::Error) -> Self {
        ControlError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ControlError::Connection("sumo not found".into());
        assert_eq!(err.to_string(), "Connection error: sumo not found");
    }

    #[test]
    fn test_from_fuzzy_error() {
        let err: ControlError = FuzzyError::InputMissing("peak_vehicles".into()).into();
        assert!(err.is_input_missing());
        assert!(!err.is_undefined_output());
        assert!(err.to_string().contains("peak_vehicles"));
    }

    #[test]
    fn test_undefined_output_classification() {
        let err: ControlError = FuzzyError::UndefinedOutput("green_duration".into()).into();
        assert!(err.is_undefined_output());
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.jsonl");
        let err: ControlError = io.into();
        assert!(matches!(err, ControlError::Io(ref msg) if msg.contains("missing.jsonl")));
    }
}
