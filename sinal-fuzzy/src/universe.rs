//! Universo de discurso
//!
//! Domínio numérico ordenado e igualmente espaçado `[min, max]` com passo
//! `step`. O passo define a resolução com que conjuntos de saída são
//! amostrados na defuzzificação (Mamdani).

use serde::{Deserialize, Serialize};
use crate::error::{FuzzyError, FuzzyResult};

/// Folga numérica na contagem de pontos (evita perder o último ponto por arredondamento)
const STEP_EPSILON: f64 = 1e-9;

/// Máximo de pontos amostrados por universo
pub const MAX_UNIVERSE_POINTS: usize = 100_000;

/// Forma persistida do universo (validada ao desserializar)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct UniverseSpec {
    min: f64,
    max: f64,
    #[serde(default = "default_step")]
    step: f64,
}

fn default_step() -> f64 {
    1.0
}

/// Universo de discurso imutável
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UniverseSpec", into = "UniverseSpec")]
pub struct Universe {
    min: f64,
    max: f64,
    step: f64,
}

impl Universe {
    /// Cria universo `[min, max]` com passo `step`
    pub fn new(min: f64, max: f64, step: f64) -> FuzzyResult<Self> {
        if !min.is_finite() || !max.is_finite() || !step.is_finite() {
            return Err(FuzzyError::InvalidUniverse(format!(
                "bounds and step must be finite, got [{}, {}] step {}",
                min, max, step
            )));
        }
        if max <= min {
            return Err(FuzzyError::InvalidUniverse(format!(
                "max ({}) must be greater than min ({})",
                max, min
            )));
        }
        if step <= 0.0 {
            return Err(FuzzyError::InvalidUniverse(format!(
                "step must be positive, got {}",
                step
            )));
        }
        let points = ((max - min) / step + STEP_EPSILON).floor() + 1.0;
        if points > MAX_UNIVERSE_POINTS as f64 {
            return Err(FuzzyError::InvalidUniverse(format!(
                "[{}, {}] with step {} has {} points, limit is {}",
                min, max, step, points, MAX_UNIVERSE_POINTS
            )));
        }
        Ok(Self { min, max, step })
    }

    /// Universo com passo unitário
    pub fn unit_step(min: f64, max: f64) -> FuzzyResult<Self> {
        Self::new(min, max, 1.0)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Largura do domínio
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Número de pontos amostrados
    pub fn len(&self) -> usize {
        ((self.max - self.min) / self.step + STEP_EPSILON).floor() as usize + 1
    }

    /// Um universo válido nunca é vazio
    pub fn is_empty(&self) -> bool {
        false
    }

    /// i-ésimo ponto (não ultrapassa `max`)
    pub fn point(&self, index: usize) -> f64 {
        (self.min + index as f64 * self.step).min(self.max)
    }

    /// Itera sobre os pontos amostrados
    pub fn points(&self) -> impl Iterator<Item = f64> {
        let universe = *self;
        (0..universe.len()).map(move |i| universe.point(i))
    }

    /// Verifica se o valor está dentro dos limites
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Satura o valor no extremo mais próximo
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

impl TryFrom<UniverseSpec> for Universe {
    type Error = FuzzyError;

    fn try_from(spec: UniverseSpec) -> FuzzyResult<Self> {
        Universe::new(spec.min, spec.max, spec.step)
    }
}

impl From<Universe> for UniverseSpec {
    fn from(universe: Universe) -> Self {
        Self {
            min: universe.min,
            max: universe.max,
            step: universe.step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universe_new() {
        let u = Universe::new(0.0, 50.0, 1.0).unwrap();
        assert_eq!(u.min(), 0.0);
        assert_eq!(u.max(), 50.0);
        assert_eq!(u.len(), 51);
    }

    #[test]
    fn test_universe_invalid() {
        assert!(Universe::new(10.0, 0.0, 1.0).is_err());
        assert!(Universe::new(0.0, 10.0, 0.0).is_err());
        assert!(Universe::new(0.0, 10.0, -1.0).is_err());
        assert!(Universe::new(f64::NAN, 10.0, 1.0).is_err());
    }

    #[test]
    fn test_universe_point_limit() {
        assert!(Universe::new(0.0, 1.0, 1e-9).is_err());
        assert!(Universe::new(0.0, 99_999.0, 1.0).is_ok());
        assert!(Universe::new(0.0, 100_000.0, 1.0).is_err());
        let json = r#"{"min": 0.0, "max": 59.0, "step": 0.000001}"#;
        assert!(serde_json::from_str::<Universe>(json).is_err());
    }

    #[test]
    fn test_universe_points() {
        let u = Universe::new(5.0, 59.0, 1.0).unwrap();
        let points: Vec<f64> = u.points().collect();
        assert_eq!(points.len(), 55);
        assert_eq!(points[0], 5.0);
        assert_eq!(*points.last().unwrap(), 59.0);
    }

    #[test]
    fn test_universe_fractional_step() {
        let u = Universe::new(0.0, 1.0, 0.1).unwrap();
        assert_eq!(u.len(), 11);
        assert_eq!(u.point(10), 1.0);
    }

    #[test]
    fn test_universe_clamp() {
        let u = Universe::unit_step(0.0, 100.0).unwrap();
        assert_eq!(u.clamp(-5.0), 0.0);
        assert_eq!(u.clamp(140.0), 100.0);
        assert_eq!(u.clamp(42.5), 42.5);
        assert!(u.contains(100.0));
        assert!(!u.contains(100.1));
    }

    #[test]
    fn test_universe_serde_rejects_invalid() {
        let json = r#"{"min": 10.0, "max": 0.0, "step": 1.0}"#;
        assert!(serde_json::from_str::<Universe>(json).is_err());

        let json = r#"{"min": 0.0, "max": 10.0}"#;
        let u: Universe = serde_json::from_str(json).unwrap();
        assert_eq!(u.step(), 1.0);
    }
}
