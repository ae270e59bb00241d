//! Biblioteca de pertinência
//!
//! Conjuntos fuzzy lineares por partes definidos por vértices:
//!
//! | Vértices | Forma | Exemplo |
//! |:---------|:------|:--------|
//! | 3 | Triangular `[a, b, c]` | `[10, 25, 40]` |
//! | 4 | Trapezoidal `[a, b, c, d]` | `[0, 0, 10, 20]` |
//!
//! Formas degeneradas são válidas: `[0, 0, 20]` é um "ombro" esquerdo
//! (grau 1 em 0) e `[30, 50, 50]` um ombro direito.

use serde::{Deserialize, Serialize};
use crate::error::{FuzzyError, FuzzyResult};
use crate::universe::Universe;

/// Nomes convencionais para partições automáticas
const NAMES_3: [&str; 3] = ["poor", "average", "good"];
const NAMES_5: [&str; 5] = ["poor", "mediocre", "average", "decent", "good"];
const NAMES_7: [&str; 7] = [
    "dismal", "poor", "mediocre", "average", "decent", "good", "excellent",
];

/// Forma geométrica do conjunto
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Pé esquerdo, pico, pé direito
    Triangular([f64; 3]),
    /// Pé esquerdo, ombro esquerdo, ombro direito, pé direito
    Trapezoidal([f64; 4]),
}

impl Shape {
    /// Vértices em ordem
    pub fn vertices(&self) -> &[f64] {
        match self {
            Shape::Triangular(v) => v,
            Shape::Trapezoidal(v) => v,
        }
    }

    /// Suporte `[primeiro vértice, último vértice]`
    pub fn support(&self) -> (f64, f64) {
        let v = self.vertices();
        (v[0], v[v.len() - 1])
    }
}

/// Forma persistida do conjunto
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MembershipSpec {
    name: String,
    vertices: Vec<f64>,
}

/// Conjunto fuzzy nomeado
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MembershipSpec", into = "MembershipSpec")]
pub struct MembershipSet {
    name: String,
    shape: Shape,
}

impl MembershipSet {
    /// Cria conjunto a partir de 3 (triangular) ou 4 (trapezoidal) vértices
    pub fn new(name: impl Into<String>, vertices: &[f64]) -> FuzzyResult<Self> {
        let name = name.into();
        let invalid = |reason: String| FuzzyError::InvalidSet {
            name: name.clone(),
            reason,
        };

        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(invalid("vertices must be finite".into()));
        }
        if vertices.windows(2).any(|w| w[1] < w[0]) {
            return Err(invalid(format!(
                "vertices must be non-decreasing, got {:?}",
                vertices
            )));
        }

        let shape = match *vertices {
            [a, b, c] => Shape::Triangular([a, b, c]),
            [a, b, c, d] => Shape::Trapezoidal([a, b, c, d]),
            _ => {
                return Err(invalid(format!(
                    "expected 3 or 4 vertices, got {}",
                    vertices.len()
                )))
            }
        };

        Ok(Self { name, shape })
    }

    /// Conjunto triangular
    pub fn triangular(name: impl Into<String>, a: f64, b: f64, c: f64) -> FuzzyResult<Self> {
        Self::new(name, &[a, b, c])
    }

    /// Conjunto trapezoidal
    pub fn trapezoidal(name: impl Into<String>, a: f64, b: f64, c: f64, d: f64) -> FuzzyResult<Self> {
        Self::new(name, &[a, b, c, d])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn vertices(&self) -> &[f64] {
        self.shape.vertices()
    }

    /// Grau de pertinência sem saturação no universo
    ///
    /// Exato nos vértices: o pico retorna 1.0 e os pés retornam 0.0,
    /// exceto quando pé e pico coincidem (ombro).
    pub fn degree(&self, x: f64) -> f64 {
        match self.shape {
            Shape::Triangular([a, b, c]) => {
                if x == b {
                    1.0
                } else if x > a && x < b {
                    (x - a) / (b - a)
                } else if x > b && x < c {
                    (c - x) / (c - b)
                } else {
                    0.0
                }
            }
            Shape::Trapezoidal([a, b, c, d]) => {
                if x >= b && x <= c {
                    1.0
                } else if x > a && x < b {
                    (x - a) / (b - a)
                } else if x > c && x < d {
                    (d - x) / (d - c)
                } else {
                    0.0
                }
            }
        }
    }

    /// Amostra o conjunto em todos os pontos do universo
    pub fn sample(&self, universe: &Universe) -> Vec<f64> {
        universe.points().map(|x| self.degree(x)).collect()
    }
}

impl TryFrom<MembershipSpec> for MembershipSet {
    type Error = FuzzyError;

    fn try_from(spec: MembershipSpec) -> FuzzyResult<Self> {
        MembershipSet::new(spec.name, &spec.vertices)
    }
}

impl From<MembershipSet> for MembershipSpec {
    fn from(set: MembershipSet) -> Self {
        Self {
            vertices: set.vertices().to_vec(),
            name: set.name,
        }
    }
}

/// Grau de pertinência de `x` em `set`, saturando `x` nos limites do universo
pub fn membership(universe: &Universe, set: &MembershipSet, x: f64) -> f64 {
    set.degree(universe.clamp(x))
}

/// Nomes padrão para `n` partições
pub fn partition_names(n: usize) -> Vec<String> {
    match n {
        3 => NAMES_3.iter().map(|s| s.to_string()).collect(),
        5 => NAMES_5.iter().map(|s| s.to_string()).collect(),
        7 => NAMES_7.iter().map(|s| s.to_string()).collect(),
        _ => (0..n).map(|i| format!("t{}", i)).collect(),
    }
}

/// Divide o universo em `n` triângulos com 50% de sobreposição
///
/// Picos igualmente espaçados de `min` a `max`; cada pé toca o pico vizinho.
/// Os extremos viram ombros (`[min, min, ·]` e `[·, max, max]`).
pub fn auto_partition(universe: &Universe, n: usize) -> FuzzyResult<Vec<MembershipSet>> {
    let names = partition_names(n);
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    auto_partition_named(universe, &refs)
}

/// Como [`auto_partition`], com nomes escolhidos pelo chamador
pub fn auto_partition_named(universe: &Universe, names: &[&str]) -> FuzzyResult<Vec<MembershipSet>> {
    let n = names.len();
    if n < 2 {
        return Err(FuzzyError::InvalidUniverse(format!(
            "auto partition needs at least 2 sets, got {}",
            n
        )));
    }

    let (min, max) = (universe.min(), universe.max());
    let peak = |i: usize| {
        if i == n - 1 {
            max
        } else {
            min + universe.range() * i as f64 / (n - 1) as f64
        }
    };

    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let b = peak(i);
            let a = if i == 0 { min } else { peak(i - 1) };
            let c = if i == n - 1 { max } else { peak(i + 1) };
            MembershipSet::triangular(*name, a, b, c)
        })
        .collect()
}
