//! Defuzzificação
//!
//! Converte o conjunto agregado (amostrado nos pontos do universo) em um
//! valor nítido. O conjunto é tratado como função linear por partes entre
//! pontos consecutivos.
//!
//! ```text
//!   μ
//!   1 ┤      ╭──╮
//!     │     ╱    ╲___
//!     │    ╱         ╲
//!   0 ┼───┴───────────┴──── x
//!              ▲
//!           centróide
//! ```

use serde::{Deserialize, Serialize};

/// Estratégia de defuzzificação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Defuzzifier {
    /// Centro de gravidade (área ponderada)
    #[default]
    Centroid,
    /// Ponto que divide a área em duas metades
    Bisector,
    /// Média dos pontos de máximo
    MeanOfMaximum,
    /// Menor ponto de máximo
    SmallestOfMaximum,
    /// Maior ponto de máximo
    LargestOfMaximum,
}

impl Defuzzifier {
    /// Aplica a estratégia; `None` se o conjunto for identicamente nulo
    pub fn apply(&self, xs: &[f64], ys: &[f64]) -> Option<f64> {
        if xs.is_empty() || xs.len() != ys.len() || ys.iter().all(|&y| y <= 0.0) {
            return None;
        }
        match self {
            Defuzzifier::Centroid => centroid(xs, ys),
            Defuzzifier::Bisector => bisector(xs, ys),
            Defuzzifier::MeanOfMaximum => {
                let maxima = maxima(xs, ys);
                Some(maxima.iter().sum::<f64>() / maxima.len() as f64)
            }
            Defuzzifier::SmallestOfMaximum => maxima(xs, ys).first().copied(),
            Defuzzifier::LargestOfMaximum => maxima(xs, ys).last().copied(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Defuzzifier::Centroid => "centroid",
            Defuzzifier::Bisector => "bisector",
            Defuzzifier::MeanOfMaximum => "mean_of_maximum",
            Defuzzifier::SmallestOfMaximum => "smallest_of_maximum",
            Defuzzifier::LargestOfMaximum => "largest_of_maximum",
        }
    }
}

/// Centróide integrando segmento a segmento
///
/// Cada segmento `[x1, x2]` é um trapézio (retângulo + triângulo); o momento
/// e a área são somados em forma fechada.
pub fn centroid(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() == 1 {
        return (ys[0] > 0.0).then_some(xs[0]);
    }

    let mut moment = 0.0;
    let mut area = 0.0;

    for i in 0..xs.len() - 1 {
        let (x1, x2) = (xs[i], xs[i + 1]);
        let (y1, y2) = (ys[i], ys[i + 1]);
        let width = x2 - x1;

        let (centre, segment_area) = if y1 == y2 {
            (0.5 * (x1 + x2), width * y1)
        } else if y1 == 0.0 {
            (x1 + 2.0 / 3.0 * width, 0.5 * width * y2)
        } else if y2 == 0.0 {
            (x1 + 1.0 / 3.0 * width, 0.5 * width * y1)
        } else {
            (
                (2.0 / 3.0 * width * (y2 + 0.5 * y1)) / (y1 + y2) + x1,
                0.5 * width * (y1 + y2),
            )
        };

        moment += centre * segment_area;
        area += segment_area;
    }

    (area > 0.0).then(|| moment / area)
}

/// Bissetor: posição onde a área acumulada atinge metade do total
pub fn bisector(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() == 1 {
        return (ys[0] > 0.0).then_some(xs[0]);
    }

    let areas: Vec<f64> = xs
        .windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| 0.5 * (x[1] - x[0]) * (y[0] + y[1]))
        .collect();
    let total: f64 = areas.iter().sum();
    if total <= 0.0 {
        return None;
    }

    let half = total / 2.0;
    let mut accumulated = 0.0;
    for (i, &segment) in areas.iter().enumerate() {
        if accumulated + segment >= half {
            let target = half - accumulated;
            let (x1, x2) = (xs[i], xs[i + 1]);
            let (y1, y2) = (ys[i], ys[i + 1]);
            let width = x2 - x1;
            let slope = (y2 - y1) / width;
            // y1·t + slope·t²/2 = target
            let t = if slope.abs() < f64::EPSILON {
                if y1 > 0.0 { target / y1 } else { 0.0 }
            } else {
                let disc = (y1 * y1 + 2.0 * slope * target).max(0.0);
                (-y1 + disc.sqrt()) / slope
            };
            return Some(x1 + t.clamp(0.0, width));
        }
        accumulated += segment;
    }
    xs.last().copied()
}

fn maxima(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let peak = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    xs.iter()
        .zip(ys)
        .filter(|(_, y)| **y == peak)
        .map(|(&x, _)| x)
        .collect()
}
