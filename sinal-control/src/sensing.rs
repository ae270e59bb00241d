//! Leitura e agregação de sensores
//!
//! Agrega as faixas de entrada de uma junção em um [`TrafficSnapshot`]:
//!
//! | Campo | Agregação |
//! |:------|:----------|
//! | `vehicles` | soma das contagens |
//! | `waiting_time` | média dos tempos de espera |
//! | `jam_length` | soma dos veículos parados |
//! | `max_lane_vehicles` | maior contagem entre faixas |
//! | `peak_vehicles` | amostra da janela de pico (se configurada) |

use serde::{Deserialize, Serialize};
use sinal_fuzzy::Snapshot;
use crate::error::{ControlError, ControlResult};
use crate::simulation::{SensorMetric, Simulation};

/// Leituras de uma faixa
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneReading {
    pub lane: String,
    pub vehicles: f64,
    pub halting: f64,
    pub waiting: f64,
}

/// Lê as três métricas de cada faixa
pub fn read_lanes<S: Simulation + ?Sized>(sim: &S, lanes: &[String]) -> ControlResult<Vec<LaneReading>> {
    let mut readings = Vec::with_capacity(lanes.len());
    for lane in lanes {
        readings.push(LaneReading {
            lane: lane.clone(),
            vehicles: sim.read_sensor(lane, SensorMetric::VehicleCount)?,
            halting: sim.read_sensor(lane, SensorMetric::HaltingCount)?,
            waiting: sim.read_sensor(lane, SensorMetric::WaitingTime)?,
        });
    }
    Ok(readings)
}

/// Soma das contagens de veículos de um grupo de faixas
pub fn count_vehicles<S: Simulation + ?Sized>(sim: &S, lanes: &[String]) -> ControlResult<f64> {
    lanes
        .iter()
        .map(|lane| sim.read_sensor(lane, SensorMetric::VehicleCount))
        .sum()
}

/// Agregado de um passo
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrafficSnapshot {
    pub time: u64,
    pub vehicles: f64,
    pub waiting_time: f64,
    pub jam_length: f64,
    pub max_lane_vehicles: f64,
    pub peak_vehicles: Option<f64>,
}

impl TrafficSnapshot {
    /// Agrega leituras de faixas
    pub fn from_lanes(time: u64, readings: &[LaneReading]) -> Self {
        let vehicles = readings.iter().map(|r| r.vehicles).sum();
        let waiting_time = if readings.is_empty() {
            0.0
        } else {
            readings.iter().map(|r| r.waiting).sum::<f64>() / readings.len() as f64
        };
        Self {
            time,
            vehicles,
            waiting_time,
            jam_length: readings.iter().map(|r| r.halting).sum(),
            max_lane_vehicles: readings.iter().map(|r| r.vehicles).fold(0.0, f64::max),
            peak_vehicles: None,
        }
    }

    /// Entradas do motor fuzzy, nomeadas conforme `names`
    pub fn to_inputs(&self, names: &InputNames) -> Snapshot {
        let mut snapshot = Snapshot::new()
            .with(names.vehicles.as_str(), self.vehicles)
            .with(names.waiting.as_str(), self.waiting_time);
        if let (Some(name), Some(peak)) = (&names.peak, self.peak_vehicles) {
            snapshot.insert(name.as_str(), peak);
        }
        snapshot
    }
}

/// Nomes das variáveis antecedentes alimentadas pelo laço
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputNames {
    #[serde(default = "default_vehicles")]
    pub vehicles: String,
    #[serde(default = "default_waiting")]
    pub waiting: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak: Option<String>,
}

fn default_vehicles() -> String {
    "num_vehicles".into()
}

fn default_waiting() -> String {
    "waiting_time".into()
}

impl Default for InputNames {
    fn default() -> Self {
        Self {
            vehicles: default_vehicles(),
            waiting: default_waiting(),
            peak: None,
        }
    }
}

impl InputNames {
    /// Nomes padrão com entrada de pico `peak_vehicles`
    pub fn with_peak() -> Self {
        Self {
            peak: Some("peak_vehicles".into()),
            ..Self::default()
        }
    }

    /// Todos os nomes fornecidos
    pub fn provided(&self) -> Vec<&str> {
        let mut names = vec![self.vehicles.as_str(), self.waiting.as_str()];
        if let Some(peak) = &self.peak {
            names.push(peak.as_str());
        }
        names
    }
}

/// Janela de tempo simulado `[start, end]` (inclusiva)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveWindow {
    pub start: u64,
    pub end: u64,
}

impl ActiveWindow {
    pub fn new(start: u64, end: u64) -> ControlResult<Self> {
        if end < start {
            return Err(ControlError::InvalidConfig(format!(
                "active window end ({}) before start ({})",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, time: u64) -> bool {
        time >= self.start && time <= self.end
    }
}

/// Amostragem do pico em fronteiras de período
///
/// Em `time % period == 0` a contagem corrente vira a nova amostra; nos
/// demais passos a última amostra é reutilizada (0 antes da primeira).
#[derive(Debug, Clone, PartialEq)]
pub struct PeakWindow {
    period: u64,
    samples: Vec<f64>,
}

impl PeakWindow {
    pub fn new(period: u64) -> ControlResult<Self> {
        if period == 0 {
            return Err(ControlError::InvalidConfig("peak period must be positive".into()));
        }
        Ok(Self {
            period,
            samples: Vec::new(),
        })
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    /// Valor de pico usado pela inferência neste passo
    pub fn observe(&mut self, time: u64, current_vehicles: f64) -> f64 {
        if time % self.period == 0 {
            self.samples.push(current_vehicles);
            current_vehicles
        } else {
            self.current()
        }
    }

    /// Última amostra (0 se nenhuma)
    pub fn current(&self) -> f64 {
        self.samples.last().copied().unwrap_or(0.0)
    }

    /// Todas as amostras em ordem
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}
