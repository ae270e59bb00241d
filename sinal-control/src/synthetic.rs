//! Simulação sintética determinística
//!
//! Modelo de filas por faixa para execuções de demonstração sem simulador
//! externo. Chegadas seguem um perfil de demanda (com janela de pico); a
//! junção alterna verde (duração controlada) e vermelho (fixo), e durante o
//! verde cada faixa descarrega a uma vazão de saturação.
//!
//! ```text
//! chegadas ──► [fila da faixa] ──(verde: vazão de saturação)──► saída
//!                  │
//!                  └─ parados acumulam tempo de espera a cada passo
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::error::{ControlError, ControlResult};
use crate::sensing::ActiveWindow;
use crate::simulation::{SensorMetric, Simulation, SimulationConfig, SimulationLauncher};

/// Limites aceitos para a duração de verde (s)
const MIN_GREEN: f64 = 1.0;
const MAX_GREEN: f64 = 120.0;

/// Perfil de demanda e capacidade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandProfile {
    /// Chegadas por passo por faixa fora do pico
    pub base_rate: f64,
    /// Chegadas por passo por faixa no pico
    pub peak_rate: f64,
    /// Veículos liberados por passo por faixa no verde
    pub saturation_flow: f64,
    /// Duração do vermelho (s)
    pub red_time: f64,
    /// Verde inicial (s)
    pub initial_green: f64,
    /// Janela de pico
    pub peak: Option<ActiveWindow>,
}

impl Default for DemandProfile {
    fn default() -> Self {
        Self {
            base_rate: 0.05,
            peak_rate: 0.2,
            saturation_flow: 0.5,
            red_time: 30.0,
            initial_green: 30.0,
            peak: Some(ActiveWindow { start: 1800, end: 2160 }),
        }
    }
}

impl DemandProfile {
    /// Taxa de chegada no instante `time`
    pub fn rate(&self, time: u64) -> f64 {
        match self.peak {
            Some(window) if window.contains(time) => self.peak_rate,
            _ => self.base_rate,
        }
    }

    fn validate(&self) -> ControlResult<()> {
        let values = [self.base_rate, self.peak_rate, self.saturation_flow, self.red_time, self.initial_green];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ControlError::InvalidConfig("demand profile values must be finite and >= 0".into()));
        }
        if self.saturation_flow == 0.0 {
            return Err(ControlError::InvalidConfig("saturation_flow must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct LaneQueue {
    id: String,
    weight: f64,
    queue: f64,
    halting: f64,
    waiting: f64,
}

/// Simulação de filas
#[derive(Debug, Clone)]
pub struct SyntheticSimulation {
    profile: DemandProfile,
    lanes: Vec<LaneQueue>,
    horizon: u64,
    time: u64,
    green: f64,
    phase_elapsed: f64,
    in_green: bool,
    closed: bool,
}

impl SyntheticSimulation {
    /// Faixas recebem pesos de demanda 1.0, 1.25, 1.5 em rodízio
    pub fn new(lanes: &[String], profile: DemandProfile, horizon: u64) -> ControlResult<Self> {
        profile.validate()?;
        if lanes.is_empty() {
            return Err(ControlError::InvalidConfig("synthetic simulation needs at least one lane".into()));
        }
        let lanes = lanes
            .iter()
            .enumerate()
            .map(|(i, id)| LaneQueue {
                id: id.clone(),
                weight: 1.0 + 0.25 * (i % 3) as f64,
                queue: 0.0,
                halting: 0.0,
                waiting: 0.0,
            })
            .collect();
        let green = profile.initial_green.clamp(MIN_GREEN, MAX_GREEN);
        Ok(Self {
            profile,
            lanes,
            horizon,
            time: 0,
            green,
            phase_elapsed: 0.0,
            in_green: true,
            closed: false,
        })
    }

    /// Veículos ainda na rede
    pub fn queued(&self) -> f64 {
        self.lanes.iter().map(|l| l.queue).sum()
    }

    fn lane(&self, id: &str) -> ControlResult<&LaneQueue> {
        self.lanes.iter().find(|l| l.id == id).ok_or_else(|| ControlError::SensorRead {
            sensor: id.to_string(),
            reason: "unknown lane".into(),
        })
    }

    fn advance_phase(&mut self) {
        self.phase_elapsed += 1.0;
        let limit = if self.in_green { self.green } else { self.profile.red_time };
        if self.phase_elapsed >= limit {
            self.in_green = !self.in_green;
            self.phase_elapsed = 0.0;
        }
    }
}

impl Simulation for SyntheticSimulation {
    fn time(&self) -> ControlResult<u64> {
        Ok(self.time)
    }

    fn step(&mut self) -> ControlResult<()> {
        if self.closed {
            return Err(ControlError::Simulation("simulation is closed".into()));
        }
        let arrivals = if self.time < self.horizon { self.profile.rate(self.time) } else { 0.0 };
        let saturation = self.profile.saturation_flow;
        let green = self.in_green;

        for lane in &mut self.lanes {
            lane.queue += arrivals * lane.weight;
            if green {
                let out = lane.queue.min(saturation);
                if lane.queue > 0.0 {
                    lane.waiting *= (lane.queue - out) / lane.queue;
                }
                lane.queue -= out;
                lane.halting = (lane.queue - saturation).max(0.0);
            } else {
                lane.halting = lane.queue;
            }
            lane.waiting += lane.halting.floor();
        }

        self.time += 1;
        self.advance_phase();
        Ok(())
    }

    fn pending_count(&self) -> ControlResult<usize> {
        let queued = self.queued().ceil() as usize;
        Ok(if self.time < self.horizon { queued + 1 } else { queued })
    }

    fn read_sensor(&self, sensor_id: &str, metric: SensorMetric) -> ControlResult<f64> {
        let lane = self.lane(sensor_id)?;
        Ok(match metric {
            SensorMetric::VehicleCount => lane.queue.round(),
            SensorMetric::HaltingCount => lane.halting.floor(),
            SensorMetric::WaitingTime => lane.waiting,
        })
    }

    fn set_phase_duration(&mut self, _junction_id: &str, seconds: f64) -> ControlResult<()> {
        if !seconds.is_finite() {
            return Err(ControlError::Actuator(format!("invalid phase duration {}", seconds)));
        }
        self.green = seconds.clamp(MIN_GREEN, MAX_GREEN);
        Ok(())
    }

    fn phase_duration(&self, _junction_id: &str) -> ControlResult<f64> {
        Ok(self.green)
    }

    fn close(&mut self) -> ControlResult<()> {
        if !self.closed {
            self.closed = true;
            debug!(time = self.time, queued = self.queued(), "synthetic simulation closed");
        }
        Ok(())
    }
}

/// Inicia [`SyntheticSimulation`]s com um perfil fixo
#[derive(Debug, Clone)]
pub struct SyntheticLauncher {
    pub lanes: Vec<String>,
    pub profile: DemandProfile,
}

impl SyntheticLauncher {
    pub fn new(lanes: Vec<String>, profile: DemandProfile) -> Self {
        Self { lanes, profile }
    }
}

impl SimulationLauncher for SyntheticLauncher {
    type Sim = SyntheticSimulation;

    fn start(&self, config: &SimulationConfig) -> ControlResult<SyntheticSimulation> {
        if let Some(path) = &config.config_path {
            debug!(path = %path.display(), "synthetic simulation ignores external config");
        }
        SyntheticSimulation::new(&self.lanes, self.profile.clone(), config.horizon)
            .map_err(|e| ControlError::Connection(e.to_string()))
    }
}
