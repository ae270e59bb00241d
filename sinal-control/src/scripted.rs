//! Simulação roteirizada (quadro a quadro)
//!
//! Cada passo expõe o próximo quadro de leituras. Útil para testes: o
//! roteiro é exato e o registro compartilhado guarda comandos do atuador e fechamentos.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use serde::{Deserialize, Serialize};
use crate::error::{ControlError, ControlResult};
use crate::simulation::{SensorMetric, Simulation};

/// Leituras de uma faixa em um quadro
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LaneFrame {
    pub vehicles: f64,
    pub halting: f64,
    pub waiting: f64,
}

/// Leituras de todas as faixas em um passo
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub lanes: BTreeMap<String, LaneFrame>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder
    pub fn lane(mut self, lane: &str, vehicles: f64, halting: f64, waiting: f64) -> Self {
        self.lanes.insert(
            lane.to_string(),
            LaneFrame {
                vehicles,
                halting,
                waiting,
            },
        );
        self
    }

    /// Mesmas leituras em todas as faixas
    pub fn uniform(lanes: &[&str], vehicles: f64, halting: f64, waiting: f64) -> Self {
        lanes
            .iter()
            .fold(Self::new(), |frame, lane| frame.lane(lane, vehicles, halting, waiting))
    }
}

/// Registro observável da simulação roteirizada
#[derive(Debug, Clone, Default)]
pub struct ScriptLog {
    /// `(tempo, junção, duração)` de cada comando do atuador
    pub phase_updates: Vec<(u64, String, f64)>,
    /// Número de chamadas efetivas a `close`
    pub closes: usize,
    /// Passos executados
    pub steps: usize,
}

pub type SharedScriptLog = Rc<RefCell<ScriptLog>>;

/// Simulação roteirizada
#[derive(Debug)]
pub struct ScriptedSimulation {
    frames: Vec<Frame>,
    cursor: usize,
    time: u64,
    phase_duration: f64,
    fail_at_step: Option<usize>,
    closed: bool,
    log: SharedScriptLog,
}

impl ScriptedSimulation {
    /// Um passo por quadro, tempo iniciando em 0
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            cursor: 0,
            time: 0,
            phase_duration: 30.0,
            fail_at_step: None,
            closed: false,
            log: Rc::new(RefCell::new(ScriptLog::default())),
        }
    }

    /// Tempo simulado inicial
    pub fn starting_at(mut self, time: u64) -> Self {
        self.time = time;
        self
    }

    /// Duração de fase reportada antes de qualquer comando
    pub fn with_phase_duration(mut self, seconds: f64) -> Self {
        self.phase_duration = seconds;
        self
    }

    /// Faz `step` falhar no passo `index` (0-based)
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at_step = Some(index);
        self
    }

    /// Registro compartilhado (permanece válida após o simulador ser consumido)
    pub fn shared_log(&self) -> SharedScriptLog {
        Rc::clone(&self.log)
    }

    fn current(&self) -> ControlResult<&Frame> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.frames.get(i))
            .ok_or_else(|| ControlError::Simulation("no frame before the first step".into()))
    }
}

impl Simulation for ScriptedSimulation {
    fn time(&self) -> ControlResult<u64> {
        Ok(self.time)
    }

    fn step(&mut self) -> ControlResult<()> {
        if self.closed {
            return Err(ControlError::Simulation("simulation is closed".into()));
        }
        if self.fail_at_step == Some(self.cursor) {
            return Err(ControlError::Simulation(format!("scripted failure at step {}", self.cursor)));
        }
        if self.cursor >= self.frames.len() {
            return Err(ControlError::Simulation("script exhausted".into()));
        }
        self.cursor += 1;
        self.time += 1;
        self.log.borrow_mut().steps += 1;
        Ok(())
    }

    fn pending_count(&self) -> ControlResult<usize> {
        Ok(self.frames.len() - self.cursor)
    }

    fn read_sensor(&self, sensor_id: &str, metric: SensorMetric) -> ControlResult<f64> {
        let lane = self
            .current()?
            .lanes
            .get(sensor_id)
            .ok_or_else(|| ControlError::SensorRead {
                sensor: sensor_id.to_string(),
                reason: "unknown lane".into(),
            })?;
        Ok(match metric {
            SensorMetric::VehicleCount => lane.vehicles,
            SensorMetric::HaltingCount => lane.halting,
            SensorMetric::WaitingTime => lane.waiting,
        })
    }

    fn set_phase_duration(&mut self, junction_id: &str, seconds: f64) -> ControlResult<()> {
        self.phase_duration = seconds;
        self.log
            .borrow_mut()
            .phase_updates
            .push((self.time, junction_id.to_string(), seconds));
        Ok(())
    }

    fn phase_duration(&self, _junction_id: &str) -> ControlResult<f64> {
        Ok(self.phase_duration)
    }

    fn close(&mut self) -> ControlResult<()> {
        if !self.closed {
            self.closed = true;
            self.log.borrow_mut().closes += 1;
        }
        Ok(())
    }
}
