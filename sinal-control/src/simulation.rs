//! Fronteira com o simulador externo
//!
//! O laço consome o simulador apenas por este contrato: relógio, contagem de
//! entidades pendentes, sensores por faixa e o atuador do semáforo.
//!
//! ```text
//! SimulationLauncher::start ──► S: Simulation ──► SimulationGuard<S>
//!                                                   │ Drop / close()
//!                                                   ▼
//!                                              close() uma única vez
//! ```

use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::error::ControlResult;

/// Métrica lida de um sensor de faixa
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorMetric {
    /// Veículos na faixa no último passo
    VehicleCount,
    /// Veículos parados (comprimento da fila)
    HaltingCount,
    /// Tempo de espera acumulado na faixa (s)
    WaitingTime,
}

impl SensorMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorMetric::VehicleCount => "vehicle_count",
            SensorMetric::HaltingCount => "halting_count",
            SensorMetric::WaitingTime => "waiting_time",
        }
    }
}

/// Parâmetros de inicialização do simulador
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Arquivo de configuração do simulador externo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
    /// Abrir interface gráfica
    #[serde(default)]
    pub gui: bool,
    /// Horizonte de chegadas da simulação sintética (passos)
    #[serde(default = "default_horizon")]
    pub horizon: u64,
}

fn default_horizon() -> u64 {
    3600
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            gui: false,
            horizon: default_horizon(),
        }
    }
}

/// Simulador de tráfego em tempo discreto
pub trait Simulation {
    /// Tempo simulado corrente
    fn time(&self) -> ControlResult<u64>;

    /// Avança um passo (pode bloquear)
    fn step(&mut self) -> ControlResult<()>;

    /// Entidades ainda esperadas; zero encerra o laço
    fn pending_count(&self) -> ControlResult<usize>;

    /// Leitura de um sensor de faixa
    fn read_sensor(&self, sensor_id: &str, metric: SensorMetric) -> ControlResult<f64>;

    /// Define a duração da fase corrente do semáforo
    fn set_phase_duration(&mut self, junction_id: &str, seconds: f64) -> ControlResult<()>;

    /// Duração da fase corrente
    fn phase_duration(&self, junction_id: &str) -> ControlResult<f64>;

    /// Libera o simulador (idempotente)
    fn close(&mut self) -> ControlResult<()>;
}

/// Inicia simuladores
pub trait SimulationLauncher {
    type Sim: Simulation;

    /// Falha com `ControlError::Connection` se o simulador não sobe
    fn start(&self, config: &SimulationConfig) -> ControlResult<Self::Sim>;
}

impl<F, S> SimulationLauncher for F
where
    F: Fn(&SimulationConfig) -> ControlResult<S>,
    S: Simulation,
{
    type Sim = S;

    fn start(&self, config: &SimulationConfig) -> ControlResult<S> {
        self(config)
    }
}

/// Posse escopada do simulador: `close()` é chamado exatamente uma vez,
/// explicitamente ou no `Drop`.
pub struct SimulationGuard<S: Simulation> {
    sim: S,
    closed: bool,
}

impl<S: Simulation> SimulationGuard<S> {
    pub fn new(sim: S) -> Self {
        Self { sim, closed: false }
    }

    /// Fecha o simulador; chamadas seguintes são no-op
    pub fn close(&mut self) -> ControlResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!("closing simulation");
        self.sim.close()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<S: Simulation> Deref for SimulationGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.sim
    }
}

impl<S: Simulation> DerefMut for SimulationGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.sim
    }
}

impl<S: Simulation> Drop for SimulationGuard<S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to close simulation");
        }
    }
}
