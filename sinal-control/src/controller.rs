//! # Laço de controle adaptativo
//!
//! Máquina de estados `Idle → Running → Finished`, avaliada a cada passo
//! pela contagem de entidades pendentes do simulador.
//!
//! ```text
//!   ┌──────┐ pending > 0 ┌─────────┐ pending == 0 ┌──────────┐
//!   │ Idle │────────────►│ Running │─────────────►│ Finished │
//!   └──────┘             └─────────┘              └──────────┘
//!       │                 pending == 0                 ▲
//!       └──────────────────────────────────────────────┘
//! ```
//!
//! Por passo em `Running`:
//!
//! 1. lê o tempo e avança o relógio (única suspensão)
//! 2. agrega os sensores (+ amostra de pico nas fronteiras de período)
//! 3. consulta a política
//! 4. filtra por histerese em cada faixa (salvo se a política dispensa) e atua
//! 5. anexa um [`ControlSample`] à telemetria
//!
//! O simulador é fechado exatamente uma vez em qualquer caminho de saída.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use crate::error::{ControlError, ControlResult};
use crate::hysteresis::{LaneHysteresisState, DEFAULT_CHANGE_THRESHOLD};
use crate::policy::{Decision, DurationPolicy, UndefinedOutputPolicy};
use crate::sensing::{count_vehicles, read_lanes, ActiveWindow, PeakWindow, TrafficSnapshot};
use crate::simulation::{Simulation, SimulationConfig, SimulationGuard, SimulationLauncher};
use crate::telemetry::{ControlSample, TelemetrySink};

/// Período padrão do grupo observado (passos)
pub const DEFAULT_WATCH_PERIOD: u64 = 150;

/// Estado do laço
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopState {
    Idle,
    Running,
    Finished,
}

/// Grupo de faixas observado a cada `period` passos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    pub lanes: Vec<String>,
    #[serde(default = "default_watch_period")]
    pub period: u64,
}

fn default_watch_period() -> u64 {
    DEFAULT_WATCH_PERIOD
}

/// Configuração do laço
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Junção semafórica controlada
    pub junction_id: String,
    /// Faixas de entrada (sensores e histerese)
    pub lanes: Vec<String>,
    /// Limiar de histerese
    #[serde(default = "default_change_threshold")]
    pub change_threshold: f64,
    /// Período de amostragem do pico
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_period: Option<u64>,
    /// Tratamento de saída indefinida
    #[serde(default)]
    pub undefined_output: UndefinedOutputPolicy,
    /// Janela de tempo em que o laço atua
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_window: Option<ActiveWindow>,
    /// Grupo observado
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch: Option<WatchConfig>,
}

fn default_change_threshold() -> f64 {
    DEFAULT_CHANGE_THRESHOLD
}

impl ControlConfig {
    pub fn new(junction_id: impl Into<String>, lanes: Vec<String>) -> Self {
        Self {
            junction_id: junction_id.into(),
            lanes,
            change_threshold: DEFAULT_CHANGE_THRESHOLD,
            peak_period: None,
            undefined_output: UndefinedOutputPolicy::default(),
            active_window: None,
            watch: None,
        }
    }

    /// Valida limites e coerência
    pub fn validate(&self) -> ControlResult<()> {
        if self.junction_id.trim().is_empty() {
            return Err(ControlError::InvalidConfig("junction_id must not be empty".into()));
        }
        if self.lanes.is_empty() {
            return Err(ControlError::InvalidConfig("at least one lane is required".into()));
        }
        if !self.change_threshold.is_finite() || self.change_threshold < 0.0 {
            return Err(ControlError::InvalidConfig(format!(
                "change_threshold must be finite and >= 0, got {}",
                self.change_threshold
            )));
        }
        if self.peak_period == Some(0) {
            return Err(ControlError::InvalidConfig("peak_period must be positive".into()));
        }
        if let Some(window) = self.active_window {
            ActiveWindow::new(window.start, window.end)?;
        }
        if let Some(watch) = &self.watch {
            if watch.period == 0 || watch.lanes.is_empty() {
                return Err(ControlError::InvalidConfig(
                    "watch needs at least one lane and a positive period".into(),
                ));
            }
        }
        if let UndefinedOutputPolicy::Fallback(value) = self.undefined_output {
            if !value.is_finite() {
                return Err(ControlError::InvalidConfig("fallback output must be finite".into()));
            }
        }
        Ok(())
    }
}

/// Variação do grupo observado em relação a duas amostras atrás
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WatchSample {
    pub step: u64,
    pub vehicles: f64,
    pub delta: f64,
}

/// Resumo de uma execução
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub policy: String,
    pub state: LoopState,
    pub steps: u64,
    /// Amostras anexadas com sucesso
    pub samples: u64,
    /// Comandos enviados ao atuador (um por faixa aprovada)
    pub applied_updates: u64,
    pub telemetry_failures: u64,
    pub undefined_outputs: u64,
    pub fallbacks: u64,
    /// Veículos somados dentro da janela ativa
    pub window_vehicles: f64,
    /// Veículos somados em toda a simulação
    pub total_vehicles: f64,
    pub last_output: Option<f64>,
    pub peak_samples: Vec<f64>,
    pub watch: Vec<WatchSample>,
    pub hysteresis: LaneHysteresisState,
}

impl RunSummary {
    fn new(policy: &str, hysteresis: LaneHysteresisState) -> Self {
        Self {
            policy: policy.to_string(),
            state: LoopState::Idle,
            steps: 0,
            samples: 0,
            applied_updates: 0,
            telemetry_failures: 0,
            undefined_outputs: 0,
            fallbacks: 0,
            window_vehicles: 0.0,
            total_vehicles: 0.0,
            last_output: None,
            peak_samples: Vec::new(),
            watch: Vec::new(),
            hysteresis,
        }
    }
}

#[derive(Debug, Default)]
struct WatchTracker {
    prev: f64,
    prev2: f64,
}

/// Laço de controle
pub struct ControlLoop {
    config: ControlConfig,
    policy: Box<dyn DurationPolicy>,
    state: LoopState,
}

impl ControlLoop {
    /// Valida a configuração contra a política
    pub fn new(config: ControlConfig, policy: Box<dyn DurationPolicy>) -> ControlResult<Self> {
        config.validate()?;
        if policy.needs_peak() && config.peak_period.is_none() {
            return Err(ControlError::InvalidConfig(format!(
                "policy '{}' needs a peak input but no peak_period is configured",
                policy.name()
            )));
        }
        Ok(Self {
            config,
            policy,
            state: LoopState::Idle,
        })
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Inicia o simulador e executa até o fim
    ///
    /// Falha de inicialização é fatal: o laço nunca entra em `Running`.
    pub fn run<L: SimulationLauncher>(
        &mut self,
        launcher: &L,
        sim_config: &SimulationConfig,
        sink: &mut dyn TelemetrySink,
    ) -> ControlResult<RunSummary> {
        let sim = launcher.start(sim_config).map_err(|e| {
            error!(error = %e, "failed to start simulation");
            match e {
                ControlError::Connection(_) => e,
                other => ControlError::Connection(other.to_string()),
            }
        })?;
        self.run_on(sim, sink)
    }

    /// Executa sobre um simulador já iniciado (assume a posse e o fecha)
    pub fn run_on<S: Simulation>(&mut self, sim: S, sink: &mut dyn TelemetrySink) -> ControlResult<RunSummary> {
        let mut guard = SimulationGuard::new(sim);
        let result = self.drive(&mut *guard, sink);
        let closed = guard.close();
        let summary = result?;
        closed?;
        Ok(summary)
    }

    fn drive<S: Simulation>(&mut self, sim: &mut S, sink: &mut dyn TelemetrySink) -> ControlResult<RunSummary> {
        let config = &self.config;
        let mut hysteresis = LaneHysteresisState::new(config.lanes.iter().cloned());
        let mut summary = RunSummary::new(self.policy.name(), hysteresis.clone());
        let mut peak = match (self.policy.needs_peak(), config.peak_period) {
            (true, Some(period)) => Some(PeakWindow::new(period)?),
            _ => None,
        };
        let mut watch = WatchTracker::default();
        let mut last_output: Option<f64> = None;

        self.state = LoopState::Idle;
        info!(
            policy = self.policy.name(),
            junction = %config.junction_id,
            lanes = config.lanes.len(),
            threshold = config.change_threshold,
            "control loop starting"
        );

        loop {
            let pending = sim.pending_count()?;
            if pending == 0 {
                self.state = LoopState::Finished;
                break;
            }
            if self.state == LoopState::Idle {
                self.state = LoopState::Running;
                debug!(pending, "control loop running");
            }

            let step = summary.steps;
            let time = sim.time()?;
            sim.step()?;
            summary.steps += 1;

            let readings = read_lanes(&*sim, &config.lanes)?;
            let mut traffic = TrafficSnapshot::from_lanes(time, &readings);
            summary.total_vehicles += traffic.vehicles;

            if let Some(w) = &config.watch {
                if step % w.period == 0 {
                    let vehicles = count_vehicles(&*sim, &w.lanes)?;
                    let delta = vehicles - watch.prev2;
                    summary.watch.push(WatchSample { step, vehicles, delta });
                    watch.prev2 = watch.prev;
                    watch.prev = vehicles;
                    debug!(step, vehicles, delta, "watched lanes");
                }
            }

            if let Some(window) = config.active_window {
                if !window.contains(time) {
                    continue;
                }
            }
            summary.window_vehicles += traffic.vehicles;

            if let Some(p) = peak.as_mut() {
                traffic.peak_vehicles = Some(p.observe(time, traffic.vehicles));
            }

            debug!(
                step,
                time,
                vehicles = traffic.vehicles,
                waiting = traffic.waiting_time,
                jam = traffic.jam_length,
                "sensor snapshot"
            );

            let (output, strengths, fallback, actuate) = match self.policy.decide(&traffic)? {
                Decision::Apply { output, strengths, fallback } => (output, strengths, fallback, true),
                Decision::Observe => (sim.phase_duration(&config.junction_id)?, None, false, false),
                Decision::Undefined => {
                    summary.undefined_outputs += 1;
                    match config.undefined_output {
                        UndefinedOutputPolicy::HoldPrevious => match last_output {
                            Some(previous) => {
                                warn!(step, time, held = previous, "undefined output, holding previous value");
                                (previous, None, true, false)
                            }
                            None => {
                                warn!(step, time, "undefined output with no previous value, skipping step");
                                continue;
                            }
                        },
                        UndefinedOutputPolicy::Fallback(value) => {
                            warn!(step, time, fallback = value, "undefined output, using fallback");
                            (value, None, true, true)
                        }
                        UndefinedOutputPolicy::Skip => {
                            warn!(step, time, "undefined output, skipping step");
                            continue;
                        }
                    }
                }
            };
            if fallback {
                summary.fallbacks += 1;
            }

            let mut applied = false;
            if actuate {
                let unfiltered = self.policy.bypasses_hysteresis();
                for lane in &config.lanes {
                    if unfiltered || hysteresis.should_apply(lane, output, config.change_threshold) {
                        sim.set_phase_duration(&config.junction_id, output)?;
                        hysteresis.record(lane, output);
                        summary.applied_updates += 1;
                        applied = true;
                        info!(
                            lane = %lane,
                            green = output,
                            vehicles = traffic.vehicles,
                            waiting = traffic.waiting_time,
                            peak = traffic.peak_vehicles,
                            "phase duration applied"
                        );
                    }
                }
            }
            last_output = Some(output);

            let sample = ControlSample {
                time,
                step,
                vehicles: traffic.vehicles,
                waiting_time: traffic.waiting_time,
                jam_length: traffic.jam_length,
                max_lane_vehicles: traffic.max_lane_vehicles,
                peak_vehicles: traffic.peak_vehicles,
                strengths,
                output,
                applied,
                fallback,
            };
            match sink.append(&sample) {
                Ok(()) => summary.samples += 1,
                Err(e) => {
                    summary.telemetry_failures += 1;
                    warn!(step, error = %e, "telemetry write failed");
                }
            }
        }

        if let Err(e) = sink.flush() {
            summary.telemetry_failures += 1;
            warn!(error = %e, "telemetry flush failed");
        }

        summary.state = self.state;
        summary.last_output = last_output;
        summary.peak_samples = peak.map(|p| p.samples().to_vec()).unwrap_or_default();
        summary.hysteresis = hysteresis;

        info!(
            steps = summary.steps,
            samples = summary.samples,
            applied = summary.applied_updates,
            window_vehicles = summary.window_vehicles,
            total_vehicles = summary.total_vehicles,
            "control loop finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{FixedTimePolicy, LinearPolicy};
    use crate::scripted::{Frame, ScriptedSimulation};
    use crate::telemetry::MemorySink;

    fn config() -> ControlConfig {
        ControlConfig::new("j1", vec!["a".into(), "b".into()])
    }

    #[test]
    fn test_config_validation() {
        assert!(config().validate().is_ok());
        assert!(ControlConfig::new("", vec!["a".into()]).validate().is_err());
        assert!(ControlConfig::new("j", vec![]).validate().is_err());

        let mut c = config();
        c.change_threshold = -1.0;
        assert!(c.validate().is_err());

        let mut c = config();
        c.active_window = Some(ActiveWindow { start: 10, end: 5 });
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_idle_to_finished_without_pending() {
        let mut control = ControlLoop::new(config(), Box::new(LinearPolicy::default())).unwrap();
        let sim = ScriptedSimulation::new(vec![]);
        let log = sim.shared_log();
        let summary = control.run_on(sim, &mut MemorySink::new()).unwrap();
        assert_eq!(summary.steps, 0);
        assert_eq!(summary.state, LoopState::Finished);
        assert_eq!(control.state(), LoopState::Finished);
        assert_eq!(log.borrow().closes, 1);
    }

    #[test]
    fn test_fixed_policy_records_phase_duration() {
        let mut control = ControlLoop::new(config(), Box::new(FixedTimePolicy)).unwrap();
        let frames = vec![Frame::uniform(&["a", "b"], 2.0, 1.0, 3.0); 3];
        let sim = ScriptedSimulation::new(frames).with_phase_duration(42.0);
        let log = sim.shared_log();
        let mut sink = MemorySink::new();
        let summary = control.run_on(sim, &mut sink).unwrap();

        assert_eq!(summary.steps, 3);
        assert_eq!(summary.applied_updates, 0);
        assert!(log.borrow().phase_updates.is_empty());
        assert!(sink.samples.iter().all(|s| s.output == 42.0 && !s.applied));
        assert_eq!(sink.samples[0].jam_length, 2.0);
    }

    #[test]
    fn test_watch_delta_against_two_samples_ago() {
        let mut c = config();
        c.watch = Some(WatchConfig {
            lanes: vec!["a".into()],
            period: 2,
        });
        let mut control = ControlLoop::new(c, Box::new(FixedTimePolicy)).unwrap();
        let frames: Vec<Frame> = [4.0, 0.0, 6.0, 0.0, 9.0]
            .iter()
            .map(|&v| Frame::new().lane("a", v, 0.0, 0.0).lane("b", 0.0, 0.0, 0.0))
            .collect();
        let summary = control.run_on(ScriptedSimulation::new(frames), &mut MemorySink::new()).unwrap();

        let deltas: Vec<(u64, f64)> = summary.watch.iter().map(|w| (w.step, w.delta)).collect();
        // passo 0: 4 - 0; passo 2: 6 - 0; passo 4: 9 - 4
        assert_eq!(deltas, vec![(0, 4.0), (2, 6.0), (4, 5.0)]);
    }
}
