//! # 🚦 sinal-control — Controle Adaptativo de Semáforo
//!
//! Laço de controle em tempo discreto que lê sensores de faixa de um
//! simulador, infere a duração de verde com um motor fuzzy e a aplica ao
//! semáforo quando a mudança supera o limiar de histerese.
//!
//! ## Arquitetura
//!
//! ```text
//!   Simulation ──► read_lanes ──► TrafficSnapshot ──► DurationPolicy
//!       ▲                              (+ pico)            │
//!       │                                                  ▼
//!   set_phase_duration ◄── LaneHysteresisState ◄──── Decision
//!                                                          │
//!                                                          ▼
//!                                                   TelemetrySink
//! ```
//!
//! | Módulo | Responsabilidade |
//! |:-------|:-----------------|
//! | [`simulation`] | contrato do simulador, lançador, guarda de fechamento |
//! | [`sensing`] | agregação de faixas, janela ativa, amostragem de pico |
//! | [`hysteresis`] | limiar de mudança por faixa |
//! | [`policy`] | políticas fuzzy, linear e de plano fixo |
//! | [`controller`] | máquina de estados do laço e resumo da execução |
//! | [`telemetry`] | destinos JSONL, memória e dados de treino |
//! | [`scenario`] | arquivo `sinal.toml` |
//! | [`presets`] | bases de regras de tráfego |
//! | [`synthetic`] / [`scripted`] | simuladores embutidos |
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use sinal_control::{MemorySink, PolicyKind, Scenario, SimulationConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut scenario = Scenario::for_policy(PolicyKind::Sugeno);
//! scenario.simulation = SimulationConfig { horizon: 120, ..Default::default() };
//!
//! let mut control = scenario.build_loop()?;
//! let mut sink = MemorySink::new();
//! let summary = control.run(&scenario.synthetic_launcher(), &scenario.simulation, &mut sink)?;
//! assert_eq!(summary.samples as usize, sink.samples.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod simulation;
pub mod scripted;
pub mod synthetic;
pub mod sensing;
pub mod hysteresis;
pub mod policy;
pub mod telemetry;
pub mod controller;
pub mod presets;
pub mod scenario;

pub use error::{ControlError, ControlResult};
pub use simulation::{SensorMetric, Simulation, SimulationConfig, SimulationGuard, SimulationLauncher};
pub use scripted::{Frame, LaneFrame, ScriptLog, SharedScriptLog, ScriptedSimulation};
pub use synthetic::{DemandProfile, SyntheticLauncher, SyntheticSimulation};
pub use sensing::{count_vehicles, read_lanes, ActiveWindow, InputNames, LaneReading, PeakWindow, TrafficSnapshot};
pub use hysteresis::{passes_threshold, LaneHysteresisState, DEFAULT_CHANGE_THRESHOLD};
pub use policy::{Decision, DurationPolicy, FixedTimePolicy, FuzzyPolicy, LinearPolicy, UndefinedOutputPolicy};
pub use telemetry::{ControlSample, JsonlSink, MemorySink, NullSink, TelemetrySink, TrainingRecord, TrainingSink};
pub use controller::{
    ControlConfig, ControlLoop, LoopState, RunSummary, WatchConfig, WatchSample, DEFAULT_WATCH_PERIOD,
};
pub use scenario::{EngineSection, PolicyKind, Scenario, DEFAULT_PEAK_PERIOD, PEAK_WINDOW, SCENARIO_FILE};
