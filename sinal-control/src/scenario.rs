//! Cenário de execução (`sinal.toml`)
//!
//! Reúne a configuração do laço, a escolha do motor, os nomes das entradas,
//! os parâmetros do simulador e, opcionalmente, uma base de regras inline.
//!
//! ```toml
//! [control]
//! junction_id = "J1"
//! lanes = ["a_0", "a_1"]
//! change_threshold = 3.0
//!
//! [engine]
//! kind = "mamdani"
//! defuzzifier = "centroid"
//!
//! [simulation]
//! horizon = 3600
//! ```
//!
//! Sem `[rules]`, a base vem do preset correspondente a `engine.kind`.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use sinal_fuzzy::{
    Defuzzifier, Engine, MamdaniEngine, RuleBase, RuleStyle, SugenoEngine, DEFAULT_SUGENO_OUTPUT,
};
use crate::controller::{ControlConfig, ControlLoop, WatchConfig, DEFAULT_WATCH_PERIOD};
use crate::error::{ControlError, ControlResult};
use crate::policy::{DurationPolicy, FixedTimePolicy, FuzzyPolicy, LinearPolicy};
use crate::presets;
use crate::sensing::{ActiveWindow, InputNames};
use crate::simulation::SimulationConfig;
use crate::synthetic::{DemandProfile, SyntheticLauncher};

/// Nome do arquivo de cenário procurado por [`Scenario::find_and_load`]
pub const SCENARIO_FILE: &str = "sinal.toml";

/// Período de amostragem do pico (s)
pub const DEFAULT_PEAK_PERIOD: u64 = 300;

/// Janela de pico da tarde (s)
pub const PEAK_WINDOW: ActiveWindow = ActiveWindow { start: 1800, end: 2160 };

/// Política de duração escolhida no cenário
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    #[default]
    Sugeno,
    Mamdani,
    /// Mamdani com entrada de pico
    MamdaniPeak,
    /// Plano fixo do simulador
    Fixed,
    /// Modelo linear (dados de treino)
    Linear,
}

impl PolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Sugeno => "sugeno",
            PolicyKind::Mamdani => "mamdani",
            PolicyKind::MamdaniPeak => "mamdani-peak",
            PolicyKind::Fixed => "fixed",
            PolicyKind::Linear => "linear",
        }
    }

    /// Base de regras do preset (`None` para políticas não-fuzzy)
    pub fn preset(&self) -> ControlResult<Option<RuleBase>> {
        let base = match self {
            PolicyKind::Sugeno => presets::sugeno_traffic()?,
            PolicyKind::Mamdani => presets::mamdani_traffic()?,
            PolicyKind::MamdaniPeak => presets::mamdani_peak_traffic()?,
            PolicyKind::Fixed | PolicyKind::Linear => return Ok(None),
        };
        Ok(Some(base))
    }

    fn style(&self) -> Option<RuleStyle> {
        match self {
            PolicyKind::Sugeno => Some(RuleStyle::Sugeno),
            PolicyKind::Mamdani | PolicyKind::MamdaniPeak => Some(RuleStyle::Mamdani),
            PolicyKind::Fixed | PolicyKind::Linear => None,
        }
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = ControlError;

    fn from_str(s: &str) -> ControlResult<Self> {
        match s {
            "sugeno" => Ok(PolicyKind::Sugeno),
            "mamdani" => Ok(PolicyKind::Mamdani),
            "mamdani-peak" => Ok(PolicyKind::MamdaniPeak),
            "fixed" => Ok(PolicyKind::Fixed),
            "linear" => Ok(PolicyKind::Linear),
            other => Err(ControlError::InvalidConfig(format!("unknown engine kind '{}'", other))),
        }
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seção `[engine]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSection {
    #[serde(default)]
    pub kind: PolicyKind,
    /// Saída Sugeno quando nenhuma regra dispara
    #[serde(default = "default_output")]
    pub default_output: f64,
    #[serde(default)]
    pub defuzzifier: Defuzzifier,
    /// Coeficientes da política linear
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linear: Option<LinearPolicy>,
}

fn default_output() -> f64 {
    DEFAULT_SUGENO_OUTPUT
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            kind: PolicyKind::default(),
            default_output: DEFAULT_SUGENO_OUTPUT,
            defuzzifier: Defuzzifier::default(),
            linear: None,
        }
    }
}

/// Cenário completo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub control: ControlConfig,
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub inputs: InputNames,
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Perfil da simulação sintética
    #[serde(default)]
    pub demand: DemandProfile,
    /// Base inline (substitui o preset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<RuleBase>,
}

impl Default for Scenario {
    fn default() -> Self {
        let mut control = ControlConfig::new(presets::JUNCTION_ID, presets::incoming_lanes());
        control.watch = Some(WatchConfig {
            lanes: presets::watch_lanes(),
            period: DEFAULT_WATCH_PERIOD,
        });
        Self {
            control,
            engine: EngineSection::default(),
            inputs: InputNames::default(),
            simulation: SimulationConfig::default(),
            demand: DemandProfile::default(),
            rules: None,
        }
    }
}

impl Scenario {
    /// Cenário padrão ajustado para uma política
    ///
    /// `mamdani-peak` liga a entrada de pico (período 300 s) e restringe o
    /// laço à janela 1800–2160 s; `linear` usa a mesma janela.
    pub fn for_policy(kind: PolicyKind) -> Self {
        let mut scenario = Self::default();
        scenario.set_policy(kind);
        scenario
    }

    /// Troca a política, ajustando entradas e janela
    pub fn set_policy(&mut self, kind: PolicyKind) {
        self.engine.kind = kind;
        match kind {
            PolicyKind::MamdaniPeak => {
                self.inputs = InputNames::with_peak();
                self.control.peak_period = Some(DEFAULT_PEAK_PERIOD);
                self.control.active_window = Some(PEAK_WINDOW);
            }
            PolicyKind::Linear => {
                self.control.active_window = Some(PEAK_WINDOW);
            }
            PolicyKind::Sugeno | PolicyKind::Mamdani | PolicyKind::Fixed => {}
        }
    }

    /// Parse de TOML (revalida)
    pub fn from_toml_str(content: &str) -> ControlResult<Self> {
        let scenario: Self = toml::from_str(content)
            .map_err(|e| ControlError::InvalidConfig(format!("Failed to parse scenario: {}", e)))?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_file(path: &Path) -> ControlResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ControlError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Procura `sinal.toml` subindo a partir de `start_dir`
    pub fn find_and_load(start_dir: &Path) -> ControlResult<Option<(Self, PathBuf)>> {
        for dir in start_dir.ancestors() {
            let path = dir.join(SCENARIO_FILE);
            if path.is_file() {
                return Ok(Some((Self::from_file(&path)?, path)));
            }
        }
        Ok(None)
    }

    pub fn to_toml_string(&self) -> ControlResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ControlError::InvalidConfig(format!("Failed to serialize scenario: {}", e)))
    }

    /// Coerência entre seções
    pub fn validate(&self) -> ControlResult<()> {
        self.control.validate()?;
        if !self.engine.default_output.is_finite() {
            return Err(ControlError::InvalidConfig("engine.default_output must be finite".into()));
        }
        if let (Some(rules), Some(style)) = (&self.rules, self.engine.kind.style()) {
            if rules.style() != style {
                return Err(ControlError::InvalidConfig(format!(
                    "inline rules are {:?} but engine kind is '{}'",
                    rules.style(),
                    self.engine.kind
                )));
            }
        }
        Ok(())
    }

    /// Base de regras efetiva: inline ou preset
    pub fn rule_base(&self) -> ControlResult<Option<RuleBase>> {
        match &self.rules {
            Some(rules) if self.engine.kind.style().is_some() => Ok(Some(rules.clone())),
            _ => self.engine.kind.preset(),
        }
    }

    /// Motor fuzzy da seção `[engine]`
    pub fn engine(&self) -> Option<Engine> {
        match self.engine.kind {
            PolicyKind::Sugeno => Some(SugenoEngine::new(self.engine.default_output).into()),
            PolicyKind::Mamdani | PolicyKind::MamdaniPeak => Some(MamdaniEngine::new(self.engine.defuzzifier).into()),
            PolicyKind::Fixed | PolicyKind::Linear => None,
        }
    }

    /// Política de duração descrita pelo cenário
    pub fn build_policy(&self) -> ControlResult<Box<dyn DurationPolicy>> {
        match self.engine.kind {
            PolicyKind::Fixed => Ok(Box::new(FixedTimePolicy)),
            PolicyKind::Linear => Ok(Box::new(self.engine.linear.unwrap_or_default())),
            kind => {
                let engine = self
                    .engine()
                    .ok_or_else(|| ControlError::InvalidConfig(format!("'{}' has no fuzzy engine", kind)))?;
                let base = self
                    .rule_base()?
                    .ok_or_else(|| ControlError::InvalidConfig(format!("'{}' has no rule base", kind)))?;
                Ok(Box::new(FuzzyPolicy::new(engine, base, self.inputs.clone())?))
            }
        }
    }

    /// Laço pronto para executar
    pub fn build_loop(&self) -> ControlResult<ControlLoop> {
        self.validate()?;
        ControlLoop::new(self.control.clone(), self.build_policy()?)
    }

    /// Lançador da simulação sintética com as faixas do cenário
    pub fn synthetic_launcher(&self) -> SyntheticLauncher {
        SyntheticLauncher::new(self.control.lanes.clone(), self.demand.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario() {
        let scenario = Scenario::default();
        assert_eq!(scenario.control.lanes.len(), 7);
        assert_eq!(scenario.control.change_threshold, 3.0);
        assert_eq!(scenario.engine.kind, PolicyKind::Sugeno);
        assert_eq!(scenario.control.watch.as_ref().map(|w| w.period), Some(150));
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_minimal_toml() {
        let scenario = Scenario::from_toml_str(
            r#"
            [control]
            junction_id = "J1"
            lanes = ["a", "b"]

            [engine]
            kind = "mamdani"
            defuzzifier = "bisector"
            "#,
        )
        .unwrap();
        assert_eq!(scenario.engine.kind, PolicyKind::Mamdani);
        assert_eq!(scenario.engine.defuzzifier, Defuzzifier::Bisector);
        assert_eq!(scenario.engine.default_output, 10.0);
        assert_eq!(scenario.inputs, InputNames::default());
        assert_eq!(scenario.simulation.horizon, 3600);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = Scenario::from_toml_str("[control]\njunction_id = \"\"\nlanes = []");
        assert!(matches!(result, Err(ControlError::InvalidConfig(_))));
        assert!(Scenario::from_toml_str("not toml").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut scenario = Scenario::for_policy(PolicyKind::MamdaniPeak);
        scenario.rules = scenario.rule_base().unwrap();
        let text = scenario.to_toml_string().unwrap();
        let back = Scenario::from_toml_str(&text).unwrap();
        assert_eq!(back, scenario);
    }

    #[test]
    fn test_peak_policy_settings() {
        let scenario = Scenario::for_policy(PolicyKind::MamdaniPeak);
        assert_eq!(scenario.control.peak_period, Some(300));
        assert_eq!(scenario.control.active_window, Some(PEAK_WINDOW));
        assert_eq!(scenario.inputs.peak.as_deref(), Some("peak_vehicles"));
        let control = scenario.build_loop().unwrap();
        assert_eq!(control.policy_name(), "fuzzy-mamdani");
    }

    #[test]
    fn test_peak_policy_without_period_rejected() {
        let mut scenario = Scenario::for_policy(PolicyKind::MamdaniPeak);
        scenario.control.peak_period = None;
        assert!(matches!(scenario.build_loop(), Err(ControlError::InvalidConfig(_))));
    }

    #[test]
    fn test_peak_rules_without_peak_input_rejected() {
        let mut scenario = Scenario::for_policy(PolicyKind::MamdaniPeak);
        scenario.inputs = InputNames::default();
        assert!(matches!(scenario.build_policy(), Err(ControlError::InvalidConfig(_))));
    }

    #[test]
    fn test_inline_rules_style_mismatch() {
        let mut scenario = Scenario::default();
        scenario.rules = PolicyKind::Mamdani.preset().unwrap();
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_policy_kind_parse() {
        assert_eq!("mamdani-peak".parse::<PolicyKind>().unwrap(), PolicyKind::MamdaniPeak);
        assert_eq!(PolicyKind::Linear.to_string(), "linear");
        assert!("neural".parse::<PolicyKind>().is_err());
    }

    #[test]
    fn test_non_fuzzy_policies() {
        assert_eq!(Scenario::for_policy(PolicyKind::Fixed).build_policy().unwrap().name(), "fixed");
        let linear = Scenario::for_policy(PolicyKind::Linear);
        assert_eq!(linear.control.active_window, Some(PEAK_WINDOW));
        assert_eq!(linear.build_policy().unwrap().name(), "linear");
    }

    #[test]
    fn test_find_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        let scenario = Scenario::for_policy(PolicyKind::Mamdani);
        std::fs::write(dir.path().join(SCENARIO_FILE), scenario.to_toml_string().unwrap()).unwrap();

        let (found, path) = Scenario::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(found.engine.kind, PolicyKind::Mamdani);
        assert_eq!(path, dir.path().join(SCENARIO_FILE));
    }
}
