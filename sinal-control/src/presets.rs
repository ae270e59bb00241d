//! Bases de regras de tráfego
//!
//! Dados injetados no motor: universos, termos e regras das três
//! configurações de controle de verde.
//!
//! | Preset | Motor | Entradas | Regras |
//! |:-------|:------|:---------|:-------|
//! | [`sugeno_traffic`] | Sugeno | veículos, espera | tabela 3×3 |
//! | [`mamdani_traffic`] | Mamdani | veículos, espera | 4 (uma repetida) |
//! | [`mamdani_peak_traffic`] | Mamdani | veículos, espera, pico | 4 (uma com 3 cláusulas) |

use sinal_fuzzy::{FuzzyResult, Rule, RuleBase, Universe, Variable};

/// Junção controlada
pub const JUNCTION_ID: &str = "cluster_249821091_249821092_249821094_26003449_#13more";

/// Faixas de entrada da junção
pub const INCOMING_LANES: [&str; 7] = [
    "1015631885#1_0",
    "188302703#1_0",
    "188302703#1_1",
    "188302703#1_2",
    "-869087990_0",
    "-869087990_1",
    "1015631891#1_0",
];

/// Faixas observadas separadamente
pub const WATCH_LANES: [&str; 3] = ["188302703#1_0", "188302703#1_1", "188302703#1_2"];

pub const VEHICLES: &str = "num_vehicles";
pub const WAITING: &str = "waiting_time";
pub const PEAK: &str = "peak_vehicles";
pub const GREEN: &str = "green_duration";

/// Tabela Sugeno `(veículos, espera) → verde`
const SUGENO_TABLE: [(&str, &str, f64); 9] = [
    ("low", "short", 10.0),
    ("low", "medium", 20.0),
    ("low", "long", 30.0),
    ("medium", "short", 25.0),
    ("medium", "medium", 35.0),
    ("medium", "long", 45.0),
    ("high", "short", 35.0),
    ("high", "medium", 45.0),
    ("high", "long", 55.0),
];

/// Sugeno: veículos 0..50, espera 0..100 s, consequentes nítidos 10–55 s
pub fn sugeno_traffic() -> FuzzyResult<RuleBase> {
    let vehicles = Variable::antecedent(VEHICLES, Universe::unit_step(0.0, 50.0)?)
        .with_term("low", &[0.0, 0.0, 20.0])?
        .with_term("medium", &[10.0, 25.0, 40.0])?
        .with_term("high", &[30.0, 50.0, 50.0])?;
    let waiting = Variable::antecedent(WAITING, Universe::unit_step(0.0, 100.0)?)
        .with_term("short", &[0.0, 0.0, 30.0])?
        .with_term("medium", &[20.0, 50.0, 80.0])?
        .with_term("long", &[60.0, 100.0, 100.0])?;

    let rules = SUGENO_TABLE
        .iter()
        .map(|&(v, w, green)| Rule::crisp(&[(VEHICLES, v), (WAITING, w)], green))
        .collect();

    RuleBase::sugeno(vec![vehicles, waiting], rules)
}

fn green_duration() -> FuzzyResult<Variable> {
    Variable::consequent(GREEN, Universe::unit_step(5.0, 59.0)?)
        .with_term("poor", &[5.0, 5.0, 15.0])?
        .with_term("average", &[10.0, 25.0, 40.0])?
        .with_term("good", &[30.0, 55.0, 55.0])
}

fn mamdani_inputs() -> FuzzyResult<(Variable, Variable)> {
    let vehicles = Variable::antecedent(VEHICLES, Universe::unit_step(0.0, 49.0)?).with_auto_partition(3)?;
    let waiting = Variable::antecedent(WAITING, Universe::unit_step(0.0, 99.0)?).with_auto_partition(3)?;
    Ok((vehicles, waiting))
}

/// Mamdani: antecedentes auto-particionados (poor/average/good)
///
/// A última regra repete a terceira; sob agregação por máximo não altera a saída.
pub fn mamdani_traffic() -> FuzzyResult<RuleBase> {
    let (vehicles, waiting) = mamdani_inputs()?;
    RuleBase::mamdani(
        vec![vehicles, waiting],
        green_duration()?,
        vec![
            Rule::term(&[(VEHICLES, "poor"), (WAITING, "poor")], "poor"),
            Rule::term(&[(VEHICLES, "poor"), (WAITING, "average")], "average"),
            Rule::term(&[(VEHICLES, "good"), (WAITING, "good")], "good"),
            Rule::term(&[(VEHICLES, "good"), (WAITING, "good")], "good"),
        ],
    )
}

/// Mamdani com pico: verde longo só quando o pico amostrado também é alto
pub fn mamdani_peak_traffic() -> FuzzyResult<RuleBase> {
    let (vehicles, waiting) = mamdani_inputs()?;
    let peak = Variable::antecedent(PEAK, Universe::unit_step(0.0, 199.0)?).with_auto_partition(3)?;
    RuleBase::mamdani(
        vec![vehicles, waiting, peak],
        green_duration()?,
        vec![
            Rule::term(&[(VEHICLES, "poor"), (WAITING, "poor")], "poor"),
            Rule::term(&[(VEHICLES, "poor"), (WAITING, "average")], "average"),
            Rule::term(&[(VEHICLES, "good"), (WAITING, "good"), (PEAK, "good")], "good"),
            Rule::term(&[(VEHICLES, "good"), (WAITING, "good")], "average"),
        ],
    )
}

/// Faixas de entrada como `Vec<String>`
pub fn incoming_lanes() -> Vec<String> {
    INCOMING_LANES.iter().map(|s| s.to_string()).collect()
}

/// Faixas observadas como `Vec<String>`
pub fn watch_lanes() -> Vec<String> {
    WATCH_LANES.iter().map(|s| s.to_string()).collect()
}
