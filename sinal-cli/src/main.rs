//! Sinal - fuzzy traffic-signal control
//! Command-line interface for running control scenarios and querying the engines

use std::io::Write;
use std::path::{Path, PathBuf};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use sinal_control::{
    JsonlSink, NullSink, PolicyKind, RunSummary, Scenario, TelemetrySink, TrainingSink,
};
use sinal_fuzzy::{InferenceEngine, RuleBase, Snapshot};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sinal")]
#[command(author = "SIL Contributors")]
#[command(version = "2026.1.16")]
#[command(about = "Sinal - adaptive traffic-signal control with fuzzy inference", long_about = None)]
struct Cli {
    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the control loop on the synthetic simulation
    Run {
        /// Scenario file (defaults to sinal.toml found upwards from the current directory)
        #[arg(short, long, value_name = "FILE")]
        scenario: Option<PathBuf>,

        /// Duration policy
        #[arg(short, long, value_parser = parse_policy)]
        engine: Option<PolicyKind>,

        /// Write one JSON sample per step to this file
        #[arg(short, long, value_name = "FILE")]
        telemetry: Option<PathBuf>,

        /// Arrival horizon of the synthetic simulation (steps)
        #[arg(long)]
        horizon: Option<u64>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate one input snapshot
    Infer {
        /// Vehicles on the incoming lanes
        #[arg(long)]
        vehicles: f64,

        /// Mean waiting time (s)
        #[arg(long)]
        waiting: f64,

        /// Sampled peak vehicle count
        #[arg(long)]
        peak: Option<f64>,

        /// Fuzzy engine
        #[arg(short, long, value_parser = parse_policy, default_value = "sugeno")]
        engine: PolicyKind,

        /// Rule base file (.toml or .json) replacing the preset
        #[arg(short, long, value_name = "FILE")]
        rules: Option<PathBuf>,
    },

    /// Export training records produced by the linear policy
    TrainingData {
        /// Output JSONL file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Arrival horizon of the synthetic simulation (steps)
        #[arg(long)]
        horizon: Option<u64>,
    },

    /// Print a preset rule base
    Rules {
        #[arg(short, long, value_parser = parse_policy, default_value = "sugeno")]
        engine: PolicyKind,

        #[arg(short, long, value_enum, default_value_t = Format::Toml)]
        format: Format,
    },

    /// Print the default scenario
    Scenario {
        #[arg(short, long, value_parser = parse_policy, default_value = "sugeno")]
        engine: PolicyKind,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Toml,
    Json,
}

fn parse_policy(s: &str) -> Result<PolicyKind, String> {
    s.parse::<PolicyKind>().map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            scenario,
            engine,
            telemetry,
            horizon,
            json,
        } => run_command(
            scenario.as_deref(),
            engine,
            telemetry.as_deref(),
            horizon,
            json,
            &mut std::io::stdout(),
        ),
        Commands::Infer {
            vehicles,
            waiting,
            peak,
            engine,
            rules,
        } => infer_command(vehicles, waiting, peak, engine, rules.as_deref()),
        Commands::TrainingData { output, horizon } => training_command(&output, horizon),
        Commands::Rules { engine, format } => rules_command(engine, format),
        Commands::Scenario { engine } => scenario_command(engine),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("sinal=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "sinal=info".into())
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// ============================================================================
// Control loop commands
// ============================================================================

/// Explicit file, then sinal.toml upwards from the current directory, then defaults
fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    if let Some(path) = path {
        return Scenario::from_file(path).with_context(|| format!("loading scenario {}", path.display()));
    }
    let current_dir = std::env::current_dir()?;
    match Scenario::find_and_load(&current_dir)? {
        Some((scenario, path)) => {
            eprintln!("{} {}", "Using".green().bold(), path.display().to_string().cyan());
            Ok(scenario)
        }
        None => Ok(Scenario::default()),
    }
}

fn run_command(
    scenario_path: Option<&Path>,
    engine: Option<PolicyKind>,
    telemetry: Option<&Path>,
    horizon: Option<u64>,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let mut scenario = load_scenario(scenario_path)?;
    if let Some(kind) = engine {
        scenario.set_policy(kind);
    }
    if let Some(horizon) = horizon {
        scenario.simulation.horizon = horizon;
    }

    let mut control = scenario.build_loop()?;
    let mut sink: Box<dyn TelemetrySink> = match telemetry {
        Some(path) => Box::new(JsonlSink::create(path)?),
        None => Box::new(NullSink),
    };

    // Status lines on stderr, stdout carries only the summary
    eprintln!(
        "{} {} on junction {} ({} lanes)",
        "Running".green().bold(),
        control.policy_name().cyan(),
        scenario.control.junction_id,
        scenario.control.lanes.len()
    );

    let summary = control.run(&scenario.synthetic_launcher(), &scenario.simulation, &mut sink)?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        print_summary(out, &summary)?;
    }
    if let Some(path) = telemetry {
        eprintln!("{} {}", "   Telemetry".green().bold(), path.display().to_string().cyan());
    }
    Ok(())
}

fn training_command(output: &Path, horizon: Option<u64>) -> Result<()> {
    let mut scenario = Scenario::for_policy(PolicyKind::Linear);
    if let Some(horizon) = horizon {
        scenario.simulation.horizon = horizon;
    }

    let mut control = scenario.build_loop()?;
    let mut sink = TrainingSink::create(output)?;
    let summary = control.run(&scenario.synthetic_launcher(), &scenario.simulation, &mut sink)?;

    println!(
        "{} {} records to {}",
        "Exported".green().bold(),
        sink.records(),
        output.display().to_string().cyan()
    );
    if summary.telemetry_failures > 0 {
        println!("{} {} records failed", "warning:".yellow().bold(), summary.telemetry_failures);
    }
    Ok(())
}

fn print_summary(out: &mut dyn Write, summary: &RunSummary) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "Run summary".bold())?;
    writeln!(out, "  {:<20} {}", "policy", summary.policy)?;
    writeln!(out, "  {:<20} {:?}", "state", summary.state)?;
    writeln!(out, "  {:<20} {}", "steps", summary.steps)?;
    writeln!(out, "  {:<20} {}", "samples", summary.samples)?;
    writeln!(out, "  {:<20} {}", "applied updates", summary.applied_updates)?;
    writeln!(out, "  {:<20} {}", "undefined outputs", summary.undefined_outputs)?;
    writeln!(out, "  {:<20} {}", "fallbacks", summary.fallbacks)?;
    writeln!(out, "  {:<20} {:.0}", "window vehicles", summary.window_vehicles)?;
    writeln!(out, "  {:<20} {:.0}", "total vehicles", summary.total_vehicles)?;
    if let Some(last) = summary.last_output {
        writeln!(out, "  {:<20} {:.2} s", "last green", last)?;
    }
    if summary.telemetry_failures > 0 {
        writeln!(
            out,
            "  {:<20} {}",
            "telemetry failures",
            summary.telemetry_failures.to_string().yellow()
        )?;
    }
    if !summary.watch.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "Watched lanes".bold())?;
        for w in &summary.watch {
            writeln!(out, "  step {:>6}  vehicles {:>5.0}  delta {:>+5.0}", w.step, w.vehicles, w.delta)?;
        }
    }
    Ok(())
}

// ============================================================================
// Engine commands
// ============================================================================

fn infer_command(
    vehicles: f64,
    waiting: f64,
    peak: Option<f64>,
    kind: PolicyKind,
    rules: Option<&Path>,
) -> Result<()> {
    let scenario = Scenario::for_policy(kind);
    let Some(engine) = scenario.engine() else {
        bail!("'{}' is not a fuzzy engine", kind);
    };
    let base = match rules {
        Some(path) => RuleBase::from_file(path).with_context(|| format!("loading rules {}", path.display()))?,
        None => match scenario.rule_base()? {
            Some(base) => base,
            None => bail!("no preset rule base for '{}'", kind),
        },
    };

    let mut snapshot = Snapshot::new()
        .with(scenario.inputs.vehicles.as_str(), vehicles)
        .with(scenario.inputs.waiting.as_str(), waiting);
    if let Some(peak) = peak {
        let name = scenario.inputs.peak.as_deref().unwrap_or("peak_vehicles");
        snapshot.insert(name, peak);
    }

    let inference = engine.infer(&base, &snapshot)?;

    println!("{} {}", "Engine".green().bold(), engine.name().cyan());
    for (i, (rule, strength)) in base.rules().iter().zip(&inference.strengths).enumerate() {
        let clauses: Vec<String> = rule
            .clauses()
            .iter()
            .map(|c| format!("{} is {}", c.variable, c.term))
            .collect();
        println!("  rule {:>2}  {:.3}  {}", i + 1, strength, clauses.join(" and ").dimmed());
    }
    let output = format!("{:.3} s", inference.output);
    if inference.fallback {
        println!("{} {} {}", "Green".bold(), output.yellow(), "(no rule fired, default output)".dimmed());
    } else {
        println!("{} {}", "Green".bold(), output.green());
    }
    Ok(())
}

fn rules_command(kind: PolicyKind, format: Format) -> Result<()> {
    let Some(base) = kind.preset()? else {
        bail!("'{}' has no rule base", kind);
    };
    let text = match format {
        Format::Toml => base.to_toml_string()?,
        Format::Json => base.to_json_string()?,
    };
    println!("{}", text);
    Ok(())
}

fn scenario_command(kind: PolicyKind) -> Result<()> {
    print!("{}", Scenario::for_policy(kind).to_toml_string()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from(["sinal", "run", "--engine", "mamdani-peak", "--horizon", "600", "-v"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Run { engine, horizon, .. } => {
                assert_eq!(engine, Some(PolicyKind::MamdaniPeak));
                assert_eq!(horizon, Some(600));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_unknown_engine_rejected() {
        assert!(Cli::try_parse_from(["sinal", "infer", "--vehicles", "1", "--waiting", "2", "--engine", "neural"]).is_err());
    }

    #[test]
    fn test_infer_and_rules_commands() {
        assert!(infer_command(25.0, 50.0, None, PolicyKind::Sugeno, None).is_ok());
        assert!(infer_command(25.0, 50.0, Some(120.0), PolicyKind::MamdaniPeak, None).is_ok());
        assert!(infer_command(25.0, 50.0, None, PolicyKind::Fixed, None).is_err());
        assert!(rules_command(PolicyKind::Mamdani, Format::Json).is_ok());
        assert!(rules_command(PolicyKind::Linear, Format::Toml).is_err());
    }

    #[test]
    fn test_infer_with_rules_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        let base = PolicyKind::Sugeno.preset().unwrap().unwrap();
        std::fs::write(&path, base.to_toml_string().unwrap()).unwrap();
        assert!(infer_command(10.0, 10.0, None, PolicyKind::Sugeno, Some(&path)).is_ok());
    }

    #[test]
    fn test_training_command_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("training.jsonl");
        training_command(&path, Some(1900)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.lines().count() > 0);
        assert!(text.lines().all(|l| l.contains("green_duration")));
    }

    fn scenario_file(dir: &Path) -> PathBuf {
        let path = dir.join("sinal.toml");
        std::fs::write(&path, Scenario::default().to_toml_string().unwrap()).unwrap();
        path
    }

    #[test]
    fn test_run_json_output_is_pure_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = scenario_file(dir.path());
        let mut out = Vec::new();
        run_command(Some(&path), Some(PolicyKind::Sugeno), None, Some(60), true, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["policy"], "fuzzy-sugeno");
        assert!(!String::from_utf8(out).unwrap().contains("Running"));
    }

    #[test]
    fn test_run_text_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = scenario_file(dir.path());
        let mut out = Vec::new();
        run_command(Some(&path), Some(PolicyKind::Fixed), None, Some(60), false, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Run summary"));
        assert!(text.contains("fixed"));
        assert!(!text.contains("Running"));
    }
}
