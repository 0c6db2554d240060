//! `forensic` CLI: analyze case files, run synthetic scenarios.

use anyhow::Result;
use clap::{Parser, Subcommand};
use forensic_core::analysis::{AnalysisConfig, CaseAnalysis, CaseReport};
use forensic_core::kinematics::DEFAULT_STEP;
use forensic_core::types::ObjectId;
use sim::case_file::{load_case, save_case, CaseFile};
use sim::scenarios::{Scenario, ScenarioKind};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "forensic", about = "Kinematics and uncertainty analysis for incident footage")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a case file produced by the perception stage.
    Analyze {
        /// Path to case JSON file
        input: PathBuf,
        /// Interpolation step in seconds
        #[arg(long, default_value_t = DEFAULT_STEP)]
        step: f64,
        /// Evaluate at most this many object pairs
        #[arg(long)]
        pair_limit: Option<usize>,
        /// Write the full report to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate a named synthetic scenario and analyze it.
    RunScenario {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Also save the generated case file
        #[arg(long)]
        save_case: Option<PathBuf>,
        /// Write the full report to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            step,
            pair_limit,
            output,
        } => {
            let case = load_case(&input)?;
            info!(case = %case.name, objects = case.objects.len(), "loaded case");
            let config = AnalysisConfig { step, pair_limit };
            run_case(&case, config, output.as_deref())?;
        }
        Commands::RunScenario {
            scenario,
            seed,
            save_case: save_path,
            output,
        } => {
            let case = Scenario::build(scenario, seed).case_file();
            if let Some(path) = save_path.as_deref() {
                save_case(&case, path)?;
                println!("Case saved to {}", path.display());
            }
            run_case(&case, AnalysisConfig::default(), output.as_deref())?;
        }
    }

    Ok(())
}

fn run_case(case: &CaseFile, config: AnalysisConfig, output_path: Option<&Path>) -> Result<()> {
    println!(
        "Analyzing '{}' ({} objects, {} events, {:.1}s of footage)...",
        case.name,
        case.objects.len(),
        case.events.len(),
        case.duration
    );

    let report = CaseAnalysis::new(config).run(&case.objects, &case.events, case.duration)?;
    print_summary(&report);

    if let Some(opath) = output_path {
        std::fs::write(opath, serde_json::to_string_pretty(&report)?)?;
        println!("Report saved to {}", opath.display());
    }

    Ok(())
}

fn print_summary(report: &CaseReport) {
    println!(
        "Done: {} profiled objects, {} pairs, elapsed={}us",
        report.objects.len(),
        report.pairs.len(),
        report.elapsed_us
    );

    for obj in &report.objects {
        println!(
            "  {:<10} {:<24} peak {:>6.1}  max decel {:>7.1}",
            obj.object_id, obj.label, obj.peak_speed, obj.peak_deceleration
        );
    }

    if let Some(pair) = report.riskiest_pair() {
        let s = &pair.summary;
        let label = |id: &ObjectId| {
            report
                .kinematics_for(id)
                .map(|k| k.label.as_str())
                .unwrap_or("?")
        };
        println!(
            "Riskiest pair: {} ({}) / {} ({})  min TTC {:.2}s at {}  closest {:.1}",
            pair.object_a,
            label(&pair.object_a),
            pair.object_b,
            label(&pair.object_b),
            s.min_ttc,
            s.min_ttc_time
                .map(|t| format!("{t:.1}s"))
                .unwrap_or_else(|| "-".into()),
            s.min_distance
        );
        for (start, end) in &s.risk_windows {
            println!("  risk window {start:.1}s – {end:.1}s");
        }
    }

    println!("Confidence budget:");
    for row in &report.uncertainty.budget {
        println!(
            "  {:<22} {:.3} − {:.3} = {:.3}",
            row.stage, row.input_conf, row.loss, row.output_conf
        );
    }

    println!("Blind spots:");
    for spot in &report.uncertainty.blind_spots {
        println!("  [{:?}/{:?}] {}", spot.kind, spot.severity, spot.description);
    }
}
