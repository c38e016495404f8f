//! Hydrogen Economics CLI
//!
//! Evaluate a single plant, sweep one input, or evaluate a CSV of scenarios.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

use hydrogen_economics::inputs::{load_scenarios, DEFAULT_SELLING_PRICE_PER_KG};
use hydrogen_economics::summary::{summarize_best_effort, ProjectDigest, SummaryOutcome, TemplateSummarizer};
use hydrogen_economics::{
    EngineConfig, Evaluation, IncentiveInputs, InputAxis, MarketTerms, ProjectInputs, Scenario,
    ScenarioRunner, SensitivitySweepRunner, SweepPoint, SweepRange, SweepTarget,
};

#[derive(Parser)]
#[command(name = "hydrogen_economics", version, about = "Hydrogen project economics: LCOH, incentives, NPV")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate one plant: LCOH, incentives and investment metrics
    Evaluate {
        #[command(flatten)]
        plant: PlantArgs,

        #[command(flatten)]
        market: MarketArgs,

        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,

        /// Append a narrative summary
        #[arg(long)]
        summary: bool,
    },

    /// Vary one input across a range and report LCOH or NPV
    Sweep {
        #[command(flatten)]
        plant: PlantArgs,

        #[command(flatten)]
        market: MarketArgs,

        /// Input to vary (ignored for npv-at-lcoh)
        #[arg(long, default_value = "electricity-cost")]
        axis: InputAxis,

        #[arg(long, value_enum, default_value_t = TargetKind::Lcoh)]
        target: TargetKind,

        #[arg(long)]
        start: f64,

        #[arg(long)]
        stop: f64,

        #[arg(long, default_value_t = 9)]
        samples: usize,

        /// Write points to this CSV file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Evaluate every scenario in a CSV file
    Batch {
        /// Scenario CSV (see inputs::loader for columns)
        path: PathBuf,

        /// Write results to this CSV file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TargetKind {
    Lcoh,
    Npv,
    NpvAtLcoh,
}

#[derive(Args)]
struct PlantArgs {
    /// CAPEX [$/MW/yr]
    #[arg(long, default_value_t = 2_000_000.0)]
    capex: f64,

    /// OPEX [$/MW/yr]
    #[arg(long, default_value_t = 90_000.0)]
    opex: f64,

    /// Electrolyzer size [MW]
    #[arg(long, default_value_t = 10.0)]
    size: f64,

    /// Plant lifetime [years]
    #[arg(long, default_value_t = 20)]
    lifetime: u32,

    /// Discount rate [%]
    #[arg(long, default_value_t = 7.0)]
    discount_rate: f64,

    /// Electricity cost [$/MWh]
    #[arg(long, default_value_t = 50.0)]
    electricity_cost: f64,

    /// Capacity factor [%]
    #[arg(long, default_value_t = 50.0)]
    capacity_factor: f64,

    /// Efficiency [kWh/kg H2]
    #[arg(long, default_value_t = 50.0)]
    efficiency: f64,

    /// Storage cost [$/kg H2]
    #[arg(long, default_value_t = 0.0)]
    storage_cost: f64,

    /// Transport cost [$/kg H2]
    #[arg(long, default_value_t = 0.0)]
    transport_cost: f64,
}

impl PlantArgs {
    fn to_inputs(&self) -> ProjectInputs {
        ProjectInputs {
            capex_per_mw: self.capex,
            opex_per_mw: self.opex,
            plant_size_mw: self.size,
            lifetime_years: self.lifetime,
            discount_rate_pct: self.discount_rate,
            electricity_cost_per_mwh: self.electricity_cost,
            capacity_factor_pct: self.capacity_factor,
            efficiency_kwh_per_kg: self.efficiency,
            storage_cost_per_kg: self.storage_cost,
            transport_cost_per_kg: self.transport_cost,
        }
    }
}

#[derive(Args)]
struct MarketArgs {
    /// Direct production credit [$/kg H2]
    #[arg(long, default_value_t = 3.0)]
    direct_credit: f64,

    /// Renewable electricity credit [$/MWh]
    #[arg(long, default_value_t = 20.0)]
    rec_credit: f64,

    /// Carbon credit [$/t CO2]
    #[arg(long, default_value_t = 50.0)]
    carbon_credit: f64,

    /// CO2 avoided [kg/kg H2]
    #[arg(long, default_value_t = 10.0)]
    co2_avoided: f64,

    /// Hydrogen selling price [$/kg]
    #[arg(long, default_value_t = DEFAULT_SELLING_PRICE_PER_KG)]
    price: f64,
}

impl MarketArgs {
    fn to_market(&self) -> MarketTerms {
        MarketTerms {
            incentives: IncentiveInputs {
                direct_credit_per_kg: self.direct_credit,
                electricity_credit_per_mwh: self.rec_credit,
                carbon_credit_per_ton: self.carbon_credit,
                co2_avoided_kg_per_kg: self.co2_avoided,
            },
            selling_price_per_kg: self.price,
        }
    }
}

#[derive(Serialize)]
struct EvaluationReport<'a> {
    generated_at: DateTime<Utc>,
    scenario: &'a Scenario,
    results: Evaluation,
    display: Evaluation,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<SummaryOutcome>,
}

/// Flat per-scenario row for batch output
#[derive(Serialize)]
struct BatchRow {
    name: String,
    lcoh_per_kg: Option<f64>,
    annual_h2_kg: Option<u64>,
    incentive_per_kg: Option<f64>,
    annual_profit: Option<f64>,
    npv: Option<f64>,
    payback_years: Option<f64>,
    roi_pct: Option<f64>,
    error: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = EngineConfig::from_env();

    match cli.command {
        Command::Evaluate {
            plant,
            market,
            json,
            summary,
        } => run_evaluate(&config, &plant, &market, json, summary),
        Command::Sweep {
            plant,
            market,
            axis,
            target,
            start,
            stop,
            samples,
            output,
        } => {
            let target = match target {
                TargetKind::Lcoh => SweepTarget::Lcoh { axis },
                TargetKind::Npv => SweepTarget::Npv {
                    axis,
                    market: market.to_market(),
                },
                TargetKind::NpvAtLcoh => SweepTarget::NpvAtSyntheticLcoh {
                    market: market.to_market(),
                },
            };
            run_sweep(&config, &plant.to_inputs(), target, SweepRange::new(start, stop, samples), output)
        }
        Command::Batch { path, output } => run_batch(&config, &path, output),
    }
}

fn run_evaluate(
    config: &EngineConfig,
    plant: &PlantArgs,
    market: &MarketArgs,
    json: bool,
    with_summary: bool,
) -> Result<()> {
    let market = market.to_market();
    let scenario = Scenario::new(plant.to_inputs(), market.incentives, market.selling_price_per_kg);

    let runner = ScenarioRunner::with_config(config.clone());
    let evaluation = runner.evaluate(&scenario).context("Invalid project inputs")?;
    let display = evaluation.rounded(config);

    let summary = with_summary.then(|| {
        let digest = ProjectDigest::from_evaluation(&scenario, &evaluation);
        summarize_best_effort(&TemplateSummarizer, &digest)
    });

    if json {
        let report = EvaluationReport {
            generated_at: Utc::now(),
            scenario: &scenario,
            results: evaluation,
            display,
            summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let lcoh = &display.lcoh;
    println!("Hydrogen Project Evaluation");
    println!("===========================\n");
    println!("Levelized Cost of Hydrogen: ${}/kg", lcoh.lcoh_per_kg);
    println!("  Capital:     ${}/kg", lcoh.per_kg.capital);
    println!("  Operating:   ${}/kg", lcoh.per_kg.operating);
    println!("  Electricity: ${}/kg", lcoh.per_kg.electricity);
    println!("  Storage:     ${}/kg", lcoh.per_kg.storage);
    println!("  Transport:   ${}/kg", lcoh.per_kg.transport);
    println!(
        "Annual H2 production: {} kg | CRF: {}",
        evaluation.lcoh.annual_h2_kg_whole(),
        lcoh.crf
    );

    println!("\nIncentives: ${}/kg H2", display.incentives.total_per_kg);

    let metrics = &evaluation.metrics;
    let decimals = config.display_decimals as usize;
    println!("\nFinancial Performance (price ${}/kg):", metrics.selling_price_per_kg);
    println!("  Annual Profit:  ${:.2}M", metrics.annual_profit / 1e6);
    match metrics.npv.value() {
        Some(npv) => println!("  NPV ({} yrs):   ${:.2}M", scenario.project.lifetime_years, npv / 1e6),
        None => println!("  NPV ({} yrs):   N/A", scenario.project.lifetime_years),
    }
    println!("  Payback Period: {:.*} years", decimals, metrics.payback_years);
    println!("  ROI:            {:.*}%", decimals, metrics.roi_pct);

    if let Some(outcome) = summary {
        println!("\nSummary:");
        match outcome {
            SummaryOutcome::Narrative(text) => println!("  {}", text),
            SummaryOutcome::Unavailable(reason) => println!("  (summary unavailable: {})", reason),
        }
    }

    Ok(())
}

fn run_sweep(
    config: &EngineConfig,
    base: &ProjectInputs,
    target: SweepTarget,
    range: SweepRange,
    output: Option<PathBuf>,
) -> Result<()> {
    let runner = SensitivitySweepRunner::new(config.clone());
    let sweep = runner.sweep(base, target, range).context("Invalid sweep request")?;
    let points: Vec<SweepPoint> = sweep.run()?;

    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Unable to create {}", path.display()))?;
            sweep.write_csv(&points, file)?;
            println!("{} points written to: {}", points.len(), path.display());
        }
        None => sweep.write_csv(&points, std::io::stdout().lock())?,
    }

    Ok(())
}

fn run_batch(config: &EngineConfig, path: &Path, output: Option<PathBuf>) -> Result<()> {
    let scenarios = load_scenarios(path)
        .with_context(|| format!("Failed to load scenarios from {}", path.display()))?;

    let runner = ScenarioRunner::with_config(config.clone());
    let results = runner.run_batch(&scenarios);

    let rows: Vec<BatchRow> = scenarios
        .iter()
        .zip(results)
        .enumerate()
        .map(|(idx, (scenario, result))| {
            let name = scenario
                .name
                .clone()
                .unwrap_or_else(|| format!("scenario_{}", idx + 1));
            match result {
                Ok(evaluation) => {
                    let display = evaluation.rounded(config);
                    BatchRow {
                        name,
                        lcoh_per_kg: Some(display.lcoh.lcoh_per_kg),
                        annual_h2_kg: Some(evaluation.lcoh.annual_h2_kg_whole()),
                        incentive_per_kg: Some(display.incentives.total_per_kg),
                        annual_profit: Some(display.metrics.annual_profit),
                        npv: display.metrics.npv.value(),
                        payback_years: display.metrics.payback_years.value(),
                        roi_pct: display.metrics.roi_pct.value(),
                        error: None,
                    }
                }
                Err(e) => BatchRow {
                    name,
                    lcoh_per_kg: None,
                    annual_h2_kg: None,
                    incentive_per_kg: None,
                    annual_profit: None,
                    npv: None,
                    payback_years: None,
                    roi_pct: None,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect();

    match output {
        Some(out) => {
            let file = File::create(&out)
                .with_context(|| format!("Unable to create {}", out.display()))?;
            write_batch_rows(&rows, file)?;
            println!("{} results written to: {}", rows.len(), out.display());
        }
        None => write_batch_rows(&rows, std::io::stdout().lock())?,
    }

    Ok(())
}

fn write_batch_rows<W: std::io::Write>(rows: &[BatchRow], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
