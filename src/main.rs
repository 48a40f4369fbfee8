use std::error::Error;

use clap::Parser;
use libdicearena::{parse_dice_notation, DiceTable, DieType, RollRequest, Tunables};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

const FRAME_DELTA: f32 = 1.0 / 60.0;

/// CLI for physical dice throws
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dice expressions to roll (format: 2d6, d20, 3D4)
    #[arg(required = true, value_parser = parse_dice_notation)]
    dice_expressions: Vec<(DieType, u32)>,

    /// Output format: text, json, csv
    #[arg(short, long, default_value = "text", value_parser = ["text", "json", "csv"])]
    output: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Number of rolls for batch mode
    #[arg(long, default_value_t = 1)]
    batch: usize,

    /// Seed for reproducible rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Cap on dice of any one type
    #[arg(long)]
    max_per_type: Option<u32>,

    /// Downward acceleration in m/s^2
    #[arg(long)]
    gravity: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DieRoll {
    die_type: String,
    value: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SimulationResult {
    results: Vec<DieRoll>,
    total: u32,
}

impl From<&libdicearena::RollResult> for SimulationResult {
    fn from(result: &libdicearena::RollResult) -> Self {
        let results = result
            .groups
            .iter()
            .flat_map(|(die, group)| {
                group.values.iter().map(move |&value| DieRoll {
                    die_type: die.to_string(),
                    value,
                })
            })
            .collect();
        Self {
            results,
            total: result.total,
        }
    }
}

impl Args {
    fn tunables(&self) -> Tunables {
        let mut tunables = Tunables::default();
        if let Some(cap) = self.max_per_type {
            tunables.max_dice_per_type = cap;
        }
        if let Some(g) = self.gravity {
            tunables.gravity = g;
        }
        tunables
    }

    fn request(&self) -> RollRequest {
        self.dice_expressions
            .iter()
            .fold(RollRequest::new(), |req, &(die, count)| req.with(die, count))
    }
}

fn run_simulation(args: &Args) -> Result<Vec<SimulationResult>, Box<dyn Error>> {
    let tunables = args.tunables();
    let mut table = match args.seed {
        Some(seed) => DiceTable::seeded(tunables, seed),
        None => DiceTable::new(tunables),
    };
    let request = args.request();

    let mut all_results = Vec::with_capacity(args.batch);
    for roll in 0..args.batch {
        let handle = table.begin_roll(&request)?;
        while !table.advance(handle, FRAME_DELTA)?.is_terminal() {}

        let session = table.session(handle)?;
        info!(
            roll = roll + 1,
            simulated_time = session.simulated_time(),
            forced = session.forced(),
            anomalies = session.anomalies(),
            "roll finished"
        );
        all_results.push(SimulationResult::from(&table.get_result(handle)?));
    }

    Ok(all_results)
}

fn format_output(results: Vec<SimulationResult>, output_format: &str) -> Result<String, Box<dyn Error>> {
    match output_format {
        "text" => {
            let mut output = String::new();
            for (i, result) in results.iter().enumerate() {
                if results.len() > 1 {
                    output.push_str(&format!("Roll {}: ", i + 1));
                }

                let values: Vec<String> = result
                    .results
                    .iter()
                    .map(|r| format!("{}: {}", r.die_type, r.value))
                    .collect();
                output.push_str(&format!("{}\n", values.join(", ")));

                if results.len() > 1 {
                    output.push_str(&format!("  Total: {}\n", result.total));
                } else {
                    output.push_str(&format!("Total: {}\n", result.total));
                }
            }
            Ok(output)
        }
        "json" => {
            if results.len() == 1 {
                Ok(serde_json::to_string_pretty(&results[0])?)
            } else {
                Ok(serde_json::to_string_pretty(&results)?)
            }
        }
        "csv" => {
            let mut output = String::from("Roll,Dice Type,Value\n");
            for (i, result) in results.iter().enumerate() {
                for roll in &result.results {
                    output.push_str(&format!("{},{},{}\n", i + 1, roll.die_type, roll.value));
                }
            }
            Ok(output)
        }
        _ => Err("Invalid output format".into()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(request = ?args.request(), batch = args.batch, "rolling");

    match run_simulation(&args) {
        Ok(results) => {
            let output = format_output(results, &args.output)?;
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error during simulation: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
