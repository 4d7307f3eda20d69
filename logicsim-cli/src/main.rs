//! LogicSim CLI - simulate JSON netlists and print truth tables from the command line.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use logicsim::{load_netlist, CircuitRegistry, CircuitStats, EngineConfig, TruthTable};
use std::path::{Path, PathBuf};
use std::process;
use tracing::Level;

#[derive(Parser)]
#[command(name = "logicsim-cli")]
#[command(about = "Logic circuit simulator and truth-table generator", long_about = None)]
#[command(version)]
struct Cli {
    /// Log engine activity (convergence, truncation) to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a netlist and report every component's state
    Simulate {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Print the truth table over a netlist's free inputs
    Table {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: TableFormat,
    },

    /// Show structural statistics for a netlist
    Info {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Path to a JSON netlist
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// JSON engine configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the propagation round limit
    #[arg(long, value_name = "N")]
    max_rounds: Option<usize>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[derive(Clone, ValueEnum)]
enum TableFormat {
    Human,
    Json,
    Csv,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Simulate { input, format } => handle_simulate(&input, format),
        Commands::Table { input, format } => handle_table(&input, format),
        Commands::Info { input, format } => handle_info(&input, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load(input: &InputArgs) -> anyhow::Result<CircuitRegistry> {
    let mut config = match &input.config {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(rounds) = input.max_rounds {
        config = config.with_max_rounds(rounds);
    }
    let registry = load_netlist(&input.file, config)
        .with_context(|| format!("failed to load netlist {}", input.file.display()))?;
    Ok(registry)
}

fn handle_simulate(input: &InputArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut registry = load(input)?;
    let report = registry.simulate()?;
    let circuit = registry.current().context("netlist produced no circuit")?;

    match format {
        OutputFormat::Human => {
            print_header(&input.file, &circuit.name);
            for component in circuit.components() {
                let inputs: Vec<String> = component
                    .inputs()
                    .iter()
                    .map(|port| port.signal.to_string())
                    .collect();
                if inputs.is_empty() {
                    println!("  {:<12} -> {}", component.label(), component.output());
                } else {
                    println!(
                        "  {:<12} {} -> {}",
                        component.label(),
                        inputs.join(" "),
                        component.output()
                    );
                }
            }
            println!();
            if report.converged {
                println!("  Settled after {} round(s)", report.rounds);
            } else {
                println!(
                    "  Did not settle within {} rounds (feedback loop?)",
                    report.rounds
                );
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "file": input.file.display().to_string(),
                "circuit": circuit.name,
                "report": report,
                "components": circuit.components().map(|c| {
                    let inputs: Vec<String> =
                        c.inputs().iter().map(|p| p.signal.to_string()).collect();
                    serde_json::json!({
                        "id": c.id,
                        "label": c.label(),
                        "inputs": inputs,
                        "output": c.output().to_string(),
                    })
                }).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn handle_table(input: &InputArgs, format: TableFormat) -> anyhow::Result<()> {
    let mut registry = load(input)?;
    let table = registry.truth_table()?;

    match format {
        TableFormat::Human => {
            let name = registry
                .current()
                .map(|c| c.name.clone())
                .unwrap_or_default();
            print_header(&input.file, &name);
            print!("{}", table);
        }
        TableFormat::Json => println!("{}", table_json(&table)?),
        TableFormat::Csv => print!("{}", table.to_csv()),
    }
    Ok(())
}

fn table_json(table: &TruthTable) -> anyhow::Result<String> {
    let output = serde_json::json!({
        "inputs": table.input_labels,
        "outputs": table.output_labels,
        "rows": table.rows,
        "truncated": table.truncated,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

fn handle_info(input: &InputArgs, format: OutputFormat) -> anyhow::Result<()> {
    let registry = load(input)?;
    let circuit = registry.current().context("netlist produced no circuit")?;
    let stats = CircuitStats::of(circuit);

    match format {
        OutputFormat::Human => {
            print_header(&input.file, &circuit.name);
            println!("  Gates:       {}", stats.gate_count);
            println!("  Switches:    {}", stats.switch_count);
            println!("  LEDs:        {}", stats.led_count);
            println!("  Connectors:  {}", stats.connector_count);
            println!("  Free inputs: {}", stats.free_input_count);
            println!("  Outputs:     {}", stats.free_output_count);
            println!(
                "  Feedback:    {}",
                if stats.has_feedback { "yes" } else { "no" }
            );
            match stats.depth {
                Some(depth) => println!("  Depth:       {}", depth),
                None => println!("  Depth:       n/a"),
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "file": input.file.display().to_string(),
                "circuit": circuit.name,
                "stats": stats,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn print_header(file: &Path, circuit: &str) {
    println!("\nFile: {} ({})", file.display(), circuit);
    println!("{}", "─".repeat(60));
}
