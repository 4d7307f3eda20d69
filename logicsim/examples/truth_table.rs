//! Example: load a JSON netlist and print its truth table.
//! Run with: cargo run --example truth_table [path/to/netlist.json]

use logicsim::{load_netlist, CircuitStats, EngineConfig};
use std::path::Path;

fn main() -> Result<(), logicsim::LogicSimError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/half_adder.json".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example truth_table [path/to/netlist.json]");
        std::process::exit(1);
    }

    let mut registry = load_netlist(path, EngineConfig::default())?;
    if let Some(circuit) = registry.current() {
        let stats = CircuitStats::of(circuit);
        println!(
            "{}: {} gates, {} switches, {} LEDs, {} connectors",
            circuit.name,
            stats.gate_count,
            stats.switch_count,
            stats.led_count,
            stats.connector_count
        );
    }

    let table = registry.truth_table()?;
    println!("{}", table);
    Ok(())
}
