//! LogicSim - combinational logic circuit simulation library
//!
//! This library models diagrams built from AND/OR/NOT gates, switches and
//! LEDs, propagates tri-state signals through their wiring to a fixed point,
//! and derives truth tables over a circuit's free inputs.
//!
//! # Quick Start
//!
//! ```
//! use logicsim::prelude::*;
//!
//! let mut registry = CircuitRegistry::default();
//! registry.create_circuit("main");
//!
//! let switch = registry.add_switch(0, 0).unwrap();
//! let not = registry.add_gate(GateKind::Not, 40, 0).unwrap();
//! let led = registry.add_led(80, 0).unwrap();
//! registry.add_connector(switch, not, 0, "black").unwrap();
//! registry.add_connector(not, led, 0, "black").unwrap();
//!
//! registry.simulate().unwrap();
//! assert_eq!(registry.find_led(led).unwrap().state(), Some(true));
//!
//! let table = registry.truth_table().unwrap();
//! assert_eq!(table.rows.len(), 2);
//! ```
//!
//! # Features
//!
//! - **Simulation**: bounded fixed-point propagation, tolerant of feedback
//! - **Truth tables**: enumeration of free inputs with a row cap
//! - **Clone/merge**: duplicate sub-circuits under fresh ids
//! - **Persistence**: SQLite project store
//! - **Netlists**: JSON circuit descriptions

pub mod analysis;
pub mod core;
pub mod engine;
pub mod model;
pub mod netlist;
pub mod registry;
pub mod store;

// Re-export main types
pub use analysis::{CircuitGraph, CircuitStats};
pub use crate::core::{EngineConfig, LogicSimError};
pub use engine::{SimulationReport, Simulator, TruthTable, TruthTableGenerator};
pub use model::{
    Circuit, CircuitId, Component, ComponentBody, ComponentId, ComponentKind, Connector,
    ConnectorId, GateKind, InputPort, Position, Project, ProjectId, Signal,
};
pub use netlist::{Netlist, NetlistError};
pub use registry::{CircuitRegistry, ClonedSet};
pub use store::{ProjectStore, SqliteStore, StoreError};

/// Load a JSON netlist into a fresh registry (convenience wrapper).
pub fn load_netlist(
    path: &std::path::Path,
    config: EngineConfig,
) -> Result<CircuitRegistry, LogicSimError> {
    let netlist = Netlist::parse_file(path)?;
    let mut registry = CircuitRegistry::new(config);
    registry.rename_project(netlist.name.clone());
    netlist.instantiate(&mut registry)?;
    Ok(registry)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Circuit, CircuitRegistry, ComponentId, ComponentKind, EngineConfig, GateKind,
        LogicSimError, Signal, SimulationReport, TruthTable,
    };
}
