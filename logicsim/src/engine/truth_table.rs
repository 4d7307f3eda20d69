//! Truth-table generation over a circuit's free inputs.
//!
//! Free inputs are unconnected gate ports (in gate insertion order) followed
//! by every switch. Free outputs are gates that drive no connector, followed
//! by every LED. Each row assigns the bits of its index most-significant
//! first across the input columns, simulates, and samples the outputs.
//! The circuit's free inputs are restored and re-simulated afterwards.
//!
//! More than `log2(max_rows)` inputs cannot be enumerated in full: only the
//! first `max_rows` assignments are produced and the table is flagged as
//! truncated.

use serde::Serialize;
use std::fmt;

use super::propagate::Simulator;
use crate::analysis::CircuitGraph;
use crate::core::EngineConfig;
use crate::model::{Circuit, Component, ComponentId, Signal};

/// A column the generator drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeInput {
    Port { gate: ComponentId, index: u8 },
    Switch(ComponentId),
}

impl FreeInput {
    fn read(self, circuit: &Circuit) -> Signal {
        match self {
            FreeInput::Port { gate, index } => circuit
                .find(gate)
                .and_then(|c| c.input(index))
                .map(|p| p.signal)
                .unwrap_or_default(),
            FreeInput::Switch(id) => circuit.output_of(id),
        }
    }

    fn write(self, circuit: &mut Circuit, signal: Signal) {
        match self {
            FreeInput::Port { gate, index } => {
                if let Some(port) = circuit.find_mut(gate).and_then(|c| c.input_mut(index)) {
                    port.signal = signal;
                }
            }
            FreeInput::Switch(id) => {
                if let Some(switch) = circuit.find_mut(id) {
                    switch.set_switch(signal == Signal::One);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TruthRow {
    pub inputs: Vec<bool>,
    pub outputs: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TruthTable {
    pub input_labels: Vec<String>,
    pub output_labels: Vec<String>,
    pub rows: Vec<TruthRow>,
    /// Set when fewer than 2^n rows were enumerated
    pub truncated: bool,
}

impl TruthTable {
    pub fn header(&self) -> Vec<String> {
        self.input_labels
            .iter()
            .chain(self.output_labels.iter())
            .cloned()
            .collect()
    }

    /// Header row followed by one row of `"0"`/`"1"` cells per assignment
    pub fn to_strings(&self) -> Vec<Vec<String>> {
        std::iter::once(self.header())
            .chain(self.rows.iter().map(|row| {
                row.inputs
                    .iter()
                    .chain(row.outputs.iter())
                    .map(|v| Signal::from_bool(*v).as_bit().to_string())
                    .collect()
            }))
            .collect()
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for line in self.to_strings() {
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }

    pub fn column_count(&self) -> usize {
        self.input_labels.len() + self.output_labels.len()
    }
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self.to_strings();
        let widths: Vec<usize> = lines[0].iter().map(|label| label.len().max(1)).collect();
        let split = self.input_labels.len();

        for (n, line) in lines.iter().enumerate() {
            let mut cells = Vec::with_capacity(self.column_count() + 1);
            for (i, cell) in line.iter().enumerate() {
                if i == split && split > 0 {
                    cells.push("|".to_string());
                }
                cells.push(format!("{:>width$}", cell, width = widths[i]));
            }
            let text = cells.join(" ");
            writeln!(f, "{}", text)?;
            if n == 0 {
                writeln!(f, "{}", "-".repeat(text.len()))?;
            }
        }
        if self.truncated {
            writeln!(f, "(truncated to {} rows)", self.rows.len())?;
        }
        Ok(())
    }
}

pub struct TruthTableGenerator {
    simulator: Simulator,
    max_rows: usize,
}

impl Default for TruthTableGenerator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl TruthTableGenerator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            simulator: Simulator::new(config),
            max_rows: config.max_table_rows.max(1),
        }
    }

    /// Unconnected gate ports in gate order, then every switch
    pub fn free_inputs(circuit: &Circuit) -> Vec<FreeInput> {
        let ports = circuit.gates.iter().flat_map(|gate| {
            gate.inputs()
                .iter()
                .filter(|port| !port.is_connected())
                .map(|port| FreeInput::Port {
                    gate: gate.id,
                    index: port.index,
                })
        });
        let switches = circuit.switches.iter().map(|s| FreeInput::Switch(s.id));
        ports.chain(switches).collect()
    }

    /// Gates driving no connector, then every LED
    pub fn free_outputs(circuit: &Circuit) -> Vec<ComponentId> {
        let sources = circuit.source_ids();
        circuit
            .gates
            .iter()
            .filter(|gate| !sources.contains(&gate.id))
            .chain(circuit.leds.iter())
            .map(|c| c.id)
            .collect()
    }

    fn input_label(circuit: &Circuit, input: FreeInput) -> String {
        match input {
            FreeInput::Port { gate, index } => {
                let base = circuit
                    .find(gate)
                    .map(Component::label)
                    .unwrap_or_else(|| format!("?#{}", gate));
                format!("{}.in{}", base, index)
            }
            FreeInput::Switch(id) => circuit
                .find(id)
                .map(Component::label)
                .unwrap_or_else(|| format!("SWITCH#{}", id)),
        }
    }

    /// Enumerate input assignments, leaving the circuit as it was found.
    pub fn generate(&self, circuit: &mut Circuit) -> TruthTable {
        if CircuitGraph::from_circuit(circuit).has_feedback() {
            tracing::warn!(
                "Circuit {} contains a feedback loop; truth table rows depend on evaluation order",
                circuit.id
            );
        }

        let inputs = Self::free_inputs(circuit);
        let outputs = Self::free_outputs(circuit);
        let saved: Vec<Signal> = inputs.iter().map(|input| input.read(circuit)).collect();

        let n = inputs.len();
        let full = if n < 64 { Some(1u64 << n) } else { None };
        let row_count = match full {
            Some(total) => total.min(self.max_rows as u64),
            None => self.max_rows as u64,
        };
        let truncated = full.map_or(true, |total| row_count < total);
        if truncated {
            tracing::warn!(
                "{} free inputs: truth table truncated to {} rows",
                n,
                row_count
            );
        }

        let mut rows = Vec::with_capacity(row_count as usize);
        for i in 0..row_count {
            let assignment: Vec<bool> = (0..n)
                .map(|column| {
                    let shift = n - 1 - column;
                    shift < 64 && (i >> shift) & 1 == 1
                })
                .collect();
            for (input, value) in inputs.iter().zip(&assignment) {
                input.write(circuit, Signal::from_bool(*value));
            }
            self.simulator.run(circuit);
            let sampled = outputs
                .iter()
                .map(|id| circuit.output_of(*id) == Signal::One)
                .collect();
            rows.push(TruthRow {
                inputs: assignment,
                outputs: sampled,
            });
        }

        for (input, signal) in inputs.iter().zip(saved) {
            input.write(circuit, signal);
        }
        self.simulator.run(circuit);

        TruthTable {
            input_labels: inputs
                .iter()
                .map(|input| Self::input_label(circuit, *input))
                .collect(),
            output_labels: outputs
                .iter()
                .map(|id| {
                    circuit
                        .find(*id)
                        .map(Component::label)
                        .unwrap_or_else(|| id.to_string())
                })
                .collect(),
            rows,
            truncated,
        }
    }
}
