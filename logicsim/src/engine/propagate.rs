//! Fixed-point signal propagation.
//!
//! Each round first copies every connector's source output into its target
//! port, then recomputes every gate in insertion order. Rounds repeat until
//! one changes nothing or the round cap is reached. LEDs are refreshed once
//! after the loop and do not take part in change detection.
//!
//! For acyclic wiring the result does not depend on iteration order. For
//! feedback loops it depends on traversal order and the cap, and the
//! circuit is left in whatever state the last round produced.

use serde::Serialize;

use crate::core::EngineConfig;
use crate::model::{Circuit, ComponentId, Signal};

/// Outcome of one `simulate` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    /// Rounds executed, including the final quiet round when converged
    pub rounds: usize,
    /// False when the round cap stopped propagation before a quiet round
    pub converged: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Simulator {
    max_rounds: usize,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Simulator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_rounds: config.max_rounds.max(1),
        }
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// Drive the circuit towards a fixed point, mutating it in place.
    pub fn run(&self, circuit: &mut Circuit) -> SimulationReport {
        let mut rounds = 0;
        let mut converged = false;

        while rounds < self.max_rounds {
            rounds += 1;
            let wires_changed = Self::propagate(circuit);
            let gates_changed = Self::recompute_gates(circuit);
            if !wires_changed && !gates_changed {
                converged = true;
                break;
            }
        }

        for led in &mut circuit.leds {
            led.recompute();
        }

        if converged {
            tracing::debug!(
                "Circuit {} converged after {} round(s)",
                circuit.id,
                rounds
            );
        } else {
            tracing::debug!(
                "Circuit {} still changing after {} rounds; keeping last state",
                circuit.id,
                rounds
            );
        }

        SimulationReport { rounds, converged }
    }

    /// Copy each connector's source output into its target port.
    fn propagate(circuit: &mut Circuit) -> bool {
        // Outputs only move during recompute, so reading them all up front
        // matches a connector-by-connector pass.
        let values: Vec<(ComponentId, u8, Signal)> = circuit
            .connectors
            .iter()
            .map(|c| (c.target, c.input, circuit.output_of(c.source)))
            .collect();

        let mut changed = false;
        for (target, input, signal) in values {
            let Some(port) = circuit
                .find_mut(target)
                .and_then(|component| component.input_mut(input))
            else {
                continue;
            };
            if port.signal != signal {
                port.signal = signal;
                changed = true;
            }
        }
        changed
    }

    fn recompute_gates(circuit: &mut Circuit) -> bool {
        let mut changed = false;
        for gate in &mut circuit.gates {
            changed |= gate.recompute();
        }
        changed
    }
}
