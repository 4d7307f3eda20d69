//! Circuit Graph Analysis
//!
//! A petgraph view of a circuit's wiring: one node per component, one edge
//! per connector (source → target). The simulation never needs it; it backs
//! the statistics and feedback diagnostics reported to users.

use petgraph::algo::{astar, is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::engine::TruthTableGenerator;
use crate::model::{Circuit, ComponentId, ConnectorId};

#[derive(Debug, Clone)]
pub struct CircuitGraph {
    graph: DiGraph<ComponentId, ConnectorId>,
    indices: HashMap<ComponentId, NodeIndex>,
}

impl CircuitGraph {
    /// Connectors with a missing endpoint are left out.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();

        for component in circuit.components() {
            let idx = graph.add_node(component.id);
            indices.insert(component.id, idx);
        }

        for connector in &circuit.connectors {
            if let (Some(&from), Some(&to)) = (
                indices.get(&connector.source),
                indices.get(&connector.target),
            ) {
                graph.add_edge(from, to, connector.id);
            }
        }

        Self { graph, indices }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// True when some output feeds back into its own input chain
    pub fn has_feedback(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Number of components on the longest wiring path; `None` with feedback.
    pub fn depth(&self) -> Option<usize> {
        let order = toposort(&self.graph, None).ok()?;
        let mut longest: HashMap<NodeIndex, usize> = HashMap::new();
        let mut depth = 0;
        for idx in order {
            let here = self
                .graph
                .neighbors_directed(idx, Direction::Incoming)
                .filter_map(|n| longest.get(&n))
                .max()
                .map_or(1, |d| d + 1);
            longest.insert(idx, here);
            depth = depth.max(here);
        }
        Some(depth)
    }

    /// Components driving `id`
    pub fn drivers_of(&self, id: ComponentId) -> Vec<ComponentId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Components driven by `id`
    pub fn loads_of(&self, id: ComponentId) -> Vec<ComponentId> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors(&self, id: ComponentId, direction: Direction) -> Vec<ComponentId> {
        let Some(&idx) = self.indices.get(&id) else {
            return Vec::new();
        };
        let mut ids: Vec<ComponentId> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n])
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Shortest signal path between two components along connector direction
    pub fn find_path(&self, from: ComponentId, to: ComponentId) -> Option<Vec<ComponentId>> {
        let from_idx = self.indices.get(&from)?;
        let to_idx = self.indices.get(&to)?;

        astar(&self.graph, *from_idx, |n| n == *to_idx, |_| 1, |_| 0)
            .map(|(_, path)| path.into_iter().map(|idx| self.graph[idx]).collect())
    }
}

/// Statistics about a circuit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitStats {
    pub gate_count: usize,
    pub led_count: usize,
    pub switch_count: usize,
    pub connector_count: usize,
    pub free_input_count: usize,
    pub free_output_count: usize,
    pub has_feedback: bool,
    /// Longest wiring path in components; absent for feedback circuits
    pub depth: Option<usize>,
}

impl CircuitStats {
    pub fn of(circuit: &Circuit) -> Self {
        let graph = CircuitGraph::from_circuit(circuit);
        Self {
            gate_count: circuit.gates.len(),
            led_count: circuit.leds.len(),
            switch_count: circuit.switches.len(),
            connector_count: circuit.connectors.len(),
            free_input_count: TruthTableGenerator::free_inputs(circuit).len(),
            free_output_count: TruthTableGenerator::free_outputs(circuit).len(),
            has_feedback: graph.has_feedback(),
            depth: graph.depth(),
        }
    }
}
