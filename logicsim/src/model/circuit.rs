//! Circuit and Project Aggregates
//!
//! A `Circuit` owns its components, partitioned by kind (gates, LEDs,
//! switches) in insertion order, plus the connectors wiring them. Components
//! reference each other only by id; every lookup is an explicit `find`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::schema::*;

/// A wired logic diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    pub id: CircuitId,
    pub name: String,
    #[serde(default)]
    pub gates: Vec<Component>,
    #[serde(default)]
    pub leds: Vec<Component>,
    #[serde(default)]
    pub switches: Vec<Component>,
    #[serde(default)]
    pub connectors: Vec<Connector>,
}

impl Circuit {
    pub fn new(id: CircuitId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            gates: Vec::new(),
            leds: Vec::new(),
            switches: Vec::new(),
            connectors: Vec::new(),
        }
    }

    /// Append a component to the collection matching its kind
    pub fn push_component(&mut self, component: Component) {
        match component.body {
            ComponentBody::Gate { .. } => self.gates.push(component),
            ComponentBody::Led { .. } => self.leds.push(component),
            ComponentBody::Switch { .. } => self.switches.push(component),
        }
    }

    /// All components: gates, then LEDs, then switches
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.gates
            .iter()
            .chain(self.leds.iter())
            .chain(self.switches.iter())
    }

    pub fn component_count(&self) -> usize {
        self.gates.len() + self.leds.len() + self.switches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.component_count() == 0 && self.connectors.is_empty()
    }

    pub fn find(&self, id: ComponentId) -> Option<&Component> {
        self.components().find(|c| c.id == id)
    }

    pub fn find_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.gates
            .iter_mut()
            .chain(self.leds.iter_mut())
            .chain(self.switches.iter_mut())
            .find(|c| c.id == id)
    }

    pub fn find_gate(&self, id: ComponentId) -> Option<&Component> {
        self.gates.iter().find(|c| c.id == id)
    }

    pub fn find_led(&self, id: ComponentId) -> Option<&Component> {
        self.leds.iter().find(|c| c.id == id)
    }

    pub fn find_switch(&self, id: ComponentId) -> Option<&Component> {
        self.switches.iter().find(|c| c.id == id)
    }

    pub fn find_connector(&self, id: ConnectorId) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.id == id)
    }

    pub fn find_connector_mut(&mut self, id: ConnectorId) -> Option<&mut Connector> {
        self.connectors.iter_mut().find(|c| c.id == id)
    }

    /// Output a connector reads from `id`; a missing source reads as unset.
    pub fn output_of(&self, id: ComponentId) -> Signal {
        self.find(id).map(Component::output).unwrap_or(Signal::Unset)
    }

    /// Append a connector and point the target port at its source.
    ///
    /// A port keeps a single source slot, so an older connector ending on
    /// the same (target, input) pair is dropped and returned.
    pub fn connect(&mut self, connector: Connector) -> Option<Connector> {
        let replaced = self
            .connectors
            .iter()
            .position(|c| c.target == connector.target && c.input == connector.input)
            .map(|pos| self.connectors.remove(pos));

        if let Some(port) = self
            .find_mut(connector.target)
            .and_then(|c| c.input_mut(connector.input))
        {
            port.source = Some(connector.source);
        }
        self.connectors.push(connector);
        replaced
    }

    /// Remove a connector by id.
    ///
    /// The target port keeps its source id: removing the wire record does
    /// not disconnect the port.
    pub fn remove_connector(&mut self, id: ConnectorId) -> Option<Connector> {
        let pos = self.connectors.iter().position(|c| c.id == id)?;
        Some(self.connectors.remove(pos))
    }

    pub fn remove_gate(&mut self, id: ComponentId) -> Option<Component> {
        let pos = self.gates.iter().position(|c| c.id == id)?;
        let removed = self.gates.remove(pos);
        self.detach(id);
        Some(removed)
    }

    pub fn remove_led(&mut self, id: ComponentId) -> Option<Component> {
        let pos = self.leds.iter().position(|c| c.id == id)?;
        let removed = self.leds.remove(pos);
        self.detach(id);
        Some(removed)
    }

    pub fn remove_switch(&mut self, id: ComponentId) -> Option<Component> {
        let pos = self.switches.iter().position(|c| c.id == id)?;
        let removed = self.switches.remove(pos);
        self.detach(id);
        Some(removed)
    }

    /// Remove a component of any kind
    pub fn remove_component(&mut self, id: ComponentId) -> Option<Component> {
        self.remove_gate(id)
            .or_else(|| self.remove_led(id))
            .or_else(|| self.remove_switch(id))
    }

    /// Drop every connector touching `id` and clear ports sourced from it
    fn detach(&mut self, id: ComponentId) {
        self.connectors.retain(|c| !c.touches(id));
        for component in self.gates.iter_mut().chain(self.leds.iter_mut()) {
            for port in component.inputs_mut() {
                if port.source == Some(id) {
                    port.source = None;
                }
            }
        }
    }

    /// Ids of every component used as a connector source
    pub fn source_ids(&self) -> HashSet<ComponentId> {
        self.connectors.iter().map(|c| c.source).collect()
    }

    pub fn max_component_id(&self) -> Option<ComponentId> {
        self.components().map(|c| c.id).max()
    }

    pub fn max_connector_id(&self) -> Option<ConnectorId> {
        self.connectors.iter().map(|c| c.id).max()
    }
}

/// An ordered collection of circuits; the first one is the main circuit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub circuits: Vec<Circuit>,
}

impl Project {
    pub fn new(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at: Utc::now(),
            circuits: Vec::new(),
        }
    }

    pub fn main_circuit(&self) -> Option<&Circuit> {
        self.circuits.first()
    }

    pub fn circuit(&self, id: CircuitId) -> Option<&Circuit> {
        self.circuits.iter().find(|c| c.id == id)
    }
}
