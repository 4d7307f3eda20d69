//! Circuit Registry
//!
//! The registry owns the circuits of one project, the active circuit and
//! three independent id counters (components, connectors, circuits). Ids
//! increase monotonically and are never reused; only `clear()` resets them.
//!
//! There is no global instance. The host constructs a registry and threads
//! it through its event handlers; every mutation takes `&mut self`, so a
//! concurrent host has to serialize access itself (e.g. behind a `Mutex`).

use std::collections::HashMap;

use crate::core::{EngineConfig, LogicSimError};
use crate::engine::{SimulationReport, Simulator, TruthTable, TruthTableGenerator};
use crate::model::*;
use crate::store::ProjectStore;

/// Renumbered copy of a circuit's components, ready for `merge_components`
#[derive(Debug, Clone, Default)]
pub struct ClonedSet {
    pub gates: Vec<Component>,
    pub leds: Vec<Component>,
    pub switches: Vec<Component>,
    pub connectors: Vec<Connector>,
    /// Original component id -> cloned component id
    pub mapping: HashMap<ComponentId, ComponentId>,
}

impl ClonedSet {
    pub fn component_count(&self) -> usize {
        self.gates.len() + self.leds.len() + self.switches.len()
    }
}

pub struct CircuitRegistry {
    config: EngineConfig,
    project: Project,
    current: Option<CircuitId>,
    next_component: u64,
    next_connector: u64,
    next_circuit: u64,
}

impl Default for CircuitRegistry {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl CircuitRegistry {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            project: Project::new(ProjectId(1), "Untitled"),
            current: None,
            next_component: 0,
            next_connector: 0,
            next_circuit: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn rename_project(&mut self, name: impl Into<String>) {
        self.project.name = name.into();
    }

    /// Start an empty project under a new identity, dropping every circuit.
    ///
    /// Use a fresh id per project (see `ProjectStore::next_project_id`) when
    /// several projects share one store; saving reuses the id as its key.
    pub fn new_project(&mut self, id: ProjectId, name: impl Into<String>) {
        self.clear();
        self.project = Project::new(id, name);
    }

    /// Snapshot of the whole project, e.g. for a `ProjectStore`
    pub fn to_project(&self) -> Project {
        self.project.clone()
    }

    /// Replace the registry's content with a loaded project.
    ///
    /// The main circuit becomes current and every counter moves past the
    /// largest id in the project, so new ids never collide with loaded ones.
    pub fn open_project(&mut self, project: Project) {
        for circuit in &project.circuits {
            self.next_circuit = self.next_circuit.max(circuit.id.0);
            if let Some(id) = circuit.max_component_id() {
                self.next_component = self.next_component.max(id.0);
            }
            if let Some(id) = circuit.max_connector_id() {
                self.next_connector = self.next_connector.max(id.0);
            }
        }
        self.current = project.main_circuit().map(|c| c.id);
        tracing::info!(
            "Opened project '{}' with {} circuit(s)",
            project.name,
            project.circuits.len()
        );
        self.project = project;
    }

    pub fn save_project(&self, store: &dyn ProjectStore) -> Result<(), LogicSimError> {
        store.save(&self.project)?;
        Ok(())
    }

    /// Open a stored project; returns false when the store has no such id.
    pub fn load_project(
        &mut self,
        store: &dyn ProjectStore,
        id: ProjectId,
    ) -> Result<bool, LogicSimError> {
        match store.load(id)? {
            Some(project) => {
                self.open_project(project);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drop every circuit, reset all counters and the project identity.
    pub fn clear(&mut self) {
        self.project = Project::new(ProjectId(1), "Untitled");
        self.current = None;
        self.next_component = 0;
        self.next_connector = 0;
        self.next_circuit = 0;
    }

    fn next_component_id(&mut self) -> ComponentId {
        self.next_component += 1;
        ComponentId(self.next_component)
    }

    fn next_connector_id(&mut self) -> ConnectorId {
        self.next_connector += 1;
        ConnectorId(self.next_connector)
    }

    // Circuits

    pub fn circuits(&self) -> &[Circuit] {
        &self.project.circuits
    }

    pub fn circuit(&self, id: CircuitId) -> Option<&Circuit> {
        self.project.circuit(id)
    }

    pub fn current(&self) -> Option<&Circuit> {
        self.current.and_then(|id| self.project.circuit(id))
    }

    pub fn current_id(&self) -> Option<CircuitId> {
        self.current
    }

    fn current_mut(&mut self) -> Result<&mut Circuit, LogicSimError> {
        let id = self.current.ok_or(LogicSimError::NoActiveCircuit)?;
        self.project
            .circuits
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(LogicSimError::CircuitNotFound(id))
    }

    /// Drop a circuit unconditionally and make `previous` current again.
    ///
    /// Undoes a `create_circuit` whose construction failed part way.
    pub(crate) fn discard_circuit(&mut self, id: CircuitId, previous: Option<CircuitId>) {
        self.project.circuits.retain(|c| c.id != id);
        self.current = previous.filter(|prev| self.project.circuit(*prev).is_some());
        tracing::debug!("Discarded circuit {}", id);
    }

    /// Create an empty circuit and make it current.
    pub fn create_circuit(&mut self, name: impl Into<String>) -> CircuitId {
        self.next_circuit += 1;
        let id = CircuitId(self.next_circuit);
        let circuit = Circuit::new(id, name);
        tracing::debug!("Created circuit {} '{}'", id, circuit.name);
        self.project.circuits.push(circuit);
        self.current = Some(id);
        id
    }

    pub fn switch_to(&mut self, id: CircuitId) -> bool {
        if self.project.circuit(id).is_none() {
            return false;
        }
        self.current = Some(id);
        true
    }

    /// Delete a circuit. The main circuit is protected.
    ///
    /// Deleting the current circuit makes the main circuit current.
    pub fn delete_circuit(&mut self, id: CircuitId) -> bool {
        let Some(pos) = self.project.circuits.iter().position(|c| c.id == id) else {
            return false;
        };
        if pos == 0 {
            tracing::debug!("Refusing to delete main circuit {}", id);
            return false;
        }
        self.project.circuits.remove(pos);
        if self.current == Some(id) {
            self.current = self.project.main_circuit().map(|c| c.id);
        }
        true
    }

    pub fn rename_circuit(&mut self, id: CircuitId, name: impl Into<String>) -> bool {
        match self.project.circuits.iter_mut().find(|c| c.id == id) {
            Some(circuit) => {
                circuit.name = name.into();
                true
            }
            None => false,
        }
    }

    // Components

    pub fn add_component(
        &mut self,
        kind: ComponentKind,
        x: i32,
        y: i32,
    ) -> Result<ComponentId, LogicSimError> {
        // Fail before burning an id when there is nowhere to put it
        self.current_mut()?;
        let id = self.next_component_id();
        let position = Position::new(x, y);
        let component = match kind.gate_kind() {
            Some(gate) => Component::gate(id, gate, position),
            None if kind == ComponentKind::Led => Component::led(id, position),
            None => Component::switch(id, position),
        };
        self.current_mut()?.push_component(component);
        Ok(id)
    }

    pub fn add_gate(
        &mut self,
        kind: GateKind,
        x: i32,
        y: i32,
    ) -> Result<ComponentId, LogicSimError> {
        self.add_component(kind.into(), x, y)
    }

    pub fn add_led(&mut self, x: i32, y: i32) -> Result<ComponentId, LogicSimError> {
        self.add_component(ComponentKind::Led, x, y)
    }

    pub fn add_switch(&mut self, x: i32, y: i32) -> Result<ComponentId, LogicSimError> {
        self.add_component(ComponentKind::Switch, x, y)
    }

    pub fn find_gate(&self, id: ComponentId) -> Option<&Component> {
        self.current()?.find_gate(id)
    }

    pub fn find_led(&self, id: ComponentId) -> Option<&Component> {
        self.current()?.find_led(id)
    }

    pub fn find_switch(&self, id: ComponentId) -> Option<&Component> {
        self.current()?.find_switch(id)
    }

    pub fn find(&self, id: ComponentId) -> Option<&Component> {
        self.current()?.find(id)
    }

    /// Remove a gate, its connectors, and every port source pointing at it
    pub fn remove_gate(&mut self, id: ComponentId) -> Option<Component> {
        self.current_mut().ok()?.remove_gate(id)
    }

    pub fn remove_led(&mut self, id: ComponentId) -> Option<Component> {
        self.current_mut().ok()?.remove_led(id)
    }

    pub fn remove_switch(&mut self, id: ComponentId) -> Option<Component> {
        self.current_mut().ok()?.remove_switch(id)
    }

    pub fn set_position(&mut self, id: ComponentId, x: i32, y: i32) -> Result<(), LogicSimError> {
        let component = self
            .current_mut()?
            .find_mut(id)
            .ok_or(LogicSimError::ComponentNotFound(id))?;
        component.position = Position::new(x, y);
        Ok(())
    }

    pub fn set_placement(
        &mut self,
        id: ComponentId,
        row: i32,
        column: i32,
    ) -> Result<(), LogicSimError> {
        let component = self
            .current_mut()?
            .find_mut(id)
            .ok_or(LogicSimError::ComponentNotFound(id))?;
        component.row = row;
        component.column = column;
        Ok(())
    }

    // Wiring

    /// Wire `source`'s output to input `input` of `target`.
    ///
    /// Only records the wiring; values move on the next `simulate()`.
    pub fn add_connector(
        &mut self,
        source: ComponentId,
        target: ComponentId,
        input: u8,
        color: impl Into<String>,
    ) -> Result<ConnectorId, LogicSimError> {
        let circuit = self.current_mut()?;
        if circuit.find(source).is_none() {
            return Err(LogicSimError::ComponentNotFound(source));
        }
        let target_component = circuit
            .find(target)
            .ok_or(LogicSimError::ComponentNotFound(target))?;
        if target_component.input(input).is_none() {
            return Err(LogicSimError::InvalidPort {
                component: target,
                index: input,
            });
        }

        let id = self.next_connector_id();
        let replaced = self
            .current_mut()?
            .connect(Connector::new(id, source, target, input, color));
        if let Some(old) = replaced {
            tracing::debug!(
                "Connector {} replaced connector {} on {}.in{}",
                id,
                old.id,
                target,
                input
            );
        }
        Ok(id)
    }

    pub fn connector(&self, id: ConnectorId) -> Option<&Connector> {
        self.current()?.find_connector(id)
    }

    /// Remove a connector record. The target port keeps its source id.
    pub fn remove_connector(&mut self, id: ConnectorId) -> Option<Connector> {
        self.current_mut().ok()?.remove_connector(id)
    }

    pub fn recolor_connector(
        &mut self,
        id: ConnectorId,
        color: impl Into<String>,
    ) -> Result<(), LogicSimError> {
        let connector = self
            .current_mut()?
            .find_connector_mut(id)
            .ok_or(LogicSimError::ConnectorNotFound(id))?;
        connector.color = color.into();
        Ok(())
    }

    // Inputs and simulation

    /// Drive a gate input directly, then simulate.
    pub fn set_input(
        &mut self,
        gate: ComponentId,
        index: u8,
        signal: Signal,
    ) -> Result<SimulationReport, LogicSimError> {
        let circuit = self.current_mut()?;
        let component = circuit
            .find_mut(gate)
            .ok_or(LogicSimError::ComponentNotFound(gate))?;
        if !component.is_gate() {
            return Err(LogicSimError::WrongKind {
                component: gate,
                expected: "gate",
            });
        }
        let port = component
            .input_mut(index)
            .ok_or(LogicSimError::InvalidPort {
                component: gate,
                index,
            })?;
        port.signal = signal;
        self.simulate()
    }

    pub fn set_switch(
        &mut self,
        id: ComponentId,
        on: bool,
    ) -> Result<SimulationReport, LogicSimError> {
        let switch = self
            .current_mut()?
            .find_mut(id)
            .ok_or(LogicSimError::ComponentNotFound(id))?;
        if !switch.set_switch(on) {
            return Err(LogicSimError::WrongKind {
                component: id,
                expected: "switch",
            });
        }
        self.simulate()
    }

    /// Flip a switch and simulate; returns the new state.
    pub fn toggle_switch(&mut self, id: ComponentId) -> Result<bool, LogicSimError> {
        let on = self
            .find_switch(id)
            .and_then(Component::state)
            .map(|on| !on)
            .ok_or(LogicSimError::ComponentNotFound(id))?;
        self.set_switch(id, on)?;
        Ok(on)
    }

    pub fn simulate(&mut self) -> Result<SimulationReport, LogicSimError> {
        let simulator = Simulator::new(&self.config);
        let circuit = self.current_mut()?;
        Ok(simulator.run(circuit))
    }

    pub fn truth_table(&mut self) -> Result<TruthTable, LogicSimError> {
        let generator = TruthTableGenerator::new(&self.config);
        let circuit = self.current_mut()?;
        Ok(generator.generate(circuit))
    }

    // Clone / merge

    /// Copy every component and connector of `source` under fresh ids.
    ///
    /// Copies keep their port values and states but no port source ids;
    /// wiring is rebuilt from the cloned connectors by `merge_components`.
    /// A connector referencing a component outside `source` is an error.
    pub fn clone_components(
        &mut self,
        source: &Circuit,
        dx: i32,
        dy: i32,
    ) -> Result<ClonedSet, LogicSimError> {
        let mut set = ClonedSet::default();

        for original in source.components() {
            let id = self.next_component_id();
            set.mapping.insert(original.id, id);

            let mut copy = original.clone();
            copy.id = id;
            copy.position = original.position.offset(dx, dy);
            for port in copy.inputs_mut() {
                port.source = None;
            }
            match copy.body {
                ComponentBody::Gate { .. } => set.gates.push(copy),
                ComponentBody::Led { .. } => set.leds.push(copy),
                ComponentBody::Switch { .. } => set.switches.push(copy),
            }
        }

        for original in &source.connectors {
            let remap = |component: ComponentId| {
                set.mapping
                    .get(&component)
                    .copied()
                    .ok_or(LogicSimError::MalformedClone {
                        connector: original.id,
                        component,
                    })
            };
            let from = remap(original.source)?;
            let to = remap(original.target)?;
            let id = self.next_connector_id();
            set.connectors.push(Connector::new(
                id,
                from,
                to,
                original.input,
                original.color.clone(),
            ));
        }

        Ok(set)
    }

    /// Append a cloned set to the current circuit and make its wiring live.
    pub fn merge_components(&mut self, set: ClonedSet) -> Result<(), LogicSimError> {
        let circuit = self.current_mut()?;
        let count = set.component_count();
        for component in set.gates.into_iter().chain(set.leds).chain(set.switches) {
            circuit.push_component(component);
        }
        for connector in set.connectors {
            circuit.connect(connector);
        }
        tracing::debug!("Merged {} component(s) into circuit {}", count, circuit.id);
        Ok(())
    }

    /// Clone a circuit of this project into the current one.
    pub fn import_circuit(
        &mut self,
        source: CircuitId,
        dx: i32,
        dy: i32,
    ) -> Result<HashMap<ComponentId, ComponentId>, LogicSimError> {
        let source = self
            .circuit(source)
            .cloned()
            .ok_or(LogicSimError::CircuitNotFound(source))?;
        let set = self.clone_components(&source, dx, dy)?;
        let mapping = set.mapping.clone();
        self.merge_components(set)?;
        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_circuit() -> CircuitRegistry {
        let mut registry = CircuitRegistry::default();
        registry.create_circuit("main");
        registry
    }

    #[test]
    fn test_ids_are_monotonic_and_independent() {
        let mut registry = registry_with_circuit();
        let a = registry.add_gate(GateKind::And, 0, 0).unwrap();
        let b = registry.add_switch(0, 0).unwrap();
        let c = registry.add_connector(b, a, 0, "blue").unwrap();
        assert_eq!(a, ComponentId(1));
        assert_eq!(b, ComponentId(2));
        assert_eq!(c, ConnectorId(1));

        registry.remove_switch(b);
        let d = registry.add_led(0, 0).unwrap();
        assert_eq!(d, ComponentId(3), "ids are never reused");
    }

    #[test]
    fn test_no_active_circuit() {
        let mut registry = CircuitRegistry::default();
        assert!(matches!(
            registry.add_gate(GateKind::Or, 0, 0),
            Err(LogicSimError::NoActiveCircuit)
        ));
        assert!(matches!(registry.simulate(), Err(LogicSimError::NoActiveCircuit)));
        assert!(registry.find_gate(ComponentId(1)).is_none());
    }

    #[test]
    fn test_add_connector_does_not_propagate() {
        let mut registry = registry_with_circuit();
        let switch = registry.add_switch(0, 0).unwrap();
        let led = registry.add_led(10, 0).unwrap();
        registry.set_switch(switch, true).unwrap();
        registry.add_connector(switch, led, 0, "").unwrap();

        let port = registry.find_led(led).unwrap().input(0).unwrap().clone();
        assert_eq!(port.source, Some(switch));
        assert_eq!(port.signal, Signal::Unset);

        registry.simulate().unwrap();
        assert_eq!(registry.find_led(led).unwrap().state(), Some(true));
    }

    #[test]
    fn test_add_connector_validates_endpoints() {
        let mut registry = registry_with_circuit();
        let not = registry.add_gate(GateKind::Not, 0, 0).unwrap();
        let switch = registry.add_switch(0, 0).unwrap();
        assert!(matches!(
            registry.add_connector(switch, not, 1, ""),
            Err(LogicSimError::InvalidPort { index: 1, .. })
        ));
        assert!(matches!(
            registry.add_connector(ComponentId(50), not, 0, ""),
            Err(LogicSimError::ComponentNotFound(ComponentId(50)))
        ));
        assert!(matches!(
            registry.add_connector(not, switch, 0, ""),
            Err(LogicSimError::InvalidPort { .. })
        ));
    }

    #[test]
    fn test_set_input_simulates() {
        let mut registry = registry_with_circuit();
        let and = registry.add_gate(GateKind::And, 0, 0).unwrap();
        let not = registry.add_gate(GateKind::Not, 10, 0).unwrap();
        registry.add_connector(and, not, 0, "").unwrap();
        registry.set_input(and, 0, Signal::One).unwrap();
        registry.set_input(and, 1, Signal::Zero).unwrap();

        assert_eq!(registry.find_gate(and).unwrap().output(), Signal::Zero);
        assert_eq!(registry.find_gate(not).unwrap().output(), Signal::One);
        assert!(matches!(
            registry.set_input(and, 2, Signal::One),
            Err(LogicSimError::InvalidPort { .. })
        ));
    }

    #[test]
    fn test_toggle_switch_drives_led() {
        let mut registry = registry_with_circuit();
        let switch = registry.add_switch(0, 0).unwrap();
        let led = registry.add_led(10, 0).unwrap();
        registry.add_connector(switch, led, 0, "").unwrap();

        assert!(registry.toggle_switch(switch).unwrap());
        assert_eq!(registry.find_led(led).unwrap().state(), Some(true));
        assert!(!registry.toggle_switch(switch).unwrap());
        assert_eq!(registry.find_led(led).unwrap().state(), Some(false));
        assert!(matches!(
            registry.set_switch(led, true),
            Err(LogicSimError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_remove_connector_keeps_port_source() {
        let mut registry = registry_with_circuit();
        let switch = registry.add_switch(0, 0).unwrap();
        let led = registry.add_led(10, 0).unwrap();
        let wire = registry.add_connector(switch, led, 0, "").unwrap();

        assert!(registry.remove_connector(wire).is_some());
        let port = registry.find_led(led).unwrap().input(0).unwrap();
        assert_eq!(port.source, Some(switch));
    }

    #[test]
    fn test_recolor_connector() {
        let mut registry = registry_with_circuit();
        let switch = registry.add_switch(0, 0).unwrap();
        let led = registry.add_led(10, 0).unwrap();
        let wire = registry.add_connector(switch, led, 0, "black").unwrap();

        registry.recolor_connector(wire, "orange").unwrap();
        assert_eq!(registry.connector(wire).unwrap().color, "orange");

        registry.remove_connector(wire);
        assert!(registry.connector(wire).is_none());
        assert!(matches!(
            registry.recolor_connector(wire, "red"),
            Err(LogicSimError::ConnectorNotFound(id)) if id == wire
        ));
    }

    #[test]
    fn test_circuit_lifecycle() {
        let mut registry = CircuitRegistry::default();
        let main = registry.create_circuit("main");
        let second = registry.create_circuit("second");
        assert_eq!(registry.current_id(), Some(second));

        assert!(registry.switch_to(main));
        assert!(!registry.switch_to(CircuitId(99)));
        assert!(!registry.delete_circuit(main), "main circuit is protected");
        assert!(!registry.delete_circuit(CircuitId(99)));

        registry.switch_to(second);
        assert!(registry.delete_circuit(second));
        assert_eq!(registry.current_id(), Some(main));
        assert!(registry.rename_circuit(main, "top"));
        assert_eq!(registry.current().unwrap().name, "top");

        registry.rename_project("named");
        registry.clear();
        assert!(registry.circuits().is_empty());
        assert_eq!(registry.project().name, "Untitled");
        assert!(registry.current().is_none());
        assert_eq!(registry.create_circuit("fresh"), CircuitId(1));
    }

    #[test]
    fn test_clone_and_merge_preserve_topology() {
        let mut registry = registry_with_circuit();
        let and = registry.add_gate(GateKind::And, 0, 0).unwrap();
        let not = registry.add_gate(GateKind::Not, 10, 0).unwrap();
        let led = registry.add_led(20, 0).unwrap();
        registry.add_connector(and, not, 0, "red").unwrap();
        registry.add_connector(not, led, 0, "red").unwrap();
        registry.set_input(and, 0, Signal::One).unwrap();
        registry.set_input(and, 1, Signal::One).unwrap();

        let source = registry.current().unwrap().clone();
        let set = registry.clone_components(&source, 0, 0).unwrap();
        assert!(set
            .gates
            .iter()
            .chain(&set.leds)
            .all(|c| c.inputs().iter().all(|p| p.source.is_none())));

        let mapping = set.mapping.clone();
        registry.merge_components(set).unwrap();
        let circuit = registry.current().unwrap();
        assert_eq!(circuit.component_count(), 6);
        assert_eq!(circuit.connectors.len(), 4);

        for (old, new) in &mapping {
            assert!(new.0 > led.0, "clone ids must be fresh");
            let a = circuit.find(*old).unwrap();
            let b = circuit.find(*new).unwrap();
            assert_eq!(a.kind(), b.kind());
            assert_eq!(a.position, b.position);
            let signals = |c: &Component| c.inputs().iter().map(|p| p.signal).collect::<Vec<_>>();
            assert_eq!(signals(a), signals(b));
            for (pa, pb) in a.inputs().iter().zip(b.inputs()) {
                assert_eq!(pa.source.map(|s| mapping[&s]), pb.source);
            }
        }
    }

    #[test]
    fn test_clone_offsets_positions() {
        let mut registry = registry_with_circuit();
        let switch = registry.add_switch(5, 7).unwrap();
        let source = registry.current().unwrap().clone();
        let set = registry.clone_components(&source, 100, -2).unwrap();
        assert_eq!(set.switches[0].position, Position::new(105, 5));
        assert_ne!(set.switches[0].id, switch);
    }

    #[test]
    fn test_clone_rejects_external_reference() {
        let mut registry = registry_with_circuit();
        let not = registry.add_gate(GateKind::Not, 0, 0).unwrap();
        let mut partial = Circuit::new(CircuitId(50), "partial");
        partial.push_component(registry.find_gate(not).unwrap().clone());
        partial.connectors.push(Connector::new(ConnectorId(9), ComponentId(77), not, 0, ""));

        assert!(matches!(
            registry.clone_components(&partial, 0, 0),
            Err(LogicSimError::MalformedClone { component: ComponentId(77), .. })
        ));
    }

    #[test]
    fn test_import_circuit() {
        let mut registry = CircuitRegistry::default();
        let library = registry.create_circuit("inverter");
        let switch = registry.add_switch(0, 0).unwrap();
        let not = registry.add_gate(GateKind::Not, 10, 0).unwrap();
        registry.add_connector(switch, not, 0, "").unwrap();

        registry.create_circuit("top");
        let mapping = registry.import_circuit(library, 50, 0).unwrap();
        registry.simulate().unwrap();
        let cloned_not = registry.find_gate(mapping[&not]).unwrap();
        assert_eq!(cloned_not.input(0).unwrap().source, Some(mapping[&switch]));
        assert_eq!(cloned_not.output(), Signal::One);
        assert!(registry.import_circuit(CircuitId(99), 0, 0).is_err());
    }

    #[test]
    fn test_open_project_advances_counters() {
        let mut source = CircuitRegistry::default();
        source.create_circuit("main");
        let gate = source.add_gate(GateKind::Or, 0, 0).unwrap();
        let led = source.add_led(0, 0).unwrap();
        source.add_connector(gate, led, 0, "").unwrap();
        let project = source.to_project();

        let mut registry = CircuitRegistry::default();
        registry.open_project(project);
        assert_eq!(registry.current().unwrap().name, "main");
        assert_eq!(registry.add_switch(0, 0).unwrap(), ComponentId(3));
        assert_eq!(registry.create_circuit("next"), CircuitId(2));
    }

    #[test]
    fn test_save_and_load_through_store() {
        let store = crate::store::SqliteStore::in_memory().unwrap();
        let mut registry = registry_with_circuit();
        registry.rename_project("persisted");
        let switch = registry.add_switch(0, 0).unwrap();
        let led = registry.add_led(10, 0).unwrap();
        registry.add_connector(switch, led, 0, "").unwrap();
        registry.set_switch(switch, true).unwrap();
        registry.save_project(&store).unwrap();

        let mut reopened = CircuitRegistry::default();
        assert!(reopened.load_project(&store, ProjectId(1)).unwrap());
        assert_eq!(reopened.project().name, "persisted");
        assert_eq!(reopened.find_led(led).unwrap().state(), Some(true));
        assert!(!reopened.load_project(&store, ProjectId(2)).unwrap());
    }

    #[test]
    fn test_separate_projects_share_one_store() {
        let store = crate::store::SqliteStore::in_memory().unwrap();

        let mut alpha = CircuitRegistry::default();
        alpha.new_project(store.next_project_id().unwrap(), "alpha");
        alpha.create_circuit("main");
        alpha.add_switch(0, 0).unwrap();
        alpha.save_project(&store).unwrap();

        let mut beta = CircuitRegistry::default();
        beta.new_project(store.next_project_id().unwrap(), "beta");
        beta.create_circuit("main");
        beta.save_project(&store).unwrap();

        let listed = store.list_projects().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[&alpha.project().id], "alpha");
        assert_eq!(listed[&beta.project().id], "beta");
        assert_ne!(alpha.project().id, beta.project().id);
    }

    #[test]
    fn test_new_project_resets_content() {
        let mut registry = registry_with_circuit();
        registry.add_gate(GateKind::And, 0, 0).unwrap();
        registry.new_project(ProjectId(5), "fresh");

        assert_eq!(registry.project().id, ProjectId(5));
        assert_eq!(registry.project().name, "fresh");
        assert!(registry.circuits().is_empty());
        assert!(registry.current().is_none());
        registry.create_circuit("main");
        assert_eq!(registry.add_led(0, 0).unwrap(), ComponentId(1));
    }

    #[test]
    fn test_set_position_and_placement() {
        let mut registry = registry_with_circuit();
        let led = registry.add_led(1, 1).unwrap();
        registry.set_position(led, 4, 9).unwrap();
        registry.set_placement(led, 2, 3).unwrap();
        let led = registry.find_led(led).unwrap();
        assert_eq!(led.position, Position::new(4, 9));
        assert_eq!((led.row, led.column), (2, 3));
        assert!(registry.set_position(ComponentId(99), 0, 0).is_err());
    }
}
