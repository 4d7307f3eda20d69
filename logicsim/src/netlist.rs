//! JSON Netlist Loader
//!
//! A small hand-writable description of a circuit, instantiated through a
//! `CircuitRegistry` so every component and connector gets a registry id.
//!
//! ```json
//! {
//!   "name": "inverter",
//!   "components": [
//!     { "name": "a",   "kind": "switch", "on": true },
//!     { "name": "inv", "kind": "not", "x": 40 },
//!     { "name": "out", "kind": "led", "x": 80 }
//!   ],
//!   "wires": [
//!     { "from": "a", "to": "inv" },
//!     { "from": "inv", "to": "out", "color": "green" }
//!   ]
//! }
//! ```
//!
//! Gate inputs that are not wired may be preset with `"inputs": [1, null]`.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

use crate::core::LogicSimError;
use crate::model::{ComponentId, ComponentKind, Signal};
use crate::registry::CircuitRegistry;

#[derive(Debug, Error)]
pub enum NetlistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate component name: {0}")]
    DuplicateName(String),

    #[error("Wire references unknown component: {0}")]
    UnknownComponent(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetlistComponent {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    /// Initial switch state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    /// Preset gate input values (`0`, `1` or `null`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<Option<u8>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetlistWire {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub input: u8,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Netlist {
    pub name: String,
    #[serde(default)]
    pub components: Vec<NetlistComponent>,
    #[serde(default)]
    pub wires: Vec<NetlistWire>,
}

fn preset_signal(value: u8) -> Result<Signal, NetlistError> {
    match value {
        0 => Ok(Signal::Zero),
        1 => Ok(Signal::One),
        other => Err(NetlistError::InvalidData(format!(
            "input value must be 0, 1 or null, got {}",
            other
        ))),
    }
}

impl Netlist {
    pub fn parse_file(path: &Path) -> Result<Self, NetlistError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> Result<Self, NetlistError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Check names, kinds, presets and wire endpoints without touching a registry.
    fn validate(&self) -> Result<Vec<ComponentKind>, LogicSimError> {
        let kinds = self
            .components
            .iter()
            .map(|c| c.kind.parse::<ComponentKind>())
            .collect::<Result<Vec<_>, _>>()?;

        let mut names = HashSet::new();
        for (component, kind) in self.components.iter().zip(&kinds) {
            if !names.insert(component.name.as_str()) {
                return Err(NetlistError::DuplicateName(component.name.clone()).into());
            }
            if component.on.is_some() && *kind != ComponentKind::Switch {
                return Err(NetlistError::InvalidData(format!(
                    "'{}' is not a switch but sets \"on\"",
                    component.name
                ))
                .into());
            }
            for value in component.inputs.iter().flatten() {
                preset_signal(*value)?;
            }
        }

        for wire in &self.wires {
            for end in [&wire.from, &wire.to] {
                if !names.contains(end.as_str()) {
                    return Err(NetlistError::UnknownComponent(end.clone()).into());
                }
            }
        }
        Ok(kinds)
    }

    /// Build the netlist as a new current circuit of `registry`.
    ///
    /// Returns the name → id mapping. The circuit is simulated once all
    /// components and wires are in place. On error the registry keeps its
    /// previous circuits and current circuit.
    pub fn instantiate(
        &self,
        registry: &mut CircuitRegistry,
    ) -> Result<HashMap<String, ComponentId>, LogicSimError> {
        let kinds = self.validate()?;

        let previous = registry.current_id();
        let circuit = registry.create_circuit(self.name.clone());
        match self.build(registry, kinds) {
            Ok(ids) => Ok(ids),
            Err(e) => {
                registry.discard_circuit(circuit, previous);
                Err(e)
            }
        }
    }

    fn build(
        &self,
        registry: &mut CircuitRegistry,
        kinds: Vec<ComponentKind>,
    ) -> Result<HashMap<String, ComponentId>, LogicSimError> {
        let mut ids = HashMap::new();

        for (component, kind) in self.components.iter().zip(kinds) {
            let id = registry.add_component(kind, component.x, component.y)?;
            ids.insert(component.name.clone(), id);

            if let Some(on) = component.on {
                registry.set_switch(id, on)?;
            }
            for (index, value) in component.inputs.iter().enumerate() {
                if let Some(value) = value {
                    registry.set_input(id, index as u8, preset_signal(*value)?)?;
                }
            }
        }

        for wire in &self.wires {
            let lookup = |name: &str| {
                ids.get(name)
                    .copied()
                    .ok_or_else(|| NetlistError::UnknownComponent(name.to_string()))
            };
            let from = lookup(&wire.from)?;
            let to = lookup(&wire.to)?;
            registry.add_connector(from, to, wire.input, wire.color.clone())?;
        }

        let report = registry.simulate()?;
        tracing::debug!(
            "Instantiated netlist '{}': {} component(s), {} wire(s), converged={}",
            self.name,
            ids.len(),
            self.wires.len(),
            report.converged
        );
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVERTER: &str = r#"{
        "name": "inverter",
        "components": [
            { "name": "a", "kind": "switch", "on": true },
            { "name": "inv", "kind": "not", "x": 40 },
            { "name": "out", "kind": "led", "x": 80 }
        ],
        "wires": [
            { "from": "a", "to": "inv" },
            { "from": "inv", "to": "out", "color": "green" }
        ]
    }"#;

    #[test]
    fn test_parse_and_instantiate() {
        let netlist = Netlist::parse_str(INVERTER).unwrap();
        assert_eq!(netlist.components.len(), 3);

        let mut registry = CircuitRegistry::default();
        let ids = netlist.instantiate(&mut registry).unwrap();
        let circuit = registry.current().unwrap();
        assert_eq!(circuit.name, "inverter");
        assert_eq!(circuit.connectors.len(), 2);
        assert_eq!(circuit.connectors[1].color, "green");
        assert_eq!(circuit.find(ids["inv"]).unwrap().position.x, 40);
        assert_eq!(circuit.find_led(ids["out"]).unwrap().state(), Some(false));
    }

    #[test]
    fn test_preset_inputs() {
        let json = r#"{
            "name": "and",
            "components": [{ "name": "g", "kind": "AND", "inputs": [1, 1] }]
        }"#;
        let mut registry = CircuitRegistry::default();
        let ids = Netlist::parse_str(json).unwrap().instantiate(&mut registry).unwrap();
        assert_eq!(registry.find_gate(ids["g"]).unwrap().output(), Signal::One);
    }

    #[test]
    fn test_unknown_kind() {
        let json = r#"{ "name": "x", "components": [{ "name": "g", "kind": "xor" }] }"#;
        let mut registry = CircuitRegistry::default();
        let err = Netlist::parse_str(json).unwrap().instantiate(&mut registry).unwrap_err();
        assert!(matches!(err, LogicSimError::UnknownKind(_)));
        assert!(registry.circuits().is_empty(), "nothing is built for a bad kind");
    }

    #[test]
    fn test_unknown_wire_endpoint() {
        let json = r#"{
            "name": "x",
            "components": [{ "name": "a", "kind": "switch" }],
            "wires": [{ "from": "a", "to": "missing" }]
        }"#;
        let mut registry = CircuitRegistry::default();
        let err = Netlist::parse_str(json).unwrap().instantiate(&mut registry).unwrap_err();
        assert!(matches!(
            err,
            LogicSimError::Netlist(NetlistError::UnknownComponent(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_invalid_values() {
        let json =
            r#"{ "name": "x", "components": [{ "name": "g", "kind": "or", "inputs": [2] }] }"#;
        let mut registry = CircuitRegistry::default();
        assert!(Netlist::parse_str(json).unwrap().instantiate(&mut registry).is_err());

        let json = r#"{ "name": "x", "components": [{ "name": "l", "kind": "led", "on": true }] }"#;
        let mut registry = CircuitRegistry::default();
        assert!(Netlist::parse_str(json).unwrap().instantiate(&mut registry).is_err());

        assert!(matches!(Netlist::parse_str("{"), Err(NetlistError::Json(_))));
    }

    fn registry_with_own_circuit() -> (CircuitRegistry, crate::model::CircuitId) {
        let mut registry = CircuitRegistry::default();
        let mine = registry.create_circuit("mine");
        registry.add_switch(0, 0).unwrap();
        (registry, mine)
    }

    #[test]
    fn test_failed_instantiate_leaves_registry_untouched() {
        let bad = [
            r#"{ "name": "dup", "components": [
                { "name": "a", "kind": "switch" },
                { "name": "a", "kind": "led" }
            ] }"#,
            r#"{ "name": "dangling", "components": [{ "name": "a", "kind": "switch" }],
                "wires": [{ "from": "a", "to": "missing" }] }"#,
            r#"{ "name": "bad port", "components": [
                { "name": "a", "kind": "switch" },
                { "name": "n", "kind": "not" }
            ], "wires": [{ "from": "a", "to": "n", "input": 3 }] }"#,
        ];
        for json in bad {
            let (mut registry, mine) = registry_with_own_circuit();
            let netlist = Netlist::parse_str(json).unwrap();
            assert!(netlist.instantiate(&mut registry).is_err(), "{}", netlist.name);
            assert_eq!(registry.circuits().len(), 1, "{}", netlist.name);
            assert_eq!(registry.current_id(), Some(mine), "{}", netlist.name);
            assert_eq!(registry.current().unwrap().component_count(), 1);
        }
    }

    #[test]
    fn test_failed_instantiate_into_empty_registry() {
        let json = r#"{ "name": "bad port", "components": [
            { "name": "a", "kind": "switch" },
            { "name": "n", "kind": "not" }
        ], "wires": [{ "from": "a", "to": "n", "input": 3 }] }"#;
        let mut registry = CircuitRegistry::default();
        let err = Netlist::parse_str(json).unwrap().instantiate(&mut registry).unwrap_err();
        assert!(matches!(err, LogicSimError::InvalidPort { index: 3, .. }));
        assert!(registry.circuits().is_empty());
        assert!(registry.current_id().is_none());
    }

    #[test]
    fn test_duplicate_name() {
        let json = r#"{ "name": "x", "components": [
            { "name": "a", "kind": "and" },
            { "name": "a", "kind": "or" }
        ] }"#;
        let mut registry = CircuitRegistry::default();
        let err = Netlist::parse_str(json).unwrap().instantiate(&mut registry).unwrap_err();
        assert!(matches!(
            err,
            LogicSimError::Netlist(NetlistError::DuplicateName(name)) if name == "a"
        ));
    }
}
