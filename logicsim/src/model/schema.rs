//! Component and Wiring Data Types
//!
//! This module defines the building blocks of a logic diagram:
//! - `Signal`: the tri-state value carried on an input port
//! - `InputPort`: an input slot with its current signal and wiring source
//! - `Component`: a gate, LED or switch with its shared identity record
//! - `Connector`: a directed wire from an output to a specific input port
//!
//! Components are a tagged variant: the shared record (id, position,
//! row/column) lives on `Component`, the kind-specific payload lives in
//! `ComponentBody`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::LogicSimError;

/// Identifier of a component, unique for the lifetime of a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub u64);

/// Identifier of a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectorId(pub u64);

/// Identifier of a circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CircuitId(pub u64);

/// Identifier of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub u64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CircuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tri-state logic value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Zero,
    One,
    #[default]
    Unset,
}

impl Signal {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Signal::One
        } else {
            Signal::Zero
        }
    }

    /// `None` when the signal is unset
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Signal::Zero => Some(false),
            Signal::One => Some(true),
            Signal::Unset => None,
        }
    }

    pub fn is_set(self) -> bool {
        self != Signal::Unset
    }

    /// Logical AND; `Unset` if either operand is unset.
    pub fn and(self, other: Signal) -> Signal {
        match (self.as_bool(), other.as_bool()) {
            (Some(a), Some(b)) => Signal::from_bool(a && b),
            _ => Signal::Unset,
        }
    }

    /// Logical OR; `Unset` if either operand is unset, even when the other is `One`.
    pub fn or(self, other: Signal) -> Signal {
        match (self.as_bool(), other.as_bool()) {
            (Some(a), Some(b)) => Signal::from_bool(a || b),
            _ => Signal::Unset,
        }
    }

    pub fn not(self) -> Signal {
        match self.as_bool() {
            Some(a) => Signal::from_bool(!a),
            None => Signal::Unset,
        }
    }

    /// Truth-table rendering: unset reads as `0`.
    pub fn as_bit(self) -> &'static str {
        match self {
            Signal::One => "1",
            Signal::Zero | Signal::Unset => "0",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Zero => write!(f, "0"),
            Signal::One => write!(f, "1"),
            Signal::Unset => write!(f, "-"),
        }
    }
}

/// Gate function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKind {
    And,
    Or,
    Not,
}

impl GateKind {
    pub fn input_count(self) -> usize {
        match self {
            GateKind::And | GateKind::Or => 2,
            GateKind::Not => 1,
        }
    }

    /// Evaluate the gate over its input signals (missing inputs read as unset).
    pub fn evaluate(self, inputs: &[InputPort]) -> Signal {
        let a = inputs.first().map(|p| p.signal).unwrap_or_default();
        match self {
            GateKind::And => a.and(inputs.get(1).map(|p| p.signal).unwrap_or_default()),
            GateKind::Or => a.or(inputs.get(1).map(|p| p.signal).unwrap_or_default()),
            GateKind::Not => a.not(),
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateKind::And => write!(f, "AND"),
            GateKind::Or => write!(f, "OR"),
            GateKind::Not => write!(f, "NOT"),
        }
    }
}

impl FromStr for GateKind {
    type Err = LogicSimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AND" => Ok(GateKind::And),
            "OR" => Ok(GateKind::Or),
            "NOT" => Ok(GateKind::Not),
            _ => Err(LogicSimError::UnknownKind(s.to_string())),
        }
    }
}

/// Kind tag covering every component variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    And,
    Or,
    Not,
    Led,
    Switch,
}

impl ComponentKind {
    pub fn gate_kind(self) -> Option<GateKind> {
        match self {
            ComponentKind::And => Some(GateKind::And),
            ComponentKind::Or => Some(GateKind::Or),
            ComponentKind::Not => Some(GateKind::Not),
            ComponentKind::Led | ComponentKind::Switch => None,
        }
    }
}

impl From<GateKind> for ComponentKind {
    fn from(kind: GateKind) -> Self {
        match kind {
            GateKind::And => ComponentKind::And,
            GateKind::Or => ComponentKind::Or,
            GateKind::Not => ComponentKind::Not,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::And => write!(f, "AND"),
            ComponentKind::Or => write!(f, "OR"),
            ComponentKind::Not => write!(f, "NOT"),
            ComponentKind::Led => write!(f, "LED"),
            ComponentKind::Switch => write!(f, "SWITCH"),
        }
    }
}

impl FromStr for ComponentKind {
    type Err = LogicSimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LED" => Ok(ComponentKind::Led),
            "SWITCH" => Ok(ComponentKind::Switch),
            other => other.parse::<GateKind>().map(ComponentKind::from),
        }
    }
}

/// Layout position; never read by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift by `(dx, dy)`, clamping at the `i32` range.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

/// An input slot on a gate or LED
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPort {
    pub index: u8,
    #[serde(default)]
    pub signal: Signal,
    /// Component driving this port, if wired
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ComponentId>,
}

impl InputPort {
    pub fn new(index: u8) -> Self {
        Self {
            index,
            signal: Signal::Unset,
            source: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.source.is_some()
    }
}

/// Kind-specific payload of a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComponentBody {
    Gate {
        kind: GateKind,
        inputs: Vec<InputPort>,
        #[serde(default)]
        output: Signal,
    },
    Led {
        input: InputPort,
        #[serde(default)]
        on: bool,
    },
    Switch {
        #[serde(default)]
        on: bool,
    },
}

/// A placed component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub position: Position,
    #[serde(default)]
    pub row: i32,
    #[serde(default)]
    pub column: i32,
    pub body: ComponentBody,
}

impl Component {
    pub fn gate(id: ComponentId, kind: GateKind, position: Position) -> Self {
        let inputs = (0..kind.input_count() as u8).map(InputPort::new).collect();
        Self {
            id,
            position,
            row: 0,
            column: 0,
            body: ComponentBody::Gate {
                kind,
                inputs,
                output: Signal::Unset,
            },
        }
    }

    pub fn led(id: ComponentId, position: Position) -> Self {
        Self {
            id,
            position,
            row: 0,
            column: 0,
            body: ComponentBody::Led {
                input: InputPort::new(0),
                on: false,
            },
        }
    }

    pub fn switch(id: ComponentId, position: Position) -> Self {
        Self {
            id,
            position,
            row: 0,
            column: 0,
            body: ComponentBody::Switch { on: false },
        }
    }

    pub fn kind(&self) -> ComponentKind {
        match &self.body {
            ComponentBody::Gate { kind, .. } => ComponentKind::from(*kind),
            ComponentBody::Led { .. } => ComponentKind::Led,
            ComponentBody::Switch { .. } => ComponentKind::Switch,
        }
    }

    pub fn is_gate(&self) -> bool {
        matches!(self.body, ComponentBody::Gate { .. })
    }

    pub fn is_led(&self) -> bool {
        matches!(self.body, ComponentBody::Led { .. })
    }

    pub fn is_switch(&self) -> bool {
        matches!(self.body, ComponentBody::Switch { .. })
    }

    /// Label used in truth tables and reports, e.g. `AND#3`
    pub fn label(&self) -> String {
        format!("{}#{}", self.kind(), self.id)
    }

    pub fn inputs(&self) -> &[InputPort] {
        match &self.body {
            ComponentBody::Gate { inputs, .. } => inputs,
            ComponentBody::Led { input, .. } => std::slice::from_ref(input),
            ComponentBody::Switch { .. } => &[],
        }
    }

    pub fn inputs_mut(&mut self) -> &mut [InputPort] {
        match &mut self.body {
            ComponentBody::Gate { inputs, .. } => inputs,
            ComponentBody::Led { input, .. } => std::slice::from_mut(input),
            ComponentBody::Switch { .. } => &mut [],
        }
    }

    pub fn input(&self, index: u8) -> Option<&InputPort> {
        self.inputs().get(index as usize)
    }

    pub fn input_mut(&mut self, index: u8) -> Option<&mut InputPort> {
        self.inputs_mut().get_mut(index as usize)
    }

    /// Signal this component drives onto its outgoing connectors.
    ///
    /// Switches and LEDs never drive `Unset`.
    pub fn output(&self) -> Signal {
        match &self.body {
            ComponentBody::Gate { output, .. } => *output,
            ComponentBody::Led { on, .. } | ComponentBody::Switch { on } => Signal::from_bool(*on),
        }
    }

    /// Boolean state of a switch or LED; `None` for gates.
    pub fn state(&self) -> Option<bool> {
        match &self.body {
            ComponentBody::Gate { .. } => None,
            ComponentBody::Led { on, .. } | ComponentBody::Switch { on } => Some(*on),
        }
    }

    /// Set a switch's state. Returns false for any other kind.
    pub fn set_switch(&mut self, value: bool) -> bool {
        match &mut self.body {
            ComponentBody::Switch { on } => {
                *on = value;
                true
            }
            _ => false,
        }
    }

    /// Recompute the output (gates) or on-state (LEDs) from the input ports.
    ///
    /// Returns true when the observable value changed. Switches are driven
    /// externally and never change here.
    pub fn recompute(&mut self) -> bool {
        match &mut self.body {
            ComponentBody::Gate {
                kind,
                inputs,
                output,
            } => {
                let next = kind.evaluate(inputs);
                let changed = next != *output;
                *output = next;
                changed
            }
            ComponentBody::Led { input, on } => {
                let next = input.signal == Signal::One;
                let changed = next != *on;
                *on = next;
                changed
            }
            ComponentBody::Switch { .. } => false,
        }
    }
}

/// Directed wire from a component's output to an input port of another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    pub id: ConnectorId,
    pub source: ComponentId,
    pub target: ComponentId,
    pub input: u8,
    /// Display tag, ignored by the simulation
    #[serde(default)]
    pub color: String,
}

impl Connector {
    pub fn new(
        id: ConnectorId,
        source: ComponentId,
        target: ComponentId,
        input: u8,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id,
            source,
            target,
            input,
            color: color.into(),
        }
    }

    pub fn touches(&self, component: ComponentId) -> bool {
        self.source == component || self.target == component
    }
}
