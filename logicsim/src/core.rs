//! Error type and engine configuration shared by the library and the CLI.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{CircuitId, ComponentId, ConnectorId};

#[derive(Debug, thiserror::Error)]
pub enum LogicSimError {
    #[error("Unknown component kind: {0}")]
    UnknownKind(String),
    #[error("Component {0} not found")]
    ComponentNotFound(ComponentId),
    #[error("Connector {0} not found")]
    ConnectorNotFound(ConnectorId),
    #[error("Circuit {0} not found")]
    CircuitNotFound(CircuitId),
    #[error("No active circuit")]
    NoActiveCircuit,
    #[error("Component {component} has no input port {index}")]
    InvalidPort { component: ComponentId, index: u8 },
    #[error("Component {component} is not a {expected}")]
    WrongKind {
        component: ComponentId,
        expected: &'static str,
    },
    #[error("Connector {connector} references component {component} outside the cloned set")]
    MalformedClone {
        connector: ConnectorId,
        component: ComponentId,
    },
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Netlist(#[from] crate::netlist::NetlistError),
    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}

fn default_max_rounds() -> usize {
    10
}

fn default_max_table_rows() -> usize {
    1024
}

/// Bounds on simulation work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Propagation rounds before giving up on a fixed point
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
    /// Truth-table rows enumerated at most
    #[serde(default = "default_max_table_rows")]
    pub max_table_rows: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            max_table_rows: default_max_table_rows(),
        }
    }
}

impl EngineConfig {
    /// Load a JSON config file; missing fields take their defaults.
    pub fn from_path(path: &Path) -> Result<Self, LogicSimError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, LogicSimError> {
        let config: EngineConfig =
            serde_json::from_str(content).map_err(|e| LogicSimError::Config(e.to_string()))?;
        if config.max_rounds == 0 {
            return Err(LogicSimError::Config("max_rounds must be at least 1".to_string()));
        }
        if config.max_table_rows == 0 {
            return Err(LogicSimError::Config(
                "max_table_rows must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.max_rounds, 10);
        assert_eq!(config.max_table_rows, 1024);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "max_rounds": 25 }"#).unwrap();
        assert_eq!(config.max_rounds, 25);
        assert_eq!(config.max_table_rows, 1024);
    }

    #[test]
    fn test_zero_bounds_rejected() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "max_rounds": 0 }"#),
            Err(LogicSimError::Config(_))
        ));
        assert!(EngineConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{ "max_table_rows": 16 }"#).unwrap();
        let config = EngineConfig::from_path(&path).unwrap();
        assert_eq!(config.max_table_rows, 16);
        assert_eq!(config.max_rounds, 10);
    }
}
