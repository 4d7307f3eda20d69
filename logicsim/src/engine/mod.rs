//! Simulation engine: fixed-point propagation and truth-table generation.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │  Connectors  │───▶│ Input ports  │───▶│    Gates     │
//! │  (sources)   │    │  (signals)   │    │ (recompute)  │
//! └──────────────┘    └──────────────┘    └──────┬───────┘
//!        ▲                                       │
//!        └──────────── repeat until quiet ───────┘
//!                     (or round cap), then LEDs
//! ```

pub mod propagate;
pub mod truth_table;

pub use propagate::{SimulationReport, Simulator};
pub use truth_table::{FreeInput, TruthRow, TruthTable, TruthTableGenerator};
