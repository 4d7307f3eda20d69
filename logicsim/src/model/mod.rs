//! Circuit data model: signals, components, connectors, circuits and projects.

pub mod circuit;
pub mod schema;

pub use circuit::{Circuit, Project};
pub use schema::*;
