//! Project persistence.
//!
//! The engine only needs circuits rebuilt with the same component and
//! connector shape; `ProjectStore` is the contract, `SqliteStore` the
//! bundled implementation.

pub mod sqlite;

use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::{Project, ProjectId};

pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Lock error: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

pub trait ProjectStore {
    /// Insert or fully replace a project
    fn save(&self, project: &Project) -> Result<()>;

    fn load(&self, id: ProjectId) -> Result<Option<Project>>;

    /// An id no stored project uses yet
    fn next_project_id(&self) -> Result<ProjectId>;

    /// Saved projects, id → name
    fn list_projects(&self) -> Result<BTreeMap<ProjectId, String>>;

    /// Returns false when no such project was stored
    fn delete(&self, id: ProjectId) -> Result<bool>;
}
