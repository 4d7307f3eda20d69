use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{ProjectStore, Result, StoreError};
use crate::model::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = SqliteStore {
            conn: Mutex::new(conn),
        };
        store.initialize()?;
        Ok(store)
    }

    fn get_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn initialize(&self) -> Result<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                saved_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS circuits (
                project_id INTEGER NOT NULL,
                id INTEGER NOT NULL,
                seq INTEGER NOT NULL,
                name TEXT NOT NULL,
                PRIMARY KEY (project_id, id)
            );

            CREATE TABLE IF NOT EXISTS components (
                project_id INTEGER NOT NULL,
                circuit_id INTEGER NOT NULL,
                id INTEGER NOT NULL,
                seq INTEGER NOT NULL,
                kind TEXT NOT NULL,
                x INTEGER NOT NULL,
                y INTEGER NOT NULL,
                row_hint INTEGER NOT NULL,
                column_hint INTEGER NOT NULL,
                body_json TEXT NOT NULL,
                PRIMARY KEY (project_id, circuit_id, id)
            );

            CREATE TABLE IF NOT EXISTS connectors (
                project_id INTEGER NOT NULL,
                circuit_id INTEGER NOT NULL,
                id INTEGER NOT NULL,
                seq INTEGER NOT NULL,
                source_id INTEGER NOT NULL,
                target_id INTEGER NOT NULL,
                input_index INTEGER NOT NULL,
                color TEXT NOT NULL,
                PRIMARY KEY (project_id, circuit_id, id)
            );

            CREATE INDEX IF NOT EXISTS idx_components_circuit
                ON components(project_id, circuit_id);
            CREATE INDEX IF NOT EXISTS idx_connectors_circuit
                ON connectors(project_id, circuit_id);",
        )?;
        Ok(())
    }

    fn delete_rows(tx: &Transaction<'_>, project: i64) -> Result<usize> {
        tx.execute("DELETE FROM connectors WHERE project_id = ?", params![project])?;
        tx.execute("DELETE FROM components WHERE project_id = ?", params![project])?;
        tx.execute("DELETE FROM circuits WHERE project_id = ?", params![project])?;
        Ok(tx.execute("DELETE FROM projects WHERE id = ?", params![project])?)
    }

    fn insert_circuit(
        tx: &Transaction<'_>,
        project: i64,
        seq: usize,
        circuit: &Circuit,
    ) -> Result<()> {
        let circuit_id = circuit.id.0 as i64;
        tx.execute(
            "INSERT INTO circuits (project_id, id, seq, name) VALUES (?1, ?2, ?3, ?4)",
            params![project, circuit_id, seq as i64, circuit.name],
        )?;

        for (seq, component) in circuit.components().enumerate() {
            let body_json = serde_json::to_string(&component.body).map_err(|e| {
                StoreError::Serialization(format!(
                    "Failed to serialize component {}: {}",
                    component.id, e
                ))
            })?;
            tx.execute(
                "INSERT INTO components
                 (project_id, circuit_id, id, seq, kind, x, y, row_hint, column_hint, body_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    project,
                    circuit_id,
                    component.id.0 as i64,
                    seq as i64,
                    component.kind().to_string(),
                    component.position.x,
                    component.position.y,
                    component.row,
                    component.column,
                    body_json,
                ],
            )?;
        }

        for (seq, connector) in circuit.connectors.iter().enumerate() {
            tx.execute(
                "INSERT INTO connectors
                 (project_id, circuit_id, id, seq, source_id, target_id, input_index, color)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    project,
                    circuit_id,
                    connector.id.0 as i64,
                    seq as i64,
                    connector.source.0 as i64,
                    connector.target.0 as i64,
                    connector.input,
                    connector.color,
                ],
            )?;
        }
        Ok(())
    }

    fn load_circuit(conn: &Connection, project: i64, id: i64, name: String) -> Result<Circuit> {
        let mut circuit = Circuit::new(CircuitId(id as u64), name);

        let mut stmt = conn.prepare(
            "SELECT id, x, y, row_hint, column_hint, body_json
             FROM components
             WHERE project_id = ?1 AND circuit_id = ?2
             ORDER BY seq",
        )?;
        let rows = stmt
            .query_map(params![project, id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i32>(1)?,
                    row.get::<_, i32>(2)?,
                    row.get::<_, i32>(3)?,
                    row.get::<_, i32>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for (component_id, x, y, row, column, body_json) in rows {
            let body: ComponentBody = serde_json::from_str(&body_json).map_err(|e| {
                StoreError::Serialization(format!(
                    "Failed to deserialize component {}: {}",
                    component_id, e
                ))
            })?;
            circuit.push_component(Component {
                id: ComponentId(component_id as u64),
                position: Position::new(x, y),
                row,
                column,
                body,
            });
        }

        let mut stmt = conn.prepare(
            "SELECT id, source_id, target_id, input_index, color
             FROM connectors
             WHERE project_id = ?1 AND circuit_id = ?2
             ORDER BY seq",
        )?;
        circuit.connectors = stmt
            .query_map(params![project, id], |row| {
                Ok(Connector {
                    id: ConnectorId(row.get::<_, i64>(0)? as u64),
                    source: ComponentId(row.get::<_, i64>(1)? as u64),
                    target: ComponentId(row.get::<_, i64>(2)? as u64),
                    input: row.get(3)?,
                    color: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(circuit)
    }
}

impl ProjectStore for SqliteStore {
    fn save(&self, project: &Project) -> Result<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let project_id = project.id.0 as i64;

        Self::delete_rows(&tx, project_id)?;
        tx.execute(
            "INSERT INTO projects (id, name, created_at, saved_at)
             VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP)",
            params![project_id, project.name, project.created_at.to_rfc3339()],
        )?;
        for (seq, circuit) in project.circuits.iter().enumerate() {
            Self::insert_circuit(&tx, project_id, seq, circuit)?;
        }

        tx.commit()?;
        tracing::info!(
            "Saved project {} '{}' ({} circuit(s))",
            project.id,
            project.name,
            project.circuits.len()
        );
        Ok(())
    }

    fn load(&self, id: ProjectId) -> Result<Option<Project>> {
        let conn = self.get_conn()?;
        let project_id = id.0 as i64;

        let header = conn
            .query_row(
                "SELECT name, created_at FROM projects WHERE id = ?",
                params![project_id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        let Some((name, created_at)) = header else {
            return Ok(None);
        };
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| {
                StoreError::Serialization(format!("Invalid created_at '{}': {}", created_at, e))
            })?
            .with_timezone(&Utc);

        let mut stmt =
            conn.prepare("SELECT id, name FROM circuits WHERE project_id = ? ORDER BY seq")?;
        let circuit_rows = stmt
            .query_map(params![project_id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut circuits = Vec::with_capacity(circuit_rows.len());
        for (circuit_id, circuit_name) in circuit_rows {
            circuits.push(Self::load_circuit(&conn, project_id, circuit_id, circuit_name)?);
        }

        Ok(Some(Project {
            id,
            name,
            created_at,
            circuits,
        }))
    }

    fn next_project_id(&self) -> Result<ProjectId> {
        let conn = self.get_conn()?;
        let max: i64 = conn.query_row("SELECT COALESCE(MAX(id), 0) FROM projects", [], |row| {
            row.get(0)
        })?;
        Ok(ProjectId(max as u64 + 1))
    }

    fn list_projects(&self) -> Result<BTreeMap<ProjectId, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, name FROM projects")?;
        let projects = stmt
            .query_map([], |row| {
                Ok((ProjectId(row.get::<_, i64>(0)? as u64), row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;
        Ok(projects)
    }

    fn delete(&self, id: ProjectId) -> Result<bool> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let removed = Self::delete_rows(&tx, id.0 as i64)?;
        tx.commit()?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (SqliteStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let store = SqliteStore::open(&db_path).unwrap();
        (store, temp_dir)
    }

    fn sample_project() -> Project {
        let mut project = Project::new(ProjectId(7), "adders");
        let mut main = Circuit::new(CircuitId(1), "main");
        main.push_component(Component::switch(ComponentId(1), Position::new(0, 0)));
        let mut gate = Component::gate(ComponentId(2), GateKind::Or, Position::new(10, 5));
        gate.row = 1;
        gate.column = 2;
        gate.input_mut(1).unwrap().signal = Signal::One;
        main.push_component(gate);
        main.push_component(Component::led(ComponentId(3), Position::new(20, 5)));
        main.connect(Connector::new(ConnectorId(1), ComponentId(1), ComponentId(2), 0, "red"));
        main.connect(Connector::new(ConnectorId(2), ComponentId(2), ComponentId(3), 0, "blue"));
        project.circuits.push(main);
        project.circuits.push(Circuit::new(CircuitId(2), "scratch"));
        project
    }

    #[test]
    fn test_save_and_load() {
        let (store, _temp) = create_test_store();
        let project = sample_project();
        store.save(&project).unwrap();

        let loaded = store.load(ProjectId(7)).unwrap().unwrap();
        assert_eq!(loaded, project);
        assert_eq!(loaded.main_circuit().unwrap().name, "main");
    }

    #[test]
    fn test_load_missing() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.next_project_id().unwrap(), ProjectId(1));
        assert!(store.load(ProjectId(1)).unwrap().is_none());
    }

    #[test]
    fn test_save_replaces_previous_version() {
        let (store, _temp) = create_test_store();
        let mut project = sample_project();
        store.save(&project).unwrap();

        project.name = "renamed".to_string();
        project.circuits.truncate(1);
        project.circuits[0].remove_connector(ConnectorId(2));
        store.save(&project).unwrap();

        let loaded = store.load(ProjectId(7)).unwrap().unwrap();
        assert_eq!(loaded.name, "renamed");
        assert_eq!(loaded.circuits.len(), 1);
        assert_eq!(loaded.circuits[0].connectors.len(), 1);
    }

    #[test]
    fn test_list_and_delete() {
        let store = SqliteStore::in_memory().unwrap();
        store.save(&sample_project()).unwrap();
        store.save(&Project::new(ProjectId(3), "other")).unwrap();

        let listed = store.list_projects().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[&ProjectId(7)], "adders");
        assert_eq!(listed.keys().next(), Some(&ProjectId(3)));

        assert_eq!(store.next_project_id().unwrap(), ProjectId(8));
        assert!(store.delete(ProjectId(3)).unwrap());
        assert!(!store.delete(ProjectId(3)).unwrap());
        assert_eq!(store.list_projects().unwrap().len(), 1);
    }
}
