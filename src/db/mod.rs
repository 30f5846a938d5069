use crate::errors::{AppError, AppResult};
use crate::models::{RegistryEntry, WorkspaceIdentity};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use std::sync::Mutex;

const SCHEMA_SQL: &str = include_str!("schema.sql");

pub trait RegistryStore: Send + Sync {
    fn upsert(&self, entry: &RegistryEntry) -> AppResult<()>;

    fn list_all(&self) -> AppResult<Vec<RegistryEntry>>;
}

// Failures are logged only; the next workspace open rewrites the row.
pub fn record_workspace(registry: &dyn RegistryStore, identity: &WorkspaceIdentity) {
    match registry.upsert(&RegistryEntry::from(identity)) {
        Ok(()) => tracing::debug!(workspace_id = %identity.workspace_id, "registry entry updated"),
        Err(error) => tracing::warn!(
            workspace_id = %identity.workspace_id,
            error = %error,
            "registry upsert failed"
        ),
    }
}

#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;
        tracing::debug!(path = %path.display(), "registry database opened");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory().map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn get(&self, workspace_id: &str) -> AppResult<Option<RegistryEntry>> {
        let conn = self.lock()?;
        let entry = conn
            .query_row(
                "SELECT workspaceID, workspacePath FROM notesMetadata WHERE workspaceID = ?1",
                [workspace_id],
                |row| {
                    Ok(RegistryEntry {
                        workspace_id: row.get(0)?,
                        workspace_path: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))
    }
}

impl RegistryStore for Database {
    fn upsert(&self, entry: &RegistryEntry) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO notesMetadata (workspaceID, workspacePath)
             VALUES (?1, ?2)
             ON CONFLICT(workspaceID) DO UPDATE SET workspacePath = excluded.workspacePath",
            params![entry.workspace_id, entry.workspace_path],
        )?;
        Ok(())
    }

    fn list_all(&self) -> AppResult<Vec<RegistryEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT workspaceID, workspacePath FROM notesMetadata")?;
        let rows = stmt.query_map([], |row| {
            Ok(RegistryEntry {
                workspace_id: row.get(0)?,
                workspace_path: row.get(1)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}
