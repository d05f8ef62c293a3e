//! SQLite-backed [`Storage`] implementation: one row per run id, the whole
//! [`Snapshot`] serialized as JSON so a single `INSERT OR REPLACE` is the
//! durability contract's one atomic write.

use crate::persistence::schema::SCHEMA_SQL;
use crate::persistence::{Snapshot, Storage, StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL; PRAGMA foreign_keys = ON;",
        )?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl Storage for SqliteStore {
    fn load_snapshot(&self, run_id: &str) -> StorageResult<Option<Snapshot>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Lock(format!("failed to lock connection: {e}")))?;
        let json: Option<String> = conn
            .query_row(
                "SELECT snapshot_json FROM run_snapshots WHERE run_id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save_snapshot(&self, run_id: &str, snapshot: &Snapshot) -> StorageResult<()> {
        let json = serde_json::to_string(snapshot)?;
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Lock(format!("failed to lock connection: {e}")))?;
        conn.execute(
            "INSERT INTO run_snapshots (run_id, snapshot_json, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(run_id) DO UPDATE SET
                snapshot_json = excluded.snapshot_json,
                updated_at = excluded.updated_at",
            params![run_id, json, Utc::now().to_rfc3339()],
        )
        .map_err(StorageError::from)?;
        Ok(())
    }

    fn list_run_ids(&self) -> StorageResult<Vec<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Lock(format!("failed to lock connection: {e}")))?;
        let mut stmt = conn.prepare("SELECT run_id FROM run_snapshots")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}
