//! Page-metadata store (spec §6): `upsert(pageRecord)` keyed by
//! `(runId, url)`. Best-effort by spec §5/§7 — a write here never rolls
//! back the coordinator mutation it followed, and failures are logged, not
//! surfaced to the worker.

use crate::collaborators::{CollaboratorError, CollaboratorResult};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Field list per spec §6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub run_id: String,
    pub url: String,
    pub domain: String,
    pub status: Option<u16>,
    pub content_hash: Option<String>,
    pub content_size: Option<u64>,
    pub response_time_ms: Option<u64>,
    pub fetched_at: i64,
    pub error: Option<String>,
}

pub trait PageMetadataStore: Send + Sync {
    fn upsert(&self, record: &PageRecord) -> CollaboratorResult<()>;
}

/// SQLite-backed `PageMetadataStore`: one row per `(runId, url)`, matching
/// the teacher's one-table-per-concern layout in `storage::schema`.
pub struct SqlitePageMetadataStore {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS page_metadata (
    run_id TEXT NOT NULL,
    url TEXT NOT NULL,
    domain TEXT NOT NULL,
    status INTEGER,
    content_hash TEXT,
    content_size INTEGER,
    response_time_ms INTEGER,
    fetched_at INTEGER NOT NULL,
    error TEXT,
    PRIMARY KEY (run_id, url)
);
";

impl SqlitePageMetadataStore {
    pub fn open(path: &std::path::Path) -> CollaboratorResult<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> CollaboratorResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> CollaboratorResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

impl PageMetadataStore for SqlitePageMetadataStore {
    fn upsert(&self, record: &PageRecord) -> CollaboratorResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CollaboratorError::Lock(format!("failed to lock connection: {e}")))?;
        conn.execute(
            "INSERT INTO page_metadata
                (run_id, url, domain, status, content_hash, content_size, response_time_ms, fetched_at, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(run_id, url) DO UPDATE SET
                domain = excluded.domain,
                status = excluded.status,
                content_hash = excluded.content_hash,
                content_size = excluded.content_size,
                response_time_ms = excluded.response_time_ms,
                fetched_at = excluded.fetched_at,
                error = excluded.error",
            params![
                record.run_id,
                record.url,
                record.domain,
                record.status,
                record.content_hash,
                record.content_size,
                record.response_time_ms,
                record.fetched_at,
                record.error,
            ],
        )?;
        Ok(())
    }
}
