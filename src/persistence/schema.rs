//! SQL schema for the durable snapshot store.

/// A single table keyed by run id. Each row holds the JSON-serialized
/// [`Snapshot`](crate::persistence::Snapshot) of all five named slots
/// (spec §4.5), so one `INSERT OR REPLACE` is the one atomic write the
/// durability contract requires.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS run_snapshots (
    run_id TEXT PRIMARY KEY,
    snapshot_json TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;
