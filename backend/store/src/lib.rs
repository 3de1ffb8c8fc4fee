//! Local persistent state, the offline counterpart of the hosted tables.
//!
//! A single SQLite database at `{config_dir}/plantdoc.db` holds the scan
//! history cache, user preferences, the persisted auth session, and the
//! last analysis (so `results` can re-render without a network call).
//! Reads never fail on corrupted rows; they are logged and treated as
//! absent.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use tokio::sync::Mutex;
use tracing::info;

pub mod history;
pub mod prefs;
pub mod session;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS prefs (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS session (
        id      INTEGER PRIMARY KEY CHECK (id = 0),
        payload TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS last_scan (
        id      INTEGER PRIMARY KEY CHECK (id = 0),
        payload TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS scan_history (
        id              TEXT PRIMARY KEY,
        scanned_at      INTEGER NOT NULL,
        plant_name      TEXT NOT NULL,
        scientific_name TEXT,
        is_healthy      INTEGER NOT NULL,
        health_score    REAL NOT NULL,
        image_path      TEXT NOT NULL,
        analysis        TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_scan_history_scanned ON scan_history(scanned_at);
";

pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    /// Create or open the database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .context("Failed to open the local state database")?;
        conn.execute_batch(&format!("PRAGMA journal_mode=WAL;{SCHEMA}"))
            .context("Failed to initialize the local state schema")?;
        info!("LocalStore opened at {:?}", path.as_ref());
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (for tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    // Single-row tables (session, last_scan) share one access shape.

    pub(crate) async fn put_singleton(&self, table: &'static str, payload: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            &format!("INSERT OR REPLACE INTO {table} (id, payload) VALUES (0, ?1)"),
            [payload],
        )?;
        Ok(())
    }

    pub(crate) async fn get_singleton(&self, table: &'static str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        let payload = conn
            .query_row(&format!("SELECT payload FROM {table} WHERE id = 0"), [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(payload)
    }

    pub(crate) async fn clear_singleton(&self, table: &'static str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(&format!("DELETE FROM {table}"), [])?;
        Ok(())
    }
}
