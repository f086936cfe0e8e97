use super::prefs::{PreferenceStore, UpdateFn};
use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// SQLite-backed preference store.
///
/// Runs in WAL mode with a busy timeout so a second process (or a second
/// connection) can share the file. `update` uses an IMMEDIATE transaction,
/// which takes the write lock before reading.
pub struct SqlitePreferences {
    db_path: String,
    conn: Mutex<Connection>,
}

impl SqlitePreferences {
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().display().to_string();
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open SQLite database at {}", db_path))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        conn.busy_timeout(Duration::from_secs(5))?;

        let store = Self {
            db_path,
            conn: Mutex::new(conn),
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )
        .context("Failed to create preferences table")?;

        info!("SQLite preference store initialized at {}", self.db_path);
        Ok(())
    }

    pub fn path(&self) -> &str {
        &self.db_path
    }
}

fn read_value(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.prepare_cached("SELECT value FROM preferences WHERE key = ?1")?
        .query_row(params![key], |row| row.get(0))
        .optional()
}

fn write_value(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )?;
    stmt.execute(params![key, value, Utc::now().timestamp_millis()])?;
    Ok(())
}

impl PreferenceStore for SqlitePreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        read_value(&conn, key).with_context(|| format!("Failed to read key {}", key))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock();
        write_value(&conn, key, value).with_context(|| format!("Failed to write key {}", key))
    }

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<String> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = read_value(&tx, key)?;
        // Dropping `tx` on error rolls back
        let next = f(current)?;
        write_value(&tx, key, &next)?;
        tx.commit()
            .with_context(|| format!("Failed to commit update of key {}", key))?;
        Ok(next)
    }
}
