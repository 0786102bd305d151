// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings store — key-value persistence for watermark records.
//
// Schema:
//   settings(
//     key        TEXT PRIMARY KEY,   -- "watermark-<documentId>"
//     value      TEXT NOT NULL,      -- JSON-encoded WatermarkRecord
//     updated_at TEXT NOT NULL       -- RFC 3339
//   )

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, instrument};
use wasserzeichen_core::error::{Result, WasserzeichenError};

use crate::record::WatermarkRecord;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS settings (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL
);";

fn db_err(e: rusqlite::Error) -> WasserzeichenError {
    WasserzeichenError::Database(e.to_string())
}

/// Key-value storage supplied by the host. Writes replace.
pub trait SettingsStore {
    fn put(&self, key: &str, value: &str) -> Result<()>;

    fn get(&self, key: &str) -> Result<Option<String>>;

    fn save_record(&self, key: &str, record: &WatermarkRecord) -> Result<()> {
        self.put(key, &serde_json::to_string(record)?)
    }

    fn load_record(&self, key: &str) -> Result<Option<WatermarkRecord>> {
        match self.get(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

/// SQLite-backed [`SettingsStore`].
pub struct SqliteSettingsStore {
    conn: Connection,
}

impl SqliteSettingsStore {
    /// Open (or create) the settings database at `path`, in WAL mode.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(db_err)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| WasserzeichenError::Database(format!("WAL pragma: {e}")))?;
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        info!("settings database opened");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        debug!("in-memory settings database opened");
        Ok(Self { conn })
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .map_err(db_err)?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl SettingsStore for SqliteSettingsStore {
    #[instrument(skip(self, value), fields(%key, len = value.len()))]
    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map_err(db_err)?;
        debug!("setting stored");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM settings WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
            .map_err(db_err)
    }
}
