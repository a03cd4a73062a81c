//! SQLite-backed consultation history

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;

use crate::config::Settings;
use crate::storage::models::HistoryRecord;
use crate::storage::HistoryBackend;

/// Database wrapper for soapnote
pub struct Database {
    conn: Connection,
}

const CURRENT_SCHEMA_VERSION: i64 = 1;

impl Database {
    /// Open or create the database
    pub fn open(settings: &Settings) -> Result<Self> {
        settings.ensure_dirs()?;
        Self::open_path(&settings.database_path())
    }

    /// Open database at a specific path (useful for testing)
    pub fn open_path(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize database schema
    fn initialize(&self) -> Result<()> {
        let current_version = self.schema_version()?;
        if current_version > CURRENT_SCHEMA_VERSION {
            anyhow::bail!(
                "Database schema version {} is newer than supported version {}",
                current_version,
                CURRENT_SCHEMA_VERSION
            );
        }

        if current_version < 1 {
            self.migrate_to_v1()?;
            self.set_schema_version(1)?;
        }

        Ok(())
    }

    /// Current schema version tracked in PRAGMA user_version.
    pub fn schema_version(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?)
    }

    fn set_schema_version(&self, version: i64) -> Result<()> {
        self.conn
            .execute_batch(&format!("PRAGMA user_version = {}", version))?;
        Ok(())
    }

    fn migrate_to_v1(&self) -> Result<()> {
        // `seq` records insertion order; the newest row is the front of the list.
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS consultations (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                date TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                transcript TEXT NOT NULL,
                analysis TEXT NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    /// All consultations, most recent first
    pub fn list_consultations(&self) -> Result<Vec<HistoryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, timestamp, transcript, analysis
             FROM consultations
             ORDER BY seq DESC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, date, timestamp, transcript, analysis)| {
                let analysis = serde_json::from_str(&analysis)
                    .with_context(|| format!("Corrupt analysis for consultation {}", id))?;
                Ok(HistoryRecord {
                    id,
                    date,
                    timestamp,
                    transcript,
                    analysis,
                })
            })
            .collect()
    }

    /// Put a consultation at the front of the list and evict everything past `max_entries`
    pub fn save_consultation(&self, record: &HistoryRecord, max_entries: usize) -> Result<()> {
        let analysis_json = serde_json::to_string(&record.analysis)?;
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM consultations WHERE id = ?1", params![record.id])?;
        tx.execute(
            r#"
            INSERT INTO consultations (id, date, timestamp, transcript, analysis)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.id,
                record.date,
                record.timestamp,
                record.transcript,
                analysis_json,
            ],
        )?;
        tx.execute(
            r#"
            DELETE FROM consultations
            WHERE seq NOT IN (
                SELECT seq FROM consultations ORDER BY seq DESC LIMIT ?1
            )
            "#,
            params![max_entries as i64],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Delete a consultation by ID
    pub fn delete_consultation(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM consultations WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Delete every consultation
    pub fn clear_consultations(&self) -> Result<()> {
        self.conn.execute("DELETE FROM consultations", [])?;
        Ok(())
    }
}

impl HistoryBackend for Database {
    fn load(&self) -> Result<Vec<HistoryRecord>> {
        self.list_consultations()
    }

    fn save_front(&self, record: &HistoryRecord, max_entries: usize) -> Result<Vec<HistoryRecord>> {
        self.save_consultation(record, max_entries)?;
        self.list_consultations()
    }

    fn remove(&self, id: &str) -> Result<Vec<HistoryRecord>> {
        self.delete_consultation(id)?;
        self.list_consultations()
    }

    fn clear(&self) -> Result<()> {
        self.clear_consultations()
    }
}
