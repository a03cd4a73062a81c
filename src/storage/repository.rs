//! Capped consultation history with an in-memory fallback
//!
//! Backend failures never reach the caller: they are logged and the last list
//! successfully read from or written to the backend is returned instead.

use anyhow::Result;
use tracing::warn;

use crate::config::Settings;
use crate::storage::models::{HistoryRecord, HistoryStats};
use crate::storage::Database;

/// Persistence operations the history needs from a backend.
pub trait HistoryBackend: Send {
    /// All records, most recent first
    fn load(&self) -> Result<Vec<HistoryRecord>>;

    /// Insert or move `record` to the front, keep at most `max_entries`, return the new list
    fn save_front(&self, record: &HistoryRecord, max_entries: usize) -> Result<Vec<HistoryRecord>>;

    /// Remove the record with `id`, return the new list
    fn remove(&self, id: &str) -> Result<Vec<HistoryRecord>>;

    /// Remove everything
    fn clear(&self) -> Result<()>;
}

/// Consultation history as seen by the application
pub struct ConsultationHistory {
    backend: Box<dyn HistoryBackend>,
    cache: Vec<HistoryRecord>,
    max_entries: usize,
    minutes_per_consultation: u64,
}

impl ConsultationHistory {
    /// Open the SQLite history configured in `settings`
    pub fn open(settings: &Settings) -> Result<Self> {
        let db = Database::open(settings)?;
        Ok(Self::with_backend(
            Box::new(db),
            settings.history.max_entries,
            settings.history.minutes_saved_per_consultation,
        ))
    }

    /// Wrap an arbitrary backend, priming the cache from it
    pub fn with_backend(
        backend: Box<dyn HistoryBackend>,
        max_entries: usize,
        minutes_per_consultation: u64,
    ) -> Self {
        let cache = backend.load().unwrap_or_else(|e| {
            warn!("Error loading consultations: {:#}", e);
            Vec::new()
        });

        Self {
            backend,
            cache,
            max_entries,
            minutes_per_consultation,
        }
    }

    /// All consultations, most recent first
    pub fn list(&mut self) -> Vec<HistoryRecord> {
        match self.backend.load() {
            Ok(records) => self.cache = records,
            Err(e) => warn!("Error loading consultations: {:#}", e),
        }
        self.cache.clone()
    }

    /// Save a consultation at the front of the history
    pub fn upsert_front(&mut self, record: HistoryRecord) -> Vec<HistoryRecord> {
        match self.backend.save_front(&record, self.max_entries) {
            Ok(records) => self.cache = records,
            Err(e) => warn!("Error saving consultation {}: {:#}", record.id, e),
        }
        self.cache.clone()
    }

    /// Delete a consultation
    pub fn remove_by_id(&mut self, id: &str) -> Vec<HistoryRecord> {
        match self.backend.remove(id) {
            Ok(records) => self.cache = records,
            Err(e) => warn!("Error deleting consultation {}: {:#}", id, e),
        }
        self.cache.clone()
    }

    /// Delete every consultation
    pub fn clear(&mut self) {
        if let Err(e) = self.backend.clear() {
            warn!("Error clearing consultations: {:#}", e);
        }
        self.cache.clear();
    }

    /// Totals for the stats bar
    pub fn stats(&mut self) -> HistoryStats {
        let records = self.list();
        HistoryStats::from_records(&records, self.minutes_per_consultation)
    }

    /// Find a consultation by exact ID or unique ID prefix
    pub fn find(&mut self, prefix: &str) -> Option<HistoryRecord> {
        let records = self.list();
        if let Some(exact) = records.iter().find(|r| r.id == prefix) {
            return Some(exact.clone());
        }

        let mut matches = records.into_iter().filter(|r| r.id.starts_with(prefix));
        let first = matches.next()?;
        if matches.next().is_some() {
            warn!("ID prefix '{}' matches more than one consultation", prefix);
            return None;
        }
        Some(first)
    }
}
