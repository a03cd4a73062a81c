//! Data models for storage

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::analysis::StructuredRecord;

/// A saved consultation: transcript plus the note generated from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Unique identifier (`<epoch millis>-<random base36>`)
    pub id: String,

    /// Human-readable creation date
    pub date: String,

    /// Creation time in epoch milliseconds
    pub timestamp: i64,

    /// Sanitized transcript that was analyzed
    pub transcript: String,

    /// Structured note returned by the analysis
    pub analysis: StructuredRecord,
}

impl HistoryRecord {
    /// Create a record stamped with `created_at`
    pub fn new<Tz: TimeZone>(
        id: String,
        created_at: DateTime<Tz>,
        transcript: String,
        analysis: StructuredRecord,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            id,
            date: created_at.format("%b %-d, %Y, %I:%M %p").to_string(),
            timestamp: created_at.timestamp_millis(),
            transcript,
            analysis,
        }
    }
}

/// Aggregate figures over the saved history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    /// Number of saved consultations
    pub total: usize,

    /// Estimated minutes saved, a fixed per-consultation credit
    pub time_saved: u64,

    /// Date of the most recent consultation, or "N/A"
    pub last_date: String,
}

impl HistoryStats {
    pub fn from_records(records: &[HistoryRecord], minutes_per_consultation: u64) -> Self {
        Self {
            total: records.len(),
            time_saved: records.len() as u64 * minutes_per_consultation,
            last_date: records
                .first()
                .map(|r| r.date.clone())
                .unwrap_or_else(|| "N/A".to_string()),
        }
    }
}
