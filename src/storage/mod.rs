//! Storage module for soapnote
//!
//! Keeps a capped, most-recent-first history of analyzed consultations in SQLite.

mod database;
mod models;
mod repository;

pub use database::Database;
pub use models::{HistoryRecord, HistoryStats};
pub use repository::{ConsultationHistory, HistoryBackend};
