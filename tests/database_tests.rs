use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use tempfile::tempdir;

use soapnote::analysis::StructuredRecord;
use soapnote::storage::{ConsultationHistory, Database, HistoryRecord};

fn record(n: i64) -> HistoryRecord {
    let created = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap() + Duration::minutes(n);
    let mut analysis = StructuredRecord::default();
    analysis.diagnosis = format!("Diagnosis {}", n);
    HistoryRecord::new(
        format!("{}-consult{}", created.timestamp_millis(), n),
        created,
        format!("Doctor and patient talk about case number {}", n),
        analysis,
    )
}

#[test]
fn history_is_capped_at_most_recent_twenty() -> Result<()> {
    let tmp = tempdir()?;
    let db = Database::open_path(&tmp.path().join("consultations.db"))?;

    for n in 0..25 {
        db.save_consultation(&record(n), 20)?;
    }

    let records = db.list_consultations()?;
    assert_eq!(records.len(), 20);
    assert_eq!(records[0].analysis.diagnosis, "Diagnosis 24");
    assert_eq!(records[19].analysis.diagnosis, "Diagnosis 5");

    Ok(())
}

#[test]
fn history_survives_reopen() -> Result<()> {
    let tmp = tempdir()?;
    let db_path = tmp.path().join("consultations.db");

    {
        let db = Database::open_path(&db_path)?;
        db.save_consultation(&record(1), 20)?;
        db.save_consultation(&record(2), 20)?;
    }

    let db = Database::open_path(&db_path)?;
    let mut history = ConsultationHistory::with_backend(Box::new(db), 20, 30);
    let records = history.list();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], record(2));
    assert_eq!(records[1], record(1));

    Ok(())
}

#[test]
fn resaving_moves_record_to_front() -> Result<()> {
    let tmp = tempdir()?;
    let db = Database::open_path(&tmp.path().join("consultations.db"))?;
    let mut history = ConsultationHistory::with_backend(Box::new(db), 20, 30);

    history.upsert_front(record(1));
    history.upsert_front(record(2));
    let records = history.upsert_front(record(1));

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, record(1).id);

    Ok(())
}

#[test]
fn delete_and_clear() -> Result<()> {
    let tmp = tempdir()?;
    let db = Database::open_path(&tmp.path().join("consultations.db"))?;
    let mut history = ConsultationHistory::with_backend(Box::new(db), 20, 30);

    for n in 0..3 {
        history.upsert_front(record(n));
    }

    let remaining = history.remove_by_id(&record(1).id);
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|r| r.id != record(1).id));

    // Unknown ids are ignored
    assert_eq!(history.remove_by_id("missing").len(), 2);

    let stats = history.stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.time_saved, 60);
    assert_eq!(stats.last_date, record(2).date);

    history.clear();
    assert!(history.list().is_empty());
    assert_eq!(history.stats().last_date, "N/A");

    Ok(())
}

#[test]
fn newer_schema_is_rejected() -> Result<()> {
    let tmp = tempdir()?;
    let db_path = tmp.path().join("consultations.db");

    {
        let conn = rusqlite::Connection::open(&db_path)?;
        conn.pragma_update(None, "user_version", 99)?;
    }

    let err = match Database::open_path(&db_path) {
        Ok(_) => panic!("opening a newer schema should fail"),
        Err(e) => e,
    };
    assert!(err.to_string().contains("newer than supported"));

    Ok(())
}
