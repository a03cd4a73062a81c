//! Client-side flow: sanitize, submit, remember

use chrono::{DateTime, Local, Utc};
use tracing::info;

use crate::analysis::{AnalysisError, StructuredRecord};
use crate::consultation::client::AnalysisClient;
use crate::storage::{ConsultationHistory, HistoryRecord};

/// Shortest transcript worth sending to the model.
pub const MIN_TRANSCRIPT_CHARS: usize = 20;

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Trim, drop angle brackets and enforce the minimum length.
pub fn validate_and_sanitize(raw: &str) -> Result<String, AnalysisError> {
    let sanitized: String = raw.trim().chars().filter(|c| !matches!(c, '<' | '>')).collect();
    let sanitized = sanitized.trim().to_string();

    let actual = sanitized.chars().count();
    if actual < MIN_TRANSCRIPT_CHARS {
        return Err(AnalysisError::TranscriptTooShort {
            min: MIN_TRANSCRIPT_CHARS,
            actual,
        });
    }

    Ok(sanitized)
}

/// `<epoch millis>-<9 random base36 chars>`; unique enough for a single local user.
pub fn generate_id(now: DateTime<Utc>) -> String {
    let mut bits = uuid::Uuid::new_v4().as_u128();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| {
            let digit = (bits % 36) as usize;
            bits /= 36;
            BASE36[digit] as char
        })
        .collect();
    format!("{}-{}", now.timestamp_millis(), suffix)
}

/// Drives one consultation from raw text to a saved history record.
pub struct Orchestrator {
    client: Box<dyn AnalysisClient>,
}

impl Orchestrator {
    pub fn new(client: Box<dyn AnalysisClient>) -> Self {
        Self { client }
    }

    /// Send an already sanitized transcript to the analysis service.
    pub async fn submit(&self, transcript: &str) -> Result<StructuredRecord, AnalysisError> {
        self.client.analyze(transcript).await
    }

    /// Stamp a new history record and hand it to the history store.
    pub fn record_history(
        &self,
        history: &mut ConsultationHistory,
        transcript: String,
        analysis: StructuredRecord,
    ) -> HistoryRecord {
        let now = Utc::now();
        let record = HistoryRecord::new(
            generate_id(now),
            now.with_timezone(&Local),
            transcript,
            analysis,
        );
        history.upsert_front(record.clone());
        info!("Saved consultation {}", record.id);
        record
    }

    /// Validate, analyze and (when a history is given) save a consultation.
    ///
    /// Nothing is submitted if validation fails.
    pub async fn run(
        &self,
        raw: &str,
        history: Option<&mut ConsultationHistory>,
    ) -> Result<ConsultationResult, AnalysisError> {
        let transcript = validate_and_sanitize(raw)?;
        let analysis = self.submit(&transcript).await?;

        let saved = history.map(|h| self.record_history(h, transcript.clone(), analysis.clone()));

        Ok(ConsultationResult {
            transcript,
            analysis,
            saved,
        })
    }
}

/// What `Orchestrator::run` produced.
#[derive(Debug, Clone)]
pub struct ConsultationResult {
    pub transcript: String,
    pub analysis: StructuredRecord,
    pub saved: Option<HistoryRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingClient {
        calls: Arc<AtomicUsize>,
        result: Result<StructuredRecord, AnalysisError>,
    }

    #[async_trait]
    impl AnalysisClient for CountingClient {
        async fn analyze(&self, _transcript: &str) -> Result<StructuredRecord, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn orchestrator(result: Result<StructuredRecord, AnalysisError>) -> (Orchestrator, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = CountingClient {
            calls: calls.clone(),
            result,
        };
        (Orchestrator::new(Box::new(client)), calls)
    }

    #[test]
    fn short_transcripts_are_rejected() {
        for raw in ["", "   ", "too short", "  <<<<<<<<<<<<>>>>>>>>>>  ", "nineteen characters"] {
            assert!(
                matches!(
                    validate_and_sanitize(raw),
                    Err(AnalysisError::TranscriptTooShort { min: 20, .. })
                ),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn sanitize_strips_angle_brackets_and_whitespace() {
        let cleaned =
            validate_and_sanitize("  Patient: <b>fever</b> for two days now  ").unwrap();
        assert_eq!(cleaned, "Patient: bfever/b for two days now");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert!(validate_and_sanitize(&"é".repeat(19)).is_err());
        assert!(validate_and_sanitize(&"é".repeat(20)).is_ok());
    }

    #[test]
    fn ids_are_time_prefixed_and_distinct() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
        let a = generate_id(now);
        let b = generate_id(now);

        let (millis, suffix) = a.split_once('-').unwrap();
        assert_eq!(millis, now.timestamp_millis().to_string());
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn empty_input_never_reaches_the_service() {
        let (orchestrator, calls) = orchestrator(Ok(StructuredRecord::default()));
        let result = orchestrator.run("", None).await;

        assert!(matches!(result, Err(AnalysisError::TranscriptTooShort { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn upstream_errors_are_surfaced() {
        let (orchestrator, calls) =
            orchestrator(Err(AnalysisError::Upstream("rate limited".to_string())));
        let result = orchestrator
            .run("Doctor: how are you feeling today?", None)
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.unwrap_err().to_string(), "rate limited");
    }

    #[tokio::test]
    async fn successful_run_without_history_saves_nothing() {
        let mut note = StructuredRecord::default();
        note.diagnosis = "Influenza".to_string();
        let (orchestrator, _) = orchestrator(Ok(note));

        let result = orchestrator
            .run("Doctor: fever? Patient: yes, and a headache", None)
            .await
            .unwrap();
        assert_eq!(result.analysis.diagnosis, "Influenza");
        assert!(result.saved.is_none());
    }
}
