//! Transcript to structured note pipeline

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::analysis::cleanup::{parse_record_json, strip_code_fences};
use crate::analysis::error::AnalysisError;
use crate::analysis::record::{StructuredRecord, UpstreamErrorRecord};
use crate::config::Settings;
use crate::llm::{build_analysis_request, LlmProvider};

/// Terminal result of one analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The model's JSON object, passed through as-is.
    Analyzed(Value),

    /// The reply was not a JSON object; the fixed fallback record stands in.
    Fallback(StructuredRecord),

    /// The model call itself failed.
    UpstreamFailure(UpstreamErrorRecord),
}

impl AnalysisOutcome {
    /// Whether the exchange succeeded at the transport level. Fallbacks do.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::UpstreamFailure(_))
    }

    /// JSON body for the HTTP response.
    pub fn to_body(&self) -> Value {
        match self {
            Self::Analyzed(value) => value.clone(),
            Self::Fallback(record) => serde_json::to_value(record).unwrap_or(Value::Null),
            Self::UpstreamFailure(record) => serde_json::to_value(record).unwrap_or(Value::Null),
        }
    }

    /// Typed record with placeholders for anything the model left out.
    pub fn into_record(self) -> Result<StructuredRecord, AnalysisError> {
        match self {
            Self::Analyzed(value) => Ok(StructuredRecord::from_value(&value)),
            Self::Fallback(record) => Ok(record),
            Self::UpstreamFailure(record) => Err(AnalysisError::Upstream(format!(
                "{}: {}",
                record.error, record.details
            ))),
        }
    }
}

/// Stateless analysis service. Safe to share across concurrent requests.
#[derive(Clone)]
pub struct AnalysisService {
    provider: Arc<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl AnalysisService {
    pub fn new(provider: Arc<dyn LlmProvider>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }

    /// Build the service with the provider and sampling parameters from settings.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let provider = crate::llm::build_provider(settings)?;
        Ok(Self::new(
            Arc::from(provider),
            settings.llm.temperature,
            settings.llm.max_tokens,
        ))
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Analyze a consultation transcript.
    ///
    /// Only a blank transcript is an `Err`; every other path resolves to an outcome.
    pub async fn analyze(&self, transcript: &str) -> Result<AnalysisOutcome, AnalysisError> {
        if transcript.trim().is_empty() {
            return Err(AnalysisError::EmptyTranscript);
        }

        info!("Analyzing transcript: {}...", preview(transcript, 100));

        let request = build_analysis_request(transcript, self.temperature, self.max_tokens);
        let raw = match self.provider.complete(&request).await {
            Ok(text) => text,
            Err(e) => {
                let details = format!("{:#}", e);
                error!("Analysis via {} failed: {}", self.provider.name(), details);
                return Ok(AnalysisOutcome::UpstreamFailure(UpstreamErrorRecord::new(
                    details,
                )));
            }
        };

        debug!("Raw model reply: {}", raw);

        let cleaned = strip_code_fences(&raw);
        match parse_record_json(&cleaned) {
            Ok(value) => Ok(AnalysisOutcome::Analyzed(value)),
            Err(reason) => {
                warn!("Model reply was not a JSON note ({}); cleaned text: {}", reason, cleaned);
                Ok(AnalysisOutcome::Fallback(StructuredRecord::parse_fallback()))
            }
        }
    }
}

/// First `max_chars` characters of `text`.
fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
