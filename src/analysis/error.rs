use thiserror::Error;

/// Failures that reach the caller of an analysis.
///
/// A malformed model reply is not an error: it is absorbed into the fallback record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Blank transcript; no model call was made.
    #[error("Transcript is required")]
    EmptyTranscript,

    /// Rejected by the client before submission.
    #[error(
        "Please provide a valid consultation transcript (minimum {min} characters, got {actual})"
    )]
    TranscriptTooShort { min: usize, actual: usize },

    /// The model call failed, or the service answered with a non-success status.
    #[error("{0}")]
    Upstream(String),

    /// The analysis service could not be reached.
    #[error("Could not reach the analysis service: {0}")]
    Transport(String),
}
