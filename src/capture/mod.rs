//! Dictation capture for soapnote
//!
//! A capability interface over speech-to-text sources. Each source reports whether
//! it is usable, emits final text chunks over a channel, and can be stopped.
//! Sources:
//! - line dictation (stdin or any async reader) - each non-empty line is a final chunk
//! - unsupported - the null source for targets without speech recognition

mod lines;

pub use lines::LineDictation;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Whether a capture source can be used here
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSupport {
    Supported,
    Unsupported,
    PermissionDenied,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Speech recognition is not supported on this system.")]
    Unsupported,

    #[error("Microphone access denied. Please allow microphone access and try again.")]
    PermissionDenied,

    #[error("Capture error: {0}")]
    Source(String),
}

/// Events emitted by a running capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// A finalized piece of recognized text
    FinalText(String),

    /// The source failed; capture has stopped
    Error(CaptureError),

    /// The source finished normally
    Ended,
}

/// Unified speech capture trait
pub trait SpeechCapture: Send {
    /// Report availability before starting
    fn support(&self) -> CaptureSupport;

    /// Begin continuous capture, sending events to `events`. Starting twice is a no-op.
    fn start(&mut self, events: mpsc::Sender<CaptureEvent>) -> Result<(), CaptureError>;

    /// Stop capturing
    fn stop(&mut self);

    /// Check if currently capturing
    fn is_capturing(&self) -> bool;

    /// Capture source name for logging
    fn backend_name(&self) -> &'static str;
}

/// Null source for systems without speech recognition.
#[derive(Debug, Default)]
pub struct UnsupportedCapture;

impl SpeechCapture for UnsupportedCapture {
    fn support(&self) -> CaptureSupport {
        CaptureSupport::Unsupported
    }

    fn start(&mut self, _events: mpsc::Sender<CaptureEvent>) -> Result<(), CaptureError> {
        Err(CaptureError::Unsupported)
    }

    fn stop(&mut self) {}

    fn is_capturing(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "unsupported"
    }
}

/// Running transcript built from final chunks.
#[derive(Debug, Default, Clone)]
pub struct TranscriptAccumulator {
    text: String,
}

impl TranscriptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a final chunk followed by a single space.
    pub fn push_final(&mut self, chunk: &str) {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            return;
        }
        self.text.push_str(chunk);
        self.text.push(' ');
    }

    pub fn reset(&mut self) {
        self.text.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Run `capture` until it ends and return the accumulated transcript.
///
/// A source error stops the capture; text gathered so far is kept unless nothing
/// was captured at all.
pub async fn capture_transcript(capture: &mut dyn SpeechCapture) -> Result<String, CaptureError> {
    match capture.support() {
        CaptureSupport::Supported => {}
        CaptureSupport::Unsupported => return Err(CaptureError::Unsupported),
        CaptureSupport::PermissionDenied => return Err(CaptureError::PermissionDenied),
    }

    let (tx, mut rx) = mpsc::channel(64);
    capture.start(tx)?;
    debug!("Capture started with {} source", capture.backend_name());

    let mut transcript = TranscriptAccumulator::new();
    let mut failure = None;

    while let Some(event) = rx.recv().await {
        match event {
            CaptureEvent::FinalText(chunk) => transcript.push_final(&chunk),
            CaptureEvent::Ended => break,
            CaptureEvent::Error(e) => {
                warn!("Speech capture error: {}", e);
                failure = Some(e);
                break;
            }
        }
    }

    capture.stop();

    match failure {
        Some(e) if transcript.as_str().is_empty() => Err(e),
        _ => Ok(transcript.into_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_joins_chunks_with_spaces() {
        let mut acc = TranscriptAccumulator::new();
        acc.push_final("Doctor: hello");
        acc.push_final("   ");
        acc.push_final(" Patient: I have a fever ");
        assert_eq!(acc.as_str(), "Doctor: hello Patient: I have a fever ");

        acc.reset();
        assert!(acc.as_str().is_empty());
    }

    #[test]
    fn unsupported_capture_refuses_to_start() {
        let mut capture = UnsupportedCapture;
        assert_eq!(capture.support(), CaptureSupport::Unsupported);
        let result = tokio_test::block_on(capture_transcript(&mut capture));
        assert_eq!(result, Err(CaptureError::Unsupported));
        assert!(!capture.is_capturing());
    }

    struct DeniedCapture;

    impl SpeechCapture for DeniedCapture {
        fn support(&self) -> CaptureSupport {
            CaptureSupport::PermissionDenied
        }

        fn start(&mut self, _events: mpsc::Sender<CaptureEvent>) -> Result<(), CaptureError> {
            Err(CaptureError::PermissionDenied)
        }

        fn stop(&mut self) {}

        fn is_capturing(&self) -> bool {
            false
        }

        fn backend_name(&self) -> &'static str {
            "denied"
        }
    }

    #[tokio::test]
    async fn permission_denial_is_distinct_from_unsupported() {
        let result = capture_transcript(&mut DeniedCapture).await;
        assert_eq!(result, Err(CaptureError::PermissionDenied));
    }
}
