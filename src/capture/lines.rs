//! Line-oriented dictation source

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::capture::{CaptureError, CaptureEvent, CaptureSupport, SpeechCapture};

/// Treats every non-empty line of an async reader as a final recognition result.
///
/// Reads stdin by default, which lets an external speech-to-text tool pipe into
/// `soapnote dictate`, or a user type the consultation line by line.
pub struct LineDictation<R> {
    reader: Option<R>,
    task: Option<JoinHandle<()>>,
}

impl LineDictation<BufReader<tokio::io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> LineDictation<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            task: None,
        }
    }
}

impl<R> SpeechCapture for LineDictation<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    fn support(&self) -> CaptureSupport {
        CaptureSupport::Supported
    }

    fn start(&mut self, events: mpsc::Sender<CaptureEvent>) -> Result<(), CaptureError> {
        if self.is_capturing() {
            return Ok(());
        }

        let reader = self
            .reader
            .take()
            .ok_or_else(|| CaptureError::Source("input already consumed".to_string()))?;

        self.task = Some(tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        if events
                            .send(CaptureEvent::FinalText(line.to_string()))
                            .await
                            .is_err()
                        {
                            return;
                        }
                    }
                    Ok(None) => {
                        let _ = events.send(CaptureEvent::Ended).await;
                        return;
                    }
                    Err(e) => {
                        let _ = events
                            .send(CaptureEvent::Error(CaptureError::Source(e.to_string())))
                            .await;
                        return;
                    }
                }
            }
        }));

        Ok(())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_capturing(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn backend_name(&self) -> &'static str {
        "lines"
    }
}

impl<R> Drop for LineDictation<R> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
