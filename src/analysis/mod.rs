//! Analysis service
//!
//! Turns a consultation transcript into a structured clinical note: builds the prompt,
//! calls the language model, strips Markdown fences from the reply and parses it.
//! Unparseable replies become a fixed fallback record; failed model calls become an
//! error record that the HTTP layer reports with a server-error status.

mod cleanup;
mod error;
mod record;
mod service;

pub use cleanup::{parse_record_json, strip_code_fences};
pub use error::AnalysisError;
pub use record::{
    Medication, PatientInfo, StructuredRecord, UpstreamErrorRecord, DEFAULT_PATIENT_NAME,
    NOT_AVAILABLE,
};
pub use service::{AnalysisOutcome, AnalysisService};
