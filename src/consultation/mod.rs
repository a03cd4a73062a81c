//! Consultation orchestration
//!
//! The client side of an analysis: input sanitizing, the transport to the analysis
//! service (in-process or HTTP), and turning a result into a history record.

mod client;
mod demo;
mod orchestrator;

pub use client::{AnalysisClient, HttpAnalysisClient, LocalAnalysisClient};
pub use demo::DEMO_CONSULTATION;
pub use orchestrator::{
    generate_id, validate_and_sanitize, ConsultationResult, Orchestrator, MIN_TRANSCRIPT_CHARS,
};
