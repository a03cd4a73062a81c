//! soapnote - Turn doctor-patient consultations into structured SOAP notes
//!
//! An LLM-backed analysis service (HTTP or in-process), a client orchestrator,
//! a capped local consultation history and note export.

pub mod analysis;
pub mod capture;
pub mod cli;
pub mod config;
pub mod consultation;
pub mod export;
pub mod llm;
pub mod server;
pub mod storage;

use thiserror::Error;

/// Main error type for soapnote
#[derive(Error, Debug)]
pub enum SoapnoteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, SoapnoteError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "soapnote";
