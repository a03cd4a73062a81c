//! Configuration module for soapnote
//!
//! Handles loading and managing application settings from TOML files.

mod settings;

pub use settings::{GeneralSettings, HistorySettings, LlmSettings, ServerSettings, Settings};
