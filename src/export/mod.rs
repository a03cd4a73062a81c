//! Note export
//!
//! Renders a saved consultation as plain text, Markdown or JSON.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::analysis::StructuredRecord;
use crate::storage::HistoryRecord;
use crate::{Result, SoapnoteError};

pub const INTERACTION_NOTICE: &str = "Multiple medications prescribed. Please verify for potential drug interactions before dispensing.";

pub const AI_DISCLAIMER: &str =
    "This prescription was generated using AI assistance. Please verify with a licensed physician.";

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Markdown,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Markdown => "md",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = SoapnoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Text),
            "md" | "markdown" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(SoapnoteError::UnsupportedFormat(format!(
                "{}. Supported: txt, md, json",
                other
            ))),
        }
    }
}

/// Render a history record in the given format
pub fn render(record: &HistoryRecord, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Text => Ok(render_text(record)),
        ExportFormat::Markdown => Ok(render_markdown(record)),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(record)?),
    }
}

/// Render and write to `path`
pub fn write_to(record: &HistoryRecord, format: ExportFormat, path: &Path) -> Result<()> {
    let content = render(record, format)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Default file name for an exported note
pub fn default_file_name(record: &HistoryRecord, format: ExportFormat) -> String {
    let name: String = record
        .analysis
        .patient_info
        .name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("prescription_{}_{}.{}", name, record.timestamp, format.extension())
}

/// Resolve the file to write: a directory gets the default file name inside it
pub fn resolve_output_path(record: &HistoryRecord, format: ExportFormat, output: &Path) -> PathBuf {
    if output.is_dir() {
        output.join(default_file_name(record, format))
    } else {
        output.to_path_buf()
    }
}

fn render_text(record: &HistoryRecord) -> String {
    let note = &record.analysis;
    let mut out = String::new();

    out.push_str("MEDICAL CONSULTATION NOTES\n");
    out.push_str(&format!("Date: {}\n\n", record.date));
    out.push_str(&format!("Patient: {}\n", note.patient_info.name));
    out.push_str(&format!("Age: {}\n", note.patient_info.age));
    out.push_str(&format!("Gender: {}\n", note.patient_info.gender));
    out.push_str("\n---\n\n");

    out.push_str("S - Subjective (Chief Complaints)\n");
    for symptom in &note.symptoms {
        out.push_str(&format!("  - {}\n", symptom));
    }

    out.push_str("\nA - Assessment (Diagnosis)\n");
    out.push_str(&format!("  {}\n", note.diagnosis));

    out.push_str("\nP - Plan (Prescription)\n");
    for (i, med) in note.medications.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, med.name));
        out.push_str(&format!(
            "     Dosage: {} | Frequency: {} | Duration: {}\n",
            med.dosage, med.frequency, med.duration
        ));
    }

    out.push_str("\nInstructions & Follow-up\n");
    out.push_str(&format!("  {}\n", note.instructions));

    push_notices(&mut out, note, "WARNING: ", "");
    out
}

fn render_markdown(record: &HistoryRecord) -> String {
    let note = &record.analysis;
    let mut out = String::new();

    out.push_str("# Medical Consultation Notes\n\n");
    out.push_str(&format!("*{}*\n\n", record.date));
    out.push_str("## Patient Information\n\n");
    out.push_str("| Name | Age | Gender |\n");
    out.push_str("| --- | --- | --- |\n");
    out.push_str(&format!(
        "| {} | {} | {} |\n\n",
        note.patient_info.name, note.patient_info.age, note.patient_info.gender
    ));

    out.push_str("## S - Subjective (Chief Complaints)\n\n");
    for symptom in &note.symptoms {
        out.push_str(&format!("- {}\n", symptom));
    }

    out.push_str("\n## A - Assessment (Diagnosis)\n\n");
    out.push_str(&format!("{}\n\n", note.diagnosis));

    out.push_str("## P - Plan (Prescription)\n\n");
    if !note.medications.is_empty() {
        out.push_str("| Medication | Dosage | Frequency | Duration |\n");
        out.push_str("| --- | --- | --- | --- |\n");
        for med in &note.medications {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                med.name, med.dosage, med.frequency, med.duration
            ));
        }
        out.push('\n');
    }

    out.push_str("## Instructions & Follow-up\n\n");
    out.push_str(&format!("{}\n", note.instructions));

    push_notices(&mut out, note, "> **Drug Interaction Alert:** ", "_");
    out
}

fn push_notices(out: &mut String, note: &StructuredRecord, alert_prefix: &str, emphasis: &str) {
    out.push('\n');
    if note.needs_interaction_check() {
        out.push_str(&format!("{}{}\n\n", alert_prefix, INTERACTION_NOTICE));
    }
    out.push_str(&format!("{}{}{}\n", emphasis, AI_DISCLAIMER, emphasis));
}
