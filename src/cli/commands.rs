//! CLI command implementations

use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::warn;

use crate::analysis::{AnalysisService, StructuredRecord};
use crate::capture::{capture_transcript, LineDictation};
use crate::cli::args::{ConfigCommand, HistoryCommand, SubmitArgs};
use crate::config::Settings;
use crate::consultation::{
    validate_and_sanitize, AnalysisClient, HttpAnalysisClient, LocalAnalysisClient, Orchestrator,
    DEMO_CONSULTATION,
};
use crate::export::{self, ExportFormat};
use crate::storage::{ConsultationHistory, HistoryRecord};
use crate::SoapnoteError;

const TRANSCRIPT_PREVIEW_CHARS: usize = 100;
const DIAGNOSIS_PREVIEW_CHARS: usize = 50;

/// Run the analysis HTTP service
pub async fn serve(settings: &Settings, bind: Option<String>) -> Result<()> {
    let mut settings = settings.clone();
    if let Some(bind) = bind {
        settings.server.bind = bind;
    }
    crate::server::run(&settings).await
}

/// Analyze a transcript given inline, from a file, or the built-in demo
pub async fn analyze(
    settings: &Settings,
    text: Option<String>,
    file: Option<PathBuf>,
    demo: bool,
    submit: SubmitArgs,
    json: bool,
) -> Result<()> {
    let raw = if demo {
        DEMO_CONSULTATION.to_string()
    } else if let Some(path) = file {
        read_transcript_file(&path).await?
    } else if let Some(text) = text {
        text
    } else {
        anyhow::bail!("No transcript given. Pass TEXT, --file <path> or --demo");
    };

    submit_consultation(settings, &raw, &submit, json).await
}

/// Capture a consultation from line dictation on stdin, then analyze it
pub async fn dictate(settings: &Settings, submit: SubmitArgs) -> Result<()> {
    eprintln!("Dictate the consultation one line at a time. Press Ctrl-D when done.");

    let mut capture = LineDictation::stdin();
    let transcript = capture_transcript(&mut capture).await?;

    submit_consultation(settings, &transcript, &submit, false).await
}

async fn submit_consultation(
    settings: &Settings,
    raw: &str,
    submit: &SubmitArgs,
    json: bool,
) -> Result<()> {
    // Reject before any client is built so short input never costs a model call.
    validate_and_sanitize(raw)?;

    let orchestrator = Orchestrator::new(build_client(settings, submit.server.as_deref())?);

    let mut history = if submit.no_save {
        None
    } else {
        match ConsultationHistory::open(settings) {
            Ok(history) => Some(history),
            Err(e) => {
                warn!("History unavailable, result will not be saved: {:#}", e);
                None
            }
        }
    };

    eprintln!("Analyzing consultation...");
    let result = orchestrator.run(raw, history.as_mut()).await?;

    if result.analysis == StructuredRecord::parse_fallback() {
        eprintln!("Warning: the AI response could not be parsed. Try generating the notes again.");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result.analysis)?);
    } else {
        print_note(&result.analysis);
    }

    if let Some(saved) = result.saved {
        eprintln!();
        eprintln!("Saved as {}", saved.id);
    }

    Ok(())
}

fn build_client(settings: &Settings, server: Option<&str>) -> Result<Box<dyn AnalysisClient>> {
    match server {
        Some(url) => Ok(Box::new(HttpAnalysisClient::new(url)?)),
        None => {
            let service = AnalysisService::from_settings(settings)?;
            Ok(Box::new(LocalAnalysisClient::new(service)))
        }
    }
}

async fn read_transcript_file(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        tokio::io::stdin()
            .read_to_string(&mut content)
            .await
            .context("Failed to read transcript from stdin")?;
        return Ok(content);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read transcript file: {}", path.display()))
}

/// Handle history subcommands
pub fn history_command(settings: &Settings, cmd: HistoryCommand) -> Result<()> {
    let mut history = ConsultationHistory::open(settings)?;

    match cmd {
        HistoryCommand::List => {
            let records = history.list();
            if records.is_empty() {
                println!("No consultations found");
                return Ok(());
            }

            println!(
                "{:<24} {:<26} {:<20} {:<50}",
                "ID", "Date", "Patient", "Diagnosis"
            );
            println!("{}", "-".repeat(120));

            for record in records {
                println!(
                    "{:<24} {:<26} {:<20} {:<50}",
                    record.id,
                    record.date,
                    truncate(&record.analysis.patient_info.name, 18),
                    truncate(&record.analysis.diagnosis, DIAGNOSIS_PREVIEW_CHARS)
                );
                println!(
                    "    {}",
                    truncate(&record.transcript, TRANSCRIPT_PREVIEW_CHARS)
                );
            }
        }
        HistoryCommand::Show { id } => {
            let record = find_record(&mut history, &id)?;
            println!("ID: {}", record.id);
            println!("Date: {}", record.date);
            println!();
            print_note(&record.analysis);
            println!();
            println!("Transcript:");
            println!("{}", record.transcript);
        }
        HistoryCommand::Delete { id } => {
            let record = find_record(&mut history, &id)?;
            let remaining = history.remove_by_id(&record.id);
            println!(
                "Deleted consultation {} ({} remaining)",
                record.id,
                remaining.len()
            );
        }
        HistoryCommand::Clear { yes } => {
            let total = history.list().len();
            if total == 0 {
                println!("No consultations found");
                return Ok(());
            }
            if !yes && !confirm(&format!("Delete all {} consultations?", total))? {
                println!("Aborted");
                return Ok(());
            }
            history.clear();
            println!("Cleared {} consultations", total);
        }
        HistoryCommand::Stats => {
            let stats = history.stats();
            println!("Total consultations: {}", stats.total);
            println!("Time saved: {} min", stats.time_saved);
            println!("Last consultation: {}", stats.last_date);
        }
    }

    Ok(())
}

/// Export a saved consultation note
pub fn export_note(
    settings: &Settings,
    id: &str,
    format: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let format: ExportFormat = format.parse()?;
    let mut history = ConsultationHistory::open(settings)?;
    let record = find_record(&mut history, id)?;

    if let Some(output) = output {
        let path = export::resolve_output_path(&record, format, &output);
        export::write_to(&record, format, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Exported to: {}", path.display());
    } else {
        print!("{}", export::render(&record, format)?);
    }

    Ok(())
}

/// Handle config subcommands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let mut shown = settings.clone();
            if !shown.llm.api_key.is_empty() {
                shown.llm.api_key = "********".to_string();
            }
            let toml = toml::to_string_pretty(&shown)?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn find_record(history: &mut ConsultationHistory, id: &str) -> Result<HistoryRecord> {
    history
        .find(id)
        .ok_or_else(|| SoapnoteError::NotFound(format!("consultation '{}'", id)).into())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_note(note: &StructuredRecord) {
    let patient = &note.patient_info;
    println!(
        "Patient: {} | Age: {} | Gender: {}",
        patient.name, patient.age, patient.gender
    );
    println!();

    println!("S - Subjective (Chief Complaints)");
    for symptom in &note.symptoms {
        println!("  - {}", symptom);
    }
    println!();

    println!("A - Assessment (Diagnosis)");
    println!("  {}", note.diagnosis);
    println!();

    println!("P - Plan (Prescription)");
    for med in &note.medications {
        println!(
            "  - {}: {}, {}, {}",
            med.name, med.dosage, med.frequency, med.duration
        );
    }
    println!();

    println!("Instructions & Follow-up");
    println!("  {}", note.instructions);

    if note.needs_interaction_check() {
        println!();
        println!("Drug Interaction Alert: {}", export::INTERACTION_NOTICE);
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    let s = s.trim();
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        assert_eq!(truncate("ééééé", 4), "é...");
    }
}
