//! soapnote - Structured clinical notes from consultation transcripts
//!
//! Entry point for the soapnote CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use soapnote::cli::{commands, completions, Cli, Commands};
use soapnote::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        completions::print(*shell);
        return Ok(());
    }

    // Load configuration only for runtime commands.
    let settings = Settings::load()?;

    // Initialize logging
    let default_level = if cli.verbose {
        "debug"
    } else {
        settings.general.log_level.as_str()
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Execute command
    match cli.command {
        Commands::Serve { bind } => {
            commands::serve(&settings, bind).await?;
        }
        Commands::Analyze {
            text,
            file,
            demo,
            submit,
            json,
        } => {
            commands::analyze(&settings, text, file, demo, submit, json).await?;
        }
        Commands::Dictate { submit } => {
            commands::dictate(&settings, submit).await?;
        }
        Commands::History(history_cmd) => {
            commands::history_command(&settings, history_cmd)?;
        }
        Commands::Export { id, format, output } => {
            commands::export_note(&settings, &id, &format, output)?;
        }
        Commands::Config(config_cmd) => {
            commands::config_command(&settings, config_cmd)?;
        }
        Commands::Completions { .. } => unreachable!(),
    }

    Ok(())
}
