//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// soapnote - Turn consultation transcripts into structured SOAP notes
#[derive(Parser, Debug)]
#[command(name = "soapnote")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the analysis HTTP service
    Serve {
        /// Address to listen on (overrides server.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Analyze a consultation transcript
    Analyze {
        /// Transcript text
        #[arg(conflicts_with_all = ["file", "demo"])]
        text: Option<String>,

        /// Read the transcript from a file ("-" for stdin)
        #[arg(short, long, conflicts_with = "demo")]
        file: Option<PathBuf>,

        /// Use the built-in sample consultation
        #[arg(long)]
        demo: bool,

        #[command(flatten)]
        submit: SubmitArgs,

        /// Print the note as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dictate a consultation line by line on stdin, then analyze it
    Dictate {
        #[command(flatten)]
        submit: SubmitArgs,
    },

    /// Consultation history
    #[command(subcommand)]
    History(HistoryCommand),

    /// Export a saved consultation note
    Export {
        /// Consultation ID or unique ID prefix
        id: String,

        /// Output format (txt, md, json)
        #[arg(short, long, default_value = "txt")]
        format: String,

        /// Output file or directory (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Where and whether to send a consultation
#[derive(clap::Args, Debug, Clone)]
pub struct SubmitArgs {
    /// Send to a running analysis server instead of calling the model directly
    #[arg(short, long)]
    pub server: Option<String>,

    /// Don't save the result to history
    #[arg(long)]
    pub no_save: bool,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List saved consultations, most recent first
    List,

    /// Show a saved consultation
    Show {
        /// Consultation ID or unique ID prefix
        id: String,
    },

    /// Delete a saved consultation
    Delete {
        /// Consultation ID or unique ID prefix
        id: String,
    },

    /// Delete all saved consultations
    Clear {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show consultation totals
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
