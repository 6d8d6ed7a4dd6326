//! CLI commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use console::style;

use crate::config::{load_settings, Settings};
use crate::llm::LlmClient;
use crate::ocr;
use crate::server;
use crate::services::IntakeService;
use crate::utils::sanitize_filename;

#[derive(Parser)]
#[command(name = "docintake")]
#[command(about = "Document intake, PII redaction, and summarization service")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: docintake.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Run the intake web server
    Serve {
        /// Bind host (overrides configuration)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Process a single file and print the result
    Process {
        /// File to process
        file: PathBuf,
    },

    /// Check availability of the external extraction tools
    Check,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| settings.host.clone());
            let port = port.unwrap_or(settings.port);
            server::serve(&settings, &host, port).await
        }
        Commands::Process { file } => process_file(&settings, &file).await,
        Commands::Check => check(&settings).await,
    }
}

async fn process_file(settings: &Settings, file: &Path) -> anyhow::Result<()> {
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .map(sanitize_filename)
        .ok_or_else(|| anyhow::anyhow!("not a file path: {}", file.display()))?;

    let summarizer = Arc::new(LlmClient::new(settings.llm.clone()));
    let intake = IntakeService::new(summarizer);
    let result = intake.process(file, &filename).await?;

    println!("{} {}", style("File:").bold(), result.filename);
    println!("{} {}", style("Type:").bold(), result.file_type);
    println!();
    println!("{}", style("Description").bold().underlined());
    println!("{}", result.file_description);
    println!();
    println!("{}", style("Key findings").bold().underlined());
    for finding in &result.key_findings {
        println!("{}", finding);
    }
    Ok(())
}

async fn check(settings: &Settings) -> anyhow::Result<()> {
    for (tool, available) in ocr::check_tools() {
        let status = if available {
            style("found").green()
        } else {
            style("missing").red()
        };
        println!("{:<12} {}", tool, status);
    }

    let client = LlmClient::new(settings.llm.clone());
    let status = if client.is_available().await {
        style("reachable").green()
    } else {
        style("unreachable").red()
    };
    println!("{:<12} {} ({})", "model", status, settings.llm.endpoint);

    Ok(())
}
