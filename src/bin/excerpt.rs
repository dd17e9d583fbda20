//! Excerpt CLI
//!
//! Command-line interface for sampling documents into prompt excerpts,
//! inspecting how hard a document would be sampled, and token counting.
//! Prints JSON on stdout; logs go to stderr.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use excerpt_lib::config::parse_token_budget;
use excerpt_lib::documents::content::char_len;
use excerpt_lib::{
    count_tokens, extract, load_settings, save_settings, settings_path, CharacterBudget, DocumentFormat,
    DocumentShape, IngestError, Ingestor, Settings, TierPolicy,
};

#[derive(Parser)]
#[command(name = "excerpt")]
#[command(about = "Excerpt CLI - Fit uploaded documents into a token budget", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample a document and compose the prompt for it
    Sample {
        /// Path to the document
        path: PathBuf,
        /// Token budget (overrides settings and EXCERPT_TOKEN_BUDGET)
        #[arg(short, long, value_parser = parse_tokens)]
        tokens: Option<u32>,
        /// Question to ask about the document
        #[arg(short, long)]
        question: Option<String>,
    },
    /// Report how a document would be sampled, without composing a prompt
    Inspect {
        /// Path to the document
        path: PathBuf,
        /// Token budget (overrides settings and EXCERPT_TOKEN_BUDGET)
        #[arg(short, long, value_parser = parse_tokens)]
        tokens: Option<u32>,
    },
    /// Token counting commands
    Tokens {
        #[command(subcommand)]
        action: TokensAction,
    },
    /// Settings commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum TokensAction {
    /// Count tokens in text
    Count {
        /// Text to count (or - to read from stdin)
        text: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Write default settings if no settings file exists
    Init,
}

// ============ Output Types ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectOutput {
    filename: String,
    format: DocumentFormat,
    shape: DocumentShape,
    units: usize,
    total_chars: usize,
    char_budget: usize,
    ratio: f64,
    tier: String,
}

#[derive(Serialize)]
struct TokenCountOutput {
    tokens: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigOutput {
    path: String,
    exists: bool,
    settings: Settings,
}

#[derive(Serialize)]
struct ErrorOutput {
    error: String,
}

// ============ Main ============

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sample { path, tokens, question } => handle_sample(path, tokens, question),
        Commands::Inspect { path, tokens } => handle_inspect(path, tokens),
        Commands::Tokens { action } => handle_tokens(action),
        Commands::Config { action } => handle_config(action),
    };

    match result {
        Ok(json) => println!("{}", json),
        Err(e) => {
            let message = match e.downcast_ref::<IngestError>() {
                Some(ingest) => ingest.user_message(),
                None => format!("{:#}", e),
            };
            tracing::debug!(error = ?e, "Command failed");
            let error = ErrorOutput { error: message };
            match serde_json::to_string(&error) {
                Ok(json) => println!("{}", json),
                Err(_) => println!("{{\"error\":\"internal error\"}}"),
            }
            std::process::exit(1);
        }
    }
}

/// Logs to stderr so stdout stays JSON. `RUST_LOG` overrides the default.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_tokens(raw: &str) -> Result<u32, String> {
    parse_token_budget(raw).map_err(|e| e.to_string())
}

/// Settings with the CLI budget applied last
fn effective_settings(tokens: Option<u32>) -> anyhow::Result<Settings> {
    let mut settings = load_settings().context("Failed to load settings")?;
    if let Some(tokens) = tokens {
        settings.token_budget = tokens;
    }
    Ok(settings)
}

// ============ Handlers ============

fn handle_sample(path: PathBuf, tokens: Option<u32>, question: Option<String>) -> anyhow::Result<String> {
    let ingestor = Ingestor::new(effective_settings(tokens)?);
    let document = ingestor.ingest_path(&path, question.as_deref())?;
    Ok(serde_json::to_string(&document)?)
}

fn handle_inspect(path: PathBuf, tokens: Option<u32>) -> anyhow::Result<String> {
    let settings = effective_settings(tokens)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let bytes = std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    if bytes.len() as u64 > settings.max_file_size_bytes {
        return Err(IngestError::FileTooLarge(bytes.len() as u64, settings.max_file_size_bytes).into());
    }
    let format = DocumentFormat::detect(&filename, &bytes)
        .ok_or_else(|| IngestError::unsupported_format(&filename))?;
    let content = extract(format, &bytes).map_err(IngestError::from)?;

    let budget = CharacterBudget::from_tokens(settings.token_budget)?;
    let total_chars = char_len(&content.render());
    let ratio = budget.compression_ratio(total_chars);
    let tier = TierPolicy::for_shape(content.shape()).classify(ratio);

    let output = InspectOutput {
        filename,
        format,
        shape: content.shape(),
        units: content.unit_count(),
        total_chars,
        char_budget: budget.chars(),
        ratio: if ratio.is_finite() { ratio } else { 1.0 },
        tier: tier.display_name().to_string(),
    };

    Ok(serde_json::to_string(&output)?)
}

fn handle_tokens(action: TokensAction) -> anyhow::Result<String> {
    match action {
        TokensAction::Count { text } => {
            let input = if text == "-" {
                // Read from stdin
                use std::io::Read;
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer)?;
                buffer
            } else {
                text
            };

            let tokens = count_tokens(&input);
            let output = TokenCountOutput { tokens };

            Ok(serde_json::to_string(&output)?)
        }
    }
}

fn handle_config(action: ConfigAction) -> anyhow::Result<String> {
    let path = settings_path()?;
    match action {
        ConfigAction::Show => {
            let output = ConfigOutput {
                path: path.display().to_string(),
                exists: path.exists(),
                settings: load_settings()?,
            };
            Ok(serde_json::to_string_pretty(&output)?)
        }
        ConfigAction::Init => {
            if !path.exists() {
                save_settings(&Settings::default())?;
            }
            let output = ConfigOutput {
                path: path.display().to_string(),
                exists: true,
                settings: load_settings()?,
            };
            Ok(serde_json::to_string_pretty(&output)?)
        }
    }
}
