//! Agent Blueprint CLI
//!
//! Interactive requirements conversation on stdin/stdout. Logs go to stderr
//! so the final specification printed on exit can be piped.

use std::path::PathBuf;
use std::sync::Arc;

use agent_blueprint::{
    AppConfig, ConfigService, RequirementsEngine, RequirementsSession, SettingsUpdate,
};
use agent_blueprint_llm::{LlmProvider, OpenAIProvider};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "agent-blueprint", version, about = "Design a multi-agent system by conversation")]
struct Cli {
    /// Config file (default: ~/.agent-blueprint/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Schema descriptor JSON file (default: built-in schema)
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let service = match &cli.config {
        Some(path) => ConfigService::open(path),
        None => ConfigService::new(),
    }
    .context("failed to load configuration")?;

    let mut config = service.effective_config()?;
    config.apply_update(SettingsUpdate {
        model: cli.model.clone(),
        schema_path: cli.schema.clone(),
        debug_mode: cli.verbose.then_some(true),
        ..Default::default()
    });
    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

fn print_help() {
    println!("Commands: /spec (show specification), /missing (required fields left), /quit");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let level = if config.debug_mode { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    if config.provider.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; backend calls will fail");
    }

    let provider: Arc<dyn LlmProvider> = Arc::new(OpenAIProvider::new(config.provider.clone())?);
    let engine = Arc::new(RequirementsEngine::from_config(&config, provider)?);
    let mut session = RequirementsSession::new(engine);

    println!("Describe the multi-agent system you want to build.");
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/help" => print_help(),
            "/spec" => println!("{}", session.spec().to_json_pretty()),
            "/missing" => {
                let missing = session.missing_required_fields();
                if missing.is_empty() {
                    println!("All required fields are filled in.");
                } else {
                    println!("Missing: {}", missing.join(", "));
                }
            }
            message => match session.submit(message).await {
                Ok(outcome) => {
                    println!("{}", outcome.reply);
                    if !outcome.needs_more {
                        println!("The specification looks complete.");
                        break;
                    }
                }
                Err(e) => eprintln!("Turn failed: {}", e),
            },
        }
    }

    println!("{}", session.spec().to_json_pretty());
    Ok(())
}
