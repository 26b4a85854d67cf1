//! askmaggie - ask Bible questions from the terminal.
//!
//! Sends a question to an LLM backend, shows the answer with its references,
//! and fetches the full text of any verse reference on demand.

mod answer;
mod config;
mod error;
mod logging;
mod model;
mod navigation;
mod state;
mod ui;
mod verse;

use anyhow::{Context, Result};
use answer::AnswerSource;
use clap::{Parser, Subcommand};
use logging::LogTarget;
use std::process::Command as ProcessCommand;
use std::sync::Arc;
use tracing::info;
use verse::{VerseClient, VerseSource};

#[derive(Parser)]
#[command(name = "askmaggie")]
#[command(author, version, about = "Ask Bible questions and read the verses behind the answer")]
struct Cli {
    /// Question to pre-fill in the interactive prompt
    #[arg(value_name = "QUESTION")]
    question: Option<String>,

    /// Query string the session was launched with (e.g. returnUrl=https%3A%2F%2Fexample.com)
    #[arg(long, value_name = "QUERY")]
    launch_params: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question without the TUI and print the answer
    Ask {
        /// The question
        question: String,
        /// Print the answer as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the text of a verse reference (e.g. "John 3:16")
    Verse {
        /// Verse reference
        title: String,
    },
    /// Open configuration file in $EDITOR
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Ask { question, json }) => handle_ask(&question, json).await,
        Some(Commands::Verse { title }) => handle_verse(&title).await,
        Some(Commands::Config) => handle_config(),
        None => handle_session(cli.question, cli.launch_params.as_deref()).await,
    }
}

/// Run the interactive session.
async fn handle_session(question: Option<String>, launch_params: Option<&str>) -> Result<()> {
    logging::init(LogTarget::File)?;

    let config = config::Config::load().context("Failed to load configuration")?;
    info!(
        "Using backend: {} (model: {})",
        config.backend_type(),
        config.model_name()
    );

    let return_url = navigation::resolve_return_url(launch_params, &config.ui.return_url);
    let services = ui::Services {
        answers: Arc::new(answer::create_backend(&config)?),
        verses: Arc::new(verse_client(&config)?),
        navigator: Arc::new(navigation::SystemBrowser),
    };

    ui::run(services, return_url, question).await
}

/// Handle the ask command.
async fn handle_ask(question: &str, json: bool) -> Result<()> {
    logging::init(LogTarget::Stderr)?;
    let config = config::Config::load().context("Failed to load configuration")?;

    if question.trim().is_empty() {
        anyhow::bail!("{}", error::RequestError::EmptyQuestion);
    }

    let backend = answer::create_backend(&config)?;
    info!("Asking {} ({})", backend.name(), backend.model());
    let answer = backend.ask(question).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
        return Ok(());
    }

    println!("{}\n", answer.text);
    if !answer.references.is_empty() {
        println!("References & Resources");
        println!("======================\n");
        for (i, reference) in answer.references.iter().enumerate() {
            println!(
                "  {}. {} {} [{}]",
                i + 1,
                reference.kind.icon(),
                reference.title,
                reference.kind.label()
            );
            if let Some(description) = &reference.description {
                println!("     {}", description);
            }
            println!("     {}", reference.link);
        }
    }

    Ok(())
}

/// Handle the verse command.
async fn handle_verse(title: &str) -> Result<()> {
    logging::init(LogTarget::Stderr)?;
    let config = config::Config::load().context("Failed to load configuration")?;

    let content = verse_client(&config)?.lookup(title).await?;
    println!("{}\n", title);
    println!("{}", content.trim_end());
    Ok(())
}

fn verse_client(config: &config::Config) -> Result<VerseClient> {
    let client = answer::http_client(config.network.timeout())?;
    Ok(VerseClient::new(client, &config.verses))
}

/// Handle the config command.
fn handle_config() -> Result<()> {
    let config_path = config::Config::config_path()?;

    // Create default config if it doesn't exist
    if !config_path.exists() {
        config::Config::default().save_to(&config_path)?;
        println!("Created default config at {}", config_path.display());
    }

    // Open in editor
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = ProcessCommand::new(&editor)
        .arg(&config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        eprintln!("Editor exited with non-zero status");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_session_args() {
        let cli = Cli::try_parse_from([
            "askmaggie",
            "What is grace?",
            "--launch-params",
            "returnUrl=https%3A%2F%2Fexample.com",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.question.as_deref(), Some("What is grace?"));
        assert_eq!(
            navigation::resolve_return_url(cli.launch_params.as_deref(), config::DEFAULT_RETURN_URL),
            "https://example.com"
        );
    }

    #[test]
    fn test_parse_ask_json() {
        let cli = Cli::try_parse_from(["askmaggie", "ask", "--json", "Who is Jesus?"]).unwrap();
        match cli.command {
            Some(Commands::Ask { question, json }) => {
                assert_eq!(question, "Who is Jesus?");
                assert!(json);
            }
            _ => panic!("expected ask command"),
        }
    }
}
