//! FinQA CLI
//!
//! Main entry point for the finqa command-line tool.
//! Serves the question-answering API or answers a single question locally.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ServeCommand};
use finqa_core::{
    config::AppConfig,
    logging::{self, LogFormat},
    AppResult,
};
use std::path::PathBuf;
use tracing::Instrument;

/// FinQA - question answering over financial filings
#[derive(Parser, Debug)]
#[command(name = "finqa")]
#[command(about = "Question answering over financial filings", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "FINQA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Generation provider (huggingface, ollama, mock)
    #[arg(short, long, global = true, env = "FINQA_PROVIDER")]
    provider: Option<String>,

    /// Generation model identifier
    #[arg(short, long, global = true, env = "FINQA_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve(ServeCommand),

    /// Ask a question about a local document
    Ask(AskCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let bind = match &cli.command {
        Commands::Serve(cmd) => cmd.bind.clone(),
        Commands::Ask(_) => None,
    };

    // Defaults, config file and environment, then CLI overrides
    let config = AppConfig::load(cli.config)?.with_overrides(
        cli.provider,
        cli.model,
        bind,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    let format = LogFormat::parse(&config.log_format).unwrap_or(LogFormat::Text);
    logging::init_logging(config.log_level.as_deref(), format, config.no_color)?;

    tracing::info!("FinQA starting");
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);
    tracing::debug!("Embedding provider: {}", config.embedding_provider);

    // Misconfiguration is fatal before any work starts
    config.validate()?;

    run(cli.command, &config).await
}

/// Dispatch a command inside its own span.
async fn run(command: Commands, config: &AppConfig) -> AppResult<()> {
    let name = match &command {
        Commands::Serve(_) => "serve",
        Commands::Ask(_) => "ask",
    };
    let span = tracing::info_span!("command", name = name);

    async move {
        let result = match command {
            Commands::Serve(cmd) => cmd.execute(config).await,
            Commands::Ask(cmd) => cmd.execute(config).await,
        };

        match &result {
            Ok(_) => tracing::info!("Command completed successfully"),
            Err(e) => tracing::error!("Command failed: {}", e),
        }

        result
    }
    .instrument(span)
    .await
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
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["finqa", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Commands::Serve(cmd) => assert_eq!(cmd.bind.as_deref(), Some("0.0.0.0:9000")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from([
            "finqa",
            "--provider",
            "mock",
            "ask",
            "--file",
            "10q.pdf",
            "--query",
            "What were iPhone net sales?",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.provider.as_deref(), Some("mock"));
        match cli.command {
            Commands::Ask(cmd) => {
                assert_eq!(cmd.file, PathBuf::from("10q.pdf"));
                assert_eq!(cmd.query, "What were iPhone net sales?");
                assert!(cmd.json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_dispatches_ask() {
        let config = AppConfig {
            provider: "mock".to_string(),
            embedding_provider: "trigram".to_string(),
            ..AppConfig::default()
        };
        let cli = Cli::try_parse_from([
            "finqa",
            "ask",
            "--file",
            "/nonexistent/10q.pdf",
            "--query",
            "What were iPhone net sales?",
        ])
        .unwrap();

        match run(cli.command, &config).await {
            Err(finqa_core::AppError::Ingest(message)) => {
                assert_eq!(message, finqa_knowledge::FILE_NOT_FOUND)
            }
            other => panic!("expected ingest error, got {:?}", other),
        }
    }

    #[test]
    fn test_ask_requires_query() {
        assert!(Cli::try_parse_from(["finqa", "ask", "--file", "10q.pdf"]).is_err());
        assert!(Cli::try_parse_from(["finqa", "ask", "--file", "10q.pdf", "--query", ""]).is_err());
    }
}
