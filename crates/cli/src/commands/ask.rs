//! Ask command handler.
//!
//! Answers one question about a local document without starting the server.

use clap::{builder::NonEmptyStringValueParser, Args};
use finqa_core::{config::AppConfig, AppError, AppResult};
use finqa_knowledge::RagPipeline;
use std::path::PathBuf;

/// Ask a question about a document
#[derive(Args, Debug)]
pub struct AskCommand {
    /// Document to read (PDF or text)
    #[arg(short, long)]
    pub file: PathBuf,

    /// The question to ask
    #[arg(short, long, value_parser = NonEmptyStringValueParser::new())]
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let pipeline = RagPipeline::from_config(config)?;
        let answer = pipeline.answer_path(&self.file, &self.query).await?;

        if self.json {
            let json = serde_json::to_string_pretty(&answer)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", answer.response);

            tracing::debug!(
                origin = ?answer.origin,
                cache_hit = answer.cache_hit,
                context_tokens = answer.context_tokens,
                truncated = answer.context_truncated,
                "Answer details"
            );
        }

        Ok(())
    }
}
