//! Serve command handler.

use clap::Args;
use finqa_core::{config::AppConfig, AppResult};
use finqa_knowledge::RagPipeline;

/// Run the HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (e.g. 0.0.0.0:8000)
    #[arg(short, long)]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");

        config.ensure_upload_dir()?;
        let pipeline = RagPipeline::from_config(config)?;

        finqa_server::run_server(config, pipeline).await
    }
}
