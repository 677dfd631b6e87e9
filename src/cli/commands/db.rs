use clap::Subcommand;

use crate::cli::utils::{open_pg_store, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create tables and indexes (safe to re-run)")]
    Init,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DbCommands::Init => {
            let store = open_pg_store().await?;
            store.close().await;
            output_success(output_format, "Database schema is ready", None)
        }
    }
}
