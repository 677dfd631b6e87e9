use anyhow::{bail, Context};
use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::PgStore;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: OutputFormat,
    message: &str,
    data: Option<Map<String, Value>>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = Map::new();
            response.insert("success".into(), json!(true));
            response.insert("message".into(), json!(message));
            if let Some(data) = data {
                response.extend(data);
            }
            println!("{}", serde_json::to_string_pretty(&Value::Object(response))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Open the PostgreSQL store named by the environment and make sure the schema exists.
/// The CLI has nothing to do against the in-memory store.
pub async fn open_pg_store() -> anyhow::Result<PgStore> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env().context("invalid configuration")?;
    if config.uses_memory_store() {
        bail!("CONNECTION_URI must point at PostgreSQL for this command");
    }

    let store = PgStore::connect_lazy(&config.database)?;
    store.migrate().await.context("failed to prepare database schema")?;
    Ok(store)
}
