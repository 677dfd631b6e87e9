pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::DatabaseConfig;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{Store, StoreError};

/// Open the configured store.
///
/// For PostgreSQL the pool is created lazily and the schema bootstrap is
/// attempted once. A failure there is logged and the process keeps going;
/// requests will surface store errors until the database is reachable.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Store>, StoreError> {
    if config.url == crate::config::MEMORY_STORE_URL {
        warn!("Using in-memory store; data is lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = PgStore::connect_lazy(config)?;
    match store.migrate().await {
        Ok(()) => info!("Connected to database"),
        Err(e) => error!("Database connection failed, continuing without it: {}", e),
    }
    Ok(Arc::new(store))
}
