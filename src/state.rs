use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::config::AppConfig;
use crate::database::Store;

/// Shared handler state, cloned per request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        let jwt = JwtKeys::from_config(&config.security);
        Self {
            store,
            config: Arc::new(config),
            jwt,
        }
    }
}
