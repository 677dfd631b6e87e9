use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while assembling configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub favorites: FavoritesPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string, or `memory` for the in-process store
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
    /// `*` allows any origin, otherwise an explicit allow-list
    pub cors_origins: Vec<String>,
}

impl SecurityConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

/// How adding a favorite treats a movie id that is already in the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FavoritesPolicy {
    /// Set-like add: an id appears at most once
    #[default]
    Unique,
    /// Unconditional append: repeated adds repeat the id
    Append,
}

impl FromStr for FavoritesPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unique" | "set" => Ok(FavoritesPolicy::Unique),
            "append" | "list" => Ok(FavoritesPolicy::Append),
            _ => Err(()),
        }
    }
}

pub const MEMORY_STORE_URL: &str = "memory";
pub const BCRYPT_MIN_COST: u32 = 4;
pub const BCRYPT_MAX_COST: u32 = 31;
/// One year
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 366;
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 3600;
const DEV_JWT_SECRET: &str = "reels-dev-secret-do-not-use-in-production";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (the process env in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };

        config.with_overrides(&lookup)?.validated()
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        override_parsed(lookup, "PORT", &mut self.server.port)?;
        override_parsed(lookup, "REQUEST_TIMEOUT_SECS", &mut self.server.request_timeout_secs)?;
        if let Some(dir) = lookup("STATIC_DIR") {
            let dir = dir.trim();
            self.server.static_dir = if dir.is_empty() { None } else { Some(PathBuf::from(dir)) };
        }

        // Database
        if let Some(url) = lookup("CONNECTION_URI").or_else(|| lookup("DATABASE_URL")) {
            self.database.url = url.trim().to_string();
        }
        override_parsed(lookup, "DATABASE_MAX_CONNECTIONS", &mut self.database.max_connections)?;
        override_parsed(lookup, "DATABASE_CONNECTION_TIMEOUT", &mut self.database.connection_timeout)?;

        // Security
        if let Some(secret) = lookup("JWT_SECRET") {
            self.security.jwt_secret = secret;
        }
        override_parsed(lookup, "JWT_EXPIRY_HOURS", &mut self.security.jwt_expiry_hours)?;
        override_parsed(lookup, "BCRYPT_COST", &mut self.security.bcrypt_cost)?;
        if let Some(origins) = lookup("CORS_ORIGINS") {
            self.security.cors_origins = parse_origins(&origins);
        }

        override_parsed(lookup, "FAVORITES_POLICY", &mut self.favorites)?;

        Ok(self)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.database.url.is_empty() {
            return Err(ConfigError::Missing("CONNECTION_URI"));
        }
        if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: self.security.bcrypt_cost.to_string(),
            });
        }
        if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&self.security.jwt_expiry_hours) {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRY_HOURS",
                value: self.security.jwt_expiry_hours.to_string(),
            });
        }
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.server.request_timeout_secs) {
            return Err(ConfigError::Invalid {
                key: "REQUEST_TIMEOUT_SECS",
                value: self.server.request_timeout_secs.to_string(),
            });
        }
        if self.security.cors_origins.is_empty() {
            return Err(ConfigError::Missing("CORS_ORIGINS"));
        }
        Ok(self)
    }

    /// True when the process is wired to the in-memory store
    pub fn uses_memory_store(&self) -> bool {
        self.database.url == MEMORY_STORE_URL
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.security.jwt_secret == DEV_JWT_SECRET
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 8080,
                static_dir: Some(PathBuf::from("public")),
                request_timeout_secs: 30,
            },
            database: DatabaseConfig {
                url: MEMORY_STORE_URL.to_string(),
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                bcrypt_cost: 10,
                cors_origins: vec!["*".to_string()],
            },
            favorites: FavoritesPolicy::Unique,
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 8080,
                static_dir: Some(PathBuf::from("public")),
                request_timeout_secs: 15,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                bcrypt_cost: 10,
                cors_origins: vec![
                    "http://localhost:1234".to_string(),
                    "http://localhost:4200".to_string(),
                    "http://localhost:8080".to_string(),
                ],
            },
            favorites: FavoritesPolicy::Unique,
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 8080,
                static_dir: Some(PathBuf::from("public")),
                request_timeout_secs: 10,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
                bcrypt_cost: 10,
                cors_origins: vec!["https://yourfavoritereels.herokuapp.com".to_string()],
            },
            favorites: FavoritesPolicy::Unique,
        }
    }

    /// Defaults for tests: memory store, fast hashing, no static assets
    pub fn for_testing() -> Self {
        let mut config = Self::development();
        config.server.static_dir = None;
        config.security.jwt_secret = "test-secret".to_string();
        config.security.bcrypt_cost = BCRYPT_MIN_COST;
        config.security.jwt_expiry_hours = 1;
        config
    }
}

fn override_parsed<F, T>(lookup: &F, key: &'static str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw.clone() })?;
    }
    Ok(())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
