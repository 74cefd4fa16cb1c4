//! Application configuration
//!
//! Loaded from a TOML file (default `~/.config/apikey-service/config.toml`).
//! Every section and key is optional; a missing file yields the defaults.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 3001
//! shutdown_timeout = 30
//!
//! [database]
//! backend = "sql"            # or "memory"
//! url = "sqlite://./apikeys.db?mode=rwc"
//! max_connections = 10
//!
//! [session]
//! secret = "change-me"
//! cookie_name = "session_token"
//! issuer = "apikey-service"
//!
//! [logging]
//! level = "info"
//! format = "text"            # or "json"
//!
//! [cors]
//! allowed_origins = ["http://localhost:3000"]
//!
//! [admin]
//! email = "admin@example.com"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::crypto::SessionTokenConfig;
use crate::infrastructure::database::DatabaseConfig;
use crate::infrastructure::session::DEFAULT_COOKIE_NAME;

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "APIKEY_SERVICE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub session: SessionSection,
    pub logging: LoggingSection,
    pub cors: CorsSection,
    pub admin: AdminSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sql,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub backend: StoreBackend,
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let db = DatabaseConfig::default();
        Self {
            backend: StoreBackend::Sql,
            url: db.url,
            max_connections: db.max_connections,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// HS256 secret shared with the session issuer
    pub secret: String,
    pub cookie_name: String,
    pub issuer: String,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            secret: String::new(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            issuer: "apikey-service".to_string(),
        }
    }
}

impl std::fmt::Debug for SessionSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSection")
            .field("secret", &"<redacted>")
            .field("cookie_name", &self.cookie_name)
            .field("issuer", &self.issuer)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `tracing` filter directive; `RUST_LOG` takes precedence
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsSection {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSection {
    /// User promoted to `admin` at startup
    pub email: Option<String>,
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file is absent,
    /// then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// `DATABASE_URL` and `SESSION_SECRET` win over the file
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = url;
        }
        if let Some(secret) = lookup("SESSION_SECRET").filter(|v| !v.is_empty()) {
            self.session.secret = secret;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.secret.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "session.secret must be set (or SESSION_SECRET)".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must not be 0".to_string()));
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "session.cookie_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
        }
    }

    pub fn session_token_config(&self) -> SessionTokenConfig {
        SessionTokenConfig {
            secret: self.session.secret.clone(),
            issuer: self.session.issuer.clone(),
        }
    }
}

/// `~/.config/apikey-service/config.toml`, or `./config.toml` when the
/// platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("apikey-service").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}
