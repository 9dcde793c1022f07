//! Configuration loading and constants.
//!
//! Loads application configuration from an optional TOML file, applies
//! environment overrides, and defines constants for HTTP caching, database
//! defaults, secret file names and logging. `AppConfig` is the root
//! configuration struct containing all process-wide settings.
//!
//! Database credentials are deliberately *not* part of `AppConfig`: they are
//! resolved on every request by [`crate::db::resolver`] so that credentials
//! provisioned after startup are picked up without a restart.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// =============================================================================
// HTTP
// =============================================================================

/// Default bind address (all interfaces)
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Dashboard responses reflect a live probe and must never be cached
pub const CACHE_CONTROL_DASHBOARD: &str = "no-store";

/// Graceful shutdown drain period in seconds
pub const SHUTDOWN_GRACE_SECS: u64 = 30;

// =============================================================================
// Database Defaults
// =============================================================================

/// Directory where the provisioner drops one file per credential field
pub const DEFAULT_SECRET_DIR: &str = "/var/run/secrets/db";

/// Database name used when `DB_NAME` is not set
pub const DEFAULT_DB_NAME: &str = "postgres";

/// User name used when neither a secret file nor `DB_USER` is present
pub const DEFAULT_DB_USER: &str = "pgadmin";

/// Port used when neither a secret file nor `DB_PORT` is present
pub const DEFAULT_DB_PORT: &str = "5432";

/// Upper bound for connecting and for the version query, in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 3;

/// Query used to introspect the server version
pub const VERSION_QUERY: &str = "SELECT version()";

// Secret file names, one value per file
pub const SECRET_FILE_HOST: &str = "host";
pub const SECRET_FILE_PORT: &str = "port";
pub const SECRET_FILE_USER: &str = "username";
pub const SECRET_FILE_PASSWORD: &str = "password";

// Environment variable names
pub const ENV_SECRET_DIR: &str = "DB_SECRET_DIR";
pub const ENV_DB_NAME: &str = "DB_NAME";
pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_PORT: &str = "DB_PORT";
pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASSWORD: &str = "DB_PASSWORD";

// =============================================================================
// UI / Logging
// =============================================================================

/// Title shown on the dashboard
pub const DEFAULT_SITE_NAME: &str = "Global Warning System";

/// Shown in place of the host while credentials are not provisioned
pub const HOST_PLACEHOLDER: &str = "(pending)";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "gws_dashboard=info,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Where and how to find the database
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub ui: UiConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HTTP_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_HTTP_PORT
    }
}

/// Static database settings. Per-request credentials live in the secret
/// directory and the environment, not here.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Directory holding the provisioned `host`, `port`, `username` and `password` files
    #[serde(default = "DatabaseSettings::default_secret_dir")]
    pub secret_dir: PathBuf,
    /// Database name, overridable per request with `DB_NAME`
    #[serde(default = "DatabaseSettings::default_name")]
    pub name: String,
    /// Last-resort user name
    #[serde(default = "DatabaseSettings::default_user")]
    pub default_user: String,
    /// Connection and query timeout in seconds
    #[serde(default = "DatabaseSettings::default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            secret_dir: Self::default_secret_dir(),
            name: Self::default_name(),
            default_user: Self::default_user(),
            connect_timeout_seconds: Self::default_connect_timeout(),
        }
    }
}

impl DatabaseSettings {
    fn default_secret_dir() -> PathBuf {
        PathBuf::from(DEFAULT_SECRET_DIR)
    }

    fn default_name() -> String {
        DEFAULT_DB_NAME.to_string()
    }

    fn default_user() -> String {
        DEFAULT_DB_USER.to_string()
    }

    fn default_connect_timeout() -> u64 {
        DEFAULT_CONNECT_TIMEOUT_SECS
    }

    pub fn connect_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.connect_timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    /// Title shown in the page header
    #[serde(default = "UiConfig::default_site_name")]
    pub site_name: String,
    /// Version string, populated at runtime
    #[serde(skip_deserializing, default = "UiConfig::default_version")]
    pub version: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            site_name: Self::default_site_name(),
            version: Self::default_version(),
        }
    }
}

impl UiConfig {
    fn default_site_name() -> String {
        DEFAULT_SITE_NAME.to_string()
    }

    fn default_version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then apply environment
    /// overrides from the process environment.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_toml(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every probe fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.connect_timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "database.connect_timeout_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply startup-time environment overrides.
    ///
    /// Only the secret directory is fixed at startup; credential variables are
    /// read per request by the resolver.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_SECRET_DIR).filter(|v| !v.trim().is_empty()) {
            self.database.secret_dir = PathBuf::from(dir.trim());
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.database.secret_dir, PathBuf::from(DEFAULT_SECRET_DIR));
        assert_eq!(config.database.name, "postgres");
        assert_eq!(config.database.default_user, "pgadmin");
        assert_eq!(config.database.connect_timeout_seconds, 3);
        assert_eq!(config.ui.site_name, DEFAULT_SITE_NAME);
        assert_eq!(config.ui.version, env!("CARGO_PKG_VERSION"));
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = AppConfig::from_toml(
            r#"
            [http]
            port = 9090

            [database]
            secret_dir = "/mnt/creds"
            connect_timeout_seconds = 1

            [logging]
            format = "JSON"
            "#,
        )
        .unwrap();
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.database.secret_dir, PathBuf::from("/mnt/creds"));
        assert_eq!(config.database.name, "postgres");
        assert_eq!(config.database.connect_timeout(), std::time::Duration::from_secs(1));
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_version_cannot_be_overridden() {
        let config = AppConfig::from_toml("[ui]\nversion = \"9.9.9\"\n").unwrap();
        assert_eq!(config.ui.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = AppConfig::from_toml("[http]\nport = \"eighty\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_defaults_pass_validation() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_rejects_zero_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(&path, "[database]\nconnect_timeout_seconds = 0\n").unwrap();
        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("connect_timeout_seconds"));
    }

    #[test]
    fn test_env_overrides_secret_dir() {
        let mut config = AppConfig::default();
        config.apply_env(|key| (key == ENV_SECRET_DIR).then(|| " /run/db ".to_string()));
        assert_eq!(config.database.secret_dir, PathBuf::from("/run/db"));
    }

    #[test]
    fn test_blank_env_keeps_secret_dir() {
        let mut config = AppConfig::default();
        config.apply_env(|_| Some("   ".to_string()));
        assert_eq!(config.database.secret_dir, PathBuf::from(DEFAULT_SECRET_DIR));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(&path, "[ui]\nsite_name = \"Staging\"\n").unwrap();
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.ui.site_name, "Staging");
    }
}
