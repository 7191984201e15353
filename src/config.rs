//! Configuration module
//!
//! Settings come from a TOML file (default
//! `~/.config/smartpark/config.toml`, overridable via the
//! `SMARTPARK_CONFIG` environment variable). Every section has working
//! defaults so the service starts with no file at all.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub anpr: AnprConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSection {
    /// SQLite file path; ignored when `url` is set
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Full connection URL, overrides `path`
    pub url: Option<String>,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            url: None,
        }
    }
}

impl DatabaseSection {
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("sqlite://{}?mode=rwc", self.path),
        }
    }
}

/// Token signing and password hashing settings
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiration_hours")]
    pub jwt_expiration_hours: i64,
    /// bcrypt work factor for new password hashes (4..=31). Stored
    /// hashes embed their own cost and keep verifying after a change.
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_expiration_hours: default_jwt_expiration_hours(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter, e.g. `info` or `smartpark=debug,info`
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Bootstrap dashboard account, created when no admin exists
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_username")]
    pub username: String,
    #[serde(default = "default_admin_email")]
    pub email: String,
    #[serde(default = "default_admin_password")]
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            email: default_admin_email(),
            password: default_admin_password(),
        }
    }
}

/// Plate-detection service settings
#[derive(Debug, Clone, Deserialize)]
pub struct AnprConfig {
    /// Base URL of the detection service; detection endpoints return
    /// 503 when unset
    pub base_url: Option<String>,
    #[serde(default = "default_anpr_timeout")]
    pub timeout_seconds: u64,
}

impl Default for AnprConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_seconds: default_anpr_timeout(),
        }
    }
}

/// Push gateway settings
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PushConfig {
    /// Delivery endpoint; pushes are dropped when unset
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Wallet settings
#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Balance below which the low-balance notification fires
    #[serde(default = "default_low_balance_threshold")]
    pub low_balance_threshold: i64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            low_balance_threshold: default_low_balance_threshold(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "./smartpark.db".to_string()
}

fn default_jwt_secret() -> String {
    "super-secret-key-change-in-production".to_string()
}

fn default_jwt_expiration_hours() -> i64 {
    24
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_email() -> String {
    "admin@smartpark.local".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

fn default_anpr_timeout() -> u64 {
    10
}

fn default_low_balance_threshold() -> i64 {
    50
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&raw).map_err(ConfigError::Parse)
    }
}

/// Default config file location: `~/.config/smartpark/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("smartpark")
        .join("config.toml")
}

/// Configuration load errors
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Parse(e) => write!(f, "failed to parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.database.connection_url(), "sqlite://./smartpark.db?mode=rwc");
        assert_eq!(cfg.security.jwt_expiration_hours, 24);
        assert_eq!(cfg.security.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(cfg.wallet.low_balance_threshold, 50);
        assert!(cfg.anpr.base_url.is_none());
        assert!(cfg.push.endpoint.is_none());
    }

    #[test]
    fn test_parse_partial_toml() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9090

            [database]
            path = "/var/lib/smartpark/park.db"

            [security]
            bcrypt_cost = 10

            [wallet]
            low_balance_threshold = 100
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.security.bcrypt_cost, 10);
        assert_eq!(
            cfg.database.connection_url(),
            "sqlite:///var/lib/smartpark/park.db?mode=rwc"
        );
        assert_eq!(cfg.wallet.low_balance_threshold, 100);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_url_overrides_path() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [database]
            path = "ignored.db"
            url = "sqlite::memory:"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.database.connection_url(), "sqlite::memory:");
    }
}
