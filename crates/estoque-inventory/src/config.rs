//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ESTOQUE_DB_PATH=/srv/estoque/estoque.db                            │
//! │     ESTOQUE_JWT_SECRET=...                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/estoque/estoque.toml (Linux)                             │
//! │     ~/Library/Application Support/com.estoque.estoque/estoque.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "estoque.db"
//! max_connections = 5
//!
//! [inventory]
//! low_stock_threshold = 5
//! currency_symbol = "R$ "
//! decimal_separator = ","
//! thousands_separator = "."
//!
//! [auth]
//! jwt_secret = "change-me"
//! session_lifetime_secs = 3600
//! require_confirmation = false
//!
//! [logging]
//! filter = "info,estoque=debug,sqlx=warn"
//! ```

use std::path::PathBuf;

use estoque_core::{Money, DEFAULT_LOW_STOCK_THRESHOLD};
use estoque_db::DbConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::telemetry::DEFAULT_FILTER;

const CONFIG_FILE: &str = "estoque.toml";

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file, or `:memory:`.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("estoque.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Catalogue and money display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySettings {
    /// Quantities at or below this count as low stock.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,

    #[serde(default = "default_thousands_separator")]
    pub thousands_separator: char,
}

fn default_low_stock_threshold() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

fn default_currency_symbol() -> String {
    "R$ ".to_string()
}

fn default_decimal_separator() -> char {
    ','
}

fn default_thousands_separator() -> char {
    '.'
}

impl Default for InventorySettings {
    fn default() -> Self {
        InventorySettings {
            low_stock_threshold: default_low_stock_threshold(),
            currency_symbol: default_currency_symbol(),
            decimal_separator: default_decimal_separator(),
            thousands_separator: default_thousands_separator(),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSettings {
    /// HS256 key for session tokens.
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "default_session_lifetime")]
    pub session_lifetime_secs: i64,

    /// New accounts must be confirmed before they can sign in.
    #[serde(default)]
    pub require_confirmation: bool,
}

fn default_session_lifetime() -> i64 {
    3600
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            jwt_secret: String::new(),
            session_lifetime_secs: default_session_lifetime(),
            require_confirmation: false,
        }
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"<redacted>")
            .field("session_lifetime_secs", &self.session_lifetime_secs)
            .field("require_confirmation", &self.require_confirmation)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    DEFAULT_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_filter(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub inventory: InventorySettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (estoque.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigDir)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.max_connections == 0 {
            return Err(invalid("database.max_connections", "must be greater than 0"));
        }

        if self.inventory.low_stock_threshold < 0 {
            return Err(invalid("inventory.low_stock_threshold", "must not be negative"));
        }

        if self.inventory.decimal_separator == self.inventory.thousands_separator {
            return Err(invalid(
                "inventory.decimal_separator",
                "must differ from thousands_separator",
            ));
        }

        if self.auth.session_lifetime_secs <= 0 {
            return Err(invalid("auth.session_lifetime_secs", "must be greater than 0"));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("ESTOQUE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(max) = std::env::var("ESTOQUE_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring invalid ESTOQUE_DB_MAX_CONNECTIONS"),
            }
        }

        if let Ok(threshold) = std::env::var("ESTOQUE_LOW_STOCK_THRESHOLD") {
            match threshold.parse::<i64>() {
                Ok(n) => self.inventory.low_stock_threshold = n,
                Err(_) => warn!(value = %threshold, "Ignoring invalid ESTOQUE_LOW_STOCK_THRESHOLD"),
            }
        }

        if let Ok(secret) = std::env::var("ESTOQUE_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Ok(flag) = std::env::var("ESTOQUE_REQUIRE_CONFIRMATION") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.auth.require_confirmation = true,
                "0" | "false" | "no" => self.auth.require_confirmation = false,
                _ => warn!(value = %flag, "Ignoring invalid ESTOQUE_REQUIRE_CONFIRMATION"),
            }
        }

        if let Ok(filter) = std::env::var("ESTOQUE_LOG") {
            self.logging.filter = filter;
        }
    }

    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "estoque", "estoque")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Connection settings for [`estoque_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database.path.clone()).max_connections(self.database.max_connections)
    }

    /// Renders an amount for display, e.g. `R$ 1.234,56`.
    pub fn format_currency(&self, amount: Money) -> String {
        let settings = &self.inventory;
        let cents = amount.cents();
        let whole = (cents / 100).unsigned_abs().to_string();
        let frac = (cents % 100).unsigned_abs();

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(settings.thousands_separator);
            }
            grouped.push(digit);
        }

        format!(
            "{}{}{}{}{:02}",
            if cents < 0 { "-" } else { "" },
            settings.currency_symbol,
            grouped,
            settings.decimal_separator,
            frac
        )
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
