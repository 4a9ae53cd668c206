//! Configuration loading for the Providers service.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `PROVIDERS_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, net::SocketAddr, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Secret value shipped for the local profile only; rejected elsewhere.
const DEV_CSRF_SECRET: &str = "dev-only-csrf-secret-change-me";

/// Application configuration derived from `PROVIDERS_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub db_acquire_timeout_ms: u64,
    /// Server-side secret the delete tokens are signed with
    #[serde(default = "default_csrf_secret")]
    pub csrf_secret: String,
    /// Locale the alias routes redirect to
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// Locale codes accepted in localized paths
    #[serde(default = "default_supported_locales")]
    pub supported_locales: Vec<String>,
    /// Insert the sample data set at startup when the table is empty
    #[serde(default)]
    pub seed_on_start: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            api_bind_addr: default_api_bind_addr(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            database_url: default_database_url(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_ms: default_db_acquire_timeout_ms(),
            csrf_secret: default_csrf_secret(),
            default_locale: default_locale(),
            supported_locales: default_supported_locales(),
            seed_on_start: false,
        }
    }
}

impl AppConfig {
    /// Returns the configured bind address as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.api_bind_addr.parse()
    }

    /// Returns a redacted JSON representation (secrets are redacted).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        if !config.csrf_secret.is_empty() {
            config.csrf_secret = "[REDACTED]".to_string();
        }
        serde_json::to_string_pretty(&config)
    }

    /// Whether a locale code belongs to the configured supported set.
    pub fn is_supported_locale(&self, locale: &str) -> bool {
        self.supported_locales.iter().any(|l| l == locale)
    }

    /// Validates the configuration, returning an error if required settings are missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.csrf_secret.is_empty() {
            return Err(ConfigError::MissingCsrfSecret);
        }

        // The shipped dev secret must never sign tokens outside local/test
        if !matches!(self.profile.as_str(), "local" | "test") && self.csrf_secret == DEV_CSRF_SECRET
        {
            return Err(ConfigError::InsecureCsrfSecret {
                profile: self.profile.clone(),
            });
        }

        if self.supported_locales.is_empty() {
            return Err(ConfigError::MissingSupportedLocales);
        }

        for locale in &self.supported_locales {
            if !is_valid_locale_code(locale) {
                return Err(ConfigError::InvalidLocaleCode {
                    value: locale.clone(),
                });
            }
        }

        if !self.is_supported_locale(&self.default_locale) {
            return Err(ConfigError::DefaultLocaleNotSupported {
                locale: self.default_locale.clone(),
            });
        }

        Ok(())
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_api_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_database_url() -> String {
    "sqlite://providers.db?mode=rwc".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_ms() -> u64 {
    5000
}

fn default_csrf_secret() -> String {
    DEV_CSRF_SECRET.to_string()
}

fn default_locale() -> String {
    "es".to_string()
}

fn default_supported_locales() -> Vec<String> {
    vec!["es".to_string(), "en".to_string()]
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid api bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("csrf secret is missing; set PROVIDERS_CSRF_SECRET environment variable")]
    MissingCsrfSecret,
    #[error("the built-in dev csrf secret cannot be used in the '{profile}' profile")]
    InsecureCsrfSecret { profile: String },
    #[error("no supported locales configured; set PROVIDERS_SUPPORTED_LOCALES")]
    MissingSupportedLocales,
    #[error("invalid locale code: {value}")]
    InvalidLocaleCode { value: String },
    #[error("default locale '{locale}' is not in the supported locale set")]
    DefaultLocaleNotSupported { locale: String },
}

/// Check if a string looks like a locale code (e.g. `es`, `en`, `es-AR`)
fn is_valid_locale_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= 5
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Loads configuration using layered `.env` files and `PROVIDERS_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads configuration from the layered env files and the process environment.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix("PROVIDERS_") {
                layered.insert(stripped.to_string(), value);
            }
        }

        let profile = layered
            .remove("PROFILE")
            .filter(|v| !v.is_empty())
            .unwrap_or(profile_hint);
        let api_bind_addr = layered
            .remove("API_BIND_ADDR")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_api_bind_addr);
        let log_level = layered
            .remove("LOG_LEVEL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_level);
        let log_format = layered
            .remove("LOG_FORMAT")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_format);
        let database_url = layered
            .remove("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_database_url);
        let db_max_connections = layered
            .remove("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_max_connections);
        let db_acquire_timeout_ms = layered
            .remove("DB_ACQUIRE_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_acquire_timeout_ms);
        let csrf_secret = layered
            .remove("CSRF_SECRET")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_csrf_secret);
        let default_locale = layered
            .remove("DEFAULT_LOCALE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(self::default_locale);

        // Comma-separated list, e.g. PROVIDERS_SUPPORTED_LOCALES=es,en,fr
        let supported_locales = layered
            .remove("SUPPORTED_LOCALES")
            .map(|locales| {
                locales
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(default_supported_locales);

        let seed_on_start = layered
            .remove("SEED_ON_START")
            .and_then(|v| v.parse().ok())
            .unwrap_or(false);

        let config = AppConfig {
            profile,
            api_bind_addr,
            log_level,
            log_format,
            database_url,
            db_max_connections,
            db_acquire_timeout_ms,
            csrf_secret,
            default_locale,
            supported_locales,
            seed_on_start,
        };

        // Validate configuration
        config.validate()?;

        match config.bind_addr() {
            Ok(_) => Ok(config),
            Err(source) => Err(ConfigError::InvalidBindAddr {
                value: config.api_bind_addr.clone(),
                source,
            }),
        }
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var("PROVIDERS_PROFILE")
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix("PROVIDERS_") {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
