//! Application settings and Telegram configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Telegram Bot API configuration.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token issued by `@BotFather`.
    pub bot_token: String,
}

impl TelegramConfig {
    /// Creates a new Telegram configuration.
    #[must_use]
    pub const fn new(bot_token: String) -> Self {
        Self { bot_token }
    }

    /// Creates configuration from environment variables.
    ///
    /// Expects `BOT_TOKEN` to be set.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token =
            std::env::var("BOT_TOKEN").map_err(|_| ConfigError::MissingEnvVar("BOT_TOKEN"))?;

        if bot_token.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar("BOT_TOKEN"));
        }

        Ok(Self { bot_token })
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &mask_token(&self.bot_token))
            .finish()
    }
}

/// Storage backend for player records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process memory only; everything is lost on restart.
    Memory,
    /// A single JSON document.
    #[default]
    Json,
    /// An `SQLite` database file.
    Sqlite,
}

impl StoreBackend {
    /// Default file for backends that persist to disk.
    #[must_use]
    pub fn default_path(self) -> Option<PathBuf> {
        match self {
            Self::Memory => None,
            Self::Json => Some(PathBuf::from("users.json")),
            Self::Sqlite => Some(PathBuf::from("carcase.db")),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "json" => Ok(Self::Json),
            "sqlite" | "sql" | "db" => Ok(Self::Sqlite),
            other => Err(ConfigError::InvalidStoreBackend(other.to_owned())),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Memory => "memory",
            Self::Json => "json",
            Self::Sqlite => "sqlite",
        };
        f.write_str(name)
    }
}

/// Bot-specific settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSettings {
    /// Path to the catalog JSON file.
    pub catalog_path: PathBuf,

    /// Where player records live.
    pub store_backend: StoreBackend,

    /// Explicit store location; falls back to the backend's default file.
    pub store_path: Option<PathBuf>,

    /// Cars shown per garage page.
    pub garage_page_size: usize,
}

const DEFAULT_GARAGE_PAGE_SIZE: usize = 5;

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("catalog.json"),
            store_backend: StoreBackend::default(),
            store_path: None,
            garage_page_size: DEFAULT_GARAGE_PAGE_SIZE,
        }
    }
}

impl BotSettings {
    /// Creates bot settings from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `STORE_BACKEND` names an unknown backend.
    pub fn from_env_with_defaults() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from a variable lookup, falling back to defaults for
    /// anything unset.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let store_backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => defaults.store_backend,
        };

        Ok(Self {
            catalog_path: lookup("CATALOG_PATH").map_or(defaults.catalog_path, PathBuf::from),
            store_backend,
            store_path: lookup("STORE_PATH").map(PathBuf::from),
            garage_page_size: lookup("GARAGE_PAGE_SIZE")
                .and_then(|s| s.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.garage_page_size),
        })
    }

    /// The store location after applying the backend default.
    #[must_use]
    pub fn resolved_store_path(&self) -> Option<PathBuf> {
        match self.store_backend {
            StoreBackend::Memory => None,
            backend => self
                .store_path
                .clone()
                .or_else(|| backend.default_path()),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Unknown store backend '{0}' (expected memory, json or sqlite)")]
    InvalidStoreBackend(String),
}

/// Masks a bot token for logging (keeps the numeric bot ID).
fn mask_token(token: &str) -> String {
    match token.split_once(':') {
        Some((bot_id, _)) => format!("{bot_id}:***"),
        None => "***".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = BotSettings::default();
        assert_eq!(settings.catalog_path, PathBuf::from("catalog.json"));
        assert_eq!(settings.store_backend, StoreBackend::Json);
        assert_eq!(settings.garage_page_size, 5);
    }

    #[test]
    fn test_resolved_store_path() {
        let mut settings = BotSettings::default();
        assert_eq!(settings.resolved_store_path(), Some(PathBuf::from("users.json")));

        settings.store_backend = StoreBackend::Sqlite;
        assert_eq!(settings.resolved_store_path(), Some(PathBuf::from("carcase.db")));

        settings.store_path = Some(PathBuf::from("/data/players.db"));
        assert_eq!(
            settings.resolved_store_path(),
            Some(PathBuf::from("/data/players.db"))
        );

        settings.store_backend = StoreBackend::Memory;
        assert_eq!(settings.resolved_store_path(), None);
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("JSON".parse::<StoreBackend>().unwrap(), StoreBackend::Json);
        assert_eq!(" sqlite ".parse::<StoreBackend>().unwrap(), StoreBackend::Sqlite);
        assert_eq!("mem".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!(matches!(
            "redis".parse::<StoreBackend>(),
            Err(ConfigError::InvalidStoreBackend(_))
        ));
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_owned())
        }
    }

    #[test]
    fn test_settings_from_empty_environment() {
        let settings = BotSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, BotSettings::default());
    }

    #[test]
    fn test_settings_from_environment() {
        let settings = BotSettings::from_lookup(lookup(&[
            ("CATALOG_PATH", "/etc/carcase/catalog.json"),
            ("STORE_BACKEND", "sqlite"),
            ("STORE_PATH", "/var/lib/carcase/players.db"),
            ("GARAGE_PAGE_SIZE", "8"),
        ]))
        .unwrap();

        assert_eq!(settings.catalog_path, PathBuf::from("/etc/carcase/catalog.json"));
        assert_eq!(settings.store_backend, StoreBackend::Sqlite);
        assert_eq!(
            settings.store_path,
            Some(PathBuf::from("/var/lib/carcase/players.db"))
        );
        assert_eq!(settings.garage_page_size, 8);
    }

    #[test]
    fn test_unknown_store_backend_is_rejected() {
        let result = BotSettings::from_lookup(lookup(&[("STORE_BACKEND", "sqlit")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidStoreBackend(name)) if name == "sqlit"
        ));
    }

    #[test]
    fn test_bad_page_size_falls_back_to_default() {
        for value in ["0", "-3", "lots"] {
            let settings =
                BotSettings::from_lookup(lookup(&[("GARAGE_PAGE_SIZE", value)])).unwrap();
            assert_eq!(settings.garage_page_size, 5);
        }
    }

    #[test]
    fn test_telegram_config_debug_masks_token() {
        let config = TelegramConfig::new("123456:ABC-secret".to_owned());
        let debug = format!("{config:?}");
        assert!(debug.contains("123456:***"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_mask_token_without_separator() {
        assert_eq!(mask_token("garbage"), "***");
    }
}
