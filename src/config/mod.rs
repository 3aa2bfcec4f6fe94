//! Configuration module for the `CarCase` bot.
//!
//! Handles loading and validation of the game catalog (tiers, cars,
//! ranks, economy) and of the environment-driven bot settings.

mod catalog;
mod settings;

pub use catalog::{CatalogError, GameConfig, Item, Rank, SalePolicy, Tier};
pub use settings::{BotSettings, ConfigError, StoreBackend, TelegramConfig};

/// Default cooldown between free case openings (5 hours).
pub const DEFAULT_COOLDOWN_SECS: u64 = 5 * 60 * 60;
