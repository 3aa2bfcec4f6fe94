//! Game catalog configuration and validation.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::DEFAULT_COOLDOWN_SECS;

/// Errors that can occur while loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("No rarity tiers configured")]
    NoTiers,

    #[error("Duplicate tier ID found: {id}")]
    DuplicateTier { id: String },

    #[error("Tier {id} has no items in its pool")]
    EmptyTier { id: String },

    #[error("Tier {id} pays more for a duplicate ({duplicate_reward}) than for a new item ({new_reward})")]
    DuplicateRewardTooHigh {
        id: String,
        new_reward: u64,
        duplicate_reward: u64,
    },

    #[error("Tier weights sum to zero")]
    ZeroTotalWeight,

    #[error("Item at index {index} ({name}) references unknown tier: {tier}")]
    UnknownTier {
        index: usize,
        name: String,
        tier: String,
    },

    #[error("Duplicate item name found: {name}")]
    DuplicateItem { name: String },

    #[error("Item at index {index} has an empty name")]
    EmptyItemName { index: usize },

    #[error("No ranks configured")]
    NoRanks,

    #[error("First rank threshold must be 0, got {threshold}")]
    FirstRankNotZero { threshold: u64 },

    #[error("Rank at index {index} ({title}) is not above the previous threshold")]
    RanksNotAscending { index: usize, title: String },

    #[error("Cooldown must be greater than 0 seconds")]
    InvalidCooldown,

    #[error("Case price must not be negative: {price}")]
    NegativeCasePrice { price: i64 },

    #[error("Tier {id} has a negative sell price: {price}")]
    NegativeSellPrice { id: String, price: i64 },

    #[error("Failed to read catalog file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse catalog file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// A rarity tier with its draw weight and payouts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tier {
    /// Stable identifier, referenced by items.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Display emoji.
    #[serde(default)]
    pub emoji: String,

    /// Relative draw weight.
    pub weight: u32,

    /// REP paid when the drawn item is new to the user.
    pub new_reward: u64,

    /// REP paid when the user already owns the drawn item.
    pub duplicate_reward: u64,

    /// Coins credited when an item of this tier is sold.
    #[serde(default)]
    pub sell_price: i64,
}

impl Tier {
    /// Creates a new tier.
    #[must_use]
    pub fn new(
        id: &str,
        name: &str,
        emoji: &str,
        weight: u32,
        new_reward: u64,
        duplicate_reward: u64,
        sell_price: i64,
    ) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            emoji: emoji.to_owned(),
            weight,
            new_reward,
            duplicate_reward,
            sell_price,
        }
    }

    /// Returns the reward for an item of this tier.
    #[must_use]
    pub const fn reward(&self, is_new: bool) -> u64 {
        if is_new {
            self.new_reward
        } else {
            self.duplicate_reward
        }
    }
}

/// A collectible car and the tier it drops from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub tier: String,
}

impl Item {
    #[must_use]
    pub fn new(name: &str, tier: &str) -> Self {
        Self {
            name: name.to_owned(),
            tier: tier.to_owned(),
        }
    }
}

/// A title unlocked once the score reaches `threshold`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rank {
    pub threshold: u64,
    pub title: String,
}

impl Rank {
    #[must_use]
    pub fn new(threshold: u64, title: &str) -> Self {
        Self {
            threshold,
            title: title.to_owned(),
        }
    }
}

/// What happens to a car when it is sold.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SalePolicy {
    /// Credit the coins and leave the car in the garage.
    ///
    /// This reproduces the behaviour players already know. A car can then be
    /// sold again, so coins are unbounded.
    #[default]
    KeepItem,

    /// Credit the coins and remove the car from the garage.
    RemoveItem,
}

/// Complete game catalog: tiers, items, ranks and economy tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Seconds between free case openings.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Coin price of one case token in the shop.
    #[serde(default = "default_case_price")]
    pub case_price: i64,

    /// Sale semantics.
    #[serde(default)]
    pub sale_policy: SalePolicy,

    /// Rarity tiers in draw order.
    pub tiers: Vec<Tier>,

    /// All collectible items.
    pub items: Vec<Item>,

    /// Ascending rank table.
    pub ranks: Vec<Rank>,
}

const fn default_cooldown_secs() -> u64 {
    DEFAULT_COOLDOWN_SECS
}

const fn default_case_price() -> i64 {
    1000
}

impl GameConfig {
    /// Loads a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Saves the catalog to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), CatalogError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the catalog.
    ///
    /// # Errors
    ///
    /// Returns the first validation error encountered.
    pub fn validate(&self) -> Result<(), CatalogError> {
        match self.validate_all().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Returns every validation problem found in the catalog.
    #[must_use]
    pub fn validate_all(&self) -> Vec<CatalogError> {
        let mut errors = Vec::new();

        if self.cooldown_secs == 0 {
            errors.push(CatalogError::InvalidCooldown);
        }

        if self.case_price < 0 {
            errors.push(CatalogError::NegativeCasePrice {
                price: self.case_price,
            });
        }

        if self.tiers.is_empty() {
            errors.push(CatalogError::NoTiers);
        } else if self.total_weight() == 0 {
            errors.push(CatalogError::ZeroTotalWeight);
        }

        let mut tier_ids = HashSet::new();
        for tier in &self.tiers {
            if !tier_ids.insert(tier.id.as_str()) {
                errors.push(CatalogError::DuplicateTier {
                    id: tier.id.clone(),
                });
                continue;
            }

            if tier.duplicate_reward >= tier.new_reward {
                errors.push(CatalogError::DuplicateRewardTooHigh {
                    id: tier.id.clone(),
                    new_reward: tier.new_reward,
                    duplicate_reward: tier.duplicate_reward,
                });
            }

            if tier.sell_price < 0 {
                errors.push(CatalogError::NegativeSellPrice {
                    id: tier.id.clone(),
                    price: tier.sell_price,
                });
            }
        }

        let mut names = HashSet::new();
        for (index, item) in self.items.iter().enumerate() {
            if item.name.trim().is_empty() {
                errors.push(CatalogError::EmptyItemName { index });
                continue;
            }

            if !names.insert(item.name.as_str()) {
                errors.push(CatalogError::DuplicateItem {
                    name: item.name.clone(),
                });
                continue;
            }

            if !tier_ids.contains(item.tier.as_str()) {
                errors.push(CatalogError::UnknownTier {
                    index,
                    name: item.name.clone(),
                    tier: item.tier.clone(),
                });
            }
        }

        for tier in &self.tiers {
            if !self.items.iter().any(|item| item.tier == tier.id) {
                errors.push(CatalogError::EmptyTier {
                    id: tier.id.clone(),
                });
            }
        }

        match self.ranks.first() {
            None => errors.push(CatalogError::NoRanks),
            Some(first) if first.threshold != 0 => {
                errors.push(CatalogError::FirstRankNotZero {
                    threshold: first.threshold,
                });
            }
            Some(_) => {}
        }

        for (index, pair) in self.ranks.windows(2).enumerate() {
            if pair[1].threshold <= pair[0].threshold {
                errors.push(CatalogError::RanksNotAscending {
                    index: index + 1,
                    title: pair[1].title.clone(),
                });
            }
        }

        errors
    }

    /// Sum of all tier weights.
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.tiers.iter().map(|t| u64::from(t.weight)).sum()
    }

    /// The cooldown between free case openings.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Looks up a tier by ID.
    #[must_use]
    pub fn tier(&self, id: &str) -> Option<&Tier> {
        self.tiers.iter().find(|t| t.id == id)
    }

    /// Position of a tier in draw order.
    #[must_use]
    pub fn tier_position(&self, id: &str) -> Option<usize> {
        self.tiers.iter().position(|t| t.id == id)
    }

    /// Gets an item by catalog index.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Finds the catalog index of an item by name.
    #[must_use]
    pub fn item_index(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|i| i.name == name)
    }

    /// Returns the tier an item belongs to, if both are known.
    #[must_use]
    pub fn tier_of(&self, item_name: &str) -> Option<&Tier> {
        let item = self.items.iter().find(|i| i.name == item_name)?;
        self.tier(&item.tier)
    }

    /// All items belonging to a tier, in catalog order.
    #[must_use]
    pub fn pool(&self, tier_id: &str) -> Vec<&Item> {
        self.items.iter().filter(|i| i.tier == tier_id).collect()
    }

    /// Creates the stock catalog.
    #[must_use]
    pub fn example() -> Self {
        Self {
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            case_price: default_case_price(),
            sale_policy: SalePolicy::default(),
            tiers: vec![
                Tier::new("common", "Common", "⚪", 60, 20, 5, 200),
                Tier::new("rare", "Rare", "🔵", 30, 120, 25, 1000),
                Tier::new("epic", "Epic", "🟣", 9, 600, 120, 5000),
                Tier::new("legendary", "Legendary", "💎", 1, 3000, 600, 50000),
            ],
            items: vec![
                Item::new("Toyota Camry", "common"),
                Item::new("Honda Civic", "common"),
                Item::new("Ford Focus", "common"),
                Item::new("Toyota Supra A80", "rare"),
                Item::new("Nissan Skyline GTR", "rare"),
                Item::new("BMW M3 E46", "rare"),
                Item::new("BMW M5 F90", "epic"),
                Item::new("Audi R8", "epic"),
                Item::new("Lamborghini Huracan", "epic"),
                Item::new("Bugatti Chiron", "legendary"),
                Item::new("Koenigsegg Agera RS", "legendary"),
            ],
            ranks: vec![
                Rank::new(0, "Rookie"),
                Rank::new(1500, "Collector"),
                Rank::new(5000, "Hunter"),
                Rank::new(15000, "Expert"),
                Rank::new(40000, "Connoisseur"),
                Rank::new(100_000, "Millionaire"),
            ],
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::example()
    }
}
