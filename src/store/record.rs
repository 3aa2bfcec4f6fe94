//! Player record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything the game knows about one player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    /// Telegram user ID.
    pub user_id: u64,

    /// Display name captured on the last interaction.
    #[serde(default)]
    pub name: Option<String>,

    /// Coin balance.
    #[serde(default)]
    pub balance: i64,

    /// Accumulated REP.
    #[serde(default)]
    pub score: u64,

    /// Owned cars in acquisition order, without duplicates.
    #[serde(default)]
    pub garage: Vec<String>,

    /// Case tokens bought in the shop.
    #[serde(default)]
    pub case_tokens: u32,

    /// When the last free case was opened.
    #[serde(default)]
    pub last_claim: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Creates the record a brand-new player starts with.
    #[must_use]
    pub const fn new(user_id: u64) -> Self {
        Self {
            user_id,
            name: None,
            balance: 0,
            score: 0,
            garage: Vec::new(),
            case_tokens: 0,
            last_claim: None,
        }
    }

    /// Checks whether the player owns an item.
    #[must_use]
    pub fn owns(&self, item: &str) -> bool {
        self.garage.iter().any(|owned| owned == item)
    }

    /// Adds an item to the garage. Returns `false` if it was already there.
    pub fn add_item(&mut self, item: &str) -> bool {
        if self.owns(item) {
            return false;
        }
        self.garage.push(item.to_owned());
        true
    }

    /// Removes an item from the garage. Returns `false` if it was not there.
    pub fn remove_item(&mut self, item: &str) -> bool {
        let before = self.garage.len();
        self.garage.retain(|owned| owned != item);
        self.garage.len() != before
    }
}
