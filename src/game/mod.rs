//! Game rules.
//!
//! The reward roll and cooldown gate live in [`claim`] and [`roll`]; the
//! remaining modules are the rank table, garage views and coin economy.
//! [`GameService`] applies all of them atomically against a player store.

pub mod claim;
pub mod economy;
pub mod garage;
pub mod rank;
pub mod roll;
mod service;

use thiserror::Error;

use crate::store::StoreError;

pub use claim::{ClaimOutcome, Reward, TokenOutcome, cooldown_remaining, format_remaining};
pub use economy::{PurchaseOutcome, SaleOutcome};
pub use garage::{GarageEntry, GaragePage, TierSummary};
pub use service::GameService;

/// Errors raised while rolling a reward.
#[derive(Debug, Error)]
pub enum RollError {
    #[error("No rarity tiers configured")]
    NoTiers,

    #[error("Tier {tier} has no cars to draw from")]
    EmptyPool { tier: String },
}

/// Errors raised by game operations.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Roll(#[from] RollError),
}
