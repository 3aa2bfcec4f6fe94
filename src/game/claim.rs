//! Cooldown gate and reward application.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;

use super::RollError;
use super::roll::{Roll, roll};
use crate::config::{GameConfig, Tier};
use crate::store::UserRecord;

/// What a case opening produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reward {
    /// The car that dropped.
    pub item: String,

    /// Catalog index of the car.
    pub item_index: usize,

    /// Tier the car belongs to.
    pub tier: Tier,

    /// Whether the car was new to the player.
    pub is_new: bool,

    /// REP added by this opening.
    pub reward: u64,

    /// REP after the opening.
    pub score: u64,

    /// Coin balance after the opening.
    pub balance: i64,
}

/// Outcome of a free case attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Still cooling down.
    Denied { remaining: Duration },
    /// Case opened.
    Granted(Reward),
}

/// Outcome of opening a bought case token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOutcome {
    /// The player holds no tokens.
    NoTokens,
    /// Case opened and one token consumed.
    Granted(Reward),
}

/// Time left before the next free case, `None` if one is available.
///
/// A last claim stamped in the future counts as a full cooldown.
#[must_use]
pub fn cooldown_remaining(
    last_claim: Option<DateTime<Utc>>,
    cooldown: Duration,
    now: DateTime<Utc>,
) -> Option<Duration> {
    let last = last_claim?;
    match (now - last).to_std() {
        Ok(elapsed) if elapsed >= cooldown => None,
        Ok(elapsed) => Some(cooldown - elapsed),
        Err(_) => Some(cooldown),
    }
}

/// Formats a wait as whole hours and minutes, truncating.
#[must_use]
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
}

/// Opens a free case if the cooldown allows it.
///
/// On success the record is updated in place: the car is added if new, the
/// reward is added to the score and the claim is stamped with `now`.
pub fn try_claim<R: Rng + ?Sized>(
    record: &mut UserRecord,
    config: &GameConfig,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<ClaimOutcome, RollError> {
    if let Some(remaining) = cooldown_remaining(record.last_claim, config.cooldown(), now) {
        return Ok(ClaimOutcome::Denied { remaining });
    }

    let drawn = roll(config, rng)?;
    let reward = apply_roll(record, drawn);
    record.last_claim = Some(now);

    Ok(ClaimOutcome::Granted(reward))
}

/// Opens a bought case. Ignores and keeps the cooldown.
pub fn open_token<R: Rng + ?Sized>(
    record: &mut UserRecord,
    config: &GameConfig,
    rng: &mut R,
) -> Result<TokenOutcome, RollError> {
    if record.case_tokens == 0 {
        return Ok(TokenOutcome::NoTokens);
    }

    let drawn = roll(config, rng)?;
    record.case_tokens -= 1;
    Ok(TokenOutcome::Granted(apply_roll(record, drawn)))
}

/// Credits a roll to the record.
fn apply_roll(record: &mut UserRecord, drawn: Roll<'_>) -> Reward {
    let is_new = record.add_item(&drawn.item.name);
    let reward = drawn.tier.reward(is_new);
    record.score = record.score.saturating_add(reward);

    Reward {
        item: drawn.item.name.clone(),
        item_index: drawn.index,
        tier: drawn.tier.clone(),
        is_new,
        reward,
        score: record.score,
        balance: record.balance,
    }
}
