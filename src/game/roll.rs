//! Weighted rarity roll.
//!
//! A roll draws one integer uniformly from `1..=total_weight`, walks the
//! cumulative weights in declared tier order and picks the first tier whose
//! bound is not exceeded. The car is then drawn uniformly from that tier's
//! pool.

use rand::Rng;
use rand::seq::SliceRandom;

use super::RollError;
use crate::config::{GameConfig, Item, Tier};

/// Result of a single roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roll<'a> {
    pub tier: &'a Tier,
    pub item: &'a Item,
    /// Position of `item` in the catalog.
    pub index: usize,
}

/// Picks the tier a 1-based draw lands in.
///
/// Falls back to the last declared tier when the draw exceeds the total.
#[must_use]
pub fn select_tier(tiers: &[Tier], draw: u64) -> Option<&Tier> {
    let mut cumulative = 0u64;
    for tier in tiers {
        cumulative += u64::from(tier.weight);
        if draw <= cumulative {
            return Some(tier);
        }
    }
    tiers.last()
}

/// Draws a tier by weight.
pub fn roll_tier<'a, R: Rng + ?Sized>(
    config: &'a GameConfig,
    rng: &mut R,
) -> Result<&'a Tier, RollError> {
    let total = config.total_weight();
    if total == 0 {
        return config.tiers.last().ok_or(RollError::NoTiers);
    }

    let draw = rng.gen_range(1..=total);
    select_tier(&config.tiers, draw).ok_or(RollError::NoTiers)
}

/// Draws a tier, then a car from that tier.
pub fn roll<'a, R: Rng + ?Sized>(
    config: &'a GameConfig,
    rng: &mut R,
) -> Result<Roll<'a>, RollError> {
    let tier = roll_tier(config, rng)?;
    let pool: Vec<(usize, &Item)> = config
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.tier == tier.id)
        .collect();
    let &(index, item) = pool.choose(rng).ok_or_else(|| RollError::EmptyPool {
        tier: tier.id.clone(),
    })?;

    Ok(Roll { tier, item, index })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn weighted_tiers() -> Vec<Tier> {
        vec![
            Tier::new("common", "Common", "", 70, 20, 5, 0),
            Tier::new("rare", "Rare", "", 21, 120, 25, 0),
            Tier::new("epic", "Epic", "", 8, 600, 120, 0),
            Tier::new("legendary", "Legendary", "", 1, 3000, 600, 0),
        ]
    }

    #[test]
    fn test_draw_85_selects_rare() {
        let tiers = weighted_tiers();
        assert_eq!(select_tier(&tiers, 85).map(|t| t.id.as_str()), Some("rare"));
    }

    #[test]
    fn test_cumulative_bounds_are_inclusive() {
        let tiers = weighted_tiers();
        let pick = |draw| select_tier(&tiers, draw).map(|t| t.id.clone()).unwrap();
        assert_eq!(pick(1), "common");
        assert_eq!(pick(70), "common");
        assert_eq!(pick(71), "rare");
        assert_eq!(pick(91), "rare");
        assert_eq!(pick(92), "epic");
        assert_eq!(pick(99), "epic");
        assert_eq!(pick(100), "legendary");
    }

    #[test]
    fn test_overshooting_draw_falls_back_to_last() {
        let tiers = weighted_tiers();
        assert_eq!(
            select_tier(&tiers, 150).map(|t| t.id.as_str()),
            Some("legendary")
        );
        assert!(select_tier(&[], 1).is_none());
    }

    #[test]
    fn test_zero_weight_tier_is_never_selected() {
        let tiers = vec![
            Tier::new("never", "Never", "", 0, 2, 1, 0),
            Tier::new("always", "Always", "", 5, 2, 1, 0),
        ];
        for draw in 1..=5 {
            assert_eq!(select_tier(&tiers, draw).map(|t| t.id.as_str()), Some("always"));
        }
    }

    #[test]
    fn test_tier_frequencies_follow_weights() {
        let config = GameConfig::example();
        let mut rng = StdRng::seed_from_u64(7);
        let trials = 200_000u32;

        let mut counts: HashMap<&str, u32> = HashMap::new();
        for _ in 0..trials {
            let tier = roll_tier(&config, &mut rng).unwrap();
            *counts.entry(tier.id.as_str()).or_default() += 1;
        }

        let total = config.total_weight() as f64;
        for tier in &config.tiers {
            let expected = f64::from(tier.weight) / total;
            let observed = f64::from(counts.get(tier.id.as_str()).copied().unwrap_or(0))
                / f64::from(trials);
            assert!(
                (observed - expected).abs() < 0.01,
                "{}: expected {expected}, observed {observed}",
                tier.id
            );
        }
    }

    #[test]
    fn test_roll_item_comes_from_rolled_tier() {
        let config = GameConfig::example();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let roll = roll(&config, &mut rng).unwrap();
            assert_eq!(roll.item.tier, roll.tier.id);
            assert_eq!(config.item(roll.index), Some(roll.item));
        }
    }

    #[test]
    fn test_roll_empty_pool() {
        let mut config = GameConfig::example();
        config.items.clear();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(roll(&config, &mut rng), Err(RollError::EmptyPool { .. })));
    }

    #[test]
    fn test_roll_no_tiers() {
        let mut config = GameConfig::example();
        config.tiers.clear();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(roll_tier(&config, &mut rng), Err(RollError::NoTiers)));
    }
}
