//! Garage listings and collection summaries.

use tracing::debug;

use crate::config::{GameConfig, Tier};
use crate::store::UserRecord;

/// One owned car resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GarageEntry {
    /// Catalog index of the car.
    pub index: usize,
    pub name: String,
    pub tier: Tier,
}

/// A page of the garage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaragePage {
    pub entries: Vec<GarageEntry>,
    /// Zero-based page number after clamping.
    pub page: usize,
    pub total_pages: usize,
    /// Cars across all pages.
    pub total: usize,
}

/// Owned cars in a given tier against that tier's pool size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSummary {
    pub tier: Tier,
    pub owned: usize,
    pub total: usize,
}

/// All owned cars sorted by tier order, then name.
///
/// Cars the catalog no longer knows are skipped.
#[must_use]
pub fn garage_entries(record: &UserRecord, config: &GameConfig) -> Vec<GarageEntry> {
    let mut entries: Vec<(usize, GarageEntry)> = record
        .garage
        .iter()
        .filter_map(|name| {
            let Some(index) = config.item_index(name) else {
                debug!("Skipping unknown car '{}' for user {}", name, record.user_id);
                return None;
            };
            let item = config.item(index)?;
            let position = config.tier_position(&item.tier)?;
            let tier = config.tiers.get(position)?.clone();
            Some((
                position,
                GarageEntry {
                    index,
                    name: name.clone(),
                    tier,
                },
            ))
        })
        .collect();

    entries.sort_by(|(pos_a, a), (pos_b, b)| pos_a.cmp(pos_b).then_with(|| a.name.cmp(&b.name)));
    entries.into_iter().map(|(_, entry)| entry).collect()
}

/// Cuts the sorted garage into pages of `page_size`.
///
/// Pages past the end clamp to the last page.
#[must_use]
pub fn garage_page(
    record: &UserRecord,
    config: &GameConfig,
    page: usize,
    page_size: usize,
) -> GaragePage {
    let page_size = page_size.max(1);
    let all = garage_entries(record, config);
    let total = all.len();
    let total_pages = total.div_ceil(page_size).max(1);
    let page = page.min(total_pages - 1);

    let entries = all
        .into_iter()
        .skip(page * page_size)
        .take(page_size)
        .collect();

    GaragePage {
        entries,
        page,
        total_pages,
        total,
    }
}

/// Owned/total counts for every tier in draw order.
#[must_use]
pub fn collection_summary(record: &UserRecord, config: &GameConfig) -> Vec<TierSummary> {
    config
        .tiers
        .iter()
        .map(|tier| {
            let pool = config.pool(&tier.id);
            let owned = pool.iter().filter(|item| record.owns(&item.name)).count();
            TierSummary {
                tier: tier.clone(),
                owned,
                total: pool.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(cars: &[&str]) -> UserRecord {
        let mut record = UserRecord::new(1);
        for car in cars {
            record.add_item(car);
        }
        record
    }

    #[test]
    fn test_entries_sorted_by_tier_then_name() {
        let config = GameConfig::example();
        let record = record_with(&["Bugatti Chiron", "Toyota Camry", "Audi R8", "Ford Focus"]);

        let names: Vec<_> = garage_entries(&record, &config)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Ford Focus", "Toyota Camry", "Audi R8", "Bugatti Chiron"]);
    }

    #[test]
    fn test_unknown_cars_are_skipped() {
        let config = GameConfig::example();
        let record = record_with(&["Lada Niva", "Audi R8"]);

        let entries = garage_entries(&record, &config);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Audi R8");
        assert_eq!(entries[0].index, config.item_index("Audi R8").unwrap());
    }

    #[test]
    fn test_pagination() {
        let config = GameConfig::example();
        let all: Vec<&str> = config.items.iter().map(|i| i.name.as_str()).collect();
        let record = record_with(&all);

        let first = garage_page(&record, &config, 0, 5);
        assert_eq!(first.total, 11);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.entries.len(), 5);

        let last = garage_page(&record, &config, 2, 5);
        assert_eq!(last.entries.len(), 1);

        let clamped = garage_page(&record, &config, 40, 5);
        assert_eq!(clamped.page, 2);
    }

    #[test]
    fn test_empty_garage_page() {
        let config = GameConfig::example();
        let page = garage_page(&UserRecord::new(1), &config, 0, 5);
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 1);
        assert!(page.entries.is_empty());
    }

    #[test]
    fn test_collection_summary() {
        let config = GameConfig::example();
        let record = record_with(&["Toyota Camry", "Honda Civic", "Bugatti Chiron"]);

        let summary = collection_summary(&record, &config);
        let counts: Vec<_> = summary.iter().map(|s| (s.owned, s.total)).collect();
        assert_eq!(counts, vec![(2, 3), (0, 3), (0, 3), (1, 2)]);
    }
}
