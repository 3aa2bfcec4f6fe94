//! Shop purchases and car sales.

use tracing::debug;

use crate::config::{GameConfig, SalePolicy};
use crate::store::UserRecord;

/// Outcome of buying a case token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased {
        price: i64,
        balance: i64,
        tokens: u32,
    },
    InsufficientFunds {
        balance: i64,
        price: i64,
    },
}

/// Outcome of selling a car.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleOutcome {
    Sold {
        item: String,
        price: i64,
        balance: i64,
        /// Whether the car left the garage.
        removed: bool,
    },
    NotOwned,
}

/// Spends `price` coins on one case token.
pub fn buy_case(record: &mut UserRecord, price: i64) -> PurchaseOutcome {
    if record.balance < price {
        return PurchaseOutcome::InsufficientFunds {
            balance: record.balance,
            price,
        };
    }

    record.balance -= price;
    record.case_tokens = record.case_tokens.saturating_add(1);

    PurchaseOutcome::Purchased {
        price,
        balance: record.balance,
        tokens: record.case_tokens,
    }
}

/// Sells the car at `index` in the catalog for its tier's price.
pub fn sell_item(record: &mut UserRecord, config: &GameConfig, index: usize) -> SaleOutcome {
    let Some(item) = config.item(index) else {
        debug!("Sale of unknown catalog index {}", index);
        return SaleOutcome::NotOwned;
    };

    if !record.owns(&item.name) {
        return SaleOutcome::NotOwned;
    }

    let Some(tier) = config.tier(&item.tier) else {
        debug!("Car '{}' has no tier, refusing sale", item.name);
        return SaleOutcome::NotOwned;
    };

    record.balance = record.balance.saturating_add(tier.sell_price);
    let removed = match config.sale_policy {
        SalePolicy::KeepItem => false,
        SalePolicy::RemoveItem => record.remove_item(&item.name),
    };

    SaleOutcome::Sold {
        item: item.name.clone(),
        price: tier.sell_price,
        balance: record.balance,
        removed,
    }
}
