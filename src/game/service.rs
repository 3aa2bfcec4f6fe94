//! Store-backed game operations.
//!
//! Every operation follows the same shape under one lock:
//! 1. Load the record (or start a fresh one)
//! 2. Apply the rule to a working copy
//! 3. Persist the copy with a single `put`
//!
//! A failed `put` leaves the stored record untouched, so a reward is never
//! applied without the matching garage change and vice versa.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::GameError;
use super::claim::{self, ClaimOutcome, TokenOutcome};
use super::economy::{self, PurchaseOutcome, SaleOutcome};
use crate::config::GameConfig;
use crate::store::{StoreError, UserRecord, UserStore};

struct Inner {
    store: Box<dyn UserStore>,
    rng: StdRng,
}

impl Inner {
    fn load(&self, user_id: u64) -> Result<UserRecord, StoreError> {
        Ok(self
            .store
            .get(user_id)?
            .unwrap_or_else(|| UserRecord::new(user_id)))
    }
}

/// The game as seen by command handlers.
pub struct GameService {
    config: Arc<GameConfig>,
    inner: Mutex<Inner>,
}

impl GameService {
    /// Creates a service with an entropy-seeded RNG.
    #[must_use]
    pub fn new(config: Arc<GameConfig>, store: Box<dyn UserStore>) -> Self {
        Self::with_rng(config, store, StdRng::from_entropy())
    }

    /// Creates a service with a caller-provided RNG.
    #[must_use]
    pub fn with_rng(config: Arc<GameConfig>, store: Box<dyn UserStore>, rng: StdRng) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner { store, rng }),
        }
    }

    /// The catalog in use.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Returns the player's record, creating and storing it on first contact.
    ///
    /// The display name is refreshed when it changed.
    pub async fn register(&self, user_id: u64, name: Option<&str>) -> Result<UserRecord, GameError> {
        let mut inner = self.inner.lock().await;

        let existing = inner.store.get(user_id)?;
        let is_new = existing.is_none();
        let mut record = existing.unwrap_or_else(|| UserRecord::new(user_id));

        let name = name.map(str::to_owned);
        if is_new || (name.is_some() && record.name != name) {
            record.name = name;
            inner.store.put(user_id, &record)?;
            if is_new {
                info!("Registered new player {}", user_id);
            }
        }

        Ok(record)
    }

    /// Reads a record without storing anything. Unknown players get a fresh one.
    pub async fn record(&self, user_id: u64) -> Result<UserRecord, GameError> {
        let inner = self.inner.lock().await;
        Ok(inner.load(user_id)?)
    }

    /// Opens a free case if the cooldown allows it.
    pub async fn try_claim(&self, user_id: u64, now: DateTime<Utc>) -> Result<ClaimOutcome, GameError> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;

        let mut record = inner.load(user_id)?;
        let outcome = claim::try_claim(&mut record, &self.config, now, &mut inner.rng)?;

        match &outcome {
            ClaimOutcome::Denied { remaining } => {
                debug!("User {} still cooling down ({:?} left)", user_id, remaining);
            }
            ClaimOutcome::Granted(reward) => {
                inner.store.put(user_id, &record)?;
                info!(
                    "User {} opened a case: {} [{}] +{} REP{}",
                    user_id,
                    reward.item,
                    reward.tier.id,
                    reward.reward,
                    if reward.is_new { " (new)" } else { "" }
                );
            }
        }

        Ok(outcome)
    }

    /// Opens a bought case token.
    pub async fn open_token(&self, user_id: u64) -> Result<TokenOutcome, GameError> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;

        let mut record = inner.load(user_id)?;
        let outcome = claim::open_token(&mut record, &self.config, &mut inner.rng)?;

        if let TokenOutcome::Granted(reward) = &outcome {
            inner.store.put(user_id, &record)?;
            info!(
                "User {} opened a case token: {} [{}] +{} REP, {} tokens left",
                user_id, reward.item, reward.tier.id, reward.reward, record.case_tokens
            );
        }

        Ok(outcome)
    }

    /// Buys one case token at the catalog price.
    pub async fn buy_case(&self, user_id: u64) -> Result<PurchaseOutcome, GameError> {
        let mut inner = self.inner.lock().await;

        let mut record = inner.load(user_id)?;
        let outcome = economy::buy_case(&mut record, self.config.case_price);

        match &outcome {
            PurchaseOutcome::Purchased { balance, tokens, .. } => {
                inner.store.put(user_id, &record)?;
                info!(
                    "User {} bought a case token (balance {}, tokens {})",
                    user_id, balance, tokens
                );
            }
            PurchaseOutcome::InsufficientFunds { balance, price } => {
                debug!("User {} cannot afford a case: {} < {}", user_id, balance, price);
            }
        }

        Ok(outcome)
    }

    /// Sells the car at a catalog index.
    pub async fn sell_item(&self, user_id: u64, index: usize) -> Result<SaleOutcome, GameError> {
        let mut inner = self.inner.lock().await;

        let mut record = inner.load(user_id)?;
        let outcome = economy::sell_item(&mut record, &self.config, index);

        if let SaleOutcome::Sold {
            item,
            price,
            removed,
            ..
        } = &outcome
        {
            inner.store.put(user_id, &record)?;
            info!(
                "User {} sold {} for {} coins (removed: {})",
                user_id, item, price, removed
            );
        }

        Ok(outcome)
    }
}

impl std::fmt::Debug for GameService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameService")
            .field("tiers", &self.config.tiers.len())
            .field("items", &self.config.items.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::store::MemoryStore;

    /// Store whose writes always fail.
    struct BrokenStore;

    impl UserStore for BrokenStore {
        fn get(&self, _user_id: u64) -> Result<Option<UserRecord>, StoreError> {
            Ok(None)
        }

        fn put(&mut self, _user_id: u64, _record: &UserRecord) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }

        fn len(&self) -> Result<usize, StoreError> {
            Ok(0)
        }
    }

    fn service() -> GameService {
        GameService::with_rng(
            Arc::new(GameConfig::example()),
            Box::new(MemoryStore::new()),
            StdRng::seed_from_u64(5),
        )
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 18, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_claim_persists_record() {
        let service = service();

        let outcome = service.try_claim(10, start()).await.unwrap();
        let ClaimOutcome::Granted(reward) = outcome else {
            panic!("expected a granted claim");
        };

        let record = service.record(10).await.unwrap();
        assert_eq!(record.score, reward.reward);
        assert_eq!(record.last_claim, Some(start()));
        assert!(record.owns(&reward.item));
    }

    #[tokio::test]
    async fn test_second_claim_denied_until_cooldown() {
        let service = service();
        service.try_claim(10, start()).await.unwrap();

        let early = service
            .try_claim(10, start() + TimeDelta::hours(1))
            .await
            .unwrap();
        assert!(matches!(early, ClaimOutcome::Denied { .. }));

        let on_time = service
            .try_claim(10, start() + TimeDelta::hours(5))
            .await
            .unwrap();
        assert!(matches!(on_time, ClaimOutcome::Granted(_)));
    }

    #[tokio::test]
    async fn test_failed_put_applies_nothing() {
        let service = GameService::with_rng(
            Arc::new(GameConfig::example()),
            Box::new(BrokenStore),
            StdRng::seed_from_u64(5),
        );

        assert!(matches!(
            service.try_claim(1, start()).await,
            Err(GameError::Store(_))
        ));
        let record = service.record(1).await.unwrap();
        assert_eq!(record, UserRecord::new(1));
    }

    #[tokio::test]
    async fn test_record_does_not_store_unknown_players() {
        let service = service();
        let record = service.record(77).await.unwrap();
        assert_eq!(record, UserRecord::new(77));
        assert!(service.inner.lock().await.store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_register_creates_and_renames() {
        let service = service();

        let record = service.register(3, Some("Alex")).await.unwrap();
        assert_eq!(record.name.as_deref(), Some("Alex"));

        let record = service.register(3, Some("Sasha")).await.unwrap();
        assert_eq!(record.name.as_deref(), Some("Sasha"));
        assert_eq!(service.inner.lock().await.store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_buy_then_open_token() {
        let service = service();
        {
            let mut inner = service.inner.lock().await;
            let mut record = UserRecord::new(4);
            record.balance = 1500;
            inner.store.put(4, &record).unwrap();
        }

        let bought = service.buy_case(4).await.unwrap();
        assert_eq!(
            bought,
            PurchaseOutcome::Purchased {
                price: 1000,
                balance: 500,
                tokens: 1
            }
        );

        let again = service.buy_case(4).await.unwrap();
        assert!(matches!(again, PurchaseOutcome::InsufficientFunds { balance: 500, .. }));

        let opened = service.open_token(4).await.unwrap();
        assert!(matches!(opened, TokenOutcome::Granted(_)));

        let record = service.record(4).await.unwrap();
        assert_eq!(record.case_tokens, 0);
        assert_eq!(record.balance, 500);
        assert_eq!(record.garage.len(), 1);
        assert!(record.last_claim.is_none());
    }

    #[tokio::test]
    async fn test_sell_credits_balance() {
        let service = service();
        let ClaimOutcome::Granted(reward) = service.try_claim(6, start()).await.unwrap() else {
            panic!("expected a granted claim");
        };

        let sold = service.sell_item(6, reward.item_index).await.unwrap();
        assert!(matches!(sold, SaleOutcome::Sold { .. }));

        let record = service.record(6).await.unwrap();
        assert_eq!(record.balance, reward.tier.sell_price);
    }
}
