//! Command handler implementation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use super::types::{CarButton, Intent, Menu, Player, Reply, ReplyMode};
use crate::game::rank::{next_rank, progress_bar, progress_percent, rank_title};
use crate::game::{
    ClaimOutcome, GameError, GameService, PurchaseOutcome, Reward, SaleOutcome, TokenOutcome,
    cooldown_remaining, format_remaining, garage,
};

/// Turns player input into game operations and replies.
pub struct CommandHandler {
    /// Game rules and storage.
    service: Arc<GameService>,

    /// Cars per garage page.
    page_size: usize,
}

impl CommandHandler {
    /// Creates a new command handler.
    #[must_use]
    pub fn new(service: Arc<GameService>, page_size: usize) -> Self {
        Self {
            service,
            page_size: page_size.max(1),
        }
    }

    /// Tries to parse and execute a message.
    ///
    /// Returns `None` if the message is not a command or trigger.
    pub async fn try_handle(&self, player: &Player, text: &str, now: DateTime<Utc>) -> Option<Reply> {
        let intent = Intent::parse(text)?;

        debug!("User {} sent {}", player.id, intent);
        Some(self.execute(player, intent, now).await)
    }

    /// Executes a button press.
    ///
    /// Presses on menus rendered for somebody else are refused.
    pub async fn handle_callback(&self, player: &Player, data: &str, now: DateTime<Utc>) -> Reply {
        let Some((owner, intent)) = Intent::parse_callback(data) else {
            debug!("Ignoring malformed callback data '{}'", data);
            return Reply::silent();
        };

        if owner != player.id {
            info!(
                "User {} pressed a {} button owned by {}",
                player.id, intent, owner
            );
            return Reply::alert("❌ Not your menu");
        }

        debug!("User {} pressed {}", player.id, intent);
        let mut reply = self.execute(player, intent, now).await;
        if reply.mode == ReplyMode::Send {
            reply.mode = ReplyMode::Edit;
        }
        reply
    }

    /// Executes a parsed intent.
    pub async fn execute(&self, player: &Player, intent: Intent, now: DateTime<Utc>) -> Reply {
        let result = match intent {
            Intent::Start => self.handle_start(player).await,
            Intent::Help => Ok(Self::handle_help()),
            Intent::OpenCase => self.handle_open(player, now).await,
            Intent::OpenToken => self.handle_token(player).await,
            Intent::Profile => self.handle_profile(player, now).await,
            Intent::Garage { page } => self.handle_garage(player, page).await,
            Intent::ViewItem(index) => self.handle_view(player, index).await,
            Intent::SellItem(index) => self.handle_sell(player, index).await,
            Intent::Collection => self.handle_collection(player).await,
            Intent::Shop => self.handle_shop(player).await,
            Intent::BuyCase => self.handle_buy(player).await,
            Intent::Menu => Ok(Self::handle_menu(player)),
            Intent::Noop => Ok(Reply::silent()),
        };

        result.unwrap_or_else(|e| {
            error!("{} failed for user {}: {}", intent.name(), player.id, e);
            Reply::alert("⚠️ Something went wrong, please try again later.")
        })
    }

    async fn handle_start(&self, player: &Player) -> Result<Reply, GameError> {
        let record = self
            .service
            .register(player.id, player.name.as_deref())
            .await?;

        let text = format!(
            "🏁 Welcome to CarCase, {}!\n\n\
             Open a free case every {}, collect cars, earn REP and climb the ranks.\n\
             Your garage holds {} cars.",
            player.display_name(),
            format_remaining(self.service.config().cooldown()),
            record.garage.len()
        );
        Ok(Reply::send(text, Menu::Main))
    }

    fn handle_help() -> Reply {
        let mut lines = vec!["🚗 CarCase commands".to_owned(), String::new()];

        for (cmd, desc) in Intent::all_commands() {
            lines.push(format!("/{cmd} - {desc}"));
        }

        lines.push(String::new());
        lines.push("Plain text works too: \"open case\", \"garage\", \"profile\", \"shop\".".to_owned());

        Reply::send(lines.join("\n"), Menu::BackToMain)
    }

    async fn handle_open(&self, player: &Player, now: DateTime<Utc>) -> Result<Reply, GameError> {
        match self.service.try_claim(player.id, now).await? {
            ClaimOutcome::Denied { remaining } => Ok(Reply::alert(format!(
                "⏳ Next free case in {}",
                format_remaining(remaining)
            ))),
            ClaimOutcome::Granted(reward) => Ok(Reply::send(
                self.reward_text("📦 You opened a case!", &reward),
                Menu::Main,
            )),
        }
    }

    async fn handle_token(&self, player: &Player) -> Result<Reply, GameError> {
        match self.service.open_token(player.id).await? {
            TokenOutcome::NoTokens => Ok(Reply::alert(
                "🎟 You have no case tokens. Buy one in the shop.",
            )),
            TokenOutcome::Granted(reward) => Ok(Reply::send(
                self.reward_text("🎟 You opened a bought case!", &reward),
                Menu::Main,
            )),
        }
    }

    fn reward_text(&self, title: &str, reward: &Reward) -> String {
        let ranks = &self.service.config().ranks;
        let status = if reward.is_new {
            "🆕 New car!"
        } else {
            "♻️ Duplicate"
        };

        format!(
            "{title}\n\n\
             {} {} ({})\n\
             {status} +{} REP\n\n\
             REP: {} · Rank: {}",
            reward.tier.emoji,
            reward.item,
            reward.tier.name,
            reward.reward,
            reward.score,
            rank_title(ranks, reward.score)
        )
    }

    async fn handle_profile(&self, player: &Player, now: DateTime<Utc>) -> Result<Reply, GameError> {
        let config = self.service.config();
        let record = self.service.record(player.id).await?;

        let percent = progress_percent(&config.ranks, record.score);
        let next = next_rank(&config.ranks, record.score).map_or_else(
            || "Top rank reached".to_owned(),
            |rank| format!("Next: {} at {} REP", rank.title, rank.threshold),
        );
        let case = cooldown_remaining(record.last_claim, config.cooldown(), now).map_or_else(
            || "ready".to_owned(),
            |remaining| format!("in {}", format_remaining(remaining)),
        );

        let text = format!(
            "👤 {}\n\n\
             🏆 Rank: {}\n\
             ⭐ REP: {}\n\
             {} {percent}%\n\
             {next}\n\n\
             💰 Coins: {}\n\
             🎟 Case tokens: {}\n\
             🚗 Cars: {}/{}\n\
             📦 Free case: {case}",
            player.display_name(),
            rank_title(&config.ranks, record.score),
            record.score,
            progress_bar(percent),
            record.balance,
            record.case_tokens,
            garage::garage_entries(&record, config).len(),
            config.items.len(),
        );
        Ok(Reply::send(text, Menu::BackToMain))
    }

    async fn handle_garage(&self, player: &Player, page: usize) -> Result<Reply, GameError> {
        let config = self.service.config();
        let record = self.service.record(player.id).await?;
        let view = garage::garage_page(&record, config, page, self.page_size);

        if view.total == 0 {
            return Ok(Reply::send(
                "🏚 Your garage is empty. Open a case to get your first car!",
                Menu::BackToMain,
            ));
        }

        let text = format!(
            "🏎 Garage of {} ({} cars)\nPage {}/{}",
            player.display_name(),
            view.total,
            view.page + 1,
            view.total_pages
        );
        let cars = view
            .entries
            .into_iter()
            .map(|entry| CarButton {
                index: entry.index,
                label: format!("{} {}", entry.tier.emoji, entry.name),
            })
            .collect();

        Ok(Reply::send(
            text,
            Menu::Garage {
                cars,
                page: view.page,
                total_pages: view.total_pages,
            },
        ))
    }

    async fn handle_view(&self, player: &Player, index: usize) -> Result<Reply, GameError> {
        let config = self.service.config();
        let Some((item, tier)) = config
            .item(index)
            .and_then(|item| Some((item, config.tier(&item.tier)?)))
        else {
            return Ok(Reply::alert("❓ Unknown car"));
        };

        let record = self.service.record(player.id).await?;
        if !record.owns(&item.name) {
            return Ok(Reply::alert("🚫 This car is not in your garage"));
        }

        let text = format!(
            "{} {}\n\n\
             Rarity: {}\n\
             Sell price: {} coins",
            tier.emoji, item.name, tier.name, tier.sell_price
        );
        Ok(Reply::send(text, Menu::Car { index }))
    }

    async fn handle_sell(&self, player: &Player, index: usize) -> Result<Reply, GameError> {
        match self.service.sell_item(player.id, index).await? {
            SaleOutcome::NotOwned => Ok(Reply::alert("🚫 This car is not in your garage")),
            SaleOutcome::Sold {
                item,
                price,
                balance,
                ..
            } => Ok(Reply::send(
                format!("💸 Sold {item} for {price} coins.\nBalance: {balance} coins"),
                Menu::BackToGarage,
            )),
        }
    }

    async fn handle_collection(&self, player: &Player) -> Result<Reply, GameError> {
        let config = self.service.config();
        let record = self.service.record(player.id).await?;

        let mut lines = vec!["📚 Collection".to_owned(), String::new()];
        for summary in garage::collection_summary(&record, config) {
            lines.push(format!(
                "{} {}: {}/{}",
                summary.tier.emoji, summary.tier.name, summary.owned, summary.total
            ));
        }

        Ok(Reply::send(lines.join("\n"), Menu::BackToMain))
    }

    async fn handle_shop(&self, player: &Player) -> Result<Reply, GameError> {
        let config = self.service.config();
        let record = self.service.record(player.id).await?;

        let text = format!(
            "🛒 Shop\n\n\
             Case token: {} coins\n\
             💰 Your coins: {}\n\
             🎟 Your tokens: {}\n\n\
             Earn coins by selling cars from your garage.",
            config.case_price, record.balance, record.case_tokens
        );
        Ok(Reply::send(
            text,
            Menu::Shop {
                has_tokens: record.case_tokens > 0,
            },
        ))
    }

    async fn handle_buy(&self, player: &Player) -> Result<Reply, GameError> {
        match self.service.buy_case(player.id).await? {
            PurchaseOutcome::InsufficientFunds { balance, price } => Ok(Reply::alert(format!(
                "💰 Not enough coins: {balance}/{price}"
            ))),
            PurchaseOutcome::Purchased {
                price,
                balance,
                tokens,
            } => Ok(Reply::send(
                format!(
                    "✅ Bought a case token for {price} coins.\n\
                     💰 Coins left: {balance}\n\
                     🎟 Tokens: {tokens}"
                ),
                Menu::Shop { has_tokens: true },
            )),
        }
    }

    fn handle_menu(player: &Player) -> Reply {
        Reply::send(
            format!("🏁 Main menu, {}", player.display_name()),
            Menu::Main,
        )
    }
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("service", &self.service)
            .field("page_size", &self.page_size)
            .finish()
    }
}
