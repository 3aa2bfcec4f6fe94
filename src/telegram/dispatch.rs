//! Update routing between Telegram and the command handler.

use std::sync::Arc;

use chrono::Utc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, CallbackQuery, Message, User};
use teloxide::RequestError;
use tracing::{debug, info, warn};

use super::keyboard;
use crate::commands::{CommandHandler, Intent, Player, Reply, ReplyMode};

/// Builds the update handler tree: one branch for messages, one for buttons.
#[must_use]
pub fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback))
}

/// Runs long polling until Ctrl+C.
pub async fn run(bot: Bot, handler: Arc<CommandHandler>) {
    info!("Polling for updates. Use Ctrl+C to stop.");

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![handler])
        .default_handler(|update| async move {
            debug!("Unhandled update {:?}", update.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error while handling an update",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Dispatcher stopped");
}

/// Publishes the slash command list shown by Telegram clients.
pub async fn register_commands(bot: &Bot) -> Result<(), RequestError> {
    let commands: Vec<BotCommand> = Intent::all_commands()
        .into_iter()
        .map(|(command, description)| BotCommand::new(command, description))
        .collect();

    bot.set_my_commands(commands).await?;
    debug!("Registered {} bot commands", Intent::all_commands().len());
    Ok(())
}

fn player_from(user: &User) -> Player {
    Player::new(user.id.0, Some(user.full_name()))
}

async fn on_message(bot: Bot, handler: Arc<CommandHandler>, msg: Message) -> anyhow::Result<()> {
    let (Some(text), Some(user)) = (msg.text(), msg.from.as_ref()) else {
        return Ok(());
    };
    if user.is_bot {
        return Ok(());
    }

    let player = player_from(user);
    let Some(reply) = handler.try_handle(&player, text, Utc::now()).await else {
        return Ok(());
    };

    if reply.mode == ReplyMode::Silent {
        return Ok(());
    }

    let mut request = bot.send_message(msg.chat.id, reply.text);
    if let Some(markup) = keyboard::render(&reply.menu, player.id) {
        request = request.reply_markup(markup);
    }
    request.await?;

    Ok(())
}

async fn on_callback(bot: Bot, handler: Arc<CommandHandler>, q: CallbackQuery) -> anyhow::Result<()> {
    let Some(data) = q.data.as_deref() else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    let player = player_from(&q.from);
    let reply = handler.handle_callback(&player, data, Utc::now()).await;

    match reply.mode {
        ReplyMode::Silent => {
            bot.answer_callback_query(q.id.clone()).await?;
        }
        ReplyMode::Alert => {
            bot.answer_callback_query(q.id.clone())
                .text(reply.text)
                .show_alert(true)
                .await?;
        }
        ReplyMode::Send | ReplyMode::Edit => {
            bot.answer_callback_query(q.id.clone()).await?;
            replace_menu(&bot, &q, &player, reply).await?;
        }
    }

    Ok(())
}

/// Edits the message the button belonged to, or sends a new one if that
/// message is no longer reachable.
async fn replace_menu(
    bot: &Bot,
    q: &CallbackQuery,
    player: &Player,
    reply: Reply,
) -> Result<(), RequestError> {
    let markup = keyboard::render(&reply.menu, player.id);

    if let Some(message) = &q.message {
        let mut request = bot.edit_message_text(message.chat().id, message.id(), reply.text.clone());
        if let Some(markup) = markup.clone() {
            request = request.reply_markup(markup);
        }
        match request.await {
            Ok(_) => return Ok(()),
            Err(RequestError::Api(e)) => {
                warn!("Could not edit menu for user {}: {}", player.id, e);
                return Ok(());
            }
            Err(e) => return Err(e),
        }
    }

    let mut request = bot.send_message(ChatId::from(q.from.id), reply.text);
    if let Some(markup) = markup {
        request = request.reply_markup(markup);
    }
    request.await?;
    Ok(())
}
