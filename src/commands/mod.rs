//! Command handling module.
//!
//! Turns slash commands, text triggers and inline button presses into
//! [`Intent`]s and dispatches them to the game.

mod handler;
mod types;

pub use handler::CommandHandler;
pub use types::{CarButton, Intent, Menu, Player, Reply, ReplyMode};
