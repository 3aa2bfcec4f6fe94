//! Telegram Bot API front end.
//!
//! Receives updates through teloxide long polling, passes them to the
//! [`CommandHandler`](crate::commands::CommandHandler) and renders replies as
//! messages, in-place edits or callback alerts.

mod dispatch;
pub mod keyboard;

pub use dispatch::{register_commands, run, schema};
