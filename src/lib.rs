//! CarCase Bot Library
//!
//! A Telegram bot where players open timed loot cases, collect cars and
//! climb a rank ladder.
//!
//! This crate provides the core functionality for:
//! - Loading and validating the car catalog
//! - Rolling rewards behind a per-player cooldown
//! - Persisting players in memory, JSON or `SQLite`
//! - Handling commands and inline menus via the Bot API

pub mod commands;
pub mod config;
pub mod game;
pub mod store;
pub mod telegram;
