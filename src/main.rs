//! CarCase Bot - Main Entry Point
//!
//! A Telegram bot where players open a free car case every few hours,
//! build a garage and trade cars for bought cases.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use teloxide::Bot;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use carcase_bot::commands::CommandHandler;
use carcase_bot::config::{BotSettings, GameConfig, SalePolicy, StoreBackend, TelegramConfig};
use carcase_bot::game::GameService;
use carcase_bot::store::open_store;
use carcase_bot::telegram;

/// Telegram bot for collecting cars from timed loot cases.
#[derive(Parser, Debug)]
#[command(name = "carcase_bot")]
#[command(about = "Open car cases, collect cars and climb the ranks on Telegram")]
#[command(version)]
struct Args {
    /// Path to the catalog JSON file (overrides `CATALOG_PATH`).
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Player store backend: memory, json or sqlite (overrides `STORE_BACKEND`).
    #[arg(long)]
    store: Option<StoreBackend>,

    /// Player store file (overrides `STORE_PATH`).
    #[arg(long)]
    store_path: Option<PathBuf>,

    /// Write an example catalog to catalog.example.json and exit.
    #[arg(long)]
    generate_catalog: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // .env may carry RUST_LOG, so it is read before logging starts
    let env_loaded = dotenvy::from_path(&args.env_file);

    init_logging(&args.log_level);

    if let Err(e) = env_loaded {
        debug!("Could not load .env file ({}): {}", args.env_file.display(), e);
    }

    if args.generate_catalog {
        return generate_example_catalog();
    }

    let tg_config = TelegramConfig::from_env()
        .context("Failed to load Telegram configuration from environment")?;

    let mut settings = BotSettings::from_env_with_defaults()
        .context("Failed to load bot settings from environment")?;
    if let Some(catalog) = args.catalog {
        settings.catalog_path = catalog;
    }
    if let Some(store) = args.store {
        settings.store_backend = store;
    }
    if let Some(store_path) = args.store_path {
        settings.store_path = Some(store_path);
    }

    let catalog = load_catalog(&settings.catalog_path)?;

    info!(
        "Loaded catalog: {} tiers, {} cars, {} ranks, cooldown {}s",
        catalog.tiers.len(),
        catalog.items.len(),
        catalog.ranks.len(),
        catalog.cooldown_secs
    );

    if catalog.sale_policy == SalePolicy::KeepItem {
        warn!(
            "Sale policy is keep_item: sold cars stay in the garage and can be sold again. \
             Set \"sale_policy\": \"remove_item\" in the catalog to change this."
        );
    }

    let store_path = settings.resolved_store_path();
    let store = open_store(settings.store_backend, store_path.as_deref())
        .with_context(|| format!("Failed to open {} player store", settings.store_backend))?;

    info!(
        "Player store: {} ({}), {} players",
        settings.store_backend,
        store_path
            .as_deref()
            .map_or_else(|| "in memory".to_owned(), |p| p.display().to_string()),
        store.len().context("Failed to count stored players")?
    );

    let service = Arc::new(GameService::new(Arc::new(catalog), store));
    let handler = Arc::new(CommandHandler::new(service, settings.garage_page_size));

    debug!("Telegram config: {:?}", tg_config);
    let bot = Bot::new(tg_config.bot_token);

    if let Err(e) = telegram::register_commands(&bot).await {
        warn!("Failed to register bot commands: {}", e);
    }

    info!("Starting CarCase bot...");
    telegram::run(bot, handler).await;

    info!("Shutting down...");
    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Loads and validates the catalog.
fn load_catalog(path: &Path) -> Result<GameConfig> {
    let catalog = GameConfig::load_from_file(path)
        .with_context(|| format!("Failed to load catalog from {}", path.display()))?;

    catalog
        .validate()
        .context("Catalog validation failed")?;

    Ok(catalog)
}

/// Generates an example catalog file.
fn generate_example_catalog() -> Result<()> {
    let example = GameConfig::example();
    example.save_to_file("catalog.example.json")?;

    println!("✓ Example catalog written to: catalog.example.json");
    println!("\nTo use this bot:");
    println!("1. Copy catalog.example.json to catalog.json");
    println!("2. Adjust tiers, cars and ranks to your liking");
    println!("3. Create a .env file with BOT_TOKEN from @BotFather");
    println!("4. Run: carcase_bot");

    Ok(())
}
