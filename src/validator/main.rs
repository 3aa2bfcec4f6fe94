//! Standalone validator for car catalog files.
//!
//! Checks tiers, cars and ranks for consistency, prints the drop table and
//! can simulate case openings to compare observed and configured odds.

use std::process::ExitCode;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;

use carcase_bot::config::GameConfig;
use carcase_bot::game::roll::roll_tier;

/// Car catalog validator.
#[derive(Parser, Debug)]
#[command(name = "validate_catalog")]
#[command(about = "Validates car catalog files for the CarCase bot")]
#[command(version)]
struct Args {
    /// Path to the JSON catalog to validate.
    #[arg(short, long, default_value = "catalog.json")]
    file: String,

    /// Generate an example catalog at the specified path.
    #[arg(long)]
    generate_example: Option<String>,

    /// Simulate this many case openings and print tier frequencies.
    #[arg(short, long)]
    simulate: Option<u64>,

    /// Seed for the simulation RNG.
    #[arg(long)]
    seed: Option<u64>,

    /// Show every car and rank.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(output_path) = args.generate_example {
        return generate_example(&output_path);
    }

    let Some(config) = validate_catalog(&args.file, args.verbose) else {
        return ExitCode::FAILURE;
    };

    if let Some(rounds) = args.simulate {
        simulate(&config, rounds, args.seed);
    }

    ExitCode::SUCCESS
}

fn generate_example(output_path: &str) -> ExitCode {
    let example = GameConfig::example();

    match example.save_to_file(output_path) {
        Ok(()) => {
            println!("✓ Example catalog written to: {output_path}");
            println!(
                "\nThe file contains {} tiers, {} cars and {} ranks.",
                example.tiers.len(),
                example.items.len(),
                example.ranks.len()
            );
            println!("Set 'sale_policy' to \"remove_item\" if sold cars should leave the garage.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Failed to write example file: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints the catalog report, returning the catalog when it is valid.
fn validate_catalog(path: &str, verbose: bool) -> Option<GameConfig> {
    println!("Validating: {path}\n");

    let config = match GameConfig::load_from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to load catalog: {e}");
            return None;
        }
    };

    let total_weight = config.total_weight();
    println!("Drop table (total weight {total_weight}):");
    for tier in &config.tiers {
        println!(
            "  {} {:<10} weight {:>5} ({:>6.2}%)  {:>2} cars  +{}/+{} REP  sells {}",
            tier.emoji,
            tier.name,
            tier.weight,
            percent(u64::from(tier.weight), total_weight),
            config.pool(&tier.id).len(),
            tier.new_reward,
            tier.duplicate_reward,
            tier.sell_price
        );
    }

    if verbose {
        println!("\nCars:");
        for (i, item) in config.items.iter().enumerate() {
            println!("  [{i}] {} ({})", item.name, item.tier);
        }

        println!("\nRanks:");
        for rank in &config.ranks {
            println!("  {:>7} REP  {}", rank.threshold, rank.title);
        }
    }

    println!(
        "\nCooldown: {}s, case price: {} coins, sale policy: {:?}",
        config.cooldown_secs, config.case_price, config.sale_policy
    );

    let errors = config.validate_all();
    println!();

    if errors.is_empty() {
        println!("✓ Catalog is valid!");
        Some(config)
    } else {
        for e in &errors {
            println!("  ✗ Error: {e}");
        }
        println!("\n✗ Validation failed: {} error(s)", errors.len());
        None
    }
}

/// Rolls `rounds` tiers and compares frequencies with the configured odds.
fn simulate(config: &GameConfig, rounds: u64, seed: Option<u64>) {
    let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let mut counts = vec![0u64; config.tiers.len()];

    for _ in 0..rounds {
        let Ok(tier) = roll_tier(config, &mut rng) else {
            eprintln!("✗ Simulation aborted: catalog has nothing to roll");
            return;
        };
        if let Some(position) = config.tier_position(&tier.id) {
            counts[position] += 1;
        }
    }

    let total_weight = config.total_weight();
    println!("\nSimulated {rounds} openings:");
    for (tier, count) in config.tiers.iter().zip(&counts) {
        println!(
            "  {} {:<10} {:>8}  observed {:>6.2}%  expected {:>6.2}%",
            tier.emoji,
            tier.name,
            count,
            percent(*count, rounds),
            percent(u64::from(tier.weight), total_weight)
        );
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}
