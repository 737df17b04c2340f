//! # Mutuel CLI
//!
//! Command-line interface for the parimutuel settlement engine: payout math
//! previews, timestamp helpers, and a scripted end-to-end market lifecycle.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use mutuel_core::{payout, AccountBook, Clock, EngineConfig, ManualClock, MarketEngine};
use std::sync::Arc;

/// One display coin in base value units (1e8 precision).
const COIN: u64 = 100_000_000;

#[derive(Parser)]
#[command(name = "mutuel")]
#[command(about = "Parimutuel prediction-market settlement engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted market lifecycle end to end
    Demo {
        /// Print the final ledger snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute a winning bet's entitlement from pool sizes
    Payout {
        /// Stake of the bet (base units)
        #[arg(short, long)]
        stake: u64,
        /// Total pool on the winning side, including the stake (base units)
        #[arg(short, long)]
        winning_pool: u64,
        /// Total pool on the losing side (base units)
        #[arg(short, long)]
        losing_pool: u64,
        /// Platform fee in basis points
        #[arg(short, long, default_value = "200")]
        fee_bps: u64,
    },
    /// Show live odds for a side given current pool sizes
    Odds {
        /// Pool on the queried side (base units)
        #[arg(short, long)]
        side_pool: u64,
        /// Pool on the other side (base units)
        #[arg(short, long)]
        other_pool: u64,
        /// Platform fee in basis points
        #[arg(short, long, default_value = "200")]
        fee_bps: u64,
    },
    /// Format a unix timestamp as human-readable UTC
    FormatTime {
        /// Unix timestamp in seconds
        timestamp: u64,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { json } => run_demo(json),
        Commands::Payout {
            stake,
            winning_pool,
            losing_pool,
            fee_bps,
        } => {
            let entitlement =
                payout::winning_entitlement(stake, winning_pool, losing_pool, fee_bps);
            let fee = payout::platform_fee(losing_pool, fee_bps);
            println!("{}: {}", "Entitlement".yellow().bold(), entitlement);
            println!("{}: {}", "Platform fee".yellow().bold(), fee);
            Ok(())
        }
        Commands::Odds {
            side_pool,
            other_pool,
            fee_bps,
        } => {
            let odds = payout::odds(side_pool, other_pool, fee_bps);
            println!("{}: {:.4}x", "Odds".yellow().bold(), odds);
            Ok(())
        }
        Commands::FormatTime { timestamp } => {
            println!("{}", format_timestamp(timestamp));
            Ok(())
        }
    }
}

fn format_timestamp(timestamp: u64) -> String {
    chrono::DateTime::from_timestamp(timestamp as i64, 0)
        .unwrap_or_default()
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string()
}

fn coins(amount: u64) -> String {
    format!("{:.8}", amount as f64 / COIN as f64)
}

/// Walk a market from creation through betting, resolution, and claims,
/// narrating each step.
fn run_demo(json: bool) -> Result<()> {
    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let book = Arc::new(AccountBook::new());
    book.deposit("alice", 10 * COIN);
    book.deposit("bob", 10 * COIN);

    let engine = MarketEngine::new(
        EngineConfig::new("operator", "treasury"),
        clock.clone(),
        book.clone(),
    );

    println!("{}", "Creating market...".green().bold());
    let id = engine.create_market(
        "operator",
        "Will BNB hit $700 this week?",
        "Price",
        r#"{"currentPrice":"$650"}"#,
        7 * 24 * 60 * 60,
    )?;
    let market = engine.get_market(id)?;
    println!("{}: {}", "Market ID".yellow().bold(), id);
    println!("{}: {}", "Question".yellow().bold(), market.question);
    println!(
        "{}: {}",
        "Ends".yellow().bold(),
        format_timestamp(market.end_time)
    );
    println!();

    println!("{}", "Placing bets...".green().bold());
    engine.place_bet("alice", id, true, COIN)?;
    println!("  alice stakes {} on YES", coins(COIN).as_str().cyan());
    engine.place_bet("bob", id, false, COIN / 2)?;
    println!("  bob   stakes {} on NO", coins(COIN / 2).as_str().cyan());
    println!(
        "{}: {:.2}x YES / {:.2}x NO",
        "Live odds".yellow().bold(),
        engine.odds(id, true)?,
        engine.odds(id, false)?
    );
    println!();

    println!("{}", "Advancing past the deadline...".green().bold());
    clock.advance(8 * 24 * 60 * 60);
    println!(
        "{}: {}",
        "Status".yellow().bold(),
        engine.get_market(id)?.status(clock.now())
    );

    println!("{}", "Submitting resolution (YES)...".green().bold());
    engine.submit_resolution("operator", id, true, "https://example.com/proof")?;
    println!(
        "{}: {}",
        "Status".yellow().bold(),
        engine.get_market(id)?.status(clock.now())
    );
    println!();

    println!("{}", "Claiming winnings...".green().bold());
    let paid = engine.claim_winnings("alice", id, 0)?;
    println!("  alice receives {}", coins(paid).as_str().cyan());
    match engine.claim_winnings("bob", id, 0) {
        Err(err) => println!("  bob's claim fails: {}", err.to_string().as_str().red()),
        Ok(_) => unreachable!("losing bet must not pay"),
    }
    println!();

    println!("{}", "Final balances".green().bold());
    println!("{}", "═".repeat(40).bright_black());
    for account in ["alice", "bob", "treasury"] {
        println!("  {:<10} {}", account, coins(book.balance(account)));
    }

    if json {
        println!();
        println!("{}", engine.snapshot()?);
    }
    Ok(())
}
