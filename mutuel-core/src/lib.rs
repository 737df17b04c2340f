//! # Mutuel Core
//!
//! Settlement and resolution engine for a parimutuel prediction-market
//! venue.
//!
//! Users stake value on binary (YES/NO) outcomes of questions with a
//! deadline. After the deadline an authorized oracle finalizes the outcome
//! exactly once, and the pooled stakes flow to winners proportionally to
//! their stake, funded by the losing side's pool minus the platform fee.
//!
//! ## Features
//!
//! - **Market Registry**: sequential-id market creation with duration bounds
//! - **Betting Engine**: validated stakes with per-bettor append-only lists
//! - **Payout Calculator**: pure parimutuel math with truncating division
//! - **Oracle Resolver**: threshold-vote state machine with operator override
//! - **Claim Processor**: exactly-once withdrawal of winning entitlements
//!
//! All ledger-mutating operations are globally serialized; read views take a
//! shared lock and see point-in-time consistent snapshots. External value
//! movement goes through the [`ValueTransfer`] seam.
//!
//! ## Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use mutuel_core::{AccountBook, EngineConfig, ManualClock, MarketEngine};
//!
//! let book = Arc::new(AccountBook::new());
//! book.deposit("alice", 200_000_000);
//!
//! let clock = Arc::new(ManualClock::new(1_700_000_000));
//! let engine = MarketEngine::new(
//!     EngineConfig::new("operator", "treasury"),
//!     clock.clone(),
//!     book.clone(),
//! );
//!
//! let id = engine.create_market("operator", "Will it rain tomorrow?", "Weather", "{}", 86_400)?;
//! let bet = engine.place_bet("alice", id, true, 1_000_000)?;
//! assert_eq!(bet, 0);
//! # Ok::<(), mutuel_core::EngineError>(())
//! ```

pub mod balance;
pub mod clock;
pub mod engine;
pub mod error;
pub mod market;
pub mod payout;
pub mod resolver;
pub mod store;
pub mod test_utils;

pub use balance::{AccountBook, ValueTransfer};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{MarketEngine, SharedEngine};
pub use error::{EngineError, Result};
pub use market::{Bet, Market, MarketBet, Resolution};
pub use resolver::VoteRecord;
pub use store::{EngineConfig, LedgerStore};

/// Sequential market identifier
pub type MarketId = u64;

/// Account identity (opaque string, e.g. an address)
pub type AccountId = String;

/// Shortest allowed market duration (1 hour)
pub const MIN_MARKET_DURATION: u64 = 3_600;

/// Longest allowed market duration (30 days)
pub const MAX_MARKET_DURATION: u64 = 30 * 24 * 60 * 60;

/// Default platform fee: 200 basis points (2%), taken from the losing pool
pub const DEFAULT_PLATFORM_FEE_BPS: u64 = 200;

/// Hard cap on the configurable platform fee (5%)
pub const MAX_PLATFORM_FEE_BPS: u64 = 500;

/// Default minimum stake (0.001 coin at 1e8 base units)
pub const DEFAULT_MIN_BET: u64 = 100_000;

/// Default maximum stake (10 coins at 1e8 base units)
pub const DEFAULT_MAX_BET: u64 = 1_000_000_000;

/// Default number of agreeing votes required to resolve a market
pub const DEFAULT_REQUIRED_VOTES: u32 = 1;

/// Basis-point denominator
pub const BPS_DENOMINATOR: u64 = 10_000;
