//! Common test utilities for mutuel-core tests.
//!
//! Provides a deterministic venue setup shared across module tests: a
//! manually advanced clock, an in-memory account book with funded test
//! accounts, and an engine wired to both.

use crate::balance::AccountBook;
use crate::clock::ManualClock;
use crate::engine::MarketEngine;
use crate::store::EngineConfig;
use crate::MarketId;
use std::sync::Arc;

/// Standard test constants
pub mod constants {
    /// One display coin in base value units (sat-style 1e8 precision)
    pub const COIN: u64 = 100_000_000;

    /// Fixed start-of-test timestamp (Nov 14, 2023)
    pub const START_TIME: u64 = 1_700_000_000;

    /// Default market duration used by test markets (7 days)
    pub const WEEK: u64 = 7 * 24 * 60 * 60;

    /// Venue owner identity
    pub const OWNER: &str = "operator";

    /// Treasury account credited with platform fees
    pub const TREASURY: &str = "treasury";
}

/// A fully wired engine with deterministic time and funded accounts.
pub struct TestVenue {
    pub engine: MarketEngine,
    pub clock: Arc<ManualClock>,
    pub book: Arc<AccountBook>,
}

impl TestVenue {
    /// Venue with default config and 100 coins each for alice, bob, carol.
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(constants::START_TIME));
        let book = Arc::new(AccountBook::new());
        for account in ["alice", "bob", "carol"] {
            book.deposit(account, 100 * constants::COIN);
        }
        let engine = MarketEngine::new(
            EngineConfig::new(constants::OWNER, constants::TREASURY),
            clock.clone(),
            book.clone(),
        );
        Self {
            engine,
            clock,
            book,
        }
    }

    /// Create a one-week market owned by the operator.
    pub fn create_market(&self) -> MarketId {
        self.engine
            .create_market(
                constants::OWNER,
                "Will BNB hit $700?",
                "Price",
                "{}",
                constants::WEEK,
            )
            .expect("test market creation failed")
    }

    /// Advance the clock past a market's betting deadline.
    pub fn end_market(&self, id: MarketId) {
        let market = self.engine.get_market(id).expect("market must exist");
        self.clock.set(market.end_time);
    }
}

impl Default for TestVenue {
    fn default() -> Self {
        Self::new()
    }
}
