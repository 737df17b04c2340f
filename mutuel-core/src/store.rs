//! # Ledger Store
//!
//! Durable keyed storage for markets, bets, resolutions, and global
//! configuration. Markets live in an append-only arena indexed by their
//! sequential id; all other indices (active markets, per-creator markets)
//! hold ids into that arena. No ambient globals: the engine owns exactly one
//! store and passes it by reference into every operation.

use crate::error::{EngineError, Result};
use crate::market::Market;
use crate::{
    AccountId, MarketId, DEFAULT_MAX_BET, DEFAULT_MIN_BET, DEFAULT_PLATFORM_FEE_BPS,
    DEFAULT_REQUIRED_VOTES,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Global venue configuration, persisted alongside the market arena.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EngineConfig {
    /// Privileged identity: admin setters and emergency resolution
    pub owner: AccountId,

    /// Account credited with the platform fee at resolution time
    pub treasury: AccountId,

    /// Platform fee in basis points, applied to the losing pool only
    pub platform_fee_bps: u64,

    /// Minimum accepted stake
    pub min_bet: u64,

    /// Maximum accepted stake
    pub max_bet: u64,

    /// Votes one side must reach for a market to resolve
    pub required_votes: u32,

    /// Identities allowed to submit resolutions
    pub resolvers: BTreeSet<AccountId>,
}

impl EngineConfig {
    /// Default configuration. The owner starts authorized as a resolver.
    pub fn new(owner: impl Into<String>, treasury: impl Into<String>) -> Self {
        let owner = owner.into();
        let mut resolvers = BTreeSet::new();
        resolvers.insert(owner.clone());
        Self {
            owner,
            treasury: treasury.into(),
            platform_fee_bps: DEFAULT_PLATFORM_FEE_BPS,
            min_bet: DEFAULT_MIN_BET,
            max_bet: DEFAULT_MAX_BET,
            required_votes: DEFAULT_REQUIRED_VOTES,
            resolvers,
        }
    }
}

/// The engine's single source of truth.
#[derive(Serialize, Deserialize, Debug)]
pub struct LedgerStore {
    pub config: EngineConfig,

    /// Market arena; a market's id is its index here
    markets: Vec<Market>,

    /// Ids of markets not yet resolved. Pruned at resolution time so reads
    /// are O(active count)
    active: Vec<MarketId>,

    /// Markets created by each account
    creator_markets: BTreeMap<AccountId, Vec<MarketId>>,
}

impl LedgerStore {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            markets: Vec::new(),
            active: Vec::new(),
            creator_markets: BTreeMap::new(),
        }
    }

    /// Number of markets ever created (also the next market id).
    pub fn market_count(&self) -> u64 {
        self.markets.len() as u64
    }

    /// Insert a freshly built market, assigning it the next sequential id.
    ///
    /// The caller constructs the market with the id returned by
    /// `market_count`; this is asserted here.
    pub fn insert_market(&mut self, market: Market) -> MarketId {
        let id = self.market_count();
        debug_assert_eq!(market.id, id, "market id must be the next sequential id");
        self.creator_markets
            .entry(market.creator.clone())
            .or_default()
            .push(id);
        self.active.push(id);
        self.markets.push(market);
        id
    }

    pub fn market(&self, id: MarketId) -> Result<&Market> {
        self.markets
            .get(id as usize)
            .ok_or(EngineError::MarketNotFound(id))
    }

    pub fn market_mut(&mut self, id: MarketId) -> Result<&mut Market> {
        self.markets
            .get_mut(id as usize)
            .ok_or(EngineError::MarketNotFound(id))
    }

    /// Ids of all unresolved markets, in creation order.
    pub fn active_ids(&self) -> &[MarketId] {
        &self.active
    }

    /// Drop a market from the active index. Called exactly once, at
    /// resolution time.
    pub fn prune_active(&mut self, id: MarketId) {
        self.active.retain(|&m| m != id);
    }

    /// Ids of markets created by `creator`.
    pub fn markets_of(&self, creator: &str) -> &[MarketId] {
        self.creator_markets
            .get(creator)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Serialize the full ledger state to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a ledger from a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::Market;
    use crate::MIN_MARKET_DURATION;

    fn store() -> LedgerStore {
        LedgerStore::new(EngineConfig::new("owner", "treasury"))
    }

    fn market(id: MarketId, creator: &str) -> Market {
        Market::new(
            id,
            format!("Question {id}?"),
            "Test".to_string(),
            "{}".to_string(),
            creator.to_string(),
            1_000,
            MIN_MARKET_DURATION,
        )
    }

    #[test]
    fn test_config_defaults() {
        let config = EngineConfig::new("owner", "treasury");
        assert_eq!(config.platform_fee_bps, DEFAULT_PLATFORM_FEE_BPS);
        assert_eq!(config.required_votes, DEFAULT_REQUIRED_VOTES);
        // Owner starts authorized as a resolver
        assert!(config.resolvers.contains("owner"));
    }

    #[test]
    fn test_sequential_ids() {
        let mut store = store();
        assert_eq!(store.market_count(), 0);
        assert_eq!(store.insert_market(market(0, "alice")), 0);
        assert_eq!(store.insert_market(market(1, "bob")), 1);
        assert_eq!(store.market_count(), 2);
        assert_eq!(store.market(1).unwrap().creator, "bob");
    }

    #[test]
    fn test_unknown_market() {
        let store = store();
        assert!(matches!(
            store.market(7),
            Err(EngineError::MarketNotFound(7))
        ));
    }

    #[test]
    fn test_active_index_pruning() {
        let mut store = store();
        store.insert_market(market(0, "alice"));
        store.insert_market(market(1, "alice"));
        store.insert_market(market(2, "bob"));
        assert_eq!(store.active_ids(), &[0, 1, 2]);

        store.prune_active(1);
        assert_eq!(store.active_ids(), &[0, 2]);
    }

    #[test]
    fn test_creator_index() {
        let mut store = store();
        store.insert_market(market(0, "alice"));
        store.insert_market(market(1, "bob"));
        store.insert_market(market(2, "alice"));

        assert_eq!(store.markets_of("alice"), &[0, 2]);
        assert_eq!(store.markets_of("bob"), &[1]);
        assert!(store.markets_of("carol").is_empty());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut store = store();
        store.insert_market(market(0, "alice"));
        store.prune_active(0);
        store.insert_market(market(1, "bob"));

        let json = store.to_json().unwrap();
        let restored = LedgerStore::from_json(&json).unwrap();
        assert_eq!(restored.market_count(), 2);
        assert_eq!(restored.active_ids(), &[1]);
        assert_eq!(restored.markets_of("alice"), &[0]);
        assert_eq!(restored.config.owner, "owner");
    }
}
