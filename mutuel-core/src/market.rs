//! # Market Records
//!
//! The `Market` aggregate owns everything the settlement engine needs to
//! reason about one question: the YES/NO pools, every bet keyed by bettor,
//! the oracle vote record, and the final resolution. One market is one lock
//! scope; the engine serializes all mutations of it.

use crate::resolver::VoteRecord;
use crate::{AccountId, MarketId, MAX_MARKET_DURATION, MIN_MARKET_DURATION};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A binary (YES/NO) prediction market with parimutuel pools.
///
/// Participants stake value on one side before `end_time`. After the
/// deadline an authorized oracle finalizes the outcome exactly once, and
/// winners withdraw their entitlement through the claim path.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Market {
    /// Sequential identifier, assigned at creation, immutable
    pub id: MarketId,

    /// Market question (opaque descriptive string)
    pub question: String,

    /// Category label (opaque descriptive string)
    pub category: String,

    /// Opaque display payload, stored verbatim and never parsed
    pub metadata: String,

    /// Account that created the market
    pub creator: AccountId,

    /// Creation timestamp (unix seconds)
    pub created_at: u64,

    /// Betting deadline: `created_at + duration`
    pub end_time: u64,

    /// Accumulated YES stakes (monotonically non-decreasing)
    pub total_yes: u64,

    /// Accumulated NO stakes (monotonically non-decreasing)
    pub total_no: u64,

    /// Whether the outcome is final. Flips false -> true exactly once
    pub resolved: bool,

    /// Winning side, meaningful only once `resolved`
    pub outcome: Option<bool>,

    /// Bets per bettor, append-only; a bet's index in its bettor's list is
    /// its permanent identifier for claiming
    pub(crate) bets: BTreeMap<AccountId, Vec<Bet>>,

    /// Oracle votes collected while unresolved
    pub(crate) votes: VoteRecord,

    /// Resolution record, set when the market is finalized
    pub resolution: Option<Resolution>,
}

/// A single stake on one side of a market.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Bet {
    /// Staked amount in the venue's base value unit
    pub amount: u64,

    /// Which side the stake is on
    pub is_yes: bool,

    /// When the bet was accepted (unix seconds, before `end_time`)
    pub placed_at: u64,

    /// Whether the entitlement has been withdrawn. Flips once
    pub claimed: bool,
}

/// A bet paired with its owner, for whole-market views.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MarketBet {
    pub bettor: AccountId,
    /// Index within the bettor's per-market list
    pub index: usize,
    pub bet: Bet,
}

/// Permanent record of how a market was finalized.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Resolution {
    pub market_id: MarketId,
    pub outcome: bool,
    pub resolved_at: u64,
    /// Identity whose vote (or override) finalized the market
    pub resolver: AccountId,
    /// Opaque proof reference supplied by the resolver
    pub proof: String,
}

/// Check a requested market duration against the venue bounds.
pub fn validate_duration(duration_secs: u64) -> bool {
    (MIN_MARKET_DURATION..=MAX_MARKET_DURATION).contains(&duration_secs)
}

impl Market {
    pub(crate) fn new(
        id: MarketId,
        question: String,
        category: String,
        metadata: String,
        creator: AccountId,
        created_at: u64,
        duration_secs: u64,
    ) -> Self {
        Self {
            id,
            question,
            category,
            metadata,
            creator,
            created_at,
            end_time: created_at + duration_secs,
            total_yes: 0,
            total_no: 0,
            resolved: false,
            outcome: None,
            bets: BTreeMap::new(),
            votes: VoteRecord::default(),
            resolution: None,
        }
    }

    /// Whether the betting deadline has passed.
    pub fn is_ended(&self, now: u64) -> bool {
        now >= self.end_time
    }

    /// Whether the market currently accepts bets.
    ///
    /// Distinct from "active": a market past its deadline but not yet
    /// resolved is still active (listed for resolution candidates) but no
    /// longer bettable.
    pub fn is_bettable(&self, now: u64) -> bool {
        !self.resolved && !self.is_ended(now)
    }

    /// Total staked value across both sides.
    pub fn total_pool(&self) -> u64 {
        self.total_yes + self.total_no
    }

    /// Pool on one side.
    pub fn pool(&self, is_yes: bool) -> u64 {
        if is_yes {
            self.total_yes
        } else {
            self.total_no
        }
    }

    /// Append a bet and return its permanent index within the bettor's list.
    ///
    /// Stakes that would overflow the combined pool are rejected upstream,
    /// before any value moves; wrapping here would break pool conservation.
    pub(crate) fn record_bet(&mut self, bettor: &str, bet: Bet) -> usize {
        if bet.is_yes {
            self.total_yes = self
                .total_yes
                .checked_add(bet.amount)
                .expect("YES pool overflow");
        } else {
            self.total_no = self
                .total_no
                .checked_add(bet.amount)
                .expect("NO pool overflow");
        }
        let list = self.bets.entry(bettor.to_string()).or_default();
        list.push(bet);
        list.len() - 1
    }

    /// Bets placed by one bettor on this market.
    pub fn bets_of(&self, bettor: &str) -> &[Bet] {
        self.bets.get(bettor).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every bet on this market, with bettor identity per entry.
    pub fn all_bets(&self) -> Vec<MarketBet> {
        self.bets
            .iter()
            .flat_map(|(bettor, bets)| {
                bets.iter().enumerate().map(move |(index, bet)| MarketBet {
                    bettor: bettor.clone(),
                    index,
                    bet: bet.clone(),
                })
            })
            .collect()
    }

    /// Current vote tallies (yes, no).
    pub fn vote_counts(&self) -> (u32, u32) {
        (self.votes.yes, self.votes.no)
    }

    /// Human-readable status summary.
    pub fn status(&self, now: u64) -> String {
        if self.resolved {
            match self.outcome {
                Some(true) => "Resolved - YES won".to_string(),
                Some(false) => "Resolved - NO won".to_string(),
                None => "Resolved - no outcome set".to_string(),
            }
        } else if self.is_ended(now) {
            "Awaiting resolution".to_string()
        } else {
            "Active - accepting bets".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_market() -> Market {
        Market::new(
            0,
            "Will it rain tomorrow?".to_string(),
            "Weather".to_string(),
            "{}".to_string(),
            "alice".to_string(),
            1_000,
            MIN_MARKET_DURATION,
        )
    }

    #[test]
    fn test_validate_duration_bounds() {
        assert!(validate_duration(MIN_MARKET_DURATION));
        assert!(validate_duration(MAX_MARKET_DURATION));
        assert!(!validate_duration(MIN_MARKET_DURATION - 1));
        assert!(!validate_duration(MAX_MARKET_DURATION + 1));
    }

    #[test]
    fn test_end_time_from_duration() {
        let market = test_market();
        assert_eq!(market.end_time, 1_000 + MIN_MARKET_DURATION);
    }

    #[test]
    fn test_bettable_vs_active() {
        let mut market = test_market();
        assert!(market.is_bettable(1_000));
        assert!(!market.is_ended(1_000));

        // Past deadline: no longer bettable, but still unresolved ("active")
        let past = market.end_time;
        assert!(market.is_ended(past));
        assert!(!market.is_bettable(past));
        assert!(!market.resolved);

        market.resolved = true;
        market.outcome = Some(true);
        assert!(!market.is_bettable(1_000));
    }

    #[test]
    fn test_record_bet_indices_and_pools() {
        let mut market = test_market();
        let idx0 = market.record_bet(
            "bob",
            Bet {
                amount: 100,
                is_yes: true,
                placed_at: 1_001,
                claimed: false,
            },
        );
        let idx1 = market.record_bet(
            "bob",
            Bet {
                amount: 50,
                is_yes: false,
                placed_at: 1_002,
                claimed: false,
            },
        );
        assert_eq!((idx0, idx1), (0, 1));
        assert_eq!(market.total_yes, 100);
        assert_eq!(market.total_no, 50);
        assert_eq!(market.total_pool(), 150);
        assert_eq!(market.bets_of("bob").len(), 2);
        assert!(market.bets_of("carol").is_empty());
    }

    #[test]
    fn test_all_bets_carry_bettor_identity() {
        let mut market = test_market();
        market.record_bet(
            "bob",
            Bet {
                amount: 100,
                is_yes: true,
                placed_at: 1_001,
                claimed: false,
            },
        );
        market.record_bet(
            "carol",
            Bet {
                amount: 200,
                is_yes: false,
                placed_at: 1_002,
                claimed: false,
            },
        );

        let all = market.all_bets();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|b| b.bettor == "bob" && b.bet.amount == 100));
        assert!(all.iter().any(|b| b.bettor == "carol" && b.bet.amount == 200));
    }

    #[test]
    fn test_status_summary() {
        let mut market = test_market();
        assert_eq!(market.status(1_000), "Active - accepting bets");
        assert_eq!(market.status(market.end_time), "Awaiting resolution");

        market.resolved = true;
        market.outcome = Some(false);
        assert_eq!(market.status(market.end_time), "Resolved - NO won");
    }

    #[test]
    fn test_market_serde_round_trip() {
        let mut market = test_market();
        market.record_bet(
            "bob",
            Bet {
                amount: 100,
                is_yes: true,
                placed_at: 1_001,
                claimed: false,
            },
        );

        let json = serde_json::to_string(&market).unwrap();
        let back: Market = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, market.id);
        assert_eq!(back.total_yes, 100);
        assert_eq!(back.bets_of("bob").len(), 1);
    }
}
