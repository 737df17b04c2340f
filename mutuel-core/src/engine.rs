//! # Settlement Engine
//!
//! `MarketEngine` is the single entry point for every boundary operation:
//! market creation, bet placement, resolution voting, payout preview, and
//! claims. All ledger-mutating operations are globally serialized behind one
//! writer lock (mirroring a serialized-commit store); read-only views take
//! the shared lock and observe a point-in-time consistent snapshot.
//!
//! External value movement goes through the [`ValueTransfer`] seam and
//! happens inside the write critical section, before the corresponding
//! ledger mutation, so a failed transfer leaves the ledger byte-for-byte
//! unchanged.

use crate::balance::ValueTransfer;
use crate::clock::Clock;
use crate::error::{EngineError, Result};
use crate::market::{validate_duration, Bet, Market, MarketBet, Resolution};
use crate::payout;
use crate::store::{EngineConfig, LedgerStore};
use crate::{MarketId, MAX_PLATFORM_FEE_BPS};
use log::{debug, info, warn};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The prediction-market settlement and resolution engine.
pub struct MarketEngine {
    store: RwLock<LedgerStore>,
    clock: Arc<dyn Clock>,
    transfer: Arc<dyn ValueTransfer>,
}

impl MarketEngine {
    /// Create an engine with an empty ledger.
    pub fn new(
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        transfer: Arc<dyn ValueTransfer>,
    ) -> Self {
        Self {
            store: RwLock::new(LedgerStore::new(config)),
            clock,
            transfer,
        }
    }

    /// Restore an engine from a ledger snapshot produced by [`snapshot`].
    ///
    /// [`snapshot`]: MarketEngine::snapshot
    pub fn from_snapshot(
        json: &str,
        clock: Arc<dyn Clock>,
        transfer: Arc<dyn ValueTransfer>,
    ) -> Result<Self> {
        Ok(Self {
            store: RwLock::new(LedgerStore::from_json(json)?),
            clock,
            transfer,
        })
    }

    /// Serialize the full ledger state to JSON.
    pub fn snapshot(&self) -> Result<String> {
        self.read().to_json()
    }

    // A poisoned lock means a writer panicked mid-mutation; the ledger can
    // no longer be trusted, so propagating the panic is the only safe move.
    fn read(&self) -> RwLockReadGuard<'_, LedgerStore> {
        self.store.read().expect("ledger lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerStore> {
        self.store.write().expect("ledger lock poisoned")
    }

    // ---- Market Registry ----

    /// Create a market and return its sequential id.
    ///
    /// `metadata` is an opaque display payload, stored verbatim and never
    /// parsed by the engine.
    pub fn create_market(
        &self,
        creator: &str,
        question: &str,
        category: &str,
        metadata: &str,
        duration_secs: u64,
    ) -> Result<MarketId> {
        if !validate_duration(duration_secs) {
            return Err(EngineError::InvalidDuration(duration_secs));
        }

        let now = self.clock.now();
        let mut store = self.write();
        let id = store.market_count();
        store.insert_market(Market::new(
            id,
            question.to_string(),
            category.to_string(),
            metadata.to_string(),
            creator.to_string(),
            now,
            duration_secs,
        ));
        info!("market {id} created by {creator}, ends at {}", now + duration_secs);
        Ok(id)
    }

    /// Fetch a point-in-time copy of a market record.
    pub fn get_market(&self, id: MarketId) -> Result<Market> {
        Ok(self.read().market(id)?.clone())
    }

    /// All markets not yet resolved, irrespective of their betting deadline.
    pub fn active_markets(&self) -> Vec<Market> {
        let store = self.read();
        store
            .active_ids()
            .iter()
            .filter_map(|&id| store.market(id).ok().cloned())
            .collect()
    }

    /// Number of markets ever created.
    pub fn market_count(&self) -> u64 {
        self.read().market_count()
    }

    /// Ids of markets created by `creator`.
    pub fn user_markets(&self, creator: &str) -> Vec<MarketId> {
        self.read().markets_of(creator).to_vec()
    }

    // ---- Betting Engine ----

    /// Stake `amount` on one side of a market. Returns the bet's permanent
    /// index within the bettor's per-market list.
    ///
    /// The bettor's external balance is debited atomically with the pool
    /// update; if the debit fails the ledger is untouched. Multiple bets per
    /// bettor per market are tracked independently, with no netting.
    pub fn place_bet(
        &self,
        bettor: &str,
        market_id: MarketId,
        is_yes: bool,
        amount: u64,
    ) -> Result<usize> {
        let now = self.clock.now();
        let mut store = self.write();

        let market = store.market(market_id)?;
        if market.is_ended(now) {
            return Err(EngineError::MarketEnded(market_id));
        }
        if amount < store.config.min_bet {
            return Err(EngineError::BetTooSmall {
                amount,
                min: store.config.min_bet,
            });
        }
        if amount > store.config.max_bet {
            return Err(EngineError::BetTooLarge {
                amount,
                max: store.config.max_bet,
            });
        }
        // Guard the combined pool: every entitlement is bounded by it, so
        // keeping the sum within u64 keeps the payout math within u64.
        if market.total_pool().checked_add(amount).is_none() {
            return Err(EngineError::PoolOverflow(market_id));
        }

        // Debit before recording; a failed debit must leave the pools as
        // they were.
        self.transfer.debit(bettor, amount)?;

        let market = store.market_mut(market_id)?;
        let index = market.record_bet(
            bettor,
            Bet {
                amount,
                is_yes,
                placed_at: now,
                claimed: false,
            },
        );
        debug!(
            "bet placed: market {market_id}, {bettor} staked {amount} on {}",
            if is_yes { "YES" } else { "NO" }
        );
        Ok(index)
    }

    /// Bets placed by one bettor on a market. Empty if the market or bettor
    /// is unknown.
    pub fn user_bets(&self, bettor: &str, market_id: MarketId) -> Vec<Bet> {
        self.read()
            .market(market_id)
            .map(|m| m.bets_of(bettor).to_vec())
            .unwrap_or_default()
    }

    /// Every bet on a market, with bettor identity per entry.
    pub fn market_bets(&self, market_id: MarketId) -> Vec<MarketBet> {
        self.read()
            .market(market_id)
            .map(Market::all_bets)
            .unwrap_or_default()
    }

    // ---- Payout Calculator views ----

    /// Estimate the payout of a hypothetical stake at the current pool
    /// state. Pools keep moving until the deadline; this is a live preview,
    /// not a promise.
    pub fn potential_payout(
        &self,
        market_id: MarketId,
        amount: u64,
        is_yes: bool,
    ) -> Result<u64> {
        let store = self.read();
        let market = store.market(market_id)?;
        Ok(payout::potential_payout(
            amount,
            market.pool(is_yes),
            market.pool(!is_yes),
            store.config.platform_fee_bps,
        ))
    }

    /// Live odds multiplier for one side at the current pool state.
    pub fn odds(&self, market_id: MarketId, is_yes: bool) -> Result<f64> {
        let store = self.read();
        let market = store.market(market_id)?;
        Ok(payout::odds(
            market.pool(is_yes),
            market.pool(!is_yes),
            store.config.platform_fee_bps,
        ))
    }

    // ---- Oracle Resolver ----

    /// Cast an authorized resolver's vote on an ended market. Returns `true`
    /// if this vote finalized the market.
    ///
    /// One vote per resolver per market, permanently. The first side whose
    /// tally reaches the configured threshold wins; the threshold in force
    /// at vote time applies, including to markets with pre-existing votes.
    pub fn submit_resolution(
        &self,
        resolver: &str,
        market_id: MarketId,
        outcome: bool,
        proof: &str,
    ) -> Result<bool> {
        let now = self.clock.now();
        let mut store = self.write();

        if !store.config.resolvers.contains(resolver) {
            return Err(EngineError::NotAuthorized(resolver.to_string()));
        }

        let required = store.config.required_votes;
        let market = store.market(market_id)?;
        if market.resolved {
            return Err(EngineError::MarketAlreadyResolved(market_id));
        }
        if !market.is_ended(now) {
            return Err(EngineError::MarketNotEnded(market_id));
        }
        if market.votes.has_voted(resolver) {
            return Err(EngineError::AlreadyVoted);
        }

        // Either side can meet the threshold at this check: a lowered
        // threshold may already be satisfied by standing votes for the
        // other side, and the side that reached it first wins.
        let standing_tally = market.votes.tally(!outcome);
        let cast_tally = market.votes.tally(outcome) + 1;
        let winner = if standing_tally >= required {
            Some(!outcome)
        } else if cast_tally >= required {
            Some(outcome)
        } else {
            None
        };

        let final_outcome = match winner {
            Some(side) => side,
            None => {
                let tally = store.market_mut(market_id)?.votes.record(resolver, outcome);
                debug!(
                    "vote cast: market {market_id}, {resolver} voted {}, tally {tally}/{required}",
                    if outcome { "YES" } else { "NO" }
                );
                return Ok(false);
            }
        };

        // Finalize before recording the vote: the treasury credit inside
        // can fail, and a failed call must leave the ledger untouched so
        // the same resolver can retry.
        Self::finalize(
            &mut store,
            &*self.transfer,
            market_id,
            final_outcome,
            resolver,
            proof,
            now,
        )?;
        store.market_mut(market_id)?.votes.record(resolver, outcome);
        Ok(true)
    }

    /// Privileged single-authority override for stuck or ambiguous markets.
    /// Finalizes immediately, regardless of the vote tally.
    pub fn emergency_resolve(
        &self,
        caller: &str,
        market_id: MarketId,
        outcome: bool,
        proof: &str,
    ) -> Result<()> {
        let now = self.clock.now();
        let mut store = self.write();
        Self::require_owner(&store, caller)?;

        let market = store.market(market_id)?;
        if market.resolved {
            return Err(EngineError::MarketAlreadyResolved(market_id));
        }

        warn!("emergency resolution of market {market_id} by {caller}");
        Self::finalize(&mut store, &*self.transfer, market_id, outcome, caller, proof, now)
    }

    /// Terminal transition: Unresolved -> Resolved. The platform's fee slice
    /// of the losing pool is credited to the treasury here, so it can never
    /// reach a bettor through the claim path.
    fn finalize(
        store: &mut LedgerStore,
        transfer: &dyn ValueTransfer,
        market_id: MarketId,
        outcome: bool,
        resolver: &str,
        proof: &str,
        now: u64,
    ) -> Result<()> {
        let fee_bps = store.config.platform_fee_bps;
        let treasury = store.config.treasury.clone();

        let losing_pool = store.market(market_id)?.pool(!outcome);
        let fee = payout::platform_fee(losing_pool, fee_bps);
        if fee > 0 {
            transfer.credit(&treasury, fee)?;
        }

        let market = store.market_mut(market_id)?;
        market.resolved = true;
        market.outcome = Some(outcome);
        market.resolution = Some(Resolution {
            market_id,
            outcome,
            resolved_at: now,
            resolver: resolver.to_string(),
            proof: proof.to_string(),
        });
        store.prune_active(market_id);

        info!(
            "market {market_id} resolved {} by {resolver}, fee {fee} to treasury",
            if outcome { "YES" } else { "NO" }
        );
        Ok(())
    }

    /// The resolution record of a finalized market.
    pub fn resolution(&self, market_id: MarketId) -> Result<Resolution> {
        let store = self.read();
        store
            .market(market_id)?
            .resolution
            .clone()
            .ok_or(EngineError::MarketNotResolved(market_id))
    }

    /// Current vote tallies (yes, no) for a market.
    pub fn votes(&self, market_id: MarketId) -> Result<(u32, u32)> {
        Ok(self.read().market(market_id)?.vote_counts())
    }

    // ---- Claim Processor ----

    /// Withdraw a winning bet's entitlement. Exactly-once: the first caller
    /// observes `claimed` flip false -> true; every later attempt fails
    /// `AlreadyClaimed`. Returns the credited amount.
    pub fn claim_winnings(
        &self,
        bettor: &str,
        market_id: MarketId,
        bet_index: usize,
    ) -> Result<u64> {
        let mut store = self.write();
        let fee_bps = store.config.platform_fee_bps;

        let market = store.market(market_id)?;
        if !market.resolved {
            return Err(EngineError::MarketNotResolved(market_id));
        }
        // Outcome is always set once resolved; treat a gap as corruption.
        let outcome = market.outcome.expect("resolved market without outcome");

        let bet = market
            .bets_of(bettor)
            .get(bet_index)
            .ok_or(EngineError::BetNotFound {
                market: market_id,
                index: bet_index,
            })?;
        if bet.is_yes != outcome {
            return Err(EngineError::BetLost);
        }
        if bet.claimed {
            return Err(EngineError::AlreadyClaimed);
        }

        let entitlement = payout::winning_entitlement(
            bet.amount,
            market.pool(outcome),
            market.pool(!outcome),
            fee_bps,
        );

        // Credit first: if the external transfer fails, `claimed` stays
        // false and the claim can be retried.
        self.transfer.credit(bettor, entitlement)?;

        let market = store.market_mut(market_id)?;
        if let Some(bet) = market
            .bets
            .get_mut(bettor)
            .and_then(|bets| bets.get_mut(bet_index))
        {
            bet.claimed = true;
        }

        info!("claim paid: market {market_id}, {bettor} received {entitlement}");
        Ok(entitlement)
    }

    // ---- Admin ----

    fn require_owner(store: &LedgerStore, caller: &str) -> Result<()> {
        if caller != store.config.owner {
            return Err(EngineError::NotAuthorized(caller.to_string()));
        }
        Ok(())
    }

    /// Add an identity to the authorized resolver set.
    pub fn authorize_resolver(&self, caller: &str, resolver: &str) -> Result<()> {
        let mut store = self.write();
        Self::require_owner(&store, caller)?;
        store.config.resolvers.insert(resolver.to_string());
        info!("resolver authorized: {resolver}");
        Ok(())
    }

    /// Remove an identity from the authorized resolver set. Votes already
    /// counted toward a finished resolution are not undone.
    pub fn revoke_resolver(&self, caller: &str, resolver: &str) -> Result<()> {
        let mut store = self.write();
        Self::require_owner(&store, caller)?;
        store.config.resolvers.remove(resolver);
        info!("resolver revoked: {resolver}");
        Ok(())
    }

    /// Whether an identity is currently authorized to resolve.
    pub fn is_authorized_resolver(&self, resolver: &str) -> bool {
        self.read().config.resolvers.contains(resolver)
    }

    /// Change the vote threshold. Applies to all future tally checks,
    /// including markets with pre-existing votes.
    pub fn update_required_votes(&self, caller: &str, n: u32) -> Result<()> {
        let mut store = self.write();
        Self::require_owner(&store, caller)?;
        if n < 1 {
            return Err(EngineError::InvalidRequiredVotes(n));
        }
        store.config.required_votes = n;
        Ok(())
    }

    /// Change the platform fee (basis points), capped at
    /// [`MAX_PLATFORM_FEE_BPS`].
    pub fn update_platform_fee(&self, caller: &str, fee_bps: u64) -> Result<()> {
        let mut store = self.write();
        Self::require_owner(&store, caller)?;
        if fee_bps > MAX_PLATFORM_FEE_BPS {
            return Err(EngineError::FeeTooHigh {
                bps: fee_bps,
                max: MAX_PLATFORM_FEE_BPS,
            });
        }
        store.config.platform_fee_bps = fee_bps;
        Ok(())
    }

    /// Change the accepted stake range.
    pub fn update_bet_limits(&self, caller: &str, min: u64, max: u64) -> Result<()> {
        let mut store = self.write();
        Self::require_owner(&store, caller)?;
        if min >= max {
            return Err(EngineError::InvalidBetLimits { min, max });
        }
        store.config.min_bet = min;
        store.config.max_bet = max;
        Ok(())
    }

    /// Change the treasury account credited with platform fees.
    pub fn update_treasury(&self, caller: &str, treasury: &str) -> Result<()> {
        let mut store = self.write();
        Self::require_owner(&store, caller)?;
        store.config.treasury = treasury.to_string();
        Ok(())
    }

    /// Point-in-time copy of the venue configuration.
    pub fn config(&self) -> EngineConfig {
        self.read().config.clone()
    }
}

impl std::fmt::Debug for MarketEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketEngine")
            .field("markets", &self.read().market_count())
            .finish()
    }
}

/// Shared engine handle for concurrent callers.
pub type SharedEngine = Arc<MarketEngine>;
