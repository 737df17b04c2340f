//! # Parimutuel Payout Calculator
//!
//! Pure integer math over pool sizes. Winners get their stake back plus a
//! share of the losing pool proportional to their stake within the winning
//! pool. The platform fee (basis points) is taken from the losing pool only.
//!
//! All divisions truncate toward zero. The fractional remainder is never
//! distributed; it stays in the pool and favors the venue, not the bettor.

use crate::BPS_DENOMINATOR;

/// The losing pool after the platform fee is removed.
pub fn net_losing_pool(losing_pool: u64, fee_bps: u64) -> u64 {
    debug_assert!(fee_bps <= BPS_DENOMINATOR, "fee above 100%");
    let net = u128::from(losing_pool) * u128::from(BPS_DENOMINATOR - fee_bps)
        / u128::from(BPS_DENOMINATOR);
    net as u64
}

/// The platform's slice of the losing pool.
pub fn platform_fee(losing_pool: u64, fee_bps: u64) -> u64 {
    let fee = u128::from(losing_pool) * u128::from(fee_bps) / u128::from(BPS_DENOMINATOR);
    fee as u64
}

/// Entitlement of a winning bet: stake plus its proportional share of the
/// fee-reduced losing pool.
///
/// `winning_pool` must include `stake` (the bet itself contributes to the
/// pool on its side), so it is never zero for a valid winning bet.
pub fn winning_entitlement(stake: u64, winning_pool: u64, losing_pool: u64, fee_bps: u64) -> u64 {
    debug_assert!(winning_pool >= stake, "stake must be part of winning pool");
    let share = u128::from(stake) * u128::from(net_losing_pool(losing_pool, fee_bps))
        / u128::from(winning_pool);
    stake + share as u64
}

/// Estimate the payout of a hypothetical `stake` on the side currently
/// holding `side_pool`, against `other_pool`, were that side to win with the
/// pools as they stand.
///
/// Pools keep moving until the betting deadline, so this is a live preview,
/// not a promise. An empty side pool has no odds data yet and returns the
/// stake unchanged (1.0x).
pub fn potential_payout(stake: u64, side_pool: u64, other_pool: u64, fee_bps: u64) -> u64 {
    if side_pool == 0 {
        return stake;
    }
    let share = u128::from(stake) * u128::from(net_losing_pool(other_pool, fee_bps))
        / u128::from(side_pool);
    stake + share as u64
}

/// Live odds multiplier for the side currently holding `side_pool`.
pub fn odds(side_pool: u64, other_pool: u64, fee_bps: u64) -> f64 {
    if side_pool == 0 {
        return 1.0;
    }
    1.0 + net_losing_pool(other_pool, fee_bps) as f64 / side_pool as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_PLATFORM_FEE_BPS;

    const COIN: u64 = 100_000_000;

    #[test]
    fn test_net_losing_pool_default_fee() {
        // 2% of 0.5 goes to the platform
        assert_eq!(net_losing_pool(COIN / 2, DEFAULT_PLATFORM_FEE_BPS), 49_000_000);
        assert_eq!(platform_fee(COIN / 2, DEFAULT_PLATFORM_FEE_BPS), 1_000_000);
    }

    #[test]
    fn test_fee_and_net_partition_the_pool() {
        for pool in [0, 1, 99, 10_001, COIN, u64::MAX / 2] {
            for fee_bps in [0, 1, 200, 500] {
                let fee = platform_fee(pool, fee_bps);
                let net = net_losing_pool(pool, fee_bps);
                // Truncation can leave at most 1 unit unassigned
                assert!(fee + net <= pool);
                assert!(pool - (fee + net) <= 1);
            }
        }
    }

    #[test]
    fn test_simple_resolution_entitlement() {
        // A bets 1.0 YES, B bets 0.5 NO, YES wins:
        // 1.0 + (0.5 * 0.98) / 1.0 = 1.49
        let entitlement =
            winning_entitlement(COIN, COIN, COIN / 2, DEFAULT_PLATFORM_FEE_BPS);
        assert_eq!(entitlement, 149_000_000);
    }

    #[test]
    fn test_entitlement_truncates_toward_pool() {
        // 3 winners of 1 unit each against a losing pool of 10 with no fee:
        // each gets 1 + 10/3 = 4 (truncated), leaving 1 unit undistributed.
        let each = winning_entitlement(1, 3, 10, 0);
        assert_eq!(each, 4);
        assert!(3 * each <= 3 + 10);
    }

    #[test]
    fn test_entitlement_zero_losing_pool() {
        // Everyone bet the same side: winners just get their stake back
        assert_eq!(winning_entitlement(500, 1_500, 0, 200), 500);
    }

    #[test]
    fn test_entitlements_never_exceed_pool() {
        // Sum over many winners must stay within the total pool
        let stakes = [7u64, 13, 101, 9_999, 1_234_567];
        let winning_pool: u64 = stakes.iter().sum();
        let losing_pool = 5_000_000;

        let paid: u64 = stakes
            .iter()
            .map(|&s| winning_entitlement(s, winning_pool, losing_pool, 200))
            .sum();
        assert!(paid <= winning_pool + losing_pool);
        // The fee portion is never paid to bettors
        assert!(paid <= winning_pool + net_losing_pool(losing_pool, 200));
    }

    #[test]
    fn test_large_pools_do_not_overflow() {
        let big = u64::MAX / 4;
        let entitlement = winning_entitlement(big, big, big, 200);
        assert!(entitlement >= big);
    }

    #[test]
    fn test_potential_payout_empty_side() {
        // No odds data yet: 1.0x
        assert_eq!(potential_payout(COIN, 0, COIN, 200), COIN);
        assert_eq!(odds(0, COIN, 200), 1.0);
    }

    #[test]
    fn test_potential_payout_tracks_pools() {
        // Side pool 1.0, other pool 0.5, 2% fee: same math as settlement
        let estimate = potential_payout(COIN, COIN, COIN / 2, 200);
        assert_eq!(estimate, 149_000_000);

        let o = odds(COIN, COIN / 2, 200);
        assert!((o - 1.49).abs() < 1e-9);
    }
}
