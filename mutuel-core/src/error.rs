//! Error types for mutuel-core

use crate::MarketId;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Error types for settlement engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Market duration outside the allowed range
    #[error("invalid duration: {0}s is outside the allowed range")]
    InvalidDuration(u64),

    /// Unknown market id
    #[error("market {0} not found")]
    MarketNotFound(MarketId),

    /// Betting deadline has passed
    #[error("market {0} has ended")]
    MarketEnded(MarketId),

    /// Resolution attempted before the betting deadline
    #[error("market {0} has not ended yet")]
    MarketNotEnded(MarketId),

    /// Market outcome is already final
    #[error("market {0} is already resolved")]
    MarketAlreadyResolved(MarketId),

    /// Claim attempted before the market was resolved
    #[error("market {0} is not resolved")]
    MarketNotResolved(MarketId),

    /// Stake below the configured minimum
    #[error("bet too small: {amount} < {min}")]
    BetTooSmall { amount: u64, min: u64 },

    /// Stake above the configured maximum
    #[error("bet too large: {amount} > {max}")]
    BetTooLarge { amount: u64, max: u64 },

    /// Stake would overflow the market's pooled total
    #[error("pool overflow on market {0}")]
    PoolOverflow(MarketId),

    /// Unknown bet index for the caller on this market
    #[error("bet {index} not found on market {market}")]
    BetNotFound { market: MarketId, index: usize },

    /// The bet's side does not match the resolved outcome
    #[error("bet lost")]
    BetLost,

    /// The bet's entitlement was already withdrawn
    #[error("already claimed")]
    AlreadyClaimed,

    /// The resolver already voted on this market
    #[error("already voted")]
    AlreadyVoted,

    /// Caller lacks the required privilege
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// Vote threshold must be at least 1
    #[error("required votes must be at least 1, got {0}")]
    InvalidRequiredVotes(u32),

    /// Platform fee above the configured cap
    #[error("fee too high: {bps} bps > {max} bps")]
    FeeTooHigh { bps: u64, max: u64 },

    /// Bet limits where min >= max
    #[error("invalid bet limits: min {min} >= max {max}")]
    InvalidBetLimits { min: u64, max: u64 },

    /// Account balance insufficient for the attempted debit
    #[error("insufficient balance for {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: String,
        needed: u64,
        available: u64,
    },

    /// External value transfer failed
    #[error("transfer error: {0}")]
    Transfer(String),

    /// Serde JSON errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Bad input, rejected before any state mutation. Retryable with
    /// corrected input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidDuration(_)
                | Self::BetTooSmall { .. }
                | Self::BetTooLarge { .. }
                | Self::PoolOverflow(_)
                | Self::InvalidRequiredVotes(_)
                | Self::FeeTooHigh { .. }
                | Self::InvalidBetLimits { .. }
        )
    }

    /// Operation inapplicable given current ledger state. Terminal for
    /// this attempt; never retried automatically.
    pub fn is_state_conflict(&self) -> bool {
        matches!(
            self,
            Self::MarketEnded(_)
                | Self::MarketNotEnded(_)
                | Self::MarketAlreadyResolved(_)
                | Self::MarketNotResolved(_)
                | Self::BetLost
                | Self::AlreadyClaimed
                | Self::AlreadyVoted
        )
    }

    /// Fatal for this caller/operation pair.
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotAuthorized(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_taxonomy() {
        assert!(EngineError::InvalidDuration(10).is_validation());
        assert!(EngineError::BetTooSmall {
            amount: 1,
            min: 100
        }
        .is_validation());
        assert!(EngineError::PoolOverflow(0).is_validation());
        assert!(EngineError::AlreadyVoted.is_state_conflict());
        assert!(EngineError::AlreadyClaimed.is_state_conflict());
        assert!(EngineError::MarketEnded(0).is_state_conflict());
        assert!(EngineError::NotAuthorized("mallory".to_string()).is_authorization());

        // The three classes are disjoint
        let err = EngineError::AlreadyClaimed;
        assert!(!err.is_validation());
        assert!(!err.is_authorization());
    }

    #[test]
    fn test_error_display() {
        let err = EngineError::BetTooLarge {
            amount: 20,
            max: 10,
        };
        assert_eq!(err.to_string(), "bet too large: 20 > 10");

        let err = EngineError::MarketNotFound(42);
        assert_eq!(err.to_string(), "market 42 not found");
    }
}
