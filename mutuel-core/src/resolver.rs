//! # Oracle Vote Record
//!
//! Per-market voting state for the resolution state machine. Each authorized
//! resolver votes at most once per market, permanently; the first side whose
//! tally reaches the configured threshold finalizes the market. Under a
//! unanimity threshold a split vote leaves the market unresolved, and the
//! operator override (`emergency_resolve`) is the escape hatch.
//!
//! The authorized resolver set itself lives in the engine config; this
//! module only tracks votes.

use crate::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Votes collected for one market while it is unresolved.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct VoteRecord {
    /// Resolver identity -> outcome voted. One entry per resolver, ever.
    voters: BTreeMap<AccountId, bool>,

    /// Tally for YES
    pub yes: u32,

    /// Tally for NO
    pub no: u32,
}

impl VoteRecord {
    /// Whether this resolver has already voted on the market.
    pub fn has_voted(&self, resolver: &str) -> bool {
        self.voters.contains_key(resolver)
    }

    /// Record a vote and return the new tally for that outcome.
    ///
    /// The caller must have checked `has_voted` first; a duplicate here is a
    /// logic error upstream.
    pub(crate) fn record(&mut self, resolver: &str, outcome: bool) -> u32 {
        debug_assert!(!self.has_voted(resolver), "duplicate vote not rejected");
        self.voters.insert(resolver.to_string(), outcome);
        if outcome {
            self.yes += 1;
            self.yes
        } else {
            self.no += 1;
            self.no
        }
    }

    /// Current tally for one outcome.
    pub fn tally(&self, outcome: bool) -> u32 {
        if outcome {
            self.yes
        } else {
            self.no
        }
    }

    /// Total votes cast so far.
    pub fn total(&self) -> u32 {
        self.yes + self.no
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_tally() {
        let mut votes = VoteRecord::default();
        assert!(!votes.has_voted("oracle1"));

        assert_eq!(votes.record("oracle1", true), 1);
        assert_eq!(votes.record("oracle2", false), 1);
        assert_eq!(votes.record("oracle3", true), 2);

        assert!(votes.has_voted("oracle1"));
        assert_eq!((votes.yes, votes.no), (2, 1));
        assert_eq!(votes.tally(true), 2);
        assert_eq!(votes.tally(false), 1);
        assert_eq!(votes.total(), 3);
    }

    #[test]
    fn test_has_voted_regardless_of_outcome() {
        let mut votes = VoteRecord::default();
        votes.record("oracle1", false);
        // A resolver who voted NO may not vote YES later either
        assert!(votes.has_voted("oracle1"));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut votes = VoteRecord::default();
        votes.record("oracle1", true);

        let json = serde_json::to_string(&votes).unwrap();
        let back: VoteRecord = serde_json::from_str(&json).unwrap();
        assert!(back.has_voted("oracle1"));
        assert_eq!(back.yes, 1);
    }
}
