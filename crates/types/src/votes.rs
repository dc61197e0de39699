use serde::{Deserialize, Serialize};

use crate::Level;

/// A single vote cast via `blocks/{hash}/votes/ballot_list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    pub pkh: String,
    pub ballot_period: i32,
    pub ballot: String,
    pub block_id: String,
    pub block_level: Level,
}

/// A proposal and its accumulated support, from `blocks/{hash}/votes/proposals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub block_id: String,
    pub block_level: Level,
    pub proposal_hash: String,
    pub supporters_count: i64,
}

/// A voting-power entry from `blocks/{hash}/votes/listings` (also known as
/// rolls in older protocol versions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub pkh: String,
    pub voting_power: i64,
    pub block_id: String,
    pub block_level: Level,
}
