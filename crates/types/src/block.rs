use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Level;

/// A single indexed block, as stored in the `blocks` table.
///
/// `level` and `hash` are both unique; `predecessor` is the hash the
/// walker uses to validate chain continuity (§3 invariant 6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub level: Level,
    pub hash: String,
    pub predecessor: String,
    pub timestamp: DateTime<Utc>,
    pub proto: i32,
    pub fitness: String,
    pub context: String,
    pub signature: Option<String>,
    pub protocol: String,
    pub chain_id: String,
    pub operations_hash: Option<String>,
    pub period_kind: Option<String>,
    pub current_expected_quorum: Option<i32>,
    pub active_proposal: Option<String>,
    pub baker: Option<String>,
    pub consumed_gas: Option<i64>,
    pub meta_level: Option<i64>,
    pub meta_level_position: Option<i64>,
    pub meta_cycle: Option<i64>,
    pub meta_cycle_position: Option<i64>,
    pub meta_voting_period: Option<i64>,
    pub meta_voting_period_position: Option<i64>,
    pub priority: Option<i32>,
}

impl Block {
    /// The offset-addressed RPC path for this block relative to a given head hash.
    pub fn offset_path(head_hash: &str, offset: u64) -> String {
        format!("blocks/{head_hash}~{offset}")
    }
}
