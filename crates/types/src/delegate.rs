use serde::{Deserialize, Serialize};

use crate::Level;

/// A delegate (baker) account, versioned by `block_level` the same way
/// [`crate::Account`] is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delegate {
    pub pkh: String,
    pub block_id: String,
    pub balance: i64,
    pub frozen_balance: Option<i64>,
    pub staking_balance: Option<i64>,
    pub delegated_balance: Option<i64>,
    pub deactivated: bool,
    pub grace_period: Option<i64>,
    pub block_level: Level,
}
