use serde::{Deserialize, Serialize};

use crate::Level;

/// A contract/implicit account, versioned by `block_level`.
///
/// The pair `(account_id, block_level)` is the most-recent-wins key (§3
/// invariant 3): readers interested in "current" state select the row with
/// the maximum `block_level` for a given `account_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    pub block_id: String,
    pub block_level: Level,
    pub manager: Option<String>,
    pub balance: i64,
    pub spendable: Option<bool>,
    pub delegate_setable: Option<bool>,
    pub delegate_value: Option<String>,
    pub counter: Option<i64>,
    pub script: Option<serde_json::Value>,
    pub storage: Option<serde_json::Value>,
}
