use serde::{Deserialize, Serialize};

use crate::Level;

/// A work-queue row: "this account needs a fresh read against `block_id`".
///
/// Enqueued while persisting a block (§4.5 step 1), drained periodically,
/// and pruned once the corresponding [`crate::Account`] row catches up
/// (§3 invariant 4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsCheckpointEntry {
    pub account_id: String,
    pub block_id: String,
    pub block_level: Level,
}

/// The delegate analogue of [`AccountsCheckpointEntry`], keyed by `pkh`
/// (§4.5: "Delegates are processed analogously").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatesCheckpointEntry {
    pub pkh: String,
    pub block_id: String,
    pub block_level: Level,
}
