use serde::{Deserialize, Serialize};

use crate::Level;

/// One entry of `blocks/{hash}/helpers/baking_rights`: a delegate entitled to
/// bake at `block_level`, ranked by `priority` (lower bakes first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BakingRight {
    pub block_level: Level,
    pub delegate: String,
    pub priority: i32,
    pub estimated_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// One entry of `blocks/{hash}/helpers/endorsing_rights`: a delegate
/// entitled to endorse `block_level` with a given number of `slots`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndorsingRight {
    pub block_level: Level,
    pub delegate: String,
    pub slots: Vec<i32>,
    pub estimated_time: Option<chrono::DateTime<chrono::Utc>>,
}
