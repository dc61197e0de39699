use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Level, OperationKind};

/// A derived, append-only percentile summary over a window of recent
/// operations of one `kind` (§4.6).
///
/// `low` is clamped to zero per the Open Question in §9: the source stores
/// `mean - sigma` unclamped, but nothing downstream here depends on a
/// negative fee band, so we clamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSummary {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub timestamp: DateTime<Utc>,
    pub kind: OperationKind,
    pub cycle: Option<i64>,
    pub level: Level,
}
