use chrono::{DateTime, Utc};
use tezos_indexer_types::Level;

/// The block identity auxiliary fetches (operations, rights, votes) are
/// keyed against. Carries the bits decoders need that aren't in the
/// response body itself (§4.2: block hash/level/timestamp/voting period).
#[derive(Debug, Clone)]
pub struct BlockContext {
    pub hash: String,
    pub level: Level,
    pub timestamp: DateTime<Utc>,
    pub voting_period: i32,
}
