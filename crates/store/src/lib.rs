//! Postgres persistence layer (§4.7): per-block transactional upserts,
//! account/delegate checkpoint drain, reorg recovery, and fee aggregation.
//! Built on `sqlx`'s async Postgres driver with prepared, parameterised
//! statements; no ORM (see grounding notes in DESIGN.md).

mod accounts;
mod block;
mod error;
mod fees;
mod pool;
mod reorg;

pub use accounts::{accounts_to_drain, delegates_to_drain, upsert_account, upsert_delegate};
pub use block::{persist_block, BlockWrite};
pub use error::StoreError;
pub use fees::aggregate_fees;
pub use pool::connect;
pub use reorg::{delete_above_level, max_stored_level, stored_hash_at_level};
