//! The indexing pipeline's sync-worker logic: the block walker, account and
//! delegate checkpoint drain, and the orchestrator state machine that ties
//! them to a sleep/retry/shutdown cycle (§4.4, §4.5, §4.8).

mod checkpoint;
mod error;
mod orchestrator;
mod walker;

pub use checkpoint::{drain_accounts, drain_delegates};
pub use error::SyncError;
pub use orchestrator::Orchestrator;
pub use walker::{pending_offsets, reorg_check, walk};
