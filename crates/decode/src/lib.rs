//! Pure decoders from Tezos node JSON into `tezos-indexer-types` records.
//!
//! Every function here is `bytes -> Record | DecodeError` with no I/O;
//! fetching is the caller's job (`tezos-indexer-fetch`).

mod account;
mod block;
mod error;
mod operations;
mod rights;
mod tolerant;
mod votes;

pub use account::{decode_account, decode_delegate};
pub use block::decode_block;
pub use error::DecodeError;
pub use operations::{decode_operation_groups, extract_touched_account_ids, DecodedOperationGroup};
pub use rights::{decode_baking_rights, decode_endorsing_rights};
pub use votes::{decode_ballots, decode_current_proposal, decode_listings, decode_proposals};
