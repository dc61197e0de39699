/// The cycle's failure monad (§7): a plain `Result<T, SyncError>`, not a
/// custom monad type. The orchestrator is the sole component that maps a
/// `SyncError` to sleep-and-retry vs halt.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Rpc(#[from] tezos_indexer_rpc::RpcError),
    #[error(transparent)]
    Fetch(#[from] tezos_indexer_fetch::FetchError),
    #[error(transparent)]
    Decode(#[from] tezos_indexer_decode::DecodeError),
    #[error(transparent)]
    Store(#[from] tezos_indexer_store::StoreError),
    #[error("reorg walked back past genesis without finding a matching stored block")]
    ReorgExhausted,
}
