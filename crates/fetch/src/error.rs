/// Errors produced while fetching-then-decoding one input (§4.3).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Rpc(#[from] tezos_indexer_rpc::RpcError),
    #[error(transparent)]
    Decode(#[from] tezos_indexer_decode::DecodeError),
}
