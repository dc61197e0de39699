use tezos_indexer_types::UnknownOperationKind;

/// Errors a decoder can return (§4.2, §7.2/§7.3/§7.6).
///
/// `UnknownKind` is always fatal (§7.6): it is never produced by a
/// "tolerant" decoder, since those endpoints don't carry operation kinds.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown operation kind: {0}")]
    UnknownKind(#[from] UnknownOperationKind),
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}
