use futures::stream::{self, StreamExt};
use tezos_indexer_rpc::RpcClient;

use crate::error::SyncError;

fn contract_path(account_id: &str, block_id: &str) -> String {
    format!("blocks/{block_id}/context/contracts/{account_id}")
}

fn delegate_path(pkh: &str, block_id: &str) -> String {
    format!("blocks/{block_id}/context/delegates/{pkh}")
}

/// Drains the accounts checkpoint (§4.5 step 2-3): for each distinct
/// `account_id` at its maximum checkpointed `block_level`, re-fetches and
/// upserts the account, then prunes the checkpoint. A failed individual
/// fetch is swallowed (the row survives to be retried next cycle) — per
/// §4.5, "some IDs reference accounts that failed on-chain".
pub async fn drain_accounts(
    pool: &sqlx::PgPool,
    client: &RpcClient,
    concurrency: usize,
) -> Result<usize, SyncError> {
    let entries = tezos_indexer_store::accounts_to_drain(pool).await?;
    let drained = stream::iter(entries.into_iter().map(|entry| {
        let client = client.clone();
        async move {
            let path = contract_path(&entry.account_id, &entry.block_id);
            match client.get(&path).await {
                Ok(body) => tezos_indexer_decode::decode_account(
                    &body,
                    &entry.account_id,
                    &entry.block_id,
                    entry.block_level,
                )
                .map_err(|err| {
                    tracing::warn!(account_id = %entry.account_id, error = %err, "account checkpoint decode failed, retrying next cycle");
                })
                .ok(),
                Err(err) => {
                    tracing::warn!(account_id = %entry.account_id, error = %err, "account checkpoint fetch failed, retrying next cycle");
                    None
                }
            }
        }
    }))
    .buffer_unordered(concurrency.max(1))
    .filter_map(|account| async move { account })
    .collect::<Vec<_>>()
    .await;

    for account in &drained {
        tezos_indexer_store::upsert_account(pool, account).await?;
    }
    Ok(drained.len())
}

/// The delegate analogue of [`drain_accounts`], keyed by `pkh`.
pub async fn drain_delegates(
    pool: &sqlx::PgPool,
    client: &RpcClient,
    concurrency: usize,
) -> Result<usize, SyncError> {
    let entries = tezos_indexer_store::delegates_to_drain(pool).await?;
    let drained = stream::iter(entries.into_iter().map(|entry| {
        let client = client.clone();
        async move {
            let path = delegate_path(&entry.pkh, &entry.block_id);
            match client.get(&path).await {
                Ok(body) => {
                    tezos_indexer_decode::decode_delegate(&body, &entry.pkh, &entry.block_id, entry.block_level)
                        .map_err(|err| {
                            tracing::warn!(pkh = %entry.pkh, error = %err, "delegate checkpoint decode failed, retrying next cycle");
                        })
                        .ok()
                }
                Err(err) => {
                    tracing::warn!(pkh = %entry.pkh, error = %err, "delegate checkpoint fetch failed, retrying next cycle");
                    None
                }
            }
        }
    }))
    .buffer_unordered(concurrency.max(1))
    .filter_map(|delegate| async move { delegate })
    .collect::<Vec<_>>()
    .await;

    for delegate in &drained {
        tezos_indexer_store::upsert_delegate(pool, delegate).await?;
    }
    Ok(drained.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_expected_paths() {
        assert_eq!(contract_path("tz1x", "BLhash"), "blocks/BLhash/context/contracts/tz1x");
        assert_eq!(delegate_path("tz1x", "BLhash"), "blocks/BLhash/context/delegates/tz1x");
    }
}
