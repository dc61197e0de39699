use tezos_indexer_fetch::{fetch_block_aux, BlockContext};
use tezos_indexer_rpc::RpcClient;
use tezos_indexer_store::BlockWrite;
use tezos_indexer_types::{Block, Level};

use crate::error::SyncError;

/// Offsets `0..(head_level - known_top)` (§4.4), one per missing level,
/// ordered from the chain head backward.
pub fn pending_offsets(head_level: Level, known_top: Level) -> Vec<u64> {
    if head_level <= known_top {
        return Vec::new();
    }
    (0..(head_level - known_top) as u64).collect()
}

/// Walks the offsets for one cycle, fetching and persisting blocks
/// contiguously from `known_top + 1` upward (§4.4, §5 ordering guarantee).
///
/// Authoritative data (§7.2): any block fetch/decode failure fails the
/// whole batch rather than skipping the bad block.
pub async fn walk(
    pool: &sqlx::PgPool,
    client: &RpcClient,
    head_hash: &str,
    head_level: Level,
    known_top: Level,
    batch_size: usize,
    fetch_concurrency: usize,
) -> Result<usize, SyncError> {
    // `pending_offsets` counts up from the head (offset 0 = head_level), so
    // the lowest (oldest) missing levels sit at the *end* of the list.
    // Reverse it before chunking so chunks are processed oldest-first and
    // blocks land in the store in strictly ascending level order (§5), with
    // no gap left behind if a later chunk fails.
    let mut offsets = pending_offsets(head_level, known_top);
    offsets.reverse();
    let mut persisted = 0usize;

    for chunk in offsets.chunks(batch_size) {
        let fetcher = tezos_indexer_fetch::block_fetcher(head_hash.to_string());
        let results = fetcher.fetch_all(client, chunk.to_vec(), fetch_concurrency).await;

        let mut blocks = Vec::with_capacity(results.len());
        for (_, result) in results {
            blocks.push(result?);
        }
        blocks.sort_by_key(|b| b.level);

        for block in blocks {
            persist_one(pool, client, &block).await?;
            persisted += 1;
        }
    }

    Ok(persisted)
}

async fn persist_one(pool: &sqlx::PgPool, client: &RpcClient, block: &Block) -> Result<(), SyncError> {
    let ctx = BlockContext {
        hash: block.hash.clone(),
        level: block.level,
        timestamp: block.timestamp,
        voting_period: block.meta_voting_period.unwrap_or(0) as i32,
    };
    let aux = fetch_block_aux(client, &ctx).await?;

    let write = BlockWrite {
        operation_groups: aux.operation_groups,
        operations: aux.operations,
        touched_account_ids: aux.touched_account_ids,
        baking_rights: aux.baking_rights,
        endorsing_rights: aux.endorsing_rights,
        ballots: aux.ballots,
        proposals: aux.proposals,
        listings: aux.listings,
    };

    let mut block = block.clone();
    block.active_proposal = aux.current_proposal;

    tezos_indexer_store::persist_block(pool, &block, &write).await?;
    Ok(())
}

/// §4.4 reorg policy: compare the stored block at `head_level` against the
/// node's canonical hash; if it differs (or nothing is stored there yet but
/// something is stored at a lower level with a mismatching hash), walk
/// backward until a stored hash matches, then delete everything above that
/// level in one transaction. Returns the matching level if a reorg fired.
pub async fn reorg_check(
    pool: &sqlx::PgPool,
    client: &RpcClient,
    head_hash: &str,
    head_level: Level,
) -> Result<Option<Level>, SyncError> {
    let Some(known_top) = tezos_indexer_store::max_stored_level(pool).await? else {
        return Ok(None);
    };

    let check_level = head_level.min(known_top);
    let stored = tezos_indexer_store::stored_hash_at_level(pool, check_level).await?;
    let canonical = canonical_hash_at(client, head_hash, head_level, check_level).await?;

    if stored.as_deref() == Some(canonical.as_str()) {
        return Ok(None);
    }

    let mut level = check_level - 1;
    while level >= 0 {
        let stored = tezos_indexer_store::stored_hash_at_level(pool, level).await?;
        let Some(stored_hash) = stored else {
            level -= 1;
            continue;
        };
        let canonical = canonical_hash_at(client, head_hash, head_level, level).await?;
        if stored_hash == canonical {
            tezos_indexer_store::delete_above_level(pool, level).await?;
            return Ok(Some(level));
        }
        level -= 1;
    }

    Err(SyncError::ReorgExhausted)
}

async fn canonical_hash_at(
    client: &RpcClient,
    head_hash: &str,
    head_level: Level,
    level: Level,
) -> Result<String, SyncError> {
    let offset = (head_level - level) as u64;
    let path = Block::offset_path(head_hash, offset);
    let body = client.get(&path).await?;
    let block = tezos_indexer_decode::decode_block(&body)?;
    Ok(block.hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use std::time::Duration;

    #[test]
    fn pending_offsets_counts_missing_levels() {
        assert_eq!(pending_offsets(110, 100), (0..10u64).collect::<Vec<_>>());
        assert_eq!(pending_offsets(100, 100), Vec::<u64>::new());
        assert_eq!(pending_offsets(100, 105), Vec::<u64>::new());
    }

    #[tokio::test]
    async fn canonical_hash_at_resolves_offset_from_head() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/blocks/BLhead~5"))
                .respond_with(status_code(200).body(
                    r#"{"hash":"BLancestor","header":{"level":95,"predecessor":"BLprev","timestamp":"2021-01-01T00:00:00Z","proto":1,"fitness":["01"],"context":"CoXyz"}}"#,
                )),
        );

        let client = RpcClient::with_base_url(format!("http://{}/", server.addr()), Duration::from_secs(5));
        let hash = canonical_hash_at(&client, "BLhead", 100, 95).await.unwrap();
        assert_eq!(hash, "BLancestor");
    }
}
