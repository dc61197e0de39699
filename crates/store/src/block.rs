use sqlx::{PgPool, Postgres, Transaction};
use tezos_indexer_types::{
    Ballot, BakingRight, Block, EndorsingRight, Listing, Operation, OperationGroup, Proposal,
};

use crate::accounts::enqueue_delegate_checkpoint;
use crate::error::StoreError;

/// Everything [`persist_block`] writes for one block besides the block row
/// itself. A plain data bag so the store crate doesn't need to depend on
/// `tezos-indexer-fetch`; the sync pipeline assembles this from its own
/// fetch results.
#[derive(Debug, Default)]
pub struct BlockWrite {
    pub operation_groups: Vec<OperationGroup>,
    pub operations: Vec<Operation>,
    pub touched_account_ids: Vec<String>,
    pub baking_rights: Vec<BakingRight>,
    pub endorsing_rights: Vec<EndorsingRight>,
    pub ballots: Vec<Ballot>,
    pub proposals: Vec<Proposal>,
    pub listings: Vec<Listing>,
}

/// Per-block transactional upsert: Block -> OperationGroups -> Operations ->
/// Rights -> Vote subtables -> checkpoint entries (§4.7). Idempotent on
/// natural keys so a retried write after a crash mid-cycle is a no-op.
pub async fn persist_block(pool: &PgPool, block: &Block, aux: &BlockWrite) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;

    insert_block(&mut tx, block).await?;
    for group in &aux.operation_groups {
        insert_operation_group(&mut tx, group).await?;
    }
    for (index, operation) in aux.operations.iter().enumerate() {
        insert_operation(&mut tx, operation, index as i32).await?;
    }
    for right in &aux.baking_rights {
        insert_baking_right(&mut tx, right).await?;
    }
    for right in &aux.endorsing_rights {
        insert_endorsing_right(&mut tx, right).await?;
    }
    for ballot in &aux.ballots {
        insert_ballot(&mut tx, ballot).await?;
    }
    for proposal in &aux.proposals {
        insert_proposal(&mut tx, proposal).await?;
    }
    for listing in &aux.listings {
        insert_listing(&mut tx, listing).await?;
    }
    for account_id in &aux.touched_account_ids {
        enqueue_account_checkpoint(&mut tx, account_id, &block.hash, block.level).await?;
    }
    if let Some(baker) = &block.baker {
        enqueue_delegate_checkpoint(&mut tx, baker, &block.hash, block.level).await?;
    }

    tx.commit().await?;
    Ok(())
}

async fn insert_block(tx: &mut Transaction<'_, Postgres>, block: &Block) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO blocks (level, hash, predecessor, timestamp, proto, fitness, context, \
         signature, protocol, chain_id, operations_hash, period_kind, current_expected_quorum, \
         active_proposal, baker, consumed_gas, meta_level, meta_level_position, meta_cycle, \
         meta_cycle_position, meta_voting_period, meta_voting_period_position, priority) \
         VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19,$20,$21,$22,$23) \
         ON CONFLICT (hash) DO NOTHING",
    )
    .bind(block.level)
    .bind(&block.hash)
    .bind(&block.predecessor)
    .bind(block.timestamp)
    .bind(block.proto)
    .bind(&block.fitness)
    .bind(&block.context)
    .bind(&block.signature)
    .bind(&block.protocol)
    .bind(&block.chain_id)
    .bind(&block.operations_hash)
    .bind(&block.period_kind)
    .bind(block.current_expected_quorum)
    .bind(&block.active_proposal)
    .bind(&block.baker)
    .bind(block.consumed_gas)
    .bind(block.meta_level)
    .bind(block.meta_level_position)
    .bind(block.meta_cycle)
    .bind(block.meta_cycle_position)
    .bind(block.meta_voting_period)
    .bind(block.meta_voting_period_position)
    .bind(block.priority)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_operation_group(
    tx: &mut Transaction<'_, Postgres>,
    group: &OperationGroup,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO operation_groups (hash, branch, signature, protocol, chain_id, block_id, block_level) \
         VALUES ($1,$2,$3,$4,$5,$6,$7) ON CONFLICT (hash) DO NOTHING",
    )
    .bind(&group.hash)
    .bind(&group.branch)
    .bind(&group.signature)
    .bind(&group.protocol)
    .bind(&group.chain_id)
    .bind(&group.block_id)
    .bind(group.block_level)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_operation(
    tx: &mut Transaction<'_, Postgres>,
    operation: &Operation,
    index_in_group: i32,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO operations (operation_group_hash, index_in_group, kind, source, destination, \
         amount, fee, gas_limit, storage_limit, parameters, script, storage, status, ballot, \
         proposal, delegate, block_hash, block_level, timestamp, cycle, internal) \
         VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19,$20,$21) \
         ON CONFLICT (operation_group_hash, index_in_group) DO NOTHING",
    )
    .bind(&operation.operation_group_hash)
    .bind(index_in_group)
    .bind(operation.kind.as_str())
    .bind(&operation.source)
    .bind(&operation.destination)
    .bind(operation.amount)
    .bind(operation.fee)
    .bind(operation.gas_limit)
    .bind(operation.storage_limit)
    .bind(&operation.parameters)
    .bind(&operation.script)
    .bind(&operation.storage)
    .bind(&operation.status)
    .bind(&operation.ballot)
    .bind(&operation.proposal)
    .bind(&operation.delegate)
    .bind(&operation.block_hash)
    .bind(operation.block_level)
    .bind(operation.timestamp)
    .bind(operation.cycle)
    .bind(operation.internal)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_baking_right(
    tx: &mut Transaction<'_, Postgres>,
    right: &BakingRight,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO baking_rights (block_level, delegate, priority, estimated_time) \
         VALUES ($1,$2,$3,$4) ON CONFLICT (block_level, delegate) DO NOTHING",
    )
    .bind(right.block_level)
    .bind(&right.delegate)
    .bind(right.priority)
    .bind(right.estimated_time)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_endorsing_right(
    tx: &mut Transaction<'_, Postgres>,
    right: &EndorsingRight,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO endorsing_rights (block_level, delegate, slots, estimated_time) \
         VALUES ($1,$2,$3,$4) ON CONFLICT (block_level, delegate) DO NOTHING",
    )
    .bind(right.block_level)
    .bind(&right.delegate)
    .bind(&right.slots)
    .bind(right.estimated_time)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_ballot(
    tx: &mut Transaction<'_, Postgres>,
    ballot: &Ballot,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO ballots (pkh, ballot_period, ballot, block_id, block_level) \
         VALUES ($1,$2,$3,$4,$5) ON CONFLICT (pkh, ballot_period, block_level) DO NOTHING",
    )
    .bind(&ballot.pkh)
    .bind(ballot.ballot_period)
    .bind(&ballot.ballot)
    .bind(&ballot.block_id)
    .bind(ballot.block_level)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_proposal(
    tx: &mut Transaction<'_, Postgres>,
    proposal: &Proposal,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO proposals (block_id, block_level, proposal_hash, supporters_count) \
         VALUES ($1,$2,$3,$4) ON CONFLICT (proposal_hash, block_level) DO UPDATE SET \
         supporters_count = EXCLUDED.supporters_count",
    )
    .bind(&proposal.block_id)
    .bind(proposal.block_level)
    .bind(&proposal.proposal_hash)
    .bind(proposal.supporters_count)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_listing(
    tx: &mut Transaction<'_, Postgres>,
    listing: &Listing,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO listings (pkh, voting_power, block_id, block_level) \
         VALUES ($1,$2,$3,$4) ON CONFLICT (pkh, block_level) DO UPDATE SET \
         voting_power = EXCLUDED.voting_power",
    )
    .bind(&listing.pkh)
    .bind(listing.voting_power)
    .bind(&listing.block_id)
    .bind(listing.block_level)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn enqueue_account_checkpoint(
    tx: &mut Transaction<'_, Postgres>,
    account_id: &str,
    block_id: &str,
    block_level: tezos_indexer_types::Level,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO accounts_checkpoint (account_id, block_id, block_level) \
         VALUES ($1,$2,$3) ON CONFLICT (account_id, block_level) DO NOTHING",
    )
    .bind(account_id)
    .bind(block_id)
    .bind(block_level)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
