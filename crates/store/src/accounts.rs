use sqlx::{PgPool, Postgres, Transaction};
use tezos_indexer_types::{Account, AccountsCheckpointEntry, Delegate, DelegatesCheckpointEntry};

use crate::error::StoreError;

/// Selects each distinct `account_id` in the checkpoint along with its
/// **maximum** `block_level` (§4.5 step 2): the row to re-fetch.
pub async fn accounts_to_drain(pool: &PgPool) -> Result<Vec<AccountsCheckpointEntry>, StoreError> {
    let rows: Vec<(String, String, i64)> = sqlx::query_as(
        "SELECT DISTINCT ON (account_id) account_id, block_id, block_level \
         FROM accounts_checkpoint ORDER BY account_id, block_level DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(account_id, block_id, block_level)| AccountsCheckpointEntry {
            account_id,
            block_id,
            block_level,
        })
        .collect())
}

/// Upserts a freshly fetched [`Account`] row, then prunes checkpoint rows
/// at or below its `block_level` (§4.5 step 3, §3 invariant 4). Runs in its
/// own transaction, separate from block persistence.
pub async fn upsert_account(pool: &PgPool, account: &Account) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO accounts (account_id, block_id, block_level, manager, balance, spendable, \
         delegate_setable, delegate_value, counter, script, storage) \
         VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11) \
         ON CONFLICT (account_id, block_level) DO UPDATE SET \
         block_id = EXCLUDED.block_id, manager = EXCLUDED.manager, balance = EXCLUDED.balance, \
         spendable = EXCLUDED.spendable, delegate_setable = EXCLUDED.delegate_setable, \
         delegate_value = EXCLUDED.delegate_value, counter = EXCLUDED.counter, \
         script = EXCLUDED.script, storage = EXCLUDED.storage",
    )
    .bind(&account.account_id)
    .bind(&account.block_id)
    .bind(account.block_level)
    .bind(&account.manager)
    .bind(account.balance)
    .bind(account.spendable)
    .bind(account.delegate_setable)
    .bind(&account.delegate_value)
    .bind(account.counter)
    .bind(&account.script)
    .bind(&account.storage)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM accounts_checkpoint WHERE account_id = $1 AND block_level <= $2")
        .bind(&account.account_id)
        .bind(account.block_level)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// The delegate analogue of [`accounts_to_drain`], keyed by `pkh` (§4.5).
pub async fn delegates_to_drain(pool: &PgPool) -> Result<Vec<DelegatesCheckpointEntry>, StoreError> {
    let rows: Vec<(String, String, i64)> = sqlx::query_as(
        "SELECT DISTINCT ON (pkh) pkh, block_id, block_level \
         FROM delegates_checkpoint ORDER BY pkh, block_level DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(pkh, block_id, block_level)| DelegatesCheckpointEntry {
            pkh,
            block_id,
            block_level,
        })
        .collect())
}

/// The delegate analogue of [`upsert_account`].
pub async fn upsert_delegate(pool: &PgPool, delegate: &Delegate) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO delegates (pkh, block_id, balance, frozen_balance, staking_balance, \
         delegated_balance, deactivated, grace_period, block_level) \
         VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9) \
         ON CONFLICT (pkh, block_level) DO UPDATE SET \
         block_id = EXCLUDED.block_id, balance = EXCLUDED.balance, \
         frozen_balance = EXCLUDED.frozen_balance, staking_balance = EXCLUDED.staking_balance, \
         delegated_balance = EXCLUDED.delegated_balance, deactivated = EXCLUDED.deactivated, \
         grace_period = EXCLUDED.grace_period",
    )
    .bind(&delegate.pkh)
    .bind(&delegate.block_id)
    .bind(delegate.balance)
    .bind(delegate.frozen_balance)
    .bind(delegate.staking_balance)
    .bind(delegate.delegated_balance)
    .bind(delegate.deactivated)
    .bind(delegate.grace_period)
    .bind(delegate.block_level)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM delegates_checkpoint WHERE pkh = $1 AND block_level <= $2")
        .bind(&delegate.pkh)
        .bind(delegate.block_level)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Enqueues a delegate checkpoint entry for the block's baker, in the same
/// transaction [`crate::block::persist_block`] writes the rest of the block
/// in (mirrors how it enqueues touched accounts).
pub(crate) async fn enqueue_delegate_checkpoint(
    tx: &mut Transaction<'_, Postgres>,
    pkh: &str,
    block_id: &str,
    block_level: tezos_indexer_types::Level,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO delegates_checkpoint (pkh, block_id, block_level) VALUES ($1,$2,$3) \
         ON CONFLICT (pkh, block_level) DO NOTHING",
    )
    .bind(pkh)
    .bind(block_id)
    .bind(block_level)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
