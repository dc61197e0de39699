use backon::{ExponentialBuilder, Retryable};
use sqlx::PgPool;
use tezos_indexer_config::IndexerConfig;
use tezos_indexer_decode::DecodeError;
use tezos_indexer_fetch::FetchError;
use tezos_indexer_rpc::RpcClient;
use tokio_util::sync::CancellationToken;

use crate::error::SyncError;
use crate::{checkpoint, walker};

/// The Lorre loop (§4.8): FETCH_HEAD -> COMPARE -> (idle sleep | REORG_CHECK
/// -> WALK -> DRAIN_ACCOUNTS -> FEES -> SLEEP_IDLE), with SLEEP_BACKOFF on
/// error. Mirrors the teacher's poll-loop shape (`L1Watcher::poll`) with
/// `backon` for retry and a `CancellationToken` for graceful shutdown.
pub struct Orchestrator {
    config: IndexerConfig,
    client: RpcClient,
    pool: PgPool,
    cancel: CancellationToken,
}

enum CycleOutcome {
    Idle,
    Progressed,
}

impl Orchestrator {
    pub fn new(config: IndexerConfig, client: RpcClient, pool: PgPool) -> Self {
        Self {
            config,
            client,
            pool,
            cancel: CancellationToken::new(),
        }
    }

    /// A cancellation handle a caller can hand to a signal listener, or
    /// trigger directly in tests.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the loop until cancelled or an unrecoverable error occurs
    /// (§7.6: an unknown operation kind halts the loop; everything else
    /// logs and backs off).
    pub async fn run(&self) -> Result<(), SyncError> {
        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("shutdown requested, exiting after current cycle");
                return Ok(());
            }

            match self.run_cycle_with_retry().await {
                Ok(CycleOutcome::Idle) => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.idle_interval) => {}
                        _ = self.cancel.cancelled() => return Ok(()),
                    }
                }
                Ok(CycleOutcome::Progressed) => {}
                Err(err) if is_fatal(&err) => {
                    tracing::error!(error = %err, "unrecoverable error, halting");
                    return Err(err);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "cycle failed after retries, backing off");
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.backoff_max) => {}
                        _ = self.cancel.cancelled() => return Ok(()),
                    }
                }
            }
        }
    }

    /// One FETCH_HEAD..SLEEP_IDLE cycle, retried up to `max_retries` times
    /// with exponential backoff (§7.1) before being reported as failed.
    async fn run_cycle_with_retry(&self) -> Result<CycleOutcome, SyncError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.config.backoff_initial)
            .with_max_delay(self.config.backoff_max)
            .with_max_times(self.config.max_retries);

        (|| self.run_cycle())
            .retry(backoff)
            .when(|err: &SyncError| !is_fatal(err))
            .await
    }

    async fn run_cycle(&self) -> Result<CycleOutcome, SyncError> {
        let head_body = self.client.get("blocks/head").await?;
        let head = tezos_indexer_decode::decode_block(&head_body)?;

        let known_top = tezos_indexer_store::max_stored_level(&self.pool).await?;
        if known_top == Some(head.level) {
            tracing::debug!(level = head.level, "caught up with chain head");
            return Ok(CycleOutcome::Idle);
        }

        let reorg = walker::reorg_check(&self.pool, &self.client, &head.hash, head.level).await?;
        let known_top = match reorg {
            Some(matching_level) => {
                tracing::warn!(matching_level, "reorg detected, rolled back stored rows");
                matching_level
            }
            None => known_top.unwrap_or(-1),
        };
        let persisted = walker::walk(
            &self.pool,
            &self.client,
            &head.hash,
            head.level,
            known_top,
            self.config.batch_size,
            self.config.fetch_concurrency,
        )
        .await?;
        tracing::info!(persisted, level = head.level, "indexing cycle progressed");

        checkpoint::drain_accounts(&self.pool, &self.client, self.config.accounts_fetch_concurrency).await?;
        checkpoint::drain_delegates(&self.pool, &self.client, self.config.accounts_fetch_concurrency).await?;
        tezos_indexer_store::aggregate_fees(&self.pool, self.config.fee_window as i64).await?;

        Ok(CycleOutcome::Progressed)
    }
}

/// An unknown operation kind is the one error §7.6 says must halt the loop
/// rather than retry; everything else is recoverable.
fn is_fatal(err: &SyncError) -> bool {
    matches!(
        err,
        SyncError::Fetch(FetchError::Decode(DecodeError::UnknownKind(_)))
            | SyncError::Decode(DecodeError::UnknownKind(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_is_the_only_fatal_variant() {
        let fatal = SyncError::Decode(DecodeError::UnknownKind(
            tezos_indexer_types::UnknownOperationKind("xyz".to_string()),
        ));
        assert!(is_fatal(&fatal));

        let recoverable = SyncError::Store(tezos_indexer_store::StoreError::from(
            sqlx::Error::RowNotFound,
        ));
        assert!(!is_fatal(&recoverable));
    }
}
