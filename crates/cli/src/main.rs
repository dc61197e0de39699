use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tezos_indexer_config::IndexerConfig;
use tezos_indexer_rpc::RpcClient;
use tezos_indexer_sync::Orchestrator;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Parses config, initializes tracing, runs the orchestrator to
/// completion, and maps the outcome to a process exit code (§6): 0 on
/// graceful shutdown, non-zero on unrecoverable config/DB/decode error.
#[tokio::main]
async fn main() -> ExitCode {
    let config = IndexerConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "indexer exited with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: IndexerConfig) -> anyhow::Result<()> {
    let client = RpcClient::new(&config.node, REQUEST_TIMEOUT)?;
    let pool = tezos_indexer_store::connect(&config.database_url).await?;
    let orchestrator = Orchestrator::new(config, client, pool);

    let cancel = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("ctrl-c received, shutting down gracefully");
            cancel.cancel();
        }
    });

    orchestrator.run().await?;
    Ok(())
}
