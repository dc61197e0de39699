//! Layered configuration for the indexer: a YAML file on disk, overridden by
//! CLI flags and environment variables (mirrors the teacher's `clap` +
//! `serde_yaml` combination in its `cli` crate).

mod defaults;
mod node;

pub use node::NodeConfig;

use std::path::Path;
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// The full set of options the indexing core consumes (§6).
///
/// The same struct is used both as a `clap::Parser` (for CLI overrides) and
/// as a `serde::Deserialize` target (for the on-disk YAML config), so a
/// field present in the file but omitted on the command line still takes
/// effect, and vice versa.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "tezos-indexer", about = "Tezos chain indexer")]
pub struct IndexerConfig {
    /// Identifies the Tezos chain being indexed (informational, used in logs).
    #[arg(long, env = "TEZOS_INDEXER_NETWORK", default_value_t = defaults::network())]
    #[serde(default = "defaults::network")]
    pub network: String,

    #[command(flatten)]
    #[serde(default)]
    pub node: NodeConfig,

    /// Parallel RPC fan-out for blocks/operations.
    #[arg(long, env = "TEZOS_INDEXER_FETCH_CONCURRENCY", default_value_t = defaults::fetch_concurrency())]
    #[serde(default = "defaults::fetch_concurrency")]
    pub fetch_concurrency: usize,

    /// Parallel RPC fan-out for account/delegate checkpoint drains.
    #[arg(long, env = "TEZOS_INDEXER_ACCOUNTS_FETCH_CONCURRENCY", default_value_t = defaults::accounts_fetch_concurrency())]
    #[serde(default = "defaults::accounts_fetch_concurrency")]
    pub accounts_fetch_concurrency: usize,

    /// Number of blocks fetched per walker batch.
    #[arg(long, env = "TEZOS_INDEXER_BATCH_SIZE", default_value_t = defaults::batch_size())]
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    /// How long to sleep between cycles when caught up with the chain head.
    #[arg(long, value_parser = parse_duration, env = "TEZOS_INDEXER_IDLE_INTERVAL", default_value = "5s")]
    #[serde(default = "defaults::idle_interval", with = "humantime_duration")]
    pub idle_interval: Duration,

    /// Number of trailing operations considered in one fee aggregation (§4.6).
    #[arg(long, env = "TEZOS_INDEXER_FEE_WINDOW", default_value_t = defaults::fee_window())]
    #[serde(default = "defaults::fee_window")]
    pub fee_window: usize,

    /// Postgres connection string for the persistence layer.
    #[arg(long, env = "DATABASE_URL", default_value_t = defaults::database_url())]
    #[serde(default = "defaults::database_url")]
    pub database_url: String,

    /// Transport-error retries per cycle before the cycle is failed (§7.1).
    #[arg(long, env = "TEZOS_INDEXER_MAX_RETRIES", default_value_t = defaults::max_retries())]
    #[serde(default = "defaults::max_retries")]
    pub max_retries: usize,

    /// Initial backoff delay after a failed cycle.
    #[arg(long, value_parser = parse_duration, env = "TEZOS_INDEXER_BACKOFF_INITIAL", default_value = "1s")]
    #[serde(default = "defaults::backoff_initial", with = "humantime_duration")]
    pub backoff_initial: Duration,

    /// Upper bound on the exponential backoff delay.
    #[arg(long, value_parser = parse_duration, env = "TEZOS_INDEXER_BACKOFF_MAX", default_value = "60s")]
    #[serde(default = "defaults::backoff_max", with = "humantime_duration")]
    pub backoff_max: Duration,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            network: defaults::network(),
            node: NodeConfig::default(),
            fetch_concurrency: defaults::fetch_concurrency(),
            accounts_fetch_concurrency: defaults::accounts_fetch_concurrency(),
            batch_size: defaults::batch_size(),
            idle_interval: defaults::idle_interval(),
            fee_window: defaults::fee_window(),
            database_url: defaults::database_url(),
            max_retries: defaults::max_retries(),
            backoff_initial: defaults::backoff_initial(),
            backoff_max: defaults::backoff_max(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl IndexerConfig {
    /// Loads the YAML config at `path` as the base layer. Callers overlay
    /// CLI-provided values on top (see `tezos-indexer` binary's `main.rs`).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let contents =
            std::fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
                path: path_ref.display().to_string(),
                source,
            })?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path_ref.display().to_string(),
            source,
        })
    }
}

fn parse_duration(raw: &str) -> Result<Duration, String> {
    humantime::parse_duration(raw).map_err(|e| e.to_string())
}

mod humantime_duration {
    use super::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_spec() {
        let config = IndexerConfig::default();
        assert_eq!(config.fetch_concurrency, 5);
        assert_eq!(config.accounts_fetch_concurrency, 5);
        assert_eq!(config.batch_size, 500);
        assert_eq!(config.idle_interval, Duration::from_secs(5));
        assert_eq!(config.fee_window, 1000);
    }

    #[test]
    fn loads_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "network: mainnet\nnode:\n  protocol: https\n  host: node.example\n  port: 443\n  path_prefix: \"\"\nfetch_concurrency: 10\naccounts_fetch_concurrency: 5\nbatch_size: 500\nidle_interval: \"5s\"\nfee_window: 1000\ndatabase_url: \"postgres://localhost/tezos\"\nmax_retries: 5\nbackoff_initial: \"1s\"\nbackoff_max: \"60s\"\n"
        )
        .unwrap();

        let config = IndexerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.network, "mainnet");
        assert_eq!(config.node.host, "node.example");
        assert_eq!(config.fetch_concurrency, 10);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = IndexerConfig::from_file("/nonexistent/path/config.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
