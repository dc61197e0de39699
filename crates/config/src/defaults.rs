use std::time::Duration;

pub(crate) fn network() -> String {
    "mainnet".to_string()
}

pub(crate) fn node_protocol() -> String {
    "http".to_string()
}

pub(crate) fn node_host() -> String {
    "localhost".to_string()
}

pub(crate) fn node_port() -> u16 {
    8732
}

pub(crate) fn node_path_prefix() -> String {
    String::new()
}

pub(crate) fn fetch_concurrency() -> usize {
    5
}

pub(crate) fn accounts_fetch_concurrency() -> usize {
    5
}

pub(crate) fn batch_size() -> usize {
    500
}

pub(crate) fn idle_interval() -> Duration {
    Duration::from_secs(5)
}

pub(crate) fn fee_window() -> usize {
    1000
}

pub(crate) fn database_url() -> String {
    "postgres://localhost/tezos_indexer".to_string()
}

pub(crate) fn max_retries() -> usize {
    5
}

pub(crate) fn backoff_initial() -> Duration {
    Duration::from_secs(1)
}

pub(crate) fn backoff_max() -> Duration {
    Duration::from_secs(60)
}
