use clap::Args;
use serde::{Deserialize, Serialize};

use crate::defaults;

/// Location of the Tezos node's HTTP/JSON RPC (§6).
///
/// The base URL is composed as `{protocol}://{host}:{port}/{path_prefix}/chains/main/`.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct NodeConfig {
    #[arg(long = "node-protocol", env = "TEZOS_INDEXER_NODE_PROTOCOL", default_value_t = defaults::node_protocol())]
    #[serde(default = "defaults::node_protocol")]
    pub protocol: String,

    #[arg(long = "node-host", env = "TEZOS_INDEXER_NODE_HOST", default_value_t = defaults::node_host())]
    #[serde(default = "defaults::node_host")]
    pub host: String,

    #[arg(long = "node-port", env = "TEZOS_INDEXER_NODE_PORT", default_value_t = defaults::node_port())]
    #[serde(default = "defaults::node_port")]
    pub port: u16,

    #[arg(long = "node-path-prefix", env = "TEZOS_INDEXER_NODE_PATH_PREFIX", default_value_t = defaults::node_path_prefix())]
    #[serde(default = "defaults::node_path_prefix")]
    pub path_prefix: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            protocol: defaults::node_protocol(),
            host: defaults::node_host(),
            port: defaults::node_port(),
            path_prefix: defaults::node_path_prefix(),
        }
    }
}

impl NodeConfig {
    /// The base URL all chain RPC paths are resolved against.
    pub fn base_url(&self) -> String {
        if self.path_prefix.is_empty() {
            format!(
                "{}://{}:{}/chains/main/",
                self.protocol, self.host, self.port
            )
        } else {
            format!(
                "{}://{}:{}/{}/chains/main/",
                self.protocol, self.host, self.port, self.path_prefix
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_base_url_without_path_prefix() {
        let node = NodeConfig {
            protocol: "https".into(),
            host: "mainnet.tezos.example".into(),
            port: 443,
            path_prefix: String::new(),
        };
        assert_eq!(
            node.base_url(),
            "https://mainnet.tezos.example:443/chains/main/"
        );
    }

    #[test]
    fn composes_base_url_with_path_prefix() {
        let node = NodeConfig {
            protocol: "http".into(),
            host: "localhost".into(),
            port: 8732,
            path_prefix: "tezos".into(),
        };
        assert_eq!(node.base_url(), "http://localhost:8732/tezos/chains/main/");
    }
}
