//! Bounded-concurrency batched HTTP GET against a Tezos node's JSON RPC
//! (§4.1). Built on `reqwest` + `futures::stream::buffer_unordered`, in the
//! teacher's style of composing `tokio`/`futures` rather than hand-rolling a
//! scheduler (see `L1Watcher::poll` in the teacher's `l1_sidecar` crate).

use std::time::Duration;

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use tezos_indexer_config::NodeConfig;

/// Errors a single RPC call can fail with. No retries happen at this layer
/// (§4.1) — retry policy is the orchestrator's job.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("transport error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("non-2xx response ({status}) fetching {url}")]
    Status { url: String, status: u16 },
}

/// A thin connection-pooled client against one Tezos node.
///
/// `reqwest::Client` is cheaply cloneable and already pools connections
/// internally, so `RpcClient` just owns one plus the resolved base URL.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    base_url: String,
}

impl RpcClient {
    pub fn new(node: &NodeConfig, request_timeout: Duration) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|source| RpcError::Transport {
                url: node.base_url(),
                source,
            })?;
        Ok(Self {
            http,
            base_url: node.base_url(),
        })
    }

    /// Used by tests to point at an `httptest` server instead of a resolved
    /// [`NodeConfig`].
    pub fn with_base_url(base_url: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(request_timeout)
                .build()
                .expect("reqwest client builder is infallible for default settings"),
            base_url: base_url.into(),
        }
    }

    fn resolve(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetches one path, returning the raw response body.
    pub async fn get(&self, path: &str) -> Result<Bytes, RpcError> {
        let url = self.resolve(path);
        let response = self.http.get(&url).send().await.map_err(|source| {
            tracing::warn!(%url, error = %source, "transport error fetching node endpoint");
            RpcError::Transport {
                url: url.clone(),
                source,
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "non-2xx response from node");
            return Err(RpcError::Status {
                url,
                status: status.as_u16(),
            });
        }
        response.bytes().await.map_err(|source| RpcError::Transport { url, source })
    }

    /// `BatchedGet(inputs[], url(input) -> path, concurrency)` (§4.1).
    ///
    /// Issues up to `concurrency` GETs in flight and preserves the pairing
    /// between each input and its result. Each input's outcome is returned
    /// independently — callers that need "fail the whole batch on any
    /// error" semantics (authoritative data, §7.1/§7.2) use
    /// [`require_all`]; callers that tolerate partial failure (§7.3, §4.5)
    /// inspect the per-item `Result`s directly.
    pub async fn batched_get<In, F>(
        &self,
        inputs: Vec<In>,
        path_for: F,
        concurrency: usize,
    ) -> Vec<(In, Result<Bytes, RpcError>)>
    where
        In: Clone + Send + 'static,
        F: Fn(&In) -> String,
    {
        let concurrency = concurrency.max(1);
        stream::iter(inputs.into_iter().map(|input| {
            let path = path_for(&input);
            let client = self.clone();
            async move {
                let result = client.get(&path).await;
                (input, result)
            }
        }))
        .buffer_unordered(concurrency)
        .collect::<Vec<_>>()
        .await
    }
}

/// Collapses a batch result into "fail the whole batch on the first error"
/// semantics, used for authoritative endpoints (blocks, operation groups).
pub fn require_all<In>(
    results: Vec<(In, Result<Bytes, RpcError>)>,
) -> Result<Vec<(In, Bytes)>, RpcError> {
    let mut out = Vec::with_capacity(results.len());
    for (input, result) in results {
        out.push((input, result?));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    #[tokio::test]
    async fn batched_get_preserves_pairing_and_concurrency_bound() {
        let server = Server::run();
        for n in 0..4u64 {
            server.expect(
                Expectation::matching(request::method_path(
                    "GET",
                    format!("/blocks/head~{n}"),
                ))
                .respond_with(status_code(200).body(format!("body-{n}"))),
            );
        }

        let client = RpcClient::with_base_url(
            format!("http://{}/", server.addr()),
            Duration::from_secs(5),
        );
        let inputs: Vec<u64> = (0..4).collect();
        let results = client
            .batched_get(inputs, |n| format!("blocks/head~{n}"), 2)
            .await;

        assert_eq!(results.len(), 4);
        for (n, result) in results {
            let body = result.unwrap();
            assert_eq!(body, Bytes::from(format!("body-{n}")));
        }
    }

    #[tokio::test]
    async fn non_2xx_is_a_status_error_for_that_item_only() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/blocks/head~0"))
                .respond_with(status_code(200).body("ok")),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/blocks/head~1"))
                .respond_with(status_code(500)),
        );

        let client = RpcClient::with_base_url(
            format!("http://{}/", server.addr()),
            Duration::from_secs(5),
        );
        let results = client
            .batched_get(vec![0u64, 1], |n| format!("blocks/head~{n}"), 2)
            .await;

        let mut by_input: Vec<_> = results.into_iter().collect();
        by_input.sort_by_key(|(n, _)| *n);
        assert!(by_input[0].1.is_ok());
        assert!(matches!(by_input[1].1, Err(RpcError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn require_all_fails_on_first_error() {
        let ok: Result<Bytes, RpcError> = Ok(Bytes::from_static(b"a"));
        let err: Result<Bytes, RpcError> = Err(RpcError::Status {
            url: "http://x/1".into(),
            status: 404,
        });
        let result = require_all(vec![(0u64, ok), (1u64, err)]);
        assert!(result.is_err());
    }
}
