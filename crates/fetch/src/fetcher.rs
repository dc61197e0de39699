use std::sync::Arc;

use bytes::Bytes;
use tezos_indexer_rpc::RpcClient;

use crate::error::FetchError;

/// A two-step contract: `fetch: [In] -> [(In, Encoded)]` then
/// `decode: Encoded -> Out`, parametrised by input key and output record
/// type (§4.3). Both halves are boxed closures so the same shape covers a
/// block fetcher (path keyed on offset), an account fetcher (path keyed on
/// account id), and everything in between.
#[derive(Clone)]
pub struct Fetcher<In, Out> {
    path_for: Arc<dyn Fn(&In) -> String + Send + Sync>,
    decode: Arc<dyn Fn(&In, &[u8]) -> Result<Out, FetchError> + Send + Sync>,
}

impl<In, Out> Fetcher<In, Out>
where
    In: Clone + Send + 'static,
{
    pub fn new(
        path_for: impl Fn(&In) -> String + Send + Sync + 'static,
        decode: impl Fn(&In, &[u8]) -> Result<Out, FetchError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            path_for: Arc::new(path_for),
            decode: Arc::new(decode),
        }
    }

    /// Runs the full fetch-then-decode contract over a batch of inputs with
    /// bounded concurrency, preserving per-input pairing.
    pub async fn fetch_all(
        &self,
        client: &RpcClient,
        inputs: Vec<In>,
        concurrency: usize,
    ) -> Vec<(In, Result<Out, FetchError>)> {
        let path_for = self.path_for.clone();
        let results = client
            .batched_get(inputs, move |input| path_for(input), concurrency)
            .await;

        results
            .into_iter()
            .map(|(input, body)| {
                let decoded = body
                    .map_err(FetchError::from)
                    .and_then(|bytes: Bytes| (self.decode)(&input, &bytes));
                (input, decoded)
            })
            .collect()
    }
}

/// Combinator: lets a single fetched body feed two decoders (§4.3), e.g.
/// operation groups and the touched-account-ids extracted from the same
/// `blocks/{hash}/operations` body.
pub fn decode_both<In, A, B>(
    decode_a: impl Fn(&In, &[u8]) -> Result<A, FetchError> + Send + Sync + 'static,
    decode_b: impl Fn(&In, &[u8]) -> Result<B, FetchError> + Send + Sync + 'static,
) -> impl Fn(&In, &[u8]) -> Result<(A, B), FetchError> + Send + Sync + 'static {
    move |input: &In, body: &[u8]| {
        let a = decode_a(input, body)?;
        let b = decode_b(input, body)?;
        Ok((a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use std::time::Duration;

    #[tokio::test]
    async fn fetches_and_decodes_preserving_pairing() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/item/0"))
                .respond_with(status_code(200).body("5")),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/item/1"))
                .respond_with(status_code(200).body("7")),
        );

        let client = RpcClient::with_base_url(format!("http://{}/", server.addr()), Duration::from_secs(5));
        let fetcher: Fetcher<u64, i64> = Fetcher::new(
            |n: &u64| format!("item/{n}"),
            |_n: &u64, body: &[u8]| {
                std::str::from_utf8(body)
                    .unwrap()
                    .parse::<i64>()
                    .map_err(|_| FetchError::Rpc(tezos_indexer_rpc::RpcError::Status {
                        url: "n/a".into(),
                        status: 0,
                    }))
            },
        );

        let results = fetcher.fetch_all(&client, vec![0, 1], 2).await;
        let mut by_input: Vec<_> = results.into_iter().collect();
        by_input.sort_by_key(|(n, _)| *n);
        assert_eq!(by_input[0].1.as_ref().unwrap(), &5);
        assert_eq!(by_input[1].1.as_ref().unwrap(), &7);
    }

    #[test]
    fn decode_both_combines_two_decoders_over_one_body() {
        let combined = decode_both::<(), i64, String>(
            |_: &(), body: &[u8]| Ok(body.len() as i64),
            |_: &(), body: &[u8]| Ok(String::from_utf8_lossy(body).to_string()),
        );
        let (len, text) = combined(&(), b"hello").unwrap();
        assert_eq!(len, 5);
        assert_eq!(text, "hello");
    }
}
