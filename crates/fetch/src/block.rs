use tezos_indexer_types::Block;

use crate::error::FetchError;
use crate::fetcher::Fetcher;

/// Builds the `Fetcher<offset, Block>` for one walk: paths are resolved
/// against a fixed chain head hash, offsets counting back from it (§4.4).
pub fn block_fetcher(head_hash: String) -> Fetcher<u64, Block> {
    Fetcher::new(
        move |offset: &u64| Block::offset_path(&head_hash, *offset),
        |_offset: &u64, body: &[u8]| Ok(tezos_indexer_decode::decode_block(body)?),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use std::time::Duration;
    use tezos_indexer_rpc::RpcClient;

    #[tokio::test]
    async fn fetches_blocks_by_offset() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/blocks/BLhead~0"))
                .respond_with(status_code(200).body(
                    r#"{"hash":"BLhead","header":{"level":100,"predecessor":"BLprev","timestamp":"2021-01-01T00:00:00Z","proto":1,"fitness":["01"],"context":"CoXyz"}}"#,
                )),
        );

        let client = RpcClient::with_base_url(format!("http://{}/", server.addr()), Duration::from_secs(5));
        let fetcher = block_fetcher("BLhead".to_string());
        let results = fetcher.fetch_all(&client, vec![0], 1).await;
        let (_offset, block) = &results[0];
        assert_eq!(block.as_ref().unwrap().level, 100);
    }
}
