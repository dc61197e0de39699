use tezos_indexer_decode::{
    decode_ballots, decode_baking_rights, decode_current_proposal, decode_endorsing_rights,
    decode_listings, decode_operation_groups, decode_proposals, extract_touched_account_ids,
    DecodedOperationGroup,
};
use tezos_indexer_types::{Ballot, BakingRight, EndorsingRight, Listing, Proposal};

use crate::context::BlockContext;
use crate::error::FetchError;
use crate::fetcher::{decode_both, Fetcher};

/// `blocks/{hash}/operations` feeds both the operation-group decoder and
/// the touched-account-id extractor from the same body (§4.3, §4.5 step 1).
pub fn operations_fetcher() -> Fetcher<BlockContext, (Vec<DecodedOperationGroup>, Vec<String>)> {
    Fetcher::new(
        |ctx: &BlockContext| format!("blocks/{}/operations", ctx.hash),
        decode_both(
            |ctx: &BlockContext, body: &[u8]| {
                Ok(decode_operation_groups(body, &ctx.hash, ctx.level, ctx.timestamp)?)
            },
            |_ctx: &BlockContext, body: &[u8]| Ok(extract_touched_account_ids(body)?),
        ),
    )
}

/// `blocks/{hash}/helpers/baking_rights`. Tolerant (§4.2): never returns `Err`.
pub fn baking_rights_fetcher() -> Fetcher<BlockContext, Vec<BakingRight>> {
    Fetcher::new(
        |ctx: &BlockContext| format!("blocks/{}/helpers/baking_rights", ctx.hash),
        |_ctx: &BlockContext, body: &[u8]| Ok(decode_baking_rights(body)),
    )
}

/// `blocks/{hash}/helpers/endorsing_rights`. Tolerant, like [`baking_rights_fetcher`].
pub fn endorsing_rights_fetcher() -> Fetcher<BlockContext, Vec<EndorsingRight>> {
    Fetcher::new(
        |ctx: &BlockContext| format!("blocks/{}/helpers/endorsing_rights", ctx.hash),
        |_ctx: &BlockContext, body: &[u8]| Ok(decode_endorsing_rights(body)),
    )
}

/// `blocks/{hash}/votes/ballot_list`. Tolerant.
pub fn ballots_fetcher() -> Fetcher<BlockContext, Vec<Ballot>> {
    Fetcher::new(
        |ctx: &BlockContext| format!("blocks/{}/votes/ballot_list", ctx.hash),
        |ctx: &BlockContext, body: &[u8]| Ok(decode_ballots(body, ctx.voting_period, &ctx.hash, ctx.level)),
    )
}

/// `blocks/{hash}/votes/proposals`. Tolerant.
pub fn proposals_fetcher() -> Fetcher<BlockContext, Vec<Proposal>> {
    Fetcher::new(
        |ctx: &BlockContext| format!("blocks/{}/votes/proposals", ctx.hash),
        |ctx: &BlockContext, body: &[u8]| Ok(decode_proposals(body, &ctx.hash, ctx.level)),
    )
}

/// `blocks/{hash}/votes/listings`. Tolerant.
pub fn listings_fetcher() -> Fetcher<BlockContext, Vec<Listing>> {
    Fetcher::new(
        |ctx: &BlockContext| format!("blocks/{}/votes/listings", ctx.hash),
        |ctx: &BlockContext, body: &[u8]| Ok(decode_listings(body, &ctx.hash, ctx.level)),
    )
}

/// `blocks/{hash}/votes/current_proposal`. Tolerant; feeds `Block.active_proposal`.
pub fn current_proposal_fetcher() -> Fetcher<BlockContext, Option<String>> {
    Fetcher::new(
        |ctx: &BlockContext| format!("blocks/{}/votes/current_proposal", ctx.hash),
        |_ctx: &BlockContext, body: &[u8]| Ok(decode_current_proposal(body)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use std::time::Duration;
    use tezos_indexer_rpc::RpcClient;

    fn ctx(hash: &str) -> BlockContext {
        BlockContext {
            hash: hash.to_string(),
            level: 100,
            timestamp: Utc::now(),
            voting_period: 3,
        }
    }

    #[tokio::test]
    async fn operations_fetcher_decodes_groups_and_account_ids_from_one_body() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/blocks/BLhash/operations")).respond_with(
                status_code(200).body(
                    r#"[[],[],[],[{"hash":"oog1","branch":"BLbranch","contents":[{"kind":"transaction","source":"tz1a","destination":"tz1b","amount":"10"}]}]]"#,
                ),
            ),
        );
        let client = RpcClient::with_base_url(format!("http://{}/", server.addr()), Duration::from_secs(5));
        let fetcher = operations_fetcher();
        let results = fetcher.fetch_all(&client, vec![ctx("BLhash")], 1).await;
        let (_, result) = &results[0];
        let (groups, account_ids) = result.as_ref().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(account_ids, &vec!["tz1a".to_string(), "tz1b".to_string()]);
    }

    #[tokio::test]
    async fn current_proposal_fetcher_decodes_proposal_hash() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/blocks/BLhash/votes/current_proposal"))
                .respond_with(status_code(200).body("\"PsProposalHash\"")),
        );
        let client = RpcClient::with_base_url(format!("http://{}/", server.addr()), Duration::from_secs(5));
        let fetcher = current_proposal_fetcher();
        let results = fetcher.fetch_all(&client, vec![ctx("BLhash")], 1).await;
        assert_eq!(results[0].1.as_ref().unwrap().as_deref(), Some("PsProposalHash"));
    }

    #[tokio::test]
    async fn rights_fetchers_tolerate_empty_body() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/blocks/BLhash/helpers/baking_rights"))
                .respond_with(status_code(200).body("")),
        );
        let client = RpcClient::with_base_url(format!("http://{}/", server.addr()), Duration::from_secs(5));
        let fetcher = baking_rights_fetcher();
        let results = fetcher.fetch_all(&client, vec![ctx("BLhash")], 1).await;
        assert!(results[0].1.as_ref().unwrap().is_empty());
    }
}
