use tezos_indexer_types::{Ballot, BakingRight, EndorsingRight, Listing, Operation, OperationGroup, Proposal};

use crate::aux::{
    ballots_fetcher, baking_rights_fetcher, current_proposal_fetcher, endorsing_rights_fetcher,
    listings_fetcher, operations_fetcher, proposals_fetcher,
};
use crate::context::BlockContext;
use crate::error::FetchError;
use tezos_indexer_rpc::RpcClient;

/// Everything the persistence layer needs for one block beyond the block
/// row itself: its operation groups/operations, the account ids its
/// operations touched (§4.5 step 1), rights, and vote subtables.
#[derive(Debug, Default)]
pub struct BlockAuxData {
    pub operation_groups: Vec<OperationGroup>,
    pub operations: Vec<Operation>,
    pub touched_account_ids: Vec<String>,
    pub baking_rights: Vec<BakingRight>,
    pub endorsing_rights: Vec<EndorsingRight>,
    pub ballots: Vec<Ballot>,
    pub proposals: Vec<Proposal>,
    pub listings: Vec<Listing>,
    pub current_proposal: Option<String>,
}

/// Fetches and decodes all auxiliary data for one block.
///
/// Operations are authoritative (§7.2): a fetch or decode failure here
/// fails the whole block. Rights and votes are tolerant by construction
/// (their fetchers never return `Err`), so they're simply unwrapped.
pub async fn fetch_block_aux(
    client: &RpcClient,
    ctx: &BlockContext,
) -> Result<BlockAuxData, FetchError> {
    let ops_fetcher = operations_fetcher();
    let (_, ops_result) = ops_fetcher
        .fetch_all(client, vec![ctx.clone()], 1)
        .await
        .into_iter()
        .next()
        .expect("single input yields single result");
    let (groups, touched_account_ids) = ops_result?;

    let (operation_groups, operations): (Vec<_>, Vec<_>) = groups
        .into_iter()
        .map(|g| (g.group, g.operations))
        .unzip();
    let operations = operations.into_iter().flatten().collect();

    let baking_rights = single_result(baking_rights_fetcher().fetch_all(client, vec![ctx.clone()], 1).await);
    let endorsing_rights =
        single_result(endorsing_rights_fetcher().fetch_all(client, vec![ctx.clone()], 1).await);
    let ballots = single_result(ballots_fetcher().fetch_all(client, vec![ctx.clone()], 1).await);
    let proposals = single_result(proposals_fetcher().fetch_all(client, vec![ctx.clone()], 1).await);
    let listings = single_result(listings_fetcher().fetch_all(client, vec![ctx.clone()], 1).await);
    let current_proposal =
        single_result(current_proposal_fetcher().fetch_all(client, vec![ctx.clone()], 1).await).flatten();

    Ok(BlockAuxData {
        operation_groups,
        operations,
        touched_account_ids,
        baking_rights: baking_rights.unwrap_or_default(),
        endorsing_rights: endorsing_rights.unwrap_or_default(),
        ballots: ballots.unwrap_or_default(),
        proposals: proposals.unwrap_or_default(),
        listings: listings.unwrap_or_default(),
        current_proposal,
    })
}

fn single_result<In, Out>(mut results: Vec<(In, Result<Out, FetchError>)>) -> Option<Out> {
    let (_, result) = results.pop()?;
    match result {
        Ok(out) => Some(out),
        Err(err) => {
            tracing::warn!(error = %err, "tolerant aux fetch failed, treating as empty");
            None
        }
    }
}
