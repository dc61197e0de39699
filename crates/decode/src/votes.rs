use serde::Deserialize;
use tezos_indexer_types::{Ballot, Level, Listing, Proposal};

use crate::tolerant::{tolerant_list, tolerant_scalar};

/// Decodes `blocks/{hash}/votes/current_proposal`: a quoted proposal hash
/// while one is under discussion, or an empty/`null` body between
/// proposal periods.
pub fn decode_current_proposal(body: &[u8]) -> Option<String> {
    tolerant_scalar::<String>("current_proposal", body)
}

#[derive(Debug, Deserialize)]
struct RawBallot {
    pkh: String,
    ballot: String,
}

/// Decodes `blocks/{hash}/votes/ballot_list`. Tolerant, like the rights
/// decoders. `ballot_period`/`block_id`/`block_level` come from the block
/// being indexed, not the response body.
pub fn decode_ballots(body: &[u8], ballot_period: i32, block_id: &str, block_level: Level) -> Vec<Ballot> {
    tolerant_list::<RawBallot>("ballot_list", body)
        .into_iter()
        .map(|b| Ballot {
            pkh: b.pkh,
            ballot_period,
            ballot: b.ballot,
            block_id: block_id.to_string(),
            block_level,
        })
        .collect()
}

/// Decodes `blocks/{hash}/votes/proposals`, a list of `[proposal_hash, supporters_count]` pairs.
pub fn decode_proposals(body: &[u8], block_id: &str, block_level: Level) -> Vec<Proposal> {
    tolerant_list::<(String, i64)>("proposals", body)
        .into_iter()
        .map(|(proposal_hash, supporters_count)| Proposal {
            block_id: block_id.to_string(),
            block_level,
            proposal_hash,
            supporters_count,
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawListing {
    pkh: String,
    #[serde(alias = "rolls")]
    voting_power: i64,
}

/// Decodes `blocks/{hash}/votes/listings`. The field has been renamed
/// `voting_power` in newer protocol versions but still arrives as `rolls`
/// in older ones; both are accepted.
pub fn decode_listings(body: &[u8], block_id: &str, block_level: Level) -> Vec<Listing> {
    tolerant_list::<RawListing>("listings", body)
        .into_iter()
        .map(|l| Listing {
            pkh: l.pkh,
            voting_power: l.voting_power,
            block_id: block_id.to_string(),
            block_level,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_ballots() {
        let body = br#"[{"pkh": "tz1a", "ballot": "yay"}]"#;
        let ballots = decode_ballots(body, 3, "BLhash", 100);
        assert_eq!(ballots.len(), 1);
        assert_eq!(ballots[0].ballot, "yay");
        assert_eq!(ballots[0].ballot_period, 3);
    }

    #[test]
    fn decodes_proposals_tuples() {
        let body = br#"[["PsProposalHash", 120], ["PsOtherHash", 5]]"#;
        let proposals = decode_proposals(body, "BLhash", 100);
        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0].proposal_hash, "PsProposalHash");
        assert_eq!(proposals[0].supporters_count, 120);
    }

    #[test]
    fn decodes_listings_with_legacy_rolls_field() {
        let body = br#"[{"pkh": "tz1a", "rolls": 42}]"#;
        let listings = decode_listings(body, "BLhash", 100);
        assert_eq!(listings[0].voting_power, 42);
    }

    #[test]
    fn tolerates_empty_bodies() {
        assert!(decode_ballots(b"", 1, "BLhash", 1).is_empty());
        assert!(decode_proposals(b"\"\"", "BLhash", 1).is_empty());
        assert!(decode_listings(b"", "BLhash", 1).is_empty());
    }

    #[test]
    fn decodes_current_proposal() {
        assert_eq!(decode_current_proposal(b"\"PsProposalHash\""), Some("PsProposalHash".to_string()));
        assert_eq!(decode_current_proposal(b"null"), None);
        assert_eq!(decode_current_proposal(b""), None);
    }
}
