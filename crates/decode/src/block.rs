use chrono::{DateTime, Utc};
use serde::Deserialize;
use tezos_indexer_types::{Block, Level};

use crate::error::DecodeError;

/// Mirrors the shape of `GET blocks/{hash}~{n}`. Block data is authoritative
/// (§7.2): a malformed body fails the whole cycle rather than being
/// tolerated.
#[derive(Debug, Deserialize)]
struct RawBlock {
    hash: String,
    header: RawHeader,
    metadata: Option<RawMetadata>,
}

#[derive(Debug, Deserialize)]
struct RawHeader {
    level: Level,
    predecessor: String,
    timestamp: DateTime<Utc>,
    proto: i32,
    fitness: Vec<String>,
    context: String,
    signature: Option<String>,
    priority: Option<i32>,
}

#[derive(Debug, Deserialize, Default)]
struct RawMetadata {
    protocol: Option<String>,
    chain_id: Option<String>,
    operations_hash: Option<String>,
    #[serde(default)]
    voting_period_kind: Option<String>,
    #[serde(default)]
    baker: Option<String>,
    #[serde(default)]
    consumed_gas: Option<String>,
    #[serde(default)]
    level_info: Option<RawLevelInfo>,
    #[serde(default)]
    voting_period_info: Option<RawVotingPeriodInfo>,
}

#[derive(Debug, Deserialize, Default)]
struct RawLevelInfo {
    level: Option<i64>,
    level_position: Option<i64>,
    cycle: Option<i64>,
    cycle_position: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
struct RawVotingPeriodInfo {
    voting_period: Option<RawVotingPeriod>,
    position: Option<i64>,
    current_expected_quorum: Option<i32>,
}

#[derive(Debug, Deserialize, Default)]
struct RawVotingPeriod {
    index: Option<i64>,
    kind: Option<String>,
}

/// Decodes a `blocks/{hash}~{n}` response body into a [`Block`].
///
/// Optional metadata fields are absent in some protocol versions (genesis,
/// or protocols that haven't activated voting yet); they decode to `None`
/// rather than erroring (§4.2).
pub fn decode_block(body: &[u8]) -> Result<Block, DecodeError> {
    let raw: RawBlock = serde_json::from_slice(body)?;
    let metadata = raw.metadata.unwrap_or_default();
    let level_info = metadata.level_info.unwrap_or_default();
    let voting_info = metadata.voting_period_info.unwrap_or_default();
    let voting_period = voting_info.voting_period.unwrap_or_default();

    Ok(Block {
        level: raw.header.level,
        hash: raw.hash,
        predecessor: raw.header.predecessor,
        timestamp: raw.header.timestamp,
        proto: raw.header.proto,
        fitness: raw.header.fitness.join(","),
        context: raw.header.context,
        signature: raw.header.signature,
        protocol: metadata.protocol.unwrap_or_default(),
        chain_id: metadata.chain_id.unwrap_or_default(),
        operations_hash: metadata.operations_hash,
        period_kind: voting_period.kind,
        current_expected_quorum: voting_info.current_expected_quorum,
        // Not carried in the block body itself; the fetch pipeline fills
        // this in from a separate `votes/current_proposal` call (see
        // `tezos_indexer_decode::decode_current_proposal`).
        active_proposal: None,
        baker: metadata.baker,
        consumed_gas: metadata.consumed_gas.and_then(|g| g.parse().ok()),
        meta_level: level_info.level,
        meta_level_position: level_info.level_position,
        meta_cycle: level_info.cycle,
        meta_cycle_position: level_info.cycle_position,
        meta_voting_period: voting_period.index,
        meta_voting_period_position: voting_info.position,
        priority: raw.header.priority,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_block_json() -> &'static str {
        r#"{
            "hash": "BLxyz",
            "header": {
                "level": 42,
                "predecessor": "BLabc",
                "timestamp": "2021-01-01T00:00:00Z",
                "proto": 1,
                "fitness": ["01", "02"],
                "context": "CoXyz"
            }
        }"#
    }

    #[test]
    fn decodes_block_with_no_metadata() {
        let block = decode_block(minimal_block_json().as_bytes()).unwrap();
        assert_eq!(block.level, 42);
        assert_eq!(block.hash, "BLxyz");
        assert_eq!(block.predecessor, "BLabc");
        assert_eq!(block.fitness, "01,02");
        assert!(block.baker.is_none());
        assert!(block.meta_cycle.is_none());
    }

    #[test]
    fn decodes_block_with_full_metadata() {
        let json = r#"{
            "hash": "BLxyz",
            "header": {
                "level": 42,
                "predecessor": "BLabc",
                "timestamp": "2021-01-01T00:00:00Z",
                "proto": 5,
                "fitness": ["01"],
                "context": "CoXyz",
                "signature": "sigAbc",
                "priority": 2
            },
            "metadata": {
                "protocol": "PsProto",
                "chain_id": "NetXyz",
                "operations_hash": "LLoAbc",
                "baker": "tz1baker",
                "consumed_gas": "1234",
                "level_info": {
                    "level": 42,
                    "level_position": 41,
                    "cycle": 1,
                    "cycle_position": 10
                },
                "voting_period_info": {
                    "voting_period": { "index": 3, "kind": "proposal" },
                    "position": 5,
                    "current_expected_quorum": 8000
                }
            }
        }"#;
        let block = decode_block(json.as_bytes()).unwrap();
        assert_eq!(block.protocol, "PsProto");
        assert_eq!(block.baker.as_deref(), Some("tz1baker"));
        assert_eq!(block.consumed_gas, Some(1234));
        assert_eq!(block.meta_cycle, Some(1));
        assert_eq!(block.period_kind.as_deref(), Some("proposal"));
        assert_eq!(block.current_expected_quorum, Some(8000));
        assert_eq!(block.priority, Some(2));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = decode_block(b"not json").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }
}
