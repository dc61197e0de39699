use chrono::{DateTime, Utc};
use serde_json::Value;
use std::str::FromStr;
use tezos_indexer_types::{Level, Operation, OperationGroup, OperationKind};

use crate::error::DecodeError;

/// The node has, across protocol versions, spelled a revealed manager's
/// public key both `managerPubkey` and `manager_pubkey`. We normalise to the
/// canonical snake_case spelling before decoding so downstream code only
/// ever sees one name (§4.2).
fn normalize_manager_pubkey(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if let Some(legacy) = map.remove("managerPubkey") {
                map.insert("manager_pubkey".to_string(), legacy);
            }
            for nested in map.values_mut() {
                normalize_manager_pubkey(nested);
            }
        }
        Value::Array(items) => {
            for item in items {
                normalize_manager_pubkey(item);
            }
        }
        _ => {}
    }
}

fn as_i64(value: Option<&Value>) -> Option<i64> {
    value.and_then(|v| match v {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    })
}

fn as_str(value: Option<&Value>) -> Option<String> {
    value.and_then(|v| v.as_str()).map(str::to_owned)
}

fn operation_status(content: &Value) -> Option<String> {
    content
        .pointer("/metadata/operation_result/status")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
}

fn build_operation(
    content: &Value,
    operation_group_hash: &str,
    block_hash: &str,
    block_level: Level,
    timestamp: DateTime<Utc>,
    cycle: Option<i64>,
    internal: bool,
) -> Result<Operation, DecodeError> {
    let kind_str = content
        .get("kind")
        .and_then(|v| v.as_str())
        .ok_or(DecodeError::MissingField("kind"))?;
    let kind = OperationKind::from_str(kind_str)?;

    Ok(Operation {
        // Assigned by the persistence layer's serial primary key on insert.
        operation_id: 0,
        operation_group_hash: operation_group_hash.to_string(),
        kind,
        source: as_str(content.get("source")),
        destination: as_str(content.get("destination")),
        amount: as_i64(content.get("amount")),
        fee: as_i64(content.get("fee")),
        gas_limit: as_i64(content.get("gas_limit")),
        storage_limit: as_i64(content.get("storage_limit")),
        parameters: content.get("parameters").cloned(),
        script: content.get("script").cloned(),
        storage: content.get("storage").cloned(),
        status: operation_status(content),
        ballot: as_str(content.get("ballot")),
        proposal: content
            .get("proposals")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|v| v.as_str())
            .map(str::to_owned),
        delegate: as_str(content.get("delegate")),
        block_hash: block_hash.to_string(),
        block_level,
        timestamp,
        cycle,
        internal,
    })
}

/// One decoded signed group plus its flattened operations (including
/// internal ones nested under `metadata.internal_operation_results`).
pub struct DecodedOperationGroup {
    pub group: OperationGroup,
    pub operations: Vec<Operation>,
}

/// Decodes one element of the array returned by `blocks/{hash}/operations`
/// (which is itself an array of validation-pass arrays of operation
/// groups) into [`DecodedOperationGroup`]s.
///
/// Operation groups and their operations are authoritative data (§7.2): an
/// unknown `kind` or malformed shape fails the whole decode.
pub fn decode_operation_groups(
    body: &[u8],
    block_hash: &str,
    block_level: Level,
    block_timestamp: DateTime<Utc>,
) -> Result<Vec<DecodedOperationGroup>, DecodeError> {
    let mut root: Value = serde_json::from_slice(body)?;
    normalize_manager_pubkey(&mut root);

    let passes = root.as_array().ok_or(DecodeError::MissingField("operations"))?;
    let mut decoded = Vec::new();

    for pass in passes {
        let groups = pass.as_array().ok_or(DecodeError::MissingField("operations[]"))?;
        for raw_group in groups {
            let hash = raw_group
                .get("hash")
                .and_then(|v| v.as_str())
                .ok_or(DecodeError::MissingField("hash"))?
                .to_string();
            let branch = raw_group
                .get("branch")
                .and_then(|v| v.as_str())
                .ok_or(DecodeError::MissingField("branch"))?
                .to_string();
            let signature = as_str(raw_group.get("signature"));
            let protocol = as_str(raw_group.get("protocol")).unwrap_or_default();
            let chain_id = as_str(raw_group.get("chain_id"));

            let contents = raw_group
                .get("contents")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();

            let mut operations = Vec::with_capacity(contents.len());
            let cycle = raw_group
                .get("contents")
                .and_then(|v| v.as_array())
                .and_then(|c| c.first())
                .and_then(|content| content.pointer("/metadata/operation_result/cycle"))
                .and_then(|v| v.as_i64());

            for content in &contents {
                operations.push(build_operation(
                    content,
                    &hash,
                    block_hash,
                    block_level,
                    block_timestamp,
                    cycle,
                    false,
                )?);

                if let Some(internal_ops) = content
                    .pointer("/metadata/internal_operation_results")
                    .and_then(|v| v.as_array())
                {
                    for internal_content in internal_ops {
                        operations.push(build_operation(
                            internal_content,
                            &hash,
                            block_hash,
                            block_level,
                            block_timestamp,
                            cycle,
                            true,
                        )?);
                    }
                }
            }

            decoded.push(DecodedOperationGroup {
                group: OperationGroup {
                    hash,
                    branch,
                    signature,
                    protocol,
                    chain_id,
                    block_id: block_hash.to_string(),
                    block_level,
                },
                operations,
            });
        }
    }

    Ok(decoded)
}

/// Extracts the distinct account ids referenced by a block's operations
/// (`source` and `destination`), used to seed the accounts checkpoint
/// (§4.5) from the same fetched body as [`decode_operation_groups`] via the
/// `decode_both` combinator in `tezos-indexer-fetch`.
pub fn extract_touched_account_ids(body: &[u8]) -> Result<Vec<String>, DecodeError> {
    let root: Value = serde_json::from_slice(body)?;
    let mut ids = std::collections::BTreeSet::new();

    let passes = root.as_array().ok_or(DecodeError::MissingField("operations"))?;
    for pass in passes {
        let Some(groups) = pass.as_array() else { continue };
        for group in groups {
            let Some(contents) = group.get("contents").and_then(|v| v.as_array()) else {
                continue;
            };
            for content in contents {
                if let Some(source) = content.get("source").and_then(|v| v.as_str()) {
                    ids.insert(source.to_string());
                }
                if let Some(destination) = content.get("destination").and_then(|v| v.as_str()) {
                    ids.insert(destination.to_string());
                }
            }
        }
    }

    Ok(ids.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body() -> Vec<u8> {
        br#"[
            [],
            [],
            [],
            [
                {
                    "hash": "oogroup1",
                    "branch": "BLbranch",
                    "signature": "sigXyz",
                    "protocol": "PsProto",
                    "chain_id": "NetXyz",
                    "contents": [
                        {
                            "kind": "transaction",
                            "source": "tz1src",
                            "destination": "tz1dst",
                            "amount": "1000000",
                            "fee": "500",
                            "gas_limit": "10300",
                            "storage_limit": "0",
                            "metadata": {
                                "operation_result": { "status": "applied" },
                                "internal_operation_results": [
                                    {
                                        "kind": "transaction",
                                        "source": "KT1contract",
                                        "destination": "tz1dst2",
                                        "amount": "500",
                                        "metadata": {
                                            "operation_result": { "status": "applied" }
                                        }
                                    }
                                ]
                            }
                        },
                        {
                            "kind": "reveal",
                            "source": "tz1src",
                            "managerPubkey": "edpkAbc"
                        }
                    ]
                }
            ]
        ]"#
        .to_vec()
    }

    #[test]
    fn decodes_groups_and_flattens_internal_operations() {
        let decoded = decode_operation_groups(
            &sample_body(),
            "BLhash",
            100,
            "2021-01-01T00:00:00Z".parse().unwrap(),
        )
        .unwrap();

        assert_eq!(decoded.len(), 1);
        let group = &decoded[0];
        assert_eq!(group.group.hash, "oogroup1");
        assert_eq!(group.operations.len(), 3);

        let top_level_tx = &group.operations[0];
        assert_eq!(top_level_tx.kind, OperationKind::Transaction);
        assert_eq!(top_level_tx.fee, Some(500));
        assert!(!top_level_tx.internal);
        assert_eq!(top_level_tx.status.as_deref(), Some("applied"));

        let internal_tx = &group.operations[1];
        assert!(internal_tx.internal);
        assert_eq!(internal_tx.source.as_deref(), Some("KT1contract"));

        let reveal = &group.operations[2];
        assert_eq!(reveal.kind, OperationKind::Reveal);
    }

    #[test]
    fn unknown_kind_is_fatal() {
        let body = br#"[[],[],[],[{
            "hash": "oogroup1",
            "branch": "BLbranch",
            "contents": [{ "kind": "teleportation", "source": "tz1x" }]
        }]]"#;
        let err = decode_operation_groups(body, "BLhash", 1, "2021-01-01T00:00:00Z".parse().unwrap())
            .unwrap_err();
        assert!(matches!(err, DecodeError::UnknownKind(_)));
    }

    #[test]
    fn extracts_touched_account_ids_deduplicated() {
        let ids = extract_touched_account_ids(&sample_body()).unwrap();
        assert_eq!(
            ids,
            vec![
                "KT1contract".to_string(),
                "tz1dst".to_string(),
                "tz1dst2".to_string(),
                "tz1src".to_string(),
            ]
        );
    }

    #[test]
    fn empty_operations_body_decodes_to_no_groups() {
        let decoded = decode_operation_groups(
            b"[[],[],[],[]]",
            "BLhash",
            1,
            "2021-01-01T00:00:00Z".parse().unwrap(),
        )
        .unwrap();
        assert!(decoded.is_empty());
    }
}
