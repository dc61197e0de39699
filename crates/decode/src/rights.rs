use chrono::{DateTime, Utc};
use serde::Deserialize;
use tezos_indexer_types::{BakingRight, EndorsingRight};

use crate::tolerant::tolerant_list;

#[derive(Debug, Deserialize)]
struct RawBakingRight {
    level: i64,
    delegate: String,
    priority: i32,
    #[serde(default)]
    estimated_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawEndorsingRight {
    level: i64,
    delegate: String,
    #[serde(default)]
    slots: Vec<i32>,
    #[serde(default)]
    estimated_time: Option<DateTime<Utc>>,
}

/// Decodes `blocks/{hash}/helpers/baking_rights`. Tolerant (§4.2): an empty
/// or malformed body yields an empty list rather than a decode error.
pub fn decode_baking_rights(body: &[u8]) -> Vec<BakingRight> {
    tolerant_list::<RawBakingRight>("baking_rights", body)
        .into_iter()
        .map(|r| BakingRight {
            block_level: r.level,
            delegate: r.delegate,
            priority: r.priority,
            estimated_time: r.estimated_time,
        })
        .collect()
}

/// Decodes `blocks/{hash}/helpers/endorsing_rights`. Tolerant, like
/// [`decode_baking_rights`].
pub fn decode_endorsing_rights(body: &[u8]) -> Vec<EndorsingRight> {
    tolerant_list::<RawEndorsingRight>("endorsing_rights", body)
        .into_iter()
        .map(|r| EndorsingRight {
            block_level: r.level,
            delegate: r.delegate,
            slots: r.slots,
            estimated_time: r.estimated_time,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_baking_rights() {
        let body = br#"[
            {"level": 100, "delegate": "tz1a", "priority": 0, "estimated_time": "2021-01-01T00:00:00Z"},
            {"level": 100, "delegate": "tz1b", "priority": 1}
        ]"#;
        let rights = decode_baking_rights(body);
        assert_eq!(rights.len(), 2);
        assert_eq!(rights[0].delegate, "tz1a");
        assert!(rights[0].estimated_time.is_some());
        assert!(rights[1].estimated_time.is_none());
    }

    #[test]
    fn decodes_endorsing_rights_with_slots() {
        let body = br#"[{"level": 100, "delegate": "tz1a", "slots": [0, 1, 5]}]"#;
        let rights = decode_endorsing_rights(body);
        assert_eq!(rights[0].slots, vec![0, 1, 5]);
    }

    #[test]
    fn empty_body_yields_empty_rights() {
        assert!(decode_baking_rights(b"").is_empty());
        assert!(decode_endorsing_rights(b"\"\"").is_empty());
    }
}
