use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Level;

/// The operation kinds this indexer understands.
///
/// An RPC payload naming a kind outside this set is a fatal decode error
/// (§4.2, §7.6) rather than a silently dropped row: the aggregates built on
/// top (fees, per-kind operation counts) would otherwise silently corrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Endorsement,
    SeedNonceRevelation,
    ActivateAccount,
    Reveal,
    Transaction,
    Origination,
    Delegation,
    DoubleBakingEvidence,
    DoubleEndorsementEvidence,
    Proposals,
    Ballot,
}

impl OperationKind {
    pub const ALL: [OperationKind; 11] = [
        OperationKind::Endorsement,
        OperationKind::SeedNonceRevelation,
        OperationKind::ActivateAccount,
        OperationKind::Reveal,
        OperationKind::Transaction,
        OperationKind::Origination,
        OperationKind::Delegation,
        OperationKind::DoubleBakingEvidence,
        OperationKind::DoubleEndorsementEvidence,
        OperationKind::Proposals,
        OperationKind::Ballot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Endorsement => "endorsement",
            OperationKind::SeedNonceRevelation => "seed_nonce_revelation",
            OperationKind::ActivateAccount => "activate_account",
            OperationKind::Reveal => "reveal",
            OperationKind::Transaction => "transaction",
            OperationKind::Origination => "origination",
            OperationKind::Delegation => "delegation",
            OperationKind::DoubleBakingEvidence => "double_baking_evidence",
            OperationKind::DoubleEndorsementEvidence => "double_endorsement_evidence",
            OperationKind::Proposals => "proposals",
            OperationKind::Ballot => "ballot",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thrown when an RPC payload names an operation kind outside [`OperationKind::ALL`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown operation kind `{0}`")]
pub struct UnknownOperationKind(pub String);

impl FromStr for OperationKind {
    type Err = UnknownOperationKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "endorsement" => OperationKind::Endorsement,
            "seed_nonce_revelation" => OperationKind::SeedNonceRevelation,
            "activate_account" => OperationKind::ActivateAccount,
            "reveal" => OperationKind::Reveal,
            "transaction" => OperationKind::Transaction,
            "origination" => OperationKind::Origination,
            "delegation" => OperationKind::Delegation,
            "double_baking_evidence" => OperationKind::DoubleBakingEvidence,
            "double_endorsement_evidence" => OperationKind::DoubleEndorsementEvidence,
            "proposals" => OperationKind::Proposals,
            "ballot" => OperationKind::Ballot,
            other => return Err(UnknownOperationKind(other.to_string())),
        })
    }
}

/// A signed group of operations sharing one signature, as returned by
/// `blocks/{hash}/operations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationGroup {
    pub hash: String,
    pub branch: String,
    pub signature: Option<String>,
    pub protocol: String,
    pub chain_id: Option<String>,
    pub block_id: String,
    pub block_level: Level,
}

/// A single operation within an [`OperationGroup`].
///
/// Kind-specific fields are optional: a `transaction` populates `amount`,
/// `fee`, `destination`; an `origination` populates `script`/`storage`; most
/// other kinds leave the majority of these `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub operation_id: i64,
    pub operation_group_hash: String,
    pub kind: OperationKind,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub amount: Option<i64>,
    pub fee: Option<i64>,
    pub gas_limit: Option<i64>,
    pub storage_limit: Option<i64>,
    pub parameters: Option<serde_json::Value>,
    pub script: Option<serde_json::Value>,
    pub storage: Option<serde_json::Value>,
    pub status: Option<String>,
    pub ballot: Option<String>,
    pub proposal: Option<String>,
    pub delegate: Option<String>,
    pub block_hash: String,
    pub block_level: Level,
    pub timestamp: DateTime<Utc>,
    pub cycle: Option<i64>,
    pub internal: bool,
}
