use serde::Deserialize;
use tezos_indexer_types::{Account, Level};

use crate::error::DecodeError;

#[derive(Debug, Deserialize, Default)]
struct RawDelegateField {
    #[serde(default)]
    setable: Option<bool>,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAccount {
    #[serde(default)]
    manager: Option<String>,
    balance: String,
    #[serde(default)]
    spendable: Option<bool>,
    #[serde(default)]
    delegate: Option<RawDelegateField>,
    #[serde(default)]
    counter: Option<String>,
    #[serde(default)]
    script: Option<serde_json::Value>,
    #[serde(default)]
    storage: Option<serde_json::Value>,
}

/// Decodes `blocks/{hash}/context/contracts/{id}` into an [`Account`] row.
///
/// `account_id`, `block_id` and `block_level` come from the caller (the
/// fetch key and the block being indexed), not the response body.
pub fn decode_account(
    body: &[u8],
    account_id: &str,
    block_id: &str,
    block_level: Level,
) -> Result<Account, DecodeError> {
    let raw: RawAccount = serde_json::from_slice(body)?;
    let delegate = raw.delegate.unwrap_or_default();

    Ok(Account {
        account_id: account_id.to_string(),
        block_id: block_id.to_string(),
        block_level,
        manager: raw.manager,
        balance: raw.balance.parse().unwrap_or(0),
        spendable: raw.spendable,
        delegate_setable: delegate.setable,
        delegate_value: delegate.value,
        counter: raw.counter.and_then(|c| c.parse().ok()),
        script: raw.script,
        storage: raw.storage,
    })
}

#[derive(Debug, Deserialize)]
struct RawDelegate {
    balance: String,
    #[serde(default)]
    frozen_balance: Option<String>,
    #[serde(default)]
    staking_balance: Option<String>,
    #[serde(default)]
    delegated_balance: Option<String>,
    #[serde(default)]
    deactivated: bool,
    #[serde(default)]
    grace_period: Option<i64>,
}

/// Decodes `blocks/{hash}/context/delegates/{pkh}` into a `Delegate` row.
pub fn decode_delegate(
    body: &[u8],
    pkh: &str,
    block_id: &str,
    block_level: Level,
) -> Result<tezos_indexer_types::Delegate, DecodeError> {
    let raw: RawDelegate = serde_json::from_slice(body)?;

    Ok(tezos_indexer_types::Delegate {
        pkh: pkh.to_string(),
        block_id: block_id.to_string(),
        balance: raw.balance.parse().unwrap_or(0),
        frozen_balance: raw.frozen_balance.and_then(|v| v.parse().ok()),
        staking_balance: raw.staking_balance.and_then(|v| v.parse().ok()),
        delegated_balance: raw.delegated_balance.and_then(|v| v.parse().ok()),
        deactivated: raw.deactivated,
        grace_period: raw.grace_period,
        block_level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_account_with_delegate() {
        let json = br#"{
            "manager": "tz1manager",
            "balance": "4000000",
            "spendable": true,
            "delegate": { "setable": true, "value": "tz1baker" },
            "counter": "12"
        }"#;
        let account = decode_account(json, "tz1xyz", "BLhash", 100).unwrap();
        assert_eq!(account.account_id, "tz1xyz");
        assert_eq!(account.balance, 4_000_000);
        assert_eq!(account.delegate_value.as_deref(), Some("tz1baker"));
        assert_eq!(account.counter, Some(12));
    }

    #[test]
    fn decodes_minimal_account() {
        let json = br#"{ "balance": "0" }"#;
        let account = decode_account(json, "tz1xyz", "BLhash", 1).unwrap();
        assert_eq!(account.balance, 0);
        assert!(account.manager.is_none());
        assert!(account.delegate_value.is_none());
    }

    #[test]
    fn decodes_delegate() {
        let json = br#"{
            "balance": "1000000",
            "frozen_balance": "5000",
            "staking_balance": "2000000",
            "delegated_balance": "1500000",
            "deactivated": false,
            "grace_period": 120
        }"#;
        let delegate = decode_delegate(json, "tz1baker", "BLhash", 42).unwrap();
        assert_eq!(delegate.pkh, "tz1baker");
        assert_eq!(delegate.balance, 1_000_000);
        assert_eq!(delegate.staking_balance, Some(2_000_000));
        assert!(!delegate.deactivated);
    }
}
