use serde::de::DeserializeOwned;

/// Decodes a JSON array body, but per §4.2/§7.3 never fails the cycle: an
/// empty body, or a body that fails to parse, yields an empty list with a
/// `warn`-level log rather than propagating the error.
pub(crate) fn tolerant_list<T: DeserializeOwned>(endpoint: &str, body: &[u8]) -> Vec<T> {
    let trimmed = std::str::from_utf8(body).map(str::trim).unwrap_or("");
    if trimmed.is_empty() || trimmed == "\"\"" {
        return Vec::new();
    }

    match serde_json::from_slice::<Vec<T>>(body) {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(endpoint, error = %err, "tolerant decode failed, treating as empty");
            Vec::new()
        }
    }
}

/// Decodes a JSON scalar body that may be absent (§4.2/§7.3): an empty body,
/// a quoted-empty-string body, a JSON `null`, or a body that fails to parse
/// all yield `None` with a `warn`-level log on the parse-failure case, rather
/// than propagating the error. Used for `votes/current_proposal`, which
/// returns either a proposal hash string or nothing when no proposal is
/// under discussion.
pub(crate) fn tolerant_scalar<T: DeserializeOwned>(endpoint: &str, body: &[u8]) -> Option<T> {
    let trimmed = std::str::from_utf8(body).map(str::trim).unwrap_or("");
    if trimmed.is_empty() || trimmed == "\"\"" || trimmed == "null" {
        return None;
    }

    match serde_json::from_slice::<T>(body) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(endpoint, error = %err, "tolerant decode failed, treating as absent");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Item {
        #[allow(dead_code)]
        x: i32,
    }

    #[test]
    fn empty_body_is_empty_list() {
        assert!(tolerant_list::<Item>("test", b"").is_empty());
        assert!(tolerant_list::<Item>("test", b"\"\"").is_empty());
    }

    #[test]
    fn malformed_body_is_empty_list_not_error() {
        assert!(tolerant_list::<Item>("test", b"not json").is_empty());
    }

    #[test]
    fn well_formed_body_decodes() {
        let items = tolerant_list::<Item>("test", br#"[{"x": 1}, {"x": 2}]"#);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn scalar_absent_cases_are_none() {
        assert_eq!(tolerant_scalar::<String>("test", b""), None);
        assert_eq!(tolerant_scalar::<String>("test", b"\"\""), None);
        assert_eq!(tolerant_scalar::<String>("test", b"null"), None);
    }

    #[test]
    fn scalar_well_formed_body_decodes() {
        assert_eq!(
            tolerant_scalar::<String>("test", b"\"PsProposalHash\""),
            Some("PsProposalHash".to_string())
        );
    }
}
