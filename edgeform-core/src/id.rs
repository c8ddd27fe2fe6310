//! Composite resource identifiers
//!
//! Resource IDs are colon-joined tuples such as
//! `configID:securityPolicyID:categoryID`. Parts are not escaped, so a part
//! that itself contains `:` does not survive a round trip.

use crate::provider::{ProviderError, ProviderResult};

pub const SEPARATOR: char = ':';

/// Join parts into an ID
pub fn compose<S: AsRef<str>>(parts: &[S]) -> String {
    let mut id = String::new();
    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            id.push(SEPARATOR);
        }
        id.push_str(part.as_ref());
    }
    id
}

/// Split an ID into exactly `arity` parts
///
/// `hint` names the expected layout (e.g. `configID:securityPolicyID`) and
/// is echoed in the error.
pub fn decompose(id: &str, arity: usize, hint: &str) -> ProviderResult<Vec<String>> {
    let parts: Vec<String> = id.split(SEPARATOR).map(str::to_string).collect();
    if parts.len() != arity {
        return Err(ProviderError::InvalidIdentifier {
            id: id.to_string(),
            expected: hint.to_string(),
        });
    }
    Ok(parts)
}

/// Parse a numeric ID part such as a configuration ID
pub fn parse_numeric(part: &str, id: &str, hint: &str) -> ProviderResult<i64> {
    part.parse::<i64>()
        .map_err(|_| ProviderError::InvalidIdentifier {
            id: id.to_string(),
            expected: hint.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_joins_with_colon() {
        assert_eq!(compose(&["43253", "test_policy", "cat1"]), "43253:test_policy:cat1");
        assert_eq!(compose(&["43253"]), "43253");
        assert_eq!(compose(&["43253".to_string(), String::new()]), "43253:");
        assert_eq!(compose(&["a", "b"]).matches(SEPARATOR).count(), 1);
    }

    #[test]
    fn round_trip_for_several_arities() {
        let cases: [&[&str]; 4] = [
            &["43253"],
            &["43253", "7"],
            &["43253", "test_policy", "cat1"],
            &["example.net", "www", "A"],
        ];
        for parts in cases {
            let id = compose(parts);
            assert_eq!(decompose(&id, parts.len(), "hint").unwrap(), parts);
        }
    }

    #[test]
    fn empty_parts_survive() {
        assert_eq!(
            decompose("43253:", 2, "configID:policyID").unwrap(),
            vec!["43253".to_string(), String::new()]
        );
    }

    #[test]
    fn arity_mismatch_is_invalid_identifier() {
        for (id, arity) in [("43253:test_policy", 1), ("43253", 2), ("1:2", 3), ("1:2:3:4", 3)] {
            let err = decompose(id, arity, "configID:securityPolicyID:categoryID").unwrap_err();
            assert!(matches!(err, ProviderError::InvalidIdentifier { .. }));
            assert!(err.to_string().contains("configID:securityPolicyID:categoryID"));
        }
    }

    #[test]
    fn separator_inside_a_part_breaks_round_trip() {
        let id = compose(&["43253", "a:b"]);
        assert!(decompose(&id, 2, "configID:policyID").is_err());
    }

    #[test]
    fn parse_numeric_rejects_text() {
        assert_eq!(parse_numeric("43253", "43253", "configID").unwrap(), 43253);
        assert!(matches!(
            parse_numeric("abc", "abc:x", "configID:policyID"),
            Err(ProviderError::InvalidIdentifier { .. })
        ));
    }
}
