//! Attestation validator.
//!
//! Decides whether an inbound claim body carries an acceptable proof shape. The proof
//! itself is opaque here: nothing is verified cryptographically, only the shape is checked.

use serde_json::Value;

/// Returns `true` iff `body` is an object with a nested `proof` object that has
/// `verified === true`, or a truthy `proofId`, or a truthy `classification`.
pub fn is_valid_attestation(body: &Value) -> bool {
    let Some(proof) = body.get("proof").and_then(Value::as_object) else {
        return false;
    };
    proof.get("verified") == Some(&Value::Bool(true))
        || proof.get("proofId").is_some_and(is_truthy)
        || proof.get("classification").is_some_and(is_truthy)
}

/// JSON truthiness: empty strings, zero, `false` and `null` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_any_single_field() {
        assert!(is_valid_attestation(&json!({"proof": {"verified": true}})));
        assert!(is_valid_attestation(&json!({"proof": {"proofId": "abc"}})));
        assert!(is_valid_attestation(
            &json!({"proof": {"classification": "stressed"}})
        ));
        assert!(is_valid_attestation(
            &json!({"proof": {"verified": false, "proofId": "abc"}})
        ));
    }

    #[test]
    fn test_rejects_missing_or_non_object_proof() {
        assert!(!is_valid_attestation(&json!({})));
        assert!(!is_valid_attestation(&json!({"proof": null})));
        assert!(!is_valid_attestation(&json!({"proof": "abc"})));
        assert!(!is_valid_attestation(&json!({"proof": [1, 2]})));
        assert!(!is_valid_attestation(&json!("proof")));
        assert!(!is_valid_attestation(&Value::Null));
    }

    #[test]
    fn test_rejects_empty_fields() {
        assert!(!is_valid_attestation(&json!({"proof": {}})));
        assert!(!is_valid_attestation(&json!({"proof": {"verified": false}})));
        assert!(!is_valid_attestation(&json!({"proof": {"verified": "true"}})));
        assert!(!is_valid_attestation(
            &json!({"proof": {"proofId": "", "classification": ""}})
        ));
        assert!(!is_valid_attestation(
            &json!({"proof": {"proofId": null, "classification": 0}})
        ));
    }
}
