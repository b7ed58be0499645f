//! Field extraction from untyped credential documents and token payloads.
//!
//! Uploads are accepted in two shapes: a plain VC (`credentialSubject` at
//! the top level) and a JWT-VC claim set (`vc.credentialSubject`). The
//! nested form wins when both are present.

use serde_json::Value;

/// DID scheme prefix an issuer must carry.
pub const DID_PREFIX: &str = "did:";

/// The issuer DID: `issuer` when it is a string, `issuer.id` when it is an
/// object. `None` when absent or not starting with `did:`.
pub fn issuer_did(document: &Value) -> Option<&str> {
    let issuer = document.get("issuer")?;
    let id = match issuer {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => obj.get("id")?.as_str()?,
        _ => return None,
    };
    id.starts_with(DID_PREFIX).then_some(id)
}

/// The credential subject of an uploaded document or a token payload.
pub fn credential_subject(value: &Value) -> Option<&Value> {
    value
        .get("vc")
        .and_then(|vc| vc.get("credentialSubject"))
        .filter(|s| !s.is_null())
        .or_else(|| value.get("credentialSubject").filter(|s| !s.is_null()))
}

/// The compact token in `proof.jwt`. Empty and non-string values count as
/// no proof.
pub fn proof_jwt(document: &Value) -> Option<&str> {
    document
        .get("proof")
        .and_then(|p| p.get("jwt"))
        .and_then(Value::as_str)
        .filter(|jwt| !jwt.trim().is_empty())
}

/// The `credentialHash` claim of a payload.
pub fn embedded_hash(payload: &Value) -> Option<&str> {
    payload.get("credentialHash").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn issuer_string_and_object_forms() {
        assert_eq!(issuer_did(&json!({"issuer": "did:web:a"})), Some("did:web:a"));
        assert_eq!(
            issuer_did(&json!({"issuer": {"id": "did:key:z6Mk", "name": "A"}})),
            Some("did:key:z6Mk")
        );
    }

    #[test]
    fn issuer_must_be_did_shaped() {
        for doc in [
            json!({}),
            json!({"issuer": "https://example.com"}),
            json!({"issuer": {"name": "no id"}}),
            json!({"issuer": {"id": 5}}),
            json!({"issuer": 12}),
            json!({"issuer": ""}),
        ] {
            assert_eq!(issuer_did(&doc), None, "{doc}");
        }
    }

    #[test]
    fn nested_subject_wins() {
        let doc = json!({
            "vc": {"credentialSubject": {"name": "nested"}},
            "credentialSubject": {"name": "top"}
        });
        assert_eq!(credential_subject(&doc), Some(&json!({"name": "nested"})));

        let doc = json!({"vc": {"credentialSubject": null}, "credentialSubject": {"name": "top"}});
        assert_eq!(credential_subject(&doc), Some(&json!({"name": "top"})));

        assert_eq!(credential_subject(&json!({"vc": {}})), None);
    }

    #[test]
    fn proof_jwt_requires_a_nonempty_string() {
        assert_eq!(proof_jwt(&json!({"proof": {"jwt": "a.b.c"}})), Some("a.b.c"));
        assert_eq!(proof_jwt(&json!({"proof": {"jwt": ""}})), None);
        assert_eq!(proof_jwt(&json!({"proof": {"jwt": 3}})), None);
        assert_eq!(proof_jwt(&json!({"proof": {}})), None);
        assert_eq!(proof_jwt(&json!({})), None);
    }

    #[test]
    fn embedded_hash_must_be_string() {
        assert_eq!(embedded_hash(&json!({"credentialHash": "ab"})), Some("ab"));
        assert_eq!(embedded_hash(&json!({"credentialHash": 1})), None);
    }
}
