//! Helpers for the JWTs the platform hands out on signup/login.
//!
//! The seeder never verifies tokens; it only peeks at the claims to learn the
//! id the server assigned to a freshly created account.

use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
use serde_json::Value;

/// The non-empty `token` field of a signup/login response.
pub fn token_of(response: &Value) -> Option<String> {
    response
        .get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

/// Reads the `id` (or `_id`) claim without checking the signature.
pub fn subject_id(token: &str) -> Option<String> {
    let header = decode_header(token).ok()?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Value>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    ["id", "_id"]
        .iter()
        .find_map(|key| data.claims.get(*key).and_then(id_string))
}

/// Renders a JSON id (string or number) as a string.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The id the API reported for a created record: `id`, `_id`, then `<kind>Id`.
pub fn record_id(response: &Value, kind: &str) -> Option<String> {
    let kind_key = format!("{kind}Id");
    ["id", "_id", kind_key.as_str()]
        .iter()
        .find_map(|key| response.get(*key).and_then(id_string))
}
