//! Last.fm request signatures
//!
//! A signature is the lowercase hex MD5 digest of the request parameters,
//! ordered by name and written as `name` immediately followed by `value`,
//! with the application secret appended. `format` and `callback` are never
//! part of the signed string.

use std::collections::BTreeMap;

/// Parameters left out of the signed string
const UNSIGNED_PARAMS: [&str; 2] = ["format", "callback"];

/// MD5 hex digest of the concatenation of `parts`, in order
pub fn api_signature<S: AsRef<str>>(parts: &[S]) -> String {
    let joined: String = parts.iter().map(AsRef::as_ref).collect();
    format!("{:x}", md5::compute(joined.as_bytes()))
}

/// Canonical signature for a parameter set
///
/// `BTreeMap` iteration is already sorted by name, which is the order the
/// service expects.
pub fn sign_params(params: &BTreeMap<String, String>, api_secret: &str) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(params.len() * 2 + 1);
    for (name, value) in params {
        if UNSIGNED_PARAMS.contains(&name.as_str()) {
            continue;
        }
        parts.push(name);
        parts.push(value);
    }
    parts.push(api_secret);

    api_signature(&parts)
}
