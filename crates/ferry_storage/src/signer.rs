//! Upload signatures.
//!
//! The target store verifies an upload by recomputing the digest over the
//! same canonical parameter string. Canonical form: parameters sorted by
//! key, empty values dropped, rendered `key=value` and joined with `&`; the
//! shared secret is appended directly after the last value. Ordering is part
//! of the contract, so both sides must sort identically.

use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Digest used for signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SignatureAlgorithm {
    /// SHA-1, the target store's default
    #[default]
    Sha1,
    /// SHA-256, for accounts configured for it
    Sha256,
}

/// Canonical parameter string that gets signed (without the secret).
///
/// # Examples
///
/// ```
/// use ferry_storage::canonical_string;
///
/// let canonical = canonical_string(&[("timestamp", "1700000000"), ("folder", "articles")]);
/// assert_eq!(canonical, "folder=articles&timestamp=1700000000");
/// ```
pub fn canonical_string(params: &[(&str, &str)]) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Sign upload parameters with the shared secret.
///
/// Pure and deterministic: the same parameters in any order and the same
/// secret always yield the same lowercase hex digest.
pub fn sign_params(params: &[(&str, &str)], secret: &str, algorithm: SignatureAlgorithm) -> String {
    let mut payload = canonical_string(params);
    payload.push_str(secret);

    match algorithm {
        SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(payload.as_bytes())),
        SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(payload.as_bytes())),
    }
}
