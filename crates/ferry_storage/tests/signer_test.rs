use ferry_storage::{SignatureAlgorithm, canonical_string, sign_params};

#[test]
fn test_sign_params_known_digest() {
    let signature = sign_params(
        &[("timestamp", "1700000000"), ("folder", "articles")],
        "abcd",
        SignatureAlgorithm::Sha1,
    );
    assert_eq!(signature.len(), 40);
    assert!(signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn test_sign_params_is_order_independent() {
    let a = sign_params(
        &[("folder", "stories"), ("timestamp", "1")],
        "secret",
        SignatureAlgorithm::Sha1,
    );
    let b = sign_params(
        &[("timestamp", "1"), ("folder", "stories")],
        "secret",
        SignatureAlgorithm::Sha1,
    );
    assert_eq!(a, b);
}

#[test]
fn test_sign_params_depends_on_secret() {
    let params = [("folder", "authors"), ("timestamp", "42")];
    let a = sign_params(&params, "one", SignatureAlgorithm::Sha1);
    let b = sign_params(&params, "two", SignatureAlgorithm::Sha1);
    assert_ne!(a, b);
}

#[test]
fn test_sha256_digest_length() {
    let signature = sign_params(&[("timestamp", "42")], "s", SignatureAlgorithm::Sha256);
    assert_eq!(signature.len(), 64);
}

#[test]
fn test_canonical_string_drops_empty_values() {
    let canonical = canonical_string(&[("public_id", ""), ("timestamp", "9"), ("folder", "a/b")]);
    assert_eq!(canonical, "folder=a/b&timestamp=9");
}

#[test]
fn test_sha1_matches_reference_vector() {
    // sha1("abc") with no parameters and secret "abc"
    let signature = sign_params(&[], "abc", SignatureAlgorithm::Sha1);
    assert_eq!(signature, "a9993e364706816aba3e25717850c26c9cd0d89d");
}
