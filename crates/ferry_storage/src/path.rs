//! Mapping public URLs back to object paths.

/// Object path addressed by `url` under `prefix`.
///
/// The query string and fragment are dropped and the remainder is
/// percent-decoded, so `.../images/a%20b.png?width=300` maps to `a b.png`.
/// Returns `None` when `url` does not start with `prefix` or names no object.
///
/// # Examples
///
/// ```
/// use ferry_storage::path_from_public_url;
///
/// let prefix = "https://p.supabase.co/storage/v1/object/public/images/";
/// assert_eq!(
///     path_from_public_url(prefix, "https://p.supabase.co/storage/v1/object/public/images/news/a%20b.png?w=3"),
///     Some("news/a b.png".to_string())
/// );
/// assert_eq!(path_from_public_url(prefix, "https://elsewhere.example/a.png"), None);
/// ```
pub fn path_from_public_url(prefix: &str, url: &str) -> Option<String> {
    let rest = url.strip_prefix(prefix)?;
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    let raw = &rest[..end];
    if raw.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(raw)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    Some(decoded)
}
