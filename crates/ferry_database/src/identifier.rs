//! Identifier and pattern helpers.

use ferry_error::{RecordError, RecordErrorKind};

/// Check that a table or column name is safe to splice into SQL.
///
/// Only ASCII alphanumerics and underscores are accepted, and the name must
/// not start with a digit.
pub fn validate_identifier(name: &str) -> Result<&str, RecordError> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());

    if valid {
        Ok(name)
    } else {
        Err(RecordError::new(RecordErrorKind::InvalidIdentifier(
            name.to_string(),
        )))
    }
}

/// `LIKE` pattern matching any text that contains `needle` literally.
///
/// # Examples
///
/// ```
/// use ferry_database::like_pattern;
///
/// assert_eq!(like_pattern("a_b%"), "%a\\_b\\%%");
/// ```
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_injection_attempts() {
        assert!(validate_identifier("articles").is_ok());
        assert!(validate_identifier("web_stories").is_ok());
        assert!(validate_identifier("articles; DROP TABLE x").is_err());
        assert!(validate_identifier("1table").is_err());
        assert!(validate_identifier("").is_err());
    }
}
