//! Finding asset references inside records.

use ferry_core::{AssetReference, CollectionSchema, CollectionSpec, FieldPath};
use ferry_error::{ConfigError, FerryResult};
use ferry_interface::Record;
use regex::Regex;
use serde_json::Value as JsonValue;

/// Rest of a URL embedded in text or markup. Whitespace, quotes, angle
/// brackets and parentheses end it, and trailing sentence punctuation is not
/// part of it.
pub(crate) const URL_TAIL: &str = r#"[^\s"'<>()\\]*[^\s"'<>()\\.,;:!?]"#;

/// Locates source-store references in records.
///
/// `locate` is a pure read: it never touches the record and returns the same
/// references for the same record every time.
#[derive(Debug, Clone)]
pub struct ReferenceLocator {
    source_prefix: String,
    source_pattern: Regex,
    any_url_pattern: Regex,
}

impl ReferenceLocator {
    /// Locator for URLs under `source_prefix`.
    pub fn new(source_prefix: &str) -> FerryResult<Self> {
        if source_prefix.is_empty() {
            return Err(ConfigError::new("Source URL prefix must not be empty").into());
        }
        let source_pattern = Regex::new(&format!("{}{}", regex::escape(source_prefix), URL_TAIL))
            .map_err(|e| ConfigError::new(format!("Invalid source URL prefix: {}", e)))?;
        let any_url_pattern = Regex::new(&format!("https?://{}", URL_TAIL))
            .map_err(|e| ConfigError::new(format!("Invalid URL pattern: {}", e)))?;

        Ok(Self {
            source_prefix: source_prefix.to_string(),
            source_pattern,
            any_url_pattern,
        })
    }

    /// Prefix every source-store URL starts with.
    pub fn source_prefix(&self) -> &str {
        &self.source_prefix
    }

    /// Pattern matching one source-store URL embedded in text.
    pub fn source_pattern(&self) -> &Regex {
        &self.source_pattern
    }

    /// True when `url` is served by the source store.
    pub fn is_source(&self, url: &str) -> bool {
        url.starts_with(&self.source_prefix)
    }

    /// Every source-store reference in `record` for the collection's shape.
    pub fn locate(&self, record: &Record, spec: &CollectionSpec) -> Vec<AssetReference> {
        self.urls(record, spec.schema(), &self.source_pattern)
            .into_iter()
            .filter(|(_, url)| self.is_source(url))
            .map(|(path, source_url)| AssetReference {
                container_record_id: record.id.clone(),
                container_collection: spec.name().clone(),
                source_url,
                path,
            })
            .collect()
    }

    /// Every URL at a reference position of `record`, whatever its host.
    ///
    /// Flat and array positions yield their value when it is a non-empty
    /// string; text yields each distinct `http(s)` literal.
    pub fn all_urls(&self, record: &Record, schema: &CollectionSchema) -> Vec<(FieldPath, String)> {
        self.urls(record, schema, &self.any_url_pattern)
    }

    fn urls(
        &self,
        record: &Record,
        schema: &CollectionSchema,
        text_pattern: &Regex,
    ) -> Vec<(FieldPath, String)> {
        match schema {
            CollectionSchema::FlatField { field } => record
                .get_str(field)
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(|url| {
                    vec![(
                        FieldPath::Field {
                            field: field.clone(),
                        },
                        url.to_string(),
                    )]
                })
                .unwrap_or_default(),
            CollectionSchema::ArrayField { field, sub_field } => match record.get(field) {
                Some(JsonValue::Array(elements)) => elements
                    .iter()
                    .enumerate()
                    .filter_map(|(index, element)| {
                        let url = element.get(sub_field)?.as_str()?;
                        if url.is_empty() {
                            return None;
                        }
                        Some((
                            FieldPath::Element {
                                field: field.clone(),
                                index,
                                sub_field: sub_field.clone(),
                            },
                            url.to_string(),
                        ))
                    })
                    .collect(),
                _ => Vec::new(),
            },
            CollectionSchema::EmbeddedText { field } => {
                let Some(text) = record.get_str(field) else {
                    return Vec::new();
                };
                distinct_literals(text_pattern, text)
                    .into_iter()
                    .map(|url| {
                        (
                            FieldPath::Text {
                                field: field.clone(),
                            },
                            url,
                        )
                    })
                    .collect()
            }
        }
    }
}

/// Distinct matches of `pattern` in `text`, in order of first appearance.
fn distinct_literals(pattern: &Regex, text: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for found in pattern.find_iter(text) {
        let literal = found.as_str();
        if !seen.iter().any(|s| s == literal) {
            seen.push(literal.to_string());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_stops_at_markup() {
        let locator = ReferenceLocator::new("https://src.test/public/").expect("locator");
        let found = distinct_literals(
            locator.source_pattern(),
            r#"<img src="https://src.test/public/a.png"/>(https://src.test/public/b.png)"#,
        );
        assert_eq!(
            found,
            vec!["https://src.test/public/a.png", "https://src.test/public/b.png"]
        );
    }

    #[test]
    fn url_drops_trailing_punctuation() {
        let locator = ReferenceLocator::new("https://src.test/public/").expect("locator");
        let found = distinct_literals(
            locator.source_pattern(),
            "See https://src.test/public/a.png. Also https://src.test/public/b.v2.png, \
             or https://src.test/public/c.png?! Done: https://src.test/public/d.png?w=2",
        );
        assert_eq!(
            found,
            vec![
                "https://src.test/public/a.png",
                "https://src.test/public/b.v2.png",
                "https://src.test/public/c.png",
                "https://src.test/public/d.png?w=2",
            ]
        );
    }

    #[test]
    fn empty_prefix_is_rejected() {
        assert!(ReferenceLocator::new("").is_err());
    }
}
