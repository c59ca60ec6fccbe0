//! Replacing one reference in place.
//!
//! Each function swaps exactly one asset's URL and leaves every other byte of
//! the field alone, so a failed sibling asset keeps its original URL.

use ferry_core::FieldPath;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};

/// Replace `old` with `new` at `path` inside `fields`.
///
/// Flat and array positions change only when they currently hold exactly
/// `old`. Text positions replace every match of `pattern` that is
/// byte-identical to `old`; longer URLs that merely start with `old` are left
/// untouched. Returns whether anything changed.
pub fn apply(
    fields: &mut Map<String, JsonValue>,
    path: &FieldPath,
    old: &str,
    new: &str,
    pattern: &Regex,
) -> bool {
    match path {
        FieldPath::Field { field } => replace_exact(fields.get_mut(field), old, new),
        FieldPath::Element {
            field,
            index,
            sub_field,
        } => {
            let slot = fields
                .get_mut(field)
                .and_then(JsonValue::as_array_mut)
                .and_then(|elements| elements.get_mut(*index))
                .and_then(JsonValue::as_object_mut)
                .and_then(|element| element.get_mut(sub_field));
            replace_exact(slot, old, new)
        }
        FieldPath::Text { field } => match fields.get_mut(field) {
            Some(JsonValue::String(text)) => match replace_in_text(text, old, new, pattern) {
                Some(updated) => {
                    *text = updated;
                    true
                }
                None => false,
            },
            _ => false,
        },
    }
}

fn replace_exact(slot: Option<&mut JsonValue>, old: &str, new: &str) -> bool {
    match slot {
        Some(value) if value.as_str().map(str::trim) == Some(old) => {
            *value = JsonValue::String(new.to_string());
            true
        }
        _ => false,
    }
}

/// Text with every whole-URL occurrence of `old` swapped, or `None` if absent.
pub fn replace_in_text(text: &str, old: &str, new: &str, pattern: &Regex) -> Option<String> {
    let mut changed = false;
    let updated = pattern.replace_all(text, |caps: &regex::Captures<'_>| {
        let found = &caps[0];
        if found == old {
            changed = true;
            new.to_string()
        } else {
            found.to_string()
        }
    });
    changed.then(|| updated.into_owned())
}
