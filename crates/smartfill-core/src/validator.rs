//! Response validation.
//!
//! The value resolver answers in free text that should contain one JSON
//! object of string values. This module pulls that object out and parses it
//! strictly.

use std::collections::BTreeMap;

use smartfill_protocols::{FieldValues, ResolverError};

/// Extract the field-to-value mapping from a raw resolver reply.
///
/// The object spans from the first `{` to its matching `}`; braces inside
/// JSON strings do not count.
pub fn extract_values(raw: &str) -> Result<FieldValues, ResolverError> {
    let object = first_object(raw)?;
    let values: BTreeMap<String, String> = serde_json::from_str(object)
        .map_err(|e| ResolverError::MalformedJson(e.to_string()))?;
    Ok(values)
}

fn first_object(raw: &str) -> Result<&str, ResolverError> {
    let start = raw.find('{').ok_or(ResolverError::NoJsonObject)?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Ok(&raw[start..end]);
                }
            }
            _ => {}
        }
    }

    Err(ResolverError::MalformedJson(
        "unbalanced braces in reply".to_string(),
    ))
}
