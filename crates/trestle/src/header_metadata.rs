//! Envelope metadata mirrored into response headers.
//!
//! Each metadata key becomes an `X-Api-*` header: keys are titleized and
//! joined with `-`, nested objects extend the prefix, and arrays are joined
//! with `, `. Empty values produce no header.
//!
//! ```
//! use serde_json::json;
//! use trestle::header_metadata::header_pairs;
//!
//! let metadata = json!({"count": 2, "pagination": {"per_page": 10}});
//! let pairs = header_pairs(metadata.as_object().unwrap());
//! assert_eq!(pairs[0], ("X-Api-Count".to_string(), "2".to_string()));
//! assert_eq!(pairs[1], ("X-Api-Pagination-Per-Page".to_string(), "10".to_string()));
//! ```

use heck::{ToTitleCase, ToTrainCase};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

/// Prefix of every metadata header.
pub const HEADER_PREFIX: &str = "X-Api";

/// Flattens `metadata` into `(header, value)` pairs in key order.
#[must_use]
pub fn header_pairs(metadata: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    collect(metadata, HEADER_PREFIX, &mut pairs);
    pairs
}

fn collect(metadata: &Map<String, Value>, prefix: &str, pairs: &mut Vec<(String, String)>) {
    for (key, value) in metadata {
        let name = format!("{prefix}-{}", key.to_train_case());
        match value {
            Value::Object(nested) => collect(nested, &name, pairs),
            other => {
                let rendered = render(other);
                if !rendered.trim().is_empty() {
                    pairs.push((name, rendered));
                }
            }
        }
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(render)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Capitalizes each word of a snake_case or camelCase key.
#[must_use]
pub fn titleize(key: &str) -> String {
    key.to_title_case()
}

/// Writes the metadata headers into `headers`.
///
/// Pairs that are not valid header names or values are skipped.
pub fn apply(headers: &mut HeaderMap, metadata: &Map<String, Value>) {
    for (name, value) in header_pairs(metadata) {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "skipping metadata that is not a valid header"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(value: Value) -> Vec<(String, String)> {
        header_pairs(value.as_object().unwrap())
    }

    #[test]
    fn test_titleize() {
        assert_eq!(titleize("per_page"), "Per Page");
        assert_eq!(titleize("count"), "Count");
        assert_eq!(titleize("totalCount"), "Total Count");
        assert_eq!(titleize("API_version"), "Api Version");
    }

    #[test]
    fn test_camel_case_keys_are_split() {
        let pairs = pairs(json!({"totalCount": 3, "pagination": {"per_page": 10}}));
        assert_eq!(pairs[0].0, "X-Api-Total-Count");
        assert_eq!(pairs[1].0, "X-Api-Pagination-Per-Page");
    }

    #[test]
    fn test_nested_prefix() {
        let pairs = pairs(json!({"pagination": {"current": 1, "next": 2, "previous": null}}));
        assert_eq!(
            pairs,
            vec![
                ("X-Api-Pagination-Current".to_string(), "1".to_string()),
                ("X-Api-Pagination-Next".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_arrays_are_joined_and_blanks_skipped() {
        let pairs = pairs(json!({"tags": ["a", "b"], "empty": [], "blank": " ", "flag": false}));
        assert_eq!(
            pairs,
            vec![
                ("X-Api-Tags".to_string(), "a, b".to_string()),
                ("X-Api-Flag".to_string(), "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_apply_writes_headers() {
        let mut headers = HeaderMap::new();
        apply(&mut headers, json!({"count": 4}).as_object().unwrap());
        assert_eq!(headers["x-api-count"], "4");
    }
}
