//! Envelope unpacking.
//!
//! A success envelope carries its body under `response`. Arrays decode
//! element by element, and an array with a `pagination` entry is rebuilt as a
//! [`WillPaginatePage`]. An envelope with an `error` entry becomes
//! [`ClientError::Api`].

use crate::error::{ClientError, ClientResult};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use trestle_convert::Pagination;
use trestle_core::{ApiError, ErrorRegistry, WillPaginatePage};

/// A decoded success envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Unpacked<T> {
    /// A single object.
    One(T),
    /// An unpaginated collection.
    Many(Vec<T>),
    /// One page of a paginated collection.
    Page(WillPaginatePage<T>),
}

impl<T> Unpacked<T> {
    /// The single object, if the envelope held one.
    pub fn into_one(self) -> Option<T> {
        match self {
            Self::One(item) => Some(item),
            _ => None,
        }
    }

    /// The page, if the envelope was paginated.
    pub fn into_page(self) -> Option<WillPaginatePage<T>> {
        match self {
            Self::Page(page) => Some(page),
            _ => None,
        }
    }

    /// Every decoded item in order.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
            Self::Page(page) => page.items,
        }
    }
}

/// Decodes a response body.
///
/// # Errors
///
/// [`ClientError::UnsupportedFormat`] when `body` is not an object,
/// [`ClientError::Api`] for an error envelope and [`ClientError::Json`] when
/// the payload does not decode into `T`.
///
/// ```
/// use serde_json::json;
/// use trestle_client::{unpack, Unpacked};
///
/// let body = json!({"response": ["a", "b"], "count": 2});
/// let unpacked: Unpacked<String> = unpack(body).unwrap();
/// assert_eq!(unpacked, Unpacked::Many(vec!["a".to_string(), "b".to_string()]));
/// ```
pub fn unpack<T: DeserializeOwned>(body: Value) -> ClientResult<Unpacked<T>> {
    let Value::Object(mut envelope) = body else {
        return Err(ClientError::UnsupportedFormat);
    };
    if envelope.contains_key("error") {
        return Err(api_error(envelope).into());
    }

    let inner = envelope.remove("response").unwrap_or(Value::Null);
    match (inner, envelope.remove("pagination")) {
        (Value::Array(items), Some(pagination)) => {
            let pagination: Pagination = serde_json::from_value(pagination)?;
            Ok(Unpacked::Page(WillPaginatePage::new(
                decode_all(items)?,
                pagination.current,
                pagination.per_page,
                pagination.count,
            )))
        }
        (Value::Array(items), None) => Ok(Unpacked::Many(decode_all(items)?)),
        (inner, _) => Ok(Unpacked::One(serde_json::from_value(inner)?)),
    }
}

fn decode_all<T: DeserializeOwned>(items: Vec<Value>) -> ClientResult<Vec<T>> {
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(ClientError::from))
        .collect()
}

/// Rebuilds the raised error from an error envelope.
///
/// Entries other than `error` and `error_description` become metadata.
fn api_error(mut envelope: Map<String, Value>) -> ApiError {
    let name = match envelope.remove("error") {
        Some(Value::String(name)) => name,
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let kind = ErrorRegistry::global().lookup_or_root(&name);
    tracing::debug!(error.name = %name, error.class = kind.class_name(), "server returned an error");

    let mut error = ApiError::new(kind);
    if let Some(Value::String(description)) = envelope.remove("error_description") {
        error = error.with_message(description);
    }
    for (key, value) in envelope {
        error = error.with_metadata(key, value);
    }
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct User {
        id: u64,
        name: String,
    }

    #[test]
    fn test_single_object() {
        let body = json!({"response": {"id": 1, "name": "alice"}});
        let user = unpack::<User>(body).unwrap().into_one().unwrap();
        assert_eq!(user, User { id: 1, name: "alice".into() });
    }

    #[test]
    fn test_paginated_collection() {
        let body = json!({
            "response": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}],
            "count": 2,
            "pagination": {"previous": 1, "next": 3, "current": 2, "per_page": 2, "count": 5, "pages": 3}
        });
        let page = unpack::<User>(body).unwrap().into_page().unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.per_page, 2);
        assert_eq!(page.total_entries, 5);
    }

    #[test]
    fn test_error_envelope_uses_registered_kind() {
        let body = json!({
            "error": "not_found",
            "error_description": "The requested resource could not be found.",
            "id": 9
        });
        let error = unpack::<Value>(body).unwrap_err();
        let error = error.as_api().unwrap();
        assert_eq!(error.class_name(), "NotFound");
        assert_eq!(error.http_status().as_u16(), 404);
        assert_eq!(error.message(), "The requested resource could not be found.");
        assert_eq!(error.metadata()["id"], json!(9));
    }

    #[test]
    fn test_unregistered_error_falls_back_to_root() {
        let body = json!({"error": "teapot", "error_description": "short and stout"});
        let error = unpack::<Value>(body).unwrap_err();
        let error = error.as_api().unwrap();
        assert_eq!(error.name(), "unknown");
        assert_eq!(error.message(), "short and stout");
    }

    #[test]
    fn test_non_object_is_unsupported() {
        for body in [json!([1, 2]), json!("ok"), Value::Null] {
            assert!(matches!(unpack::<Value>(body), Err(ClientError::UnsupportedFormat)));
        }
    }

    #[test]
    fn test_mistyped_payload_is_a_json_error() {
        let body = json!({"response": {"id": "one"}});
        assert!(matches!(unpack::<User>(body), Err(ClientError::Json(_))));
    }
}
