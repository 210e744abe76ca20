//! Convenience macros.

/// Returns early with an [`ApiError`](crate::ApiError) looked up by name.
///
/// Unregistered names fall back to the `unknown` kind. An optional message
/// and an optional `context = <serde_json::Value>` object may follow.
///
/// ```
/// use trestle_core::{raise, Failure};
/// use serde_json::json;
///
/// fn check(remaining: u32) -> Result<(), Failure> {
///     if remaining == 0 {
///         raise!("throttled", "too many requests", context = json!({"retry_in": 30}));
///     }
///     Ok(())
/// }
///
/// let failure = check(0).unwrap_err();
/// assert_eq!(failure.as_api().unwrap().name(), "throttled");
/// ```
#[macro_export]
macro_rules! raise {
    ($name:expr) => {
        return ::core::result::Result::Err($crate::Failure::from($crate::ApiError::named($name)))
    };
    ($name:expr, context = $context:expr) => {
        return ::core::result::Result::Err($crate::Failure::from(
            $crate::ApiError::named($name).with_context($crate::__context_map($context)),
        ))
    };
    ($name:expr, $message:expr) => {
        return ::core::result::Result::Err($crate::Failure::from(
            $crate::ApiError::named($name).with_message($message),
        ))
    };
    ($name:expr, $message:expr, context = $context:expr) => {
        return ::core::result::Result::Err($crate::Failure::from(
            $crate::ApiError::named($name)
                .with_message($message)
                .with_context($crate::__context_map($context)),
        ))
    };
}

#[doc(hidden)]
pub fn __context_map(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::Failure;
    use serde_json::json;

    fn fail(mode: u8) -> Result<(), Failure> {
        match mode {
            0 => raise!("not_found"),
            1 => raise!("conflict", "already exists"),
            2 => raise!("forbidden", context = json!({"metadata": {"role": "guest"}})),
            _ => raise!("bad_request", "bad", context = json!({"field": "name"})),
        }
    }

    #[test]
    fn test_raise_variants() {
        let failure = fail(0).unwrap_err();
        assert_eq!(failure.as_api().unwrap().name(), "not_found");

        let failure = fail(1).unwrap_err();
        assert_eq!(failure.as_api().unwrap().message(), "already exists");

        let failure = fail(2).unwrap_err();
        assert_eq!(failure.as_api().unwrap().metadata()["role"], json!("guest"));

        let failure = fail(3).unwrap_err();
        let error = failure.as_api().unwrap();
        assert_eq!(error.message(), "bad");
        assert_eq!(error.context()["field"], json!("name"));
    }
}
