//! The exposable capability interface.
//!
//! Converters select how to render an object by checking the capabilities it
//! reports through [`Exposable`]. Every capability defaults to "not
//! supported", so a plain type only implements [`Exposable::to_json`] and
//! opts into the rest.
//!
//! ```
//! use trestle_core::{Exposable, ExposeOptions, SerializableHash};
//! use serde_json::{json, Map, Value};
//!
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! impl SerializableHash for User {
//!     fn serializable_hash(&self, options: &ExposeOptions) -> Map<String, Value> {
//!         let mut map = Map::new();
//!         map.insert("id".into(), json!(self.id));
//!         map.insert("name".into(), json!(self.name));
//!         options.present(map)
//!     }
//! }
//!
//! impl Exposable for User {
//!     fn to_json(&self) -> Value {
//!         json!({"id": self.id})
//!     }
//!
//!     fn serializable_hash(&self) -> Option<&dyn SerializableHash> {
//!         Some(self)
//!     }
//! }
//!
//! let user = User { id: 1, name: "Alice".into() };
//! assert!(Exposable::serializable_hash(&user).is_some());
//! assert!(user.elements().is_none());
//! ```

use crate::options::ExposeOptions;
use crate::page::PageState;
use serde::Serialize;
use serde_json::{Map, Value};
use std::any::Any;
use std::sync::Arc;

/// A domain object that can be rendered into a response envelope.
pub trait Exposable: Send + Sync {
    /// The object as plain JSON, used when no other capability applies.
    fn to_json(&self) -> Value;

    /// The object as [`Any`], for serializers that need the concrete type.
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }

    /// Elements, when the object is an array-like collection.
    ///
    /// Map-like objects must return `None`.
    fn elements(&self) -> Option<Vec<&dyn Exposable>> {
        None
    }

    /// Page state, when the object is a will_paginate-style page.
    fn will_paginate(&self) -> Option<PageState> {
        None
    }

    /// Page state, when the object is a kaminari-style page.
    fn kaminari(&self) -> Option<PageState> {
        None
    }

    /// The serializer the object declares for itself.
    fn active_serializer(&self) -> Option<Arc<dyn Serializer>> {
        None
    }

    /// The object as a hash-serializable record.
    fn serializable_hash(&self) -> Option<&dyn SerializableHash> {
        None
    }

    /// The object as a value-serializable record.
    fn serializable_object(&self) -> Option<&dyn SerializableObject> {
        None
    }

    /// The identity used for ETag cache keys.
    fn cache_identity(&self) -> Option<&dyn CacheIdentity> {
        None
    }
}

/// An external serializer.
///
/// Serializers receive the object and the expose options with the root key
/// disabled.
pub trait Serializer: Send + Sync {
    /// Serializes `object`.
    fn serialize(&self, object: &dyn Exposable, options: &ExposeOptions) -> Value;
}

/// A [`Serializer`] backed by a closure.
pub struct FnSerializer<F> {
    func: F,
}

impl<F> FnSerializer<F>
where
    F: Fn(&dyn Exposable, &ExposeOptions) -> Value + Send + Sync,
{
    /// Wraps a closure.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Serializer for FnSerializer<F>
where
    F: Fn(&dyn Exposable, &ExposeOptions) -> Value + Send + Sync,
{
    fn serialize(&self, object: &dyn Exposable, options: &ExposeOptions) -> Value {
        (self.func)(object, options)
    }
}

/// A record that serializes itself to a JSON object.
pub trait SerializableHash {
    /// Returns the record's attributes.
    fn serializable_hash(&self, options: &ExposeOptions) -> Map<String, Value>;
}

/// A record that serializes itself to any JSON value.
pub trait SerializableObject {
    /// Returns the record's representation.
    fn serializable_object(&self, options: &ExposeOptions) -> Value;
}

/// Identity of an object for ETag caching.
pub trait CacheIdentity {
    /// The object's type name, used in derived cache keys.
    fn type_name(&self) -> &str;

    /// The object's identifier; `None` for unsaved objects.
    fn id(&self) -> Option<String>;

    /// Whether the object has not been persisted yet.
    fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// An explicit cache identity, overriding the derived one.
    fn object_key(&self) -> Option<String> {
        None
    }

    /// A persistence cache key that changes whenever the object changes.
    fn cache_key(&self) -> Option<String> {
        None
    }

    /// A debug representation, used when no cache key is available.
    fn inspect(&self) -> String;
}

/// Exposes any [`Serialize`] value as plain JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: Serialize + Send + Sync> Exposable for Json<T> {
    fn to_json(&self) -> Value {
        serde_json::to_value(&self.0).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to encode exposed value");
            Value::Null
        })
    }
}

impl Exposable for Value {
    fn to_json(&self) -> Value {
        self.clone()
    }

    fn elements(&self) -> Option<Vec<&dyn Exposable>> {
        match self {
            Value::Array(items) => Some(items.iter().map(|item| item as &dyn Exposable).collect()),
            _ => None,
        }
    }
}

impl Exposable for Map<String, Value> {
    fn to_json(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl<T: Exposable> Exposable for Vec<T> {
    fn to_json(&self) -> Value {
        Value::Array(self.iter().map(Exposable::to_json).collect())
    }

    fn elements(&self) -> Option<Vec<&dyn Exposable>> {
        Some(self.iter().map(|item| item as &dyn Exposable).collect())
    }
}

impl<T: Exposable> Exposable for Option<T> {
    fn to_json(&self) -> Value {
        self.as_ref().map_or(Value::Null, Exposable::to_json)
    }
}

macro_rules! scalar_exposable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Exposable for $ty {
                fn to_json(&self) -> Value {
                    Value::from(self.clone())
                }
            }
        )*
    };
}

scalar_exposable!(String, bool, i32, i64, u32, u64, f64);

impl Exposable for &'static str {
    fn to_json(&self) -> Value {
        Value::String((*self).to_string())
    }
}

macro_rules! delegate_exposable {
    ($($wrapper:ty),* $(,)?) => {
        $(
            impl<T: Exposable + ?Sized> Exposable for $wrapper {
                fn to_json(&self) -> Value {
                    (**self).to_json()
                }

                fn as_any(&self) -> Option<&dyn Any> {
                    (**self).as_any()
                }

                fn elements(&self) -> Option<Vec<&dyn Exposable>> {
                    (**self).elements()
                }

                fn will_paginate(&self) -> Option<PageState> {
                    (**self).will_paginate()
                }

                fn kaminari(&self) -> Option<PageState> {
                    (**self).kaminari()
                }

                fn active_serializer(&self) -> Option<Arc<dyn Serializer>> {
                    (**self).active_serializer()
                }

                fn serializable_hash(&self) -> Option<&dyn SerializableHash> {
                    (**self).serializable_hash()
                }

                fn serializable_object(&self) -> Option<&dyn SerializableObject> {
                    (**self).serializable_object()
                }

                fn cache_identity(&self) -> Option<&dyn CacheIdentity> {
                    (**self).cache_identity()
                }
            }
        )*
    };
}

delegate_exposable!(Box<T>, Arc<T>);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_json_wrapper() {
        let point = Json(Point { x: 1, y: 2 });
        assert_eq!(point.to_json(), json!({"x": 1, "y": 2}));
        assert!(point.elements().is_none());
    }

    #[test]
    fn test_value_array_has_elements() {
        let value = json!(["a", "b"]);
        let elements = value.elements().unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[1].to_json(), json!("b"));
    }

    #[test]
    fn test_value_object_is_not_a_collection() {
        let value = json!({"a": 1});
        assert!(value.elements().is_none());
        let map = value.as_object().unwrap().clone();
        assert!(map.elements().is_none());
    }

    #[test]
    fn test_vec_and_scalars() {
        let items = vec!["a", "b", "c"];
        assert_eq!(items.to_json(), json!(["a", "b", "c"]));
        assert_eq!(items.elements().unwrap().len(), 3);
        assert_eq!(42u64.to_json(), json!(42));
        assert_eq!(Some(true).to_json(), json!(true));
        assert_eq!(None::<String>.to_json(), Value::Null);
    }

    #[test]
    fn test_boxed_delegates() {
        let boxed: Box<dyn Exposable> = Box::new(json!([1, 2]));
        assert_eq!(boxed.elements().unwrap().len(), 2);
        let shared: Arc<dyn Exposable> = Arc::new(String::from("x"));
        assert_eq!(shared.to_json(), json!("x"));
    }

    #[test]
    fn test_fn_serializer() {
        let serializer = FnSerializer::new(|object: &dyn Exposable, _: &ExposeOptions| {
            json!({"wrapped": object.to_json()})
        });
        let out = serializer.serialize(&json!(1), &ExposeOptions::new());
        assert_eq!(out, json!({"wrapped": 1}));
    }
}
