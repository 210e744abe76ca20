//! Converter selection and conversion.

use crate::converter::Converter;
use crate::error::ConvertError;
use crate::payload::{ConvertedPayload, Pagination};
use serde_json::{Map, Value};
use std::borrow::Cow;
use trestle_core::{Exposable, ExposeOptions, PageState};

/// Selects the first converter in [`Converter::ALL`] that claims `object`.
///
/// # Errors
///
/// Returns [`ConvertError::NoConverter`] if nothing claims the object. The
/// [`Converter::Base`] fallback makes this unreachable with the default list.
pub fn fetch<'a>(
    object: &'a dyn Exposable,
    options: &'a ExposeOptions,
) -> Result<Conversion<'a>, ConvertError> {
    fetch_from(&Converter::ALL, object, options)
}

/// Selects the first converter in `candidates` that claims `object`.
///
/// # Errors
///
/// Returns [`ConvertError::NoConverter`] if no candidate matches.
pub fn fetch_from<'a>(
    candidates: &[Converter],
    object: &'a dyn Exposable,
    options: &'a ExposeOptions,
) -> Result<Conversion<'a>, ConvertError> {
    let converter = candidates
        .iter()
        .copied()
        .find(|converter| converter.matches(object, options))
        .ok_or_else(|| ConvertError::no_converter(object.to_json().to_string()))?;

    tracing::trace!(converter = converter.name(), "selected converter");

    Ok(Conversion {
        converter,
        object,
        options,
    })
}

/// Converts a single record through the individual converters only.
///
/// # Errors
///
/// Returns [`ConvertError::NoConverter`] if no individual converter matches.
pub fn serialize_single(
    object: &dyn Exposable,
    options: &ExposeOptions,
) -> Result<Value, ConvertError> {
    fetch_from(&Converter::INDIVIDUAL, object, options)?.convert()
}

/// A converter bound to the object and options it was selected for.
#[derive(Clone, Copy)]
pub struct Conversion<'a> {
    converter: Converter,
    object: &'a dyn Exposable,
    options: &'a ExposeOptions,
}

impl<'a> Conversion<'a> {
    /// The selected converter.
    #[must_use]
    pub fn converter(&self) -> Converter {
        self.converter
    }

    /// The envelope key for the converted body.
    #[must_use]
    pub fn response_key(&self) -> &'a str {
        self.options.response_key_or_default()
    }

    /// Converts the object into its body.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] if a collection element cannot be converted.
    pub fn convert(&self) -> Result<Value, ConvertError> {
        match self.converter {
            Converter::WillPaginate | Converter::Kaminari | Converter::Collection => {
                let options = self.element_options();
                self.elements()
                    .into_iter()
                    .map(|element| serialize_single(element, &options))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            Converter::Serializer => Ok(self.serialize()),
            Converter::SerializableObject => Ok(self.serialize_self()),
            Converter::Base => Ok(self.object.to_json()),
        }
    }

    /// Converter metadata: `count` for collections, plus `pagination` for pages.
    #[must_use]
    pub fn metadata(&self) -> Map<String, Value> {
        let mut metadata = Map::new();
        if self.converter.is_collection() {
            metadata.insert("count".into(), Value::from(self.elements().len()));
        }
        if let Some(pagination) = self.pagination() {
            metadata.insert("pagination".into(), pagination.to_value());
        }
        metadata
    }

    /// Pagination, when the converter is paginated.
    #[must_use]
    pub fn pagination(&self) -> Option<Pagination> {
        let state: Option<PageState> = match self.converter {
            Converter::WillPaginate => self.object.will_paginate(),
            Converter::Kaminari => self.object.kaminari(),
            _ => None,
        };
        state.map(Pagination::from)
    }

    /// Converts the object and collects body, metadata and response key.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] if conversion fails.
    pub fn payload(&self) -> Result<ConvertedPayload, ConvertError> {
        Ok(ConvertedPayload {
            body: self.convert()?,
            metadata: self.metadata(),
            response_key: self.response_key().to_string(),
        })
    }

    fn elements(&self) -> Vec<&'a dyn Exposable> {
        self.object.elements().unwrap_or_default()
    }

    fn element_options(&self) -> Cow<'a, ExposeOptions> {
        match &self.options.each_serializer {
            Some(each) => {
                let mut options = self.options.clone();
                options.serializer = Some(each.clone());
                Cow::Owned(options)
            }
            None => Cow::Borrowed(self.options),
        }
    }

    fn serialize(&self) -> Value {
        let serializer = self
            .options
            .serializer
            .clone()
            .or_else(|| self.object.active_serializer());
        match serializer {
            Some(serializer) => serializer.serialize(self.object, &self.options.for_serializer()),
            None => self.object.to_json(),
        }
    }

    fn serialize_self(&self) -> Value {
        if let Some(record) = self.object.serializable_hash() {
            return Value::Object(record.serializable_hash(self.options));
        }
        match self.object.serializable_object() {
            Some(record) => record.serializable_object(self.options),
            None => self.object.to_json(),
        }
    }
}

impl std::fmt::Debug for Conversion<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversion")
            .field("converter", &self.converter)
            .field("options", self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use trestle_core::{FnSerializer, KaminariPage, SerializableHash, Serializer, WillPaginatePage};

    struct Record {
        id: u64,
        name: &'static str,
    }

    impl SerializableHash for Record {
        fn serializable_hash(&self, options: &ExposeOptions) -> Map<String, Value> {
            let mut map = Map::new();
            map.insert("id".into(), json!(self.id));
            map.insert("name".into(), json!(self.name));
            options.present(map)
        }
    }

    impl Exposable for Record {
        fn to_json(&self) -> Value {
            json!(self.id)
        }

        fn serializable_hash(&self) -> Option<&dyn SerializableHash> {
            Some(self)
        }
    }

    fn wrapping() -> Arc<dyn Serializer> {
        Arc::new(FnSerializer::new(|object: &dyn Exposable, _: &ExposeOptions| {
            json!({"wrapped": object.to_json()})
        }))
    }

    #[test]
    fn test_empty_collection_counts_zero() {
        let object = json!([]);
        let options = ExposeOptions::new();
        let payload = fetch(&object, &options).unwrap().payload().unwrap();
        assert_eq!(payload.body, json!([]));
        assert_eq!(payload.metadata["count"], json!(0));
        assert_eq!(payload.response_key, "response");
    }

    #[test]
    fn test_base_passes_through() {
        let object = json!({"a": [1, 2]});
        let options = ExposeOptions::new();
        let conversion = fetch(&object, &options).unwrap();
        assert_eq!(conversion.converter(), Converter::Base);
        assert_eq!(conversion.convert().unwrap(), object);
        assert!(conversion.metadata().is_empty());
    }

    #[test]
    fn test_serializable_record_respects_only() {
        let record = Record { id: 1, name: "Alice" };
        let options = ExposeOptions::new().only(["name"]);
        let conversion = fetch(&record, &options).unwrap();
        assert_eq!(conversion.converter(), Converter::SerializableObject);
        assert_eq!(conversion.convert().unwrap(), json!({"name": "Alice"}));
    }

    #[test]
    fn test_collection_elements_use_individual_converters() {
        let records = vec![Record { id: 1, name: "a" }, Record { id: 2, name: "b" }];
        let options = ExposeOptions::new();
        let payload = fetch(&records, &options).unwrap().payload().unwrap();
        assert_eq!(
            payload.body,
            json!([{"id": 1, "name": "a"}, {"id": 2, "name": "b"}])
        );
        assert_eq!(payload.metadata["count"], json!(2));
    }

    #[test]
    fn test_nested_array_element_is_not_a_collection() {
        let object = json!([[1, 2], [3]]);
        let options = ExposeOptions::new();
        let payload = fetch(&object, &options).unwrap().payload().unwrap();
        assert_eq!(payload.body, json!([[1, 2], [3]]));
        assert_eq!(payload.metadata["count"], json!(2));
    }

    #[test]
    fn test_each_serializer_applies_to_elements() {
        let object = json!([1, 2]);
        let options = ExposeOptions::new().each_serializer(wrapping());
        let body = fetch(&object, &options).unwrap().convert().unwrap();
        assert_eq!(body, json!([{"wrapped": 1}, {"wrapped": 2}]));
    }

    #[test]
    fn test_explicit_serializer_on_single_object() {
        let object = json!("x");
        let options = ExposeOptions::new().serializer(wrapping());
        let conversion = fetch(&object, &options).unwrap();
        assert_eq!(conversion.converter(), Converter::Serializer);
        assert_eq!(conversion.convert().unwrap(), json!({"wrapped": "x"}));
    }

    #[test]
    fn test_will_paginate_metadata() {
        let page = WillPaginatePage::new(vec![json!("a"), json!("b")], 2, 2, 40);
        let options = ExposeOptions::new();
        let conversion = fetch(&page, &options).unwrap();
        assert_eq!(conversion.converter(), Converter::WillPaginate);
        let metadata = conversion.metadata();
        assert_eq!(metadata["count"], json!(2));
        assert_eq!(
            metadata["pagination"],
            json!({"current": 2, "previous": 1, "next": 3, "per_page": 2, "count": 40, "pages": 20})
        );
        let keys: Vec<_> = metadata.keys().cloned().collect();
        assert_eq!(keys, ["count", "pagination"]);
    }

    #[test]
    fn test_kaminari_last_page() {
        let page = KaminariPage::new(vec![json!(1)], 3, 10, 25);
        let options = ExposeOptions::new();
        let pagination = fetch(&page, &options).unwrap().pagination().unwrap();
        assert_eq!(pagination.pages, 3);
        assert_eq!(pagination.next, None);
        assert_eq!(pagination.previous, Some(2));
    }

    #[test]
    fn test_custom_response_key() {
        let object = json!(1);
        let options = ExposeOptions::new().response_key("user");
        let payload = fetch(&object, &options).unwrap().payload().unwrap();
        assert_eq!(payload.response_key, "user");
    }

    #[test]
    fn test_empty_candidate_list_fails() {
        let object = json!(1);
        let options = ExposeOptions::new();
        let err = fetch_from(&[], &object, &options).unwrap_err();
        assert_eq!(err, ConvertError::no_converter("1"));
    }

    #[test]
    fn test_serialize_single_skips_collections() {
        let object = json!([1, 2]);
        let options = ExposeOptions::new();
        let value = serialize_single(&object, &options).unwrap();
        assert_eq!(value, json!([1, 2]));
        let scalar = json!(1);
        assert!(fetch_from(&[Converter::Collection], &scalar, &options).is_err());
    }
}
