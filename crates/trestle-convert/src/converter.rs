//! The ordered converter list.

use trestle_core::{Exposable, ExposeOptions};

/// One category of object conversion.
///
/// Variants are listed in priority order; the order is a priority list, not
/// a type hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Converter {
    /// will_paginate-style page (total entries, per page).
    WillPaginate,
    /// kaminari-style page (current page, number of pages).
    Kaminari,
    /// Array-like collection; excludes maps and single records.
    Collection,
    /// An explicit serializer option, or the object's own serializer.
    Serializer,
    /// A record that serializes itself.
    SerializableObject,
    /// Fallback: the object's plain JSON.
    Base,
}

impl Converter {
    /// Paginated converters, in priority order.
    pub const PAGINATED: [Converter; 2] = [Self::WillPaginate, Self::Kaminari];

    /// Collection converters, in priority order.
    pub const COLLECTION: [Converter; 3] = [Self::WillPaginate, Self::Kaminari, Self::Collection];

    /// Individual-record converters, in priority order.
    pub const INDIVIDUAL: [Converter; 3] = [Self::Serializer, Self::SerializableObject, Self::Base];

    /// Every converter, in priority order.
    pub const ALL: [Converter; 6] = [
        Self::WillPaginate,
        Self::Kaminari,
        Self::Collection,
        Self::Serializer,
        Self::SerializableObject,
        Self::Base,
    ];

    /// Returns the converter name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WillPaginate => "will_paginate",
            Self::Kaminari => "kaminari",
            Self::Collection => "collection",
            Self::Serializer => "serializer",
            Self::SerializableObject => "serializable_object",
            Self::Base => "base",
        }
    }

    /// Returns true if this converter produces collection metadata.
    #[must_use]
    pub const fn is_collection(self) -> bool {
        matches!(self, Self::WillPaginate | Self::Kaminari | Self::Collection)
    }

    /// Returns true if this converter produces pagination metadata.
    #[must_use]
    pub const fn is_paginated(self) -> bool {
        matches!(self, Self::WillPaginate | Self::Kaminari)
    }

    /// Returns true if this converter claims `object`.
    #[must_use]
    pub fn matches(self, object: &dyn Exposable, options: &ExposeOptions) -> bool {
        match self {
            Self::WillPaginate => object.will_paginate().is_some(),
            Self::Kaminari => object.kaminari().is_some(),
            Self::Collection => object.elements().is_some(),
            Self::Serializer => {
                options.serializer.is_some()
                    || (options.serializer_lookup && object.active_serializer().is_some())
            }
            Self::SerializableObject => {
                object.serializable_hash().is_some() || object.serializable_object().is_some()
            }
            Self::Base => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use trestle_core::{FnSerializer, WillPaginatePage};

    #[test]
    fn test_lists_are_consistent() {
        assert_eq!(Converter::ALL[..3], Converter::COLLECTION);
        assert_eq!(Converter::ALL[3..], Converter::INDIVIDUAL);
        assert_eq!(Converter::COLLECTION[..2], Converter::PAGINATED);
    }

    #[test]
    fn test_base_always_matches() {
        let options = ExposeOptions::new();
        assert!(Converter::Base.matches(&json!(null), &options));
        assert!(Converter::Base.matches(&json!({"a": 1}), &options));
    }

    #[test]
    fn test_collection_excludes_maps() {
        let options = ExposeOptions::new();
        assert!(Converter::Collection.matches(&json!([1]), &options));
        assert!(!Converter::Collection.matches(&json!({"a": [1]}), &options));
    }

    #[test]
    fn test_serializer_option_matches_anything() {
        let serializer = Arc::new(FnSerializer::new(|o: &dyn Exposable, _: &ExposeOptions| o.to_json()));
        let options = ExposeOptions::new().serializer(serializer);
        assert!(Converter::Serializer.matches(&json!("x"), &options));
        assert!(!Converter::Serializer.matches(&json!("x"), &ExposeOptions::new()));
    }

    #[test]
    fn test_paginated_matches() {
        let page = WillPaginatePage::new(vec![json!(1)], 1, 10, 1);
        let options = ExposeOptions::new();
        assert!(Converter::WillPaginate.matches(&page, &options));
        assert!(!Converter::Kaminari.matches(&page, &options));
        assert!(Converter::Collection.matches(&page, &options));
    }

    #[test]
    fn test_names() {
        let names: Vec<_> = Converter::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            ["will_paginate", "kaminari", "collection", "serializer", "serializable_object", "base"]
        );
        assert!(Converter::Kaminari.is_paginated());
        assert!(Converter::Collection.is_collection());
        assert!(!Converter::Base.is_collection());
    }
}
