//! Conversion errors.

use thiserror::Error;
use trestle_core::{Classified, ErrorClass, STANDARD_ERROR};

/// Class of every conversion error.
pub static CONVERSION_ERROR: ErrorClass = ErrorClass::new("ConversionError", Some(&STANDARD_ERROR));

/// Errors raised by converter dispatch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// No candidate converter claimed the object.
    #[error("no converter found for {object}")]
    NoConverter {
        /// JSON rendering of the rejected object.
        object: String,
    },
}

impl ConvertError {
    /// Creates a no-converter error.
    pub fn no_converter(object: impl Into<String>) -> Self {
        Self::NoConverter {
            object: object.into(),
        }
    }
}

impl Classified for ConvertError {
    fn error_class(&self) -> &'static ErrorClass {
        &CONVERSION_ERROR
    }
}
