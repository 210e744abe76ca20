//! Declared error class hierarchy.
//!
//! Error mappings are keyed by class name and resolved by walking a failure's
//! class chain nearest-first. Application error types join the hierarchy by
//! implementing [`Classified`] and pointing at a static [`ErrorClass`].
//!
//! ```
//! use trestle_core::{Classified, ErrorClass, STANDARD_ERROR};
//!
//! static RECORD_ERROR: ErrorClass = ErrorClass::new("RecordError", Some(&STANDARD_ERROR));
//! static RECORD_NOT_FOUND: ErrorClass = ErrorClass::new("RecordNotFound", Some(&RECORD_ERROR));
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("record {0} not found")]
//! struct RecordNotFound(u64);
//!
//! impl Classified for RecordNotFound {
//!     fn error_class(&self) -> &'static ErrorClass {
//!         &RECORD_NOT_FOUND
//!     }
//! }
//!
//! let names: Vec<_> = RECORD_NOT_FOUND.ancestors().map(ErrorClass::name).collect();
//! assert_eq!(names, ["RecordNotFound", "RecordError", "StandardError"]);
//! ```

use std::fmt;

/// Root of every error class. Mappings never match it directly.
pub static STANDARD_ERROR: ErrorClass = ErrorClass::new("StandardError", None);

/// Class assigned to opaque failures that declare no class of their own.
pub static RUNTIME_ERROR: ErrorClass = ErrorClass::new("RuntimeError", Some(&STANDARD_ERROR));

/// Class every registered error kind descends from.
pub static API_ERROR: ErrorClass = ErrorClass::new("Error", Some(&STANDARD_ERROR));

/// A node in the declared error class hierarchy.
#[derive(Debug)]
pub struct ErrorClass {
    name: &'static str,
    parent: Option<&'static ErrorClass>,
}

impl ErrorClass {
    /// Declares a class with an optional parent.
    pub const fn new(name: &'static str, parent: Option<&'static ErrorClass>) -> Self {
        Self { name, parent }
    }

    /// The class name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The parent class, if any.
    pub const fn parent(&self) -> Option<&'static ErrorClass> {
        self.parent
    }

    /// Iterates from this class up to the root, nearest first.
    pub fn ancestors(&'static self) -> impl Iterator<Item = &'static ErrorClass> {
        std::iter::successors(Some(self), |class| class.parent)
    }

    /// Returns true if this class is the hierarchy root.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns true if this class is `other` or descends from it.
    pub fn is_a(&'static self, other: &ErrorClass) -> bool {
        self.ancestors().any(|class| class.name == other.name)
    }
}

impl PartialEq for ErrorClass {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ErrorClass {}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An error type that declares its place in the class hierarchy.
///
/// Implementing this lets `?` convert the error into a
/// [`Failure`](crate::Failure) that error mappings can match.
pub trait Classified: std::error::Error + Send + Sync + 'static {
    /// The class of this error.
    fn error_class(&self) -> &'static ErrorClass;
}

#[cfg(test)]
mod tests {
    use super::*;

    static PARENT: ErrorClass = ErrorClass::new("Parent", Some(&STANDARD_ERROR));
    static CHILD: ErrorClass = ErrorClass::new("Child", Some(&PARENT));

    #[test]
    fn test_ancestors() {
        let names: Vec<_> = CHILD.ancestors().map(ErrorClass::name).collect();
        assert_eq!(names, vec!["Child", "Parent", "StandardError"]);
    }

    #[test]
    fn test_is_a() {
        assert!(CHILD.is_a(&PARENT));
        assert!(CHILD.is_a(&STANDARD_ERROR));
        assert!(!PARENT.is_a(&CHILD));
    }

    #[test]
    fn test_root() {
        assert!(STANDARD_ERROR.is_root());
        assert!(!RUNTIME_ERROR.is_root());
        assert_eq!(RUNTIME_ERROR.to_string(), "RuntimeError");
    }
}
