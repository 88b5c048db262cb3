//! Structured errors for property access and method dispatch.
//!
//! Every user-visible failure is a returned [`AccessError`]; the runtime
//! never unwinds on valid API use. Violations of internal data-structure
//! invariants are bugs, not members of this taxonomy.

use thiserror::Error;

use crate::intern::Identifier;

/// Result alias for property access and method dispatch.
pub type AccessResult<T> = Result<T, AccessError>;

/// Failure modes of `get`, `get_as`, `call`, and `call_as`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The identifier resolves neither on the object nor on any prototype.
    #[error("no such property: id {key}")]
    NoSuchProperty {
        /// The identifier that failed to resolve.
        key: Identifier,
    },

    /// The property exists but its stored tag does not match the requested
    /// typed view.
    #[error("type mismatch for property id {key}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The identifier that resolved to a differently-tagged cell.
        key: Identifier,
        /// Tag name requested by the caller.
        expected: &'static str,
        /// Tag name of the stored value.
        found: &'static str,
    },

    /// A callable was invoked successfully but its untyped return value did
    /// not match the requested typed view.
    #[error("type mismatch for method return value: expected {expected}, found {found}")]
    MethodReturnTypeMismatch {
        /// Tag name requested by the caller.
        expected: &'static str,
        /// Tag name of the returned value.
        found: &'static str,
    },

    /// `call` resolved the property but the stored value is not a callable.
    #[error("property id {key} is not callable (found {found})")]
    NotCallable {
        /// The identifier that resolved to a non-callable cell.
        key: Identifier,
        /// Tag name of the stored value.
        found: &'static str,
    },
}

impl AccessError {
    /// The identifier involved in the failure, if the error names one.
    #[inline]
    pub fn key(&self) -> Option<Identifier> {
        match self {
            Self::NoSuchProperty { key }
            | Self::TypeMismatch { key, .. }
            | Self::NotCallable { key, .. } => Some(*key),
            Self::MethodReturnTypeMismatch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = AccessError::NoSuchProperty {
            key: Identifier::from_raw(3),
        };
        assert_eq!(err.to_string(), "no such property: id 3");

        let err = AccessError::TypeMismatch {
            key: Identifier::from_raw(0),
            expected: "int",
            found: "string",
        };
        assert_eq!(
            err.to_string(),
            "type mismatch for property id 0: expected int, found string"
        );
    }

    #[test]
    fn test_key_accessor() {
        let key = Identifier::from_raw(7);
        assert_eq!(AccessError::NoSuchProperty { key }.key(), Some(key));
        assert_eq!(
            AccessError::MethodReturnTypeMismatch {
                expected: "int",
                found: "string",
            }
            .key(),
            None
        );
    }
}
