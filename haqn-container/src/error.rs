//! Error types for Haqn container operations.
//!
//! Message texts are stable: callers match on them.

use crate::descriptor::Kind;
use crate::key::TypeKey;

/// Main error type for all Haqn operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HaqnError {
    /// The abstract passed to `bind` is neither an interface marker nor a
    /// registered struct value.
    #[error("binding error! Invalid arguments")]
    InvalidArguments,

    /// The concrete bound to an interface does not implement it.
    #[error("{concrete} is not an instance of {abstract_type}")]
    InvalidInstance {
        concrete: String,
        abstract_type: String,
    },

    /// A struct binding got `Arc<S>` as the abstract, or a factory as the
    /// concrete.
    #[error("called structOf with a value that is not a pointer to a struct. (*MyStruct)(nil)")]
    InvalidStruct,

    /// A struct binding got an `Arc` of some other type.
    #[error("expects {expected}. Got {actual}")]
    InvalidStructConcrete { expected: String, actual: String },

    /// The abstract passed to `resolve` could not be classified.
    #[error("resolving error! Invalid arguments")]
    InvalidArgument,

    /// Nothing is bound under the requested abstract.
    #[error("{key} is not bound yet")]
    NotExistAbstract { key: TypeKey },

    /// A factory was resolved with the wrong number of arguments.
    #[error("expects to have {expected} input arguments. Got {actual}")]
    InsufficientArguments { expected: usize, actual: usize },

    /// A factory returned no values.
    #[error("expects to have at least 1 value returned. Got 0")]
    NonValuesReturned,

    /// `inject` was called on something that is not an injectable struct.
    #[error("injecting to {kind} is not supported")]
    InvalidTargetType { kind: Kind },

    /// A factory argument does not have the parameter's type.
    #[error("argument {index} expects {expected}. Got {actual}")]
    ArgumentTypeMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    /// A resolved value cannot be stored where it was requested.
    #[error("{actual} cannot be assigned to {expected}")]
    UnassignableValue { expected: String, actual: String },
}

/// Convenient Result type for Haqn operations.
pub type Result<T> = std::result::Result<T, HaqnError>;
