//! Error types for the native-handle crate.

use thiserror::Error;

/// Result type alias for native-handle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message of the error raised when a wrapper's native resource is gone.
pub const POINTER_IS_NULL: &str = "The pointer is null";

/// Message of the error raised by a second explicit destroy.
pub const ALREADY_DESTROYED: &str = "Native object already destroyed";

/// Message of the error raised when a nested value is unexpectedly null.
pub const VALUE_IS_NULL: &str = "The value is null";

/// Error type for native-handle operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A null value was passed where the native operation requires one.
    #[error("Null pointer in {operation} {parameter} argument")]
    NullArgument {
        /// Native operation that rejected the null.
        operation: String,
        /// Parameter of that operation.
        parameter: String,
    },

    /// The native resource behind a non-null wrapper was already released.
    #[error("{0}")]
    NullPointer(String),

    /// Object is in the wrong state for the call (e.g. destroyed twice).
    #[error("{0}")]
    IllegalState(String),

    /// Argument has the wrong kind or value.
    #[error("{0}")]
    IllegalArgument(String),

    /// Operation is not supported.
    #[error("{0}")]
    UnsupportedOperation(String),

    /// Method lookup on the native side failed.
    #[error("{0}")]
    NoSuchMethod(String),

    /// Field lookup on the native side failed.
    #[error("{0}")]
    NoSuchField(String),

    /// Generic checked failure.
    #[error("{0}")]
    Exception(String),

    /// Generic runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Native side reported an error whose type could not be resolved.
    #[error("{0}")]
    NativeExecution(String),

    /// Native side reported a registered, user-defined error type.
    #[error("{error}")]
    Thrown {
        /// Symbolic identifier the error was resolved from.
        class: String,
        /// The constructed error.
        error: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl Error {
    /// Null-argument error for `parameter` of `operation`.
    pub fn null_argument(operation: impl Into<String>, parameter: impl Into<String>) -> Self {
        Error::NullArgument {
            operation: operation.into(),
            parameter: parameter.into(),
        }
    }

    /// Null-pointer error for a released wrapper.
    pub fn null_pointer() -> Self {
        Error::NullPointer(POINTER_IS_NULL.to_string())
    }

    /// Invalid-state error for a second explicit destroy.
    pub fn already_destroyed() -> Self {
        Error::IllegalState(ALREADY_DESTROYED.to_string())
    }

    /// Symbolic identifier of this error's kind, as understood by the
    /// exception bridge.
    pub fn class_name(&self) -> &str {
        match self {
            Error::NullArgument { .. } | Error::NullPointer(_) => "NullPointerError",
            Error::IllegalState(_) => "IllegalStateError",
            Error::IllegalArgument(_) => "IllegalArgumentError",
            Error::UnsupportedOperation(_) => "UnsupportedOperationError",
            Error::NoSuchMethod(_) => "NoSuchMethodError",
            Error::NoSuchField(_) => "NoSuchFieldError",
            Error::Exception(_) => "Exception",
            Error::Runtime(_) => "RuntimeError",
            Error::NativeExecution(_) => "NativeExecutionError",
            Error::Thrown { class, .. } => class,
        }
    }

    /// Borrow a bridge-constructed error as its concrete type.
    pub fn downcast_ref<T: std::error::Error + 'static>(&self) -> Option<&T> {
        match self {
            Error::Thrown { error, .. } => error.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Check if this is a null-argument error.
    pub fn is_null_argument(&self) -> bool {
        matches!(self, Error::NullArgument { .. })
    }

    /// Check if this is a null-pointer error.
    pub fn is_null_pointer(&self) -> bool {
        matches!(self, Error::NullPointer(_))
    }

    /// Check if this is an invalid-state error.
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Error::IllegalState(_))
    }

    /// Check if this is a failed method lookup.
    pub fn is_no_such_method(&self) -> bool {
        matches!(self, Error::NoSuchMethod(_))
    }

    /// Check if this is a failed field lookup.
    pub fn is_no_such_field(&self) -> bool {
        matches!(self, Error::NoSuchField(_))
    }

    /// Check if this is a native-execution error.
    pub fn is_native_execution(&self) -> bool {
        matches!(self, Error::NativeExecution(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_messages() {
        assert_eq!(
            Error::null_argument("get_list", "obj").to_string(),
            "Null pointer in get_list obj argument"
        );
        assert_eq!(Error::null_pointer().to_string(), "The pointer is null");
        assert_eq!(
            Error::already_destroyed().to_string(),
            "Native object already destroyed"
        );
    }

    #[test]
    fn test_null_kinds_stay_distinct() {
        let arg = Error::null_argument("call_method", "obj");
        let ptr = Error::null_pointer();

        assert!(arg.is_null_argument());
        assert!(!arg.is_null_pointer());
        assert!(ptr.is_null_pointer());
        assert!(!ptr.is_null_argument());
    }
}
