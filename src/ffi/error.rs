//! Errors reported from the native side of the boundary.
//!
//! Native code reports failures as a symbolic error-type identifier plus a
//! message. [`error_from_native`] turns that pair into a crate [`Error`]
//! through the exception bridge.

use std::fmt;

use crate::bridge::ExceptionBridge;
use crate::error::Error;

/// Symbolic error-type identifiers known to the bridge.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    NullPointer,
    IllegalArgument,
    IllegalState,
    UnsupportedOperation,
    NoSuchMethod,
    NoSuchField,
    /// Generic checked failure.
    Exception,
    #[default]
    Runtime,
    NativeExecution,
    /// Any identifier registered with the bridge at runtime.
    Any(String),
}

impl ErrorClass {
    /// The identifier string the bridge resolves.
    pub fn as_str(&self) -> &str {
        match self {
            ErrorClass::NullPointer => "NullPointerError",
            ErrorClass::IllegalArgument => "IllegalArgumentError",
            ErrorClass::IllegalState => "IllegalStateError",
            ErrorClass::UnsupportedOperation => "UnsupportedOperationError",
            ErrorClass::NoSuchMethod => "NoSuchMethodError",
            ErrorClass::NoSuchField => "NoSuchFieldError",
            ErrorClass::Exception => "Exception",
            ErrorClass::Runtime => "RuntimeError",
            ErrorClass::NativeExecution => "NativeExecutionError",
            ErrorClass::Any(name) => name,
        }
    }

    /// Identifiers of the built-in classes.
    pub(crate) const BUILTIN: [ErrorClass; 9] = [
        ErrorClass::NullPointer,
        ErrorClass::IllegalArgument,
        ErrorClass::IllegalState,
        ErrorClass::UnsupportedOperation,
        ErrorClass::NoSuchMethod,
        ErrorClass::NoSuchField,
        ErrorClass::Exception,
        ErrorClass::Runtime,
        ErrorClass::NativeExecution,
    ];
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error produced by native code, not yet resolved to a typed [`Error`].
#[derive(Debug, Clone)]
pub struct NativeError {
    pub message: String,
    pub class: Option<ErrorClass>,
}

impl NativeError {
    pub fn new<T: ToString>(message: T, class: Option<ErrorClass>) -> Self {
        Self {
            message: message.to_string(),
            class,
        }
    }

    /// Error reported as the default [`ErrorClass::Runtime`].
    pub fn runtime_error<T: ToString>(message: T) -> Self {
        Self::new(message, None)
    }

    /// Set the class if none was reported yet.
    pub fn or_class(mut self, class: ErrorClass) -> Self {
        if self.class.is_none() {
            self.class = Some(class);
        }
        self
    }

    /// Resolve through the process-wide exception bridge.
    pub fn into_error(self) -> Error {
        error_from_native(self.class.unwrap_or_default().as_str(), self.message)
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for NativeError {}

impl From<anyhow::Error> for NativeError {
    fn from(value: anyhow::Error) -> Self {
        NativeError::new(value, None)
    }
}

impl From<String> for NativeError {
    fn from(value: String) -> Self {
        NativeError::new(value, None)
    }
}

impl From<&str> for NativeError {
    fn from(value: &str) -> Self {
        NativeError::new(value, None)
    }
}

impl From<Error> for NativeError {
    fn from(value: Error) -> Self {
        let class = match value.class_name() {
            "RuntimeError" => ErrorClass::Runtime,
            "NullPointerError" => ErrorClass::NullPointer,
            "IllegalArgumentError" => ErrorClass::IllegalArgument,
            "IllegalStateError" => ErrorClass::IllegalState,
            "UnsupportedOperationError" => ErrorClass::UnsupportedOperation,
            "NoSuchMethodError" => ErrorClass::NoSuchMethod,
            "NoSuchFieldError" => ErrorClass::NoSuchField,
            "Exception" => ErrorClass::Exception,
            "NativeExecutionError" => ErrorClass::NativeExecution,
            other => ErrorClass::Any(other.to_string()),
        };
        NativeError::new(value, Some(class))
    }
}

/// Adapt any `Result` whose error converts into [`NativeError`], so
/// foreign errors can be propagated with `?` inside native calls.
///
/// ```
/// use native_handle::{IntoNativeResult, NativeError};
///
/// fn parse(input: &str) -> Result<i32, NativeError> {
///     let n = input.parse::<i32>().map_err(|e| e.to_string()).into_native_result()?;
///     Ok(n * 2)
/// }
///
/// assert_eq!(parse("21").unwrap(), 42);
/// assert!(parse("x").unwrap_err().class.is_none());
/// ```
pub trait IntoNativeResult<T> {
    fn into_native_result(self) -> Result<T, NativeError>;
}

impl<T, R: Into<NativeError>> IntoNativeResult<T> for Result<T, R> {
    fn into_native_result(self) -> Result<T, NativeError> {
        self.map_err(Into::into)
    }
}

/// Convert a native-reported (identifier, message) pair into an [`Error`].
///
/// Unknown identifiers fall back to [`Error::NativeExecution`].
pub fn error_from_native(class: &str, message: impl Into<String>) -> Error {
    ExceptionBridge::global().throw_new(class, message)
}

/// Return early with a [`NativeError`] of the default class.
///
/// ```
/// fn fails() -> Result<(), native_handle::NativeError> {
///     native_handle::bail!("bad value {}", 3);
/// }
///
/// assert_eq!(fails().unwrap_err().message, "bad value 3");
/// ```
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::NativeError::new(format!($($arg)*), None))
    };
}

/// Return early with a [`NativeError`] of the given class.
///
/// ```
/// use native_handle::{bail_class, ErrorClass, NativeError};
///
/// fn fails() -> Result<(), NativeError> {
///     bail_class!(ErrorClass::Any("app.QuotaExceeded".to_string()), "over by {}", 2);
/// }
///
/// let err = fails().unwrap_err();
/// assert_eq!(err.class.unwrap().as_str(), "app.QuotaExceeded");
/// ```
#[macro_export]
macro_rules! bail_class {
    ($cls:expr, $($arg:tt)*) => {
        return Err($crate::NativeError::new(format!($($arg)*), Some($cls)))
    };
}

/// Build a [`NativeError`] of the default class.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::NativeError::new(format!($($arg)*), None)
    };
}

/// Build a [`NativeError`] of the given class.
#[macro_export]
macro_rules! error_class {
    ($cls:expr, $($arg:tt)*) => {
        $crate::NativeError::new(format!($($arg)*), Some($cls))
    };
}
