//! Boundary calls into native code.
//!
//! A [`Call`] is named after the native operation it wraps. It decodes
//! arguments (reporting nulls against that operation and parameter),
//! refuses released handles before the native code runs, and turns errors
//! reported by the native side into typed errors through the exception
//! bridge.
//!
//! ```
//! use native_handle::{Call, Value};
//!
//! let call = Call::new("get_list");
//! let err = call.arg::<Vec<String>>("obj", Value::Null).unwrap_err();
//! assert_eq!(err.to_string(), "Null pointer in get_list obj argument");
//!
//! let absent: Option<Vec<String>> = call.arg("obj", Value::Null).unwrap();
//! assert_eq!(absent, None);
//! ```

use crate::capability::NativeClass;
use crate::error::{Error, Result};
use crate::ffi::{NativeError, NativeHandle};
use crate::marshal::{FromValue, IntoValue, Value};

/// Context for one call across the boundary.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    operation: &'a str,
}

impl<'a> Call<'a> {
    pub fn new(operation: &'a str) -> Self {
        Self { operation }
    }

    /// Name of the native operation.
    pub fn operation(&self) -> &'a str {
        self.operation
    }

    /// Decode argument `parameter`.
    ///
    /// Null is accepted only by optional types; otherwise it is a
    /// null-argument error naming this operation and `parameter`.
    pub fn arg<T: FromValue>(&self, parameter: &str, value: Value) -> Result<T> {
        if value.is_null() {
            return T::from_null().ok_or_else(|| {
                tracing::trace!(operation = self.operation, parameter, "null argument rejected");
                Error::null_argument(self.operation, parameter)
            });
        }
        T::from_value(value)
    }

    /// Decode an object argument to its handle.
    ///
    /// A null argument and a released object fail differently: the first
    /// with a null-argument error, the second with "The pointer is null".
    pub fn object(&self, parameter: &str, value: Value) -> Result<NativeHandle> {
        self.arg(parameter, value)
    }

    /// Run `f` with the handle of `target`, then marshal its result.
    ///
    /// `f` never runs if `target` was released. The handle stays guarded
    /// against concurrent release for the duration of `f`.
    pub fn invoke<C, T, F>(&self, target: &C, f: F) -> Result<Value>
    where
        C: NativeClass + ?Sized,
        T: IntoValue,
        F: FnOnce(NativeHandle) -> std::result::Result<T, NativeError>,
    {
        target
            .inner()
            .with_handle(|handle| self.finish(f(handle)))
    }

    /// Convert the native side's result into a boundary value.
    ///
    /// Errors are resolved by their reported class through the exception
    /// bridge, so the caller sees the typed error the native side named.
    pub fn finish<T: IntoValue>(
        &self,
        result: std::result::Result<T, NativeError>,
    ) -> Result<Value> {
        match result {
            Ok(value) => Ok(value.into_value()),
            Err(e) => {
                tracing::trace!(operation = self.operation, class = ?e.class, "native call failed");
                Err(e.into_error())
            }
        }
    }
}
