//! Boundary-level primitives shared with the native side.
//!
//! Handles and native-reported errors live here; the safe wrappers built on
//! them are in the parent modules.

pub mod error;
pub mod handles;

pub use error::{error_from_native, ErrorClass, IntoNativeResult, NativeError};
pub use handles::NativeHandle;
