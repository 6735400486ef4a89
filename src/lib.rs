//! Native handle ownership for managed-runtime bindings.
//!
//! This crate lets an object on the managed side of a foreign-function
//! boundary own a resource that lives on the native side, and guarantees
//! the resource is released exactly once: either when the holder asks for
//! it, or after the holder is dropped, on a background reclamation thread.
//! It also fixes how errors, optional values and collections cross the
//! same boundary.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use native_handle::{Call, NativeHandle, NativeObject, Value};
//!
//! fn main() -> native_handle::Result<()> {
//!     native_handle::init()?;
//!
//!     // Take ownership of a handle reported by native code.
//!     let conn = NativeObject::new(NativeHandle::from_raw(0x2a), |handle| {
//!         println!("closing connection {}", handle.as_raw());
//!         Ok(())
//!     });
//!
//!     // Use it through a boundary call; released handles never reach `f`.
//!     let rows = Call::new("row_count").invoke(&conn, |_handle| {
//!         Ok::<_, native_handle::NativeError>(3_i64)
//!     })?;
//!     assert_eq!(rows, Value::Long(3));
//!
//!     // Either destroy explicitly...
//!     conn.destroy_native()?;
//!
//!     // ...or just drop it and let the reclaimer release it.
//!     let temp = NativeObject::new(NativeHandle::from_raw(0x2b), |_| Ok(()));
//!     drop(temp);
//!     native_handle::wait_idle(Duration::from_secs(1));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Errors raised by native code
//!
//! Native code reports a failure as a symbolic class name plus a message.
//! The [`ExceptionBridge`] maps the name to a typed [`Error`]; names nobody
//! registered become [`Error::NativeExecution`] with the message intact.

pub mod bridge;
pub mod call;
pub mod capability;
pub mod error;
pub mod ffi;
pub mod marshal;
pub mod object;
pub mod reclaim;
mod registration;
pub mod types;

// Re-export main types at the crate root
pub use bridge::ExceptionBridge;
pub use call::Call;
pub use capability::NativeClass;
pub use error::{Error, Result};
pub use ffi::{error_from_native, ErrorClass, IntoNativeResult, NativeError, NativeHandle};
pub use marshal::{from_value, FromValue, IntoValue, Value};
pub use object::NativeObject;
pub use reclaim::{init, init_with, stats, wait_idle, Notification, ReclamationQueue};
pub use registration::{Destruct, RegistrationId};
pub use types::{ReclaimerOptions, ReclaimerStats};

/// Crate version constants.
pub mod version {
    /// Major version.
    pub const MAJOR: i32 = 0;
    /// Minor version.
    pub const MINOR: i32 = 1;
    /// Patch version.
    pub const PATCH: i32 = 0;
}

/// Get the version string (e.g., "0.1.0").
pub fn api_version() -> String {
    format!("{}.{}.{}", version::MAJOR, version::MINOR, version::PATCH)
}
