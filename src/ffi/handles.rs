//! Handle types for opaque references to native resources.
//!
//! Each handle type is a newtype wrapper around u64 to provide type safety.
//! Zero is the sentinel for "no resource held / already released".

/// Define a handle type.
///
/// Bindings use this to give each kind of native resource its own handle
/// type while sharing the sentinel convention.
///
/// ```
/// native_handle::define_handle!(DbConnection);
///
/// let conn = DbConnection::from_raw(7);
/// assert!(conn.is_valid());
/// assert!(!DbConnection::invalid().is_valid());
/// ```
#[macro_export]
macro_rules! define_handle {
    ($name:ident) => {
        /// Opaque handle to a native resource.
        #[repr(C)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            _h: u64,
        }

        impl $name {
            /// Create an invalid (null) handle.
            #[inline]
            pub const fn invalid() -> Self {
                Self { _h: 0 }
            }

            /// Wrap a raw value reported by the native side.
            #[inline]
            pub const fn from_raw(raw: u64) -> Self {
                Self { _h: raw }
            }

            /// Raw value of this handle.
            #[inline]
            pub const fn as_raw(&self) -> u64 {
                self._h
            }

            /// Check if this handle is valid (non-zero).
            #[inline]
            pub const fn is_valid(&self) -> bool {
                self._h != 0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl From<$name> for $crate::NativeHandle {
            fn from(handle: $name) -> Self {
                $crate::NativeHandle::from_raw(handle.as_raw())
            }
        }
    };
}

/// Untyped handle to a native resource.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle {
    _h: u64,
}

impl NativeHandle {
    /// The reserved "no resource" value.
    pub const SENTINEL: u64 = 0;

    /// Create an invalid (null) handle.
    #[inline]
    pub const fn invalid() -> Self {
        Self { _h: Self::SENTINEL }
    }

    /// Wrap a raw value reported by the native side.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self { _h: raw }
    }

    /// Raw value of this handle.
    #[inline]
    pub const fn as_raw(&self) -> u64 {
        self._h
    }

    /// Check if this handle is valid (non-zero).
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self._h != Self::SENTINEL
    }
}

impl Default for NativeHandle {
    fn default() -> Self {
        Self::invalid()
    }
}
