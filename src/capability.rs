//! Native-handle semantics by composition.
//!
//! Types that cannot be a [`NativeObject`] themselves hold one and
//! implement [`NativeClass`] to forward validity and destruction to it.
//!
//! ```
//! use native_handle::{NativeClass, NativeHandle, NativeObject};
//!
//! struct Session {
//!     name: String,
//!     inner: NativeObject,
//! }
//!
//! impl NativeClass for Session {
//!     fn inner(&self) -> &NativeObject {
//!         &self.inner
//!     }
//! }
//!
//! let session = Session {
//!     name: "primary".to_string(),
//!     inner: NativeObject::new(NativeHandle::from_raw(9), |_| Ok(())),
//! };
//!
//! assert!(session.is_valid());
//! session.destroy_native()?;
//! assert!(!session.is_valid());
//! # Ok::<(), native_handle::Error>(())
//! ```

use crate::error::Result;
use crate::ffi::NativeHandle;
use crate::object::NativeObject;

/// Forwards handle-owning behaviour to an inner [`NativeObject`].
pub trait NativeClass {
    fn inner(&self) -> &NativeObject;

    fn is_valid(&self) -> bool {
        self.inner().is_valid()
    }

    fn handle(&self) -> NativeHandle {
        self.inner().handle()
    }

    fn destroy_native(&self) -> Result<()> {
        self.inner().destroy_native()
    }
}

impl NativeClass for NativeObject {
    fn inner(&self) -> &NativeObject {
        self
    }
}

impl<T: NativeClass + ?Sized> NativeClass for std::sync::Arc<T> {
    fn inner(&self) -> &NativeObject {
        (**self).inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Composite {
        inner: NativeObject,
    }

    impl NativeClass for Composite {
        fn inner(&self) -> &NativeObject {
            &self.inner
        }
    }

    #[test]
    fn test_forwards_to_inner() {
        let c = Composite {
            inner: NativeObject::new(NativeHandle::from_raw(77), |_| Ok(())),
        };
        assert!(NativeClass::is_valid(&c));
        assert_eq!(NativeClass::handle(&c).as_raw(), 77);

        NativeClass::destroy_native(&c).unwrap();
        assert!(!c.inner.is_valid());
        assert_eq!(
            NativeClass::destroy_native(&c).unwrap_err().to_string(),
            "Native object already destroyed"
        );
    }

    #[test]
    fn test_shared_composite() {
        let c = std::sync::Arc::new(Composite {
            inner: NativeObject::new(NativeHandle::from_raw(78), |_| Ok(())),
        });
        let other = std::sync::Arc::clone(&c);
        std::thread::spawn(move || other.destroy_native())
            .join()
            .unwrap()
            .unwrap();
        assert!(!c.is_valid());
    }
}
