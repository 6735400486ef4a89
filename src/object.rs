//! The handle-owning wrapper.

use std::sync::Arc;

use crate::error::Result;
use crate::ffi::NativeHandle;
use crate::reclaim;
use crate::registration::{Destruct, Registration, RegistrationId};

/// Owns one native handle and guarantees it is released exactly once.
///
/// Release happens either explicitly through
/// [`destroy_native`](Self::destroy_native) or, if the object is dropped
/// while still valid, on the background reclamation thread.
///
/// # Example
///
/// ```
/// use native_handle::{NativeHandle, NativeObject};
///
/// let obj = NativeObject::new(NativeHandle::from_raw(42), |handle: NativeHandle| {
///     println!("closing {}", handle.as_raw());
///     Ok(())
/// });
///
/// assert!(obj.is_valid());
/// obj.destroy_native()?;
/// assert!(!obj.is_valid());
///
/// let err = obj.destroy_native().unwrap_err();
/// assert_eq!(err.to_string(), "Native object already destroyed");
/// # Ok::<(), native_handle::Error>(())
/// ```
pub struct NativeObject {
    registration: Arc<Registration>,
}

impl NativeObject {
    /// Take ownership of `handle`, released later by `destructor`.
    ///
    /// The handle must be a live value from the native side and must not be
    /// owned by any other object. Starts the reclamation thread if needed.
    pub fn new<F>(handle: NativeHandle, destructor: F) -> Self
    where
        F: FnMut(NativeHandle) -> Result<()> + Send + 'static,
    {
        Self::with_destructor(handle, destructor)
    }

    /// Like [`new`](Self::new), with a [`Destruct`] implementation.
    pub fn with_destructor(handle: NativeHandle, destructor: impl Destruct) -> Self {
        let registration = Arc::new(Registration::new(handle, Box::new(destructor)));
        reclaim::register(Arc::clone(&registration));
        Self { registration }
    }

    /// Check if the native resource is still held.
    pub fn is_valid(&self) -> bool {
        self.registration.is_valid()
    }

    /// Current handle; the sentinel once released.
    ///
    /// Do not cache the value across calls that may race with destruction;
    /// use [`with_handle`](Self::with_handle) instead.
    pub fn handle(&self) -> NativeHandle {
        self.registration.handle()
    }

    /// Run `f` with the handle, holding off any concurrent release.
    ///
    /// Fails with a null-pointer error if the handle was already released.
    /// `f` may call back into this object on the same thread.
    pub fn with_handle<R>(&self, f: impl FnOnce(NativeHandle) -> Result<R>) -> Result<R> {
        self.registration.with_handle(f)
    }

    /// Release the native resource now, on this thread.
    ///
    /// Fails with an invalid-state error if it was already released. A
    /// destructor error is returned, but the object is released regardless.
    pub fn destroy_native(&self) -> Result<()> {
        let result = self.registration.fire_explicit();
        if !self.registration.is_valid() {
            reclaim::unregister(self.registration.id());
        }
        result
    }

    /// Give up ownership of the handle without releasing it.
    ///
    /// Returns the sentinel if the handle was already released.
    pub fn into_handle(self) -> NativeHandle {
        let handle = self.registration.disown();
        reclaim::unregister(self.registration.id());
        handle
    }

    /// Identity of this object's destructor registration.
    pub fn registration_id(&self) -> RegistrationId {
        self.registration.id()
    }
}

impl Drop for NativeObject {
    fn drop(&mut self) {
        if self.registration.is_valid() {
            reclaim::notify_unreachable(self.registration.id());
        }
    }
}

impl std::fmt::Debug for NativeObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeObject")
            .field("handle", &self.handle().as_raw())
            .finish()
    }
}
