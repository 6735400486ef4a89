//! Destructor registrations.
//!
//! A [`Registration`] binds a native handle to the callback that releases
//! it. It deliberately knows nothing about the wrapper that owns it, so the
//! reclaimer can hold it after the wrapper is gone.
//!
//! State machine: `REGISTERED -> FIRED`. Every path that releases (explicit
//! destroy, background reclamation, ownership transfer) goes through the
//! same per-registration guard, so the native release runs at most once.
//! Reading the handle never takes the guard.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, ReentrantMutex};

use crate::error::{Error, Result};
use crate::ffi::NativeHandle;

/// Releases a native resource. Called at most once per registration.
///
/// Runs under the registration's release guard, on the destroying thread
/// or on the reclamation thread. The handle already reads as released
/// while it runs.
pub trait Destruct: Send + 'static {
    fn destruct(&mut self, handle: NativeHandle) -> Result<()>;
}

impl<F> Destruct for F
where
    F: FnMut(NativeHandle) -> Result<()> + Send + 'static,
{
    fn destruct(&mut self, handle: NativeHandle) -> Result<()> {
        self(handle)
    }
}

/// Identity of a registration, carried by reclamation notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(u64);

impl RegistrationId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Outcome of an attempt to fire a registration.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Fired {
    /// This call performed the native release.
    Released,
    /// Someone else already did.
    AlreadyFired,
}

pub(crate) struct Registration {
    id: RegistrationId,
    /// Serializes release against guarded use. Reentrant, so a thread
    /// already inside [`with_handle`](Self::with_handle) can call back in.
    guard: ReentrantMutex<()>,
    /// Raw handle; only written while `guard` is held.
    handle: AtomicU64,
    destructor: Mutex<Option<Box<dyn Destruct>>>,
}

impl Registration {
    pub(crate) fn new(handle: NativeHandle, destructor: Box<dyn Destruct>) -> Self {
        Self {
            id: RegistrationId::next(),
            guard: ReentrantMutex::new(()),
            handle: AtomicU64::new(handle.as_raw()),
            destructor: Mutex::new(Some(destructor)),
        }
    }

    pub(crate) fn id(&self) -> RegistrationId {
        self.id
    }

    pub(crate) fn handle(&self) -> NativeHandle {
        NativeHandle::from_raw(self.handle.load(Ordering::Acquire))
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.handle().is_valid()
    }

    /// Run `f` with the handle while holding the guard.
    ///
    /// Other threads cannot release the handle until `f` returns; the
    /// current thread may still call back into this registration.
    pub(crate) fn with_handle<R>(&self, f: impl FnOnce(NativeHandle) -> Result<R>) -> Result<R> {
        let _guard = self.guard.lock();
        let handle = self.handle();
        if !handle.is_valid() {
            return Err(Error::null_pointer());
        }
        f(handle)
    }

    /// Release the handle unless already released.
    ///
    /// The handle is set to the sentinel before the destructor runs, and
    /// stays there even if it fails; the native release has been attempted
    /// and must not run again.
    pub(crate) fn fire(&self) -> Result<Fired> {
        let _guard = self.guard.lock();
        let handle = self.take_handle();
        if !handle.is_valid() {
            return Ok(Fired::AlreadyFired);
        }

        // Out of the slot before running, so the destructor may touch us.
        let destructor = self.destructor.lock().take();
        let result = match destructor {
            Some(mut destructor) => destructor.destruct(handle),
            None => Ok(()),
        };

        tracing::trace!(id = self.id.0, handle = handle.as_raw(), "native handle released");
        result.map(|()| Fired::Released)
    }

    /// Like [`fire`](Self::fire), but a second call is an invalid-state error.
    pub(crate) fn fire_explicit(&self) -> Result<()> {
        match self.fire()? {
            Fired::Released => Ok(()),
            Fired::AlreadyFired => Err(Error::already_destroyed()),
        }
    }

    /// Give up the handle without releasing it.
    pub(crate) fn disown(&self) -> NativeHandle {
        let _guard = self.guard.lock();
        self.destructor.lock().take();
        self.take_handle()
    }

    fn take_handle(&self) -> NativeHandle {
        NativeHandle::from_raw(self.handle.swap(NativeHandle::SENTINEL, Ordering::AcqRel))
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id.0)
            .field("handle", &self.handle().as_raw())
            .finish()
    }
}
