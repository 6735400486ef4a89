//! Background reclamation of dropped native objects.
//!
//! ## Problem
//!
//! A [`NativeObject`](crate::NativeObject) may be dropped without an
//! explicit destroy, from any thread, at any point. Running the native
//! release inline in `drop` would tie arbitrary native work to whichever
//! thread happened to drop the last owner.
//!
//! ## Solution
//!
//! Dropping a still-valid object posts a [`Notification`] to a process-wide
//! [`ReclamationQueue`]. A single background thread, started once and kept
//! for the life of the process, drains the queue, resolves each
//! notification to its registration and fires it. A failing release is
//! logged and counted; it never stops the loop.
//!
//! ```text
//! drop(NativeObject) ──► ReclamationQueue ──► native-reclaimer thread
//!                         (many producers)      resolve id → Registration
//!                                               fire() under its lock
//! ```
//!
//! Automatic reclamation only guarantees eventual release. Call
//! [`NativeObject::destroy_native`](crate::NativeObject::destroy_native)
//! when release has to happen at a known point.

use std::collections::{HashMap, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::{Condvar, Mutex};

use crate::error::{Error, Result};
use crate::registration::{Fired, Registration, RegistrationId};
use crate::types::{ReclaimerOptions, ReclaimerStats};

/// A tracked object became unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    id: RegistrationId,
}

impl Notification {
    pub fn new(id: RegistrationId) -> Self {
        Self { id }
    }

    /// Registration this notification refers to.
    pub fn id(&self) -> RegistrationId {
        self.id
    }
}

#[derive(Default)]
struct QueueState {
    items: VecDeque<Notification>,
    /// Popped but not yet marked complete.
    in_flight: usize,
}

/// Multi-producer, single-consumer blocking queue of notifications.
#[derive(Default)]
pub struct ReclamationQueue {
    state: Mutex<QueueState>,
    available: Condvar,
    idle: Condvar,
}

impl ReclamationQueue {
    /// Create a new empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a notification. Callable from any thread.
    pub fn push(&self, notification: Notification) {
        let mut state = self.state.lock();
        state.items.push_back(notification);
        drop(state);
        self.available.notify_one();
    }

    /// Block until a notification is available and take it.
    ///
    /// The caller must call [`complete`](Self::complete) once done with it.
    pub fn pop(&self) -> Notification {
        let mut state = self.state.lock();
        loop {
            if let Some(notification) = state.items.pop_front() {
                state.in_flight += 1;
                return notification;
            }
            self.available.wait(&mut state);
        }
    }

    /// Like [`pop`](Self::pop), giving up after `timeout`.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<Notification> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if let Some(notification) = state.items.pop_front() {
                state.in_flight += 1;
                return Some(notification);
            }
            if self.available.wait_until(&mut state, deadline).timed_out() {
                return None;
            }
        }
    }

    /// Mark one popped notification as processed.
    pub fn complete(&self) {
        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.items.is_empty() && state.in_flight == 0 {
            self.idle.notify_all();
        }
    }

    /// Notifications queued or in flight.
    pub fn len(&self) -> usize {
        let state = self.state.lock();
        state.items.len() + state.in_flight
    }

    /// Check if nothing is queued or in flight.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait until nothing is queued or in flight. Returns `false` on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while !(state.items.is_empty() && state.in_flight == 0) {
            if self.idle.wait_until(&mut state, deadline).timed_out() {
                return state.items.is_empty() && state.in_flight == 0;
            }
        }
        true
    }
}

impl std::fmt::Debug for ReclamationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReclamationQueue")
            .field("pending", &self.len())
            .finish()
    }
}

static RECLAIMER: Lazy<Reclaimer> = Lazy::new(Reclaimer::new);

struct Reclaimer {
    queue: ReclamationQueue,
    /// Registrations not yet fired, keyed by the id notifications carry.
    live: Mutex<HashMap<RegistrationId, Arc<Registration>>>,
    reclaimed: AtomicU64,
    failed: AtomicU64,
    /// Set once; `true` if the thread is running.
    started: OnceCell<bool>,
}

impl Reclaimer {
    fn new() -> Self {
        Self {
            queue: ReclamationQueue::new(),
            live: Mutex::new(HashMap::new()),
            reclaimed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            started: OnceCell::new(),
        }
    }

    fn start(&'static self, options: ReclaimerOptions) -> bool {
        *self.started.get_or_init(|| {
            let mut builder = std::thread::Builder::new().name(options.thread_name.clone());
            if let Some(size) = options.stack_size {
                builder = builder.stack_size(size);
            }

            match builder.spawn(move || self.run()) {
                Ok(_) => {
                    tracing::debug!(thread = %options.thread_name, "reclamation thread started");
                    true
                }
                Err(e) => {
                    tracing::error!(
                        "failed to start reclamation thread, releasing on drop instead: {}",
                        e
                    );
                    false
                }
            }
        })
    }

    fn run(&self) {
        loop {
            let notification = self.queue.pop();
            self.reclaim(notification);
            self.queue.complete();
        }
    }

    /// Fire the registration behind `notification`. Never unwinds.
    fn reclaim(&self, notification: Notification) {
        let id = notification.id().as_u64();
        if catch_unwind(AssertUnwindSafe(|| self.reclaim_one(notification))).is_err() {
            self.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(id, "native release panicked");
        }
    }

    fn reclaim_one(&self, notification: Notification) {
        let id = notification.id().as_u64();
        let Some(registration) = self.live.lock().remove(&notification.id()) else {
            tracing::trace!(id, "registration already gone");
            return;
        };

        match registration.fire() {
            Ok(Fired::Released) => {
                self.reclaimed.fetch_add(1, Ordering::Relaxed);
            }
            Ok(Fired::AlreadyFired) => {
                tracing::trace!(id, "already released explicitly");
            }
            Err(e) => {
                // Counted after logging; a panic while formatting `e` is
                // counted once by the caller.
                tracing::warn!(id, "native release failed: {}", e);
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// Start the reclamation thread with default options.
///
/// Idempotent. Constructing a [`NativeObject`](crate::NativeObject) calls
/// this implicitly.
pub fn init() -> Result<()> {
    init_with(ReclaimerOptions::default())
}

/// Start the reclamation thread with `options`.
///
/// Only the first call's options take effect; later calls report whether
/// the thread is running.
pub fn init_with(options: ReclaimerOptions) -> Result<()> {
    if RECLAIMER.start(options) {
        Ok(())
    } else {
        Err(Error::Runtime(
            "reclamation thread could not be started".to_string(),
        ))
    }
}

/// Check if the reclamation thread is running.
pub fn is_running() -> bool {
    RECLAIMER.started.get().copied().unwrap_or(false)
}

/// Current counters.
pub fn stats() -> ReclaimerStats {
    ReclaimerStats {
        registered: RECLAIMER.live.lock().len(),
        pending: RECLAIMER.queue.len(),
        reclaimed: RECLAIMER.reclaimed.load(Ordering::Relaxed),
        failed: RECLAIMER.failed.load(Ordering::Relaxed),
    }
}

/// Wait until every queued notification has been processed.
///
/// Returns `false` if `timeout` elapsed first.
pub fn wait_idle(timeout: Duration) -> bool {
    RECLAIMER.queue.wait_idle(timeout)
}

pub(crate) fn register(registration: Arc<Registration>) {
    let _ = init();
    RECLAIMER.live.lock().insert(registration.id(), registration);
}

pub(crate) fn unregister(id: RegistrationId) {
    RECLAIMER.live.lock().remove(&id);
}

#[cfg(test)]
pub(crate) fn is_registered(id: RegistrationId) -> bool {
    RECLAIMER.live.lock().contains_key(&id)
}

/// The owner of `id` was dropped while the handle was still held.
pub(crate) fn notify_unreachable(id: RegistrationId) {
    dispatch(id, is_running());
}

fn dispatch(id: RegistrationId, queued: bool) {
    if queued {
        tracing::trace!(id = id.as_u64(), "queued for reclamation");
        RECLAIMER.queue.push(Notification::new(id));
    } else {
        // No thread to hand off to; release on the dropping thread.
        RECLAIMER.reclaim(Notification::new(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    use crate::NativeHandle;

    fn registered(raw: u64, count: &Arc<AtomicUsize>) -> Arc<Registration> {
        let count = Arc::clone(count);
        let registration = Arc::new(Registration::new(
            NativeHandle::from_raw(raw),
            Box::new(move |_: NativeHandle| -> Result<()> {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        ));
        register(Arc::clone(&registration));
        registration
    }

    fn notification(n: u64) -> Notification {
        let registration = Registration::new(
            crate::NativeHandle::from_raw(n),
            Box::new(|_: crate::NativeHandle| -> Result<()> { Ok(()) }),
        );
        Notification::new(registration.id())
    }

    #[test]
    fn test_queue_creation() {
        let queue = ReclamationQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert!(queue.pop_timeout(Duration::from_millis(10)).is_none());
    }

    #[test]
    fn test_queue_fifo_and_in_flight() {
        let queue = ReclamationQueue::new();
        let a = notification(1);
        let b = notification(2);
        queue.push(a);
        queue.push(b);
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop(), a);
        assert_eq!(queue.len(), 2, "popped item counts until complete");
        queue.complete();
        assert_eq!(queue.pop(), b);
        queue.complete();
        assert!(queue.is_empty());
        assert!(queue.wait_idle(Duration::from_millis(10)));
    }

    #[test]
    fn test_queue_blocks_until_push() {
        let queue = Arc::new(ReclamationQueue::new());
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let n = queue.pop();
                queue.complete();
                n
            })
        };

        thread::sleep(Duration::from_millis(20));
        let n = notification(3);
        queue.push(n);

        assert_eq!(consumer.join().unwrap(), n);
        assert!(queue.wait_idle(Duration::from_secs(1)));
    }

    #[test]
    fn test_many_producers() {
        let queue = Arc::new(ReclamationQueue::new());
        let producers: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..25 {
                        queue.push(notification(i + 1));
                    }
                })
            })
            .collect();
        for p in producers {
            p.join().unwrap();
        }

        let mut seen = 0;
        while queue.pop_timeout(Duration::from_millis(10)).is_some() {
            queue.complete();
            seen += 1;
        }
        assert_eq!(seen, 100);
    }

    #[test]
    fn test_init_is_idempotent() {
        init().expect("init should succeed");
        init_with(ReclaimerOptions {
            thread_name: "ignored".to_string(),
            stack_size: None,
        })
        .expect("second init should succeed");
        assert!(is_running());
    }

    #[test]
    fn test_inline_release_without_thread() {
        let count = Arc::new(AtomicUsize::new(0));
        let registration = registered(41, &count);
        let id = registration.id();

        dispatch(id, false);

        assert_eq!(count.load(Ordering::SeqCst), 1, "released on the calling thread");
        assert!(!registration.is_valid());
        assert!(!is_registered(id));
    }

    #[test]
    fn test_reclaim_after_explicit_release_is_noop() {
        let count = Arc::new(AtomicUsize::new(0));
        let registration = registered(42, &count);
        let id = registration.id();

        registration.fire_explicit().unwrap();
        RECLAIMER.reclaim(Notification::new(id));
        RECLAIMER.reclaim(Notification::new(id));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!is_registered(id));
    }

    #[derive(Debug)]
    struct UnprintableError;

    impl std::fmt::Display for UnprintableError {
        fn fmt(&self, _: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            panic!("display failed")
        }
    }

    impl std::error::Error for UnprintableError {}

    #[test]
    fn test_reclaim_survives_unprintable_error() {
        let registration = Arc::new(Registration::new(
            NativeHandle::from_raw(43),
            Box::new(|_: NativeHandle| -> Result<()> {
                Err(Error::Thrown {
                    class: "tests.Unprintable".to_string(),
                    error: Box::new(UnprintableError),
                })
            }),
        ));
        register(Arc::clone(&registration));
        let failed = RECLAIMER.failed.load(Ordering::Relaxed);

        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        tracing::subscriber::with_default(subscriber, || {
            RECLAIMER.reclaim(Notification::new(registration.id()));
        });

        assert!(!registration.is_valid());
        assert!(RECLAIMER.failed.load(Ordering::Relaxed) > failed);
        assert!(!is_registered(registration.id()));
    }
}
