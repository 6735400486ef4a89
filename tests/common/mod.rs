use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use native_handle::{NativeHandle, NativeObject};

/// Installs a test-writer subscriber once. Filter with RUST_LOG.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Object whose destructor counts how often it ran.
pub fn counted_object(raw: u64) -> (NativeObject, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let obj = NativeObject::new(NativeHandle::from_raw(raw), move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    (obj, count)
}
