//! Type definitions for reclaimer configuration and reporting.

/// Default name of the background reclamation thread.
pub const DEFAULT_THREAD_NAME: &str = "native-reclaimer";

/// Options for the background reclamation thread.
#[derive(Debug, Clone)]
pub struct ReclaimerOptions {
    /// Thread name (shows up in debuggers and panic messages).
    pub thread_name: String,
    /// Stack size in bytes. `None` uses the platform default.
    pub stack_size: Option<usize>,
}

impl Default for ReclaimerOptions {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            stack_size: None,
        }
    }
}

/// Snapshot of the reclaimer's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReclaimerStats {
    /// Registrations whose handle has not been released yet.
    pub registered: usize,
    /// Notifications queued or being processed.
    pub pending: usize,
    /// Handles released by the background thread.
    pub reclaimed: u64,
    /// Background releases that returned an error or panicked.
    pub failed: u64,
}
