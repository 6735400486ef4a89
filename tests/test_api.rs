//! Version and library initialization tests.

use native_handle::ReclaimerOptions;

#[test]
fn test_api_version() {
    let version = native_handle::api_version();
    assert_eq!(version, "0.1.0", "Expected API version 0.1.0, got {}", version);
}

#[test]
fn test_init_is_idempotent() {
    native_handle::init().expect("init should succeed");
    native_handle::init_with(ReclaimerOptions {
        thread_name: "second-reclaimer".to_string(),
        stack_size: Some(256 * 1024),
    })
    .expect("repeated init should succeed");

    assert!(native_handle::reclaim::is_running());
}

#[test]
fn test_default_options() {
    let opts = ReclaimerOptions::default();
    assert_eq!(opts.thread_name, "native-reclaimer");
    assert!(opts.stack_size.is_none());
}

#[test]
fn test_stats_start_sane() {
    native_handle::init().expect("init should succeed");
    assert!(
        native_handle::wait_idle(std::time::Duration::from_secs(5)),
        "reclaimer should drain"
    );
    let stats = native_handle::stats();
    assert_eq!(stats.pending, 0, "nothing should be pending after wait_idle");
}
