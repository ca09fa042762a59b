//! Tracker events end up in the log file once logging is initialised

use namescope::{logging, shared, Locals, ScopeTracker};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_tracker_lifecycle_is_logged() {
    let temp = TempDir::new().unwrap();
    let log_path = temp.path().join("namescope.log");
    let path = logging::init_logger(Some(&log_path)).unwrap();
    assert_eq!(path, log_path);
    assert!(logging::is_enabled());

    let locals = shared(Locals::new());
    let mut tracker = ScopeTracker::new()
        .with_bindings(locals.clone())
        .with_extras("tracker");
    tracker
        .scope(|scope| {
            locals.borrow_mut().insert("x".to_string(), 1);
            scope.diff().unwrap();
            scope.refresh().unwrap();
        })
        .unwrap();

    logging::shutdown();
    assert!(!logging::is_enabled());

    let contents = fs::read_to_string(&log_path).unwrap();
    assert!(contents.contains("ENTER: observing explicit bindings (1 names in baseline, 1 extras)"));
    assert!(contents.contains("DIFF: 1 new names (underscore names ignored)"));
    assert!(contents.contains("REFRESH: baseline 1 -> 2 names (+1)"));
    assert!(contents.contains("EXIT: released bindings (2 names in baseline)"));
}
