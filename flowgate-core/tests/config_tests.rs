// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use flowgate_core::{GateConfig, GateOptions};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Single test: the global configuration is process-wide state.
#[test]
fn test_global_configuration_lifecycle() {
    // Defaults
    assert_eq!(GateConfig::global(), GateConfig::default());
    assert_eq!(GateConfig::global().throttle_duration, Duration::from_millis(500));
    assert_eq!(GateConfig::global().debounce_duration, Duration::from_millis(300));
    assert_eq!(GateConfig::global().max_hold_duration, Some(Duration::from_secs(15)));

    // Debug mode flows into every gate's options
    let options = GateOptions::new();
    assert!(!options.debug_enabled());
    GateConfig::update(|config| config.debug_mode = true);
    assert!(options.debug_enabled());

    // Whole replacement
    GateConfig::set_global(GateConfig {
        max_hold_duration: None,
        ..GateConfig::DEFAULT
    });
    assert_eq!(GateConfig::global().max_hold_duration, None);
    assert!(!GateConfig::debug_mode_enabled());

    GateConfig::reset_global();
    assert_eq!(GateConfig::global(), GateConfig::DEFAULT);
}

#[test]
fn test_options_report_metrics() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    let options = GateOptions::new().with_metrics(move |elapsed, executed| {
        assert_eq!(elapsed, Duration::ZERO);
        assert!(!executed);
        calls_clone.fetch_add(1, Ordering::SeqCst);
    });

    options.report(Duration::ZERO, false);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(options.label("throttler"), "throttler");
    assert!(format!("{options:?}").contains("on_metrics: true"));
}
