// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::config::GateConfig;
use core::fmt;
use core::time::Duration;
use std::sync::Arc;

/// Receives `(elapsed, executed)` for every call a gate handles.
///
/// `elapsed` is the time spent running the work, `Duration::ZERO` when the
/// call was not executed.
pub type MetricsCallback = Arc<dyn Fn(Duration, bool) + Send + Sync>;

/// Per-gate settings shared by every gate kind.
///
/// ```
/// use flowgate_core::GateOptions;
///
/// let options = GateOptions::new()
///     .with_name("search-box")
///     .with_debug(true)
///     .with_reset_on_error(true);
///
/// assert_eq!(options.label("debouncer"), "search-box");
/// ```
#[derive(Clone, Default)]
pub struct GateOptions {
    /// Name used in log lines. Falls back to the gate kind.
    pub name: Option<String>,
    /// Emit debug log lines for this gate.
    pub debug: bool,
    /// Clear the gate's throttle / debounce / lock state when the work fails.
    pub reset_on_error: bool,
    pub on_metrics: Option<MetricsCallback>,
}

impl GateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_reset_on_error(mut self, reset_on_error: bool) -> Self {
        self.reset_on_error = reset_on_error;
        self
    }

    pub fn with_metrics<F>(mut self, on_metrics: F) -> Self
    where
        F: Fn(Duration, bool) + Send + Sync + 'static,
    {
        self.on_metrics = Some(Arc::new(on_metrics));
        self
    }

    pub fn label<'a>(&'a self, kind: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(kind)
    }

    /// Debug logging is on for this gate, or globally.
    pub fn debug_enabled(&self) -> bool {
        self.debug || GateConfig::debug_mode_enabled()
    }

    pub fn report(&self, elapsed: Duration, executed: bool) {
        if let Some(on_metrics) = &self.on_metrics {
            on_metrics(elapsed, executed);
        }
    }
}

impl fmt::Debug for GateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateOptions")
            .field("name", &self.name)
            .field("debug", &self.debug)
            .field("reset_on_error", &self.reset_on_error)
            .field("on_metrics", &self.on_metrics.is_some())
            .finish()
    }
}
