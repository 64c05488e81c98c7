// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Process-wide defaults read by gate constructors.
//!
//! Gates copy what they need at construction time; changing the global
//! configuration afterwards does not affect existing gates, except for
//! [`GateConfig::debug_mode`], which is consulted on every log decision.

use core::time::Duration;
use parking_lot::RwLock;

static GLOBAL: RwLock<GateConfig> = parking_lot::const_rwlock(GateConfig::DEFAULT);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Cooldown window of `Throttler::default()`.
    pub throttle_duration: Duration,
    /// Quiet period of `Debouncer::default()`.
    pub debounce_duration: Duration,
    /// Quiet period of `AsyncDebouncer::default()`.
    pub async_debounce_duration: Duration,
    /// Maximum lock hold time of async throttlers. `None` disables the timeout.
    pub max_hold_duration: Option<Duration>,
    /// Turn on debug logging for every gate.
    pub debug_mode: bool,
}

impl GateConfig {
    pub const DEFAULT: Self = Self {
        throttle_duration: Duration::from_millis(500),
        debounce_duration: Duration::from_millis(300),
        async_debounce_duration: Duration::from_millis(300),
        max_hold_duration: Some(Duration::from_secs(15)),
        debug_mode: false,
    };

    /// Snapshot of the current global configuration.
    pub fn global() -> Self {
        GLOBAL.read().clone()
    }

    pub fn set_global(config: Self) {
        *GLOBAL.write() = config;
    }

    /// Edits the global configuration in place.
    ///
    /// ```
    /// use flowgate_core::GateConfig;
    /// use std::time::Duration;
    ///
    /// GateConfig::update(|config| config.throttle_duration = Duration::from_millis(250));
    /// assert_eq!(GateConfig::global().throttle_duration, Duration::from_millis(250));
    /// GateConfig::reset_global();
    /// ```
    pub fn update<F>(f: F)
    where
        F: FnOnce(&mut Self),
    {
        let mut config = GLOBAL.write();
        f(&mut *config);
    }

    pub fn reset_global() {
        Self::set_global(Self::DEFAULT);
    }

    pub fn debug_mode_enabled() -> bool {
        GLOBAL.read().debug_mode
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
