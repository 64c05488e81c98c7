// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Time-window gates for synchronous callbacks.
//!
//! - [`Throttler`] - leading edge: the first call of a burst runs, the rest of
//!   the window is ignored
//! - [`Debouncer`] - trailing edge: only the last call of a burst runs, once
//!   the input has been quiet for the configured duration
//!
//! # Example
//!
//! ```rust
//! use flowgate_time::Throttler;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let throttler = Throttler::new(Duration::from_millis(500));
//!
//! assert_eq!(throttler.call(|| "saved"), Some("saved"));
//! // Second tap inside the window is ignored
//! assert_eq!(throttler.call(|| "saved again"), None);
//! # }
//! ```

mod debouncer;
mod throttler;

pub use debouncer::Debouncer;
pub use throttler::Throttler;
