//! Small shared utilities for the MailUp client crates.
//!
//! # Modules
//!
//! - [`time`]: wall-clock abstraction and the console date/time format
//! - [`testing`]: temporary directory helpers (feature `test-utils`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod time;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use time::{parse_console_datetime, Clock, MockClock, SystemClock, CONSOLE_TIMEZONE};
