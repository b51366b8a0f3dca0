//! Time utilities and abstractions
//!
//! - **[`clock`]**: real and mock wall clocks, so token expiry can be tested
//!   without waiting
//! - **[`console`]**: parsing of the `DD/MM/YYYY HH:MM:SS` timestamps the
//!   MailUp console emits
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Duration;
//!
//! use mailup_common::time::{parse_console_datetime, Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let before = clock.now();
//! clock.advance(Duration::minutes(5));
//! assert_eq!(clock.now() - before, Duration::minutes(5));
//!
//! assert_eq!(parse_console_datetime("01/02/2020 10:30:00"), Some(1_580_549_400));
//! ```

pub mod clock;
pub mod console;

pub use clock::{Clock, MockClock, SystemClock};
pub use console::{parse_console_datetime, CONSOLE_TIMEZONE};
