//! Testing utilities and helpers
//!
//! - **[`temp`]**: temporary cache directories that clean up after themselves
//!
//! Clock mocking lives in [`crate::time::MockClock`].

pub mod temp;

pub use temp::TempDir;
