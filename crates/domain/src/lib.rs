//! # MailUp Domain
//!
//! Domain types and models for the MailUp client.
//!
//! This crate contains:
//! - Data types returned by the remote operations (lists, groups, messages,
//!   reports, import processes, statistics)
//! - Import input shapes and options
//! - Client configuration and validated credentials
//! - The error taxonomy and `Result` alias
//!
//! ## Architecture
//! - No dependencies on other MailUp crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
