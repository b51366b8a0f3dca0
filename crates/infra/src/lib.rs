//! # MailUp Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The procedure-protocol transport (SOAP envelopes over HTTP)
//! - The resource-protocol transport and the OAuth password grant
//! - The file-backed token store
//! - Configuration loading from the environment and config files
//!
//! ## Architecture
//! - Implements traits defined in `mailup-core`
//! - Depends on `mailup-domain` and `mailup-core`
//! - Contains all "impure" code (network, filesystem)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod procedure;
pub mod resource;
pub mod token_store;

// Re-export commonly used items
pub use client::MailUpClient;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use procedure::{HttpProcedureTransport, ServiceDescription, ServiceRegistry};
pub use resource::{HttpResourceTransport, PasswordGrantAuthorizer, ResourceEndpoints};
pub use token_store::FileTokenStore;
