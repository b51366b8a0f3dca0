//! # MailUp Core
//!
//! Protocol-independent client logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces for the transports and the token store
//! - The credential cache shared by both protocols
//! - Reply normalization and error classification
//! - Import heuristics and document serialization
//! - The [`MailUpService`] facade
//!
//! ## Architecture Principles
//! - Only depends on `mailup-common` and `mailup-domain`
//! - No HTTP, filesystem or environment access
//! - All external collaborators via traits

pub mod classify;
pub mod import;
pub mod normalize;
pub mod ports;
pub mod service;
pub mod session;

pub use classify::{check_import_reply, check_send_reply, describe_return_code};
pub use normalize::{field_specs, normalize, FieldSpec, FieldType, Normalized};
pub use ports::{
    AuthenticationHeader, CachedToken, ExchangeTrace, HttpVerb, ProcedureTransport,
    ResourceAuthorizer, ResourceEndpoint, ResourceTransport, ServiceName, TokenStore,
};
pub use service::{MailUpService, ServiceSettings};
pub use session::{CredentialCache, TokenPolicy};
