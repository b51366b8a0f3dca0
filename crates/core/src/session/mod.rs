//! Access-token caching for both protocols

pub mod cache;
pub mod policy;

pub use cache::CredentialCache;
pub use policy::TokenPolicy;
