//! Resource protocol over HTTP and JSON

pub mod endpoints;
pub mod oauth;
pub mod transport;

pub use endpoints::ResourceEndpoints;
pub use oauth::PasswordGrantAuthorizer;
pub use transport::HttpResourceTransport;
