//! Procedure protocol over SOAP
//!
//! Arguments go out as a document/literal envelope; the reply's embedded XML
//! document is decoded into the tree shape the normalizer expects.

pub mod envelope;
pub mod services;
pub mod transport;
pub mod xml_tree;

pub use services::{ServiceDescription, ServiceRegistry};
pub use transport::HttpProcedureTransport;
