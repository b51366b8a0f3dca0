//! Blocking HTTP client shared by both transports

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
