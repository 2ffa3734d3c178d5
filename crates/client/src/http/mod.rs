//! HTTP transport layer

pub mod client;

pub use client::{HttpClient, HttpClientBuilder, TransportError};
