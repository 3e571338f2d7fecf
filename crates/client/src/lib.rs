//! rstore-client: HTTP adapter for the rstore CLI
//!
//! Implements the `RecordStore` trait from rstore-core against the record
//! storage service's HTTP API, built on reqwest. All request/response wire
//! shapes live in [`protocol`].

mod client;
pub mod protocol;

pub use client::HttpClient;
