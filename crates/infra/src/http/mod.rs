//! Shared HTTP plumbing for the provider adapters

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
