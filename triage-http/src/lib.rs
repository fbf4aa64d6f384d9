//! HTTP client functionality for Triage
//!
//! This crate provides the request seam used by virtual users: the
//! [`HttpClient`] trait, a reqwest-backed [`HttpManager`] bound to the target
//! host, and an offline [`MockHttpClient`] for tests.

pub mod client;
pub mod config;
pub mod errors;
pub mod mock;
pub mod types;

// Re-export main types for convenience
pub use client::{HttpClient, HttpManager};
pub use config::HttpConfig;
pub use errors::HttpError;
pub use mock::{MockHttpClient, MockResponse};
pub use types::{HttpMethod, HttpRequest, HttpResponse};
