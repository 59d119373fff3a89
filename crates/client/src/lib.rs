//! # Skylift Client
//!
//! Resilient execution core for the Skylift control-plane API.
//!
//! This crate contains:
//! - Backoff policies for request retries and operation polling
//! - A retrying HTTP executor with credential-preserving redirects
//! - A poller that waits for server-tracked long-running operations
//! - Typed endpoint wrappers over the raw executor
//!
//! ## Architecture
//! - Depends only on `skylift-domain` internally
//! - All I/O lives here; the domain crate stays pure

pub mod backoff;
mod endpoints;
pub mod executor;
pub mod mask;
mod poller;
pub mod redirect;

// Re-export commonly used items
pub use backoff::{PollPolicy, RetryPolicy};
pub use executor::{ApiClient, ApiClientBuilder};
