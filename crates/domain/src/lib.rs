//! # Skylift Domain
//!
//! Wire-level types and error taxonomy for the Skylift API client.
//!
//! This crate contains:
//! - Wire models for users, projects, services, and operations
//! - The error taxonomy and retryability contract
//! - Search request/result shapes
//!
//! ## Architecture
//! - No dependencies on other Skylift crates
//! - Only external dependencies allowed
//! - Pure data structures; all I/O lives in `skylift-client`

pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::*;
pub use types::*;
