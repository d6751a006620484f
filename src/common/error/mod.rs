//! Unified error types for slide insertion.
//!
//! Package-level failures (`OpcError`, `OoxmlError`) are folded into a single
//! [`Error`] that the engine, the backup manager and the batch driver share.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
