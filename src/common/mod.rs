//! Common types and utilities shared by the package layer and the engine.

// Submodule declarations
pub mod error;
pub mod unit;
pub mod xml;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-exports for convenience
pub use error::{Error, Result};
pub use unit::Position;
