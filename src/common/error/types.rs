//! Error type shared by the insertion engine, backups and the batch driver.
//!
//! Every failure names the thing that failed (a path, a slide index or a count)
//! so that batch logs can be read without a debugger.
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for slide insertion operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A picture or slide that was asked for does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The image file to insert does not exist or cannot be read
    #[error("Image file not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    /// A multi-image group does not fit the template's picture slots
    #[error(
        "Template slide {template_index} has {placeholders} placeholder picture(s) but {images} image(s) were supplied"
    )]
    PlaceholderCountMismatch {
        template_index: usize,
        placeholders: usize,
        images: usize,
    },

    /// The image exists but its encoding is not one we can embed
    #[error("Unsupported image format for {}: {reason}", .path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    /// Caller passed an inconsistent combination of arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Opening or saving the presentation file failed
    #[error("Cannot access presentation {}: {reason}", .path.display())]
    PackageIo { path: PathBuf, reason: String },

    /// The package parsed but its contents are malformed
    #[error("Malformed presentation package: {0}")]
    Package(String),

    /// Slide index outside the presentation
    #[error("Slide index {index} is out of range (presentation has {count} slides)")]
    InvalidIndex { index: usize, count: usize },

    /// Slide duplication could not complete
    #[error("Cannot duplicate slide {index}: {reason}")]
    Duplication { index: usize, reason: String },

    /// A snapshot could not be written before a destructive operation
    #[error("Backup failed: {0}")]
    Backup(String),

    /// Batch configuration is missing a field or is inconsistent
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for slide insertion operations.
pub type Result<T> = std::result::Result<T, Error>;
