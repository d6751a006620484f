//! Error conversion implementations.
//!
//! Converts the package-layer errors into the unified [`Error`]. Conversions
//! that need the file path (open and save) go through the helpers below instead.
use std::path::Path;

use super::types::Error;
use crate::ooxml::error::OoxmlError;
use crate::ooxml::opc::error::OpcError;

impl From<OpcError> for Error {
    fn from(err: OpcError) -> Self {
        match err {
            OpcError::IoError(e) => Error::Io(e),
            other => Error::Package(other.to_string()),
        }
    }
}

impl From<OoxmlError> for Error {
    fn from(err: OoxmlError) -> Self {
        match err {
            OoxmlError::Io(e) => Error::Io(e),
            OoxmlError::Opc(e) => Error::from(e),
            other => Error::Package(other.to_string()),
        }
    }
}

impl Error {
    /// Wrap a package error raised while reading or writing `path`.
    pub fn package_io(path: &Path, err: impl std::fmt::Display) -> Self {
        Error::PackageIo {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }

    /// Wrap an image decoding failure for `path`.
    pub fn unsupported_image(path: &Path, reason: impl Into<String>) -> Self {
        Error::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
