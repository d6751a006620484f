//! Office Open XML packages.
//!
//! Two layers:
//!
//! 1. **OPC** (`opc`): the ZIP container, parts, content types and relationships
//! 2. **PresentationML** (`pptx`): presentations, slides and their shapes
pub mod error;
pub mod opc;
pub mod pptx;

pub use error::{OoxmlError, Result};
pub use opc::{OpcPackage, PackURI};
