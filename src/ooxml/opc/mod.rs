/// Open Packaging Conventions (OPC) layer.
///
/// Reads a `.pptx` ZIP container into an in-memory set of parts with their
/// relationships, lets callers add, replace and remove parts, and writes the
/// package back out. Parts no longer reachable from the package relationships
/// are dropped on save.
pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod phys_pkg;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

// Re-export commonly used types
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::{BlobPart, Part, XmlPart};
pub use rel::{Relationship, Relationships};
