//! Parts: named byte streams inside the package, each with its own relationships.
use std::sync::Arc;

use memchr::memmem;

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::rel::Relationships;

/// A part of the package.
///
/// Part bytes are replaced wholesale through [`Part::set_blob`]; the slide
/// layer keeps its own parsed model and flushes it here before saving.
pub trait Part {
    fn partname(&self) -> &PackURI;

    fn content_type(&self) -> &str;

    fn blob(&self) -> &[u8];

    fn set_blob(&mut self, blob: Vec<u8>);

    fn rels(&self) -> &Relationships;

    fn rels_mut(&mut self) -> &mut Relationships;

    /// Shared handle on the bytes, cheap to clone.
    fn shared_blob(&self) -> Arc<Vec<u8>>;

    /// Target of relationship `r_id`, as written in the `.rels` part.
    fn target_ref(&self, r_id: &str) -> Result<&str> {
        self.rels()
            .get(r_id)
            .map(|rel| rel.target_ref())
            .ok_or_else(|| {
                OpcError::RelationshipNotFound(format!("{} in {}", r_id, self.partname()))
            })
    }

    /// Whether the part's bytes mention `r_id` as a quoted attribute value.
    fn references_r_id(&self, r_id: &str) -> bool {
        let pattern = format!("\"{r_id}\"");
        memmem::find(self.blob(), pattern.as_bytes()).is_some()
    }
}

/// Opaque binary part such as an image.
#[derive(Debug, Clone)]
pub struct BlobPart {
    partname: PackURI,
    content_type: String,
    blob: Arc<Vec<u8>>,
    rels: Relationships,
}

impl BlobPart {
    pub fn new(partname: PackURI, content_type: String, blob: Vec<u8>) -> Self {
        let rels = Relationships::new(partname.base_uri().to_string());
        Self {
            partname,
            content_type,
            blob: Arc::new(blob),
            rels,
        }
    }
}

impl Part for BlobPart {
    fn partname(&self) -> &PackURI {
        &self.partname
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn blob(&self) -> &[u8] {
        &self.blob
    }

    fn set_blob(&mut self, blob: Vec<u8>) {
        self.blob = Arc::new(blob);
    }

    fn rels(&self) -> &Relationships {
        &self.rels
    }

    fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    fn shared_blob(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.blob)
    }
}

/// XML part; the bytes are guaranteed to be UTF-8 when loaded from a package.
#[derive(Debug, Clone)]
pub struct XmlPart {
    partname: PackURI,
    content_type: String,
    xml_bytes: Arc<Vec<u8>>,
    rels: Relationships,
}

impl XmlPart {
    pub fn new(partname: PackURI, content_type: String, xml_bytes: Vec<u8>) -> Self {
        let rels = Relationships::new(partname.base_uri().to_string());
        Self {
            partname,
            content_type,
            xml_bytes: Arc::new(xml_bytes),
            rels,
        }
    }

    pub fn load(partname: PackURI, content_type: String, xml_bytes: Vec<u8>) -> Result<Self> {
        std::str::from_utf8(&xml_bytes)
            .map_err(|e| OpcError::XmlError(format!("{partname} is not valid UTF-8: {e}")))?;
        Ok(Self::new(partname, content_type, xml_bytes))
    }
}

impl Part for XmlPart {
    fn partname(&self) -> &PackURI {
        &self.partname
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn blob(&self) -> &[u8] {
        &self.xml_bytes
    }

    fn set_blob(&mut self, blob: Vec<u8>) {
        self.xml_bytes = Arc::new(blob);
    }

    fn rels(&self) -> &Relationships {
        &self.rels
    }

    fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    fn shared_blob(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.xml_bytes)
    }
}

/// Picks the part implementation for a content type.
pub struct PartFactory;

impl PartFactory {
    pub fn load(partname: PackURI, content_type: String, blob: Vec<u8>) -> Result<Box<dyn Part>> {
        if Self::is_xml_content_type(&content_type) {
            Ok(Box::new(XmlPart::load(partname, content_type, blob)?))
        } else {
            Ok(Box::new(BlobPart::new(partname, content_type, blob)))
        }
    }

    #[inline]
    fn is_xml_content_type(content_type: &str) -> bool {
        content_type.ends_with("+xml") || content_type.ends_with("/xml")
    }
}
