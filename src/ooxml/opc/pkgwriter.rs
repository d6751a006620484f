//! Serializes an [`OpcPackage`] back into a ZIP container.
//!
//! Members are written in a stable order: content types, package
//! relationships, then every part (sorted by name) followed by its `.rels`.
use std::collections::BTreeMap;
use std::path::Path;

use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::package::OpcPackage;
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::part::Part;
use crate::ooxml::opc::phys_pkg::PhysPkgWriter;

pub struct PackageWriter;

impl PackageWriter {
    pub fn write<P: AsRef<Path>>(path: P, package: &OpcPackage) -> Result<()> {
        let bytes = Self::to_bytes(package)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn to_bytes(package: &OpcPackage) -> Result<Vec<u8>> {
        let mut phys = PhysPkgWriter::new();

        let content_types = ContentTypesItem::from_package(package).to_xml();
        let content_types_uri = PackURI::new(CONTENT_TYPES_URI).map_err(OpcError::InvalidPackUri)?;
        phys.write(&content_types_uri, content_types.as_bytes())?;

        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        phys.write(&package_uri.rels_uri(), package.rels().to_xml().as_bytes())?;

        let mut parts: Vec<&dyn Part> = package.iter_parts().collect();
        parts.sort_by(|a, b| a.partname().cmp(b.partname()));
        for part in parts {
            phys.write(part.partname(), part.blob())?;
            if !part.rels().is_empty() {
                phys.write(&part.partname().rels_uri(), part.rels().to_xml().as_bytes())?;
            }
        }

        phys.finish()
    }
}

/// The `[Content_Types].xml` stream being assembled.
struct ContentTypesItem {
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl ContentTypesItem {
    fn from_package(package: &OpcPackage) -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), ct::XML.to_string());

        let mut item = Self {
            defaults,
            overrides: BTreeMap::new(),
        };
        for part in package.iter_parts() {
            let ext = part.partname().ext().to_ascii_lowercase();
            if Self::is_default_content_type(&ext, part.content_type()) {
                item.defaults.insert(ext, part.content_type().to_string());
            } else {
                item.overrides
                    .insert(part.partname().to_string(), part.content_type().to_string());
            }
        }
        item
    }

    fn is_default_content_type(ext: &str, content_type: &str) -> bool {
        matches!(
            (ext, content_type),
            ("rels", ct::OPC_RELATIONSHIPS)
                | ("xml", ct::XML)
                | ("png", ct::PNG)
                | ("jpg", ct::JPEG)
                | ("jpeg", ct::JPEG)
                | ("gif", ct::GIF)
                | ("bmp", ct::BMP)
                | ("tif", ct::TIFF)
                | ("tiff", ct::TIFF)
                | ("emf", ct::EMF)
                | ("wmf", ct::WMF)
        )
    }

    fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(512 + self.overrides.len() * 160);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        xml.push_str(
            "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
        );
        for (ext, content_type) in &self.defaults {
            xml.push_str(&format!(
                "<Default Extension=\"{}\" ContentType=\"{}\"/>",
                escape_xml(ext),
                escape_xml(content_type)
            ));
        }
        for (partname, content_type) in &self.overrides {
            xml.push_str(&format!(
                "<Override PartName=\"{}\" ContentType=\"{}\"/>",
                escape_xml(partname),
                escape_xml(content_type)
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::part::{BlobPart, XmlPart};

    #[test]
    fn test_content_types_defaults_and_overrides() {
        let mut pkg = OpcPackage::new();
        pkg.add_part(Box::new(BlobPart::new(
            PackURI::new("/ppt/media/image1.png").unwrap(),
            ct::PNG.to_string(),
            vec![0x89],
        )));
        pkg.add_part(Box::new(XmlPart::new(
            PackURI::new("/ppt/slides/slide1.xml").unwrap(),
            ct::PML_SLIDE.to_string(),
            b"<p:sld/>".to_vec(),
        )));

        let xml = ContentTypesItem::from_package(&pkg).to_xml();
        assert!(xml.contains("<Default Extension=\"png\" ContentType=\"image/png\"/>"));
        assert!(xml.contains("<Override PartName=\"/ppt/slides/slide1.xml\""));
        assert!(!xml.contains("PartName=\"/ppt/media/image1.png\""));
    }

    #[test]
    fn test_written_package_reopens() {
        let mut pkg = OpcPackage::new();
        pkg.add_part(Box::new(XmlPart::new(
            PackURI::new("/ppt/slides/slide1.xml").unwrap(),
            ct::PML_SLIDE.to_string(),
            b"<p:sld/>".to_vec(),
        )));
        let bytes = PackageWriter::to_bytes(&pkg).unwrap();
        // no package relationships point at the slide, so it is not loaded back
        let reopened = OpcPackage::from_bytes(&bytes).unwrap();
        assert_eq!(reopened.part_count(), 0);
    }
}
