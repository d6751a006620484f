//! Picture shapes (`p:pic`).
use crate::common::xml::{escape_xml, rewrite_first, set_attr};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::pptx::shapes::base::{ShapeGeometry, ShapeInfo};

/// A `p:pic` element of a slide.
#[derive(Debug, Clone)]
pub struct Picture {
    xml: Vec<u8>,
    info: ShapeInfo,
}

impl Picture {
    pub fn new(xml: Vec<u8>) -> Result<Self> {
        let info = ShapeInfo::scan(&xml)?;
        Ok(Self { xml, info })
    }

    #[inline]
    pub fn info(&self) -> &ShapeInfo {
        &self.info
    }

    #[inline]
    pub fn xml(&self) -> &[u8] {
        &self.xml
    }

    #[inline]
    pub fn shape_id(&self) -> Option<u32> {
        self.info.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Alternative-text description (`cNvPr/@descr`).
    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.info.descr.as_deref()
    }

    /// Alternative-text title (`cNvPr/@title`).
    #[inline]
    pub fn title(&self) -> Option<&str> {
        self.info.title.as_deref()
    }

    #[inline]
    pub fn geometry(&self) -> Option<ShapeGeometry> {
        self.info.geometry
    }

    /// Relationship id of the embedded image.
    #[inline]
    pub fn image_r_id(&self) -> Option<&str> {
        self.info.embed.as_deref()
    }

    /// Placeholder type when the picture fills a layout placeholder.
    #[inline]
    pub fn placeholder_type(&self) -> Option<&str> {
        self.info.placeholder.as_deref()
    }

    /// Set the alternative text of the picture.
    ///
    /// `title` is left untouched when `None`.
    pub fn set_alt_text(&mut self, descr: &str, title: Option<&str>) -> Result<()> {
        let rewritten = rewrite_first(&self.xml, b"cNvPr", |attrs| {
            set_attr(attrs, "descr", &escape_xml(descr));
            if let Some(title) = title {
                set_attr(attrs, "title", &escape_xml(title));
            }
        })?
        .ok_or_else(|| OoxmlError::Xml(format!("picture '{}' has no p:cNvPr", self.info.name)))?;

        self.info = ShapeInfo::scan(&rewritten)?;
        self.xml = rewritten;
        Ok(())
    }
}
