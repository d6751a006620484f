//! XML for shapes added to a slide: pictures and text boxes.
//!
//! The snippets use the conventional `p:`, `a:` and `r:` prefixes, which every
//! PresentationML slide declares on its root element.
use std::fmt::Write as FmtWrite;

use crate::common::unit::pt_to_centipoints;
use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::pptx::shapes::{ShapeGeometry, VisualElement};

/// Run properties of a new text box.
#[derive(Debug, Clone)]
pub struct TextFormat {
    pub font: Option<String>,
    pub size_pt: Option<f64>,
}

/// A picture about to be placed on a slide.
#[derive(Debug, Clone)]
pub struct NewPicture<'a> {
    pub shape_id: u32,
    pub r_id: &'a str,
    pub geometry: ShapeGeometry,
    pub description: &'a str,
}

impl NewPicture<'_> {
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(640);
        xml.push_str("<p:pic><p:nvPicPr>");
        write!(
            xml,
            r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
            self.shape_id,
            self.shape_id.saturating_sub(1),
            escape_xml(self.description)
        )
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/>"#);
        xml.push_str("</p:nvPicPr><p:blipFill>");
        write!(xml, r#"<a:blip r:embed="{}"/>"#, escape_xml(self.r_id))
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        xml.push_str("<a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>");
        write_xfrm(&mut xml, &self.geometry)?;
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
        Ok(xml)
    }

    pub fn into_element(self) -> Result<VisualElement> {
        let xml = self.to_xml()?;
        VisualElement::from_xml(b"pic", xml.into_bytes())
    }
}

/// A wrapping text box, one paragraph per line.
#[derive(Debug, Clone)]
pub struct NewTextBox<'a> {
    pub shape_id: u32,
    pub geometry: ShapeGeometry,
    pub lines: &'a [String],
    pub format: &'a TextFormat,
}

impl NewTextBox<'_> {
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(512 + self.lines.len() * 160);
        xml.push_str("<p:sp><p:nvSpPr>");
        write!(
            xml,
            r#"<p:cNvPr id="{}" name="TextBox {}"/>"#,
            self.shape_id,
            self.shape_id.saturating_sub(1)
        )
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>"#);
        write_xfrm(&mut xml, &self.geometry)?;
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#);
        xml.push_str(r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0"><a:spAutoFit/></a:bodyPr><a:lstStyle/>"#);

        let mut rpr = String::from(r#"<a:rPr lang="en-US" dirty="0""#);
        if let Some(size) = self.format.size_pt {
            write!(rpr, r#" sz="{}""#, pt_to_centipoints(size))
                .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        }
        match &self.format.font {
            Some(font) => {
                let font = escape_xml(font);
                write!(rpr, r#"><a:latin typeface="{font}"/><a:cs typeface="{font}"/></a:rPr>"#)
                    .map_err(|e| OoxmlError::Xml(e.to_string()))?;
            }
            None => rpr.push_str("/>"),
        }

        for line in self.lines {
            xml.push_str("<a:p><a:r>");
            xml.push_str(&rpr);
            write!(xml, "<a:t>{}</a:t>", escape_xml(line))
                .map_err(|e| OoxmlError::Xml(e.to_string()))?;
            xml.push_str("</a:r></a:p>");
        }
        if self.lines.is_empty() {
            xml.push_str("<a:p/>");
        }
        xml.push_str("</p:txBody></p:sp>");
        Ok(xml)
    }

    pub fn into_element(self) -> Result<VisualElement> {
        let xml = self.to_xml()?;
        VisualElement::from_xml(b"sp", xml.into_bytes())
    }
}

fn write_xfrm(xml: &mut String, g: &ShapeGeometry) -> Result<()> {
    write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        g.x, g.y, g.cx, g.cy
    )
    .map_err(|e| OoxmlError::Xml(e.to_string()))
}
