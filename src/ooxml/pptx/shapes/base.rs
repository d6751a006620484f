//! Direct children of a slide's shape tree.
//!
//! Each child keeps its original XML bytes. A single scan at parse time pulls
//! out what the engine needs (ids, names, alt text, geometry, placeholder
//! marker, text) so that the bytes never have to be re-read for queries.
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::common::unit::Position;
use crate::common::xml::{attr_int, attr_value};
use crate::ooxml::error::Result;
use crate::ooxml::pptx::shapes::picture::Picture;

/// Offset and extent of a shape in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeGeometry {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl From<ShapeGeometry> for Position {
    fn from(g: ShapeGeometry) -> Self {
        Position::from_emu(g.x, g.y, g.cx, g.cy)
    }
}

impl From<Position> for ShapeGeometry {
    fn from(pos: Position) -> Self {
        let (x, y, cx, cy) = pos.to_emu();
        Self { x, y, cx, cy }
    }
}

/// Facts scanned out of one shape-tree child.
#[derive(Debug, Clone, Default)]
pub struct ShapeInfo {
    pub id: Option<u32>,
    pub name: String,
    pub descr: Option<String>,
    pub title: Option<String>,
    pub geometry: Option<ShapeGeometry>,
    /// `type` of `p:ph`, `Some("body")` when the marker has no type
    pub placeholder: Option<String>,
    pub has_text_body: bool,
    pub is_text_box: bool,
    /// First `a:blip/@r:embed`
    pub embed: Option<String>,
    /// Visible text, one line per paragraph
    pub text: String,
}

impl ShapeInfo {
    pub fn scan(xml: &[u8]) -> Result<Self> {
        let mut info = ShapeInfo::default();
        let mut reader = Reader::from_reader(xml);
        let mut seen_cnvpr = false;
        let mut in_xfrm = false;
        let mut xfrm_done = false;
        let mut in_text_run = false;
        let mut off: Option<(i64, i64)> = None;
        let mut ext: Option<(i64, i64)> = None;
        let mut paragraphs: Vec<String> = Vec::new();
        let mut current = String::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    match e.local_name().as_ref() {
                        b"xfrm" if !xfrm_done => in_xfrm = true,
                        b"t" => in_text_run = true,
                        b"txBody" => info.has_text_body = true,
                        _ => {}
                    }
                    info.visit(&e, &mut seen_cnvpr, in_xfrm, &mut off, &mut ext);
                }
                Event::Empty(e) => {
                    if e.local_name().as_ref() == b"br" {
                        current.push('\n');
                    }
                    info.visit(&e, &mut seen_cnvpr, in_xfrm, &mut off, &mut ext);
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"xfrm" if in_xfrm => {
                        in_xfrm = false;
                        xfrm_done = true;
                    }
                    b"t" => in_text_run = false,
                    b"p" if !current.is_empty() => {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                    _ => {}
                },
                Event::Text(t) if in_text_run => {
                    current.push_str(&String::from_utf8_lossy(t.as_ref()));
                }
                Event::GeneralRef(r) if in_text_run => {
                    let name: &[u8] = &r;
                    match name {
                        b"amp" => current.push('&'),
                        b"lt" => current.push('<'),
                        b"gt" => current.push('>'),
                        b"quot" => current.push('"'),
                        b"apos" => current.push('\''),
                        _ => {
                            if let Some(ch) = decode_char_ref(name) {
                                current.push(ch);
                            }
                        }
                    }
                }
                Event::CData(t) if in_text_run => {
                    current.push_str(&String::from_utf8_lossy(t.as_ref()));
                }
                Event::Eof => break,
                _ => {}
            }
        }
        if !current.is_empty() {
            paragraphs.push(current);
        }
        info.text = paragraphs.join("\n");

        if let (Some((x, y)), Some((cx, cy))) = (off, ext) {
            info.geometry = Some(ShapeGeometry { x, y, cx, cy });
        }
        Ok(info)
    }

    fn visit(
        &mut self,
        e: &BytesStart<'_>,
        seen_cnvpr: &mut bool,
        in_xfrm: bool,
        off: &mut Option<(i64, i64)>,
        ext: &mut Option<(i64, i64)>,
    ) {
        match e.local_name().as_ref() {
            b"cNvPr" if !*seen_cnvpr => {
                *seen_cnvpr = true;
                self.id = attr_int(e, b"id").and_then(|id| u32::try_from(id).ok());
                self.name = attr_value(e, b"name").unwrap_or_default();
                self.descr = attr_value(e, b"descr");
                self.title = attr_value(e, b"title");
            }
            b"cNvSpPr" => {
                self.is_text_box |= attr_value(e, b"txBox").is_some_and(|v| v == "1" || v == "true");
            }
            b"ph" if self.placeholder.is_none() => {
                self.placeholder = Some(attr_value(e, b"type").unwrap_or_else(|| "body".to_string()));
            }
            b"blip" if self.embed.is_none() => {
                self.embed = e
                    .attributes()
                    .flatten()
                    .find(|a| a.key.local_name().as_ref() == b"embed")
                    .and_then(|a| std::str::from_utf8(&a.value).ok().map(str::to_string));
            }
            b"off" if in_xfrm && off.is_none() => {
                *off = attr_int(e, b"x").zip(attr_int(e, b"y"));
            }
            b"ext" if in_xfrm && ext.is_none() => {
                *ext = attr_int(e, b"cx").zip(attr_int(e, b"cy"));
            }
            _ => {}
        }
    }
}

fn decode_char_ref(name: &[u8]) -> Option<char> {
    let digits = name.strip_prefix(b"#")?;
    let code = match digits.strip_prefix(b"x") {
        Some(hex) => u32::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()?,
        None => std::str::from_utf8(digits).ok()?.parse().ok()?,
    };
    char::from_u32(code)
}

/// Non-picture shape-tree child kept as opaque bytes plus scanned facts.
#[derive(Debug, Clone)]
pub struct ShapeNode {
    xml: Vec<u8>,
    info: ShapeInfo,
}

impl ShapeNode {
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
}

/// A visual element of a slide. The set of kinds is closed.
#[derive(Debug, Clone)]
pub enum VisualElement {
    /// `p:pic`, placeholder pictures included
    Picture(Picture),
    /// Free `p:sp` that is a text box or carries visible text
    TextBox(ShapeNode),
    /// `p:sp` bound to a layout placeholder (title, body, ...)
    Placeholder(ShapeNode),
    /// Everything else: auto shapes, groups, graphic frames, connectors
    OtherShape(ShapeNode),
}

impl VisualElement {
    /// Classify a shape-tree child by its tag and content.
    pub fn from_xml(tag_local_name: &[u8], xml: Vec<u8>) -> Result<Self> {
        if tag_local_name == b"pic" {
            return Ok(VisualElement::Picture(Picture::new(xml)?));
        }
        let node = ShapeNode::new(xml)?;
        Ok(match tag_local_name {
            b"sp" if node.info.placeholder.is_some() => VisualElement::Placeholder(node),
            b"sp" if node.info.is_text_box || (node.info.has_text_body && !node.info.text.is_empty()) => {
                VisualElement::TextBox(node)
            }
            _ => VisualElement::OtherShape(node),
        })
    }

    pub fn info(&self) -> &ShapeInfo {
        match self {
            VisualElement::Picture(p) => p.info(),
            VisualElement::TextBox(n) | VisualElement::Placeholder(n) | VisualElement::OtherShape(n) => {
                n.info()
            }
        }
    }

    pub fn xml(&self) -> &[u8] {
        match self {
            VisualElement::Picture(p) => p.xml(),
            VisualElement::TextBox(n) | VisualElement::Placeholder(n) | VisualElement::OtherShape(n) => {
                n.xml()
            }
        }
    }

    #[inline]
    pub fn shape_id(&self) -> Option<u32> {
        self.info().id
    }

    #[inline]
    pub fn is_picture(&self) -> bool {
        matches!(self, VisualElement::Picture(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TITLE: &[u8] = br#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>Q3 &amp; Q4</a:t></a:r></a:p><a:p><a:r><a:t>Results</a:t></a:r></a:p></p:txBody></p:sp>"#;

    const TEXT_BOX: &[u8] = br#"<p:sp><p:nvSpPr><p:cNvPr id="5" name="TextBox 4"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="457200" y="6400800"/><a:ext cx="6400800" cy="365760"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:t>File: a.png</a:t></a:r></a:p></p:txBody></p:sp>"#;

    const GROUP: &[u8] = br#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="7" name="Group 6"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="10" cy="10"/><a:chOff x="0" y="0"/><a:chExt cx="10" cy="10"/></a:xfrm></p:grpSpPr><p:sp><p:nvSpPr><p:cNvPr id="8" name="Inner"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp></p:grpSp>"#;

    #[test]
    fn test_placeholder_classification_and_text() {
        let el = VisualElement::from_xml(b"sp", TITLE.to_vec()).unwrap();
        assert!(matches!(el, VisualElement::Placeholder(_)));
        let info = el.info();
        assert_eq!(info.placeholder.as_deref(), Some("title"));
        assert_eq!(info.text, "Q3 & Q4\nResults");
        assert_eq!(info.id, Some(2));
        assert!(info.geometry.is_none());
    }

    #[test]
    fn test_text_box_geometry() {
        let el = VisualElement::from_xml(b"sp", TEXT_BOX.to_vec()).unwrap();
        assert!(matches!(el, VisualElement::TextBox(_)));
        assert_eq!(
            el.info().geometry,
            Some(ShapeGeometry { x: 457_200, y: 6_400_800, cx: 6_400_800, cy: 365_760 })
        );
    }

    #[test]
    fn test_group_keeps_own_identity() {
        let el = VisualElement::from_xml(b"grpSp", GROUP.to_vec()).unwrap();
        assert!(matches!(el, VisualElement::OtherShape(_)));
        assert_eq!(el.shape_id(), Some(7));
        assert_eq!(el.info().name, "Group 6");
        assert_eq!(el.info().geometry, Some(ShapeGeometry { x: 0, y: 0, cx: 10, cy: 10 }));
    }

    #[test]
    fn test_geometry_position_conversion() {
        let g = ShapeGeometry { x: 914_400, y: 1_828_800, cx: 5_486_400, cy: 2_743_200 };
        let pos = Position::from(g);
        assert_eq!(pos, Position::new(1.0, 2.0, 6.0, 3.0));
        assert_eq!(ShapeGeometry::from(pos), g);
    }

    #[test]
    fn test_decode_char_ref() {
        assert_eq!(decode_char_ref(b"#38"), Some('&'));
        assert_eq!(decode_char_ref(b"#x41"), Some('A'));
        assert_eq!(decode_char_ref(b"nbsp"), None);
    }
}
