//! Parsed form of a slide part.
//!
//! A slide is split into three pieces: the bytes up to and including the
//! `<p:spTree>` start tag, the ordered children of the shape tree, and the
//! bytes from `</p:spTree>` to the end of the part. Serializing concatenates
//! the pieces, so an unmodified slide writes back byte for byte.
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::common::xml::attr_int;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::pptx::shapes::VisualElement;

/// Child of `p:spTree`.
#[derive(Debug, Clone)]
pub enum TreeNode {
    /// Group properties, whitespace, comments
    Chrome(Vec<u8>),
    /// Trailing `p:extLst`; new elements go in front of it
    ExtLst(Vec<u8>),
    Element(VisualElement),
}

impl TreeNode {
    fn bytes(&self) -> &[u8] {
        match self {
            TreeNode::Chrome(b) | TreeNode::ExtLst(b) => b,
            TreeNode::Element(el) => el.xml(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShapeTree {
    head: Vec<u8>,
    nodes: Vec<TreeNode>,
    tail: Vec<u8>,
    /// Highest `cNvPr/@id` seen anywhere in the part at parse time
    max_id_at_parse: u32,
}

impl ShapeTree {
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        let mut depth = 0usize;
        let mut tree_depth: Option<usize> = None;
        let mut head_end = 0usize;
        let mut open_child: Option<(usize, Vec<u8>)> = None;
        let mut nodes = Vec::new();
        let mut max_id = 0u32;

        loop {
            let start = reader.buffer_position() as usize;
            let event = reader.read_event()?;
            let end = reader.buffer_position() as usize;

            match event {
                Event::Start(e) => {
                    depth += 1;
                    let local = e.local_name();
                    if local.as_ref() == b"cNvPr" {
                        max_id = max_id.max(cnvpr_id(&e));
                    }
                    match tree_depth {
                        None if local.as_ref() == b"spTree" => {
                            tree_depth = Some(depth);
                            head_end = end;
                        }
                        Some(td) if depth == td + 1 => {
                            open_child = Some((start, local.as_ref().to_vec()));
                        }
                        _ => {}
                    }
                }
                Event::End(e) => {
                    match tree_depth {
                        Some(td) if depth == td + 1 => {
                            if let Some((child_start, name)) = open_child.take() {
                                nodes.push(classify(&name, xml[child_start..end].to_vec())?);
                            }
                        }
                        Some(td) if depth == td && e.local_name().as_ref() == b"spTree" => {
                            return Ok(Self {
                                head: xml[..head_end].to_vec(),
                                nodes,
                                tail: xml[start..].to_vec(),
                                max_id_at_parse: max_id,
                            });
                        }
                        _ => {}
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Empty(e) => {
                    let local = e.local_name();
                    if local.as_ref() == b"cNvPr" {
                        max_id = max_id.max(cnvpr_id(&e));
                    }
                    if tree_depth.is_none() && local.as_ref() == b"spTree" {
                        // `<p:spTree/>`: expand so that children can be appended
                        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                        let mut head = xml[..start].to_vec();
                        head.extend_from_slice(format!("<{name}>").as_bytes());
                        let mut tail = format!("</{name}>").into_bytes();
                        tail.extend_from_slice(&xml[end..]);
                        return Ok(Self {
                            head,
                            nodes,
                            tail,
                            max_id_at_parse: max_id,
                        });
                    }
                    if tree_depth == Some(depth) {
                        nodes.push(classify(local.as_ref(), xml[start..end].to_vec())?);
                    }
                }
                Event::Eof => break,
                _ => {
                    if tree_depth == Some(depth) {
                        nodes.push(TreeNode::Chrome(xml[start..end].to_vec()));
                    }
                }
            }
        }
        Err(OoxmlError::Xml("slide has no p:spTree".to_string()))
    }

    /// Visual elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &VisualElement> {
        self.nodes.iter().filter_map(|node| match node {
            TreeNode::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut VisualElement> {
        self.nodes.iter_mut().filter_map(|node| match node {
            TreeNode::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Keep only the elements for which `keep` returns true. Returns how many were removed.
    pub fn retain_elements<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&VisualElement) -> bool,
    {
        let before = self.nodes.len();
        self.nodes.retain(|node| match node {
            TreeNode::Element(el) => keep(el),
            _ => true,
        });
        before - self.nodes.len()
    }

    /// Append an element at the top of the z-order, ahead of any `p:extLst`.
    pub fn push_element(&mut self, element: VisualElement) {
        let at = self
            .nodes
            .iter()
            .position(|node| matches!(node, TreeNode::ExtLst(_)))
            .unwrap_or(self.nodes.len());
        self.nodes.insert(at, TreeNode::Element(element));
    }

    /// Smallest shape id larger than every id in use.
    pub fn next_shape_id(&self) -> u32 {
        self.elements()
            .filter_map(VisualElement::shape_id)
            .fold(self.max_id_at_parse, u32::max)
            + 1
    }

    pub fn to_xml(&self) -> Vec<u8> {
        let body: usize = self.nodes.iter().map(|n| n.bytes().len()).sum();
        let mut out = Vec::with_capacity(self.head.len() + body + self.tail.len());
        out.extend_from_slice(&self.head);
        for node in &self.nodes {
            out.extend_from_slice(node.bytes());
        }
        out.extend_from_slice(&self.tail);
        out
    }
}

fn cnvpr_id(e: &quick_xml::events::BytesStart<'_>) -> u32 {
    attr_int(e, b"id")
        .and_then(|id| u32::try_from(id).ok())
        .unwrap_or(0)
}

fn classify(local_name: &[u8], xml: Vec<u8>) -> Result<TreeNode> {
    Ok(match local_name {
        b"nvGrpSpPr" | b"grpSpPr" => TreeNode::Chrome(xml),
        b"extLst" => TreeNode::ExtLst(xml),
        other => TreeNode::Element(VisualElement::from_xml(other, xml)?),
    })
}
