/// A slide of an open presentation: its identity in the slide list plus the
/// parsed shape tree.
use crate::ooxml::error::Result;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::pptx::parts::ShapeTree;
use crate::ooxml::pptx::shapes::{Picture, VisualElement};

/// One slide of a [`Presentation`](crate::ooxml::pptx::Presentation).
///
/// Edits go to the in-memory shape tree and mark the slide dirty; the slide
/// part bytes are only rewritten when the presentation is flushed.
#[derive(Debug, Clone)]
pub struct Slide {
    partname: PackURI,
    slide_id: u32,
    r_id: String,
    tree: ShapeTree,
    dirty: bool,
}

impl Slide {
    pub(crate) fn parse(partname: PackURI, slide_id: u32, r_id: String, xml: &[u8]) -> Result<Self> {
        Ok(Self {
            partname,
            slide_id,
            r_id,
            tree: ShapeTree::parse(xml)?,
            dirty: false,
        })
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    /// Stable `p:sldId/@id` of the slide.
    #[inline]
    pub fn slide_id(&self) -> u32 {
        self.slide_id
    }

    /// Relationship id from the presentation part to this slide.
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    pub(crate) fn set_r_id(&mut self, r_id: String) {
        self.r_id = r_id;
    }

    /// Visual elements in document (z-) order.
    pub fn elements(&self) -> impl Iterator<Item = &VisualElement> {
        self.tree.elements()
    }

    /// Pictures in document order.
    pub fn pictures(&self) -> impl Iterator<Item = &Picture> {
        self.tree.elements().filter_map(|el| match el {
            VisualElement::Picture(p) => Some(p),
            _ => None,
        })
    }

    pub fn picture_count(&self) -> usize {
        self.pictures().count()
    }

    /// Mutable access to the picture with shape id `shape_id`.
    pub fn picture_mut(&mut self, shape_id: u32) -> Option<&mut Picture> {
        let found = self.tree.elements_mut().find_map(|el| match el {
            VisualElement::Picture(p) if p.shape_id() == Some(shape_id) => Some(p),
            _ => None,
        });
        if found.is_some() {
            self.dirty = true;
        }
        found
    }

    /// Remove every element for which `remove` returns true. Returns the count removed.
    pub fn remove_elements<F>(&mut self, mut remove: F) -> usize
    where
        F: FnMut(&VisualElement) -> bool,
    {
        let removed = self.tree.retain_elements(|el| !remove(el));
        if removed > 0 {
            self.dirty = true;
        }
        removed
    }

    /// Add an element on top of the existing ones.
    pub fn push_element(&mut self, element: VisualElement) {
        self.tree.push_element(element);
        self.dirty = true;
    }

    #[inline]
    pub fn next_shape_id(&self) -> u32 {
        self.tree.next_shape_id()
    }

    /// Text of the title placeholder, if the slide has a non-empty one.
    pub fn title(&self) -> Option<&str> {
        self.elements().find_map(|el| match el {
            VisualElement::Placeholder(node) => {
                let info = node.info();
                match info.placeholder.as_deref() {
                    Some("title" | "ctrTitle") if !info.text.trim().is_empty() => {
                        Some(info.text.as_str())
                    }
                    _ => None,
                }
            }
            _ => None,
        })
    }

    /// Whether `r_id` is referenced from any element of the slide.
    pub fn references(&self, r_id: &str) -> bool {
        let pattern = format!("\"{r_id}\"");
        self.elements()
            .any(|el| memchr::memmem::find(el.xml(), pattern.as_bytes()).is_some())
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn to_xml(&self) -> Vec<u8> {
        self.tree.to_xml()
    }
}
