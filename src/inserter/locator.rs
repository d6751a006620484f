//! Finding and stripping elements of a slide by kind.
use crate::ooxml::pptx::{Picture, Slide, VisualElement};

/// Pictures in authored document order.
pub fn find_pictures(slide: &Slide) -> Vec<&Picture> {
    slide.pictures().collect()
}

/// Remove every picture, leaving text and other shapes alone.
pub fn remove_pictures(slide: &mut Slide) -> usize {
    slide.remove_elements(VisualElement::is_picture)
}

/// Remove text boxes and text placeholders.
pub fn remove_all_text(slide: &mut Slide) -> usize {
    slide.remove_elements(|el| matches!(el, VisualElement::TextBox(_) | VisualElement::Placeholder(_)))
}

/// Remove free text boxes only; layout placeholders stay.
pub fn remove_text_boxes(slide: &mut Slide) -> usize {
    slide.remove_elements(|el| matches!(el, VisualElement::TextBox(_)))
}
