/// Shapes found in a slide's shape tree.
///
/// Every direct child of `p:spTree` becomes a [`VisualElement`]: a picture, a
/// text box, a layout placeholder or any other shape. The variant set is closed
/// so that callers match on it exhaustively.
pub mod base;
pub mod picture;

pub use base::{ShapeGeometry, ShapeInfo, ShapeNode, VisualElement};
pub use picture::Picture;
