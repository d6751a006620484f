/// XML parts of a presentation package that are parsed rather than passed through.
pub mod presentation;
pub mod slide;

pub use presentation::{PresentationPart, SlideEntry, rewrite_slide_list};
pub use slide::{ShapeTree, TreeNode};
