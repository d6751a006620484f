//! PowerPoint (.pptx) presentations.
//!
//! A [`Presentation`] owns the OPC package and an ordered list of [`Slide`]s.
//! Each slide keeps its shape tree parsed into [`VisualElement`]s so that
//! pictures and text can be removed, added or re-described without touching
//! the rest of the slide XML.
//!
//! # Example
//!
//! ```rust,no_run
//! use slide_inserter::ooxml::pptx::Presentation;
//!
//! let pres = Presentation::open("deck.pptx")?;
//! for slide in pres.slides() {
//!     for pic in slide.pictures() {
//!         println!("{} -> {:?}", pic.name(), pic.description());
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod format;
pub mod parts;
pub mod presentation;
pub mod shapes;
pub mod slide;
pub mod writer;

pub use format::ImageFormat;
pub use presentation::Presentation;
pub use shapes::{Picture, ShapeGeometry, VisualElement};
pub use slide::Slide;
