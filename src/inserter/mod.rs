//! Slide operations of the batch image inserter.
//!
//! Everything here works on an open [`Presentation`] and reports failures with
//! the crate [`Error`] taxonomy. Nothing is written to disk until the caller
//! saves; preconditions are checked before the presentation is touched.
pub mod duplicate;
pub mod geometry;
pub mod locator;
pub mod metadata;
pub mod placement;
pub mod workflow;

use std::path::Path;

use crate::common::error::{Error, Result};
use crate::ooxml::pptx::{Presentation, Slide};

pub use duplicate::duplicate_slide;
pub use geometry::{get_all_positions, get_position};
pub use locator::{find_pictures, remove_all_text, remove_pictures, remove_text_boxes};
pub use metadata::{MetadataRecord, extract_all_metadata, stamp_metadata};
pub use placement::{LoadedImage, PlacedPicture, aspect_fit, insert_image, insert_image_preserve_aspect};
pub use workflow::{
    ReplaceOptions, add_label_to_existing_slide, copy_slide_replace_image, copy_slide_replace_images,
    delete_slide, delete_slides, replace_image_on_existing_slide,
};

/// Open a presentation, reporting any failure as [`Error::PackageIo`].
pub fn open_presentation<P: AsRef<Path>>(path: P) -> Result<Presentation> {
    let path = path.as_ref();
    Presentation::open(path).map_err(|e| Error::package_io(path, e))
}

/// Save to `path`, reporting any failure as [`Error::PackageIo`].
pub fn save_presentation<P: AsRef<Path>>(pres: &mut Presentation, path: P) -> Result<()> {
    let path = path.as_ref();
    pres.save_as(path).map_err(|e| Error::package_io(path, e))
}

/// One line per slide: `"<index>: <title>"`.
pub fn list_slides(pres: &Presentation) -> Vec<String> {
    pres.slides()
        .iter()
        .enumerate()
        .map(|(i, slide)| format!("{i}: {}", slide.title().unwrap_or("Untitled")))
        .collect()
}

pub(crate) fn slide_at(pres: &Presentation, index: usize) -> Result<&Slide> {
    let count = pres.slide_count();
    pres.slide(index)
        .ok_or(Error::InvalidIndex { index, count })
}

pub(crate) fn slide_at_mut(pres: &mut Presentation, index: usize) -> Result<&mut Slide> {
    let count = pres.slide_count();
    pres.slide_mut(index)
        .ok_or(Error::InvalidIndex { index, count })
}
