//! Template-driven replacement: clone a slide, swap its pictures, label it.
//!
//! Every operation checks its preconditions (indices, image files, picture
//! counts) before the presentation is modified. When a step fails after that,
//! the slide being built is rolled back, so the presentation stays consistent.
use std::path::Path;

use crate::backup::{self, BackupConfig};
use crate::common::error::{Error, Result};
use crate::common::unit::Position;
use crate::inserter::duplicate::duplicate_slide;
use crate::inserter::geometry::{get_all_positions, get_position};
use crate::inserter::locator::{remove_pictures, remove_text_boxes};
use crate::inserter::metadata::stamp_metadata;
use crate::inserter::placement::{LoadedImage, PlacedPicture, insert_loaded};
use crate::inserter::{slide_at, slide_at_mut};
use crate::ooxml::pptx::writer::{NewTextBox, TextFormat};
use crate::ooxml::pptx::{Presentation, Slide};

const LABEL_LEFT: f64 = 0.5;
const LABEL_TOP: f64 = 7.0;
const LABEL_WIDTH: f64 = 5.0;
const LABEL_HEIGHT: f64 = 0.4;
const LABEL_FONT: &str = "Arial";
const LABEL_SIZE_PT: f64 = 8.0;

/// What to add next to each inserted picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceOptions {
    /// Record the source path in the picture's alternative text
    pub store_metadata: bool,
    /// Add a `File:`/`Path:` text box; only for single-image slides
    pub add_label: bool,
}

impl Default for ReplaceOptions {
    fn default() -> Self {
        Self {
            store_metadata: true,
            add_label: true,
        }
    }
}

/// Copy the template slide to the end and put `image_path` in place of its pictures.
///
/// Without `position`, the template must hold exactly one picture, whose box
/// is reused; templates with more pictures go through
/// [`copy_slide_replace_images`]. Returns the index of the new slide.
pub fn copy_slide_replace_image<P: AsRef<Path>>(
    pres: &mut Presentation,
    template_index: usize,
    image_path: P,
    position: Option<Position>,
    options: &ReplaceOptions,
) -> Result<usize> {
    let template = slide_at(pres, template_index)?;
    let position = match position {
        Some(pos) => {
            pos.validate()?;
            pos
        }
        None => template_box(template, template_index)?,
    };
    let image = LoadedImage::load(image_path)?;

    let index = duplicate_slide(pres, template_index)?;
    fill_new_slide(pres, index, vec![(image, position)], options)?;
    log::info!("slide {index}: copied from {template_index} with 1 image");
    Ok(index)
}

/// Copy the template slide and replace its pictures one for one with `image_paths`.
///
/// The i-th path takes the place of the i-th picture in document order. The
/// number of paths must match the template's picture count. Explicit
/// `positions`, when given, must have one box per path.
pub fn copy_slide_replace_images<P: AsRef<Path>>(
    pres: &mut Presentation,
    template_index: usize,
    image_paths: &[P],
    positions: Option<&[Position]>,
    options: &ReplaceOptions,
) -> Result<usize> {
    if image_paths.is_empty() {
        return Err(Error::InvalidArgument("no images given".to_string()));
    }
    let template = slide_at(pres, template_index)?;
    let placeholders = template.picture_count();
    if placeholders == 0 {
        return Err(no_template_picture(template_index));
    }
    if image_paths.len() != placeholders {
        return Err(Error::PlaceholderCountMismatch {
            template_index,
            placeholders,
            images: image_paths.len(),
        });
    }
    let positions = match positions {
        Some(given) if given.len() != image_paths.len() => {
            return Err(Error::InvalidArgument(format!(
                "{} positions given for {} images",
                given.len(),
                image_paths.len()
            )));
        }
        Some(given) => {
            given.iter().try_for_each(Position::validate)?;
            given.to_vec()
        }
        None => get_all_positions(template)?,
    };
    let images = image_paths
        .iter()
        .map(LoadedImage::load)
        .collect::<Result<Vec<_>>>()?;

    let count = images.len();
    let index = duplicate_slide(pres, template_index)?;
    fill_new_slide(pres, index, images.into_iter().zip(positions).collect(), options)?;
    log::info!("slide {index}: copied from {template_index} with {count} images");
    Ok(index)
}

/// Swap the picture of an existing slide for `image_path`, keeping its box.
///
/// Old pictures and free text boxes (earlier labels) are removed first.
pub fn replace_image_on_existing_slide<P: AsRef<Path>>(
    pres: &mut Presentation,
    slide_index: usize,
    image_path: P,
    options: &ReplaceOptions,
) -> Result<PlacedPicture> {
    let slide = slide_at(pres, slide_index)?;
    let position = get_position(slide, 0)?;
    let image = LoadedImage::load(image_path)?;

    let snapshot = slide.clone();
    let result = (|| -> Result<PlacedPicture> {
        let slide = slide_at_mut(pres, slide_index)?;
        let pictures = remove_pictures(slide);
        let labels = remove_text_boxes(slide);
        log::debug!("slide {slide_index}: removed {pictures} pictures and {labels} text boxes");
        let mut placed = place_all(pres, slide_index, vec![(image, position)], options)?;
        placed.pop().ok_or_else(|| Error::NotFound("inserted picture".to_string()))
    })();

    if result.is_err() {
        restore(pres, slide_index, snapshot);
    }
    result
}

/// Add the `File:`/`Path:` label for `image_path` to an existing slide.
///
/// Returns the shape id of the label.
pub fn add_label_to_existing_slide<P: AsRef<Path>>(
    pres: &mut Presentation,
    slide_index: usize,
    image_path: P,
) -> Result<u32> {
    add_label(slide_at_mut(pres, slide_index)?, image_path.as_ref())
}

/// Delete one slide, taking a snapshot of the file first when `backup` is set.
///
/// A failed snapshot aborts the deletion.
pub fn delete_slide(pres: &mut Presentation, slide_index: usize, backup: Option<&BackupConfig>) -> Result<()> {
    slide_at(pres, slide_index)?;
    if let Some(config) = backup {
        snapshot_source(pres, config)?;
    }
    pres.remove_slide(slide_index)?;
    log::info!("deleted slide {slide_index}");
    Ok(())
}

/// Delete several slides after one snapshot, highest index first.
///
/// All indices are checked before anything is deleted; duplicates are
/// ignored. Returns how many slides were removed.
pub fn delete_slides(pres: &mut Presentation, indices: &[usize], backup: Option<&BackupConfig>) -> Result<usize> {
    for &index in indices {
        slide_at(pres, index)?;
    }
    let mut ordered = indices.to_vec();
    ordered.sort_unstable_by(|a, b| b.cmp(a));
    ordered.dedup();
    if ordered.is_empty() {
        return Ok(0);
    }

    if let Some(config) = backup {
        snapshot_source(pres, config)?;
    }
    for &index in &ordered {
        pres.remove_slide(index)?;
    }
    log::info!("deleted {} slides", ordered.len());
    Ok(ordered.len())
}

fn snapshot_source(pres: &Presentation, config: &BackupConfig) -> Result<()> {
    let source = pres
        .source_path()
        .ok_or_else(|| Error::Backup("presentation has no file on disk to back up".to_string()))?;
    backup::backup(source, config)?;
    Ok(())
}

fn template_box(template: &Slide, template_index: usize) -> Result<Position> {
    match template.picture_count() {
        0 => Err(no_template_picture(template_index)),
        1 => get_position(template, 0),
        placeholders => Err(Error::PlaceholderCountMismatch {
            template_index,
            placeholders,
            images: 1,
        }),
    }
}

fn no_template_picture(template_index: usize) -> Error {
    Error::NotFound(format!(
        "template slide {template_index} has no picture to take positions from"
    ))
}

/// Strip the cloned pictures of slide `index` and place the new images. A
/// failure removes the half-built slide again.
fn fill_new_slide(
    pres: &mut Presentation,
    index: usize,
    images: Vec<(LoadedImage, Position)>,
    options: &ReplaceOptions,
) -> Result<Vec<PlacedPicture>> {
    let result = slide_at_mut(pres, index)
        .map(remove_pictures)
        .and_then(|_| place_all(pres, index, images, options));
    if result.is_err() {
        if let Err(e) = pres.remove_slide(index) {
            log::warn!("could not roll back slide {index}: {e}");
        }
    }
    result
}

fn place_all(
    pres: &mut Presentation,
    index: usize,
    images: Vec<(LoadedImage, Position)>,
    options: &ReplaceOptions,
) -> Result<Vec<PlacedPicture>> {
    let single = images.len() == 1;
    let mut placed = Vec::with_capacity(images.len());
    for (image, position) in images {
        let path = image.path.clone();
        let picture = insert_loaded(pres, index, image, position)?;
        let slide = slide_at_mut(pres, index)?;
        if options.store_metadata {
            let target = slide
                .picture_mut(picture.shape_id)
                .ok_or_else(|| Error::NotFound(format!("picture {} on slide {index}", picture.shape_id)))?;
            stamp_metadata(target, &path.to_string_lossy())?;
        }
        if options.add_label && single {
            add_label(slide, &path)?;
        }
        placed.push(picture);
    }
    Ok(placed)
}

fn add_label(slide: &mut Slide, image_path: &Path) -> Result<u32> {
    let file_name = image_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let folder = image_path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lines = [format!("File: {file_name}"), format!("Path: {folder}")];

    let shape_id = slide.next_shape_id();
    let element = NewTextBox {
        shape_id,
        geometry: Position::new(LABEL_LEFT, LABEL_TOP, LABEL_WIDTH, LABEL_HEIGHT).into(),
        lines: &lines,
        format: &TextFormat {
            font: Some(LABEL_FONT.to_string()),
            size_pt: Some(LABEL_SIZE_PT),
        },
    }
    .into_element()?;
    slide.push_element(element);
    Ok(shape_id)
}

fn restore(pres: &mut Presentation, index: usize, mut snapshot: Slide) {
    snapshot.mark_dirty();
    if let Some(slide) = pres.slide_mut(index) {
        *slide = snapshot;
    }
}
