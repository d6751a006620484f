//! Putting an image file on a slide.
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::common::error::{Error, Result};
use crate::common::unit::Position;
use crate::inserter::{slide_at, slide_at_mut};
use crate::ooxml::pptx::writer::NewPicture;
use crate::ooxml::pptx::{ImageFormat, Presentation};

/// Image file read from disk and checked to be decodable.
///
/// For metafiles the "pixel" size is the header extent; only its aspect
/// ratio is used.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::ImageNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path).map_err(|_| Error::ImageNotFound(path.to_path_buf()))?;
        let format = ImageFormat::detect_from_bytes(&bytes)
            .ok_or_else(|| Error::unsupported_image(path, "unrecognized file signature"))?;
        let (width_px, height_px) = match format.decoder_format() {
            Some(decoder) => image::ImageReader::with_format(Cursor::new(&bytes), decoder)
                .into_dimensions()
                .map_err(|e| Error::unsupported_image(path, e.to_string()))?,
            None => format
                .metafile_extent(&bytes)
                .ok_or_else(|| Error::unsupported_image(path, "metafile header has no extent"))?,
        };
        if width_px == 0 || height_px == 0 {
            return Err(Error::unsupported_image(path, "image has no pixels"));
        }
        log::debug!("loaded {} ({:?}, {width_px}x{height_px})", path.display(), format);
        Ok(Self {
            path: path.to_path_buf(),
            bytes,
            format,
            width_px,
            height_px,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A picture that was just added to a slide.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedPicture {
    pub slide_index: usize,
    pub shape_id: u32,
    pub r_id: String,
    pub position: Position,
}

/// Size of an image scaled to the one given dimension, keeping its pixel aspect ratio.
///
/// Exactly one of `width` and `height` must be given.
pub fn aspect_fit(width_px: u32, height_px: u32, width: Option<f64>, height: Option<f64>) -> Result<(f64, f64)> {
    match (width, height) {
        (Some(w), None) => Ok((w, w * (f64::from(height_px) / f64::from(width_px)))),
        (None, Some(h)) => Ok((h * (f64::from(width_px) / f64::from(height_px)), h)),
        _ => Err(Error::InvalidArgument(
            "exactly one of width or height must be given".to_string(),
        )),
    }
}

/// Embed the image at `path` and place it at `position` on the slide.
pub fn insert_image<P: AsRef<Path>>(
    pres: &mut Presentation,
    slide_index: usize,
    path: P,
    position: Position,
) -> Result<PlacedPicture> {
    slide_at(pres, slide_index)?;
    position.validate()?;
    let image = LoadedImage::load(path)?;
    insert_loaded(pres, slide_index, image, position)
}

/// Like [`insert_image`], but only one of `width`/`height` is given and the
/// other follows from the image's aspect ratio.
pub fn insert_image_preserve_aspect<P: AsRef<Path>>(
    pres: &mut Presentation,
    slide_index: usize,
    path: P,
    left: f64,
    top: f64,
    width: Option<f64>,
    height: Option<f64>,
) -> Result<PlacedPicture> {
    if width.is_some() == height.is_some() {
        return Err(Error::InvalidArgument(
            "exactly one of width or height must be given".to_string(),
        ));
    }
    slide_at(pres, slide_index)?;
    let image = LoadedImage::load(path)?;
    let (width, height) = aspect_fit(image.width_px, image.height_px, width, height)?;
    let position = Position::new(left, top, width, height);
    position.validate()?;
    insert_loaded(pres, slide_index, image, position)
}

pub(crate) fn insert_loaded(
    pres: &mut Presentation,
    slide_index: usize,
    image: LoadedImage,
    position: Position,
) -> Result<PlacedPicture> {
    let description = image.file_name();
    let r_id = pres.embed_image(slide_index, image.bytes, image.format)?;

    let slide = slide_at_mut(pres, slide_index)?;
    let shape_id = slide.next_shape_id();
    let element = NewPicture {
        shape_id,
        r_id: &r_id,
        geometry: position.into(),
        description: &description,
    }
    .into_element()?;
    slide.push_element(element);

    Ok(PlacedPicture {
        slide_index,
        shape_id,
        r_id,
        position,
    })
}
