//! Provenance of inserted images, kept in the pictures' alternative text.
//!
//! The full source path goes to `cNvPr/@descr` and the file name to
//! `cNvPr/@title`. Both survive round trips through PowerPoint.
use serde::Serialize;

use crate::common::error::Result;
use crate::common::unit::Position;
use crate::ooxml::pptx::{Picture, Presentation};

/// Where one picture of the presentation came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataRecord {
    pub slide_index: usize,
    /// One-based, as shown in PowerPoint
    pub slide_number: usize,
    pub original_path: Option<String>,
    pub filename: Option<String>,
    pub position: Option<Position>,
}

/// Record `original_path` on the picture, replacing any previous value.
pub fn stamp_metadata(picture: &mut Picture, original_path: &str) -> Result<()> {
    picture.set_alt_text(original_path, Some(base_name(original_path)))?;
    Ok(())
}

/// Metadata of every picture, in slide order then document order.
pub fn extract_all_metadata(pres: &Presentation) -> Vec<MetadataRecord> {
    let mut records = Vec::new();
    for (slide_index, slide) in pres.slides().iter().enumerate() {
        for picture in slide.pictures() {
            let original_path = picture
                .description()
                .filter(|d| !d.is_empty())
                .map(str::to_string);
            let filename = picture
                .title()
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .or_else(|| original_path.as_deref().map(|p| base_name(p).to_string()))
                .or_else(|| {
                    picture
                        .image_r_id()
                        .and_then(|r_id| pres.image_partname(slide_index, r_id))
                        .map(|media| media.filename().to_string())
                });
            records.push(MetadataRecord {
                slide_index,
                slide_number: slide_index + 1,
                original_path,
                filename,
                position: picture.geometry().map(Position::from),
            });
        }
    }
    records
}

/// Last component of a path written with either separator.
fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::fixtures;

    #[test]
    fn test_stamp_then_extract() {
        let mut pres = Presentation::from_bytes(&fixtures::standard_deck()).unwrap();
        let slide = pres.slide_mut(1).unwrap();
        let shape_id = slide.pictures().next().unwrap().shape_id().unwrap();
        stamp_metadata(slide.picture_mut(shape_id).unwrap(), "C:/data/x.png").unwrap();

        let bytes = pres.to_bytes().unwrap();
        let pres = Presentation::from_bytes(&bytes).unwrap();
        let records = extract_all_metadata(&pres);
        let record = records.iter().find(|r| r.slide_index == 1).unwrap();
        assert_eq!(record.original_path.as_deref(), Some("C:/data/x.png"));
        assert_eq!(record.filename.as_deref(), Some("x.png"));
        assert_eq!(record.slide_number, 2);
        assert_eq!(record.position, Some(Position::new(1.0, 2.0, 6.0, 3.0)));
    }

    #[test]
    fn test_stamp_overwrites() {
        let mut pres = Presentation::from_bytes(&fixtures::standard_deck()).unwrap();
        let slide = pres.slide_mut(3).unwrap();
        let shape_id = slide.pictures().next().unwrap().shape_id().unwrap();
        let picture = slide.picture_mut(shape_id).unwrap();
        stamp_metadata(picture, "D:\\old\\a.png").unwrap();
        stamp_metadata(picture, "D:\\new\\b & c.png").unwrap();
        assert_eq!(picture.description(), Some("D:\\new\\b & c.png"));
        assert_eq!(picture.title(), Some("b & c.png"));
    }

    #[test]
    fn test_unstamped_pictures_fall_back_to_media_name() {
        let pres = Presentation::from_bytes(&fixtures::standard_deck()).unwrap();
        let records = extract_all_metadata(&pres);
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.original_path.is_none()));
        assert_eq!(records[0].filename.as_deref(), Some("image1.png"));
        let slides: Vec<usize> = records.iter().map(|r| r.slide_index).collect();
        assert_eq!(slides, vec![1, 2, 2, 3]);
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("C:\\shots\\a.png"), "a.png");
        assert_eq!(base_name("/tmp/b.png"), "b.png");
        assert_eq!(base_name("c.png"), "c.png");
    }
}
