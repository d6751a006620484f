//! Where pictures sit on a slide, in inches.
use crate::common::error::{Error, Result};
use crate::common::unit::Position;
use crate::ooxml::pptx::{Picture, Slide};

/// Box of the `picture_index`-th picture of the slide, in document order.
pub fn get_position(slide: &Slide, picture_index: usize) -> Result<Position> {
    let picture = slide.pictures().nth(picture_index).ok_or_else(|| {
        Error::NotFound(format!(
            "picture {picture_index} on slide {} (slide has {} pictures)",
            slide.partname(),
            slide.picture_count()
        ))
    })?;
    position_of(picture)
}

/// Boxes of every picture of the slide, in document order.
pub fn get_all_positions(slide: &Slide) -> Result<Vec<Position>> {
    slide.pictures().map(position_of).collect()
}

fn position_of(picture: &Picture) -> Result<Position> {
    picture
        .geometry()
        .map(Position::from)
        .ok_or_else(|| Error::NotFound(format!("position of picture '{}' (no a:xfrm)", picture.name())))
}
