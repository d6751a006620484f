//! Image formats that can be embedded as picture media.
//!
//! Raster formats are measured by the `image` crate. Metafiles (EMF and
//! placeable WMF) are not decoded; their extent comes from the file header.
use crate::ooxml::opc::constants::content_type as ct;

/// Aldus placeable metafile key.
const WMF_PLACEABLE_KEY: u32 = 0x9AC6_CDD7;
/// `EMR_HEADER` record type.
const EMR_HEADER: u32 = 1;
/// `dSignature` of an EMF header, " EMF" read as little endian.
const EMF_SIGNATURE: u32 = 0x464D_4520;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    Emf,
    Wmf,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => ct::PNG,
            Self::Jpeg => ct::JPEG,
            Self::Gif => ct::GIF,
            Self::Bmp => ct::BMP,
            Self::Tiff => ct::TIFF,
            Self::Emf => ct::EMF,
            Self::Wmf => ct::WMF,
        }
    }

    /// Extension used for new media part names.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Emf => "emf",
            Self::Wmf => "wmf",
        }
    }

    /// Sniff the format from the file signature.
    pub fn detect_from_bytes(bytes: &[u8]) -> Option<Self> {
        if read_u32(bytes, 0) == Some(WMF_PLACEABLE_KEY) {
            return Some(Self::Wmf);
        }
        if read_u32(bytes, 0) == Some(EMR_HEADER) && read_u32(bytes, 40) == Some(EMF_SIGNATURE) {
            return Some(Self::Emf);
        }
        match bytes {
            [0x89, b'P', b'N', b'G', ..] => Some(Self::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [b'G', b'I', b'F', b'8', ..] => Some(Self::Gif),
            [b'B', b'M', ..] => Some(Self::Bmp),
            [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some(Self::Tiff),
            _ => None,
        }
    }

    /// Matching decoder format of the `image` crate, `None` for metafiles.
    pub fn decoder_format(&self) -> Option<image::ImageFormat> {
        match self {
            Self::Png => Some(image::ImageFormat::Png),
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
            Self::Gif => Some(image::ImageFormat::Gif),
            Self::Bmp => Some(image::ImageFormat::Bmp),
            Self::Tiff => Some(image::ImageFormat::Tiff),
            Self::Emf | Self::Wmf => None,
        }
    }

    /// Extent of a metafile as stored in its header.
    ///
    /// EMF reports `rclFrame` (0.01 mm), falling back to `rclBounds` (device
    /// units) when the frame is empty. Placeable WMF reports its bounding box
    /// in logical units. Only the ratio is meaningful across formats.
    pub fn metafile_extent(&self, bytes: &[u8]) -> Option<(u32, u32)> {
        match self {
            Self::Emf => {
                let rect = |offset: usize| -> Option<(u32, u32)> {
                    let left = read_i32(bytes, offset)?;
                    let top = read_i32(bytes, offset + 4)?;
                    let right = read_i32(bytes, offset + 8)?;
                    let bottom = read_i32(bytes, offset + 12)?;
                    extent(i64::from(right) - i64::from(left), i64::from(bottom) - i64::from(top))
                };
                rect(24).or_else(|| rect(8))
            }
            Self::Wmf => {
                let left = read_i16(bytes, 6)?;
                let top = read_i16(bytes, 8)?;
                let right = read_i16(bytes, 10)?;
                let bottom = read_i16(bytes, 12)?;
                extent(i64::from(right) - i64::from(left), i64::from(bottom) - i64::from(top))
            }
            _ => None,
        }
    }
}

fn extent(width: i64, height: i64) -> Option<(u32, u32)> {
    let width = u32::try_from(width.abs()).ok()?;
    let height = u32::try_from(height.abs()).ok()?;
    (width > 0 && height > 0).then_some((width, height))
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw = bytes.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

fn read_i32(bytes: &[u8], offset: usize) -> Option<i32> {
    read_u32(bytes, offset).map(|v| v as i32)
}

fn read_i16(bytes: &[u8], offset: usize) -> Option<i16> {
    let raw = bytes.get(offset..offset + 2)?;
    Some(i16::from_le_bytes([raw[0], raw[1]]))
}
