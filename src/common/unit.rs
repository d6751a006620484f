//! Unit conversion utilities.
//!
//! Slide geometry is stored in EMUs (English Metric Units) inside the package
//! but handled as floating point inches everywhere else. Rounding to EMU only
//! happens when geometry is written back to XML.
use serde::{Deserialize, Serialize};

use crate::common::error::{Error, Result};

pub const EMUS_PER_INCH: i64 = 914_400;
pub const EMUS_PER_CM: i64 = 360_000;
pub const EMUS_PER_PT: i64 = 12_700;
pub const CM_PER_INCH: f64 = 2.54;

#[inline]
pub fn cm_to_inches(cm: f64) -> f64 {
    cm / CM_PER_INCH
}

#[inline]
pub fn inches_to_cm(inches: f64) -> f64 {
    inches * CM_PER_INCH
}

#[inline]
pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_INCH as f64
}

/// Inches to EMU, rounded to the nearest unit.
#[inline]
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMUS_PER_INCH as f64).round() as i64
}

/// Font size in points to the hundredths-of-a-point value used by `a:rPr/@sz`.
#[inline]
pub fn pt_to_centipoints(pt: f64) -> u32 {
    (pt * 100.0).round().max(0.0) as u32
}

/// Bounding box of a picture, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Position {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build a position from centimetre values.
    pub fn from_cm(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(
            cm_to_inches(left),
            cm_to_inches(top),
            cm_to_inches(width),
            cm_to_inches(height),
        )
    }

    /// Build a position from raw EMU values as stored in `a:off`/`a:ext`.
    pub fn from_emu(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self::new(
            emu_to_inches(x),
            emu_to_inches(y),
            emu_to_inches(cx),
            emu_to_inches(cy),
        )
    }

    /// `(x, y, cx, cy)` in EMUs.
    pub fn to_emu(&self) -> (i64, i64, i64, i64) {
        (
            inches_to_emu(self.left),
            inches_to_emu(self.top),
            inches_to_emu(self.width),
            inches_to_emu(self.height),
        )
    }

    /// Reject boxes that cannot be written to a slide.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("left", self.left),
            ("top", self.top),
            ("width", self.width),
            ("height", self.height),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidArgument(format!(
                    "position {name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}
