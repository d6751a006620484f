//! Slide Inserter - batch image insertion into PowerPoint presentations
//!
//! A template slide is cloned once per image group; the clone's placeholder
//! pictures are swapped for the group's images at the same boxes, and each
//! inserted picture records where it came from in its alternative text.
//!
//! # Features
//!
//! - **Template cloning**: Copy a slide with its layout, media and notes
//! - **Positional replacement**: The i-th image takes the i-th picture's box
//! - **Provenance**: Source paths stored in `descr`/`title` and read back
//! - **Tiered backups**: Snapshots before every destructive edit
//! - **Batch runs**: YAML-configured jobs, safe to re-run
//!
//! # Example - Copy a template slide with a new image
//!
//! ```no_run
//! use slide_inserter::inserter::{self, ReplaceOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pres = inserter::open_presentation("results.pptx")?;
//! let index = inserter::copy_slide_replace_image(
//!     &mut pres,
//!     1,
//!     "plots/run1.png",
//!     None,
//!     &ReplaceOptions::default(),
//! )?;
//! println!("created slide {}", index + 1);
//! inserter::save_presentation(&mut pres, "results.pptx")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Running a batch job
//!
//! ```no_run
//! use slide_inserter::{batch, BatchConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BatchConfig::from_file("insert.yaml")?;
//! let summary = batch::run(&config)?;
//! println!("{} slides, {} failed groups", summary.slide_count, summary.failed);
//! # Ok(())
//! # }
//! ```

/// Shared error type, unit conversions and XML helpers
pub mod common;

/// OOXML package layer
///
/// Open Packaging Conventions parts and relationships, plus the
/// PresentationML model the inserter edits.
pub mod ooxml;

/// Slide operations: locate, duplicate, place, annotate, delete
pub mod inserter;

/// Tiered snapshots taken before destructive edits
pub mod backup;

/// YAML batch configuration
pub mod config;

/// Batch driver
pub mod batch;

// Re-export commonly used types for convenience
pub use backup::{BackupCategory, BackupConfig};
pub use batch::BatchSummary;
pub use common::{Error, Position, Result};
pub use config::{BatchConfig, ImageEntry};
pub use ooxml::pptx::{Presentation, Slide};
