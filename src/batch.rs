//! Batch driver: clear the previous output, then one new slide per image group.
use std::fs;
use std::path::PathBuf;

use crate::backup::BackupConfig;
use crate::common::error::{Error, Result};
use crate::config::BatchConfig;
use crate::inserter::{
    ReplaceOptions, copy_slide_replace_image, copy_slide_replace_images, delete_slides, open_presentation,
    save_presentation,
};

/// Outcome of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Groups that produced a slide
    pub succeeded: usize,
    /// Groups that were skipped after an error
    pub failed: usize,
    /// Slides removed before the groups were processed
    pub deleted: usize,
    /// Slides in the saved presentation
    pub slide_count: usize,
    pub output: PathBuf,
}

/// Run the job described by `config`.
///
/// Errors that affect the whole run (unreadable presentation, failed backup,
/// failed save) are returned. A group that fails is logged and counted, and
/// the remaining groups still run.
pub fn run(config: &BatchConfig) -> Result<BatchSummary> {
    let target = config.target().to_path_buf();
    if let Some(output) = &config.output_path {
        fs::copy(&config.presentation, output).map_err(|e| Error::package_io(&config.presentation, e))?;
        log::info!("copied {} to {}", config.presentation.display(), output.display());
    }

    let mut pres = open_presentation(&target)?;
    let template_id = crate::inserter::slide_at(&pres, config.template_slide)?.slide_id();

    let preserved = config.preserved();
    let stale: Vec<usize> = (0..pres.slide_count()).filter(|i| !preserved.contains(i)).collect();
    let deleted = if stale.is_empty() {
        log::info!("no old slides to delete");
        0
    } else {
        let backup = BackupConfig::new(&config.backup_dir);
        delete_slides(&mut pres, &stale, Some(&backup))?
    };

    let template = pres
        .index_of_slide_id(template_id)
        .ok_or_else(|| Error::NotFound(format!("template slide id {template_id}")))?;
    log::info!(
        "template is slide {} of {}, {} groups to insert",
        template + 1,
        pres.slide_count(),
        config.images.len()
    );

    let options = ReplaceOptions {
        store_metadata: config.store_metadata,
        add_label: config.add_label,
    };
    let position = config.manual_position();
    let groups = config.image_groups();
    let total = groups.len();
    let (mut succeeded, mut failed) = (0, 0);
    for (i, group) in groups.iter().enumerate() {
        let result = match group.as_slice() {
            [single] => copy_slide_replace_image(&mut pres, template, single, position, &options),
            many => copy_slide_replace_images(&mut pres, template, many, None, &options),
        };
        match result {
            Ok(index) => {
                log::info!("[{}/{total}] created slide {}", i + 1, index + 1);
                succeeded += 1;
            }
            Err(e) => {
                log::error!("[{}/{total}] skipped: {e}", i + 1);
                failed += 1;
            }
        }
    }

    save_presentation(&mut pres, &target)?;
    if failed > 0 {
        log::warn!("{succeeded}/{total} groups inserted, {failed} failed");
    } else {
        log::info!("{succeeded}/{total} groups inserted into {}", target.display());
    }
    Ok(BatchSummary {
        succeeded,
        failed,
        deleted,
        slide_count: pres.slide_count(),
        output: target,
    })
}
