//! Tiered snapshots of a presentation file, taken before destructive edits.
//!
//! Each category keeps at most one snapshot per file stem, under
//! `<root>/<category>/<stem>__<timestamp>.<ext>`. A category takes a new
//! snapshot only when its window has passed since the one it holds; the
//! timestamp in the file name is the reference, not the file's mtime.
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::common::error::{Error, Result};

const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S%.3f";
const STEM_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupCategory {
    Latest,
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "10min")]
    TenMinutes,
    #[serde(rename = "30min")]
    ThirtyMinutes,
    Hourly,
    Daily,
}

impl BackupCategory {
    pub const ALL: [BackupCategory; 6] = [
        BackupCategory::Latest,
        BackupCategory::FiveMinutes,
        BackupCategory::TenMinutes,
        BackupCategory::ThirtyMinutes,
        BackupCategory::Hourly,
        BackupCategory::Daily,
    ];

    /// Directory name under the backup root.
    pub fn dir_name(self) -> &'static str {
        match self {
            BackupCategory::Latest => "latest",
            BackupCategory::FiveMinutes => "5min",
            BackupCategory::TenMinutes => "10min",
            BackupCategory::ThirtyMinutes => "30min",
            BackupCategory::Hourly => "hourly",
            BackupCategory::Daily => "daily",
        }
    }

    /// Minimum age of the held snapshot before a new one is taken.
    pub fn threshold(self) -> TimeDelta {
        TimeDelta::seconds(match self {
            BackupCategory::Latest => 0,
            BackupCategory::FiveMinutes => 300,
            BackupCategory::TenMinutes => 600,
            BackupCategory::ThirtyMinutes => 1800,
            BackupCategory::Hourly => 3600,
            BackupCategory::Daily => 86_400,
        })
    }
}

impl fmt::Display for BackupCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Where snapshots go and which categories are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupConfig {
    pub root: PathBuf,
    pub categories: Vec<BackupCategory>,
}

impl BackupConfig {
    /// All categories under `root`.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            categories: BackupCategory::ALL.to_vec(),
        }
    }
}

/// Snapshot `document` into every category whose window has elapsed.
///
/// Returns the snapshots written by this call.
pub fn backup<P: AsRef<Path>>(document: P, config: &BackupConfig) -> Result<BTreeMap<BackupCategory, PathBuf>> {
    backup_at(document, config, Local::now().naive_local())
}

/// [`backup`] with an explicit clock.
pub fn backup_at<P: AsRef<Path>>(
    document: P,
    config: &BackupConfig,
    now: NaiveDateTime,
) -> Result<BTreeMap<BackupCategory, PathBuf>> {
    let document = document.as_ref();
    if !document.is_file() {
        return Err(Error::Backup(format!("{} does not exist", document.display())));
    }
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Backup(format!("{} has no file name", document.display())))?;
    let suffix = document
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut written = BTreeMap::new();
    for &category in &config.categories {
        let dir = config.root.join(category.dir_name());
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Backup(format!("cannot create {}: {e}", dir.display())))?;

        let held = snapshots_in(&dir, &stem, &suffix)?;
        let due = category == BackupCategory::Latest
            || held
                .iter()
                .map(|(taken, _)| *taken)
                .max()
                .is_none_or(|last| now - last >= category.threshold());
        if !due {
            log::debug!("{category} snapshot of {stem} is recent, skipping");
            continue;
        }

        let target = dir.join(format!(
            "{stem}{STEM_SEPARATOR}{}{suffix}",
            now.format(TIMESTAMP_FORMAT)
        ));
        fs::copy(document, &target)
            .map_err(|e| Error::Backup(format!("cannot write {}: {e}", target.display())))?;
        for (_, old) in held.into_iter().filter(|(_, p)| *p != target) {
            if let Err(e) = fs::remove_file(&old) {
                log::warn!("could not remove old snapshot {}: {e}", old.display());
            }
        }
        written.insert(category, target);
    }

    if !written.is_empty() {
        let names: Vec<&str> = written.keys().map(|c| c.dir_name()).collect();
        log::info!("backed up {} ({})", document.display(), names.join(", "));
    }
    Ok(written)
}

/// Snapshots of `stem` in `dir` with the time each was taken.
fn snapshots_in(dir: &Path, stem: &str, suffix: &str) -> Result<Vec<(NaiveDateTime, PathBuf)>> {
    let prefix = format!("{stem}{STEM_SEPARATOR}");
    let entries = fs::read_dir(dir).map_err(|e| Error::Backup(format!("cannot read {}: {e}", dir.display())))?;

    let mut found = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(stamp) = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(suffix))
        else {
            continue;
        };
        if let Ok(taken) = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT) {
            found.push((taken, entry.path()));
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_milli_opt(9, 26, 53, 589)
            .unwrap()
    }

    fn files_in(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .map(|rd| rd.flatten().map(|e| e.path()).collect())
            .unwrap_or_default()
    }

    fn setup() -> (tempfile::TempDir, PathBuf, BackupConfig) {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("deck.pptx");
        fs::write(&doc, b"pptx bytes").unwrap();
        let config = BackupConfig::new(dir.path().join("backups"));
        (dir, doc, config)
    }

    #[test]
    fn test_three_calls_within_a_minute() {
        let (_dir, doc, config) = setup();
        let mut latest_writes = 0;
        let mut five_min_writes = 0;
        for secs in [0, 20, 40] {
            let written = backup_at(&doc, &config, t0() + TimeDelta::seconds(secs)).unwrap();
            latest_writes += usize::from(written.contains_key(&BackupCategory::Latest));
            five_min_writes += usize::from(written.contains_key(&BackupCategory::FiveMinutes));
        }
        assert_eq!(latest_writes, 3);
        assert_eq!(five_min_writes, 1);

        let latest = files_in(&config.root.join("latest"));
        assert_eq!(latest.len(), 1);
        assert!(latest[0].ends_with("deck__20260314-092733.589.pptx"));
        let five = files_in(&config.root.join("5min"));
        assert_eq!(five.len(), 1);
        assert!(five[0].ends_with("deck__20260314-092653.589.pptx"));
    }

    #[test]
    fn test_window_elapsed_replaces_snapshot() {
        let (_dir, doc, config) = setup();
        backup_at(&doc, &config, t0()).unwrap();
        let written = backup_at(&doc, &config, t0() + TimeDelta::minutes(6)).unwrap();

        let categories: Vec<BackupCategory> = written.keys().copied().collect();
        assert_eq!(categories, vec![BackupCategory::Latest, BackupCategory::FiveMinutes]);
        let five = files_in(&config.root.join("5min"));
        assert_eq!(five, vec![written[&BackupCategory::FiveMinutes].clone()]);
        assert_eq!(fs::read(&five[0]).unwrap(), b"pptx bytes");
        assert_eq!(files_in(&config.root.join("daily")).len(), 1);
    }

    #[test]
    fn test_other_documents_are_left_alone() {
        let (dir, doc, config) = setup();
        let other = dir.path().join("other.pptx");
        fs::write(&other, b"x").unwrap();
        backup_at(&other, &config, t0()).unwrap();
        backup_at(&doc, &config, t0() + TimeDelta::seconds(1)).unwrap();
        assert_eq!(files_in(&config.root.join("latest")).len(), 2);
    }

    #[test]
    fn test_missing_document_fails() {
        let (dir, _doc, config) = setup();
        let err = backup(dir.path().join("gone.pptx"), &config).unwrap_err();
        assert!(matches!(err, Error::Backup(_)));
    }

    #[test]
    fn test_unwritable_root_fails() {
        let (dir, doc, _) = setup();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let err = backup(&doc, &BackupConfig::new(&blocker)).unwrap_err();
        assert!(matches!(err, Error::Backup(_)));
    }
}
