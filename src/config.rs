//! Batch job description, read from YAML.
//!
//! ```yaml
//! presentation: PPT/results.pptx
//! template_slide: 1
//! base_dir: data/plots
//! images:
//!   - run1.png
//!   - [run2_a.png, run2_b.png]
//!   - path: /mnt/shared/extra.png
//! ```
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::error::{Error, Result};
use crate::common::unit::Position;

fn default_template_slide() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("PPT/backups")
}

/// One entry of the `images` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageEntry {
    /// File name under `base_dir`
    Path(String),
    /// Several files under `base_dir`, placed on one slide
    Group(Vec<String>),
    /// Path used as written, ignoring `base_dir`
    Explicit { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub presentation: PathBuf,
    #[serde(default = "default_template_slide")]
    pub template_slide: usize,
    /// Slides kept when the old output is cleared; `[0, template_slide]` when absent
    #[serde(default)]
    pub preserve_slides: Option<Vec<usize>>,
    #[serde(default = "default_true")]
    pub auto_position: bool,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub base_dir: PathBuf,
    pub images: Vec<ImageEntry>,
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,
    /// Write the result here instead of editing `presentation` in place
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub store_metadata: bool,
    #[serde(default = "default_true")]
    pub add_label: bool,
}

impl BatchConfig {
    /// Read and validate a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml_str(&text)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: BatchConfig = serde_saphyr::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.images.is_empty() {
            return Err(Error::Config("images must list at least one entry".to_string()));
        }
        let mut multi = false;
        for (i, entry) in self.images.iter().enumerate() {
            match entry {
                ImageEntry::Group(files) if files.is_empty() => {
                    return Err(Error::Config(format!("image group {i} is empty")));
                }
                ImageEntry::Group(files) => multi |= files.len() > 1,
                ImageEntry::Path(name) if name.is_empty() => {
                    return Err(Error::Config(format!("image entry {i} is empty")));
                }
                _ => {}
            }
        }
        if !self.preserved().contains(&self.template_slide) {
            return Err(Error::Config(format!(
                "template_slide {} must be listed in preserve_slides",
                self.template_slide
            )));
        }
        match (self.auto_position, &self.position) {
            (false, None) => {
                return Err(Error::Config(
                    "position is required when auto_position is false".to_string(),
                ));
            }
            (false, Some(_)) if multi => {
                return Err(Error::Config(
                    "a single manual position cannot be used with multi-image groups".to_string(),
                ));
            }
            _ => {}
        }
        if let Some(position) = &self.position {
            position.validate().map_err(|e| Error::Config(e.to_string()))?;
        }
        Ok(())
    }

    /// Indices of the slides kept when the old output is cleared.
    pub fn preserved(&self) -> Vec<usize> {
        self.preserve_slides
            .clone()
            .unwrap_or_else(|| vec![0, self.template_slide])
    }

    /// Manual box, or `None` to take boxes from the template.
    pub fn manual_position(&self) -> Option<Position> {
        if self.auto_position { None } else { self.position }
    }

    /// File the batch edits: `output_path` when set, else the presentation itself.
    pub fn target(&self) -> &Path {
        self.output_path.as_deref().unwrap_or(&self.presentation)
    }

    /// Resolved image paths, one group per new slide.
    pub fn image_groups(&self) -> Vec<Vec<PathBuf>> {
        self.images
            .iter()
            .map(|entry| match entry {
                ImageEntry::Path(name) => vec![self.base_dir.join(name)],
                ImageEntry::Group(names) => names.iter().map(|n| self.base_dir.join(n)).collect(),
                ImageEntry::Explicit { path } => vec![path.clone()],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BatchConfig::from_yaml_str("presentation: deck.pptx\nimages:\n  - a.png\n").unwrap();
        assert_eq!(config.template_slide, 1);
        assert_eq!(config.preserved(), vec![0, 1]);
        assert!(config.auto_position);
        assert!(config.store_metadata);
        assert!(config.add_label);
        assert_eq!(config.backup_dir, PathBuf::from("PPT/backups"));
        assert_eq!(config.target(), Path::new("deck.pptx"));
        assert_eq!(config.manual_position(), None);
    }

    #[test]
    fn test_image_entries() {
        let yaml = r#"
presentation: deck.pptx
base_dir: plots
output_path: out.pptx
images:
  - a.png
  - [b.png, c.png]
  - path: /abs/d.png
"#;
        let config = BatchConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(
            config.image_groups(),
            vec![
                vec![PathBuf::from("plots/a.png")],
                vec![PathBuf::from("plots/b.png"), PathBuf::from("plots/c.png")],
                vec![PathBuf::from("/abs/d.png")],
            ]
        );
        assert_eq!(config.target(), Path::new("out.pptx"));
    }

    #[test]
    fn test_manual_position() {
        let yaml = r#"
presentation: deck.pptx
auto_position: false
position: {left: 1.0, top: 1.5, width: 8.0, height: 4.5}
images: [a.png]
"#;
        let config = BatchConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.manual_position(), Some(Position::new(1.0, 1.5, 8.0, 4.5)));
    }

    #[test]
    fn test_rejected_configs() {
        let cases = [
            "presentation: d.pptx\nimages: []\n",
            "presentation: d.pptx\nimages:\n  - []\n",
            "presentation: d.pptx\ntemplate_slide: 2\npreserve_slides: [0, 1]\nimages: [a.png]\n",
            "presentation: d.pptx\nauto_position: false\nimages: [a.png]\n",
            "presentation: d.pptx\nauto_position: false\nposition: {left: 0, top: 0, width: 1, height: 1}\nimages:\n  - [a.png, b.png]\n",
            "presentation: d.pptx\nposition: {left: -1, top: 0, width: 1, height: 1}\nimages: [a.png]\n",
            "images: [a.png]\n",
        ];
        for yaml in cases {
            let err = BatchConfig::from_yaml_str(yaml).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{yaml}");
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BatchConfig::from_file(dir.path().join("none.yaml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
