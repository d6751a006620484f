/// The editable presentation: the OPC package plus the ordered slide list.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type, relationship_type};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::part::{BlobPart, Part};
use crate::ooxml::opc::OpcPackage;
use crate::ooxml::pptx::format::ImageFormat;
use crate::ooxml::pptx::parts::{PresentationPart, SlideEntry, rewrite_slide_list};
use crate::ooxml::pptx::slide::Slide;

/// Lowest `p:sldId/@id` PowerPoint accepts.
const MIN_SLIDE_ID: u32 = 256;

/// Part name stem for new media parts; `%d` is the index.
const MEDIA_PARTNAME: &str = "/ppt/media/image%d";

/// An open `.pptx` presentation.
///
/// The slide list is decoded once from `p:sldIdLst`; slide order, deletions
/// and appended slides live in memory until [`Presentation::flush`], which
/// runs on every save.
///
/// # Examples
///
/// ```rust,no_run
/// use slide_inserter::ooxml::pptx::Presentation;
///
/// let mut pres = Presentation::open("deck.pptx")?;
/// for (i, slide) in pres.slides().iter().enumerate() {
///     println!("{i}: {}", slide.title().unwrap_or("Untitled"));
/// }
/// pres.save()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Presentation {
    package: OpcPackage,
    partname: PackURI,
    slides: Vec<Slide>,
    next_slide_id: u32,
    source: Option<PathBuf>,
    /// SHA-256 of media part bytes, built on first use and reset on flush
    media_index: Option<HashMap<Vec<u8>, PackURI>>,
}

impl Presentation {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let package = OpcPackage::open(path)?;
        let mut pres = Self::from_package(package)?;
        pres.source = Some(path.to_path_buf());
        Ok(pres)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_package(OpcPackage::from_bytes(data)?)
    }

    fn from_package(package: OpcPackage) -> Result<Self> {
        let main = package.main_document_part()?;
        if !content_type::PRESENTATION_MAIN_TYPES.contains(&main.content_type()) {
            return Err(OoxmlError::InvalidContentType {
                expected: content_type::PML_PRESENTATION_MAIN.to_string(),
                got: main.content_type().to_string(),
            });
        }
        let partname = main.partname().clone();

        let entries = PresentationPart::from_part(main).slide_entries()?;
        let mut slides = Vec::with_capacity(entries.len());
        for entry in entries {
            let rel = main.rels().get(&entry.r_id).ok_or_else(|| {
                OoxmlError::InvalidRelationship(format!(
                    "slide id {} points at missing relationship {}",
                    entry.id, entry.r_id
                ))
            })?;
            let slide_partname = rel.target_partname()?;
            let blob = package.get_part(&slide_partname)?.blob();
            slides.push(Slide::parse(slide_partname, entry.id, entry.r_id, blob)?);
        }

        let next_slide_id = slides
            .iter()
            .map(|s| s.slide_id() + 1)
            .max()
            .unwrap_or(MIN_SLIDE_ID)
            .max(MIN_SLIDE_ID);
        log::debug!("loaded presentation {} with {} slides", partname, slides.len());

        Ok(Self {
            package,
            partname,
            slides,
            next_slide_id,
            source: None,
            media_index: None,
        })
    }

    #[inline]
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    #[inline]
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    #[inline]
    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    #[inline]
    pub fn slide_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index)
    }

    /// Current index of the slide with stable id `slide_id`.
    pub fn index_of_slide_id(&self, slide_id: u32) -> Option<usize> {
        self.slides.iter().position(|s| s.slide_id() == slide_id)
    }

    /// File the presentation was opened from or last saved to.
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    #[inline]
    pub fn package(&self) -> &OpcPackage {
        &self.package
    }

    #[inline]
    pub(crate) fn package_mut(&mut self) -> &mut OpcPackage {
        &mut self.package
    }

    /// `(cx, cy)` of the slides in EMU.
    pub fn slide_size(&self) -> Result<Option<(i64, i64)>> {
        let part = self.package.get_part(&self.partname)?;
        PresentationPart::from_part(part).slide_size()
    }

    /// Take the slide at `index` out of the slide list.
    ///
    /// The slide part stays in the package until the next flush drops it
    /// together with whatever only it referenced.
    pub fn remove_slide(&mut self, index: usize) -> Result<Slide> {
        if index >= self.slides.len() {
            return Err(OoxmlError::PartNotFound(format!(
                "slide index {index} (presentation has {} slides)",
                self.slides.len()
            )));
        }
        let slide = self.slides.remove(index);
        let pres = self.package.get_part_mut(&self.partname)?;
        pres.rels_mut().remove(slide.r_id());
        log::debug!("removed slide {} ({})", index, slide.partname());
        Ok(slide)
    }

    /// Register a new slide part and append it to the slide list.
    ///
    /// The part's relationships must already be in place. Returns the index of
    /// the new slide.
    pub fn append_slide(&mut self, part: Box<dyn Part>) -> Result<usize> {
        let partname = part.partname().clone();
        let mut slide = Slide::parse(partname.clone(), self.next_slide_id, String::new(), part.blob())?;

        let pres = self.package.get_part_mut(&self.partname)?;
        let target = partname.relative_ref(pres.partname().base_uri());
        slide.set_r_id(pres.rels_mut().add(relationship_type::SLIDE, &target, false));

        self.package.add_part(part);
        self.next_slide_id += 1;
        self.slides.push(slide);
        Ok(self.slides.len() - 1)
    }

    /// Embed image bytes and relate them from the slide at `slide_index`.
    ///
    /// Bytes identical to an existing media part reuse that part. Returns the
    /// new relationship id.
    pub fn embed_image(&mut self, slide_index: usize, bytes: Vec<u8>, format: ImageFormat) -> Result<String> {
        let slide_partname = self
            .slides
            .get(slide_index)
            .map(|s| s.partname().clone())
            .ok_or_else(|| OoxmlError::PartNotFound(format!("slide index {slide_index}")))?;

        let digest = Sha256::digest(&bytes).to_vec();
        let media = match self.media_index().get(&digest).cloned() {
            Some(existing) => {
                log::debug!("reusing media part {existing}");
                existing
            }
            None => {
                let template = format!("{MEDIA_PARTNAME}.{}", format.extension());
                let partname = self.package.next_partname(&template)?;
                self.package.add_part(Box::new(BlobPart::new(
                    partname.clone(),
                    format.mime_type().to_string(),
                    bytes,
                )));
                if let Some(index) = self.media_index.as_mut() {
                    index.insert(digest, partname.clone());
                }
                partname
            }
        };

        let part = self.package.get_part_mut(&slide_partname)?;
        let target = media.relative_ref(slide_partname.base_uri());
        Ok(part.rels_mut().add(relationship_type::IMAGE, &target, false))
    }

    fn media_index(&mut self) -> &HashMap<Vec<u8>, PackURI> {
        let package = &self.package;
        self.media_index.get_or_insert_with(|| {
            package
                .iter_parts()
                .filter(|p| p.partname().as_str().starts_with("/ppt/media/"))
                .map(|p| (Sha256::digest(p.blob()).to_vec(), p.partname().clone()))
                .collect()
        })
    }

    /// Media part targeted by image relationship `r_id` of a slide.
    pub fn image_partname(&self, slide_index: usize, r_id: &str) -> Option<PackURI> {
        let slide = self.slides.get(slide_index)?;
        let part = self.package.get_part(slide.partname()).ok()?;
        part.rels()
            .get(r_id)
            .filter(|rel| !rel.is_external())
            .and_then(|rel| rel.target_partname().ok())
    }

    /// Write the in-memory model back into the package parts.
    ///
    /// Edited slides are re-serialized and lose image relationships nothing
    /// references any more, the slide list is regenerated, and parts that are
    /// no longer reachable are dropped.
    pub fn flush(&mut self) -> Result<()> {
        for slide in self.slides.iter_mut().filter(|s| s.is_dirty()) {
            let part = self.package.get_part_mut(slide.partname())?;
            part.set_blob(slide.to_xml());
            let stale: Vec<String> = part
                .rels()
                .iter()
                .filter(|rel| rel.reltype() == relationship_type::IMAGE)
                .filter(|rel| !part.references_r_id(rel.r_id()))
                .map(|rel| rel.r_id().to_string())
                .collect();
            for r_id in stale {
                part.rels_mut().remove(&r_id);
            }
            slide.mark_clean();
        }

        let entries: Vec<SlideEntry> = self
            .slides
            .iter()
            .map(|s| SlideEntry {
                id: s.slide_id(),
                r_id: s.r_id().to_string(),
            })
            .collect();
        let pres = self.package.get_part_mut(&self.partname)?;
        let xml = rewrite_slide_list(pres.blob(), &entries)?;
        pres.set_blob(xml);

        let dropped = self.package.drop_unreachable_parts();
        if !dropped.is_empty() {
            log::debug!("dropped {} unreachable parts", dropped.len());
        }
        self.media_index = None;
        Ok(())
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.flush()?;
        Ok(self.package.to_bytes()?)
    }

    /// Save over the file the presentation was opened from.
    pub fn save(&mut self) -> Result<()> {
        let path = self.source.clone().ok_or_else(|| {
            OoxmlError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "presentation has no source file; use save_as",
            ))
        })?;
        self.save_as(path)
    }

    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.flush()?;
        self.package.save(path)?;
        log::info!("saved {} ({} slides)", path.display(), self.slides.len());
        self.source = Some(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::fixtures;

    #[test]
    fn test_open_reads_slide_list() {
        let pres = Presentation::from_bytes(&fixtures::standard_deck()).unwrap();
        assert_eq!(pres.slide_count(), 4);
        let ids: Vec<u32> = pres.slides().iter().map(Slide::slide_id).collect();
        assert_eq!(ids, vec![256, 257, 258, 259]);
        assert_eq!(pres.slide(1).unwrap().picture_count(), 1);
        assert_eq!(pres.slide(2).unwrap().picture_count(), 2);
        assert_eq!(pres.slide_size().unwrap(), Some((12_192_000, 6_858_000)));
    }

    #[test]
    fn test_remove_slide_drops_its_parts_on_save() {
        let mut pres = Presentation::from_bytes(&fixtures::standard_deck()).unwrap();
        let removed = pres.remove_slide(2).unwrap();
        assert_eq!(removed.slide_id(), 258);
        assert!(pres.remove_slide(3).is_err());

        let bytes = pres.to_bytes().unwrap();
        let reopened = Presentation::from_bytes(&bytes).unwrap();
        assert_eq!(reopened.slide_count(), 3);
        assert!(!reopened.package().contains_part(removed.partname()));
        let ids: Vec<u32> = reopened.slides().iter().map(Slide::slide_id).collect();
        assert_eq!(ids, vec![256, 257, 259]);
    }

    #[test]
    fn test_embed_image_deduplicates_media() {
        let mut pres = Presentation::from_bytes(&fixtures::standard_deck()).unwrap();
        let png = fixtures::png_bytes(4, 2);
        let media_before = media_count(&pres);

        let first = pres.embed_image(0, png.clone(), ImageFormat::Png).unwrap();
        let second = pres.embed_image(0, png, ImageFormat::Png).unwrap();
        assert_ne!(first, second);
        assert_eq!(media_count(&pres), media_before + 1);
        assert_eq!(pres.image_partname(0, &first), pres.image_partname(0, &second));
        assert!(pres.embed_image(9, vec![], ImageFormat::Png).is_err());
    }

    #[test]
    fn test_flush_prunes_unreferenced_image_rels() {
        let mut pres = Presentation::from_bytes(&fixtures::standard_deck()).unwrap();
        let r_id = pres.slide(1).unwrap().pictures().next().unwrap().image_r_id().unwrap().to_string();
        let media = pres.image_partname(1, &r_id).unwrap();

        pres.slide_mut(1).unwrap().remove_elements(|el| el.is_picture());
        pres.flush().unwrap();

        let slide_part = pres.package().get_part(pres.slide(1).unwrap().partname()).unwrap();
        assert!(slide_part.rels().get(&r_id).is_none());
        assert!(!pres.package().contains_part(&media));
    }

    fn media_count(pres: &Presentation) -> usize {
        pres.package()
            .iter_parts()
            .filter(|p| p.partname().as_str().starts_with("/ppt/media/"))
            .count()
    }
}
