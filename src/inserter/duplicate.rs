//! Slide duplication.
//!
//! The copy is a new slide part holding the source slide's current XML, with
//! its own relationship set. Layout, image and other references are re-issued
//! under ids of the new part, so no relationship entry is shared with the
//! source.
//!
//! Parts that belong to a single slide (notes, charts, comments, tags) are
//! copied along with it. The copies keep the relationships of their
//! originals, so whatever those point at (a chart's embedded workbook, its
//! style parts) stays shared. Layouts, images and other media are shared
//! as they are.
use std::collections::HashMap;

use crate::common::error::{Error, Result};
use crate::common::xml::remap_relationship_ids;
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::part::{Part, XmlPart};
use crate::ooxml::opc::rel::{Relationship, Relationships};
use crate::ooxml::pptx::Presentation;

const SLIDE_PARTNAME: &str = "/ppt/slides/slide%d.xml";
const NOTES_PARTNAME: &str = "/ppt/notesSlides/notesSlide%d.xml";

/// Relationship types whose targets are owned by one slide.
const SLIDE_OWNED: [&str; 3] = [relationship_type::CHART, relationship_type::COMMENTS, relationship_type::TAGS];

/// Append a copy of the slide at `source_index` to the end of the slide list.
///
/// Returns the index of the copy.
pub fn duplicate_slide(pres: &mut Presentation, source_index: usize) -> Result<usize> {
    let count = pres.slide_count();
    let source = pres.slide(source_index).ok_or_else(|| Error::Duplication {
        index: source_index,
        reason: format!("presentation has {count} slides"),
    })?;
    let xml = source.to_xml();
    let source_partname = source.partname().clone();

    let package = pres.package();
    let source_part = package.get_part(&source_partname)?;
    let content_type = source_part.content_type().to_string();
    let partname = package.next_partname(SLIDE_PARTNAME)?;
    let source_rels: Vec<Relationship> = source_part.rels().sorted().into_iter().cloned().collect();

    let mut rels = Relationships::new(partname.base_uri().to_string());
    let mut id_map = HashMap::new();
    let mut notes_source = None;
    let mut copies: HashMap<PackURI, PackURI> = HashMap::new();
    for rel in &source_rels {
        if rel.reltype() == relationship_type::NOTES_SLIDE && !rel.is_external() {
            notes_source = Some(rel.target_partname()?);
            continue;
        }
        let target = if SLIDE_OWNED.iter().any(|t| *t == rel.reltype()) && !rel.is_external() {
            let original = rel.target_partname()?;
            let copy = match copies.get(&original) {
                Some(copy) => copy.clone(),
                None => {
                    let copy = clone_owned_part(pres, &original)?;
                    copies.insert(original, copy.clone());
                    copy
                }
            };
            copy.relative_ref(partname.base_uri())
        } else {
            retarget(rel, &partname)?
        };
        let new_id = rels.add(rel.reltype(), &target, rel.is_external());
        if new_id != rel.r_id() {
            id_map.insert(rel.r_id().to_string(), new_id);
        }
    }

    let notes = match notes_source {
        Some(notes_partname) => Some(clone_notes(pres, &notes_partname, &partname)?),
        None => None,
    };
    if let Some(notes) = notes {
        let target = notes.partname().relative_ref(partname.base_uri());
        rels.add(relationship_type::NOTES_SLIDE, &target, false);
        pres.package_mut().add_part(Box::new(notes));
    }

    let xml = remap_relationship_ids(&xml, &id_map).map_err(|e| Error::Duplication {
        index: source_index,
        reason: e.to_string(),
    })?;
    let mut part = XmlPart::new(partname.clone(), content_type, xml);
    *part.rels_mut() = rels;

    let index = pres.append_slide(Box::new(part))?;
    log::debug!("duplicated slide {source_index} as {index} ({partname})");
    Ok(index)
}

/// Copy of the notes slide at `notes_partname`, pointing back at `slide_partname`.
fn clone_notes(pres: &Presentation, notes_partname: &PackURI, slide_partname: &PackURI) -> Result<XmlPart> {
    let package = pres.package();
    let source = package.get_part(notes_partname)?;
    let partname = package.next_partname(NOTES_PARTNAME)?;

    let mut rels = Relationships::new(partname.base_uri().to_string());
    for rel in source.rels().iter() {
        let target = if rel.reltype() == relationship_type::SLIDE && !rel.is_external() {
            slide_partname.relative_ref(partname.base_uri())
        } else {
            retarget(rel, &partname)?
        };
        // ids are kept, so the notes XML needs no rewrite
        rels.add_relationship(
            rel.reltype().to_string(),
            target,
            rel.r_id().to_string(),
            rel.is_external(),
        );
    }

    let mut part = XmlPart::new(partname, source.content_type().to_string(), source.blob().to_vec());
    *part.rels_mut() = rels;
    Ok(part)
}

/// Add a copy of `original` under the next free name of its series
/// (`chart3.xml` -> `chartN.xml`) and return the new name.
fn clone_owned_part(pres: &mut Presentation, original: &PackURI) -> Result<PackURI> {
    let package = pres.package();
    let source = package.get_part(original)?;
    let partname = package.next_partname(&series_template(original))?;

    let mut rels = Relationships::new(partname.base_uri().to_string());
    for rel in source.rels().iter() {
        rels.add_relationship(
            rel.reltype().to_string(),
            retarget(rel, &partname)?,
            rel.r_id().to_string(),
            rel.is_external(),
        );
    }
    let mut part = XmlPart::new(partname.clone(), source.content_type().to_string(), source.blob().to_vec());
    *part.rels_mut() = rels;

    log::debug!("copied {original} as {partname}");
    pres.package_mut().add_part(Box::new(part));
    Ok(partname)
}

/// `/ppt/charts/chart3.xml` -> `/ppt/charts/chart%d.xml`.
fn series_template(partname: &PackURI) -> String {
    let filename = partname.filename();
    let (stem, ext) = filename.rsplit_once('.').unwrap_or((filename, ""));
    let stem = stem.trim_end_matches(|c: char| c.is_ascii_digit());
    let base = partname.base_uri().trim_end_matches('/');
    if ext.is_empty() {
        format!("{base}/{stem}%d")
    } else {
        format!("{base}/{stem}%d.{ext}")
    }
}

/// Target reference of `rel` as seen from `new_partname`.
fn retarget(rel: &Relationship, new_partname: &PackURI) -> Result<String> {
    if rel.is_external() {
        return Ok(rel.target_ref().to_string());
    }
    Ok(rel.target_partname()?.relative_ref(new_partname.base_uri()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::fixtures;
    use crate::inserter::{get_position, remove_pictures};

    #[test]
    fn test_duplicate_appends_copy() {
        let mut pres = Presentation::from_bytes(&fixtures::standard_deck()).unwrap();
        let index = duplicate_slide(&mut pres, 1).unwrap();
        assert_eq!(index, 4);
        assert_eq!(pres.slide_count(), 5);

        let copy = pres.slide(4).unwrap();
        assert_eq!(copy.title(), Some("Template"));
        assert_eq!(copy.partname().as_str(), "/ppt/slides/slide5.xml");
        assert_eq!(
            get_position(copy, 0).unwrap(),
            get_position(pres.slide(1).unwrap(), 0).unwrap()
        );
        assert_ne!(copy.slide_id(), pres.slide(1).unwrap().slide_id());
    }

    #[test]
    fn test_copy_is_independent_of_source() {
        let mut pres = Presentation::from_bytes(&fixtures::standard_deck()).unwrap();
        let index = duplicate_slide(&mut pres, 1).unwrap();
        let before = get_position(pres.slide(1).unwrap(), 0).unwrap();

        assert_eq!(remove_pictures(pres.slide_mut(index).unwrap()), 1);

        let source = pres.slide(1).unwrap();
        assert_eq!(source.picture_count(), 1);
        assert_eq!(get_position(source, 0).unwrap(), before);

        let bytes = pres.to_bytes().unwrap();
        let reopened = Presentation::from_bytes(&bytes).unwrap();
        assert_eq!(reopened.slide(1).unwrap().picture_count(), 1);
        assert_eq!(reopened.slide(4).unwrap().picture_count(), 0);
    }

    #[test]
    fn test_copy_relates_same_media_and_own_notes() {
        let mut pres = Presentation::from_bytes(&fixtures::standard_deck()).unwrap();
        let index = duplicate_slide(&mut pres, 1).unwrap();

        let src_rid = pres.slide(1).unwrap().pictures().next().unwrap().image_r_id().unwrap().to_string();
        let copy_rid = pres.slide(index).unwrap().pictures().next().unwrap().image_r_id().unwrap().to_string();
        assert_eq!(pres.image_partname(1, &src_rid), pres.image_partname(index, &copy_rid));

        let package = pres.package();
        let copy_part = package.get_part(pres.slide(index).unwrap().partname()).unwrap();
        let notes_rel = copy_part.rels().part_with_reltype(relationship_type::NOTES_SLIDE).unwrap();
        let notes_name = notes_rel.target_partname().unwrap();
        assert_eq!(notes_name.as_str(), "/ppt/notesSlides/notesSlide1.xml");

        let notes = package.get_part(&notes_name).unwrap();
        let back = notes.rels().part_with_reltype(relationship_type::SLIDE).unwrap();
        assert_eq!(back.target_partname().unwrap().as_str(), "/ppt/slides/slide5.xml");
    }

    #[test]
    fn test_duplicate_out_of_range() {
        let mut pres = Presentation::from_bytes(&fixtures::standard_deck()).unwrap();
        let err = duplicate_slide(&mut pres, 4).unwrap_err();
        assert!(matches!(err, Error::Duplication { index: 4, .. }));
        assert_eq!(pres.slide_count(), 4);
    }

    #[test]
    fn test_sectioned_deck_survives_delete_and_copy() {
        let mut pres = Presentation::from_bytes(&fixtures::sectioned_deck()).unwrap();
        assert_eq!(pres.slide_count(), 4);
        pres.remove_slide(2).unwrap();
        let index = duplicate_slide(&mut pres, 1).unwrap();
        let new_id = pres.slide(index).unwrap().slide_id();

        let bytes = pres.to_bytes().unwrap();
        let reopened = Presentation::from_bytes(&bytes).unwrap();
        let ids: Vec<u32> = reopened.slides().iter().map(|s| s.slide_id()).collect();
        assert_eq!(ids, vec![256, 257, 259, new_id]);

        let main = reopened.package().main_document_part().unwrap();
        let xml = String::from_utf8_lossy(main.blob()).into_owned();
        assert!(!xml.as_str().contains(r#"<p14:sldId id="258"/>"#));
        assert!(xml.as_str().contains(&format!(
            r#"<p14:sldId id="259"/><p14:sldId id="{new_id}"/></p14:sldIdLst></p14:section></p14:sectionLst>"#
        )));
    }

    #[test]
    fn test_slide_owned_parts_are_copied() {
        let mut pres = Presentation::from_bytes(&fixtures::standard_deck()).unwrap();
        let chart = PackURI::new("/ppt/charts/chart1.xml").unwrap();
        let chart_type = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";
        let chart_xml = br#"<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart"/>"#;
        pres.package_mut()
            .add_part(Box::new(XmlPart::new(chart.clone(), chart_type.to_string(), chart_xml.to_vec())));
        let slide_partname = pres.slide(1).unwrap().partname().clone();
        pres.package_mut()
            .get_part_mut(&slide_partname)
            .unwrap()
            .rels_mut()
            .add(relationship_type::CHART, "../charts/chart1.xml", false);

        let index = duplicate_slide(&mut pres, 1).unwrap();
        let package = pres.package();
        let copy_part = package.get_part(pres.slide(index).unwrap().partname()).unwrap();
        let copied = copy_part
            .rels()
            .part_with_reltype(relationship_type::CHART)
            .unwrap()
            .target_partname()
            .unwrap();
        assert_eq!(copied.as_str(), "/ppt/charts/chart2.xml");
        assert_eq!(package.get_part(&copied).unwrap().blob(), chart_xml.as_slice());

        let source_part = package.get_part(&slide_partname).unwrap();
        let original = source_part.rels().part_with_reltype(relationship_type::CHART).unwrap();
        assert_eq!(original.target_partname().unwrap(), chart);
    }

    #[test]
    fn test_series_template() {
        let name = PackURI::new("/ppt/charts/chart12.xml").unwrap();
        assert_eq!(series_template(&name), "/ppt/charts/chart%d.xml");
        let name = PackURI::new("/ppt/tags/tag3.xml").unwrap();
        assert_eq!(series_template(&name), "/ppt/tags/tag%d.xml");
    }
}
