//! The presentation part (`/ppt/presentation.xml`).
//!
//! Only two things are read from it: the ordered slide list (`p:sldIdLst`) and
//! the slide size. On save the slide list is regenerated from the in-memory
//! slide order; every other byte of the part is preserved.
use std::collections::HashSet;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::common::xml::attr_int;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::part::Part;

/// One `p:sldId` entry: the stable slide id and the relationship to the slide part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideEntry {
    pub id: u32,
    pub r_id: String,
}

/// Read-only view of the presentation part.
pub struct PresentationPart<'a> {
    part: &'a dyn Part,
}

impl<'a> PresentationPart<'a> {
    pub fn from_part(part: &'a dyn Part) -> Self {
        Self { part }
    }

    /// Slide entries in presentation order.
    ///
    /// Only the direct children of the top-level `p:sldIdLst` count; the
    /// `p14:sldId` references inside section lists carry no relationship.
    pub fn slide_entries(&self) -> Result<Vec<SlideEntry>> {
        let mut reader = Reader::from_reader(self.part.blob());
        let mut entries = Vec::new();
        let mut depth = 0usize;
        let mut in_list = false;
        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    depth += 1;
                    match e.local_name().as_ref() {
                        b"sldIdLst" if depth == 2 => in_list = true,
                        b"sldId" if in_list && depth == 3 => entries.push(slide_entry(&e)?),
                        _ => {}
                    }
                }
                Event::Empty(e) if in_list && depth == 2 && e.local_name().as_ref() == b"sldId" => {
                    entries.push(slide_entry(&e)?);
                }
                Event::End(e) => {
                    if depth == 2 && e.local_name().as_ref() == b"sldIdLst" {
                        in_list = false;
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(entries)
    }

    /// `(cx, cy)` of `p:sldSz` in EMU.
    pub fn slide_size(&self) -> Result<Option<(i64, i64)>> {
        let mut reader = Reader::from_reader(self.part.blob());
        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldSz" => {
                    return Ok(attr_int(&e, b"cx").zip(attr_int(&e, b"cy")));
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }
}

fn slide_entry(e: &BytesStart<'_>) -> Result<SlideEntry> {
    let id = attr_int(e, b"id")
        .and_then(|id| u32::try_from(id).ok())
        .ok_or_else(|| OoxmlError::Xml("p:sldId without a valid id".to_string()))?;
    let r_id = e
        .attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == b"id" && a.key.prefix().is_some())
        .and_then(|a| std::str::from_utf8(&a.value).ok().map(str::to_string))
        .ok_or_else(|| OoxmlError::InvalidRelationship(format!("slide id {id} has no r:id")))?;
    Ok(SlideEntry { id, r_id })
}

/// Whether a section's `p14:sldId` refers to a slide that is gone. Entries
/// that are kept are recorded in `seen`.
fn stale_section_entry(e: &BytesStart<'_>, keep: &HashSet<u32>, seen: &mut HashSet<u32>) -> bool {
    match attr_int(e, b"id").and_then(|id| u32::try_from(id).ok()) {
        Some(id) if keep.contains(&id) => {
            seen.insert(id);
            false
        }
        Some(_) => true,
        None => false,
    }
}

/// Replace the slide list of a presentation part with `entries`.
///
/// Section lists (`p14:sectionLst`) are kept in step: references to slides
/// that are no longer listed are removed, and slides that belong to no
/// section are appended to the last one.
///
/// When the part has no list yet, one is inserted in front of `p:sldSz`
/// (schema order), falling back to the end of the root element.
pub fn rewrite_slide_list(xml: &[u8], entries: &[SlideEntry]) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(xml);
    let mut depth = 0usize;
    let mut pml_prefix = String::from("p");
    let mut rel_prefix = String::from("r");
    let mut list_span: Option<(usize, usize)> = None;
    let mut list_start: Option<usize> = None;
    let mut insert_at: Option<usize> = None;
    let mut root_end: Option<usize> = None;

    let keep: HashSet<u32> = entries.iter().map(|entry| entry.id).collect();
    let mut in_sections: HashSet<u32> = HashSet::new();
    let mut removals: Vec<(usize, usize)> = Vec::new();
    let mut open_section_entry: Option<(usize, bool)> = None;
    let mut last_section_list: Option<(usize, String)> = None;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader.read_event()?;
        let end = reader.buffer_position() as usize;
        match event {
            Event::Start(e) => {
                depth += 1;
                if depth == 1 {
                    if let Some(prefix) = e.name().prefix() {
                        pml_prefix = String::from_utf8_lossy(prefix.as_ref()).into_owned();
                    }
                    for attr in e.attributes().flatten() {
                        let key = attr.key.as_ref();
                        if let Some(prefix) = key.strip_prefix(b"xmlns:") {
                            if attr.value.as_ref() == namespace::OFC_RELATIONSHIPS.as_bytes() {
                                rel_prefix = String::from_utf8_lossy(prefix).into_owned();
                            }
                        }
                    }
                } else if depth == 2 {
                    match e.local_name().as_ref() {
                        b"sldIdLst" => list_start = Some(start),
                        b"sldSz" | b"notesSz" if insert_at.is_none() => insert_at = Some(start),
                        _ => {}
                    }
                } else if list_start.is_none() && e.local_name().as_ref() == b"sldId" {
                    let stale = stale_section_entry(&e, &keep, &mut in_sections);
                    open_section_entry = Some((start, stale));
                }
            }
            Event::Empty(e) if depth == 1 => match e.local_name().as_ref() {
                b"sldIdLst" => list_span = Some((start, end)),
                b"sldSz" | b"notesSz" if insert_at.is_none() => insert_at = Some(start),
                _ => {}
            },
            Event::Empty(e) if list_start.is_none() && e.local_name().as_ref() == b"sldId" => {
                if stale_section_entry(&e, &keep, &mut in_sections) {
                    removals.push((start, end));
                }
            }
            Event::End(e) => {
                if depth == 2 && e.local_name().as_ref() == b"sldIdLst" {
                    if let Some(s) = list_start.take() {
                        list_span = Some((s, end));
                    }
                } else if depth == 1 {
                    root_end = Some(start);
                } else if depth > 2 {
                    match e.local_name().as_ref() {
                        b"sldId" => {
                            if let Some((s, true)) = open_section_entry.take() {
                                removals.push((s, end));
                            }
                        }
                        b"sldIdLst" => {
                            let prefix = e
                                .name()
                                .prefix()
                                .map(|p| format!("{}:", String::from_utf8_lossy(p.as_ref())))
                                .unwrap_or_default();
                            last_section_list = Some((start, prefix));
                        }
                        _ => {}
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut list = String::new();
    if !entries.is_empty() {
        list.push_str(&format!("<{pml_prefix}:sldIdLst>"));
        for entry in entries {
            list.push_str(&format!(
                "<{pml_prefix}:sldId id=\"{}\" {rel_prefix}:id=\"{}\"/>",
                entry.id, entry.r_id
            ));
        }
        list.push_str(&format!("</{pml_prefix}:sldIdLst>"));
    }

    let (cut_start, cut_end) = match (list_span, insert_at, root_end) {
        (Some(span), _, _) => span,
        (None, Some(pos), _) | (None, None, Some(pos)) => (pos, pos),
        (None, None, None) => {
            return Err(OoxmlError::Xml("presentation part has no root element".to_string()));
        }
    };

    let mut edits: Vec<(usize, usize, String)> = vec![(cut_start, cut_end, list)];
    edits.extend(removals.into_iter().map(|(s, e)| (s, e, String::new())));
    if let Some((pos, prefix)) = last_section_list {
        let unsectioned: String = entries
            .iter()
            .filter(|entry| !in_sections.contains(&entry.id))
            .map(|entry| format!("<{prefix}sldId id=\"{}\"/>", entry.id))
            .collect();
        if !unsectioned.is_empty() {
            edits.push((pos, pos, unsectioned));
        }
    }
    edits.sort_by_key(|(s, _, _)| *s);

    let mut out = Vec::with_capacity(xml.len() + edits[0].2.len());
    let mut cursor = 0;
    for (s, e, text) in edits {
        out.extend_from_slice(&xml[cursor..s]);
        out.extend_from_slice(text.as_bytes());
        cursor = e;
    }
    out.extend_from_slice(&xml[cursor..]);
    Ok(out)
}
