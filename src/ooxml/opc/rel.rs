//! Relationships between parts.
//!
//! Each part owns a [`Relationships`] collection keyed by relationship id
//! (`rId1`, `rId2`, ...). Ids are only unique within their source part, so a
//! cloned part always gets a freshly numbered collection of its own.
use std::collections::HashMap;

use crate::common::xml::escape_xml;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;

/// One relationship from a source part to an internal part or external URI.
#[derive(Debug, Clone)]
pub struct Relationship {
    r_id: String,
    reltype: String,
    target_ref: String,
    base_uri: String,
    is_external: bool,
}

impl Relationship {
    pub fn new(
        r_id: String,
        reltype: String,
        target_ref: String,
        base_uri: String,
        is_external: bool,
    ) -> Self {
        Self {
            r_id,
            reltype,
            target_ref,
            base_uri,
            is_external,
        }
    }

    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Target as written in the `.rels` part (relative for internal targets).
    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Absolute part name of the target. Fails for external relationships.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external {
            return Err(OpcError::InvalidRelationship(format!(
                "{} points outside the package",
                self.r_id
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// Numeric suffix of an `rIdN` identifier.
fn r_id_number(r_id: &str) -> Option<u32> {
    r_id.strip_prefix("rId")
        .and_then(|digits| atoi_simd::parse::<u32, false, false>(digits.as_bytes()).ok())
}

/// Relationships owned by a single source part.
#[derive(Debug, Clone)]
pub struct Relationships {
    base_uri: String,
    rels: HashMap<String, Relationship>,
}

impl Relationships {
    pub fn new(base_uri: String) -> Self {
        Self {
            base_uri,
            rels: HashMap::new(),
        }
    }

    /// Insert a relationship under a known id, replacing any previous one.
    pub fn add_relationship(
        &mut self,
        reltype: String,
        target_ref: String,
        r_id: String,
        is_external: bool,
    ) {
        let rel = Relationship::new(
            r_id.clone(),
            reltype,
            target_ref,
            self.base_uri.clone(),
            is_external,
        );
        self.rels.insert(r_id, rel);
    }

    /// Add a relationship under a newly issued id and return that id.
    ///
    /// Ids are never recycled within a session: the new id is one above the
    /// highest numbered id currently present.
    pub fn add(&mut self, reltype: &str, target_ref: &str, is_external: bool) -> String {
        let r_id = self.next_r_id();
        self.add_relationship(
            reltype.to_string(),
            target_ref.to_string(),
            r_id.clone(),
            is_external,
        );
        r_id
    }

    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.get(r_id)
    }

    fn next_r_id(&self) -> String {
        let highest = self.rels.keys().filter_map(|id| r_id_number(id)).max();
        format!("rId{}", highest.map_or(1, |n| n + 1))
    }

    /// The single relationship of `reltype`.
    pub fn part_with_reltype(&self, reltype: &str) -> Result<&Relationship> {
        let mut matching = self.rels.values().filter(|rel| rel.reltype() == reltype);
        match (matching.next(), matching.next()) {
            (Some(rel), None) => Ok(rel),
            (None, _) => Err(OpcError::RelationshipNotFound(format!(
                "no relationship of type '{reltype}'"
            ))),
            (Some(_), Some(_)) => Err(OpcError::InvalidRelationship(format!(
                "more than one relationship of type '{reltype}'"
            ))),
        }
    }

    /// Iterate in arbitrary order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.values()
    }

    /// Relationships ordered by numeric id, for deterministic output.
    pub fn sorted(&self) -> Vec<&Relationship> {
        let mut rels: Vec<&Relationship> = self.rels.values().collect();
        rels.sort_by(|a, b| {
            r_id_number(a.r_id())
                .cmp(&r_id_number(b.r_id()))
                .then_with(|| a.r_id().cmp(b.r_id()))
        });
        rels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    pub fn remove(&mut self, r_id: &str) -> Option<Relationship> {
        self.rels.remove(r_id)
    }

    /// Serialize as a `.rels` part.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        xml.push_str(
            "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
        );
        for rel in self.sorted() {
            xml.push_str("<Relationship Id=\"");
            xml.push_str(&escape_xml(rel.r_id()));
            xml.push_str("\" Type=\"");
            xml.push_str(&escape_xml(rel.reltype()));
            xml.push_str("\" Target=\"");
            xml.push_str(&escape_xml(rel.target_ref()));
            xml.push('"');
            if rel.is_external() {
                xml.push_str(" TargetMode=\"External\"");
            }
            xml.push_str("/>");
        }
        xml.push_str("</Relationships>");
        xml
    }
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new("/".to_string())
    }
}
