//! Reads a serialized package into parts and relationships.
//!
//! Only parts reachable from the package relationships are loaded; stray ZIP
//! members are ignored and therefore dropped on the next save.
use std::collections::{HashMap, HashSet};

use quick_xml::Reader;
use quick_xml::events::Event;
use smallvec::SmallVec;

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::PhysPkgReader;

/// Relationship as read from a `.rels` member.
#[derive(Debug, Clone)]
pub struct SerializedRelationship {
    pub base_uri: String,
    pub r_id: String,
    pub reltype: String,
    pub target_ref: String,
    pub is_external: bool,
}

impl SerializedRelationship {
    pub fn target_partname(&self) -> Result<PackURI> {
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

pub type SerializedRels = SmallVec<[SerializedRelationship; 8]>;

/// Part as read from the archive, before it is turned into a [`Part`](super::Part).
#[derive(Debug)]
pub struct SerializedPart {
    pub partname: PackURI,
    pub content_type: String,
    pub blob: Vec<u8>,
    pub srels: SerializedRels,
}

/// `[Content_Types].xml`: per-extension defaults and per-part overrides.
struct ContentTypeMap {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self {
            defaults: HashMap::new(),
            overrides: HashMap::new(),
        };
        let mut reader = Reader::from_reader(xml);
        loop {
            match reader.read_event()? {
                Event::Empty(e) | Event::Start(e) => {
                    let (key_attr, lower) = match e.local_name().as_ref() {
                        b"Default" => (b"Extension".as_slice(), true),
                        b"Override" => (b"PartName".as_slice(), false),
                        _ => continue,
                    };
                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == key_attr {
                            key = Some(attr.unescape_value()?.into_owned());
                        } else if attr.key.as_ref() == b"ContentType" {
                            content_type = Some(attr.unescape_value()?.into_owned());
                        }
                    }
                    if let (Some(key), Some(ct)) = (key, content_type) {
                        if lower {
                            map.defaults.insert(key.to_ascii_lowercase(), ct);
                        } else {
                            map.overrides.insert(key, ct);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(map)
    }

    fn get(&self, partname: &PackURI) -> Result<String> {
        // override names are case-insensitive in practice
        if let Some(ct) = self.overrides.get(partname.as_str()).or_else(|| {
            self.overrides
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(partname.as_str()))
                .map(|(_, ct)| ct)
        }) {
            return Ok(ct.clone());
        }
        self.defaults
            .get(&partname.ext().to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| OpcError::ContentTypeNotFound(partname.to_string()))
    }
}

/// Parse the `.rels` member for a source part whose directory is `base_uri`.
pub fn parse_rels_xml(rels_xml: &[u8], base_uri: &str) -> Result<SerializedRels> {
    let mut srels = SerializedRels::new();
    let mut reader = Reader::from_reader(rels_xml);
    loop {
        match reader.read_event()? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut r_id = None;
                let mut reltype = None;
                let mut target_ref = None;
                let mut is_external = false;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"Id" => r_id = Some(attr.unescape_value()?.into_owned()),
                        b"Type" => reltype = Some(attr.unescape_value()?.into_owned()),
                        b"Target" => target_ref = Some(attr.unescape_value()?.into_owned()),
                        b"TargetMode" => is_external = attr.value.as_ref() == b"External",
                        _ => {}
                    }
                }
                if let (Some(r_id), Some(reltype), Some(target_ref)) = (r_id, reltype, target_ref) {
                    srels.push(SerializedRelationship {
                        base_uri: base_uri.to_string(),
                        r_id,
                        reltype,
                        target_ref,
                        is_external,
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(srels)
}

/// Parts and package relationships of a serialized package.
pub struct PackageReader {
    pkg_srels: SerializedRels,
    sparts: Vec<SerializedPart>,
}

impl PackageReader {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut phys = PhysPkgReader::from_bytes(data)?;

        let content_types_uri = PackURI::new(CONTENT_TYPES_URI).map_err(OpcError::InvalidPackUri)?;
        let content_types = phys
            .blob_for(&content_types_uri)
            .ok_or_else(|| OpcError::PackageNotFound("missing [Content_Types].xml".to_string()))
            .and_then(ContentTypeMap::from_xml)?;

        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let pkg_srels = Self::rels_for(&phys, &package_uri)?;
        let sparts = Self::walk_parts(&mut phys, &pkg_srels, &content_types)?;

        Ok(Self { pkg_srels, sparts })
    }

    fn rels_for(phys: &PhysPkgReader, source: &PackURI) -> Result<SerializedRels> {
        match phys.blob_for(&source.rels_uri()) {
            Some(xml) => parse_rels_xml(xml, source.base_uri()),
            None => Ok(SerializedRels::new()),
        }
    }

    fn walk_parts(
        phys: &mut PhysPkgReader,
        pkg_srels: &[SerializedRelationship],
        content_types: &ContentTypeMap,
    ) -> Result<Vec<SerializedPart>> {
        let mut sparts = Vec::with_capacity(phys.len());
        let mut visited: HashSet<PackURI> = HashSet::new();
        let mut queue: Vec<PackURI> = Vec::new();

        let enqueue = |srels: &[SerializedRelationship],
                           visited: &mut HashSet<PackURI>,
                           queue: &mut Vec<PackURI>| {
            for srel in srels.iter().filter(|s| !s.is_external) {
                if let Ok(partname) = srel.target_partname() {
                    if visited.insert(partname.clone()) {
                        queue.push(partname);
                    }
                }
            }
        };

        enqueue(pkg_srels, &mut visited, &mut queue);
        while let Some(partname) = queue.pop() {
            let srels = Self::rels_for(phys, &partname)?;
            enqueue(&srels, &mut visited, &mut queue);

            let Some(blob) = phys.take(&partname) else {
                log::warn!("relationship target {partname} is missing from the package");
                continue;
            };
            let content_type = content_types.get(&partname)?;
            sparts.push(SerializedPart {
                partname,
                content_type,
                blob,
                srels,
            });
        }
        Ok(sparts)
    }

    pub fn pkg_srels(&self) -> &[SerializedRelationship] {
        &self.pkg_srels
    }

    pub fn into_sparts(self) -> (SerializedRels, Vec<SerializedPart>) {
        (self.pkg_srels, self.sparts)
    }
}
