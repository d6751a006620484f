//! In-memory OPC package: a set of parts plus the package-level relationships.
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{PACKAGE_URI, PackURI};
use crate::ooxml::opc::part::{Part, PartFactory};
use crate::ooxml::opc::pkgreader::PackageReader;
use crate::ooxml::opc::pkgwriter::PackageWriter;
use crate::ooxml::opc::rel::Relationships;

pub struct OpcPackage {
    rels: Relationships,
    parts: HashMap<String, Box<dyn Part>>,
}

impl OpcPackage {
    pub fn new() -> Self {
        Self {
            rels: Relationships::new(PACKAGE_URI.to_string()),
            parts: HashMap::new(),
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let reader = PackageReader::from_bytes(data)?;
        let (pkg_srels, sparts) = reader.into_sparts();

        let mut package = Self::new();
        for srel in pkg_srels {
            package
                .rels
                .add_relationship(srel.reltype, srel.target_ref, srel.r_id, srel.is_external);
        }
        for spart in sparts {
            let mut part = PartFactory::load(spart.partname, spart.content_type, spart.blob)?;
            for srel in spart.srels {
                part.rels_mut().add_relationship(
                    srel.reltype,
                    srel.target_ref,
                    srel.r_id,
                    srel.is_external,
                );
            }
            package.add_part(part);
        }
        Ok(package)
    }

    /// Part targeted by the package's `officeDocument` relationship.
    pub fn main_document_part(&self) -> Result<&dyn Part> {
        let rel = self.rels.part_with_reltype(relationship_type::OFFICE_DOCUMENT)?;
        let partname = rel.target_partname()?;
        self.get_part(&partname)
    }

    pub fn get_part(&self, partname: &PackURI) -> Result<&dyn Part> {
        self.parts
            .get(partname.as_str())
            .map(|b| &**b as &dyn Part)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    pub fn get_part_mut(&mut self, partname: &PackURI) -> Result<&mut dyn Part> {
        self.parts
            .get_mut(partname.as_str())
            .map(|b| &mut **b as &mut dyn Part)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    pub fn add_part(&mut self, part: Box<dyn Part>) {
        self.parts.insert(part.partname().to_string(), part);
    }

    pub fn remove_part(&mut self, partname: &PackURI) -> Option<Box<dyn Part>> {
        self.parts.remove(partname.as_str())
    }

    pub fn contains_part(&self, partname: &PackURI) -> bool {
        self.parts.contains_key(partname.as_str())
    }

    pub fn iter_parts(&self) -> impl Iterator<Item = &dyn Part> {
        self.parts.values().map(|b| &**b as &dyn Part)
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    /// First free part name for `template`, where `%d` stands for the index.
    ///
    /// ```
    /// # use slide_inserter::ooxml::opc::OpcPackage;
    /// let pkg = OpcPackage::new();
    /// let name = pkg.next_partname("/ppt/slides/slide%d.xml").unwrap();
    /// assert_eq!(name.as_str(), "/ppt/slides/slide1.xml");
    /// ```
    pub fn next_partname(&self, template: &str) -> Result<PackURI> {
        (1..=self.parts.len() + 1)
            .map(|n| template.replace("%d", &n.to_string()))
            .find(|candidate| !self.parts.contains_key(candidate))
            .ok_or_else(|| OpcError::InvalidPackUri(format!("no free part name for {template}")))
            .and_then(|name| PackURI::new(name).map_err(OpcError::InvalidPackUri))
    }

    /// Drop every part no longer reachable from the package relationships.
    ///
    /// Returns the names of the removed parts.
    pub fn drop_unreachable_parts(&mut self) -> Vec<PackURI> {
        let mut reachable: HashSet<String> = HashSet::new();
        let mut queue: Vec<PackURI> = self.internal_targets(&self.rels);

        while let Some(partname) = queue.pop() {
            if !reachable.insert(partname.to_string()) {
                continue;
            }
            if let Some(part) = self.parts.get(partname.as_str()) {
                queue.extend(self.internal_targets(part.rels()));
            }
        }

        let unreachable: Vec<String> = self
            .parts
            .keys()
            .filter(|name| !reachable.contains(*name))
            .cloned()
            .collect();
        let mut removed = Vec::with_capacity(unreachable.len());
        for name in unreachable {
            if let Some(part) = self.parts.remove(&name) {
                log::debug!("dropping unreferenced part {name}");
                removed.push(part.partname().clone());
            }
        }
        removed
    }

    fn internal_targets(&self, rels: &Relationships) -> Vec<PackURI> {
        rels.iter()
            .filter(|rel| !rel.is_external())
            .filter_map(|rel| rel.target_partname().ok())
            .collect()
    }

    /// Serialize the package to ZIP bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PackageWriter::to_bytes(self)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        PackageWriter::write(path, self)
    }
}

impl Default for OpcPackage {
    fn default() -> Self {
        Self::new()
    }
}
