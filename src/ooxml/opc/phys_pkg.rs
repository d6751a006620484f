//! Physical (ZIP) container of an OPC package.
//!
//! The reader pulls every member into memory up front so that the package
//! reader can walk the relationship graph without touching the archive again.
//! The writer emits members deflated, in the order they are handed in.
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::ooxml::opc::error::Result;
use crate::ooxml::opc::packuri::PackURI;

/// In-memory view of the archive members, keyed by member name.
pub struct PhysPkgReader {
    members: HashMap<String, Vec<u8>>,
}

impl PhysPkgReader {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut members = HashMap::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut blob = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut blob)?;
            members.insert(name, blob);
        }
        Ok(Self { members })
    }

    /// Member bytes for `pack_uri`, if present.
    pub fn blob_for(&self, pack_uri: &PackURI) -> Option<&[u8]> {
        self.members.get(pack_uri.membername()).map(Vec::as_slice)
    }

    /// Move the member bytes out of the reader.
    pub fn take(&mut self, pack_uri: &PackURI) -> Option<Vec<u8>> {
        self.members.remove(pack_uri.membername())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Writes package members into a fresh archive.
pub struct PhysPkgWriter {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl PhysPkgWriter {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    pub fn write(&mut self, pack_uri: &PackURI, blob: &[u8]) -> Result<()> {
        self.writer.start_file(pack_uri.membername(), self.options)?;
        self.writer.write_all(blob)?;
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        Ok(self.writer.finish()?.into_inner())
    }
}

impl Default for PhysPkgWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_members() {
        let mut writer = PhysPkgWriter::new();
        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        let media = PackURI::new("/ppt/media/image1.png").unwrap();
        writer.write(&slide, b"<p:sld/>").unwrap();
        writer.write(&media, &[0x89, b'P', b'N', b'G']).unwrap();
        let bytes = writer.finish().unwrap();

        let mut reader = PhysPkgReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.len(), 2);
        assert_eq!(reader.blob_for(&slide), Some(&b"<p:sld/>"[..]));
        assert_eq!(reader.take(&media).unwrap(), vec![0x89, b'P', b'N', b'G']);
        assert!(reader.blob_for(&media).is_none());
    }

    #[test]
    fn test_rejects_non_zip() {
        assert!(PhysPkgReader::from_bytes(b"definitely not a zip").is_err());
    }
}
