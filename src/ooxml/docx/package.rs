//! Package implementation for Word documents.
//!
//! A [`Package`] holds the archive as an ordered list of named entries.
//! Order is preserved from the source file, and entries the converter does
//! not touch are written back byte-identical, so media, styles, and every
//! other unrelated part pass through conversion unchanged.

use crate::common::{Error, Result};
use crate::ooxml::DOCUMENT_PART;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// A Word (.docx) package as ordered `(name, bytes)` entries.
pub struct Package {
    entries: Vec<(String, Vec<u8>)>,
}

impl Package {
    /// Open a .docx package from a file path.
    ///
    /// Fails if the file is not a readable ZIP archive or lacks the main
    /// document part; those are input errors, not degraded conversions.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::InputNotFound(path.display().to_string()));
        }
        let file = std::fs::File::open(path)?;
        Self::from_archive(ZipArchive::new(file)?)
    }

    /// Open a package from in-memory bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_archive(ZipArchive::new(Cursor::new(bytes))?)
    }

    fn from_archive<R: Read + Seek>(mut archive: ZipArchive<R>) -> Result<Self> {
        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            entries.push((name, data));
        }
        let package = Self { entries };
        if package.part(DOCUMENT_PART).is_none() {
            return Err(Error::InvalidPackage(format!(
                "package has no {DOCUMENT_PART}"
            )));
        }
        Ok(package)
    }

    /// Get a part's bytes by name.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    /// Replace a part's bytes. Returns false if the part does not exist.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = data;
            true
        } else {
            false
        }
    }

    /// Iterate over part names in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Serialize the package to bytes, Deflate-compressed, in entry order.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in &self.entries {
            writer.start_file(name.as_str(), options)?;
            writer.write_all(data)?;
        }
        Ok(writer.finish()?.into_inner())
    }

    /// Write the package to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_docx() -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file("word/document.xml", options).unwrap();
        writer
            .write_all(b"<w:document><w:body/></w:document>")
            .unwrap();
        writer.start_file("word/media/a.bin", options).unwrap();
        writer.write_all(b"\x01\x02\x03").unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn open_set_save_round_trip() {
        let mut pkg = Package::from_bytes(minimal_docx()).unwrap();
        assert!(pkg.part("word/document.xml").is_some());
        assert!(pkg.set_part("word/document.xml", b"<w:document/>".to_vec()));

        let reread = Package::from_bytes(pkg.to_bytes().unwrap()).unwrap();
        assert_eq!(reread.part("word/document.xml").unwrap(), b"<w:document/>");
        assert_eq!(reread.part("word/media/a.bin").unwrap(), b"\x01\x02\x03");
    }

    #[test]
    fn missing_document_part_is_invalid() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("something.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<x/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        assert!(matches!(
            Package::from_bytes(bytes),
            Err(Error::InvalidPackage(_))
        ));
    }

    #[test]
    fn set_part_on_unknown_name_is_refused() {
        let mut pkg = Package::from_bytes(minimal_docx()).unwrap();
        assert!(!pkg.set_part("word/nonexistent.xml", Vec::new()));
    }
}
