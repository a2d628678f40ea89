//! Package extraction and repacking.
//!
//! A package is expanded in full into a scratch directory, mutated in
//! place, and re-archived. The scratch directory is owned by a
//! [`ScratchDir`] and removed on every exit path (success, error, or
//! panic), so no job leaves stray temporary trees behind.

use crate::common::{Error, Result};
use std::fs::File;
use std::io;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// A scratch directory holding an extracted package.
///
/// The directory and everything under it are deleted when this value is
/// dropped.
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Root of the extracted tree.
    #[inline]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Extract a package into a fresh scratch directory.
///
/// Relative paths inside the archive are preserved. Entry names that would
/// escape the scratch root are rejected rather than written.
pub fn extract_package<P: AsRef<Path>>(path: P) -> Result<ScratchDir> {
    let file = File::open(path.as_ref())?;
    let mut archive = ZipArchive::new(file)?;
    let dir = TempDir::new()?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(Error::Zip(format!(
                "unsafe entry name in package: {}",
                entry.name()
            )));
        };
        let dest = dir.path().join(relative);
        if entry.is_dir() {
            std::fs::create_dir_all(&dest)?;
            continue;
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&dest)?;
        io::copy(&mut entry, &mut out)?;
    }

    Ok(ScratchDir { dir })
}

/// Re-archive every file under `root` into a package at `out_path`.
///
/// All entries use Deflate compression. Relative paths are recorded
/// verbatim (with `/` separators), so parts that were not touched while
/// extracted keep byte-identical content.
pub fn repack_directory<P: AsRef<Path>, Q: AsRef<Path>>(root: P, out_path: Q) -> Result<()> {
    let root = root.as_ref();
    let file = File::create(out_path.as_ref())?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Other(format!("walking scratch tree: {e}")))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| Error::Other(format!("scratch path outside root: {e}")))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        writer.start_file(name, options)?;
        let mut part = File::open(entry.path())?;
        io::copy(&mut part, &mut writer)?;
    }

    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    fn build_package(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(io::Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn extract_then_repack_round_trips_content() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg_path = tmp.path().join("pkg.docx");
        let bytes = build_package(&[
            ("word/document.xml", b"<w:document/>".as_slice()),
            ("word/media/image1.png", b"\x89PNGdata".as_slice()),
        ]);
        std::fs::write(&pkg_path, bytes).unwrap();

        let scratch = extract_package(&pkg_path).unwrap();
        assert!(scratch.path().join("word/document.xml").exists());

        let out_path = tmp.path().join("out.docx");
        repack_directory(scratch.path(), &out_path).unwrap();

        let mut archive = ZipArchive::new(File::open(&out_path).unwrap()).unwrap();
        let mut media = Vec::new();
        archive
            .by_name("word/media/image1.png")
            .unwrap()
            .read_to_end(&mut media)
            .unwrap();
        assert_eq!(media, b"\x89PNGdata");
    }

    #[test]
    fn scratch_directory_is_removed_on_drop() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg_path = tmp.path().join("pkg.docx");
        std::fs::write(&pkg_path, build_package(&[("a.xml", b"<a/>".as_slice())])).unwrap();

        let scratch_path = {
            let scratch = extract_package(&pkg_path).unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!scratch_path.exists());
    }

    #[test]
    fn non_zip_input_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let bogus = tmp.path().join("bogus.docx");
        std::fs::write(&bogus, b"not a zip archive").unwrap();
        assert!(extract_package(&bogus).is_err());
    }
}
