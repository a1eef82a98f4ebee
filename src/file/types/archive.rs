//! Helpers for the ZIP packages behind DOCX, ODT and Pages files.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Open a file as a ZIP archive
pub fn open(path: &Path) -> Result<ZipArchive<File>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;

    ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {}", path.display()))
}

/// Names of all entries, in archive order
pub fn entry_names<R: Read + Seek>(archive: &ZipArchive<R>) -> Vec<String> {
    archive.file_names().map(str::to_string).collect()
}

/// Whether the archive has an entry with exactly this name
pub fn has_entry<R: Read + Seek>(archive: &ZipArchive<R>, name: &str) -> bool {
    archive.file_names().any(|entry| entry == name)
}

/// Read one entry fully as bytes
pub fn read_entry_bytes<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut entry = archive
        .by_name(name)
        .with_context(|| format!("There is no item named '{}' in the archive", name))?;

    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut bytes)
        .with_context(|| format!("Failed to read '{}' from archive", name))?;
    Ok(bytes)
}

/// Read one entry fully as UTF-8 text
pub fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let bytes = read_entry_bytes(archive, name)?;
    String::from_utf8(bytes).with_context(|| format!("'{}' is not valid UTF-8", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_zip;
    use tempfile::NamedTempFile;

    #[test]
    fn test_open_and_read_entries() {
        let temp_file = NamedTempFile::new().unwrap();
        write_zip(
            temp_file.path(),
            &[("readme.txt", b"Hello from ZIP!".as_slice()), ("dir/doc.xml", b"<a/>".as_slice())],
        );

        let mut archive = open(temp_file.path()).unwrap();
        assert_eq!(entry_names(&archive).len(), 2);
        assert!(has_entry(&archive, "dir/doc.xml"));
        assert!(!has_entry(&archive, "doc.xml"));
        assert_eq!(read_entry(&mut archive, "readme.txt").unwrap(), "Hello from ZIP!");
    }

    #[test]
    fn test_missing_entry_names_it() {
        let temp_file = NamedTempFile::new().unwrap();
        write_zip(temp_file.path(), &[("a.txt", b"a".as_slice())]);

        let mut archive = open(temp_file.path()).unwrap();
        let err = read_entry(&mut archive, "word/document.xml").unwrap_err();
        assert!(format!("{err:#}").contains("word/document.xml"));
    }

    #[test]
    fn test_open_rejects_non_zip() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "definitely not a zip").unwrap();
        assert!(open(temp_file.path()).is_err());
    }
}
