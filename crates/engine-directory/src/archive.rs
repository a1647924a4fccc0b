//! In-memory archive listings.
//!
//! Download URLs in the directory point at either zip or tar archives. The
//! checks only need the list of entry names, so archives are read entirely in
//! memory and never extracted to disk.

use std::io::{Cursor, Read};

use flate2::read::GzDecoder;
use thiserror::Error;

/// Errors that can occur when listing an archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The URL does not end in a recognised archive extension.
    #[error("Unsupported archive format: {0}")]
    UnsupportedFormat(String),
    /// The bytes are not a valid zip archive.
    #[error("Failed to read zip archive: {0}")]
    ZipError(#[from] zip::result::ZipError),
    /// The bytes are not a valid tar archive.
    #[error("Failed to read tar archive: {0}")]
    TarError(#[from] std::io::Error),
}

/// Container format of a download URL, dispatched by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
    TarGz,
}

impl ArchiveKind {
    /// Determines the archive format from a download URL.
    ///
    /// Any query string or fragment is ignored; only the path's extension
    /// counts. Unknown extensions are an error rather than a guess.
    pub fn from_url(url: &str) -> Result<Self, ArchiveError> {
        let path = url
            .split(['?', '#'])
            .next()
            .unwrap_or(url)
            .to_ascii_lowercase();

        if path.ends_with(".zip") {
            Ok(Self::Zip)
        } else if path.ends_with(".tar.gz") || path.ends_with(".tgz") {
            Ok(Self::TarGz)
        } else if path.ends_with(".tar") {
            Ok(Self::Tar)
        } else {
            Err(ArchiveError::UnsupportedFormat(url.to_string()))
        }
    }
}

/// Lists the entry names of an in-memory archive.
pub fn list_entries(kind: ArchiveKind, bytes: &[u8]) -> Result<Vec<String>, ArchiveError> {
    match kind {
        ArchiveKind::Zip => {
            let archive = zip::ZipArchive::new(Cursor::new(bytes))?;
            Ok(archive.file_names().map(str::to_string).collect())
        }
        ArchiveKind::Tar => list_tar_entries(Cursor::new(bytes)),
        ArchiveKind::TarGz => list_tar_entries(GzDecoder::new(bytes)),
    }
}

fn list_tar_entries<R: Read>(reader: R) -> Result<Vec<String>, ArchiveError> {
    let mut archive = tar::Archive::new(reader);
    let mut names = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        names.push(entry.path()?.to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Builds a zip archive in memory containing the given entry names.
#[cfg(test)]
pub(crate) fn zip_with_files(names: &[&str]) -> Vec<u8> {
    use std::io::Write;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for name in names {
        writer.start_file(*name, options).unwrap();
        writer.write_all(b"binary contents").unwrap();
    }
    writer.finish().unwrap().into_inner()
}
