//! Data model for the engine directory manifest.
//!
//! The manifest is a JSON document with a top-level `engines` array. Each
//! engine carries a `binaries` array describing one downloadable archive per
//! OS/architecture pair.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Operating systems every engine must cover with a "default" binary.
///
/// Kept sorted; coverage checks compare against this list directly.
pub const REQUIRED_OS: [&str; 3] = ["linux", "macos", "windows"];

/// Sentinel architecture value marking the architecture-independent binary
/// for an operating system.
pub const DEFAULT_ARCHITECTURE: &str = "default";

/// Errors that can occur when loading the manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Failed to read the manifest file from disk.
    #[error("Failed to read manifest: {0}")]
    ReadError(#[from] std::io::Error),
    /// The manifest is not valid JSON or does not match the schema.
    #[error("Failed to parse manifest: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// The top-level manifest document.
#[derive(Debug, Deserialize)]
pub struct EngineDirectory {
    pub engines: Vec<Engine>,
}

/// A chess engine and its downloadable binaries.
#[derive(Debug, Deserialize)]
pub struct Engine {
    pub name: String,
    pub binaries: Vec<Binary>,
}

/// One downloadable binary: an archive URL and the file expected inside it.
#[derive(Debug, Deserialize)]
pub struct Binary {
    /// Operating system tag (`linux`, `macos`, `windows`).
    pub os: String,
    /// Architecture tag, or [`DEFAULT_ARCHITECTURE`].
    pub architecture: String,
    /// URL of the archive containing the binary.
    pub zip: String,
    /// Filename the archive must contain.
    pub binary_filename: String,
}

impl EngineDirectory {
    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads and parses a manifest file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}
