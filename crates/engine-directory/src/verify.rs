//! Verification pass over the engine directory.
//!
//! Two checks run in order, and the first failure aborts the whole run:
//!
//! 1. For every binary of every engine, fetch its archive and assert the
//!    declared `binary_filename` appears in the archive listing.
//! 2. For every engine, assert the OS tags of its "default"-architecture
//!    binaries cover exactly linux, macos and windows.

use reqwest::header;
use thiserror::Error;

use crate::archive::{self, ArchiveError, ArchiveKind};
use crate::manifest::{EngineDirectory, DEFAULT_ARCHITECTURE, REQUIRED_OS};

/// User-Agent sent with every archive download.
pub const USER_AGENT: &str = "engine-directory ci";

/// Errors produced while fetching an archive.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP request itself failed.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("Unexpected status: {0}")]
    Status(reqwest::StatusCode),
    /// Fetcher-specific failure (used by test fetchers).
    #[error("{0}")]
    Other(String),
}

/// Errors that abort a verification run.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Downloading an archive failed.
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    /// An archive could not be listed.
    #[error("Failed to list {url}: {source}")]
    Archive {
        url: String,
        #[source]
        source: ArchiveError,
    },
    /// The declared binary filename is absent from the fetched archive.
    #[error("Binary {filename} not found in {url}")]
    MissingBinary { filename: String, url: String },
    /// An engine's "default" binaries do not cover exactly the required OSes.
    #[error("Engine {engine} default binaries cover {found:?}, expected {REQUIRED_OS:?}")]
    OsCoverage { engine: String, found: Vec<String> },
}

/// A source of archive bytes, keyed by URL.
///
/// Injected so the binary-presence checks can run against fixtures in tests;
/// the CLI uses [`http_fetcher`].
pub trait Fetcher {
    fn fetch(&mut self, url: &str) -> Result<Vec<u8>, FetchError>;
}

impl<F> Fetcher for F
where
    F: FnMut(&str) -> Result<Vec<u8>, FetchError>,
{
    fn fetch(&mut self, url: &str) -> Result<Vec<u8>, FetchError> {
        self(url)
    }
}

/// Returns a [`Fetcher`] that downloads archives over HTTP with the
/// identifying [`USER_AGENT`] header.
pub fn http_fetcher(client: reqwest::blocking::Client) -> impl Fetcher {
    move |url: &str| {
        let response = client
            .get(url)
            .header(header::USER_AGENT, USER_AGENT)
            .send()?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        Ok(response.bytes()?.to_vec())
    }
}

/// Checks that every declared binary is present in its archive.
///
/// Binaries are checked in manifest order; the first failure aborts the run
/// with no aggregation and no retry.
pub fn verify_binaries(
    directory: &EngineDirectory,
    fetcher: &mut impl Fetcher,
) -> Result<(), VerifyError> {
    for engine in &directory.engines {
        for binary in &engine.binaries {
            tracing::info!("Checking {}", binary.zip);

            // Dispatch on the extension first so an unsupported URL fails
            // without downloading the archive.
            let kind = ArchiveKind::from_url(&binary.zip).map_err(|source| {
                VerifyError::Archive {
                    url: binary.zip.clone(),
                    source,
                }
            })?;

            let bytes = fetcher.fetch(&binary.zip).map_err(|source| VerifyError::Fetch {
                url: binary.zip.clone(),
                source,
            })?;
            let names = archive::list_entries(kind, &bytes).map_err(|source| {
                VerifyError::Archive {
                    url: binary.zip.clone(),
                    source,
                }
            })?;

            if !names.iter().any(|name| name == &binary.binary_filename) {
                return Err(VerifyError::MissingBinary {
                    filename: binary.binary_filename.clone(),
                    url: binary.zip.clone(),
                });
            }

            tracing::info!("Found {}", binary.binary_filename);
        }
    }
    Ok(())
}

/// Checks that every engine offers a "default" binary for each required OS.
///
/// The OS tags of an engine's "default"-architecture binaries, sorted, must
/// equal [`REQUIRED_OS`] exactly: a missing OS, a duplicate, or an unknown
/// tag all fail.
pub fn check_os_coverage(directory: &EngineDirectory) -> Result<(), VerifyError> {
    for engine in &directory.engines {
        let mut found: Vec<String> = engine
            .binaries
            .iter()
            .filter(|binary| binary.architecture == DEFAULT_ARCHITECTURE)
            .map(|binary| binary.os.clone())
            .collect();
        found.sort_unstable();

        if found != REQUIRED_OS {
            return Err(VerifyError::OsCoverage {
                engine: engine.name.clone(),
                found,
            });
        }
    }
    Ok(())
}

/// Runs the full verification pass: binary presence, then OS coverage.
pub fn verify(directory: &EngineDirectory, fetcher: &mut impl Fetcher) -> Result<(), VerifyError> {
    verify_binaries(directory, fetcher)?;
    check_os_coverage(directory)
}
