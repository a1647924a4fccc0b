//! CI checks for the external-engine download directory.
//!
//! The directory is a JSON document listing chess engines and the download
//! URLs of their per-platform binaries. This crate verifies that every
//! referenced archive actually contains the binary it claims to, and that
//! every engine ships a "default"-architecture binary for each supported
//! operating system.

pub mod archive;
pub mod manifest;
pub mod verify;

pub use manifest::{Binary, Engine, EngineDirectory};
pub use verify::{verify, VerifyError};
