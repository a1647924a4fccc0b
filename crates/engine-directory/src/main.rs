//! CI entry point - verifies the engine directory manifest.
//!
//! Downloads every archive referenced by the manifest, asserts the declared
//! binary is present inside it, then checks per-engine OS coverage. The first
//! failure exits non-zero.

use std::path::PathBuf;

use clap::Parser;
use engine_directory::verify::http_fetcher;
use engine_directory::EngineDirectory;

/// Verifies every download URL in the engine directory manifest.
#[derive(Parser)]
#[command(name = "check-engine-directory")]
#[command(about = "Verifies the external-engine download directory")]
struct Args {
    /// Path to the engine directory manifest
    #[arg(long, default_value = "engine-directory.json")]
    manifest: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    tracing::info!("Manifest: {:?}", args.manifest);
    let directory = EngineDirectory::load(&args.manifest)?;

    let client = reqwest::blocking::Client::new();
    engine_directory::verify(&directory, &mut http_fetcher(client))?;

    tracing::info!("All checks passed");
    Ok(())
}
