//! Engine runner - one analysis request, one engine process, one delivery.
//!
//! Spawns the local UCI engine, feeds it the requested position, waits for
//! output at the requested depth, and posts each delivered line to the work
//! endpoint.

use std::path::PathBuf;

use clap::Parser;
use engine_runner::{EngineSession, SessionError, StopRule, WorkEndpoint};

/// Runs a local UCI engine against one analysis request.
#[derive(Parser)]
#[command(name = "engine-runner")]
#[command(about = "Analyses one position with a local UCI engine and posts the result")]
struct Args {
    /// Base URL of the server to deliver results to
    #[arg(long)]
    host: String,

    /// API token used as the bearer credential
    #[arg(long)]
    token: String,

    /// Identifier of the work unit being answered
    #[arg(long)]
    work_id: String,

    /// Path to the local UCI engine executable
    #[arg(long)]
    binary_path: PathBuf,

    /// Position to analyse, in FEN
    #[arg(long)]
    fen: String,

    /// Moves played from the position, in UCI notation
    #[arg(long, default_value = "")]
    moves: String,

    /// Search depth to request and wait for
    #[arg(long, default_value = "20")]
    depth: u32,

    /// Keep reading until bestmove, posting every line at the target depth
    #[arg(long)]
    until_bestmove: bool,

    /// Append every engine output line to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let endpoint = WorkEndpoint::new(&args.host, &args.work_id, &args.token);
    let client = reqwest::blocking::Client::new();

    tracing::info!("Starting engine {:?}", args.binary_path);
    let mut session = EngineSession::spawn(&args.binary_path)?;
    if let Some(path) = &args.log_file {
        session.log_to(path)?;
    }

    let stop = if args.until_bestmove {
        StopRule::Bestmove
    } else {
        StopRule::Depth
    };

    let delivered = session.analyse(&args.fen, &args.moves, args.depth, stop, &mut |line| {
        endpoint
            .post_line(&client, line)
            .map_err(SessionError::from)
    })?;

    tracing::info!("Delivered {} analysis line(s)", delivered);
    session.quit()?;
    Ok(())
}
