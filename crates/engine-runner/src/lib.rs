//! Drives a local UCI chess engine through one analysis request and forwards
//! the result to a remote work endpoint.
//!
//! The engine runs as a child process with piped stdin/stdout. The runner
//! writes a `position` and a `go depth N` command, scans the engine's output
//! for lines at the requested depth, and posts each delivered line to
//! `{host}/api/external-engine/work/{work_id}` as plain text.

pub mod delivery;
pub mod session;

pub use delivery::{DeliveryError, WorkEndpoint};
pub use session::{EngineSession, SessionError, StopRule};
