//! UCI engine session: one child process, one analysis cycle.
//!
//! The session speaks the line-based UCI protocol over the child's piped
//! stdin/stdout. Unlike a full UCI client there is no `uci`/`isready`
//! handshake: the runner goes straight to `position` and `go`, mirroring the
//! analysis providers it replaces.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use thiserror::Error;

use crate::delivery::DeliveryError;

/// Errors that can occur while driving the engine.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Failed to spawn the engine process or perform I/O on its pipes.
    #[error("Failed to spawn process: {0}")]
    SpawnError(#[from] std::io::Error),
    /// The engine closed its stdout before the analysis finished.
    #[error("Engine closed its output stream")]
    EngineClosed,
    /// Forwarding an analysis line to the work endpoint failed.
    #[error("Failed to deliver analysis line: {0}")]
    Delivery(#[from] DeliveryError),
}

/// When to stop reading the engine's output.
///
/// The two historical runner variants disagree here, so both rules are
/// supported explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRule {
    /// Stop after the first line at the requested depth (one delivery).
    Depth,
    /// Read until `bestmove`, delivering every line at the requested depth.
    Bestmove,
}

/// A running UCI engine bound to a single analysis request.
///
/// Spawn with [`EngineSession::spawn`], run one cycle with
/// [`analyse`](Self::analyse), then [`quit`](Self::quit) (or rely on [`Drop`],
/// which kills the child).
pub struct EngineSession {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    /// Optional append-only log of every raw engine output line.
    log: Option<File>,
}

impl EngineSession {
    /// Spawns the engine executable with piped stdin/stdout.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SpawnError`] if the process cannot be started,
    /// typically because the executable doesn't exist or lacks permissions.
    pub fn spawn<P: AsRef<Path>>(path: P) -> Result<Self, SessionError> {
        let mut process = Command::new(path.as_ref())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = process.stdin.take().expect("stdin was piped");
        let stdout = BufReader::new(process.stdout.take().expect("stdout was piped"));

        Ok(Self {
            process,
            stdin,
            stdout,
            log: None,
        })
    }

    /// Appends every engine output line to the file at `path`.
    ///
    /// The file is created if missing and opened once per session.
    pub fn log_to<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SessionError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        self.log = Some(file);
        Ok(())
    }

    /// Sends one command line to the engine and flushes.
    pub fn send(&mut self, cmd: &str) -> Result<(), SessionError> {
        writeln!(self.stdin, "{}", cmd)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Reads one raw (untrimmed) line from the engine's stdout.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EngineClosed`] on end-of-stream.
    fn read_line(&mut self) -> Result<String, SessionError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(SessionError::EngineClosed);
        }
        Ok(line)
    }

    /// Runs one analysis cycle and delivers matching output lines.
    ///
    /// Writes `position fen <fen> moves <moves>` (the moves clause is omitted
    /// when `moves` is empty) followed by `go depth <depth>`, then reads the
    /// engine's output line by line. Every line containing the
    /// `info depth <depth>` marker is passed to `sink` with surrounding
    /// whitespace trimmed. Reading stops per the [`StopRule`].
    ///
    /// Returns the number of lines delivered.
    ///
    /// # Errors
    ///
    /// Propagates pipe I/O errors, premature engine exit, and sink failures.
    /// There is no timeout: an engine that stops responding without closing
    /// its pipes blocks indefinitely.
    pub fn analyse(
        &mut self,
        fen: &str,
        moves: &str,
        depth: u32,
        stop: StopRule,
        sink: &mut dyn FnMut(&str) -> Result<(), SessionError>,
    ) -> Result<usize, SessionError> {
        if moves.is_empty() {
            self.send(&format!("position fen {}", fen))?;
        } else {
            self.send(&format!("position fen {} moves {}", fen, moves))?;
        }
        self.send(&format!("go depth {}", depth))?;

        let marker = format!("info depth {}", depth);
        let mut delivered = 0;

        loop {
            let line = self.read_line()?;

            if let Some(log) = &mut self.log {
                log.write_all(line.as_bytes())?;
            }

            if line.contains(&marker) {
                sink(line.trim())?;
                delivered += 1;
                if stop == StopRule::Depth {
                    break;
                }
            } else if stop == StopRule::Bestmove && line.starts_with("bestmove") {
                break;
            }
        }

        Ok(delivered)
    }

    /// Gracefully shuts down the engine.
    ///
    /// Sends `quit` and waits for the process to exit.
    pub fn quit(&mut self) -> Result<(), SessionError> {
        self.send("quit")?;
        let _ = self.process.wait();
        Ok(())
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        let _ = self.send("quit");
        let _ = self.process.kill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_nonexistent_executable_returns_error() {
        let result = EngineSession::spawn("/nonexistent/path/to/engine");
        match result {
            Err(SessionError::SpawnError(_)) => {}
            _ => panic!("Expected SpawnError"),
        }
    }

    #[test]
    fn session_error_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let spawn = SessionError::SpawnError(io_error);
        assert!(spawn.to_string().contains("Failed to spawn process"));

        let closed = SessionError::EngineClosed;
        assert_eq!(closed.to_string(), "Engine closed its output stream");
    }

    #[cfg(unix)]
    mod fake_engine {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        const FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

        /// Writes an executable shell script that reads the two UCI commands
        /// and then prints a canned analysis transcript.
        fn write_fake_engine(dir: &std::path::Path) -> std::path::PathBuf {
            let path = dir.join("fake-engine.sh");
            let script = concat!(
                "#!/bin/sh\n",
                "read position_cmd\n",
                "read go_cmd\n",
                "echo 'info depth 1 seldepth 1 score cp 12 pv e2e4'\n",
                "echo '  info depth 20 seldepth 30 score cp 35 pv e2e4 e7e5  '\n",
                "echo 'info depth 20 seldepth 32 score cp 31 pv d2d4'\n",
                "echo 'bestmove e2e4'\n",
            );
            std::fs::write(&path, script).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn depth_rule_delivers_exactly_one_trimmed_line() {
            let dir = tempfile::tempdir().unwrap();
            let engine = write_fake_engine(dir.path());

            let mut session = EngineSession::spawn(&engine).unwrap();
            let mut lines = Vec::new();
            let delivered = session
                .analyse(FEN, "", 20, StopRule::Depth, &mut |line| {
                    lines.push(line.to_string());
                    Ok(())
                })
                .unwrap();

            assert_eq!(delivered, 1);
            assert_eq!(
                lines,
                vec!["info depth 20 seldepth 30 score cp 35 pv e2e4 e7e5"]
            );
        }

        #[test]
        fn bestmove_rule_delivers_every_matching_line() {
            let dir = tempfile::tempdir().unwrap();
            let engine = write_fake_engine(dir.path());

            let mut session = EngineSession::spawn(&engine).unwrap();
            let mut lines = Vec::new();
            let delivered = session
                .analyse(FEN, "e2e4 e7e5", 20, StopRule::Bestmove, &mut |line| {
                    lines.push(line.to_string());
                    Ok(())
                })
                .unwrap();

            assert_eq!(delivered, 2);
            assert_eq!(
                lines,
                vec![
                    "info depth 20 seldepth 30 score cp 35 pv e2e4 e7e5",
                    "info depth 20 seldepth 32 score cp 31 pv d2d4",
                ]
            );
        }

        #[test]
        fn bestmove_rule_logs_every_line() {
            let dir = tempfile::tempdir().unwrap();
            let engine = write_fake_engine(dir.path());
            let log_path = dir.path().join("uci.log");

            let mut session = EngineSession::spawn(&engine).unwrap();
            session.log_to(&log_path).unwrap();
            session
                .analyse(FEN, "", 20, StopRule::Bestmove, &mut |_| Ok(()))
                .unwrap();

            let log = std::fs::read_to_string(&log_path).unwrap();
            assert_eq!(log.lines().count(), 4);
            assert!(log.contains("info depth 1"));
            assert!(log.contains("bestmove e2e4"));
        }

        #[test]
        fn engine_exit_without_match_is_engine_closed() {
            let dir = tempfile::tempdir().unwrap();
            let engine = write_fake_engine(dir.path());

            let mut session = EngineSession::spawn(&engine).unwrap();
            // Depth 30 never appears in the transcript, so the reader runs
            // into end-of-stream once the script exits.
            let result = session.analyse(FEN, "", 30, StopRule::Depth, &mut |_| Ok(()));
            assert!(matches!(result, Err(SessionError::EngineClosed)));
        }

        #[test]
        fn sink_failure_aborts_analysis() {
            let dir = tempfile::tempdir().unwrap();
            let engine = write_fake_engine(dir.path());

            let mut session = EngineSession::spawn(&engine).unwrap();
            let result = session.analyse(FEN, "", 20, StopRule::Depth, &mut |_| {
                Err(SessionError::EngineClosed)
            });
            assert!(result.is_err());
        }
    }
}
