//! Encoder process lifecycle.
//!
//! The OS reports a child process through several independent event
//! sources: the spawn result, each output stream reaching EOF, and the
//! exit status. They can arrive in any order. [`Lifecycle`] folds them
//! into exactly one [`ProcessOutcome`].
//!
//! ```text
//!   Spawned ──spawn error──▶ SpawnFailed            (final)
//!      │
//!   started
//!      ▼
//!   Running ──exit──▶ Exited ──both streams closed──▶ Closed  (final)
//!      │                                               ▲
//!      └── both streams closed, then exit ─────────────┘
//! ```
//!
//! The outcome is produced when both streams are closed *and* an exit
//! code is known, so it always reflects the recorded exit status no
//! matter which of the two was observed first.

use std::io;

use loopcast_models::ProcessOutcome;
use tracing::{error, info, trace, warn};

/// One of the encoder's output pipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum OutputStream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

/// Something the OS told us about the encoder process.
#[derive(Debug)]
pub enum ProcessEvent {
    /// The process was created.
    Started {
        /// OS process id, if still available.
        pid: Option<u32>,
    },
    /// The process could not be created.
    SpawnFailed(io::Error),
    /// A line of output.
    Line {
        /// Pipe the line was read from.
        stream: OutputStream,
        /// Line content without its terminator.
        line: String,
    },
    /// A pipe reached EOF.
    StreamClosed(OutputStream),
    /// The process terminated with this exit code.
    Exited(i32),
}

/// Where the process is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Phase {
    /// Creation requested, not yet confirmed.
    Spawned,
    /// Process is running.
    Running,
    /// Creation failed.
    SpawnFailed,
    /// Exit code known, output still draining.
    Exited,
    /// Output drained and exit code known.
    Closed,
}

/// Finalize-once state machine for a single encoder run.
#[derive(Debug)]
pub struct Lifecycle {
    phase: Phase,
    exit_code: Option<i32>,
    stdout_open: bool,
    stderr_open: bool,
    lines: u64,
    finalized: bool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Fresh lifecycle in [`Phase::Spawned`].
    pub fn new() -> Self {
        Self {
            phase: Phase::Spawned,
            exit_code: None,
            stdout_open: true,
            stderr_open: true,
            lines: 0,
            finalized: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Last exit code reported, if any.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Number of output lines forwarded so far.
    pub fn lines_forwarded(&self) -> u64 {
        self.lines
    }

    /// Whether the outcome has already been produced.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Feed one event.
    ///
    /// Returns the outcome the first time the run settles and `None`
    /// otherwise. Events arriving after that are ignored.
    pub fn apply(&mut self, event: ProcessEvent) -> Option<ProcessOutcome> {
        if self.finalized {
            trace!(?event, "encoder event after settlement ignored");
            return None;
        }

        match event {
            ProcessEvent::Started { pid } => {
                self.phase = Phase::Running;
                info!(?pid, "encoder running");
                None
            }
            ProcessEvent::SpawnFailed(source) => {
                self.phase = Phase::SpawnFailed;
                error!(error = %source, "error during streaming: encoder failed to start");
                self.finalize(ProcessOutcome::SpawnError(source))
            }
            ProcessEvent::Line { stream, line } => {
                self.lines += 1;
                match stream {
                    OutputStream::Stdout => info!(target: "ffmpeg", %stream, "{line}"),
                    OutputStream::Stderr => warn!(target: "ffmpeg", %stream, "{line}"),
                }
                None
            }
            ProcessEvent::StreamClosed(stream) => {
                match stream {
                    OutputStream::Stdout => self.stdout_open = false,
                    OutputStream::Stderr => self.stderr_open = false,
                }
                trace!(%stream, "encoder output closed");
                self.try_close()
            }
            ProcessEvent::Exited(code) => {
                self.exit_code = Some(code);
                self.phase = Phase::Exited;
                if code == 0 {
                    info!(code, "stream ended");
                } else {
                    error!(code, "encoder exited with non-zero status");
                }
                self.try_close()
            }
        }
    }

    fn try_close(&mut self) -> Option<ProcessOutcome> {
        if self.stdout_open || self.stderr_open {
            return None;
        }
        // Streams can drain before the exit status is reaped.
        let code = self.exit_code?;
        self.phase = Phase::Closed;
        info!(code, lines = self.lines, "stream closed");
        self.finalize(ProcessOutcome::from_exit_code(code))
    }

    fn finalize(&mut self, outcome: ProcessOutcome) -> Option<ProcessOutcome> {
        self.finalized = true;
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(stream: OutputStream, text: &str) -> ProcessEvent {
        ProcessEvent::Line {
            stream,
            line: text.into(),
        }
    }

    /// Feed `events` and collect every outcome produced.
    fn drive(events: Vec<ProcessEvent>) -> (Lifecycle, Vec<ProcessOutcome>) {
        let mut lifecycle = Lifecycle::new();
        let outcomes = events
            .into_iter()
            .filter_map(|e| lifecycle.apply(e))
            .collect();
        (lifecycle, outcomes)
    }

    fn run_events(code: i32, exit_first: bool) -> Vec<ProcessEvent> {
        let mut events = vec![
            ProcessEvent::Started { pid: Some(4242) },
            line(OutputStream::Stderr, "frame=  120 fps= 30"),
            line(OutputStream::Stdout, "done"),
        ];
        let closes = [
            ProcessEvent::StreamClosed(OutputStream::Stdout),
            ProcessEvent::StreamClosed(OutputStream::Stderr),
        ];
        if exit_first {
            events.push(ProcessEvent::Exited(code));
            events.extend(closes);
        } else {
            events.extend(closes);
            events.push(ProcessEvent::Exited(code));
        }
        events
    }

    #[test]
    fn starts_in_spawned() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.phase(), Phase::Spawned);
        assert!(!lifecycle.is_finalized());
    }

    #[test]
    fn exit_zero_then_close_succeeds_once() {
        let (lifecycle, outcomes) = drive(run_events(0, true));
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_success());
        assert_eq!(lifecycle.phase(), Phase::Closed);
        assert_eq!(lifecycle.lines_forwarded(), 2);
    }

    #[test]
    fn exit_137_fails_in_either_order() {
        for exit_first in [true, false] {
            let (lifecycle, outcomes) = drive(run_events(137, exit_first));
            assert_eq!(outcomes.len(), 1, "exit_first={exit_first}");
            assert!(
                matches!(outcomes[0], ProcessOutcome::NonZeroExit(137)),
                "exit_first={exit_first}"
            );
            assert_eq!(lifecycle.exit_code(), Some(137));
            assert_eq!(lifecycle.phase(), Phase::Closed);
        }
    }

    #[test]
    fn exit_between_stream_closures() {
        let (_, outcomes) = drive(vec![
            ProcessEvent::Started { pid: None },
            ProcessEvent::StreamClosed(OutputStream::Stderr),
            ProcessEvent::Exited(1),
            line(OutputStream::Stdout, "late stdout"),
            ProcessEvent::StreamClosed(OutputStream::Stdout),
        ]);
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], ProcessOutcome::NonZeroExit(1)));
    }

    #[test]
    fn streams_closed_without_exit_stays_pending() {
        let (lifecycle, outcomes) = drive(vec![
            ProcessEvent::Started { pid: None },
            ProcessEvent::StreamClosed(OutputStream::Stdout),
            ProcessEvent::StreamClosed(OutputStream::Stderr),
        ]);
        assert!(outcomes.is_empty());
        assert_eq!(lifecycle.phase(), Phase::Running);
    }

    #[test]
    fn exit_without_close_stays_pending() {
        let (lifecycle, outcomes) = drive(vec![
            ProcessEvent::Started { pid: None },
            ProcessEvent::StreamClosed(OutputStream::Stdout),
            ProcessEvent::Exited(0),
        ]);
        assert!(outcomes.is_empty());
        assert_eq!(lifecycle.phase(), Phase::Exited);
    }

    #[test]
    fn spawn_failure_settles_immediately() {
        let (lifecycle, outcomes) = drive(vec![ProcessEvent::SpawnFailed(io::Error::new(
            io::ErrorKind::NotFound,
            "ffmpeg not found",
        ))]);
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], ProcessOutcome::SpawnError(ref e) if e.kind() == io::ErrorKind::NotFound));
        assert_eq!(lifecycle.phase(), Phase::SpawnFailed);
    }

    #[test]
    fn events_after_settlement_are_ignored() {
        let mut events = run_events(0, true);
        events.push(ProcessEvent::Exited(1));
        events.push(ProcessEvent::StreamClosed(OutputStream::Stdout));
        let (lifecycle, outcomes) = drive(events);
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_success());
        assert_eq!(lifecycle.exit_code(), Some(0));
    }

    #[test]
    fn output_stream_names() {
        assert_eq!(OutputStream::Stdout.to_string(), "stdout");
        assert_eq!(OutputStream::Stderr.to_string(), "stderr");
    }
}
