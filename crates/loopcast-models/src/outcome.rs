//! Result of the supervised encoder process.

use std::io;

/// How the encoder run ended.
///
/// Exit codes follow the shell convention: a process terminated by a
/// signal reports `128 + signal` (so SIGKILL is 137).
#[derive(Debug)]
pub enum ProcessOutcome {
    /// The process exited with status 0 and its output streams closed.
    Success,
    /// The process exited with a non-zero status.
    NonZeroExit(i32),
    /// The process could not be started.
    SpawnError(io::Error),
}

impl ProcessOutcome {
    /// Outcome for a finished process with the given exit code.
    pub fn from_exit_code(code: i32) -> Self {
        if code == 0 {
            Self::Success
        } else {
            Self::NonZeroExit(code)
        }
    }

    /// Whether the run ended cleanly.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_success() {
        assert!(ProcessOutcome::from_exit_code(0).is_success());
    }

    #[test]
    fn non_zero_keeps_code() {
        assert!(matches!(
            ProcessOutcome::from_exit_code(137),
            ProcessOutcome::NonZeroExit(137)
        ));
    }
}
