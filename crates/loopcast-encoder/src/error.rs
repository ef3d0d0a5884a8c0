//! Error types for the encoder supervisor.

use std::io;

/// Errors returned when supervising the encoder process.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The encoder process could not be started (e.g. binary not found).
    #[error("failed to start encoder `{program}`: {source}")]
    Spawn {
        /// Program that was being launched.
        program: String,
        /// OS error from the spawn attempt.
        #[source]
        source: io::Error,
    },

    /// The encoder ran and exited with a non-zero status.
    #[error("encoder exited with code {code}")]
    EncodingExit {
        /// Exit code; `128 + signal` when killed by a signal.
        code: i32,
    },

    /// The OS failed to report the encoder's exit status.
    #[error("failed to wait for encoder: {0}")]
    Wait(#[source] io::Error),

    /// Output monitoring ended before both pipes were reported closed.
    #[error("encoder output monitoring ended before the process settled")]
    Unsettled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_exit_display() {
        let err = StreamError::EncodingExit { code: 137 };
        assert_eq!(err.to_string(), "encoder exited with code 137");
    }

    #[test]
    fn unsettled_display() {
        assert_eq!(
            StreamError::Unsettled.to_string(),
            "encoder output monitoring ended before the process settled"
        );
    }

    #[test]
    fn spawn_display_names_program() {
        let err = StreamError::Spawn {
            program: "ffmpeg".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert_eq!(
            err.to_string(),
            "failed to start encoder `ffmpeg`: No such file or directory"
        );
    }
}
