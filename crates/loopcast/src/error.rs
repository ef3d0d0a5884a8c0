//! Top-level run errors and their process exit codes.

use loopcast_auth::AuthError;
use loopcast_encoder::StreamError;

use crate::config::ConfigError;

/// Any failure that ends a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Configuration could not be assembled.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No access token could be obtained.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The encoder failed to start or exited unsuccessfully.
    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl RunError {
    /// Process exit code for this failure. Success is 0.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Auth(_) => 3,
            Self::Stream(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_and_non_zero() {
        let codes = [
            RunError::from(ConfigError::Missing {
                var: "TWITCH_CLIENT_ID",
            })
            .exit_code(),
            RunError::from(AuthError::MissingToken).exit_code(),
            RunError::from(StreamError::EncodingExit { code: 1 }).exit_code(),
        ];
        assert_eq!(codes, [2, 3, 4]);
    }

    #[test]
    fn display_is_transparent() {
        let err = RunError::from(StreamError::EncodingExit { code: 137 });
        assert_eq!(err.to_string(), "encoder exited with code 137");
    }
}
