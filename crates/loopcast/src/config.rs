//! Run configuration.
//!
//! Everything the run needs is read from the environment once at startup
//! into an immutable [`AppConfig`], which is then passed explicitly to the
//! token acquirer and the encoder supervisor. A `.env` file in the working
//! directory fills in variables the process environment does not set.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use loopcast_auth::TWITCH_TOKEN_URL;
use loopcast_encoder::DEFAULT_PROGRAM;
use loopcast_models::{
    ClientCredentials, ModelError, StreamDestination, StreamKey, DEFAULT_INPUT_FILE,
    TWITCH_INGEST_URL,
};
use tracing::debug;

/// Dotenv file read by [`AppConfig::from_env`], relative to the working
/// directory.
pub const ENV_FILE: &str = ".env";

/// Errors raised while assembling the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("environment variable {var} must be set")]
    Missing {
        /// Name of the variable.
        var: &'static str,
    },

    /// A value was present but rejected by its model type.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ModelError),

    /// The dotenv file exists but could not be read or parsed.
    #[error("cannot load {path}: {source}")]
    EnvFile {
        /// File that was being read.
        path: String,
        /// Parser or I/O error.
        #[source]
        source: dotenvy::Error,
    },

    /// The working directory could not be determined.
    #[error("cannot resolve working directory: {0}")]
    WorkingDir(#[source] std::io::Error),
}

/// Immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application credentials for the token exchange.
    pub credentials: ClientCredentials,
    /// Secret key of the target channel.
    pub stream_key: StreamKey,
    /// OAuth token endpoint.
    pub token_url: String,
    /// RTMP ingest base URL.
    pub ingest_url: String,
    /// Encoder binary.
    pub ffmpeg: String,
}

impl AppConfig {
    /// Build the configuration from the process environment, falling
    /// back to [`ENV_FILE`] for variables it does not set.
    ///
    /// | Variable               | Default                             |
    /// |------------------------|-------------------------------------|
    /// | `TWITCH_STREAM_KEY`    | required                            |
    /// | `TWITCH_CLIENT_ID`     | required                            |
    /// | `TWITCH_CLIENT_SECRET` | required                            |
    /// | `TWITCH_TOKEN_URL`     | `https://id.twitch.tv/oauth2/token` |
    /// | `TWITCH_INGEST_URL`    | `rtmp://live.twitch.tv/app`         |
    /// | `FFMPEG_BIN`           | `ffmpeg`                            |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_file(Path::new(ENV_FILE))
    }

    /// As [`from_env`](Self::from_env), with an explicit dotenv file.
    /// Process variables take precedence over the file's entries.
    pub fn from_env_with_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_lookup(env_then(load_env_file(path)?))
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let required = |var: &'static str| present(var).ok_or(ConfigError::Missing { var });

        let stream_key = StreamKey::new(required("TWITCH_STREAM_KEY")?)?;
        let credentials = ClientCredentials::new(
            required("TWITCH_CLIENT_ID")?,
            required("TWITCH_CLIENT_SECRET")?,
        )?;

        Ok(Self {
            credentials,
            stream_key,
            token_url: present("TWITCH_TOKEN_URL").unwrap_or_else(|| TWITCH_TOKEN_URL.to_string()),
            ingest_url: present("TWITCH_INGEST_URL")
                .unwrap_or_else(|| TWITCH_INGEST_URL.to_string()),
            ffmpeg: present("FFMPEG_BIN").unwrap_or_else(|| DEFAULT_PROGRAM.to_string()),
        })
    }

    /// Where the encoder pushes the stream.
    pub fn destination(&self) -> StreamDestination {
        StreamDestination::new(&self.ingest_url, self.stream_key.clone())
    }
}

/// Entries of the dotenv file at `path`; empty if there is none.
///
/// The process environment is left untouched.
pub fn load_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter.collect::<Result<HashMap<_, _>, _>>(),
        Err(e) if e.not_found() => {
            debug!(path = %path.display(), "no dotenv file");
            return Ok(HashMap::new());
        }
        Err(e) => Err(e),
    };
    let entries = entries.map_err(|source| ConfigError::EnvFile {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), entries = entries.len(), "loaded dotenv file");
    Ok(entries)
}

/// Lookup reading the process environment first, then `file`.
fn env_then(file: HashMap<String, String>) -> impl Fn(&str) -> Option<String> {
    move |var| std::env::var(var).ok().or_else(|| file.get(var).cloned())
}

/// Resolve the media file: `input` if given, otherwise `demo.mp4` in the
/// working directory. Existence is not checked here; a missing file
/// surfaces as an encoder failure.
pub fn resolve_input(input: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match input {
        Some(path) => Ok(path),
        None => std::env::current_dir()
            .map(|cwd| cwd.join(DEFAULT_INPUT_FILE))
            .map_err(ConfigError::WorkingDir),
    }
}
