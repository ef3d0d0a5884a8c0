//! # loopcast
//!
//! Loops a local video file to a Twitch live stream: obtains an app access
//! token with the client-credentials grant, then hands the file to
//! `ffmpeg` for an endless RTMP push.
//!
//! The binary in `main.rs` wires [`config`], [`pipeline`] and the
//! logging setup together; the library is split out so the pipeline can
//! be exercised against a mocked token endpoint and a fake encoder.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{AppConfig, ConfigError};
pub use error::RunError;
