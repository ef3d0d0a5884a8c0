//! The encoder job description.
//!
//! [`EncodingJobSpec`] fully determines the encoder command line before
//! the process starts. It has no setters: the argument vector is fixed
//! once it is built.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::destination::StreamDestination;

/// Default media file, resolved against the working directory.
pub const DEFAULT_INPUT_FILE: &str = "demo.mp4";

/// Hardware-acceleration method passed to `-hwaccel`.
pub const HWACCEL: &str = "videotoolbox";
/// `-stream_loop` count meaning "forever".
pub const LOOP_FOREVER: &str = "-1";
/// Video codec (H.264).
pub const VIDEO_CODEC: &str = "libx264";
/// Pixel format (planar 4:2:0).
pub const PIXEL_FORMAT: &str = "yuv420p";
/// Audio codec.
pub const AUDIO_CODEC: &str = "aac";
/// Output container required by RTMP ingest.
pub const CONTAINER: &str = "flv";

/// Parameters of the single encode-and-push operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingJobSpec {
    input: PathBuf,
    destination: StreamDestination,
}

impl EncodingJobSpec {
    /// Loop `input` forever and push it to `destination`.
    pub fn new(input: impl Into<PathBuf>, destination: StreamDestination) -> Self {
        Self {
            input: input.into(),
            destination,
        }
    }

    /// The media file read by the encoder.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// The stream destination.
    pub fn destination(&self) -> &StreamDestination {
        &self.destination
    }

    /// Full argument vector for the encoder, including the secret URL.
    pub fn args(&self) -> Vec<OsString> {
        self.build(self.destination.url())
    }

    /// Argument vector with the stream key masked, for logging.
    pub fn redacted_args(&self) -> Vec<String> {
        self.build(self.destination.to_string())
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    fn build(&self, output: String) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(17);
        // Read input at its native frame rate.
        args.push("-re".into());
        args.extend(["-hwaccel", HWACCEL].map(OsString::from));
        args.extend(["-stream_loop", LOOP_FOREVER].map(OsString::from));
        args.push("-i".into());
        args.push(self.input.clone().into_os_string());
        args.extend(["-c:v", VIDEO_CODEC].map(OsString::from));
        args.extend(["-pix_fmt", PIXEL_FORMAT].map(OsString::from));
        args.extend(["-c:a", AUDIO_CODEC].map(OsString::from));
        args.extend(["-f", CONTAINER].map(OsString::from));
        args.push(output.into());
        args
    }
}
