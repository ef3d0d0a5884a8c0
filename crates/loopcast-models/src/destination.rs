//! RTMP ingest addressing.
//!
//! A [`StreamDestination`] is the ingest base URL with the secret
//! [`StreamKey`] appended as the last path segment. Only
//! [`StreamDestination::url`] exposes the key; every formatting impl
//! masks it.

use std::fmt;

use crate::error::{non_empty, ModelError};
use crate::REDACTED;

/// Twitch's primary RTMP ingest.
pub const TWITCH_INGEST_URL: &str = "rtmp://live.twitch.tv/app";

// ---------------------------------------------------------------------------
// StreamKey
// ---------------------------------------------------------------------------

/// Secret key identifying the channel to the ingest server.
#[derive(Clone, PartialEq, Eq)]
pub struct StreamKey(String);

impl StreamKey {
    /// Wrap a raw stream key, rejecting empty strings.
    pub fn new(key: impl Into<String>) -> Result<Self, ModelError> {
        non_empty("stream key", key.into()).map(Self)
    }

    /// The raw key.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StreamKey").field(&REDACTED).finish()
    }
}

// ---------------------------------------------------------------------------
// StreamDestination
// ---------------------------------------------------------------------------

/// Where the encoder pushes the stream.
///
/// # Examples
///
/// ```
/// use loopcast_models::{StreamDestination, StreamKey, TWITCH_INGEST_URL};
///
/// let key = StreamKey::new("live_123_abc").unwrap();
/// let dest = StreamDestination::new(TWITCH_INGEST_URL, key);
/// assert_eq!(dest.url(), "rtmp://live.twitch.tv/app/live_123_abc");
/// assert_eq!(dest.to_string(), "rtmp://live.twitch.tv/app/****");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct StreamDestination {
    ingest: String,
    key: StreamKey,
}

impl StreamDestination {
    /// Combine an ingest base URL and a stream key.
    ///
    /// Trailing slashes on `ingest` are dropped so the key always forms a
    /// single path segment.
    pub fn new(ingest: impl Into<String>, key: StreamKey) -> Self {
        let ingest = ingest.into().trim_end_matches('/').to_string();
        Self { ingest, key }
    }

    /// Destination on the default Twitch ingest.
    pub fn twitch(key: StreamKey) -> Self {
        Self::new(TWITCH_INGEST_URL, key)
    }

    /// Full URL including the secret key. Hand this to the encoder only.
    pub fn url(&self) -> String {
        format!("{}/{}", self.ingest, self.key.secret())
    }

    /// The ingest base URL without the key.
    pub fn ingest(&self) -> &str {
        &self.ingest
    }
}

impl fmt::Display for StreamDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{REDACTED}", self.ingest)
    }
}

impl fmt::Debug for StreamDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StreamDestination")
            .field(&format_args!("{self}"))
            .finish()
    }
}
