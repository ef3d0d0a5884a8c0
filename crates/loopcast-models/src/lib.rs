#![deny(missing_docs)]

//! # loopcast models
//!
//! Plain data types shared by the token acquirer, the stream supervisor
//! and the `loopcast` binary.
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`credentials`] | `ClientCredentials` and the `AccessToken` they are exchanged for |
//! | [`destination`] | `StreamKey` and the RTMP `StreamDestination` built from it |
//! | [`job`] | `EncodingJobSpec`, the fixed encoder argument vector |
//! | [`outcome`] | `ProcessOutcome` of the supervised encoder |
//! | [`error`] | `ModelError` |
//!
//! Every type holding a secret redacts it in its `Debug` and `Display`
//! output, so values can be logged freely.

pub mod credentials;
pub mod destination;
pub mod error;
pub mod job;
pub mod outcome;

pub use credentials::*;
pub use destination::*;
pub use error::*;
pub use job::*;
pub use outcome::*;

/// Replacement text for redacted secrets.
pub(crate) const REDACTED: &str = "****";
