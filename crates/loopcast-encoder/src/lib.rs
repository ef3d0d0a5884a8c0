//! # loopcast encoder
//!
//! The Stream Supervisor: launches the external encoder (`ffmpeg`) for an
//! [`EncodingJobSpec`](loopcast_models::EncodingJobSpec), forwards its
//! output to the log, and reports a single result once the process has
//! exited and closed its output.
//!
//! * [`Lifecycle`]: pure state machine turning process events into one
//!   [`ProcessOutcome`](loopcast_models::ProcessOutcome).
//! * [`StreamSupervisor`]: drives a real child process through it.
//! * [`Supervise`]: seam used by the pipeline, so tests can swap the
//!   real encoder for a fake.

pub mod error;
pub mod lifecycle;
pub mod supervisor;

pub use error::StreamError;
pub use lifecycle::{Lifecycle, OutputStream, Phase, ProcessEvent};
pub use supervisor::{StreamSupervisor, Supervise, DEFAULT_PROGRAM};
