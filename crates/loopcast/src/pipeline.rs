//! The two-stage run: authenticate, then stream.

use std::path::Path;

use loopcast_auth::TokenAcquirer;
use loopcast_encoder::Supervise;
use loopcast_models::EncodingJobSpec;
use tracing::info;

use crate::config::AppConfig;
use crate::error::RunError;

/// The encoder job for this configuration and input file.
pub fn plan(config: &AppConfig, input: &Path) -> EncodingJobSpec {
    EncodingJobSpec::new(input, config.destination())
}

/// Shell-quoted encoder command for `job`, with the stream key masked.
pub fn command_line(config: &AppConfig, job: &EncodingJobSpec) -> String {
    let args = job.redacted_args();
    let words = std::iter::once(config.ffmpeg.as_str()).chain(args.iter().map(String::as_str));
    // Quoting only fails on NUL bytes, which OS arguments cannot contain.
    shlex::try_join(words.clone()).unwrap_or_else(|_| words.collect::<Vec<_>>().join(" "))
}

/// Acquire a token, then stream `input` until the encoder stops.
///
/// The encoder is only launched once a non-empty token has been obtained;
/// the first failure ends the run.
pub async fn run<S>(
    config: &AppConfig,
    input: &Path,
    acquirer: &TokenAcquirer,
    supervisor: &S,
) -> Result<(), RunError>
where
    S: Supervise + Sync,
{
    let token = acquirer.acquire(&config.credentials).await?;
    info!(%token, token_url = acquirer.token_url(), "authenticated");

    let job = plan(config, input);
    supervisor.supervise(&job).await?;

    info!(destination = %job.destination(), "stream finished");
    Ok(())
}
