//! `loopcast`: stream a looping video file to Twitch.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use loopcast::{AppConfig, RunError, config, pipeline};
use loopcast_auth::TokenAcquirer;
use loopcast_encoder::StreamSupervisor;
use tracing::{error, info};

/// Loop a local video file to a Twitch live stream.
///
/// Credentials and the stream key are read from `TWITCH_CLIENT_ID`,
/// `TWITCH_CLIENT_SECRET` and `TWITCH_STREAM_KEY`, either in the
/// environment or in a `.env` file in the working directory.
#[derive(Parser, Debug)]
#[command(name = "loopcast", version, about, long_about = None)]
struct Args {
    /// Media file to loop (defaults to `demo.mp4` in the working directory).
    #[arg(long)]
    input: Option<PathBuf>,

    /// Check the configuration and print the encoder command, then exit.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Structured logging (controlled via RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(args: Args) -> Result<(), RunError> {
    let config = AppConfig::from_env()?;
    let input = config::resolve_input(args.input)?;

    if args.dry_run {
        let job = pipeline::plan(&config, &input);
        info!(token_url = %config.token_url, "dry run, nothing will be streamed");
        println!("{}", pipeline::command_line(&config, &job));
        return Ok(());
    }

    let acquirer = TokenAcquirer::new(&config.token_url);
    let supervisor = StreamSupervisor::new(&config.ffmpeg);

    pipeline::run(&config, &input, &acquirer, &supervisor).await
}
