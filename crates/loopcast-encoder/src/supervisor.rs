//! Runs the encoder process and settles its [`Lifecycle`].

use std::ffi::{OsStr, OsString};
use std::future;
use std::io;
use std::pin::pin;
use std::process::{ExitStatus, Stdio};

use loopcast_models::{EncodingJobSpec, ProcessOutcome};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, warn};

use crate::error::StreamError;
use crate::lifecycle::{Lifecycle, OutputStream, ProcessEvent};

/// Default encoder binary, looked up on `PATH`.
pub const DEFAULT_PROGRAM: &str = "ffmpeg";

/// Runs an [`EncodingJobSpec`] to completion.
///
/// [`StreamSupervisor`] is the real implementation; tests substitute
/// fakes to observe whether and how the encoder would be launched.
pub trait Supervise {
    /// Run `job` until the encoder process has exited and closed its
    /// output.
    fn supervise(&self, job: &EncodingJobSpec) -> impl Future<Output = Result<(), StreamError>> + Send;
}

/// Launches and monitors one encoder process per call.
#[derive(Debug, Clone)]
pub struct StreamSupervisor {
    program: OsString,
}

impl Default for StreamSupervisor {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl StreamSupervisor {
    /// Supervisor launching `program`.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The program this supervisor launches.
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Run the program with `args` and wait until it has exited and both
    /// output pipes are drained.
    ///
    /// Output is forwarded to the log line by line while the process
    /// runs. There is no timeout: a looping encoder runs until it is
    /// terminated from outside.
    ///
    /// # Errors
    ///
    /// * [`StreamError::Spawn`] if the process cannot be started.
    /// * [`StreamError::EncodingExit`] if it exits with a non-zero code.
    /// * [`StreamError::Wait`] if the OS fails to report its status.
    /// * [`StreamError::Unsettled`] if output monitoring stops before
    ///   the process has settled.
    pub async fn run<I, S>(&self, args: I) -> Result<(), StreamError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut lifecycle = Lifecycle::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let spawned = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(mut child) => {
                let _ = tx.send(ProcessEvent::Started { pid: child.id() });
                forward(child.stdout.take(), OutputStream::Stdout, tx.clone());
                forward(child.stderr.take(), OutputStream::Stderr, tx.clone());
                Some(child)
            }
            Err(source) => {
                let _ = tx.send(ProcessEvent::SpawnFailed(source));
                None
            }
        };
        drop(tx);

        let mut exit = pin!(async {
            match child.as_mut() {
                Some(child) => child.wait().await,
                None => future::pending().await,
            }
        });
        let mut exited = false;

        loop {
            let settled = tokio::select! {
                biased;
                Some(event) = rx.recv() => lifecycle.apply(event),
                status = &mut exit, if !exited => {
                    exited = true;
                    let status = status.map_err(StreamError::Wait)?;
                    lifecycle.apply(ProcessEvent::Exited(exit_code(status)))
                }
                // Only reachable if an output task died without reporting
                // its pipe closed.
                else => return Err(StreamError::Unsettled),
            };

            if let Some(outcome) = settled {
                return self.settle(outcome);
            }
        }
    }

    fn settle(&self, outcome: ProcessOutcome) -> Result<(), StreamError> {
        match outcome {
            ProcessOutcome::Success => Ok(()),
            ProcessOutcome::NonZeroExit(code) => Err(StreamError::EncodingExit { code }),
            ProcessOutcome::SpawnError(source) => Err(StreamError::Spawn {
                program: self.program.to_string_lossy().into_owned(),
                source,
            }),
        }
    }
}

impl Supervise for StreamSupervisor {
    async fn supervise(&self, job: &EncodingJobSpec) -> Result<(), StreamError> {
        info!(
            program = %self.program.to_string_lossy(),
            input = %job.input().display(),
            destination = %job.destination(),
            "starting encoder"
        );
        debug!(args = ?job.redacted_args(), "encoder command line");
        self.run(job.args()).await
    }
}

/// Longest line forwarded in one piece; longer runs are cut.
const MAX_LINE_BYTES: usize = 16 * 1024;

/// Pump one output pipe into the event channel, then report it closed.
///
/// A line ends at `\n` or at the `\r` ffmpeg ends its progress updates
/// with, so progress is forwarded while the encoder is still running.
/// Invalid UTF-8 is replaced rather than treated as an error so the pipe
/// keeps draining.
fn forward<R>(pipe: Option<R>, stream: OutputStream, tx: UnboundedSender<ProcessEvent>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        if let Some(pipe) = pipe {
            if let Err(e) = pump(pipe, stream, &tx).await {
                warn!(%stream, error = %e, "failed to read encoder output");
            }
        }
        let _ = tx.send(ProcessEvent::StreamClosed(stream));
    });
}

async fn pump<R>(pipe: R, stream: OutputStream, tx: &UnboundedSender<ProcessEvent>) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(pipe);
    let mut line = Vec::new();
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            break;
        }
        let room = MAX_LINE_BYTES - line.len();
        let (used, ended) = match chunk.iter().take(room).position(|b| matches!(b, b'\r' | b'\n')) {
            Some(end) => {
                line.extend_from_slice(&chunk[..end]);
                (end + 1, true)
            }
            None => {
                let used = chunk.len().min(room);
                line.extend_from_slice(&chunk[..used]);
                (used, line.len() == MAX_LINE_BYTES)
            }
        };
        reader.consume(used);

        if ended && !emit(&mut line, stream, tx) {
            return Ok(());
        }
    }
    emit(&mut line, stream, tx);
    Ok(())
}

/// Send `line` unless it is blank, then clear it. `false` once nobody is
/// listening.
fn emit(line: &mut Vec<u8>, stream: OutputStream, tx: &UnboundedSender<ProcessEvent>) -> bool {
    let text = String::from_utf8_lossy(line);
    let open = text.trim().is_empty()
        || tx
            .send(ProcessEvent::Line {
                stream,
                line: text.into_owned(),
            })
            .is_ok();
    line.clear();
    open
}

/// Exit code with signals mapped to `128 + signal`.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}


#[cfg(all(test, unix))]
mod tests {
    use loopcast_models::{StreamDestination, StreamKey};

    use super::*;

    fn sh(script: &str) -> (StreamSupervisor, [String; 2]) {
        (StreamSupervisor::new("sh"), ["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn clean_exit_succeeds() {
        let (supervisor, args) = sh("echo hello; echo progress >&2; exit 0");
        supervisor.run(args).await.unwrap();
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported() {
        let (supervisor, args) = sh("printf 'a\\nb\\n'; echo oops >&2; exit 3");
        let err = supervisor.run(args).await.unwrap_err();
        assert!(matches!(err, StreamError::EncodingExit { code: 3 }));
    }

    #[tokio::test]
    async fn killed_process_reports_137() {
        let (supervisor, args) = sh("kill -9 $$");
        let err = supervisor.run(args).await.unwrap_err();
        assert!(matches!(err, StreamError::EncodingExit { code: 137 }));
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let supervisor = StreamSupervisor::new("loopcast-no-such-encoder");
        let err = supervisor.run(Vec::<String>::new()).await.unwrap_err();
        match err {
            StreamError::Spawn { program, source } => {
                assert_eq!(program, "loopcast-no-such-encoder");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn large_output_does_not_block() {
        // More than a pipe buffer's worth on both streams, with CR progress lines.
        let (supervisor, args) = sh(
            "i=0; while [ $i -lt 2000 ]; do \
               echo \"stdout line $i\"; printf 'frame=%d\\r' $i >&2; i=$((i+1)); \
             done; exit 0",
        );
        supervisor.run(args).await.unwrap();
    }

    /// Stand-in encoder: fails like ffmpeg when the `-i` file is absent.
    const FAKE_FFMPEG: &str = r#"
        while [ $# -gt 0 ]; do
            if [ "$1" = -i ]; then input=$2; fi
            shift
        done
        if [ ! -f "$input" ]; then
            echo "$input: No such file or directory" >&2
            exit 254
        fi
        printf 'frame=1 fps=30\r' >&2
        exit 0
    "#;

    fn fake_ffmpeg_args(job: &EncodingJobSpec) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-c", FAKE_FFMPEG, "ffmpeg"].map(OsString::from).into();
        args.extend(job.args());
        args
    }

    #[tokio::test]
    async fn missing_input_file_is_an_encoder_failure() {
        let key = StreamKey::new("live_test_key").unwrap();
        let job = EncodingJobSpec::new(
            "/nonexistent/loopcast/demo.mp4",
            StreamDestination::twitch(key),
        );
        let err = StreamSupervisor::new("sh")
            .run(fake_ffmpeg_args(&job))
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::EncodingExit { code: 254 }));
    }

    #[tokio::test]
    async fn existing_input_file_streams() {
        let key = StreamKey::new("live_test_key").unwrap();
        let input = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
        let job = EncodingJobSpec::new(input, StreamDestination::twitch(key));
        StreamSupervisor::new("sh")
            .run(fake_ffmpeg_args(&job))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn supervise_passes_job_arguments() {
        // `echo` ignores the ffmpeg flags and exits 0.
        let key = StreamKey::new("live_test_key").unwrap();
        let job = EncodingJobSpec::new("demo.mp4", StreamDestination::twitch(key));
        StreamSupervisor::new("echo").supervise(&job).await.unwrap();
    }

    #[tokio::test]
    async fn supervise_missing_encoder_fails_to_spawn() {
        let key = StreamKey::new("live_test_key").unwrap();
        let job = EncodingJobSpec::new("demo.mp4", StreamDestination::twitch(key));
        let err = StreamSupervisor::new("loopcast-no-such-encoder")
            .supervise(&job)
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::Spawn { .. }));
    }

    #[test]
    fn default_program_is_ffmpeg() {
        assert_eq!(StreamSupervisor::default().program(), "ffmpeg");
    }
}
