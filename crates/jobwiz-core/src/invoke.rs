//! Worker invocation: run `job_wizard` as a child process to completion.
//!
//! An [`InvocationRequest`] describes one invocation: the program, its
//! argument vector, and the capture target that both of the child's output
//! streams are redirected into. The command is spawned with an explicit
//! argv -- no shell is involved, so argument values are never subject to
//! shell quoting or interpretation.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Errors from launching or waiting on the worker process.
///
/// A worker that runs and exits with a non-zero status is *not* an error
/// here -- see [`InvocationResult::success`]. These variants cover the
/// cases where no exit status could be obtained at all.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The capture target could not be created or truncated.
    #[error("failed to open capture target {path}: {source}")]
    CaptureTarget {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The worker binary could not be started.
    #[error("failed to launch worker (command: {command_line}): {source}")]
    Launch {
        command_line: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the spawned worker failed.
    #[error("failed to wait on worker (command: {command_line}): {source}")]
    Wait {
        command_line: String,
        #[source]
        source: std::io::Error,
    },

    /// The worker was terminated by a signal and has no exit code.
    #[error("worker terminated abnormally without an exit code (command: {command_line})")]
    AbnormalTermination { command_line: String },
}

/// Immutable description of one worker invocation.
///
/// Built fresh per call; arguments are opaque strings passed through to
/// the child verbatim as discrete argv elements.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    program: String,
    args: Vec<String>,
    capture_path: PathBuf,
}

impl InvocationRequest {
    /// Create a request for `program` with output captured at `capture_path`.
    pub fn new(program: impl Into<String>, capture_path: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            capture_path: capture_path.into(),
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a sequence of arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The capture target this request writes to.
    pub fn capture_path(&self) -> &Path {
        &self.capture_path
    }

    /// The command line as a single string, for diagnostics only.
    ///
    /// This is never fed back to a shell; the child is always spawned from
    /// the discrete argv.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Execute the request and block until the worker has terminated.
    ///
    /// The capture target is created (or truncated) and both stdout and
    /// stderr of the child are redirected into it through one shared file
    /// handle, so the interleaving of the two streams is whatever order
    /// the OS delivers -- callers must not rely on it.
    ///
    /// On return the child has fully exited. A normal termination with a
    /// non-zero status is reported through the [`InvocationResult`], not
    /// as an error.
    pub async fn run(&self) -> Result<InvocationResult, InvokeError> {
        let capture = std::fs::File::create(&self.capture_path).map_err(|source| {
            InvokeError::CaptureTarget {
                path: self.capture_path.clone(),
                source,
            }
        })?;
        let capture_err = capture
            .try_clone()
            .map_err(|source| InvokeError::CaptureTarget {
                path: self.capture_path.clone(),
                source,
            })?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(capture))
            .stderr(Stdio::from(capture_err))
            .spawn()
            .map_err(|source| InvokeError::Launch {
                command_line: self.command_line(),
                source,
            })?;

        let status = child.wait().await.map_err(|source| InvokeError::Wait {
            command_line: self.command_line(),
            source,
        })?;

        let exit_code = status
            .code()
            .ok_or_else(|| InvokeError::AbnormalTermination {
                command_line: self.command_line(),
            })?;

        debug!(exit_code, command = %self.command_line(), "worker exited");

        Ok(InvocationResult {
            exit_code,
            capture_path: self.capture_path.clone(),
        })
    }
}

/// The outcome of a completed invocation: the worker's exit status and
/// where its output was captured.
#[derive(Debug, Clone)]
pub struct InvocationResult {
    exit_code: i32,
    capture_path: PathBuf,
}

impl InvocationResult {
    /// The worker's integer exit status.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// `true` if the worker exited with status 0.
    ///
    /// A non-zero status is a domain-level failure distinct from a launch
    /// failure; callers must branch on it before reading the capture.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Path to the capture target holding the worker's combined output.
    pub fn capture_path(&self) -> &Path {
        &self.capture_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_output_lands_in_capture_file() {
        let tmp = tempfile::tempdir().unwrap();
        let capture = tmp.path().join("out.txt");

        let result = InvocationRequest::new("echo", &capture)
            .arg("hello world")
            .run()
            .await
            .expect("echo should run");

        assert!(result.success());
        assert_eq!(result.exit_code(), 0);
        let text = std::fs::read_to_string(&capture).unwrap();
        assert!(
            text.contains("hello world"),
            "capture should contain the echoed text, got: {text:?}"
        );
    }

    #[tokio::test]
    async fn stderr_is_merged_into_capture() {
        let tmp = tempfile::tempdir().unwrap();
        let capture = tmp.path().join("out.txt");

        let result = InvocationRequest::new("sh", &capture)
            .args(["-c", "echo to_stdout; echo to_stderr >&2"])
            .run()
            .await
            .expect("sh should run");

        assert!(result.success());
        let text = std::fs::read_to_string(&capture).unwrap();
        assert!(text.contains("to_stdout"), "missing stdout, got: {text:?}");
        assert!(text.contains("to_stderr"), "missing stderr, got: {text:?}");
    }

    #[tokio::test]
    async fn nonzero_exit_is_a_result_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let capture = tmp.path().join("out.txt");

        let result = InvocationRequest::new("false", &capture)
            .run()
            .await
            .expect("false runs and terminates normally");

        assert!(!result.success());
        assert_eq!(result.exit_code(), 1);
    }

    #[tokio::test]
    async fn nonexistent_program_is_a_launch_error() {
        let tmp = tempfile::tempdir().unwrap();
        let capture = tmp.path().join("out.txt");

        let err = InvocationRequest::new("this_program_does_not_exist_jobwiz_test", &capture)
            .arg("-task")
            .arg("search")
            .run()
            .await
            .expect_err("spawn should fail");

        match err {
            InvokeError::Launch { command_line, .. } => {
                assert!(
                    command_line.contains("this_program_does_not_exist_jobwiz_test"),
                    "command line should name the binary, got: {command_line}"
                );
                assert!(
                    command_line.contains("-task search"),
                    "command line should include the args, got: {command_line}"
                );
            }
            other => panic!("expected Launch error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unwritable_capture_target_is_a_capture_target_error() {
        let tmp = tempfile::tempdir().unwrap();
        // A directory cannot be opened for writing as a file.
        let capture = tmp.path().to_path_buf();

        let err = InvocationRequest::new("echo", &capture)
            .run()
            .await
            .expect_err("creating the capture file should fail");

        assert!(
            matches!(err, InvokeError::CaptureTarget { .. }),
            "expected CaptureTarget error, got: {err:?}"
        );
    }

    #[tokio::test]
    async fn capture_target_is_truncated_between_runs() {
        let tmp = tempfile::tempdir().unwrap();
        let capture = tmp.path().join("out.txt");
        std::fs::write(&capture, "leftover from a previous, much longer run\n").unwrap();

        InvocationRequest::new("echo", &capture)
            .arg("short")
            .run()
            .await
            .expect("echo should run");

        let text = std::fs::read_to_string(&capture).unwrap();
        assert!(!text.contains("leftover"), "stale content survived: {text:?}");
        assert!(text.contains("short"));
    }

    #[test]
    fn command_line_joins_program_and_args() {
        let request = InvocationRequest::new("job_wizard", "/tmp/out.txt")
            .arg("-task")
            .arg("search")
            .args(["-email", "a@b.com"]);
        assert_eq!(request.command_line(), "job_wizard -task search -email a@b.com");
    }
}
