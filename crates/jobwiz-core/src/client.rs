//! High-level client: one synchronous exchange with the worker per call.
//!
//! Each method validates its request, invokes the worker, waits for
//! termination, reads the capture target back, and decodes the output for
//! that task. The phases never overlap and there is no timeout: a hung
//! worker hangs the caller. Two exchanges sharing one capture path are
//! last-writer-wins on the file; give concurrent clients distinct paths.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::capture::{CaptureError, read_capture};
use crate::decode::{
    self, Candidate, DecodeError, Envelope, FieldAnomaly, JobDetail, JobSummary, Projection,
};
use crate::invoke::{InvocationRequest, InvokeError};
use crate::request::{
    JobUpdate, NewJob, RegisterUser, SearchCriteria, ValidateError, WorkerRequest,
};

/// Default name of the worker binary, resolved via `$PATH`.
pub const DEFAULT_WORKER_BINARY: &str = "job_wizard";

/// Everything that can go wrong in one exchange, boundary by boundary.
///
/// The variants are deliberately distinct so a caller can treat "the
/// worker failed" differently from "the worker succeeded but its output
/// was unusable". Nothing here retries.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The request failed client-side validation; no process was spawned.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidateError),

    /// The worker could not be launched or waited on.
    #[error(transparent)]
    Invoke(#[from] InvokeError),

    /// The worker ran but exited non-zero. Decode is not attempted; the
    /// captured output is carried along since the worker may have written
    /// its error detail there.
    #[error("worker exited with status {exit_code} (command: {command_line})")]
    NonZeroExit {
        exit_code: i32,
        command_line: String,
        output: String,
    },

    /// The capture target could not be read back in full.
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// The captured output could not be parsed or projected.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The worker ran, exited 0, and reported a rejection in its output.
    #[error("worker rejected the request: {message}")]
    Rejected { message: String },
}

/// Client for the `job_wizard` worker.
///
/// Holds the worker binary path and the capture target; both are fixed
/// for the client's lifetime. Exchanges are strictly sequential per
/// client.
#[derive(Debug, Clone)]
pub struct WorkerClient {
    binary_path: String,
    capture_path: PathBuf,
}

impl WorkerClient {
    /// A client that looks for `job_wizard` on `$PATH`.
    pub fn new(capture_path: impl Into<PathBuf>) -> Self {
        Self::with_binary(DEFAULT_WORKER_BINARY, capture_path)
    }

    /// A client with an explicit worker binary path.
    pub fn with_binary(binary_path: impl Into<String>, capture_path: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: binary_path.into(),
            capture_path: capture_path.into(),
        }
    }

    /// The capture target this client writes and reads.
    pub fn capture_path(&self) -> &Path {
        &self.capture_path
    }

    /// Run one full exchange: validate, invoke, capture, parse.
    ///
    /// Returns the parsed value tree; task-specific decoding happens in
    /// the public methods.
    async fn exchange(&self, request: &WorkerRequest) -> Result<Value, WorkerError> {
        request.validate()?;

        let invocation = InvocationRequest::new(&self.binary_path, &self.capture_path)
            .args(request.to_args());
        debug!(task = request.task(), command = %invocation.command_line(), "invoking worker");

        let result = invocation.run().await?;
        if !result.success() {
            // Best-effort read: the worker usually writes its complaint
            // to the capture target before dying.
            let output = read_capture(result.capture_path())
                .await
                .map(|captured| captured.into_string())
                .unwrap_or_default();
            return Err(WorkerError::NonZeroExit {
                exit_code: result.exit_code(),
                command_line: invocation.command_line(),
                output,
            });
        }

        let captured = read_capture(result.capture_path()).await?;
        Ok(decode::parse(captured.as_str())?)
    }

    /// Decode a search-family response: either a summary array or a
    /// report envelope ("no matches" decodes to zero records).
    fn summaries(root: &Value) -> Result<Projection<JobSummary>, WorkerError> {
        match decode::envelope(root) {
            Some(Envelope::Error(message)) => Err(WorkerError::Rejected { message }),
            Some(Envelope::Warning(_)) => Ok(Projection::default()),
            _ => Ok(decode::project_array(root)?),
        }
    }

    /// Decode an acknowledgement response, extracting `key`. For an ack
    /// task a warning is a refusal, not an empty result.
    fn ack(root: &Value, key: &'static str) -> Result<String, WorkerError> {
        match decode::envelope(root) {
            Some(Envelope::Error(message)) | Some(Envelope::Warning(message)) => {
                Err(WorkerError::Rejected { message })
            }
            _ => Ok(decode::ack_field(root, key)?),
        }
    }

    /// `register`: create a user account. Returns the worker's success
    /// message.
    pub async fn register(&self, user: RegisterUser) -> Result<String, WorkerError> {
        let root = self.exchange(&WorkerRequest::Register(user)).await?;
        Self::ack(&root, "success")
    }

    /// `create`: post a new job. Returns the new job's id.
    pub async fn create_job(&self, job: NewJob) -> Result<String, WorkerError> {
        let root = self.exchange(&WorkerRequest::Create(job)).await?;
        Self::ack(&root, "job_id")
    }

    /// `search`: jobs matching the criteria, in the worker's order.
    pub async fn search(
        &self,
        criteria: SearchCriteria,
    ) -> Result<Projection<JobSummary>, WorkerError> {
        let root = self.exchange(&WorkerRequest::Search(criteria)).await?;
        Self::summaries(&root)
    }

    /// `detail`: full detail for one job.
    pub async fn detail(
        &self,
        email: impl Into<String>,
        job_id: impl Into<String>,
    ) -> Result<(JobDetail, Vec<FieldAnomaly>), WorkerError> {
        let root = self
            .exchange(&WorkerRequest::Detail {
                email: email.into(),
                job_id: job_id.into(),
            })
            .await?;
        match decode::envelope(&root) {
            Some(Envelope::Error(message)) | Some(Envelope::Warning(message)) => {
                Err(WorkerError::Rejected { message })
            }
            _ => Ok(decode::project_object(&root)?),
        }
    }

    /// `offered`: jobs created by this user.
    pub async fn offered(
        &self,
        creator: impl Into<String>,
    ) -> Result<Projection<JobSummary>, WorkerError> {
        let root = self
            .exchange(&WorkerRequest::Offered {
                creator: creator.into(),
            })
            .await?;
        Self::summaries(&root)
    }

    /// `applied`: jobs this user has applied for.
    pub async fn applied(
        &self,
        email: impl Into<String>,
    ) -> Result<Projection<JobSummary>, WorkerError> {
        let root = self
            .exchange(&WorkerRequest::Applied {
                email: email.into(),
            })
            .await?;
        Self::summaries(&root)
    }

    /// `modify`: change fields of an existing job. Returns the job's id.
    pub async fn modify_job(&self, update: JobUpdate) -> Result<String, WorkerError> {
        let root = self.exchange(&WorkerRequest::Modify(update)).await?;
        Self::ack(&root, "modified_job_id")
    }

    /// `submit`: apply for a job. Returns the applied job's id. A
    /// duplicate application is reported by the worker as a warning and
    /// surfaces here as [`WorkerError::Rejected`].
    pub async fn submit(
        &self,
        email: impl Into<String>,
        job_id: impl Into<String>,
    ) -> Result<String, WorkerError> {
        let root = self
            .exchange(&WorkerRequest::Submit {
                email: email.into(),
                job_id: job_id.into(),
            })
            .await?;
        Self::ack(&root, "applied_job_id")
    }

    /// `candidates`: applicants for one of this user's jobs.
    pub async fn candidates(
        &self,
        creator: impl Into<String>,
        job_id: impl Into<String>,
    ) -> Result<Projection<Candidate>, WorkerError> {
        let root = self
            .exchange(&WorkerRequest::Candidates {
                creator: creator.into(),
                job_id: job_id.into(),
            })
            .await?;
        match decode::envelope(&root) {
            Some(Envelope::Error(message)) => Err(WorkerError::Rejected { message }),
            Some(Envelope::Warning(_)) => Ok(Projection::default()),
            _ => Ok(decode::project_array(&root)?),
        }
    }
}
