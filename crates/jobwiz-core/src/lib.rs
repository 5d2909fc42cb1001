//! Client-side adapter for the `job_wizard` job-board worker.
//!
//! The worker is an external black box invoked by name and arguments;
//! this crate owns the request/response contract around it:
//!
//! ```text
//! WorkerClient
//!     |
//!     v
//! InvocationRequest --spawn argv, redirect stdout+stderr--> capture file
//!     |  (block until the worker terminates)
//!     v
//! InvocationResult --exit 0?--> read_capture --> CapturedOutput
//!     |                                              |
//!     |  non-zero: NonZeroExit, decode skipped       v
//!     |                                    decode::parse (serde_json)
//!     |                                              |
//!     v                                              v
//! WorkerError <------------------------- envelope / project -> records
//! ```
//!
//! The exchange is strictly sequential: invoke, then capture, then
//! decode, each completing before the next begins. All failures are
//! distinct typed errors ([`WorkerError`]); per-field surprises in
//! otherwise well-shaped output are diagnostics, not failures.

pub mod capture;
pub mod client;
pub mod decode;
pub mod invoke;
pub mod request;

pub use capture::{CaptureError, CapturedOutput, read_capture};
pub use client::{DEFAULT_WORKER_BINARY, WorkerClient, WorkerError};
pub use decode::{
    AnomalyKind, Candidate, DecodeError, Envelope, FieldAnomaly, JobDetail, JobSummary,
    Projection, ValueKind,
};
pub use invoke::{InvocationRequest, InvocationResult, InvokeError};
pub use request::{JobUpdate, NewJob, RegisterUser, SearchCriteria, ValidateError, WorkerRequest};
