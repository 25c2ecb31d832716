//! Error types for bulk operations.

use std::fmt;

use crate::types::{BatchGap, BatchInfo, BatchState, JobState, Table};

pub type Result<T> = std::result::Result<T, Error>;

/// Error from a bulk operation.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    pub fn with_source(
        kind: ErrorKind,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            kind,
            source: Some(source.into()),
        }
    }

    /// Borrow the recovered rows and gaps when this is a partial-result
    /// error.
    pub fn partial_result(&self) -> Option<&PartialResult> {
        match &self.kind {
            ErrorKind::PartialResult(partial) => Some(partial),
            _ => None,
        }
    }

    /// Take the recovered rows and gaps when this is a partial-result
    /// error, handing the error back unchanged otherwise.
    pub fn into_partial_result(self) -> std::result::Result<PartialResult, Self> {
        match self.kind {
            ErrorKind::PartialResult(partial) => Ok(*partial),
            kind => Err(Self {
                kind,
                source: self.source,
            }),
        }
    }

    /// Borrow the batches that were created before a partial submission
    /// failure.
    pub fn submitted_batches(&self) -> Option<&[BatchInfo]> {
        match &self.kind {
            ErrorKind::PartialSubmit { submitted, .. } => Some(submitted),
            _ => None,
        }
    }
}

/// Classification of bulk operation errors.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Transport-level failure: network error, non-2xx status, or a service
    /// error document.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The session provider handed over an unusable session.
    #[error("Session error: {0}")]
    Session(String),

    /// Input rejected before any request was made.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A single row's serialized size exceeds the batch payload ceiling, so
    /// no chunking can make it fit.
    #[error("Row of {bytes} bytes exceeds the {limit} byte batch payload limit")]
    ChunkTooLarge { bytes: usize, limit: usize },

    /// Some chunks became batches before a later submission failed. The
    /// created batches are reported so callers can poll or abort them.
    #[error("Submitted {} of {total} chunks before chunk {failed_index} failed", .submitted.len())]
    PartialSubmit {
        /// Batches created before the failure, in submission order.
        submitted: Vec<BatchInfo>,
        /// Zero-based index of the chunk that failed.
        failed_index: usize,
        /// Total number of chunks the input was split into.
        total: usize,
    },

    /// The poll attempt budget ran out before every batch went terminal.
    /// The job keeps processing server-side; polling again is safe.
    #[error("Job {job_id} still processing after {attempts} status polls")]
    PollTimeout { job_id: String, attempts: u32 },

    /// The job was aborted or failed while waiting on it.
    #[error("Job {job_id} ended in state {state}")]
    JobFailed { job_id: String, state: JobState },

    /// A batch ended in a state that produces no results.
    #[error("Batch {batch_id} of job {job_id} ended in state {state}: {message}")]
    BatchFailed {
        job_id: String,
        batch_id: String,
        state: BatchState,
        message: String,
    },

    /// Some batches produced no results. The rows that were recovered are
    /// attached rather than discarded.
    #[error("{0}")]
    PartialResult(Box<PartialResult>),

    /// The service returned a document this client could not interpret.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// CSV encoding or decoding failure.
    #[error("CSV error: {0}")]
    Csv(String),

    /// JSON encoding or decoding failure.
    #[error("JSON error: {0}")]
    Json(String),

    /// An error document returned by the service.
    #[error("API error {exception_code}: {message}")]
    Api {
        exception_code: String,
        message: String,
    },

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// The recovered portion of a result fetch plus the batches that produced
/// nothing.
#[derive(Debug, Clone)]
pub struct PartialResult {
    /// Rows recovered from the batches that did complete, in batch order.
    pub recovered: Table,
    /// Batches whose rows are missing, in submission order.
    pub gaps: Vec<BatchGap>,
}

impl fmt::Display for PartialResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Partial result: recovered {} rows, {} batches produced no results",
            self.recovered.row_count(),
            self.gaps.len()
        )
    }
}

impl From<hopper_sf_client::Error> for Error {
    fn from(err: hopper_sf_client::Error) -> Self {
        let kind = match &err.kind {
            hopper_sf_client::ErrorKind::AsyncApi {
                exception_code,
                message,
            } => ErrorKind::Api {
                exception_code: exception_code.clone(),
                message: message.clone(),
            },
            _ => ErrorKind::Transport(err.to_string()),
        };
        Error {
            kind,
            source: Some(Box::new(err)),
        }
    }
}

impl From<hopper_sf_auth::Error> for Error {
    fn from(err: hopper_sf_auth::Error) -> Self {
        Error {
            kind: ErrorKind::Session(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error {
            kind: ErrorKind::Csv(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Json(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}
