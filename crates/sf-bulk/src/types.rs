//! Domain types for bulk jobs, batches, and result tables.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

/// The data operation a job performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Upsert,
    Update,
    Delete,
    HardDelete,
    Query,
}

impl Operation {
    /// The wire name used in jobInfo documents.
    pub fn api_name(&self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Upsert => "upsert",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::HardDelete => "hardDelete",
            Operation::Query => "query",
        }
    }

    /// Returns true for the query operation.
    pub fn is_query(&self) -> bool {
        matches!(self, Operation::Query)
    }

    /// Returns true for operations that upload record data.
    pub fn is_ingest(&self) -> bool {
        !self.is_query()
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insert" => Ok(Operation::Insert),
            "upsert" => Ok(Operation::Upsert),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            "hardDelete" => Ok(Operation::HardDelete),
            "query" => Ok(Operation::Query),
            other => Err(Error::new(ErrorKind::InvalidOperation(format!(
                "Unrecognized operation: {other}"
            )))),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

/// Serialization format for batch payloads and result downloads.
///
/// Control documents (jobInfo, batchInfo) are always XML regardless of the
/// job's content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    Csv,
    Json,
    Xml,
}

impl ContentType {
    /// The wire name used in jobInfo documents.
    pub fn api_name(&self) -> &'static str {
        match self {
            ContentType::Csv => "CSV",
            ContentType::Json => "JSON",
            ContentType::Xml => "XML",
        }
    }

    /// The Content-Type header value for batch payloads of this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ContentType::Csv => "text/csv; charset=UTF-8",
            ContentType::Json => "application/json; charset=UTF-8",
            ContentType::Xml => "text/xml; charset=UTF-8",
        }
    }
}

impl FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CSV" => Ok(ContentType::Csv),
            "JSON" => Ok(ContentType::Json),
            "XML" => Ok(ContentType::Xml),
            other => Err(Error::new(ErrorKind::InvalidResponse(format!(
                "Unrecognized content type: {other}"
            )))),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

/// How the service schedules a job's batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    #[default]
    Parallel,
    Serial,
}

impl ConcurrencyMode {
    pub fn api_name(&self) -> &'static str {
        match self {
            ConcurrencyMode::Parallel => "Parallel",
            ConcurrencyMode::Serial => "Serial",
        }
    }
}

impl FromStr for ConcurrencyMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Parallel" => Ok(ConcurrencyMode::Parallel),
            "Serial" => Ok(ConcurrencyMode::Serial),
            other => Err(Error::new(ErrorKind::InvalidResponse(format!(
                "Unrecognized concurrency mode: {other}"
            )))),
        }
    }
}

/// Lifecycle state of a job.
///
/// Jobs accept batches while `Open`, stop accepting them once `Closed`, and
/// end in `Aborted` or `Failed` when they can no longer make progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Open,
    Closed,
    Aborted,
    Failed,
}

impl JobState {
    pub fn api_name(&self) -> &'static str {
        match self {
            JobState::Open => "Open",
            JobState::Closed => "Closed",
            JobState::Aborted => "Aborted",
            JobState::Failed => "Failed",
        }
    }

    /// Returns true when the job was aborted or failed and its batches will
    /// not progress further.
    pub fn is_failed(&self) -> bool {
        matches!(self, JobState::Aborted | JobState::Failed)
    }
}

impl FromStr for JobState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(JobState::Open),
            "Closed" => Ok(JobState::Closed),
            "Aborted" => Ok(JobState::Aborted),
            "Failed" => Ok(JobState::Failed),
            other => Err(Error::new(ErrorKind::InvalidResponse(format!(
                "Unrecognized job state: {other}"
            )))),
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

/// Processing state of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Queued,
    InProgress,
    Completed,
    Failed,
    NotProcessed,
}

impl BatchState {
    pub fn api_name(&self) -> &'static str {
        match self {
            BatchState::Queued => "Queued",
            BatchState::InProgress => "InProgress",
            BatchState::Completed => "Completed",
            BatchState::Failed => "Failed",
            BatchState::NotProcessed => "NotProcessed",
        }
    }

    /// Returns true once the batch will never change state again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchState::Completed | BatchState::Failed | BatchState::NotProcessed
        )
    }

    /// Returns true for terminal states that produce no results.
    pub fn is_error(&self) -> bool {
        matches!(self, BatchState::Failed | BatchState::NotProcessed)
    }
}

impl FromStr for BatchState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Older service versions write "InProcess", and some emit
        // "In Progress" and "Not Processed" with a space.
        match s {
            "Queued" => Ok(BatchState::Queued),
            "InProgress" | "In Progress" | "InProcess" => Ok(BatchState::InProgress),
            "Completed" => Ok(BatchState::Completed),
            "Failed" => Ok(BatchState::Failed),
            "NotProcessed" | "Not Processed" => Ok(BatchState::NotProcessed),
            other => Err(Error::new(ErrorKind::InvalidResponse(format!(
                "Unrecognized batch state: {other}"
            )))),
        }
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

/// A bulk job as reported by the service.
///
/// The state field reflects the last control-document read; it changes only
/// through the lifecycle calls on [`BulkClient`](crate::BulkClient).
#[derive(Debug, Clone)]
pub struct Job {
    /// Service-assigned job id.
    pub id: String,
    /// Target sObject type, e.g. `Account`.
    pub object_type: String,
    pub operation: Operation,
    pub content_type: ContentType,
    pub concurrency_mode: ConcurrencyMode,
    pub state: JobState,
    /// Field used to match records for upsert jobs.
    pub external_id_field_name: Option<String>,
}

/// Everything needed to create a job.
///
/// Construct through the per-operation constructors so upsert jobs always
/// carry an external id field:
///
/// ```
/// use hopper_sf_bulk::{ContentType, JobSpec};
///
/// let spec = JobSpec::upsert("Account", "External_Id__c").with_content_type(ContentType::Json);
/// ```
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub operation: Operation,
    pub object_type: String,
    pub content_type: ContentType,
    pub concurrency_mode: ConcurrencyMode,
    pub external_id_field_name: Option<String>,
}

impl JobSpec {
    fn with_operation(operation: Operation, object_type: impl Into<String>) -> Self {
        Self {
            operation,
            object_type: object_type.into(),
            content_type: ContentType::default(),
            concurrency_mode: ConcurrencyMode::default(),
            external_id_field_name: None,
        }
    }

    /// Build a spec from an operation name, rejecting unknown names before
    /// any request is made.
    pub fn new(operation: &str, object_type: impl Into<String>) -> crate::Result<Self> {
        Ok(Self::with_operation(operation.parse()?, object_type))
    }

    pub fn insert(object_type: impl Into<String>) -> Self {
        Self::with_operation(Operation::Insert, object_type)
    }

    pub fn update(object_type: impl Into<String>) -> Self {
        Self::with_operation(Operation::Update, object_type)
    }

    pub fn delete(object_type: impl Into<String>) -> Self {
        Self::with_operation(Operation::Delete, object_type)
    }

    /// Permanently delete records, bypassing the recycle bin.
    pub fn hard_delete(object_type: impl Into<String>) -> Self {
        Self::with_operation(Operation::HardDelete, object_type)
    }

    pub fn upsert(object_type: impl Into<String>, external_id_field: impl Into<String>) -> Self {
        let mut spec = Self::with_operation(Operation::Upsert, object_type);
        spec.external_id_field_name = Some(external_id_field.into());
        spec
    }

    pub(crate) fn query(object_type: impl Into<String>) -> Self {
        Self::with_operation(Operation::Query, object_type)
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_concurrency_mode(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }
}

/// A batch as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInfo {
    /// Service-assigned batch id.
    pub id: String,
    pub job_id: String,
    pub state: BatchState,
    /// Service-provided explanation for Failed and NotProcessed batches.
    pub state_message: Option<String>,
}

/// A batch whose rows are missing from an assembled result table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchGap {
    pub batch_id: String,
    pub state: BatchState,
    pub state_message: Option<String>,
}

/// An ordered, column-named table of string cells.
///
/// Used both for upload data and for assembled results. Rows preserve the
/// order they were added in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a table from column names and rows.
    pub fn from_parts(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Interpret this table as per-row ingest outcomes.
    ///
    /// Returns `None` unless the table carries the Id, Success, Created, and
    /// Error columns that ingest result downloads use.
    pub fn outcomes(&self) -> Option<Vec<RowOutcome>> {
        let find = |name: &str| {
            self.columns
                .iter()
                .position(|c| c.eq_ignore_ascii_case(name))
        };
        let id_col = find("Id")?;
        let success_col = find("Success")?;
        let created_col = find("Created")?;
        let error_col = find("Error")?;

        let cell = |row: &Vec<String>, col: usize| row.get(col).cloned().unwrap_or_default();
        Some(
            self.rows
                .iter()
                .map(|row| RowOutcome {
                    id: Some(cell(row, id_col)).filter(|v| !v.is_empty()),
                    success: cell(row, success_col).eq_ignore_ascii_case("true"),
                    created: cell(row, created_col).eq_ignore_ascii_case("true"),
                    error: Some(cell(row, error_col)).filter(|v| !v.is_empty()),
                })
                .collect(),
        )
    }
}

/// One row of an ingest result, aligned with the corresponding input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOutcome {
    /// Record id, present when the service touched a record.
    pub id: Option<String>,
    pub success: bool,
    /// True when the row created a record rather than updating one.
    pub created: bool,
    pub error: Option<String>,
}
