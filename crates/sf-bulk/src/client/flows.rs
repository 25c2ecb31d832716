use tracing::instrument;

use hopper_sf_client::security::field;

use crate::error::{Error, ErrorKind, Result};
use crate::types::{BatchInfo, Job, JobSpec, Table};

/// Outcome of a complete load: the closed job, its batches in submission
/// order, and the merged result table.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub job: Job,
    pub batches: Vec<BatchInfo>,
    pub results: Table,
}

impl super::BulkClient {
    /// Run a SOQL query through a bulk job and return the merged table.
    ///
    /// Creates a CSV query job on the object named in the FROM clause,
    /// submits the query as its single batch, closes the job, waits for
    /// the batch, and downloads every result page in order.
    #[instrument(skip(self, soql))]
    pub async fn run_query(&self, soql: &str) -> Result<Table> {
        let object_type = object_from_soql(soql)?;
        let spec = JobSpec::query(object_type);

        let mut job = self.create_job(&spec).await?;
        let batch = self.add_batch(&job, soql.to_string()).await?;
        self.close_job(&mut job).await?;
        let batch = self.await_batch(&job.id, &batch.id).await?;
        self.fetch_results(&job, std::slice::from_ref(&batch)).await
    }

    /// Run a complete ingest flow: create the job, submit the table in
    /// chunks, close the job, wait for every batch, and fetch the merged
    /// results.
    ///
    /// Each step's error reports the same context the step-by-step calls
    /// would, so a failed flow can be picked up manually from where it
    /// stopped.
    #[instrument(skip(self, spec, table), fields(object = %spec.object_type, operation = %spec.operation, rows = table.row_count()))]
    pub async fn run_load(&self, spec: &JobSpec, table: &Table) -> Result<LoadOutcome> {
        let mut job = self.create_job(spec).await?;
        let submitted = self.submit_table(&job, table).await?;
        self.close_job(&mut job).await?;
        let latest = self.await_completion(&job.id).await?;
        let batches = order_like(&submitted, latest)?;
        let results = self.fetch_results(&job, &batches).await?;
        Ok(LoadOutcome {
            job,
            batches,
            results,
        })
    }
}

/// Pull the queried object's name out of a SOQL statement.
///
/// Scans for the first FROM keyword followed by a plain identifier, which
/// skips over subquery FROMs that sit against a closing parenthesis.
fn object_from_soql(soql: &str) -> Result<String> {
    let mut tokens = soql.split_whitespace().peekable();
    while let Some(token) = tokens.next() {
        if token.eq_ignore_ascii_case("from") {
            if let Some(candidate) = tokens.peek() {
                if field::is_safe_sobject_name(candidate) {
                    return Ok((*candidate).to_string());
                }
            }
        }
    }
    Err(Error::new(ErrorKind::InvalidOperation(
        "Could not find the queried object in the FROM clause".to_string(),
    )))
}

/// Reorder the latest batch states to match submission order.
fn order_like(submitted: &[BatchInfo], mut latest: Vec<BatchInfo>) -> Result<Vec<BatchInfo>> {
    let mut ordered = Vec::with_capacity(submitted.len());
    for batch in submitted {
        let Some(position) = latest.iter().position(|b| b.id == batch.id) else {
            return Err(Error::new(ErrorKind::InvalidResponse(format!(
                "Batch {} missing from the job's status list",
                batch.id
            ))));
        };
        ordered.push(latest.swap_remove(position));
    }
    Ok(ordered)
}
