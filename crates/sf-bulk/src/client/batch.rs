use tracing::{debug, instrument, warn};

use hopper_sf_client::ResponseExt;

use crate::chunk::{self, ChunkPolicy};
use crate::client::SubmitPolicy;
use crate::codec;
use crate::error::{Error, ErrorKind, Result};
use crate::types::{BatchInfo, Job, JobState, Table};
use crate::xml;

impl super::BulkClient {
    /// Split a table into chunks and submit each chunk as a batch.
    ///
    /// Chunks are submitted in order and the returned batches follow that
    /// order. If a later chunk fails after earlier ones were accepted, the
    /// error reports the batches that were created instead of discarding
    /// them; the configured [`SubmitPolicy`] decides whether the job is
    /// also aborted.
    pub async fn submit_table(&self, job: &Job, table: &Table) -> Result<Vec<BatchInfo>> {
        self.submit_table_with(job, table, &self.chunk_policy, self.submit_policy)
            .await
    }

    /// [`submit_table`](Self::submit_table) with explicit policies.
    #[instrument(skip(self, job, table, chunk_policy), fields(job_id = %job.id, rows = table.row_count()))]
    pub async fn submit_table_with(
        &self,
        job: &Job,
        table: &Table,
        chunk_policy: &ChunkPolicy,
        submit_policy: SubmitPolicy,
    ) -> Result<Vec<BatchInfo>> {
        if job.state != JobState::Open {
            return Err(Error::new(ErrorKind::InvalidOperation(format!(
                "Cannot add batches to job {} in state {}",
                job.id, job.state
            ))));
        }

        let overhead = chunk::row_overhead(table.columns(), job.content_type);
        let chunks = chunk::split_rows(table.rows(), chunk_policy, overhead)?;
        let total = chunks.len();
        let mut submitted: Vec<BatchInfo> = Vec::with_capacity(total);

        for (index, rows) in chunks.into_iter().enumerate() {
            let outcome = match codec::encode_chunk(job.content_type, table.columns(), rows) {
                Ok(payload) => self.add_batch(job, payload).await,
                Err(err) => Err(err),
            };
            match outcome {
                Ok(batch) => submitted.push(batch),
                Err(cause) => {
                    return self
                        .fail_submission(job, submitted, index, total, submit_policy, cause)
                        .await;
                }
            }
        }

        debug!(job_id = %job.id, batches = submitted.len(), "Submitted all chunks");
        Ok(submitted)
    }

    /// Submit one already-serialized payload as a batch.
    ///
    /// The payload must match the job's content type. The query flow uses
    /// this to submit the SOQL string as the batch body.
    #[instrument(skip(self, job, payload), fields(job_id = %job.id, bytes = payload.len()))]
    pub async fn add_batch(&self, job: &Job, payload: String) -> Result<BatchInfo> {
        if job.state != JobState::Open {
            return Err(Error::new(ErrorKind::InvalidOperation(format!(
                "Cannot add batches to job {} in state {}",
                job.id, job.state
            ))));
        }
        let url = self.client.batch_list_url(&job.id);
        let request = self
            .client
            .post(&url)
            .payload(payload, job.content_type.mime_type());
        let response = self.client.execute(request).await?;
        let response = response.check_async_api_error().await?;
        let body = response.text().await?;
        xml::parse_batch_info(&body)
    }

    /// Read one batch's control document.
    #[instrument(skip(self))]
    pub async fn batch_status(&self, job_id: &str, batch_id: &str) -> Result<BatchInfo> {
        let response = self
            .client
            .get_text(&self.client.batch_url(job_id, batch_id))
            .await?;
        xml::parse_batch_info(&response)
    }

    /// Read the state of every batch in a job, in the service's list order.
    #[instrument(skip(self))]
    pub async fn batch_statuses(&self, job_id: &str) -> Result<Vec<BatchInfo>> {
        let response = self
            .client
            .get_text(&self.client.batch_list_url(job_id))
            .await?;
        xml::parse_batch_info_list(&response)
    }

    async fn fail_submission(
        &self,
        job: &Job,
        submitted: Vec<BatchInfo>,
        failed_index: usize,
        total: usize,
        submit_policy: SubmitPolicy,
        cause: Error,
    ) -> Result<Vec<BatchInfo>> {
        if submitted.is_empty() {
            return Err(cause);
        }
        warn!(
            job_id = %job.id,
            submitted = submitted.len(),
            failed_index,
            error = %cause,
            "Chunk submission failed part way"
        );
        if submit_policy == SubmitPolicy::AbortJob {
            if let Err(abort_err) = self.set_job_state(&job.id, JobState::Aborted).await {
                warn!(job_id = %job.id, error = %abort_err, "Could not abort partially submitted job");
            }
        }
        Err(Error {
            kind: ErrorKind::PartialSubmit {
                submitted,
                failed_index,
                total,
            },
            source: Some(Box::new(cause)),
        })
    }
}
