use tracing::{debug, instrument};

use crate::client::PollPolicy;
use crate::error::{Error, ErrorKind, Result};
use crate::types::BatchInfo;

impl super::BulkClient {
    /// Wait until every batch in the job reaches a terminal state.
    ///
    /// Returns the final batch list. Failed and NotProcessed batches are
    /// terminal too, so this returning `Ok` does not mean every row went
    /// through; the result fetch reports per-batch gaps.
    pub async fn await_completion(&self, job_id: &str) -> Result<Vec<BatchInfo>> {
        self.await_completion_with(job_id, &self.poll_policy).await
    }

    /// [`await_completion`](Self::await_completion) with an explicit
    /// schedule.
    ///
    /// Makes at most `policy.max_attempts` status reads with a fixed
    /// `policy.interval` pause between consecutive reads, then gives up
    /// with a recoverable timeout error. If the job itself moves to
    /// Aborted or Failed the wait ends immediately.
    #[instrument(skip(self, policy), fields(max_attempts = policy.max_attempts))]
    pub async fn await_completion_with(
        &self,
        job_id: &str,
        policy: &PollPolicy,
    ) -> Result<Vec<BatchInfo>> {
        check_attempts(policy)?;
        for attempt in 1..=policy.max_attempts {
            let job = self.refresh_job(job_id).await?;
            if job.state.is_failed() {
                return Err(Error::new(ErrorKind::JobFailed {
                    job_id: job.id,
                    state: job.state,
                }));
            }

            // A job with no batches has nothing left to process, so an
            // empty list counts as done.
            let batches = self.batch_statuses(job_id).await?;
            if batches.iter().all(|b| b.state.is_terminal()) {
                return Ok(batches);
            }

            let pending = batches.iter().filter(|b| !b.state.is_terminal()).count();
            debug!(attempt, pending, "Batches still processing");
            if attempt < policy.max_attempts {
                tokio::time::sleep(policy.interval).await;
            }
        }
        Err(Error::new(ErrorKind::PollTimeout {
            job_id: job_id.to_string(),
            attempts: policy.max_attempts,
        }))
    }

    /// Wait until one batch reaches a terminal state.
    ///
    /// Unlike [`await_completion`](Self::await_completion) this treats a
    /// Failed or NotProcessed batch as an error, since a caller waiting on
    /// a single batch has nothing to salvage from it.
    pub async fn await_batch(&self, job_id: &str, batch_id: &str) -> Result<BatchInfo> {
        self.await_batch_with(job_id, batch_id, &self.poll_policy)
            .await
    }

    #[instrument(skip(self, policy), fields(max_attempts = policy.max_attempts))]
    pub async fn await_batch_with(
        &self,
        job_id: &str,
        batch_id: &str,
        policy: &PollPolicy,
    ) -> Result<BatchInfo> {
        check_attempts(policy)?;
        for attempt in 1..=policy.max_attempts {
            let job = self.refresh_job(job_id).await?;
            if job.state.is_failed() {
                return Err(Error::new(ErrorKind::JobFailed {
                    job_id: job.id,
                    state: job.state,
                }));
            }

            let batch = self.batch_status(job_id, batch_id).await?;
            if batch.state.is_error() {
                return Err(Error::new(ErrorKind::BatchFailed {
                    job_id: job_id.to_string(),
                    batch_id: batch.id,
                    state: batch.state,
                    message: batch.state_message.unwrap_or_default(),
                }));
            }
            if batch.state.is_terminal() {
                return Ok(batch);
            }

            debug!(attempt, state = %batch.state, "Batch still processing");
            if attempt < policy.max_attempts {
                tokio::time::sleep(policy.interval).await;
            }
        }
        Err(Error::new(ErrorKind::PollTimeout {
            job_id: job_id.to_string(),
            attempts: policy.max_attempts,
        }))
    }
}

fn check_attempts(policy: &PollPolicy) -> Result<()> {
    if policy.max_attempts == 0 {
        return Err(Error::new(ErrorKind::InvalidOperation(
            "Poll attempt budget must be greater than zero".to_string(),
        )));
    }
    Ok(())
}
